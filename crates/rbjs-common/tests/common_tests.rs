use super::*;

#[test]
fn test_parse_level_names() {
    assert_eq!("es5".parse::<EsLevel>(), Ok(EsLevel::Es5));
    assert_eq!("legacy".parse::<EsLevel>(), Ok(EsLevel::Es5));
    assert_eq!("ES6".parse::<EsLevel>(), Ok(EsLevel::Es2015));
    assert_eq!("es2017".parse::<EsLevel>(), Ok(EsLevel::Es2017));
    assert_eq!("2020".parse::<EsLevel>(), Ok(EsLevel::Es2020));
    assert_eq!("esnext".parse::<EsLevel>(), Ok(EsLevel::Es2022));
    assert!("es4".parse::<EsLevel>().is_err());
    assert!("typescript".parse::<EsLevel>().is_err());
}

#[test]
fn test_level_ordering_and_capabilities() {
    assert!(EsLevel::Es5 < EsLevel::Es2015);
    assert!(!EsLevel::Es5.is_block_scoped());
    assert!(EsLevel::Es2015.is_block_scoped());
    assert_eq!(EsLevel::Es5.local_keyword(), "var");
    assert_eq!(EsLevel::Es2015.local_keyword(), "let");
    assert_eq!(EsLevel::Es2015.constant_keyword(), "const");
    assert!(!EsLevel::Es2015.has_exponent_operator());
    assert!(EsLevel::Es2016.has_exponent_operator());
    assert!(!EsLevel::Es2016.has_async());
    assert!(EsLevel::Es2017.has_async());
}

#[test]
fn test_level_deserialize_name_or_year() {
    let by_name: EsLevel = serde_json::from_str("\"es2015\"").unwrap();
    assert_eq!(by_name, EsLevel::Es2015);

    let by_year: EsLevel = serde_json::from_str("2017").unwrap();
    assert_eq!(by_year, EsLevel::Es2017);

    let legacy: EsLevel = serde_json::from_str("5").unwrap();
    assert_eq!(legacy, EsLevel::Es5);

    assert!(serde_json::from_str::<EsLevel>("1999").is_err());
}

#[test]
fn test_level_display_round_trips() {
    for level in EsLevel::ALL {
        assert_eq!(level.to_string().parse::<EsLevel>(), Ok(level));
    }
}

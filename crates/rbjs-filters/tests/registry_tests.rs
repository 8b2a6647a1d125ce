use super::*;
use rbjs_emitter::Filter;

#[test]
fn test_every_listed_filter_resolves() {
    for &name in available() {
        let filter = by_name(name).unwrap_or_else(|| panic!("{name} is registered"));
        assert_eq!(filter.name(), name);
    }
}

#[test]
fn test_unknown_filter_is_none() {
    assert!(by_name("jquery").is_none());
    assert!(by_name("").is_none());
}

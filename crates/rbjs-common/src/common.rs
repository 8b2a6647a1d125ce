//! Feature levels shared by the filter pipeline and the emitter.
//!
//! The converter targets a family of ECMAScript editions. Everything below
//! ES2015 is "legacy": only function-scoped, hoisted `var` bindings exist.
//! From ES2015 on, block-scoped `let`/`const`, destructuring, classes, arrow
//! functions and template literals are available. Later editions add a few
//! operators the emitter can use directly.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Target ECMAScript feature level.
///
/// Ordered, so `level >= EsLevel::Es2015` reads as "has block scoping".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EsLevel {
    /// ES5: hoisting-only `var` bindings.
    #[default]
    Es5,
    Es2015,
    Es2016,
    Es2017,
    Es2018,
    Es2019,
    Es2020,
    Es2021,
    Es2022,
}

/// Error returned when a feature level name or year is not recognized.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown ECMAScript level '{0}'")]
pub struct ParseEsLevelError(pub String);

impl EsLevel {
    pub const ALL: [EsLevel; 9] = [
        EsLevel::Es5,
        EsLevel::Es2015,
        EsLevel::Es2016,
        EsLevel::Es2017,
        EsLevel::Es2018,
        EsLevel::Es2019,
        EsLevel::Es2020,
        EsLevel::Es2021,
        EsLevel::Es2022,
    ];

    /// Edition number, `5` for legacy and the year otherwise.
    pub const fn year(self) -> u32 {
        match self {
            EsLevel::Es5 => 5,
            EsLevel::Es2015 => 2015,
            EsLevel::Es2016 => 2016,
            EsLevel::Es2017 => 2017,
            EsLevel::Es2018 => 2018,
            EsLevel::Es2019 => 2019,
            EsLevel::Es2020 => 2020,
            EsLevel::Es2021 => 2021,
            EsLevel::Es2022 => 2022,
        }
    }

    /// Map an edition number to a level. `6` is accepted as ES2015.
    pub fn from_year(year: u32) -> Option<Self> {
        match year {
            5 => Some(EsLevel::Es5),
            6 => Some(EsLevel::Es2015),
            _ => EsLevel::ALL.into_iter().find(|level| level.year() == year),
        }
    }

    /// Block-scoped `let`/`const` bindings are available.
    pub fn is_block_scoped(self) -> bool {
        self >= EsLevel::Es2015
    }

    /// `let` or `var`, whichever the level uses for mutable locals.
    pub fn local_keyword(self) -> &'static str {
        if self.is_block_scoped() { "let" } else { "var" }
    }

    /// `const` or `var`, whichever the level uses for constants.
    pub fn constant_keyword(self) -> &'static str {
        if self.is_block_scoped() { "const" } else { "var" }
    }

    pub fn has_exponent_operator(self) -> bool {
        self >= EsLevel::Es2016
    }

    pub fn has_async(self) -> bool {
        self >= EsLevel::Es2017
    }

    pub fn has_optional_chaining(self) -> bool {
        self >= EsLevel::Es2020
    }

    pub fn has_logical_assignment(self) -> bool {
        self >= EsLevel::Es2021
    }
}

impl fmt::Display for EsLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "es{}", self.year())
    }
}

impl FromStr for EsLevel {
    type Err = ParseEsLevelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        let level = match normalized.as_str() {
            "legacy" => Some(EsLevel::Es5),
            "modern" | "latest" | "esnext" => Some(EsLevel::Es2022),
            other => other
                .strip_prefix("es")
                .unwrap_or(other)
                .parse::<u32>()
                .ok()
                .and_then(EsLevel::from_year),
        };
        level.ok_or_else(|| ParseEsLevelError(value.to_string()))
    }
}

impl Serialize for EsLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Accepts both names (`"es2015"`, `"legacy"`) and bare years (`2017`).
impl<'de> Deserialize<'de> for EsLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum LevelRepr {
            Year(u32),
            Name(String),
        }

        match LevelRepr::deserialize(deserializer)? {
            LevelRepr::Year(year) => EsLevel::from_year(year)
                .ok_or_else(|| Error::custom(ParseEsLevelError(year.to_string()))),
            LevelRepr::Name(name) => name.parse().map_err(Error::custom),
        }
    }
}

#[cfg(test)]
#[path = "../tests/common_tests.rs"]
mod tests;

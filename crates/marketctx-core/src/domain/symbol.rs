use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_SYMBOL_LEN: usize = 15;

/// Exchange suffixes that identify a listing venue rather than the instrument.
const EXCHANGE_SUFFIXES: &[&str] = &[
    "L", "TO", "AX", "DE", "PA", "HK", "SS", "SZ", "NS", "BO", "SW", "MI", "AS", "MC", "ST", "OL",
    "CO", "HE", "KS", "SA", "MX", "JK", "SI", "TW", "NZ", "VI", "BR", "IR", "LS", "TA", "JO", "IS",
    "WA", "TWO", "NE", "CN", "AQ",
];

/// Normalized ticker symbol used as the cache key and provider argument.
///
/// Normalization trims whitespace, drops a `$` cashtag and an `EXCHANGE:`
/// prefix, uppercases, strips a trailing exchange suffix (`VOD.L` → `VOD`)
/// and rewrites a single-letter share class to a hyphen (`BRK.B` → `BRK-B`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let mut raw = input.trim();
        raw = raw.strip_prefix('$').unwrap_or(raw);
        if let Some((_, rest)) = raw.split_once(':') {
            raw = rest.trim();
        }
        if raw.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        let mut normalized = raw.to_ascii_uppercase();
        if let Some((base, suffix)) = normalized.rsplit_once('.') {
            let (base, suffix) = (base.to_owned(), suffix.to_owned());
            if EXCHANGE_SUFFIXES.contains(&suffix.as_str()) {
                normalized = base;
            } else if suffix.len() == 1 {
                normalized = format!("{base}-{suffix}");
            }
        }

        let len = normalized.chars().count();
        if len == 0 {
            return Err(ValidationError::EmptySymbol);
        }
        if len > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }

        if let Some(first) = normalized.chars().next() {
            if !first.is_ascii_alphabetic() {
                return Err(ValidationError::SymbolInvalidStart { ch: first });
            }
        }

        for (index, ch) in normalized.chars().enumerate() {
            let valid = ch.is_ascii_alphanumeric() || ch == '-';
            if !valid {
                return Err(ValidationError::SymbolInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    /// Wraps a constant that is already in normalized form.
    pub(crate) fn from_normalized(value: &'static str) -> Self {
        debug_assert!(Self::parse(value).is_ok_and(|parsed| parsed.0 == value));
        Self(value.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

//! Fixed-point dish price.
//!
//! Prices carry exactly two fractional digits and are held as integer minor
//! units. The serialized form is the decimal string (`"12.50"`), so a value
//! written to the cache deserializes to the identical amount; binary floats
//! never enter the round trip.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const MINOR_PER_UNIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
    minor: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceParseError {
    #[error("price `{0}` is not a decimal number")]
    NotNumeric(String),
    #[error("price `{0}` has more than two fractional digits")]
    TooPrecise(String),
    #[error("price must not be negative")]
    Negative,
    #[error("price `{0}` is out of range")]
    OutOfRange(String),
}

impl Price {
    /// Build a price from integer minor units (`1250` → `12.50`).
    pub fn from_minor_units(minor: i64) -> Result<Self, PriceParseError> {
        if minor < 0 {
            return Err(PriceParseError::Negative);
        }
        Ok(Self { minor })
    }

    pub fn minor_units(self) -> i64 {
        self.minor
    }

    pub fn units(self) -> i64 {
        self.minor / MINOR_PER_UNIT
    }

    pub fn fraction(self) -> i64 {
        self.minor % MINOR_PER_UNIT
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.units(), self.fraction())
    }
}

impl FromStr for Price {
    type Err = PriceParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.starts_with('-') {
            return Err(PriceParseError::Negative);
        }

        let (units_part, fraction_part) = match trimmed.split_once('.') {
            Some((units, fraction)) => (units, fraction),
            None => (trimmed, ""),
        };

        if units_part.is_empty() && fraction_part.is_empty() {
            return Err(PriceParseError::NotNumeric(raw.to_string()));
        }
        if fraction_part.len() > 2 {
            return Err(PriceParseError::TooPrecise(raw.to_string()));
        }

        let units: i64 = if units_part.is_empty() {
            0
        } else {
            units_part
                .parse()
                .map_err(|_| PriceParseError::NotNumeric(raw.to_string()))?
        };

        let fraction: i64 = if fraction_part.is_empty() {
            0
        } else {
            fraction_part
                .parse()
                .map_err(|_| PriceParseError::NotNumeric(raw.to_string()))?
        };

        // Right-pad a single fractional digit: "12.5" means "12.50".
        let fraction = if fraction_part.len() == 1 {
            fraction * 10
        } else {
            fraction
        };

        let minor = units
            .checked_mul(MINOR_PER_UNIT)
            .and_then(|m| m.checked_add(fraction))
            .ok_or_else(|| PriceParseError::OutOfRange(raw.to_string()))?;

        Self::from_minor_units(minor)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

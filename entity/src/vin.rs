//! Vehicle identification numbers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of characters in a modern (post-1981) VIN.
pub const VIN_LENGTH: usize = 17;

/// A validated, upper-cased 17 character VIN.
///
/// The letters I, O and Q never appear in a VIN because they are easily confused with
/// 1 and 0, so their presence marks the value as invalid rather than being normalized away.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Vin(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VinError {
    /// VIN did not have exactly 17 characters
    InvalidLength(usize),
    /// VIN contained a character outside `[A-HJ-NPR-Z0-9]`
    InvalidCharacter(char),
}

impl Vin {
    pub fn parse(value: &str) -> Result<Self, VinError> {
        let value = value.trim();
        let length = value.chars().count();
        if length != VIN_LENGTH {
            return Err(VinError::InvalidLength(length));
        }

        let normalized = value.to_ascii_uppercase();
        if let Some(invalid) = normalized
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() || matches!(c, 'I' | 'O' | 'Q'))
        {
            return Err(VinError::InvalidCharacter(invalid));
        }

        Ok(Vin(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Vin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for VinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VinError::InvalidLength(length) => {
                write!(f, "VIN must be {VIN_LENGTH} characters, got {length}")
            }
            VinError::InvalidCharacter(c) => write!(f, "VIN contains invalid character '{c}'"),
        }
    }
}

impl std::error::Error for VinError {}

impl TryFrom<String> for Vin {
    type Error = VinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Vin::parse(&value)
    }
}

impl From<Vin> for String {
    fn from(vin: Vin) -> Self {
        vin.0
    }
}

impl AsRef<str> for Vin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Numeric registration number the upstream registry assigns to an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistryId(pub i64);

/// Public identifier of an operator (a CNPJ in the upstream registry), used in
/// detail URLs. Kept verbatim: punctuation such as `/` is encoded by the
/// transport, not stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(pub String);

impl ExternalId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExternalId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ExternalId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("quarter must be between 1 and 4, got {0}")]
pub struct InvalidQuarter(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quarter(u8);

impl Quarter {
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Quarter {
    type Error = InvalidQuarter;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=4).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidQuarter(value))
        }
    }
}

impl From<Quarter> for u8 {
    fn from(value: Quarter) -> Self {
        value.0
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_rejects_values_outside_one_to_four() {
        assert_eq!(Quarter::try_from(0), Err(InvalidQuarter(0)));
        assert_eq!(Quarter::try_from(5), Err(InvalidQuarter(5)));
        assert_eq!(Quarter::try_from(4).map(Quarter::get), Ok(4));
    }

    #[test]
    fn quarter_deserialization_is_validated() {
        assert!(serde_json::from_str::<Quarter>("3").is_ok());
        assert!(serde_json::from_str::<Quarter>("7").is_err());
    }
}

//! User and token identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::{NATIVE_TOKEN, ZERO_ADDRESS};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("Empty identifier")]
    Empty,

    #[error("Invalid token address: {0}")]
    InvalidTokenAddress(String),
}

/// Identity of a caller (wallet address or any opaque account name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdError::Empty);
        }
        Ok(UserId(s.to_string()))
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

/// Token a fund is denominated in.
///
/// `Native` is the chain coin (paid with an attached value); every other
/// token is a contract address, stored lowercase so lookups are
/// case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TokenId {
    #[default]
    Native,
    Contract(String),
}

impl TokenId {
    /// Parse a contract address (`0x` + 40 hex digits)
    pub fn contract(address: &str) -> Result<Self, IdError> {
        address.parse()
    }

    pub fn is_native(&self) -> bool {
        matches!(self, TokenId::Native)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenId::Native => f.write_str(NATIVE_TOKEN),
            TokenId::Contract(address) => f.write_str(address),
        }
    }
}

impl FromStr for TokenId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdError::Empty);
        }
        if s.eq_ignore_ascii_case(NATIVE_TOKEN) || s.eq_ignore_ascii_case(ZERO_ADDRESS) {
            return Ok(TokenId::Native);
        }

        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| IdError::InvalidTokenAddress(s.to_string()))?;
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdError::InvalidTokenAddress(s.to_string()));
        }

        Ok(TokenId::Contract(format!("0x{}", hex.to_ascii_lowercase())))
    }
}

impl TryFrom<String> for TokenId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TokenId> for String {
    fn from(token: TokenId) -> Self {
        token.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JIBJIB: &str = "0xebe937ee67e3219d176965cc08110a258f925e01";

    #[test]
    fn test_native_aliases() {
        assert_eq!("native".parse::<TokenId>().unwrap(), TokenId::Native);
        assert_eq!("NATIVE".parse::<TokenId>().unwrap(), TokenId::Native);
        assert_eq!(ZERO_ADDRESS.parse::<TokenId>().unwrap(), TokenId::Native);
    }

    #[test]
    fn test_contract_address_normalized() {
        let upper = "0xEBE937EE67E3219D176965CC08110A258F925E01";
        let token: TokenId = upper.parse().unwrap();
        assert_eq!(token, TokenId::Contract(JIBJIB.to_string()));
        assert_eq!(token.to_string(), JIBJIB);
        assert!(!token.is_native());
    }

    #[test]
    fn test_invalid_addresses() {
        assert!("".parse::<TokenId>().is_err());
        assert!("ebe937ee67e3219d176965cc08110a258f925e01".parse::<TokenId>().is_err());
        assert!("0x1234".parse::<TokenId>().is_err());
        assert!("0xzzz937ee67e3219d176965cc08110a258f925e01".parse::<TokenId>().is_err());
    }

    #[test]
    fn test_token_as_json_map_key() {
        let mut balances = std::collections::BTreeMap::new();
        balances.insert(TokenId::Native, 5u64);
        balances.insert(TokenId::contract(JIBJIB).unwrap(), 7u64);

        let json = serde_json::to_string(&balances).unwrap();
        assert!(json.contains("\"native\":5"));

        let back: std::collections::BTreeMap<TokenId, u64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, balances);
    }

    #[test]
    fn test_user_id_parse() {
        assert_eq!(" alice ".parse::<UserId>().unwrap(), UserId::new("alice"));
        assert_eq!("  ".parse::<UserId>(), Err(IdError::Empty));
    }
}

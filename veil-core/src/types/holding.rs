//! Holding descriptor: what class of value a mix shuffles.
//!
//! A mix moves equal amounts of exactly one holding between its
//! participants: the native coin, a custom asset, or a custom currency.
//! Non-native holdings additionally require a fixed native-coin deposit
//! as collateral.

use serde::{Deserialize, Serialize};

use crate::error::CodeError;
use crate::types::HoldingId;

/// 8-byte currency code tag (e.g. "VUSD"), padded with null bytes.
pub type CurrencyCode = [u8; 8];

/// Create a currency code from a string of at most 8 bytes.
pub fn code_from_str(s: &str) -> Result<CurrencyCode, CodeError> {
    let bytes = s.as_bytes();
    if bytes.len() > 8 {
        return Err(CodeError::TooLong);
    }
    let mut code = [0u8; 8];
    code[..bytes.len()].copy_from_slice(bytes);
    Ok(code)
}

/// Convert a currency code back to a string, stripping trailing nulls.
pub fn code_to_string(code: &CurrencyCode) -> String {
    let end = code.iter().position(|&b| b == 0).unwrap_or(8);
    String::from_utf8_lossy(&code[..end]).into_owned()
}

/// The asset class a mix operates on.
///
/// Selected once at creation and immutable afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Holding {
    /// The native coin of the ledger.
    Coin,
    /// A custom asset, identified by its registry id.
    Asset(HoldingId),
    /// A custom currency, identified by its registry id.
    Currency(HoldingId),
}

impl Holding {
    /// Whether this is the native coin.
    pub fn is_coin(&self) -> bool {
        matches!(self, Holding::Coin)
    }

    /// The registry id for non-native holdings.
    pub fn id(&self) -> Option<HoldingId> {
        match self {
            Holding::Coin => None,
            Holding::Asset(id) | Holding::Currency(id) => Some(*id),
        }
    }

    /// A short name for logging.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Holding::Coin => "coin",
            Holding::Asset(_) => "asset",
            Holding::Currency(_) => "currency",
        }
    }
}

/// Registry entry for a custom asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Total issued supply; a mix amount may not exceed it.
    pub total_supply: u64,
}

/// Registry entry for a custom currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// 8-byte currency code.
    pub code: CurrencyCode,
    /// Inactive currencies cannot be mixed.
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        let code = code_from_str("VUSD").unwrap();
        assert_eq!(&code[..4], b"VUSD");
        assert_eq!(code_to_string(&code), "VUSD");
    }

    #[test]
    fn test_code_too_long() {
        assert!(matches!(code_from_str("TOOLONGCODE"), Err(CodeError::TooLong)));
    }

    #[test]
    fn test_holding_accessors() {
        let id = [9u8; 20];
        assert!(Holding::Coin.is_coin());
        assert_eq!(Holding::Coin.id(), None);
        assert_eq!(Holding::Asset(id).id(), Some(id));
        assert_eq!(Holding::Currency(id).kind_name(), "currency");
    }

    #[test]
    fn test_holding_serialization() {
        let holding = Holding::Asset([3u8; 20]);
        let bytes = crate::serialization::serialize(&holding).unwrap();
        let recovered: Holding = crate::serialization::deserialize(&bytes).unwrap();
        assert_eq!(holding, recovered);
    }
}

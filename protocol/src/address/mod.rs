//! # Address Classification
//!
//! Custody pipelines receive addresses from many places: user input,
//! counterparties, our own key-management system. This module answers two
//! questions about them without touching the network:
//!
//! 1. Given a raw ed25519 public key, which addresses can it appear as?
//!    ([`derive_from_public_key`])
//! 2. Given a string, is it a well-formed account, contract or muxed
//!    address? ([`validate_format`])
//!
//! Whether an address also *exists* on chain is answered by
//! [`crate::rpc::verify_address_on_chain`], which fills in
//! [`AddressVerification::exists_on_chain`].
//!
//! An address that fails format validation is a *result*, not an error.
//! Only malformed key material handed to derivation is an error.

mod keys;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crypto::strkey::{self, Version};
use crate::error::{Error, Result};
use crate::xdr::decode_hex;

pub use keys::{AccountId, ContractId, MuxedAccount};

/// Which encoding an address uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AddressKind {
    Account,
    Contract,
    Muxed,
}

impl fmt::Display for AddressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressKind::Account => write!(f, "ACCOUNT"),
            AddressKind::Contract => write!(f, "CONTRACT"),
            AddressKind::Muxed => write!(f, "MUXED"),
        }
    }
}

/// An encoded address together with the raw key it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    /// Lowercase hex of the 32-byte key, without a `0x` prefix.
    pub raw_public_key_hex: String,
    /// StrKey form.
    pub encoded: String,
    pub kind: AddressKind,
}

impl Address {
    /// Parses a StrKey address of any supported kind.
    ///
    /// For a muxed address the raw key is the underlying account key.
    pub fn parse(s: &str) -> Result<Self> {
        let (version, payload) =
            strkey::decode_any(s).map_err(|e| Error::InvalidAddress(format!("{s}: {e}")))?;
        let kind = match version {
            Version::AccountId => AddressKind::Account,
            Version::Contract => AddressKind::Contract,
            Version::MuxedAccount => AddressKind::Muxed,
            other => {
                return Err(Error::InvalidAddress(format!(
                    "{s}: {other:?} keys are not addresses"
                )))
            }
        };
        Ok(Self {
            raw_public_key_hex: hex::encode(&payload[..32]),
            encoded: s.to_string(),
            kind,
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

/// Format-derived classification of an address string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressVerification {
    pub format_valid: bool,
    pub is_account: bool,
    pub is_contract: bool,
    pub is_muxed: bool,
    /// `None` until an on-chain lookup has been performed.
    pub exists_on_chain: Option<bool>,
}

impl AddressVerification {
    /// The single kind this address decoded as, if any.
    pub fn kind(&self) -> Option<AddressKind> {
        if self.is_account {
            Some(AddressKind::Account)
        } else if self.is_contract {
            Some(AddressKind::Contract)
        } else if self.is_muxed {
            Some(AddressKind::Muxed)
        } else {
            None
        }
    }
}

/// Derives the two addresses a raw ed25519 key can take: an account
/// address and a contract address over the same 32 bytes.
///
/// The key must be exactly 64 hex characters, optionally `0x`-prefixed.
pub fn derive_from_public_key(raw_key_hex: &str) -> Result<Vec<Address>> {
    let trimmed = raw_key_hex.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if digits.len() != 64 {
        return Err(Error::MalformedKey(format!(
            "expected 64 hex characters, got {}",
            digits.len()
        )));
    }
    let bytes = decode_hex(digits).map_err(|e| Error::MalformedKey(e.to_string()))?;
    let mut key = [0u8; 32];
    key.copy_from_slice(&bytes);

    let raw_public_key_hex = hex::encode(key);
    Ok(vec![
        Address {
            raw_public_key_hex: raw_public_key_hex.clone(),
            encoded: AccountId(key).to_strkey(),
            kind: AddressKind::Account,
        },
        Address {
            raw_public_key_hex,
            encoded: ContractId(key).to_strkey(),
            kind: AddressKind::Contract,
        },
    ])
}

/// Classifies `address` against the account, contract and muxed encodings
/// independently. Never fails; a malformed string yields all-false.
pub fn validate_format(address: &str) -> AddressVerification {
    let address = address.trim();
    let is_account = strkey::decode(Version::AccountId, address).is_ok();
    let is_contract = strkey::decode(Version::Contract, address).is_ok();
    let is_muxed = strkey::decode(Version::MuxedAccount, address).is_ok();
    AddressVerification {
        format_valid: is_account || is_contract || is_muxed,
        is_account,
        is_contract,
        is_muxed,
        exists_on_chain: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "3a5c6f1e2d4b8a9c7e0f1a2b3c4d5e6f708192a3b4c5d6e7f8091a2b3c4bdb4a";

    #[test]
    fn test_derive_yields_account_and_contract() {
        let addresses = derive_from_public_key(KEY_HEX).unwrap();
        assert_eq!(addresses.len(), 2);
        assert_eq!(addresses[0].kind, AddressKind::Account);
        assert_eq!(addresses[1].kind, AddressKind::Contract);
        assert!(addresses[0].encoded.starts_with('G'));
        assert!(addresses[1].encoded.starts_with('C'));
        assert_eq!(addresses[0].raw_public_key_hex, KEY_HEX);
        assert_eq!(addresses[1].raw_public_key_hex, KEY_HEX);
    }

    #[test]
    fn test_derive_accepts_0x_prefix() {
        let prefixed = format!("0x{KEY_HEX}");
        assert_eq!(
            derive_from_public_key(&prefixed).unwrap(),
            derive_from_public_key(KEY_HEX).unwrap()
        );
    }

    #[test]
    fn test_derive_rejects_65_chars() {
        let long = format!("{KEY_HEX}0");
        assert!(matches!(
            derive_from_public_key(&long),
            Err(Error::MalformedKey(_))
        ));
    }

    #[test]
    fn test_derive_rejects_short_and_non_hex() {
        assert!(matches!(
            derive_from_public_key(&KEY_HEX[..63]),
            Err(Error::MalformedKey(_))
        ));
        let bad = format!("zz{}", &KEY_HEX[2..]);
        assert!(matches!(derive_from_public_key(&bad), Err(Error::MalformedKey(_))));
    }

    #[test]
    fn test_validate_account_and_contract() {
        let addresses = derive_from_public_key(KEY_HEX).unwrap();

        let account = validate_format(&addresses[0].encoded);
        assert!(account.format_valid && account.is_account);
        assert!(!account.is_contract && !account.is_muxed);
        assert_eq!(account.exists_on_chain, None);

        let contract = validate_format(&addresses[1].encoded);
        assert!(contract.format_valid && contract.is_contract);
        assert_eq!(contract.kind(), Some(AddressKind::Contract));
    }

    #[test]
    fn test_validate_muxed() {
        let muxed = MuxedAccount::MuxedEd25519 {
            id: 42,
            ed25519: [4; 32],
        }
        .to_string();
        let v = validate_format(&muxed);
        assert!(v.format_valid && v.is_muxed);
        assert!(!v.is_account);
    }

    #[test]
    fn test_validate_garbage_is_not_an_error() {
        let v = validate_format("definitely-not-an-address");
        assert_eq!(v, AddressVerification::default());
        // A secret seed is a valid strkey but not an address.
        let seed = strkey::encode(Version::Seed, &[1; 32]);
        assert!(!validate_format(&seed).format_valid);
    }

    #[test]
    fn test_parse_muxed_reports_underlying_key() {
        let muxed = MuxedAccount::MuxedEd25519 {
            id: 1,
            ed25519: [0xab; 32],
        }
        .to_string();
        let parsed = Address::parse(&muxed).unwrap();
        assert_eq!(parsed.kind, AddressKind::Muxed);
        assert_eq!(parsed.raw_public_key_hex, hex::encode([0xab; 32]));
    }
}

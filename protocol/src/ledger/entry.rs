//! Decoding of ledger-entry records into balances and contract data.
//!
//! Only the leading fields of account and trustline entries are parsed;
//! the trailing extension unions (liabilities, sponsorship) are skipped so
//! entries written by newer protocol versions still decode. Contract data
//! entries carry their extension first and are decoded in full.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::key::{entry_type_name, ContractDataDurability, LedgerKey};
use crate::address::AccountId;
use crate::asset::{Asset, TrustLineAsset};
use crate::config::{AMOUNT_DECIMALS, HOME_DOMAIN_MAX, STROOPS_PER_UNIT};
use crate::error::{Error, Result};
use crate::transaction::soroban::{ScAddress, ScContractInstance, ScVal};
use crate::transaction::types::Signer;
use crate::xdr::{XdrCodec, XdrError, XdrReader};

const LEDGER_ENTRY_ACCOUNT: i32 = 0;
const LEDGER_ENTRY_TRUSTLINE: i32 = 1;
const LEDGER_ENTRY_CONTRACT_DATA: i32 = 6;
const MAX_SIGNERS: usize = 20;

/// An amount held by an account, in stroops.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Balance {
    pub amount: i64,
    pub asset: Asset,
}

impl Balance {
    /// Amount as a 7-decimal string, e.g. `12.5000000`.
    pub fn display_amount(&self) -> String {
        format_amount(self.amount)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.display_amount(), self.asset)
    }
}

/// Formats a stroop amount with the network's seven decimal places.
pub fn format_amount(stroops: i64) -> String {
    let sign = if stroops < 0 { "-" } else { "" };
    let abs = stroops.unsigned_abs();
    let unit = STROOPS_PER_UNIT as u64;
    format!(
        "{sign}{}.{:0width$}",
        abs / unit,
        abs % unit,
        width = AMOUNT_DECIMALS as usize
    )
}

/// The leading fields of an account entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountEntry {
    pub account_id: AccountId,
    pub balance: i64,
    pub seq_num: i64,
    pub num_sub_entries: u32,
    pub inflation_dest: Option<AccountId>,
    pub flags: u32,
    pub home_domain: String,
    /// Master weight, low, medium and high thresholds.
    pub thresholds: [u8; 4],
    pub signers: Vec<Signer>,
}

impl AccountEntry {
    fn decode_prefix(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(Self {
            account_id: AccountId::decode(r)?,
            balance: r.read_i64()?,
            seq_num: r.read_i64()?,
            num_sub_entries: r.read_u32()?,
            inflation_dest: r.read_option()?,
            flags: r.read_u32()?,
            home_domain: r.read_string(HOME_DOMAIN_MAX, "HomeDomain")?,
            thresholds: r.read_fixed::<4>()?,
            signers: r.read_array(MAX_SIGNERS, "signers")?,
        })
    }
}

/// The leading fields of a trustline entry for an issued asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustLineEntry {
    pub account_id: AccountId,
    pub asset: Asset,
    pub balance: i64,
    pub limit: i64,
    pub flags: u32,
}

impl TrustLineEntry {
    fn decode_prefix(r: &mut XdrReader<'_>) -> Result<Self> {
        let account_id = AccountId::decode(r)?;
        let asset = match TrustLineAsset::decode(r)? {
            TrustLineAsset::Asset(asset) => asset,
            // Pool shares are not an Asset; surface the discriminant.
            TrustLineAsset::PoolShare(_) => return Err(Error::UnknownAssetType(3)),
        };
        Ok(Self {
            account_id,
            asset,
            balance: r.read_i64()?,
            limit: r.read_i64()?,
            flags: r.read_u32()?,
        })
    }
}

/// A decoded `LedgerEntryData` record of a balance-bearing kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEntryData {
    Account(AccountEntry),
    Trustline(TrustLineEntry),
}

impl LedgerEntryData {
    /// Decodes an account or trustline record. Any other kind, or empty
    /// input, is [`Error::UnexpectedLedgerEntryKind`].
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            warn!("empty ledger entry");
            return Err(Error::UnexpectedLedgerEntryKind("empty".to_string()));
        }
        let mut r = XdrReader::new(bytes);
        match r.read_i32()? {
            LEDGER_ENTRY_ACCOUNT => Ok(Self::Account(AccountEntry::decode_prefix(&mut r)?)),
            LEDGER_ENTRY_TRUSTLINE => Ok(Self::Trustline(TrustLineEntry::decode_prefix(&mut r)?)),
            other => {
                let kind = entry_type_name(other);
                warn!(kind, entry_type = other, "unexpected ledger entry kind");
                Err(Error::UnexpectedLedgerEntryKind(kind.to_string()))
            }
        }
    }

    pub fn decode_base64(s: &str) -> Result<Self> {
        Self::decode(&decode_base64(s)?)
    }

    pub fn balance(&self) -> Balance {
        match self {
            Self::Account(entry) => Balance {
                amount: entry.balance,
                asset: Asset::Native,
            },
            Self::Trustline(entry) => Balance {
                amount: entry.balance,
                asset: entry.asset.clone(),
            },
        }
    }
}

fn decode_base64(s: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(s.trim())
        .map_err(|e| XdrError::InvalidBase64(e.to_string()).into())
}

/// Decodes an account or trustline record into the balance it carries.
pub fn decode_entry(bytes: &[u8]) -> Result<Balance> {
    Ok(LedgerEntryData::decode(bytes)?.balance())
}

/// [`decode_entry`] over base64, the form ledger readers return.
pub fn decode_entry_base64(s: &str) -> Result<Balance> {
    decode_entry(&decode_base64(s)?)
}

/// Reads the sequence number out of an account record.
pub fn decode_account_sequence(bytes: &[u8]) -> Result<i64> {
    match LedgerEntryData::decode(bytes)? {
        LedgerEntryData::Account(entry) => Ok(entry.seq_num),
        LedgerEntryData::Trustline(_) => {
            Err(Error::UnexpectedLedgerEntryKind("trustline".to_string()))
        }
    }
}

/// A contract storage record: `(contract, key, durability) -> val`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDataEntry {
    pub contract: ScAddress,
    pub key: ScVal,
    pub durability: ContractDataDurability,
    pub val: ScVal,
}

impl ContractDataEntry {
    /// Decodes a `LedgerEntryData` record of the contract-data kind.
    /// Any other kind is [`Error::UnexpectedLedgerEntryKind`].
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut r = XdrReader::new(bytes);
        match r.read_i32()? {
            LEDGER_ENTRY_CONTRACT_DATA => {}
            other => {
                let kind = entry_type_name(other);
                warn!(kind, entry_type = other, "expected a contract data entry");
                return Err(Error::UnexpectedLedgerEntryKind(kind.to_string()));
            }
        }
        match r.read_i32()? {
            0 => {}
            value => {
                return Err(XdrError::InvalidDiscriminant {
                    type_name: "ExtensionPoint",
                    value,
                }
                .into())
            }
        }
        let entry = Self {
            contract: ScAddress::decode(&mut r)?,
            key: ScVal::decode(&mut r)?,
            durability: ContractDataDurability::decode(&mut r)?,
            val: ScVal::decode(&mut r)?,
        };
        r.finish()?;
        Ok(entry)
    }

    pub fn decode_base64(s: &str) -> Result<Self> {
        Self::decode(&decode_base64(s)?)
    }

    /// The key this entry is stored under.
    pub fn ledger_key(&self) -> LedgerKey {
        LedgerKey::ContractData {
            contract: self.contract.clone(),
            key: self.key.clone(),
            durability: self.durability,
        }
    }

    /// The instance a contract's instance entry holds.
    pub fn instance(&self) -> Option<&ScContractInstance> {
        match (&self.key, &self.val) {
            (ScVal::LedgerKeyContractInstance, ScVal::ContractInstance(instance)) => Some(instance),
            _ => None,
        }
    }
}

/// [`ContractDataEntry::decode_base64`] as a free function.
pub fn decode_contract_data(s: &str) -> Result<ContractDataEntry> {
    ContractDataEntry::decode_base64(s)
}

//! Ledger keys: the lookup keys a ledger reader accepts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::{AccountId, ContractId};
use crate::asset::{PoolId, TrustLineAsset};
use crate::config::DATA_ENTRY_MAX;
use crate::error::{Error, Result};
use crate::transaction::soroban::{ScAddress, ScVal};
use crate::transaction::types::ClaimableBalanceId;
use crate::xdr::{XdrCodec, XdrError, XdrReader, XdrWriter};

/// Lifetime class of a contract storage entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractDataDurability {
    Temporary,
    Persistent,
}

impl fmt::Display for ContractDataDurability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temporary => write!(f, "temporary"),
            Self::Persistent => write!(f, "persistent"),
        }
    }
}

impl XdrCodec for ContractDataDurability {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(match self {
            Self::Temporary => 0,
            Self::Persistent => 1,
        });
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        match r.read_i32()? {
            0 => Ok(Self::Temporary),
            1 => Ok(Self::Persistent),
            value => Err(XdrError::InvalidDiscriminant {
                type_name: "ContractDataDurability",
                value,
            }
            .into()),
        }
    }
}

/// Key of a single ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LedgerKey {
    Account {
        account_id: AccountId,
    },
    Trustline {
        account_id: AccountId,
        asset: TrustLineAsset,
    },
    Offer {
        seller_id: AccountId,
        offer_id: i64,
    },
    Data {
        account_id: AccountId,
        data_name: String,
    },
    ClaimableBalance {
        balance_id: ClaimableBalanceId,
    },
    LiquidityPool {
        pool_id: PoolId,
    },
    ContractData {
        contract: ScAddress,
        key: ScVal,
        durability: ContractDataDurability,
    },
    ContractCode {
        hash: [u8; 32],
    },
    ConfigSetting {
        config_setting_id: i32,
    },
    Ttl {
        key_hash: [u8; 32],
    },
}

impl LedgerKey {
    /// The key of a contract's instance entry, which exists exactly when
    /// the contract is deployed.
    pub fn contract_instance(contract: &ContractId) -> Self {
        LedgerKey::ContractData {
            contract: ScAddress::Contract(*contract),
            key: ScVal::LedgerKeyContractInstance,
            durability: ContractDataDurability::Persistent,
        }
    }

    /// XDR `LedgerEntryType` discriminant.
    pub fn entry_type(&self) -> i32 {
        match self {
            LedgerKey::Account { .. } => 0,
            LedgerKey::Trustline { .. } => 1,
            LedgerKey::Offer { .. } => 2,
            LedgerKey::Data { .. } => 3,
            LedgerKey::ClaimableBalance { .. } => 4,
            LedgerKey::LiquidityPool { .. } => 5,
            LedgerKey::ContractData { .. } => 6,
            LedgerKey::ContractCode { .. } => 7,
            LedgerKey::ConfigSetting { .. } => 8,
            LedgerKey::Ttl { .. } => 9,
        }
    }
}

/// Human-readable name of a `LedgerEntryType` discriminant.
pub fn entry_type_name(entry_type: i32) -> &'static str {
    match entry_type {
        0 => "account",
        1 => "trustline",
        2 => "offer",
        3 => "data",
        4 => "claimable_balance",
        5 => "liquidity_pool",
        6 => "contract_data",
        7 => "contract_code",
        8 => "config_setting",
        9 => "ttl",
        _ => "unknown",
    }
}

impl XdrCodec for LedgerKey {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(self.entry_type());
        match self {
            LedgerKey::Account { account_id } => account_id.encode(w),
            LedgerKey::Trustline { account_id, asset } => {
                account_id.encode(w);
                asset.encode(w);
            }
            LedgerKey::Offer {
                seller_id,
                offer_id,
            } => {
                seller_id.encode(w);
                w.write_i64(*offer_id);
            }
            LedgerKey::Data {
                account_id,
                data_name,
            } => {
                account_id.encode(w);
                w.write_var_opaque(data_name.as_bytes());
            }
            LedgerKey::ClaimableBalance { balance_id } => balance_id.encode(w),
            LedgerKey::LiquidityPool { pool_id } => pool_id.encode(w),
            LedgerKey::ContractData {
                contract,
                key,
                durability,
            } => {
                contract.encode(w);
                key.encode(w);
                durability.encode(w);
            }
            LedgerKey::ContractCode { hash } => w.write_fixed_opaque(hash),
            LedgerKey::ConfigSetting { config_setting_id } => w.write_i32(*config_setting_id),
            LedgerKey::Ttl { key_hash } => w.write_fixed_opaque(key_hash),
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(match r.read_i32()? {
            0 => LedgerKey::Account {
                account_id: AccountId::decode(r)?,
            },
            1 => LedgerKey::Trustline {
                account_id: AccountId::decode(r)?,
                asset: TrustLineAsset::decode(r)?,
            },
            2 => LedgerKey::Offer {
                seller_id: AccountId::decode(r)?,
                offer_id: r.read_i64()?,
            },
            3 => LedgerKey::Data {
                account_id: AccountId::decode(r)?,
                data_name: r.read_string(DATA_ENTRY_MAX, "DataName")?,
            },
            4 => LedgerKey::ClaimableBalance {
                balance_id: ClaimableBalanceId::decode(r)?,
            },
            5 => LedgerKey::LiquidityPool {
                pool_id: PoolId::decode(r)?,
            },
            6 => LedgerKey::ContractData {
                contract: ScAddress::decode(r)?,
                key: ScVal::decode(r)?,
                durability: ContractDataDurability::decode(r)?,
            },
            7 => LedgerKey::ContractCode {
                hash: r.read_fixed::<32>()?,
            },
            8 => LedgerKey::ConfigSetting {
                config_setting_id: r.read_i32()?,
            },
            9 => LedgerKey::Ttl {
                key_hash: r.read_fixed::<32>()?,
            },
            value => {
                return Err(Error::from(XdrError::InvalidDiscriminant {
                    type_name: "LedgerEntryType",
                    value,
                }))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Asset;

    #[test]
    fn test_account_key_layout() {
        let key = LedgerKey::Account {
            account_id: AccountId([1; 32]),
        };
        let bytes = key.to_xdr();
        assert_eq!(bytes.len(), 4 + 36);
        assert_eq!(&bytes[..8], &[0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_contract_instance_key() {
        let key = LedgerKey::contract_instance(&ContractId([2; 32]));
        let bytes = key.to_xdr();
        // type 6, SCAddress contract (1) + hash, SCV_LEDGER_KEY_CONTRACT_INSTANCE (20), persistent (1)
        assert_eq!(&bytes[..8], &[0, 0, 0, 6, 0, 0, 0, 1]);
        assert_eq!(&bytes[40..], &[0, 0, 0, 20, 0, 0, 0, 1]);
        assert_eq!(LedgerKey::from_xdr(&bytes).unwrap(), key);
    }

    #[test]
    fn test_every_key_kind_roundtrips() {
        let keys = vec![
            LedgerKey::Trustline {
                account_id: AccountId([1; 32]),
                asset: Asset::alphanum12("LONGCODE", AccountId([2; 32])).unwrap().into(),
            },
            LedgerKey::Trustline {
                account_id: AccountId([1; 32]),
                asset: TrustLineAsset::PoolShare(PoolId([3; 32])),
            },
            LedgerKey::Offer {
                seller_id: AccountId([1; 32]),
                offer_id: 42,
            },
            LedgerKey::Data {
                account_id: AccountId([1; 32]),
                data_name: "kyc".to_string(),
            },
            LedgerKey::ClaimableBalance {
                balance_id: ClaimableBalanceId([4; 32]),
            },
            LedgerKey::LiquidityPool {
                pool_id: PoolId([5; 32]),
            },
            LedgerKey::ContractData {
                contract: ScAddress::Contract(ContractId([6; 32])),
                key: ScVal::symbol("Balance").unwrap(),
                durability: ContractDataDurability::Temporary,
            },
            LedgerKey::ContractCode { hash: [7; 32] },
            LedgerKey::ConfigSetting {
                config_setting_id: 3,
            },
            LedgerKey::Ttl { key_hash: [8; 32] },
        ];
        for key in keys {
            assert_eq!(LedgerKey::from_xdr(&key.to_xdr()).unwrap(), key);
        }
    }

    #[test]
    fn test_entry_type_names() {
        assert_eq!(entry_type_name(0), "account");
        assert_eq!(entry_type_name(6), "contract_data");
        assert_eq!(entry_type_name(42), "unknown");
    }
}

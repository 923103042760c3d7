//! # Ledger Entries
//!
//! Balances are not queried directly: the caller asks an external ledger
//! reader for raw entries by key and this module decodes what comes back.
//!
//! ```text
//! key.rs  : LedgerKey for every entry kind, contract-instance helper
//! entry.rs: account / trustline / contract-data decoding, Balance, amount formatting
//! ```
//!
//! The native balance lives on the account entry itself; every issued asset
//! lives on a separate trustline keyed by `(account, asset)`.

mod entry;
mod key;

pub use entry::{
    decode_account_sequence, decode_contract_data, decode_entry, decode_entry_base64, format_amount,
    AccountEntry, Balance, ContractDataEntry, LedgerEntryData, TrustLineEntry,
};
pub use key::{entry_type_name, ContractDataDurability, LedgerKey};

#[cfg(test)]
pub(crate) use entry::tests::{account_entry_xdr, contract_data_entry_xdr, trustline_entry_xdr};

use crate::address::{AccountId, ContractId, MuxedAccount};
use crate::asset::Asset;
use crate::error::{Error, Result};

/// Resolves an account or muxed address to the underlying account.
fn account_of(address: &str) -> Result<AccountId> {
    Ok(address.trim().parse::<MuxedAccount>()?.account_id())
}

/// Key of the account entry that carries `address`'s native balance.
pub fn account_balance_key(address: &str) -> Result<LedgerKey> {
    Ok(LedgerKey::Account {
        account_id: account_of(address)?,
    })
}

/// Key of the trustline that carries `address`'s balance of `asset`.
///
/// The native asset has no trustline and is rejected with
/// [`Error::NativeTrustline`].
pub fn trustline_balance_key(address: &str, asset: &Asset) -> Result<LedgerKey> {
    if asset.is_native() {
        return Err(Error::NativeTrustline);
    }
    Ok(LedgerKey::Trustline {
        account_id: account_of(address)?,
        asset: asset.clone().into(),
    })
}

/// The key holding `address`'s balance of `asset`, whichever kind it is.
pub fn balance_key(address: &str, asset: &Asset) -> Result<LedgerKey> {
    if asset.is_native() {
        account_balance_key(address)
    } else {
        trustline_balance_key(address, asset)
    }
}

/// Key of a contract's instance entry.
pub fn contract_instance_key(contract: &ContractId) -> LedgerKey {
    LedgerKey::contract_instance(contract)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> String {
        AccountId([1; 32]).to_string()
    }

    #[test]
    fn test_native_uses_account_key() {
        assert_eq!(
            balance_key(&address(), &Asset::Native).unwrap(),
            LedgerKey::Account {
                account_id: AccountId([1; 32])
            }
        );
        assert_eq!(
            trustline_balance_key(&address(), &Asset::Native).unwrap_err(),
            Error::NativeTrustline
        );
    }

    #[test]
    fn test_issued_asset_uses_trustline_key() {
        let usdc = Asset::alphanum4("USDC", AccountId([9; 32])).unwrap();
        match balance_key(&address(), &usdc).unwrap() {
            LedgerKey::Trustline { account_id, asset } => {
                assert_eq!(account_id, AccountId([1; 32]));
                assert_eq!(asset, crate::asset::TrustLineAsset::from(usdc));
            }
            other => panic!("expected trustline key, got {other:?}"),
        }
    }

    #[test]
    fn test_muxed_address_maps_to_underlying_account() {
        let muxed = MuxedAccount::MuxedEd25519 {
            id: 3,
            ed25519: [1; 32],
        }
        .to_string();
        assert_eq!(
            account_balance_key(&muxed).unwrap(),
            account_balance_key(&address()).unwrap()
        );
    }

    #[test]
    fn test_contract_address_rejected() {
        let contract = ContractId([1; 32]).to_string();
        assert!(matches!(
            account_balance_key(&contract),
            Err(Error::InvalidAddress(_))
        ));
    }
}

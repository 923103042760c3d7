//! Balance batches, contract storage reads and on-chain address checks
//! over a [`LedgerReader`].

use tracing::{debug, info};

use super::{LedgerReader, RpcError};
use crate::address::{validate_format, AddressVerification, ContractId};
use crate::asset::Asset;
use crate::error::Error;
use crate::ledger::{
    account_balance_key, balance_key, decode_entry_base64, Balance, ContractDataDurability,
    ContractDataEntry, LedgerKey,
};
use crate::transaction::soroban::{ScAddress, ScVal};

/// Fetches `address`'s balances of `assets` in one read.
///
/// Assets are sorted and de-duplicated first, so the same set always
/// produces the same key batch. Assets the account holds no trustline for
/// are absent from the result.
pub async fn fetch_balances<R>(
    reader: &R,
    address: &str,
    assets: &[Asset],
) -> Result<Vec<Balance>, RpcError<R::Error>>
where
    R: LedgerReader + ?Sized,
{
    let mut assets = assets.to_vec();
    assets.sort();
    assets.dedup();

    let keys = assets
        .iter()
        .map(|asset| balance_key(address, asset))
        .collect::<Result<Vec<LedgerKey>, Error>>()?;

    info!(address, assets = keys.len(), "fetching balances");
    let entries = reader
        .get_ledger_entries(&keys)
        .await
        .map_err(RpcError::Collaborator)?;

    let balances = entries
        .iter()
        .map(|entry| decode_entry_base64(&entry.xdr))
        .collect::<Result<Vec<Balance>, Error>>()?;
    debug!(address, found = balances.len(), "decoded balances");
    Ok(balances)
}

/// Reads one contract storage entry. `None` when the entry does not exist.
pub async fn fetch_contract_data<R>(
    reader: &R,
    contract: &ContractId,
    key: ScVal,
    durability: ContractDataDurability,
) -> Result<Option<ContractDataEntry>, RpcError<R::Error>>
where
    R: LedgerReader + ?Sized,
{
    let ledger_key = LedgerKey::ContractData {
        contract: ScAddress::Contract(*contract),
        key,
        durability,
    };
    let entries = reader
        .get_ledger_entries(std::slice::from_ref(&ledger_key))
        .await
        .map_err(RpcError::Collaborator)?;
    let Some(found) = entries.first() else {
        debug!(%contract, %durability, "no contract data entry");
        return Ok(None);
    };

    let entry = ContractDataEntry::decode_base64(&found.xdr)?;
    if entry.ledger_key() != ledger_key {
        return Err(Error::InvalidValue(format!(
            "reader returned contract data for a different key of {contract}"
        ))
        .into());
    }
    Ok(Some(entry))
}

/// Classifies `address` and, when its format is valid, checks whether it
/// exists on chain.
///
/// Accounts are looked up by their account entry, contracts by their
/// persistent instance entry, muxed addresses by the underlying account.
/// A format-invalid address is returned as-is without any read.
pub async fn verify_address_on_chain<R>(
    reader: &R,
    address: &str,
) -> Result<AddressVerification, RpcError<R::Error>>
where
    R: LedgerReader + ?Sized,
{
    let mut verification = validate_format(address);
    if !verification.format_valid {
        return Ok(verification);
    }

    let key = if verification.is_contract {
        let contract: ContractId = address.trim().parse()?;
        LedgerKey::contract_instance(&contract)
    } else {
        account_balance_key(address)?
    };

    let entries = reader
        .get_ledger_entries(std::slice::from_ref(&key))
        .await
        .map_err(RpcError::Collaborator)?;
    let exists = !entries.is_empty();
    debug!(address, exists, kind = ?verification.kind(), "verified address on chain");

    verification.exists_on_chain = Some(exists);
    Ok(verification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{AccountId, MuxedAccount};
    use crate::asset::TrustLineAsset;
    use crate::ledger::{account_entry_xdr, contract_data_entry_xdr, trustline_entry_xdr};
    use crate::rpc::fakes::FakeLedger;

    fn usdc() -> Asset {
        Asset::alphanum4("USDC", AccountId([9; 32])).unwrap()
    }

    fn ledger() -> FakeLedger {
        let holder = AccountId([1; 32]);
        let mut ledger = FakeLedger::default();
        ledger.insert(
            &LedgerKey::Account { account_id: holder },
            account_entry_xdr(holder, 25_000_000, 4),
        );
        ledger.insert(
            &LedgerKey::Trustline {
                account_id: holder,
                asset: TrustLineAsset::from(usdc()),
            },
            trustline_entry_xdr(holder, &usdc().into(), 7_000_000),
        );
        ledger
    }

    #[tokio::test]
    async fn test_fetch_balances_sorts_and_dedups() {
        let ledger = ledger();
        let address = AccountId([1; 32]).to_string();
        let balances = fetch_balances(&ledger, &address, &[usdc(), Asset::Native, usdc()])
            .await
            .unwrap();
        assert_eq!(
            balances,
            vec![
                Balance {
                    amount: 25_000_000,
                    asset: Asset::Native
                },
                Balance {
                    amount: 7_000_000,
                    asset: usdc()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_trustline_is_absent() {
        let ledger = ledger();
        let eurc = Asset::alphanum4("EURC", AccountId([9; 32])).unwrap();
        let balances = fetch_balances(&ledger, &AccountId([1; 32]).to_string(), &[eurc])
            .await
            .unwrap();
        assert!(balances.is_empty());
    }

    #[tokio::test]
    async fn test_collaborator_error_passes_through() {
        let ledger = FakeLedger {
            fail: true,
            ..Default::default()
        };
        let err = fetch_balances(&ledger, &AccountId([1; 32]).to_string(), &[Asset::Native])
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::Collaborator(_)));
    }

    #[tokio::test]
    async fn test_invalid_address_is_core_error() {
        let ledger = ledger();
        let err = fetch_balances(&ledger, "not-an-address", &[Asset::Native])
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::Core(Error::InvalidAddress(_))));
        assert_eq!(ledger.reads(), 0);
    }

    #[tokio::test]
    async fn test_verify_account_and_muxed() {
        let ledger = ledger();
        let account = verify_address_on_chain(&ledger, &AccountId([1; 32]).to_string())
            .await
            .unwrap();
        assert!(account.is_account);
        assert_eq!(account.exists_on_chain, Some(true));

        let muxed = MuxedAccount::MuxedEd25519 {
            id: 12,
            ed25519: [1; 32],
        };
        let verification = verify_address_on_chain(&ledger, &muxed.to_string()).await.unwrap();
        assert!(verification.is_muxed);
        assert_eq!(verification.exists_on_chain, Some(true));

        let unknown = verify_address_on_chain(&ledger, &AccountId([3; 32]).to_string())
            .await
            .unwrap();
        assert_eq!(unknown.exists_on_chain, Some(false));
    }

    #[tokio::test]
    async fn test_verify_contract_uses_instance_key() {
        let contract = ContractId([4; 32]);
        let mut ledger = FakeLedger::default();
        ledger.insert(&LedgerKey::contract_instance(&contract), vec![0, 0, 0, 6]);

        let verification = verify_address_on_chain(&ledger, &contract.to_string()).await.unwrap();
        assert!(verification.is_contract);
        assert_eq!(verification.exists_on_chain, Some(true));
    }

    #[tokio::test]
    async fn test_fetch_contract_data() {
        let contract = ContractId([4; 32]);
        let key = ScVal::symbol("Admin").unwrap();
        let admin = ScVal::Address(ScAddress::Account(AccountId([1; 32])));
        let mut ledger = FakeLedger::default();
        ledger.insert(
            &LedgerKey::ContractData {
                contract: ScAddress::Contract(contract),
                key: key.clone(),
                durability: ContractDataDurability::Persistent,
            },
            contract_data_entry_xdr(
                ScAddress::Contract(contract),
                &key,
                ContractDataDurability::Persistent,
                &admin,
            ),
        );

        let entry = fetch_contract_data(&ledger, &contract, key.clone(), ContractDataDurability::Persistent)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.val, admin);

        // Same key, other durability: a different entry.
        let missing = fetch_contract_data(&ledger, &contract, key, ContractDataDurability::Temporary)
            .await
            .unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_contract_data_under_wrong_key_rejected() {
        let contract = ContractId([4; 32]);
        let mut ledger = FakeLedger::default();
        ledger.insert(
            &LedgerKey::contract_instance(&contract),
            contract_data_entry_xdr(
                ScAddress::Contract(ContractId([5; 32])),
                &ScVal::LedgerKeyContractInstance,
                ContractDataDurability::Persistent,
                &ScVal::Void,
            ),
        );
        let err = fetch_contract_data(
            &ledger,
            &contract,
            ScVal::LedgerKeyContractInstance,
            ContractDataDurability::Persistent,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RpcError::Core(Error::InvalidValue(_))));
    }

    #[tokio::test]
    async fn test_invalid_format_skips_read() {
        let ledger = ledger();
        let verification = verify_address_on_chain(&ledger, "GBAD").await.unwrap();
        assert!(!verification.format_valid);
        assert_eq!(verification.exists_on_chain, None);
        assert_eq!(ledger.reads(), 0);
    }
}

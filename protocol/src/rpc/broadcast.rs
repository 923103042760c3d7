//! Submission over a [`Broadcaster`].

use tracing::{info, warn};

use super::{Broadcaster, RpcError, TransactionReceipt, TransactionStatus};
use crate::config::NetworkId;
use crate::error::Error;
use crate::transaction::SignedEnvelope;

/// Submits a signed envelope and returns its hash.
///
/// The hash the broadcaster reports must equal the one recomputed when the
/// envelope was assembled; a different hash means the network saw a
/// different transaction and is reported as [`Error::HashMismatch`].
pub async fn submit<B>(broadcaster: &B, signed: &SignedEnvelope) -> Result<String, RpcError<B::Error>>
where
    B: Broadcaster + ?Sized,
{
    let expected = signed.hash_hex();
    info!(hash = %expected, bytes = signed.canonical_bytes.len(), "broadcasting transaction");

    let reported = broadcaster
        .send_transaction(&signed.to_base64())
        .await
        .map_err(RpcError::Collaborator)?;

    if !signed.matches(&reported) {
        warn!(expected = %expected, reported = %reported, "broadcaster reported a different hash");
        return Err(Error::HashMismatch {
            expected,
            computed: reported,
        }
        .into());
    }
    Ok(expected)
}

/// Status of a previously submitted transaction.
pub async fn transaction_status<B>(
    broadcaster: &B,
    hash_hex: &str,
) -> Result<TransactionStatus, RpcError<B::Error>>
where
    B: Broadcaster + ?Sized,
{
    let response = broadcaster
        .get_transaction(hash_hex)
        .await
        .map_err(RpcError::Collaborator)?;
    Ok(response.status)
}

/// Looks a transaction up and decodes its receipt.
pub async fn fetch_receipt<B>(
    broadcaster: &B,
    hash_hex: &str,
    network_id: NetworkId,
) -> Result<TransactionReceipt, RpcError<B::Error>>
where
    B: Broadcaster + ?Sized,
{
    let response = broadcaster
        .get_transaction(hash_hex)
        .await
        .map_err(RpcError::Collaborator)?;
    Ok(TransactionReceipt::from_response(&response, network_id)?)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::address::AccountId;
    use crate::asset::Asset;
    use crate::config::Network;
    use crate::rpc::fakes::FakeBroadcaster;
    use crate::transaction::{attach_signatures, Operation, TransactionBuilder};

    fn signed() -> SignedEnvelope {
        let tx = TransactionBuilder::new(AccountId([1; 32]).into(), 3, Network::Testnet.id())
            .operation(Operation::payment(AccountId([2; 32]).into(), Asset::Native, 1))
            .build()
            .unwrap();
        attach_signatures(&tx.to_canonical_bytes(), &[], Network::Testnet.id()).unwrap()
    }

    fn broadcaster(reported_hash: Option<String>) -> FakeBroadcaster {
        FakeBroadcaster {
            network_id: Network::Testnet.id(),
            reported_hash,
            submitted: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn test_submit_returns_recomputed_hash() {
        let signed = signed();
        let b = broadcaster(None);
        assert_eq!(submit(&b, &signed).await.unwrap(), signed.hash_hex());
        assert_eq!(
            transaction_status(&b, &signed.hash_hex()).await.unwrap(),
            TransactionStatus::Success
        );
        assert_eq!(
            transaction_status(&b, &"00".repeat(32)).await.unwrap(),
            TransactionStatus::NotFound
        );
    }

    #[tokio::test]
    async fn test_receipt_after_submit() {
        let signed = signed();
        let b = broadcaster(None);
        submit(&b, &signed).await.unwrap();

        let receipt = fetch_receipt(&b, &signed.hash_hex(), Network::Testnet.id())
            .await
            .unwrap();
        assert_eq!(receipt.fee_charged, Some(100));
        assert!(receipt.result.unwrap().is_success());
        assert_eq!(receipt.payments.len(), 1);
        assert_eq!(receipt.payments[0].amount, 1);
        assert_eq!(receipt.source, Some(AccountId([1; 32]).to_strkey()));

        let missing = fetch_receipt(&b, &"00".repeat(32), Network::Testnet.id())
            .await
            .unwrap();
        assert_eq!(missing.status, TransactionStatus::NotFound);
        assert!(missing.payments.is_empty());
    }

    #[tokio::test]
    async fn test_submit_rejects_different_hash() {
        let b = broadcaster(Some("ff".repeat(32)));
        assert!(matches!(
            submit(&b, &signed()).await,
            Err(RpcError::Core(Error::HashMismatch { .. }))
        ));
    }
}

//! End-to-end integration tests for the signing core.
//!
//! These tests exercise the full custody flow: address derivation,
//! transaction construction, signing-request distribution, external
//! signing (ed25519-dalek keys stand in for the custody signer),
//! signature reattachment, hash verification, and broadcast through an
//! in-memory collaborator.
//!
//! Each test stands alone. No shared state, no network.

mod common;

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use thiserror::Error;

use stellar_custody::address::{AccountId, MuxedAccount};
use stellar_custody::asset::Asset;
use stellar_custody::config::Network;
use stellar_custody::ledger::LedgerKey;
use stellar_custody::rpc::{
    self, AccountInfo, Broadcaster, LedgerEntryResult, LedgerReader, RpcError, TransactionResponse,
    TransactionResultCode, TransactionStatus,
};
use stellar_custody::transaction::types::{ClaimPredicate, Claimant};
use stellar_custody::transaction::{
    attach_signatures, attach_signatures_checked, prepare_unsigned, verify_signature, EnvelopeVersion,
    Memo, Operation, OperationBody, Signature, TimeBounds, Transaction, TransactionBuilder,
    TransactionEnvelope,
};
use stellar_custody::xdr::XdrCodec;
use stellar_custody::{derive_from_public_key, validate_format, AddressKind, Error};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn signer(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

fn account_of(key: &SigningKey) -> AccountId {
    AccountId(key.verifying_key().to_bytes())
}

/// What the external signer does with a request: sign the raw hash bytes.
fn external_sign(key: &SigningKey, hash_hex: &str) -> Signature {
    let hash = hex::decode(hash_hex).unwrap();
    let sig = key.sign(&hash);
    Signature::new(key.verifying_key().to_bytes(), sig.to_bytes().to_vec())
}

fn payment_tx(source: &SigningKey, version: EnvelopeVersion) -> Transaction {
    TransactionBuilder::new(account_of(source).into(), 4_294_967_297, Network::Testnet.id())
        .operation(Operation::payment(
            account_of(&signer(9)).into(),
            Asset::Native,
            25_000_000,
        ))
        .memo(Memo::Id(7))
        .time_bounds(TimeBounds::new(0, 1_900_000_000))
        .envelope_version(version)
        .build()
        .unwrap()
}

#[derive(Debug, Error)]
#[error("{0}")]
struct FakeError(String);

#[derive(Default)]
struct MemoryNetwork {
    entries: HashMap<String, Vec<u8>>,
    /// Submitted envelopes keyed by hash.
    submitted: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl LedgerReader for MemoryNetwork {
    type Error = FakeError;

    async fn get_ledger_entries(&self, keys: &[LedgerKey]) -> Result<Vec<LedgerEntryResult>, FakeError> {
        use base64::Engine as _;
        Ok(keys
            .iter()
            .filter_map(|key| {
                let key = key.to_xdr_base64();
                self.entries.get(&key).map(|entry| LedgerEntryResult {
                    key,
                    xdr: base64::engine::general_purpose::STANDARD.encode(entry),
                    last_modified_ledger: 10,
                })
            })
            .collect())
    }

    async fn get_account(&self, address: &str) -> Result<AccountInfo, FakeError> {
        Err(FakeError(format!("{address} not found")))
    }
}

#[async_trait]
impl Broadcaster for MemoryNetwork {
    type Error = FakeError;

    async fn send_transaction(&self, envelope_base64: &str) -> Result<String, FakeError> {
        let envelope = TransactionEnvelope::from_base64(envelope_base64, Network::Testnet.id())
            .map_err(|e| FakeError(e.to_string()))?;
        let hash = envelope.tx.hash_hex();
        self.submitted
            .lock()
            .unwrap()
            .insert(hash.clone(), envelope_base64.to_string());
        Ok(hash)
    }

    async fn get_transaction(&self, hash_hex: &str) -> Result<TransactionResponse, FakeError> {
        let Some(envelope_xdr) = self.submitted.lock().unwrap().get(hash_hex).cloned() else {
            return Ok(TransactionResponse::not_found(hash_hex, 12));
        };
        let fee = TransactionEnvelope::from_base64(&envelope_xdr, Network::Testnet.id())
            .map_err(|e| FakeError(e.to_string()))?
            .tx
            .fee();
        Ok(TransactionResponse {
            status: TransactionStatus::Success,
            tx_hash: hash_hex.to_string(),
            latest_ledger: 12,
            ledger: Some(11),
            created_at: Some(1_700_000_000),
            application_order: Some(1),
            fee_bump: false,
            envelope_xdr: Some(envelope_xdr),
            result_xdr: Some(common::success_result(i64::from(fee))),
        })
    }
}

// ---------------------------------------------------------------------------
// Custody flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_multisig_flow() {
    let source = signer(1);
    let cosigner = signer(2);
    let tx = payment_tx(&source, EnvelopeVersion::V1);

    // 1. Distribute one request per signer.
    let signers = [account_of(&source).to_string(), account_of(&cosigner).to_string()];
    let bundle = prepare_unsigned(&tx, &signers).unwrap();
    assert_eq!(bundle.requests.len(), 2);
    assert!(bundle.requests.iter().all(|r| r.hash_to_sign == bundle.hash));

    // 2. External signers sign, in either order.
    let sigs = vec![
        external_sign(&cosigner, &bundle.requests[1].hash_to_sign),
        external_sign(&source, &bundle.requests[0].hash_to_sign),
    ];

    // 3. Reattach and check against the hash that was signed.
    let unsigned = hex::decode(&bundle.envelope_xdr_hex).unwrap();
    let signed = attach_signatures_checked(&unsigned, &sigs, Network::Testnet.id(), &bundle.hash).unwrap();
    assert_eq!(signed.hash_hex(), tx.hash_hex());
    for sig in &sigs {
        verify_signature(&signed.recomputed_hash, sig).unwrap();
    }

    let envelope = TransactionEnvelope::decode(&signed.canonical_bytes, Network::Testnet.id()).unwrap();
    assert_eq!(envelope.tx, tx);
    assert_eq!(envelope.signatures.len(), 2);
    assert_eq!(envelope.signatures[0].hint, sigs[0].hint);

    // 4. Broadcast.
    let network = MemoryNetwork::default();
    let hash = rpc::submit(&network, &signed).await.unwrap();
    assert_eq!(hash, bundle.hash);
    assert_eq!(
        rpc::transaction_status(&network, &hash).await.unwrap(),
        TransactionStatus::Success
    );

    // 5. Read the receipt back.
    let receipt = rpc::fetch_receipt(&network, &hash, Network::Testnet.id()).await.unwrap();
    assert_eq!(receipt.result, Some(TransactionResultCode::Success));
    assert_eq!(receipt.fee_charged, Some(i64::from(tx.fee())));
    assert_eq!(receipt.source, Some(account_of(&source).to_string()));
    assert_eq!(receipt.payments.len(), 1);
    assert_eq!(receipt.payments[0].to, account_of(&signer(9)).to_string());
    assert_eq!(receipt.payments[0].amount, 25_000_000);
}

#[test]
fn signatures_collected_in_batches_accumulate() {
    let source = signer(1);
    let tx = payment_tx(&source, EnvelopeVersion::V1);
    let first = attach_signatures(
        &tx.to_canonical_bytes(),
        &[external_sign(&source, &tx.hash_hex())],
        Network::Testnet.id(),
    )
    .unwrap();
    let second = attach_signatures(
        &first.canonical_bytes,
        &[external_sign(&signer(2), &tx.hash_hex())],
        Network::Testnet.id(),
    )
    .unwrap();

    assert_eq!(first.recomputed_hash, second.recomputed_hash);
    let envelope = TransactionEnvelope::decode(&second.canonical_bytes, Network::Testnet.id()).unwrap();
    assert_eq!(envelope.signatures.len(), 2);
}

#[test]
fn v0_envelope_signs_like_v1() {
    let source = signer(3);
    let v0 = payment_tx(&source, EnvelopeVersion::V0);
    let v1 = payment_tx(&source, EnvelopeVersion::V1);
    assert_eq!(v0.hash_hex(), v1.hash_hex());

    let sig = external_sign(&source, &v0.hash_hex());
    let signed = attach_signatures(&v0.to_canonical_bytes(), &[sig.clone()], Network::Testnet.id()).unwrap();
    assert_eq!(&signed.canonical_bytes[..4], &[0, 0, 0, 0]);
    verify_signature(&v1.signing_hash(), &sig).unwrap();
}

#[test]
fn tampered_envelope_fails_checked_attach() {
    let source = signer(1);
    let tx = payment_tx(&source, EnvelopeVersion::V1);
    let requested = tx.hash_hex();

    let tampered = tx.to_builder().fee(1_000_000).build().unwrap();
    let err = attach_signatures_checked(
        &tampered.to_canonical_bytes(),
        &[external_sign(&source, &requested)],
        Network::Testnet.id(),
        &requested,
    )
    .unwrap_err();
    assert!(matches!(err, Error::HashMismatch { .. }));
}

// ---------------------------------------------------------------------------
// Wire compatibility
// ---------------------------------------------------------------------------

/// Envelope and hash for a fixed payment, cross-checked against an
/// independent encoder.
#[test]
fn known_payment_vector() {
    let tx = TransactionBuilder::new(AccountId([1; 32]).into(), 2, Network::Testnet.id())
        .operation(Operation::payment(AccountId([2; 32]).into(), Asset::Native, 10_000_000))
        .build()
        .unwrap();

    use base64::Engine as _;
    let b64 = base64::engine::general_purpose::STANDARD.encode(tx.to_canonical_bytes());
    assert_eq!(
        b64,
        "AAAAAgAAAAABAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQAAAGQAAAAAAAAAAgAAAAAAAAAAAAAAAQAAAAAAAAABAAAAAAICAgICAgICAgICAgICAgICAgICAgICAgICAgICAgICAAAAAAAAAAAAmJaAAAAAAAAAAAA="
    );
    assert_eq!(
        tx.hash_hex(),
        "27e3ad86f491835f31476debed7e2a7fb7db748f80763daafbc90e12aa9d891f"
    );

    let v0 = tx.to_builder().envelope_version(EnvelopeVersion::V0).build().unwrap();
    let b64 = base64::engine::general_purpose::STANDARD.encode(v0.to_canonical_bytes());
    assert_eq!(
        b64,
        "AAAAAAEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAAAAZAAAAAAAAAACAAAAAAAAAAAAAAABAAAAAAAAAAEAAAAAAgICAgICAgICAgICAgICAgICAgICAgICAgICAgICAgIAAAAAAAAAAACYloAAAAAAAAAAAA=="
    );
    assert_eq!(v0.hash_hex(), tx.hash_hex());
}

#[test]
fn native_contract_ids_match_network() {
    assert_eq!(
        Asset::Native.contract_id(&Network::Testnet.id()).to_string(),
        "CDLZFC3SYJYDZT7K67VZ75HPJVIEUVNIXF47ZG2FB2RMQQVU2HHGCYSC"
    );
    assert_eq!(
        Asset::Native.contract_id(&Network::Public.id()).to_string(),
        "CAS3J7GYLGXMF6TDJBBYYSE3HQ6BBSMLNUQ34T6TZMYMW2EVH34XOWMA"
    );
}

#[test]
fn claimable_balance_id_is_known_before_submission() {
    let source = signer(5);
    let muxed = MuxedAccount::MuxedEd25519 {
        id: 99,
        ed25519: source.verifying_key().to_bytes(),
    };
    let tx = TransactionBuilder::new(muxed, 100, Network::Testnet.id())
        .operation(OperationBody::CreateClaimableBalance {
            asset: Asset::Native,
            amount: 1_000,
            claimants: vec![Claimant {
                destination: account_of(&signer(6)),
                predicate: ClaimPredicate::Unconditional,
            }],
        })
        .build()
        .unwrap();

    // The id ignores the multiplexing id on the source.
    let plain = TransactionBuilder::new(account_of(&source).into(), 100, Network::Testnet.id())
        .operations(tx.operations().to_vec())
        .build()
        .unwrap();
    assert_eq!(tx.derive_dependent_id(0).unwrap(), plain.derive_dependent_id(0).unwrap());
    assert_eq!(tx.derive_dependent_id(0).unwrap().to_hex().len(), 72);
}

// ---------------------------------------------------------------------------
// Addresses and balances
// ---------------------------------------------------------------------------

#[test]
fn derived_addresses_validate() {
    let key = hex::encode(signer(1).verifying_key().to_bytes());
    let derived = derive_from_public_key(&format!("0x{key}")).unwrap();
    assert_eq!(derived.len(), 2);

    let account = validate_format(&derived[0].encoded);
    assert!(account.format_valid && account.is_account);
    assert_eq!(account.kind(), Some(AddressKind::Account));

    let contract = validate_format(&derived[1].encoded);
    assert!(contract.format_valid && contract.is_contract);

    assert!(matches!(
        derive_from_public_key(&format!("{key}a")),
        Err(Error::MalformedKey(_))
    ));
}

#[tokio::test]
async fn balances_and_existence_through_reader() {
    let holder = account_of(&signer(1));
    let usdc = Asset::alphanum4("USDC", account_of(&signer(8))).unwrap();

    let mut network = MemoryNetwork::default();
    network.entries.insert(
        LedgerKey::Account { account_id: holder }.to_xdr_base64(),
        common::account_entry(holder, 100_000_000),
    );
    network.entries.insert(
        stellar_custody::ledger::trustline_balance_key(&holder.to_string(), &usdc)
            .unwrap()
            .to_xdr_base64(),
        common::trustline_entry(holder, &usdc, 420_000_000),
    );

    let balances = rpc::fetch_balances(&network, &holder.to_string(), &[usdc.clone(), Asset::Native])
        .await
        .unwrap();
    assert_eq!(balances.len(), 2);
    assert_eq!(balances[0].asset, Asset::Native);
    assert_eq!(balances[0].display_amount(), "10.0000000");
    assert_eq!(balances[1].asset, usdc);
    assert_eq!(balances[1].amount, 420_000_000);

    let verification = rpc::verify_address_on_chain(&network, &holder.to_string())
        .await
        .unwrap();
    assert_eq!(verification.exists_on_chain, Some(true));

    let stranger = rpc::verify_address_on_chain(&network, &account_of(&signer(7)).to_string())
        .await
        .unwrap();
    assert_eq!(stranger.exists_on_chain, Some(false));

    let bogus: Result<_, RpcError<FakeError>> = rpc::verify_address_on_chain(&network, "nope").await;
    assert!(!bogus.unwrap().format_valid);
}

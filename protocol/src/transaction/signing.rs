//! Multi-party signing coordination.
//!
//! The coordinator never holds a private key. It hands each external
//! signer the signing hash of a transaction, then reassembles the raw
//! signatures they return into a broadcast-ready envelope.
//!
//! Signing is a separate step from building because the signers are not
//! available at construction time (hardware module, remote custody
//! service). Every request for one transaction carries the same hash, so
//! signatures can be collected in any order and attached in one batch.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::builder::Transaction;
use super::envelope::{DecoratedSignature, TransactionEnvelope};
use crate::address::AccountId;
use crate::config::{NetworkId, MAX_SIGNATURES, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use crate::crypto::{signature_hint, verify_raw};
use crate::error::{Error, Result};
use crate::xdr::decode_hex;

/// What one external signer is asked to sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningRequest {
    /// Hex-encoded 32-byte signing hash.
    pub hash_to_sign: String,
    pub signer_address: String,
}

/// A raw signature returned by an external signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub signer_public_key: [u8; PUBLIC_KEY_LENGTH],
    pub raw_signature: Vec<u8>,
    /// Always the last four bytes of `signer_public_key`.
    pub hint: [u8; 4],
}

impl Signature {
    pub fn new(signer_public_key: [u8; PUBLIC_KEY_LENGTH], raw_signature: Vec<u8>) -> Self {
        Self {
            hint: signature_hint(&signer_public_key),
            signer_public_key,
            raw_signature,
        }
    }

    /// Builds a signature from the hex forms signers usually return.
    pub fn from_hex(public_key_hex: &str, signature_hex: &str) -> Result<Self> {
        let key = decode_hex(public_key_hex)
            .map_err(|_| Error::MalformedKey(public_key_hex.to_string()))?;
        let key: [u8; PUBLIC_KEY_LENGTH] = key
            .try_into()
            .map_err(|_| Error::MalformedKey(public_key_hex.to_string()))?;
        let raw = decode_hex(signature_hex)?;
        Ok(Self::new(key, raw))
    }

    /// The signer's account address.
    pub fn signer(&self) -> AccountId {
        AccountId(self.signer_public_key)
    }
}

/// The final envelope, ready for a broadcaster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    pub canonical_bytes: Vec<u8>,
    /// Signing hash recomputed from `canonical_bytes` after attaching.
    pub recomputed_hash: [u8; 32],
}

impl SignedEnvelope {
    pub fn hash_hex(&self) -> String {
        hex::encode(self.recomputed_hash)
    }

    /// The envelope as base64 XDR, the form submission endpoints accept.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.canonical_bytes)
    }

    /// Whether the recomputed hash equals `expected_hex` (case-insensitive,
    /// optional `0x`).
    pub fn matches(&self, expected_hex: &str) -> bool {
        let expected = expected_hex.trim();
        let expected = expected.strip_prefix("0x").unwrap_or(expected);
        expected.eq_ignore_ascii_case(&self.hash_hex())
    }
}

/// Everything a custody workflow distributes before signing: the unsigned
/// envelope, its hash, and one request per signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    pub envelope_xdr_hex: String,
    pub hash: String,
    pub requests: Vec<SigningRequest>,
}

/// Computes the signing hash once and returns one request per signer.
pub fn prepare_for_signing<S: AsRef<str>>(
    tx: &Transaction,
    signer_addresses: &[S],
) -> Result<Vec<SigningRequest>> {
    if signer_addresses.is_empty() {
        return Err(Error::EmptySignerSet);
    }
    let hash = tx.hash_hex();
    debug!(hash = %hash, signers = signer_addresses.len(), "prepared signing requests");

    Ok(signer_addresses
        .iter()
        .map(|signer| SigningRequest {
            hash_to_sign: hash.clone(),
            signer_address: signer.as_ref().to_string(),
        })
        .collect())
}

/// [`prepare_for_signing`] bundled with the unsigned envelope bytes.
pub fn prepare_unsigned<S: AsRef<str>>(
    tx: &Transaction,
    signer_addresses: &[S],
) -> Result<UnsignedTransaction> {
    let requests = prepare_for_signing(tx, signer_addresses)?;
    Ok(UnsignedTransaction {
        envelope_xdr_hex: hex::encode(tx.to_canonical_bytes()),
        hash: tx.hash_hex(),
        requests,
    })
}

/// Decodes `unsigned_bytes`, appends every signature in the order given,
/// and re-serializes.
///
/// Signatures already present on the envelope are kept. The hint stored
/// for each signature is always derived from its public key. An empty
/// `signatures` slice is allowed and yields the envelope unchanged.
///
/// All-or-nothing: any malformed signature fails the whole batch.
pub fn attach_signatures(
    unsigned_bytes: &[u8],
    signatures: &[Signature],
    network_id: NetworkId,
) -> Result<SignedEnvelope> {
    let mut envelope = TransactionEnvelope::decode(unsigned_bytes, network_id)?;

    let total = envelope.signatures.len() + signatures.len();
    if total > MAX_SIGNATURES {
        return Err(Error::TooManySignatures {
            count: total,
            max: MAX_SIGNATURES,
        });
    }

    for sig in signatures {
        if sig.raw_signature.len() != SIGNATURE_LENGTH {
            return Err(Error::MalformedSignature {
                expected: SIGNATURE_LENGTH,
                got: sig.raw_signature.len(),
            });
        }
        envelope.signatures.push(DecoratedSignature {
            hint: signature_hint(&sig.signer_public_key),
            signature: sig.raw_signature.clone(),
        });
    }

    let canonical_bytes = envelope.to_bytes();
    // Hash what will actually be broadcast, not the in-memory copy.
    let recomputed_hash = TransactionEnvelope::decode(&canonical_bytes, network_id)?
        .tx
        .signing_hash();

    debug!(
        hash = %hex::encode(recomputed_hash),
        signatures = envelope.signatures.len(),
        "attached signatures"
    );
    Ok(SignedEnvelope {
        canonical_bytes,
        recomputed_hash,
    })
}

/// [`attach_signatures`], then rejects the envelope unless its recomputed
/// hash equals the hash the signers were asked to sign.
pub fn attach_signatures_checked(
    unsigned_bytes: &[u8],
    signatures: &[Signature],
    network_id: NetworkId,
    expected_hash_hex: &str,
) -> Result<SignedEnvelope> {
    let signed = attach_signatures(unsigned_bytes, signatures, network_id)?;
    if !signed.matches(expected_hash_hex) {
        warn!(
            expected = expected_hash_hex,
            computed = %signed.hash_hex(),
            "recomputed hash differs from requested hash"
        );
        return Err(Error::HashMismatch {
            expected: expected_hash_hex.to_string(),
            computed: signed.hash_hex(),
        });
    }
    Ok(signed)
}

/// Checks an externally produced signature against a signing hash.
///
/// Attaching never requires this; it exists for operators who want to
/// reject a bad signer before broadcast.
pub fn verify_signature(hash: &[u8; 32], signature: &Signature) -> Result<()> {
    verify_raw(&signature.signer_public_key, hash, &signature.raw_signature).map_err(|e| {
        debug!(signer = %signature.signer(), error = %e, "signature rejected");
        Error::SignatureVerificationFailed {
            signer: signature.signer().to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Asset;
    use crate::config::Network;
    use crate::transaction::builder::TransactionBuilder;
    use crate::transaction::envelope::EnvelopeVersion;
    use crate::transaction::operation::Operation;
    use ed25519_dalek::{Signer, SigningKey};

    fn signer(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    fn tx() -> Transaction {
        let source = AccountId(signer(1).verifying_key().to_bytes());
        TransactionBuilder::new(source.into(), 11, Network::Testnet.id())
            .operation(Operation::payment(AccountId([2; 32]).into(), Asset::Native, 5))
            .build()
            .unwrap()
    }

    fn sign(key: &SigningKey, tx: &Transaction) -> Signature {
        let sig = key.sign(&tx.signing_hash());
        Signature::new(key.verifying_key().to_bytes(), sig.to_bytes().to_vec())
    }

    #[test]
    fn test_requests_share_one_hash() {
        let tx = tx();
        let requests = prepare_for_signing(&tx, &["GA", "GB", "GC"]).unwrap();
        assert_eq!(requests.len(), 3);
        assert!(requests.iter().all(|r| r.hash_to_sign == tx.hash_hex()));
        assert_eq!(requests[1].signer_address, "GB");
    }

    #[test]
    fn test_empty_signer_set_rejected() {
        let none: [&str; 0] = [];
        assert_eq!(prepare_for_signing(&tx(), &none).unwrap_err(), Error::EmptySignerSet);
    }

    #[test]
    fn test_unsigned_bundle() {
        let tx = tx();
        let bundle = prepare_unsigned(&tx, &["GA"]).unwrap();
        assert_eq!(bundle.envelope_xdr_hex, hex::encode(tx.to_canonical_bytes()));
        assert_eq!(bundle.hash, tx.hash_hex());
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["requests"][0]["hashToSign"], tx.hash_hex());
    }

    #[test]
    fn test_attach_preserves_order_and_hash() {
        let tx = tx();
        let a = sign(&signer(1), &tx);
        let b = sign(&signer(2), &tx);
        let signed = attach_signatures(&tx.to_canonical_bytes(), &[a.clone(), b.clone()], Network::Testnet.id())
            .unwrap();
        assert_eq!(signed.recomputed_hash, tx.signing_hash());
        assert!(signed.matches(&tx.hash_hex()));

        let envelope = TransactionEnvelope::decode(&signed.canonical_bytes, Network::Testnet.id()).unwrap();
        assert_eq!(envelope.signatures.len(), 2);
        assert_eq!(envelope.signatures[0].hint, a.hint);
        assert_eq!(envelope.signatures[1].signature, b.raw_signature);
    }

    #[test]
    fn test_attach_is_deterministic() {
        let tx = tx();
        let sigs = [sign(&signer(1), &tx), sign(&signer(2), &tx)];
        let first = attach_signatures(&tx.to_canonical_bytes(), &sigs, Network::Testnet.id()).unwrap();
        let second = attach_signatures(&tx.to_canonical_bytes(), &sigs, Network::Testnet.id()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_signature_list_allowed() {
        let tx = tx();
        let signed = attach_signatures(&tx.to_canonical_bytes(), &[], Network::Testnet.id()).unwrap();
        assert_eq!(signed.canonical_bytes, tx.to_canonical_bytes());
        assert_eq!(signed.recomputed_hash, tx.signing_hash());
    }

    #[test]
    fn test_caller_hint_is_ignored() {
        let tx = tx();
        let mut sig = sign(&signer(1), &tx);
        let expected = sig.hint;
        sig.hint = [0xde, 0xad, 0xbe, 0xef];
        let signed = attach_signatures(&tx.to_canonical_bytes(), &[sig], Network::Testnet.id()).unwrap();
        let envelope = TransactionEnvelope::decode(&signed.canonical_bytes, Network::Testnet.id()).unwrap();
        assert_eq!(envelope.signatures[0].hint, expected);
    }

    #[test]
    fn test_malformed_signature_rejected() {
        let tx = tx();
        let sig = Signature::new([1; 32], vec![0; 63]);
        assert_eq!(
            attach_signatures(&tx.to_canonical_bytes(), &[sig], Network::Testnet.id()).unwrap_err(),
            Error::MalformedSignature { expected: 64, got: 63 }
        );
    }

    #[test]
    fn test_too_many_signatures_rejected() {
        let tx = tx();
        let sigs: Vec<Signature> = (0..21).map(|i| Signature::new([i; 32], vec![0; 64])).collect();
        assert_eq!(
            attach_signatures(&tx.to_canonical_bytes(), &sigs, Network::Testnet.id()).unwrap_err(),
            Error::TooManySignatures { count: 21, max: 20 }
        );
    }

    #[test]
    fn test_malformed_bytes_are_decode_errors() {
        assert!(matches!(
            attach_signatures(&[0, 0, 0, 2, 1], &[], Network::Testnet.id()),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_checked_attach_detects_mismatch() {
        let tx = tx();
        let other = tx.to_builder().fee(999).build().unwrap();
        let err = attach_signatures_checked(&tx.to_canonical_bytes(), &[], Network::Testnet.id(), &other.hash_hex())
            .unwrap_err();
        assert!(matches!(err, Error::HashMismatch { .. }));

        let upper = format!("0x{}", tx.hash_hex().to_uppercase());
        assert!(attach_signatures_checked(&tx.to_canonical_bytes(), &[], Network::Testnet.id(), &upper).is_ok());
    }

    #[test]
    fn test_v0_envelope_signatures_verify() {
        let tx = tx().to_builder().envelope_version(EnvelopeVersion::V0).build().unwrap();
        let sig = sign(&signer(1), &tx);
        let signed = attach_signatures(&tx.to_canonical_bytes(), &[sig.clone()], Network::Testnet.id()).unwrap();
        assert_eq!(&signed.canonical_bytes[..4], &[0, 0, 0, 0]);
        verify_signature(&signed.recomputed_hash, &sig).unwrap();
    }

    #[test]
    fn test_verify_signature() {
        let tx = tx();
        let sig = sign(&signer(1), &tx);
        verify_signature(&tx.signing_hash(), &sig).unwrap();

        let wrong_key = Signature::new(signer(2).verifying_key().to_bytes(), sig.raw_signature.clone());
        assert!(matches!(
            verify_signature(&tx.signing_hash(), &wrong_key),
            Err(Error::SignatureVerificationFailed { .. })
        ));
    }

    #[test]
    fn test_signature_from_hex() {
        let key = signer(3).verifying_key().to_bytes();
        let sig = Signature::from_hex(&hex::encode(key), &hex::encode([7u8; 64])).unwrap();
        assert_eq!(sig.signer_public_key, key);
        assert_eq!(sig.hint, key[28..]);
        assert!(matches!(
            Signature::from_hex("abcd", &hex::encode([7u8; 64])),
            Err(Error::MalformedKey(_))
        ));
    }
}

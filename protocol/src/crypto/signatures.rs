//! # Signature Verification
//!
//! This core never signs: private keys live with the external signer. What
//! it does need is to check a signature it was handed, and to compute the
//! hint that accompanies each signature in an envelope.
//!
//! ## Strictness
//!
//! `verify_strict` from `ed25519-dalek` rejects small-order keys and
//! non-canonical signatures, matching what the network's validators accept.

use ed25519_dalek::{Signature as DalekSignature, VerifyingKey};
use thiserror::Error;

use crate::config::{HINT_LENGTH, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

/// Errors during signature verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("signature verification failed")]
    VerificationFailed,

    #[error("invalid signature bytes: expected 64 bytes, got {0}")]
    InvalidSignatureBytes(usize),

    #[error("invalid public key")]
    InvalidPublicKey,
}

/// The 4-byte hint for a signer: the last four bytes of its public key.
pub fn signature_hint(public_key: &[u8; PUBLIC_KEY_LENGTH]) -> [u8; HINT_LENGTH] {
    let mut hint = [0u8; HINT_LENGTH];
    hint.copy_from_slice(&public_key[PUBLIC_KEY_LENGTH - HINT_LENGTH..]);
    hint
}

/// Verify a raw ed25519 signature.
///
/// Takes the signature as a slice because it usually arrives straight off
/// the wire from an external signer; anything but 64 bytes is rejected
/// before touching the curve.
pub fn verify_raw(
    public_key_bytes: &[u8; PUBLIC_KEY_LENGTH],
    message: &[u8],
    signature_bytes: &[u8],
) -> Result<(), SignatureError> {
    let signature_bytes: &[u8; SIGNATURE_LENGTH] = signature_bytes
        .try_into()
        .map_err(|_| SignatureError::InvalidSignatureBytes(signature_bytes.len()))?;

    let verifying_key =
        VerifyingKey::from_bytes(public_key_bytes).map_err(|_| SignatureError::InvalidPublicKey)?;

    let signature = DalekSignature::from_bytes(signature_bytes);

    verifying_key
        .verify_strict(message, &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    fn signer(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    #[test]
    fn test_verify_valid_signature() {
        let key = signer(1);
        let sig = key.sign(b"payload");
        assert!(verify_raw(&key.verifying_key().to_bytes(), b"payload", &sig.to_bytes()).is_ok());
    }

    #[test]
    fn test_wrong_message_fails() {
        let key = signer(1);
        let sig = key.sign(b"payload");
        assert_eq!(
            verify_raw(&key.verifying_key().to_bytes(), b"other", &sig.to_bytes()),
            Err(SignatureError::VerificationFailed)
        );
    }

    #[test]
    fn test_wrong_key_fails() {
        let sig = signer(1).sign(b"payload");
        let other = signer(2).verifying_key().to_bytes();
        assert!(verify_raw(&other, b"payload", &sig.to_bytes()).is_err());
    }

    #[test]
    fn test_short_signature_rejected() {
        let key = signer(3).verifying_key().to_bytes();
        assert_eq!(
            verify_raw(&key, b"payload", &[0u8; 63]),
            Err(SignatureError::InvalidSignatureBytes(63))
        );
    }

    #[test]
    fn test_hint_is_key_suffix() {
        let mut key = [0u8; 32];
        key[28..].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(signature_hint(&key), [0xde, 0xad, 0xbe, 0xef]);
    }
}

//! # Cryptographic Primitives
//!
//! Deliberately small. The core hashes and verifies; it never holds a
//! private key and never signs.
//!
//! - **SHA-256** for every hash the network defines.
//! - **StrKey** (versioned base32 + CRC16) for human-facing keys.
//! - **Ed25519** verification of signatures produced by the external signer.

pub mod hash;
pub mod signatures;
pub mod strkey;

pub use hash::{sha256, sha256_array, sha256_concat};
pub use signatures::{signature_hint, verify_raw, SignatureError};
pub use strkey::{StrKeyError, Version as StrKeyVersion};

// Copyright (c) 2026 Stellar Custody Contributors. MIT License.
// See LICENSE for details.

//! # Stellar Custody: Signing Core
//!
//! The part of a custodial signing pipeline that must be exactly right:
//! canonical transaction bytes, the network-scoped signing hash, and the
//! reassembly of externally produced signatures into a broadcast-ready
//! envelope. Private keys never enter this crate.
//!
//! ## Architecture
//!
//! The crate is split into modules that mirror the concerns of a custody
//! signer:
//!
//! - **xdr**: The network's binary codec. Strict on decode, deterministic on encode.
//! - **crypto**: SHA-256, StrKey address encoding, ed25519 verification.
//! - **address**: Address classification and derivation from raw keys.
//! - **asset**: Assets, their ordering, and deterministic contract ids.
//! - **transaction**: Building, hashing, and multi-party signing.
//! - **ledger**: Ledger keys, balances, and contract storage entries.
//! - **rpc**: Collaborator interfaces (ledger reader, fee oracle, broadcaster) and receipts.
//! - **config**: Network passphrases and protocol limits.
//!
//! ## Design Philosophy
//!
//! 1. Bytes are a compatibility contract. Every layout matches the network's
//!    published format bit-for-bit.
//! 2. The signing hash never depends on signatures.
//! 3. Every failure is an explicit [`Error`]; nothing panics on bad input.
//! 4. If it touches a hash, it has tests. Plural.

pub mod address;
pub mod asset;
pub mod config;
pub mod crypto;
pub mod error;
pub mod ledger;
pub mod rpc;
pub mod transaction;
pub mod xdr;

pub use address::{derive_from_public_key, validate_format, Address, AddressKind, AddressVerification};
pub use asset::Asset;
pub use config::{Network, NetworkId};
pub use error::{Error, Result};
pub use ledger::{decode_entry, Balance};
pub use transaction::{
    attach_signatures, attach_signatures_checked, prepare_for_signing, EnvelopeVersion,
    Signature, SignedEnvelope, SigningRequest, Transaction, TransactionBuilder,
};

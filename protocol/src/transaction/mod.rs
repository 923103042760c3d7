//! # Transaction Module
//!
//! Construction, canonical encoding, hashing, and multi-party signing of
//! network transactions. Every payment, trustline change, or contract call
//! the custody pipeline submits is represented as a [`Transaction`].
//!
//! ## Architecture
//!
//! ```text
//! types.rs    : Memo, bounds, preconditions, signer keys, claim predicates
//! soroban.rs  : Contract values, host functions, auth entries, resource data
//! operation.rs: Every operation body and its wire codec
//! builder.rs  : Transaction and the fluent TransactionBuilder
//! envelope.rs : V0/V1 envelopes, signing hash, dependent ids
//! signing.rs  : Signing requests and signature reattachment
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: Use [`TransactionBuilder`] to assemble the transaction fields.
//! 2. **Prepare**: Call [`prepare_for_signing`] to get one request per signer.
//! 3. **Sign**: External signers sign the hash; keys never enter this crate.
//! 4. **Attach**: [`attach_signatures_checked`] reassembles the envelope and
//!    checks the recomputed hash against the one that was signed.
//! 5. **Broadcast**: Hand [`SignedEnvelope::canonical_bytes`] to a broadcaster.
//!
//! ## Design Decisions
//!
//! - The signing hash is `sha256(network_id || ENVELOPE_TYPE_TX || body)`.
//!   It never covers signatures, so attaching cannot change what was signed.
//! - The in-memory model is version-agnostic. V0 and V1 layouts are
//!   produced on demand and hash identically.
//! - Amounts are `i64` stroops. No floating point anywhere near money.

pub mod builder;
pub mod envelope;
pub mod operation;
pub mod signing;
pub mod soroban;
pub mod types;

pub use builder::{Transaction, TransactionBuilder};
pub use envelope::{DecoratedSignature, EnvelopeVersion, TransactionEnvelope};
pub use operation::{Operation, OperationBody};
pub use signing::{
    attach_signatures, attach_signatures_checked, prepare_for_signing, prepare_unsigned,
    verify_signature, Signature, SignedEnvelope, SigningRequest, UnsignedTransaction,
};
pub use types::{ClaimableBalanceId, Memo, Preconditions, TimeBounds};

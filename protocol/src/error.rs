//! Error types shared by every component of the core.
//!
//! All failures are local validation failures raised synchronously at the
//! point of malformed input. Nothing here is retried; retry policy belongs
//! to whoever drives the external collaborators.
//!
//! An address whose format is simply invalid is *not* an error: address
//! classification returns a verification result with `format_valid = false`.
//! Only malformed key material handed to key derivation is.

use thiserror::Error;

use crate::xdr::XdrError;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the signing core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A raw public key was not exactly 32 bytes of hex (optionally `0x`-prefixed).
    #[error("malformed key: {0}")]
    MalformedKey(String),

    /// An asset discriminant outside native / alphanum4 / alphanum12.
    #[error("unknown asset type: {0}")]
    UnknownAssetType(i32),

    /// An envelope discriminant other than V0 (0) or V1 (2).
    #[error("unsupported envelope version: {0}")]
    UnsupportedEnvelopeVersion(i32),

    /// The bytes could not be decoded as the expected structure.
    #[error("decode error: {0}")]
    Decode(#[from] XdrError),

    /// A raw signature with the wrong byte length.
    #[error("malformed signature: expected {expected} bytes, got {got}")]
    MalformedSignature {
        /// Required signature length.
        expected: usize,
        /// Length that was supplied.
        got: usize,
    },

    /// `prepare_for_signing` was called without any signer.
    #[error("signer set is empty")]
    EmptySignerSet,

    /// A ledger entry that cannot be turned into a balance.
    #[error("unexpected ledger entry kind: {0}")]
    UnexpectedLedgerEntryKind(String),

    /// Asset code length outside the bounds of its kind.
    #[error("asset code length {len} out of range for {kind} ({min}..={max})")]
    CodeLengthOutOfRange {
        /// Asset kind being constructed.
        kind: &'static str,
        /// Offending code length.
        len: usize,
        /// Minimum allowed length.
        min: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// Asset code containing characters other than ASCII letters and digits.
    #[error("invalid asset code: {0:?}")]
    InvalidAssetCode(String),

    /// A transaction must carry at least one operation.
    #[error("transaction must contain at least one operation")]
    EmptyOperations,

    /// More operations than the network accepts in one transaction.
    #[error("too many operations: {count} (max {max})")]
    TooManyOperations {
        /// Number of operations supplied.
        count: usize,
        /// Network limit.
        max: usize,
    },

    /// More decorated signatures than an envelope can carry.
    #[error("too many signatures: {count} (max {max})")]
    TooManySignatures {
        /// Total signatures after attaching.
        count: usize,
        /// Network limit.
        max: usize,
    },

    /// Memo text longer than the network limit.
    #[error("memo text is {len} bytes (max {max})")]
    MemoTooLong {
        /// Byte length supplied.
        len: usize,
        /// Network limit.
        max: usize,
    },

    /// The transaction uses a feature the legacy V0 envelope cannot express.
    #[error("transaction cannot be encoded as a V0 envelope: {0}")]
    IncompatibleWithV0(&'static str),

    /// A string that is not a valid address of the required kind.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A built value that its own decoder would reject, e.g. a path or
    /// claimant list longer than the network allows.
    #[error("exceeds a wire-format limit: {0}")]
    WireLimitExceeded(XdrError),

    /// A value that violates a structural limit of the wire format.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// Operation index outside the transaction's operation list.
    #[error("operation index {index} out of range (transaction has {len} operations)")]
    OperationIndexOutOfRange {
        /// Index requested.
        index: usize,
        /// Number of operations in the transaction.
        len: usize,
    },

    /// Dependent ids are only defined for claimable-balance creation.
    #[error("operation {0} does not create a claimable balance")]
    NotClaimableBalanceOperation(usize),

    /// Native balances live on the account entry, not on a trustline.
    #[error("native asset has no trustline; use the account key")]
    NativeTrustline,

    /// Resource-based fee estimation only applies to contract transactions.
    #[error("transaction must contain exactly one invoke-host-function, extend-footprint-ttl or restore-footprint operation")]
    NotSorobanTransaction,

    /// The hash recomputed from an envelope differs from the one expected.
    #[error("hash mismatch: expected {expected}, computed {computed}")]
    HashMismatch {
        /// Hash the caller asked signers to sign (or the network reported).
        expected: String,
        /// Hash recomputed from the envelope body.
        computed: String,
    },

    /// An ed25519 signature does not verify against the given key and hash.
    #[error("signature verification failed for signer {signer}")]
    SignatureVerificationFailed {
        /// Account address of the signer whose signature failed.
        signer: String,
    },
}

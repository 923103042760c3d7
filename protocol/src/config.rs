//! # Network Configuration & Protocol Limits
//!
//! Every protocol constant the core depends on lives here: network
//! passphrases, the limits the network enforces on transactions, and the
//! envelope-type tags that domain-separate every hash we compute.
//!
//! None of these are tunables. They are fixed by the network's published
//! protocol, and a mismatch means the network will reject what we build.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::crypto::hash::sha256_array;
use crate::error::Error;

// ---------------------------------------------------------------------------
// Network Passphrases
// ---------------------------------------------------------------------------

/// Passphrase of the public network.
pub const PUBLIC_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

/// Passphrase of the test network.
pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";

/// Passphrase of the future network (protocol previews).
pub const FUTURENET_PASSPHRASE: &str = "Test SDF Future Network ; October 2022";

// ---------------------------------------------------------------------------
// Envelope Types
// ---------------------------------------------------------------------------

/// Legacy transaction envelope (bare ed25519 source).
pub const ENVELOPE_TYPE_TX_V0: i32 = 0;

/// Current transaction envelope. Also the tag of the signature base.
pub const ENVELOPE_TYPE_TX: i32 = 2;

/// Fee-bump wrapper envelope. Not supported by this core.
pub const ENVELOPE_TYPE_TX_FEE_BUMP: i32 = 5;

/// Hash preimage tag for operation-derived ids (claimable balances).
pub const ENVELOPE_TYPE_OP_ID: i32 = 6;

/// Hash preimage tag for contract id derivation.
pub const ENVELOPE_TYPE_CONTRACT_ID: i32 = 8;

// ---------------------------------------------------------------------------
// Transaction Limits
// ---------------------------------------------------------------------------

/// Minimum inclusion fee per operation, in stroops.
pub const BASE_FEE: u32 = 100;

/// Maximum operations in a single transaction.
pub const MAX_OPERATIONS: usize = 100;

/// Maximum decorated signatures on one envelope.
pub const MAX_SIGNATURES: usize = 20;

/// Maximum byte length of a text memo.
pub const MEMO_TEXT_MAX: usize = 28;

/// Maximum extra signers in a V2 precondition.
pub const MAX_EXTRA_SIGNERS: usize = 2;

/// Maximum hops in a path payment.
pub const MAX_PATH_LENGTH: usize = 5;

/// Maximum claimants on a claimable balance.
pub const MAX_CLAIMANTS: usize = 10;

/// Maximum byte length of an account's home domain.
pub const HOME_DOMAIN_MAX: usize = 32;

/// Maximum byte length of a data entry name and of its value.
pub const DATA_ENTRY_MAX: usize = 64;

/// Maximum payload carried by a signed-payload signer.
pub const SIGNED_PAYLOAD_MAX: usize = 64;

/// Maximum byte length of a contract symbol.
pub const SC_SYMBOL_MAX: usize = 32;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Ed25519 public key length in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Ed25519 signature length in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Signature hint length: the trailing bytes of the signer's public key.
pub const HINT_LENGTH: usize = 4;

/// SHA-256 digest length.
pub const HASH_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// Decimal places of a display amount.
pub const AMOUNT_DECIMALS: u32 = 7;

/// Stroops in one whole unit.
pub const STROOPS_PER_UNIT: i64 = 10_000_000;

// ---------------------------------------------------------------------------
// Network Identity
// ---------------------------------------------------------------------------

/// `SHA-256(passphrase)`. Mixed into every signing hash so a signature for
/// one network can never be replayed on another.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkId([u8; 32]);

impl NetworkId {
    /// Derives the id from a network passphrase.
    pub fn from_passphrase(passphrase: &str) -> Self {
        Self(sha256_array(passphrase.as_bytes()))
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NetworkId({})", self.to_hex())
    }
}

/// A named network or an arbitrary passphrase (standalone / private nets).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Public,
    Testnet,
    Futurenet,
    Custom(String),
}

impl Network {
    pub fn passphrase(&self) -> &str {
        match self {
            Network::Public => PUBLIC_PASSPHRASE,
            Network::Testnet => TESTNET_PASSPHRASE,
            Network::Futurenet => FUTURENET_PASSPHRASE,
            Network::Custom(passphrase) => passphrase,
        }
    }

    pub fn id(&self) -> NetworkId {
        NetworkId::from_passphrase(self.passphrase())
    }

    /// Resolves a passphrase back to a named network where possible.
    pub fn from_passphrase(passphrase: &str) -> Self {
        match passphrase {
            PUBLIC_PASSPHRASE => Network::Public,
            TESTNET_PASSPHRASE => Network::Testnet,
            FUTURENET_PASSPHRASE => Network::Futurenet,
            other => Network::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Public => write!(f, "public"),
            Network::Testnet => write!(f, "testnet"),
            Network::Futurenet => write!(f, "futurenet"),
            Network::Custom(passphrase) => write!(f, "custom({passphrase})"),
        }
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" | "mainnet" | "pubnet" => Ok(Network::Public),
            "testnet" => Ok(Network::Testnet),
            "futurenet" => Ok(Network::Futurenet),
            other => Err(Error::InvalidValue(format!("unknown network name: {other}"))),
        }
    }
}

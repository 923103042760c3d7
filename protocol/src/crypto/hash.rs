//! # Hashing Utilities
//!
//! SHA-256 is the only hash the network uses: network ids, signing hashes,
//! contract ids and operation ids are all SHA-256 over XDR preimages.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data as a `Vec<u8>`.
///
/// # Example
///
/// ```
/// use stellar_custody::crypto::sha256;
///
/// let hash = sha256(b"custody");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Vec<u8> {
    sha256_array(data).to_vec()
}

/// Compute the SHA-256 hash and return a fixed-size array.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    sha256_concat(&[data])
}

/// SHA-256 over the concatenation of `parts`, without building the
/// concatenated buffer.
pub fn sha256_concat(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

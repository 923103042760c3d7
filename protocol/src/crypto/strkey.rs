//! # StrKey Address Encoding
//!
//! Every key-like value the network exposes to humans is a StrKey:
//!
//! ```text
//! base32( version_byte || payload || crc16_xmodem(version_byte || payload) )
//! ```
//!
//! RFC 4648 alphabet, no padding, checksum little-endian. The version byte
//! is chosen so the first base32 character reads as a mnemonic (`G` for
//! accounts, `C` for contracts, `M` for muxed accounts, ...).
//!
//! Decoding is strict: lowercase input, non-zero trailing bits, a wrong
//! version byte, a wrong payload length or a bad checksum all fail.

use crc::{Crc, CRC_16_XMODEM};
use data_encoding::BASE32_NOPAD;
use thiserror::Error;

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Errors from StrKey decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrKeyError {
    #[error("invalid base32 encoding")]
    InvalidBase32,

    #[error("unknown version byte 0x{0:02x}")]
    UnknownVersion(u8),

    #[error("expected {expected:?} strkey, found {found:?}")]
    WrongVersion { expected: Version, found: Version },

    #[error("invalid payload length {len} for {version:?}")]
    InvalidLength { version: Version, len: usize },

    #[error("checksum mismatch")]
    InvalidChecksum,
}

/// StrKey kinds, one per version byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    /// `G...`: ed25519 account public key.
    AccountId,
    /// `M...`: ed25519 key multiplexed with a 64-bit id.
    MuxedAccount,
    /// `C...`: contract id.
    Contract,
    /// `S...`: ed25519 secret seed. Recognised, never produced.
    Seed,
    /// `T...`: pre-authorized transaction hash.
    PreAuthTx,
    /// `X...`: sha256 hash-x signer.
    HashX,
    /// `P...`: ed25519 signed-payload signer.
    SignedPayload,
    /// `L...`: liquidity pool id.
    LiquidityPool,
    /// `B...`: claimable balance id.
    ClaimableBalance,
}

impl Version {
    pub const fn byte(self) -> u8 {
        match self {
            Version::AccountId => 6 << 3,
            Version::MuxedAccount => 12 << 3,
            Version::Contract => 2 << 3,
            Version::Seed => 18 << 3,
            Version::PreAuthTx => 19 << 3,
            Version::HashX => 23 << 3,
            Version::SignedPayload => 15 << 3,
            Version::LiquidityPool => 11 << 3,
            Version::ClaimableBalance => 1 << 3,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        [
            Version::AccountId,
            Version::MuxedAccount,
            Version::Contract,
            Version::Seed,
            Version::PreAuthTx,
            Version::HashX,
            Version::SignedPayload,
            Version::LiquidityPool,
            Version::ClaimableBalance,
        ]
        .into_iter()
        .find(|v| v.byte() == byte)
    }

    fn payload_len_ok(self, len: usize) -> bool {
        match self {
            Version::MuxedAccount => len == 40,
            // One type byte followed by the hash.
            Version::ClaimableBalance => len == 33,
            // key(32) + u32 length + padded payload (1..=64 bytes).
            Version::SignedPayload => (40..=100).contains(&len) && len % 4 == 0,
            _ => len == 32,
        }
    }
}

/// Encodes `payload` as a StrKey of the given kind.
pub fn encode(version: Version, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(payload.len() + 3);
    data.push(version.byte());
    data.extend_from_slice(payload);
    let checksum = CRC16.checksum(&data);
    data.extend_from_slice(&checksum.to_le_bytes());
    BASE32_NOPAD.encode(&data)
}

/// Decodes any StrKey, returning its kind and payload.
pub fn decode_any(s: &str) -> Result<(Version, Vec<u8>), StrKeyError> {
    let data = BASE32_NOPAD
        .decode(s.as_bytes())
        .map_err(|_| StrKeyError::InvalidBase32)?;
    if data.len() < 3 {
        return Err(StrKeyError::InvalidBase32);
    }

    let (body, checksum) = data.split_at(data.len() - 2);
    let expected = CRC16.checksum(body).to_le_bytes();
    if checksum != expected {
        return Err(StrKeyError::InvalidChecksum);
    }

    let version = Version::from_byte(body[0]).ok_or(StrKeyError::UnknownVersion(body[0]))?;
    let payload = body[1..].to_vec();
    if !version.payload_len_ok(payload.len()) {
        return Err(StrKeyError::InvalidLength {
            version,
            len: payload.len(),
        });
    }
    Ok((version, payload))
}

/// Decodes a StrKey that must be of kind `expected`.
pub fn decode(expected: Version, s: &str) -> Result<Vec<u8>, StrKeyError> {
    let (found, payload) = decode_any(s)?;
    if found != expected {
        return Err(StrKeyError::WrongVersion { expected, found });
    }
    Ok(payload)
}

/// Decodes a StrKey carrying exactly 32 bytes.
pub fn decode_32(expected: Version, s: &str) -> Result<[u8; 32], StrKeyError> {
    let payload = decode(expected, s)?;
    <[u8; 32]>::try_from(payload.as_slice()).map_err(|_| StrKeyError::InvalidLength {
        version: expected,
        len: payload.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_ACCOUNT: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";

    #[test]
    fn test_zero_account_vector() {
        assert_eq!(encode(Version::AccountId, &[0u8; 32]), ZERO_ACCOUNT);
        assert_eq!(decode_32(Version::AccountId, ZERO_ACCOUNT).unwrap(), [0u8; 32]);
    }

    #[test]
    fn test_prefix_characters() {
        let key = [7u8; 32];
        assert!(encode(Version::AccountId, &key).starts_with('G'));
        assert!(encode(Version::Contract, &key).starts_with('C'));
        assert!(encode(Version::Seed, &key).starts_with('S'));
        assert!(encode(Version::PreAuthTx, &key).starts_with('T'));
        assert!(encode(Version::HashX, &key).starts_with('X'));
        assert!(encode(Version::LiquidityPool, &key).starts_with('L'));
        assert!(encode(Version::MuxedAccount, &[7u8; 40]).starts_with('M'));
        assert!(encode(Version::ClaimableBalance, &[0u8; 33]).starts_with('B'));
    }

    #[test]
    fn test_corrupted_checksum_rejected() {
        let mut s = encode(Version::AccountId, &[9u8; 32]).into_bytes();
        let last = s.len() - 1;
        s[last] = if s[last] == b'A' { b'B' } else { b'A' };
        let s = String::from_utf8(s).unwrap();
        assert!(decode(Version::AccountId, &s).is_err());
    }

    #[test]
    fn test_wrong_version_rejected() {
        let contract = encode(Version::Contract, &[1u8; 32]);
        assert_eq!(
            decode(Version::AccountId, &contract).unwrap_err(),
            StrKeyError::WrongVersion {
                expected: Version::AccountId,
                found: Version::Contract,
            }
        );
    }

    #[test]
    fn test_wrong_length_rejected() {
        let short = encode(Version::AccountId, &[1u8; 31]);
        assert!(matches!(
            decode_any(&short),
            Err(StrKeyError::InvalidLength { len: 31, .. })
        ));
    }

    #[test]
    fn test_lowercase_and_garbage_rejected() {
        assert!(decode_any(&ZERO_ACCOUNT.to_lowercase()).is_err());
        assert!(decode_any("").is_err());
        assert!(decode_any("G").is_err());
        assert!(decode_any("not a strkey").is_err());
    }
}

//! # XDR Codec
//!
//! The network's canonical binary format is XDR (RFC 4506): big-endian,
//! every item padded to a 4-byte boundary, variable-length items prefixed
//! with a `u32` length, unions prefixed with an `i32` discriminant.
//!
//! Every wire type in this crate implements [`XdrCodec`]. Encoding is
//! infallible because values are validated when they are constructed;
//! decoding is strict:
//!
//! - padding bytes must be zero,
//! - declared lengths are checked against the type's maximum *and* against
//!   the bytes actually remaining before anything is allocated,
//! - recursive types (contract values, claim predicates, authorization
//!   trees) are bounded by [`MAX_DEPTH`],
//! - top-level decoding rejects trailing bytes.
//!
//! ```text
//! writer.rs: XdrWriter: append-only encoder over a Vec<u8>
//! reader.rs: XdrReader: bounds-checked cursor over a byte slice
//! ```

mod reader;
mod writer;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use thiserror::Error;

use crate::error::Result;

pub use reader::{XdrReader, MAX_DEPTH};
pub use writer::XdrWriter;

/// Low-level decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XdrError {
    /// The input ended before the value did.
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        /// Bytes the next item requires.
        needed: usize,
        /// Bytes left in the input.
        remaining: usize,
    },

    /// A union discriminant with no matching arm.
    #[error("invalid {type_name} discriminant: {value}")]
    InvalidDiscriminant {
        /// The union being decoded.
        type_name: &'static str,
        /// The discriminant found on the wire.
        value: i32,
    },

    /// A variable-length item longer than its declared bound.
    #[error("{type_name} length {len} exceeds maximum {max}")]
    LengthExceeded {
        /// The item being decoded.
        type_name: &'static str,
        /// Length found on the wire.
        len: usize,
        /// Maximum allowed by the schema.
        max: usize,
    },

    /// Padding after an opaque item was not all zeros.
    #[error("non-zero padding byte")]
    NonZeroPadding,

    /// A boolean encoded as something other than 0 or 1.
    #[error("invalid boolean value: {0}")]
    InvalidBool(u32),

    /// Bytes left over after a complete top-level value.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    /// Recursive structure nested deeper than [`MAX_DEPTH`].
    #[error("maximum nesting depth {0} exceeded")]
    DepthLimitExceeded(u32),

    /// A string field that must be UTF-8 but is not.
    #[error("invalid utf-8 in {0}")]
    InvalidUtf8(&'static str),

    /// Input that is not valid base64.
    #[error("invalid base64: {0}")]
    InvalidBase64(String),

    /// Input that is not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

/// A type with a canonical XDR representation.
pub trait XdrCodec: Sized {
    /// Appends the canonical encoding of `self` to `w`.
    fn encode(&self, w: &mut XdrWriter);

    /// Reads one value from `r`, leaving the cursor just past it.
    fn decode(r: &mut XdrReader<'_>) -> Result<Self>;

    /// Canonical encoding as an owned byte vector.
    fn to_xdr(&self) -> Vec<u8> {
        let mut w = XdrWriter::new();
        self.encode(&mut w);
        w.into_bytes()
    }

    /// Decodes exactly one value; trailing bytes are an error.
    fn from_xdr(bytes: &[u8]) -> Result<Self> {
        let mut r = XdrReader::new(bytes);
        let value = Self::decode(&mut r)?;
        r.finish()?;
        Ok(value)
    }

    /// Canonical encoding, base64 (standard alphabet, padded).
    fn to_xdr_base64(&self) -> String {
        BASE64.encode(self.to_xdr())
    }

    /// Inverse of [`to_xdr_base64`](Self::to_xdr_base64).
    fn from_xdr_base64(s: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(s.trim())
            .map_err(|e| XdrError::InvalidBase64(e.to_string()))?;
        Self::from_xdr(&bytes)
    }
}

impl XdrCodec for u32 {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_u32(*self);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(r.read_u32()?)
    }
}

impl XdrCodec for i32 {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(*self);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(r.read_i32()?)
    }
}

impl XdrCodec for u64 {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_u64(*self);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(r.read_u64()?)
    }
}

impl XdrCodec for i64 {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i64(*self);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(r.read_i64()?)
    }
}

impl XdrCodec for bool {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_bool(*self);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(r.read_bool()?)
    }
}

/// `Hash` / `uint256`: 32 raw bytes, no length prefix.
impl XdrCodec for [u8; 32] {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_fixed_opaque(self);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(r.read_fixed::<32>()?)
    }
}

impl<T: XdrCodec> XdrCodec for Box<T> {
    fn encode(&self, w: &mut XdrWriter) {
        (**self).encode(w);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        r.enter()?;
        let inner = T::decode(r);
        r.leave();
        Ok(Box::new(inner?))
    }
}

/// Decodes a hex string (optionally `0x`-prefixed) into bytes.
pub fn decode_hex(s: &str) -> std::result::Result<Vec<u8>, XdrError> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).map_err(|e| XdrError::InvalidHex(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_integers_are_big_endian() {
        assert_eq!(1u32.to_xdr(), vec![0, 0, 0, 1]);
        assert_eq!((-1i32).to_xdr(), vec![0xFF; 4]);
        assert_eq!(
            0x0102_0304_0506_0708u64.to_xdr(),
            vec![1, 2, 3, 4, 5, 6, 7, 8]
        );
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let err = u32::from_xdr(&[0, 0, 0, 1, 0]).unwrap_err();
        assert_eq!(err, Error::Decode(XdrError::TrailingBytes(1)));
    }

    #[test]
    fn test_bool_must_be_zero_or_one() {
        assert!(bool::from_xdr(&[0, 0, 0, 1]).unwrap());
        assert!(!bool::from_xdr(&[0, 0, 0, 0]).unwrap());
        assert_eq!(
            bool::from_xdr(&[0, 0, 0, 2]).unwrap_err(),
            Error::Decode(XdrError::InvalidBool(2))
        );
    }

    #[test]
    fn test_base64_wrapping() {
        let encoded = 7u64.to_xdr_base64();
        assert_eq!(encoded, "AAAAAAAAAAc=");
        assert_eq!(u64::from_xdr_base64(&encoded).unwrap(), 7);
        assert!(matches!(
            u64::from_xdr_base64("not base64!"),
            Err(Error::Decode(XdrError::InvalidBase64(_)))
        ));
    }

    #[test]
    fn test_hex_helper_accepts_prefix() {
        assert_eq!(decode_hex("0xdead").unwrap(), vec![0xde, 0xad]);
        assert_eq!(decode_hex("beef").unwrap(), vec![0xbe, 0xef]);
        assert!(decode_hex("abc").is_err());
    }
}

use super::writer::padding;
use super::{XdrCodec, XdrError};
use crate::error::Result;

/// Deepest nesting accepted for recursive structures.
pub const MAX_DEPTH: u32 = 64;

/// Bounds-checked XDR decoding cursor.
#[derive(Debug, Clone)]
pub struct XdrReader<'a> {
    data: &'a [u8],
    pos: usize,
    depth: u32,
}

type ReadResult<T> = std::result::Result<T, XdrError>;

impl<'a> XdrReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            depth: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Fails unless the whole input has been consumed.
    pub fn finish(&self) -> ReadResult<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(XdrError::TrailingBytes(n)),
        }
    }

    /// Marks entry into one level of a recursive structure.
    pub fn enter(&mut self) -> ReadResult<()> {
        if self.depth >= MAX_DEPTH {
            return Err(XdrError::DepthLimitExceeded(MAX_DEPTH));
        }
        self.depth += 1;
        Ok(())
    }

    /// Marks exit from one level entered with [`enter`](Self::enter).
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn take(&mut self, n: usize) -> ReadResult<&'a [u8]> {
        if n > self.remaining() {
            return Err(XdrError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn skip_padding(&mut self, len: usize) -> ReadResult<()> {
        let pad = self.take(padding(len))?;
        if pad.iter().any(|b| *b != 0) {
            return Err(XdrError::NonZeroPadding);
        }
        Ok(())
    }

    fn take_array<const N: usize>(&mut self) -> ReadResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u32(&mut self) -> ReadResult<u32> {
        Ok(u32::from_be_bytes(self.take_array::<4>()?))
    }

    pub fn read_i32(&mut self) -> ReadResult<i32> {
        Ok(i32::from_be_bytes(self.take_array::<4>()?))
    }

    pub fn read_u64(&mut self) -> ReadResult<u64> {
        Ok(u64::from_be_bytes(self.take_array::<8>()?))
    }

    pub fn read_i64(&mut self) -> ReadResult<i64> {
        Ok(i64::from_be_bytes(self.take_array::<8>()?))
    }

    pub fn read_bool(&mut self) -> ReadResult<bool> {
        match self.read_u32()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(XdrError::InvalidBool(other)),
        }
    }

    /// Fixed-length opaque of a compile-time size.
    pub fn read_fixed<const N: usize>(&mut self) -> ReadResult<[u8; N]> {
        let out = self.take_array::<N>()?;
        self.skip_padding(N)?;
        Ok(out)
    }

    /// Variable-length opaque bounded by `max`.
    pub fn read_var_opaque(&mut self, max: usize, type_name: &'static str) -> ReadResult<Vec<u8>> {
        let len = self.read_u32()? as usize;
        if len > max {
            return Err(XdrError::LengthExceeded { type_name, len, max });
        }
        let bytes = self.take(len)?.to_vec();
        self.skip_padding(len)?;
        Ok(bytes)
    }

    /// Variable-length string bounded by `max` that must be valid UTF-8.
    pub fn read_string(&mut self, max: usize, type_name: &'static str) -> ReadResult<String> {
        let bytes = self.read_var_opaque(max, type_name)?;
        String::from_utf8(bytes).map_err(|_| XdrError::InvalidUtf8(type_name))
    }

    /// Optional value behind a boolean presence flag.
    pub fn read_option<T: XdrCodec>(&mut self) -> Result<Option<T>> {
        if self.read_bool()? {
            Ok(Some(T::decode(self)?))
        } else {
            Ok(None)
        }
    }

    /// Variable-length array bounded by `max` elements.
    pub fn read_array<T: XdrCodec>(&mut self, max: usize, type_name: &'static str) -> Result<Vec<T>> {
        let count = self.read_u32()? as usize;
        if count > max {
            return Err(XdrError::LengthExceeded {
                type_name,
                len: count,
                max,
            }
            .into());
        }
        // Every element occupies at least four bytes on the wire.
        if count > self.remaining() / 4 {
            return Err(XdrError::UnexpectedEof {
                needed: count * 4,
                remaining: self.remaining(),
            }
            .into());
        }
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(T::decode(self)?);
        }
        Ok(items)
    }

    /// Decodes any codec value at the cursor.
    pub fn read<T: XdrCodec>(&mut self) -> Result<T> {
        T::decode(self)
    }
}

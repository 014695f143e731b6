//! Bounds-checked big-endian cursors over wire buffers.
//!
//! All multi-byte integers are Big Endian. Every read and write checks the
//! remaining space first, so a short buffer surfaces as an error instead of
//! a panic:
//! - [`WireWriter`] reports [`CodecError::BufferOverflow`]
//! - [`WireReader`] reports [`CodecError::MalformedFrame`]

use bytes::Bytes;

use crate::error::{CodecError, Result};

/// Write cursor over a caller-owned output buffer.
#[derive(Debug)]
pub struct WireWriter<'a> {
    buf: &'a mut [u8],
    offset: usize,
}

impl<'a> WireWriter<'a> {
    /// Create a writer positioned at the start of `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Bytes written so far.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Space left in the buffer.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    /// The written prefix of the buffer.
    #[inline]
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.offset]
    }

    #[inline]
    fn ensure(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            return Err(CodecError::BufferOverflow {
                field: String::new(),
                offset: self.offset,
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    /// Write raw bytes.
    pub fn put_slice(&mut self, data: &[u8]) -> Result<()> {
        self.ensure(data.len())?;
        self.buf[self.offset..self.offset + data.len()].copy_from_slice(data);
        self.offset += data.len();
        Ok(())
    }

    /// Write one byte.
    #[inline]
    pub fn put_u8(&mut self, value: u8) -> Result<()> {
        self.put_slice(&[value])
    }

    /// Write a big-endian u16.
    #[inline]
    pub fn put_u16(&mut self, value: u16) -> Result<()> {
        self.put_slice(&value.to_be_bytes())
    }

    /// Write a big-endian u32.
    #[inline]
    pub fn put_u32(&mut self, value: u32) -> Result<()> {
        self.put_slice(&value.to_be_bytes())
    }

    /// Write a big-endian u64.
    #[inline]
    pub fn put_u64(&mut self, value: u64) -> Result<()> {
        self.put_slice(&value.to_be_bytes())
    }

    /// Reserve a u32 slot to be filled in later with [`patch_u32`](Self::patch_u32).
    ///
    /// Returns the slot position.
    pub fn reserve_u32(&mut self) -> Result<usize> {
        let at = self.offset;
        self.put_u32(0)?;
        Ok(at)
    }

    /// Overwrite a previously reserved u32 slot.
    pub fn patch_u32(&mut self, at: usize, value: u32) {
        debug_assert!(at + 4 <= self.offset);
        self.buf[at..at + 4].copy_from_slice(&value.to_be_bytes());
    }
}

/// Read cursor over an input payload.
///
/// Byte-string reads are zero-copy slices of the underlying [`Bytes`].
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a Bytes,
    offset: usize,
}

impl<'a> WireReader<'a> {
    /// Create a reader positioned at the start of `buf`.
    pub fn new(buf: &'a Bytes) -> Self {
        Self { buf, offset: 0 }
    }

    /// Create a reader positioned at `offset`.
    pub fn at(buf: &'a Bytes, offset: usize) -> Self {
        Self { buf, offset }
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.offset)
    }

    #[inline]
    fn ensure(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            return Err(CodecError::malformed(
                self.offset,
                format!("need {} bytes, {} remaining", needed, self.remaining()),
            ));
        }
        Ok(())
    }

    #[inline]
    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.offset..self.offset + N]);
        self.offset += N;
        Ok(out)
    }

    /// Read one byte.
    #[inline]
    pub fn get_u8(&mut self) -> Result<u8> {
        Ok(self.take_array::<1>()?[0])
    }

    /// Read a big-endian u16.
    #[inline]
    pub fn get_u16(&mut self) -> Result<u16> {
        self.take_array().map(u16::from_be_bytes)
    }

    /// Read a big-endian u32.
    #[inline]
    pub fn get_u32(&mut self) -> Result<u32> {
        self.take_array().map(u32::from_be_bytes)
    }

    /// Read a big-endian u64.
    #[inline]
    pub fn get_u64(&mut self) -> Result<u64> {
        self.take_array().map(u64::from_be_bytes)
    }

    /// Take `len` bytes as a zero-copy slice.
    pub fn get_bytes(&mut self, len: usize) -> Result<Bytes> {
        self.ensure(len)?;
        let out = self.buf.slice(self.offset..self.offset + len);
        self.offset += len;
        Ok(out)
    }
}

//! Bit-field packing for runs of consecutive `bit` fields.
//!
//! Within a run, field *i* lands in bit `i % 8` (LSB first) of byte `i / 8`:
//!
//! ```text
//! fields:  [T, F, T, F, T, F, T, F, T]
//! byte 0:  0b0101_0101   (fields 0..8)
//! byte 1:  0b0000_0001   (field 8)
//! ```
//!
//! A partial byte is flushed when the run ends.

use super::wire::{WireReader, WireWriter};
use crate::error::Result;

/// Accumulates the bits of one run and writes full bytes as they fill.
#[derive(Debug, Default)]
pub struct BitPacker {
    byte: u8,
    count: u8,
}

impl BitPacker {
    /// Create an empty packer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if bits are waiting to be flushed.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.count > 0
    }

    /// Add the next bit of the run, writing the byte once 8 bits are in.
    pub fn push(&mut self, w: &mut WireWriter<'_>, value: bool) -> Result<()> {
        if value {
            self.byte |= 1 << self.count;
        }
        self.count += 1;
        if self.count == 8 {
            self.flush(w)?;
        }
        Ok(())
    }

    /// Write the partial byte, if any, and start a new run.
    pub fn flush(&mut self, w: &mut WireWriter<'_>) -> Result<()> {
        if self.count > 0 {
            w.put_u8(self.byte)?;
            self.byte = 0;
            self.count = 0;
        }
        Ok(())
    }
}

/// Reads the bits of one run, consuming a byte every 8 bits.
#[derive(Debug)]
pub struct BitUnpacker {
    byte: u8,
    /// Bits already taken from `byte`; 8 means a new byte is needed.
    used: u8,
}

impl BitUnpacker {
    /// Create an unpacker at the start of a run.
    pub fn new() -> Self {
        Self { byte: 0, used: 8 }
    }

    /// Read the next bit of the run.
    pub fn next_bit(&mut self, r: &mut WireReader<'_>) -> Result<bool> {
        if self.used == 8 {
            self.byte = r.get_u8()?;
            self.used = 0;
        }
        let bit = self.byte & (1 << self.used) != 0;
        self.used += 1;
        Ok(bit)
    }

    /// End the current run; the next bit starts a fresh byte.
    pub fn reset(&mut self) {
        self.used = 8;
    }
}

impl Default for BitUnpacker {
    fn default() -> Self {
        Self::new()
    }
}

/// Bytes occupied by a run of `run_len` bits.
#[inline]
pub fn packed_len(run_len: usize) -> usize {
    run_len.div_ceil(8)
}

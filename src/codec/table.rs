//! Field tables - the `table` domain.
//!
//! Method and property codecs treat tables as opaque: they hand a
//! [`FieldTable`] to a [`TableCodec`] and get back a self length-prefixed
//! encoding. [`FieldTableCodec`] is the AMQP 0-9-1 implementation:
//!
//! ```text
//! ┌───────────┬──────────────────────────────────────────────┐
//! │ Length    │ Entries                                      │
//! │ uint32 BE │ (key: shortstr, kind: octet, value) *        │
//! └───────────┴──────────────────────────────────────────────┘
//! ```
//!
//! Value kinds:
//!
//! | tag | kind       | tag | kind        | tag | kind           |
//! |-----|------------|-----|-------------|-----|----------------|
//! | `t` | boolean    | `I` | int32       | `D` | decimal        |
//! | `b` | int8       | `i` | uint32      | `S` | long string    |
//! | `B` | uint8      | `l` | int64       | `x` | byte array     |
//! | `s` | int16      | `L` | uint64      | `A` | array          |
//! | `u` | uint16     | `f` | float32     | `T` | timestamp      |
//! |     |            | `d` | float64     | `F` | nested table   |
//! |     |            |     |             | `V` | void           |

use bytes::Bytes;

use super::wire::{WireReader, WireWriter};
use crate::error::{CodecError, Result};

/// Default maximum nesting depth of tables and arrays.
pub const DEFAULT_MAX_TABLE_DEPTH: usize = 64;

/// Kind tags for field values.
pub mod kind {
    /// Boolean.
    pub const BOOLEAN: u8 = b't';
    /// Signed 8-bit.
    pub const I8: u8 = b'b';
    /// Unsigned 8-bit.
    pub const U8: u8 = b'B';
    /// Signed 16-bit.
    pub const I16: u8 = b's';
    /// Unsigned 16-bit.
    pub const U16: u8 = b'u';
    /// Signed 32-bit.
    pub const I32: u8 = b'I';
    /// Unsigned 32-bit.
    pub const U32: u8 = b'i';
    /// Signed 64-bit.
    pub const I64: u8 = b'l';
    /// Unsigned 64-bit.
    pub const U64: u8 = b'L';
    /// IEEE-754 single.
    pub const F32: u8 = b'f';
    /// IEEE-754 double.
    pub const F64: u8 = b'd';
    /// Decimal: scale octet + uint32.
    pub const DECIMAL: u8 = b'D';
    /// Long string (UTF-8 by convention).
    pub const LONG_STRING: u8 = b'S';
    /// Raw byte array.
    pub const BYTES: u8 = b'x';
    /// Array of field values.
    pub const ARRAY: u8 = b'A';
    /// Timestamp, 64-bit.
    pub const TIMESTAMP: u8 = b'T';
    /// Nested table.
    pub const TABLE: u8 = b'F';
    /// No value.
    pub const VOID: u8 = b'V';
}

/// A typed value stored in a field table or array.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// `t`
    Boolean(bool),
    /// `b`
    I8(i8),
    /// `B`
    U8(u8),
    /// `s`
    I16(i16),
    /// `u`
    U16(u16),
    /// `I`
    I32(i32),
    /// `i`
    U32(u32),
    /// `l`
    I64(i64),
    /// `L`
    U64(u64),
    /// `f`
    F32(f32),
    /// `d`
    F64(f64),
    /// `D`: `value * 10^-scale`.
    Decimal {
        /// Number of decimal places.
        scale: u8,
        /// Unscaled value.
        value: u32,
    },
    /// `S`
    LongString(Bytes),
    /// `x`
    Bytes(Bytes),
    /// `A`
    Array(Vec<FieldValue>),
    /// `T`
    Timestamp(u64),
    /// `F`
    Table(FieldTable),
    /// `V`
    Void,
}

impl FieldValue {
    /// Wire tag of this value.
    pub fn kind(&self) -> u8 {
        match self {
            FieldValue::Boolean(_) => kind::BOOLEAN,
            FieldValue::I8(_) => kind::I8,
            FieldValue::U8(_) => kind::U8,
            FieldValue::I16(_) => kind::I16,
            FieldValue::U16(_) => kind::U16,
            FieldValue::I32(_) => kind::I32,
            FieldValue::U32(_) => kind::U32,
            FieldValue::I64(_) => kind::I64,
            FieldValue::U64(_) => kind::U64,
            FieldValue::F32(_) => kind::F32,
            FieldValue::F64(_) => kind::F64,
            FieldValue::Decimal { .. } => kind::DECIMAL,
            FieldValue::LongString(_) => kind::LONG_STRING,
            FieldValue::Bytes(_) => kind::BYTES,
            FieldValue::Array(_) => kind::ARRAY,
            FieldValue::Timestamp(_) => kind::TIMESTAMP,
            FieldValue::Table(_) => kind::TABLE,
            FieldValue::Void => kind::VOID,
        }
    }

    /// Long string from UTF-8 text.
    pub fn string(s: &str) -> Self {
        FieldValue::LongString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::I32(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::I64(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::string(v)
    }
}

impl From<FieldTable> for FieldValue {
    fn from(v: FieldTable) -> Self {
        FieldValue::Table(v)
    }
}

/// Ordered key/value table. Wire order is preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldTable {
    entries: Vec<(Bytes, FieldValue)>,
}

impl FieldTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing an existing entry in place.
    pub fn insert(&mut self, key: &str, value: impl Into<FieldValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key.as_bytes()) {
            Some(entry) => entry.1 = value,
            None => self
                .entries
                .push((Bytes::copy_from_slice(key.as_bytes()), value)),
        }
    }

    /// Append an entry without checking for an existing key.
    pub fn push(&mut self, key: Bytes, value: FieldValue) {
        self.entries.push((key, value));
    }

    /// Look up the first entry for `key`.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key.as_bytes())
            .map(|(_, v)| v)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (&Bytes, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl<'k, V: Into<FieldValue>> FromIterator<(&'k str, V)> for FieldTable {
    fn from_iter<I: IntoIterator<Item = (&'k str, V)>>(iter: I) -> Self {
        let mut table = FieldTable::new();
        for (k, v) in iter {
            table.insert(k, v);
        }
        table
    }
}

/// Encoder/decoder for the `table` domain.
///
/// The reader and writer carry the current offset, so a decode is the
/// `(bytes, offset) -> (table, new_offset)` step and an encode appends a
/// self length-prefixed table at the writer's offset.
pub trait TableCodec: Send + Sync {
    /// Append `table`, including its length prefix.
    fn encode_table(&self, table: &FieldTable, w: &mut WireWriter<'_>) -> Result<()>;

    /// Read one length-prefixed table.
    ///
    /// Any failure must be reported as [`CodecError::MalformedFrame`].
    fn decode_table(&self, r: &mut WireReader<'_>) -> Result<FieldTable>;
}

/// AMQP 0-9-1 field-table codec.
#[derive(Debug, Clone, Copy)]
pub struct FieldTableCodec {
    max_depth: usize,
}

impl Default for FieldTableCodec {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_TABLE_DEPTH,
        }
    }
}

impl FieldTableCodec {
    /// Create a codec with the default nesting limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec with a custom nesting limit.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Maximum nesting depth of tables and arrays.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn encode_table_at(&self, table: &FieldTable, w: &mut WireWriter<'_>, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(CodecError::invalid(format!(
                "table nesting exceeds {} levels",
                self.max_depth
            )));
        }

        let at = w.reserve_u32()?;
        for (key, value) in &table.entries {
            let len = u8::try_from(key.len()).map_err(|_| {
                CodecError::invalid(format!("table key of {} bytes exceeds 255", key.len()))
            })?;
            w.put_u8(len)?;
            w.put_slice(key)?;
            self.encode_value(value, w, depth)?;
        }
        patch_length(w, at)
    }

    fn encode_value(&self, value: &FieldValue, w: &mut WireWriter<'_>, depth: usize) -> Result<()> {
        w.put_u8(value.kind())?;
        match value {
            FieldValue::Boolean(v) => w.put_u8(u8::from(*v)),
            FieldValue::I8(v) => w.put_u8(*v as u8),
            FieldValue::U8(v) => w.put_u8(*v),
            FieldValue::I16(v) => w.put_u16(*v as u16),
            FieldValue::U16(v) => w.put_u16(*v),
            FieldValue::I32(v) => w.put_u32(*v as u32),
            FieldValue::U32(v) => w.put_u32(*v),
            FieldValue::I64(v) => w.put_u64(*v as u64),
            FieldValue::U64(v) => w.put_u64(*v),
            FieldValue::F32(v) => w.put_u32(v.to_bits()),
            FieldValue::F64(v) => w.put_u64(v.to_bits()),
            FieldValue::Decimal { scale, value } => {
                w.put_u8(*scale)?;
                w.put_u32(*value)
            }
            FieldValue::LongString(b) | FieldValue::Bytes(b) => {
                let len = u32::try_from(b.len())
                    .map_err(|_| CodecError::invalid("byte string exceeds 4 GiB"))?;
                w.put_u32(len)?;
                w.put_slice(b)
            }
            FieldValue::Array(items) => {
                if depth + 1 > self.max_depth {
                    return Err(CodecError::invalid(format!(
                        "array nesting exceeds {} levels",
                        self.max_depth
                    )));
                }
                let at = w.reserve_u32()?;
                for item in items {
                    self.encode_value(item, w, depth + 1)?;
                }
                patch_length(w, at)
            }
            FieldValue::Timestamp(v) => w.put_u64(*v),
            FieldValue::Table(t) => self.encode_table_at(t, w, depth + 1),
            FieldValue::Void => Ok(()),
        }
    }

    fn decode_table_at(&self, r: &mut WireReader<'_>, depth: usize) -> Result<FieldTable> {
        if depth > self.max_depth {
            return Err(CodecError::malformed(
                r.offset(),
                format!("table nesting exceeds {} levels", self.max_depth),
            ));
        }

        let limit = read_limit(r)?;
        let mut table = FieldTable::new();
        while r.offset() < limit {
            let key_len = r.get_u8()? as usize;
            let key = r.get_bytes(key_len)?;
            let value = self.decode_value(r, depth)?;
            table.push(key, value);
        }
        check_limit(r, limit)?;
        Ok(table)
    }

    fn decode_value(&self, r: &mut WireReader<'_>, depth: usize) -> Result<FieldValue> {
        let tag_offset = r.offset();
        let value = match r.get_u8()? {
            kind::BOOLEAN => FieldValue::Boolean(r.get_u8()? != 0),
            kind::I8 => FieldValue::I8(r.get_u8()? as i8),
            kind::U8 => FieldValue::U8(r.get_u8()?),
            kind::I16 => FieldValue::I16(r.get_u16()? as i16),
            kind::U16 => FieldValue::U16(r.get_u16()?),
            kind::I32 => FieldValue::I32(r.get_u32()? as i32),
            kind::U32 => FieldValue::U32(r.get_u32()?),
            kind::I64 => FieldValue::I64(r.get_u64()? as i64),
            kind::U64 => FieldValue::U64(r.get_u64()?),
            kind::F32 => FieldValue::F32(f32::from_bits(r.get_u32()?)),
            kind::F64 => FieldValue::F64(f64::from_bits(r.get_u64()?)),
            kind::DECIMAL => FieldValue::Decimal {
                scale: r.get_u8()?,
                value: r.get_u32()?,
            },
            kind::LONG_STRING => {
                let len = r.get_u32()? as usize;
                FieldValue::LongString(r.get_bytes(len)?)
            }
            kind::BYTES => {
                let len = r.get_u32()? as usize;
                FieldValue::Bytes(r.get_bytes(len)?)
            }
            kind::ARRAY => {
                if depth + 1 > self.max_depth {
                    return Err(CodecError::malformed(
                        tag_offset,
                        format!("array nesting exceeds {} levels", self.max_depth),
                    ));
                }
                let limit = read_limit(r)?;
                let mut items = Vec::new();
                while r.offset() < limit {
                    items.push(self.decode_value(r, depth + 1)?);
                }
                check_limit(r, limit)?;
                FieldValue::Array(items)
            }
            kind::TIMESTAMP => FieldValue::Timestamp(r.get_u64()?),
            kind::TABLE => FieldValue::Table(self.decode_table_at(r, depth + 1)?),
            kind::VOID => FieldValue::Void,
            other => {
                return Err(CodecError::malformed(
                    tag_offset,
                    format!("unknown field value kind 0x{:02X}", other),
                ))
            }
        };
        Ok(value)
    }
}

impl TableCodec for FieldTableCodec {
    fn encode_table(&self, table: &FieldTable, w: &mut WireWriter<'_>) -> Result<()> {
        self.encode_table_at(table, w, 0)
    }

    fn decode_table(&self, r: &mut WireReader<'_>) -> Result<FieldTable> {
        self.decode_table_at(r, 0)
    }
}

/// Fill a reserved length slot with the byte count written after it.
fn patch_length(w: &mut WireWriter<'_>, at: usize) -> Result<()> {
    let len = u32::try_from(w.offset() - at - 4)
        .map_err(|_| CodecError::invalid("table exceeds 4 GiB"))?;
    w.patch_u32(at, len);
    Ok(())
}

/// Read a u32 length prefix and return the end offset it announces.
fn read_limit(r: &mut WireReader<'_>) -> Result<usize> {
    let at = r.offset();
    let len = r.get_u32()? as usize;
    if len > r.remaining() {
        return Err(CodecError::malformed(
            at,
            format!(
                "declared length {} exceeds {} remaining bytes",
                len,
                r.remaining()
            ),
        ));
    }
    Ok(r.offset() + len)
}

fn check_limit(r: &WireReader<'_>, limit: usize) -> Result<()> {
    if r.offset() != limit {
        return Err(CodecError::malformed(
            limit,
            format!("entries overran declared length by {} bytes", r.offset() - limit),
        ));
    }
    Ok(())
}

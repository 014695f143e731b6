//! Per-field primitive encoding, shared by the method and property codecs.

use super::table::TableCodec;
use super::value::Value;
use super::wire::{WireReader, WireWriter};
use crate::error::{CodecError, Result};
use crate::spec::PrimitiveType;

/// Encode one non-bit value as `primitive`.
pub(crate) fn encode_field<T: TableCodec>(
    tables: &T,
    primitive: PrimitiveType,
    value: &Value,
    w: &mut WireWriter<'_>,
) -> Result<()> {
    match (primitive, value) {
        (PrimitiveType::Octet, Value::Octet(v)) => w.put_u8(*v),
        (PrimitiveType::Short, Value::Short(v)) => w.put_u16(*v),
        (PrimitiveType::Long, Value::Long(v)) => w.put_u32(*v),
        (PrimitiveType::LongLong, Value::LongLong(v))
        | (PrimitiveType::Timestamp, Value::Timestamp(v)) => w.put_u64(*v),
        (PrimitiveType::ShortStr, Value::ShortStr(b)) => {
            let len = u8::try_from(b.len()).map_err(|_| {
                CodecError::invalid(format!("shortstr of {} bytes exceeds 255", b.len()))
            })?;
            w.put_u8(len)?;
            w.put_slice(b)
        }
        (PrimitiveType::LongStr, Value::LongStr(b)) => {
            let len = u32::try_from(b.len())
                .map_err(|_| CodecError::invalid("longstr exceeds 4 GiB"))?;
            w.put_u32(len)?;
            w.put_slice(b)
        }
        (PrimitiveType::Table, Value::Table(t)) => tables.encode_table(t, w),
        (expected, got) => Err(CodecError::invalid(format!(
            "expected {}, got {}",
            expected,
            got.primitive()
        ))),
    }
}

/// Decode one non-bit value of type `primitive`.
pub(crate) fn decode_field<T: TableCodec>(
    tables: &T,
    primitive: PrimitiveType,
    r: &mut WireReader<'_>,
) -> Result<Value> {
    let value = match primitive {
        PrimitiveType::Octet => Value::Octet(r.get_u8()?),
        PrimitiveType::Short => Value::Short(r.get_u16()?),
        PrimitiveType::Long => Value::Long(r.get_u32()?),
        PrimitiveType::LongLong => Value::LongLong(r.get_u64()?),
        PrimitiveType::Timestamp => Value::Timestamp(r.get_u64()?),
        PrimitiveType::ShortStr => {
            let len = r.get_u8()? as usize;
            Value::ShortStr(r.get_bytes(len)?)
        }
        PrimitiveType::LongStr => {
            let len = r.get_u32()? as usize;
            Value::LongStr(r.get_bytes(len)?)
        }
        PrimitiveType::Table => {
            let at = r.offset();
            let table = tables.decode_table(r).map_err(|e| match e {
                CodecError::MalformedFrame { .. } => e,
                other => CodecError::malformed(at, format!("table decode failed: {}", other)),
            })?;
            Value::Table(table)
        }
        PrimitiveType::Bit => {
            return Err(CodecError::malformed(
                r.offset(),
                "bit fields are decoded as packed runs",
            ))
        }
    };
    Ok(value)
}

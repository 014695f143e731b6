//! Content-header property lists.
//!
//! A property list starts with one or more 16-bit flag words followed by
//! the values of the present non-bit fields, in declaration order:
//!
//! ```text
//! word 0:  bit 15 .. bit 1  -> fields 0..15    bit 0: another word follows
//! word 1:  bit 15 .. bit 1  -> fields 15..30   bit 0: another word follows
//! ...
//! ```
//!
//! In memory the words are packed into one u64 with word *k* occupying bits
//! `16k..16k+16` (see [`property_flag`](crate::spec::property_flag)). At most
//! [`MAX_FLAG_WORDS`] words are accepted. Bit-domain properties carry no
//! value bytes; the presence bit is the value.

use bytes::Bytes;

use super::field::{decode_field, encode_field};
use super::table::TableCodec;
use super::value::{PropertyList, Value};
use super::wire::{WireReader, WireWriter};
use super::Codec;
use crate::error::{CodecError, Result};
use crate::spec::{ClassSpec, MAX_FLAG_WORDS};

const FLAGS_FIELD: &str = "property-flags";

impl<'s, T: TableCodec> Codec<'s, T> {
    /// Encode `props` for class `class_id` into `out`.
    ///
    /// Returns the number of bytes written. An empty list still writes one
    /// all-zero flag word.
    ///
    /// # Errors
    ///
    /// - [`CodecError::UnknownClass`] if `class_id` is not in the metadata
    /// - [`CodecError::InvalidValue`] if `props` belongs to another class, a
    ///   present field has no value or a value of the wrong type, or a flag
    ///   bit has no field defined for it
    /// - [`CodecError::BufferOverflow`] if `out` is too small
    pub fn encode_properties(
        &self,
        class_id: u16,
        props: &PropertyList,
        out: &mut [u8],
    ) -> Result<usize> {
        let class = self.lookup_class(class_id)?;
        let mut w = WireWriter::new(out);
        match self.write_properties(class, props, &mut w) {
            Ok(()) => {
                tracing::trace!(
                    "Encoded {} properties, flags 0x{:X} ({} bytes)",
                    class.name,
                    props.flags(),
                    w.offset()
                );
                Ok(w.offset())
            }
            Err(e) => {
                tracing::debug!("Failed to encode {} properties: {}", class.name, e);
                Err(e)
            }
        }
    }

    /// Decode a property list for class `class_id` from `payload`.
    ///
    /// # Errors
    ///
    /// - [`CodecError::UnknownClass`] if `class_id` is not in the metadata
    /// - [`CodecError::MalformedFrame`] on truncated input, more than
    ///   [`MAX_FLAG_WORDS`] flag words, or an undecodable table
    pub fn decode_properties(&self, class_id: u16, payload: &Bytes) -> Result<PropertyList> {
        let class = self.lookup_class(class_id)?;
        let mut r = WireReader::new(payload);
        match self.read_properties(class, &mut r) {
            Ok(props) => {
                tracing::trace!(
                    "Decoded {} properties, flags 0x{:X} ({} bytes)",
                    class.name,
                    props.flags(),
                    r.offset()
                );
                Ok(props)
            }
            Err(e) => {
                tracing::debug!("Failed to decode {} properties: {}", class.name, e);
                Err(e)
            }
        }
    }

    pub(crate) fn lookup_class(&self, class_id: u16) -> Result<&'s ClassSpec> {
        self.spec.class(class_id).ok_or_else(|| {
            tracing::debug!("Unknown class {}", class_id);
            CodecError::UnknownClass(class_id)
        })
    }

    pub(crate) fn write_properties(
        &self,
        class: &ClassSpec,
        props: &PropertyList,
        w: &mut WireWriter<'_>,
    ) -> Result<()> {
        if props.class_id() != class.id {
            return Err(CodecError::invalid(format!(
                "properties of class {} encoded as class {}",
                props.class_id(),
                class.id
            ))
            .in_field(FLAGS_FIELD));
        }
        let flags = props.flags();
        let undefined = flags & !class.flag_mask();
        if undefined != 0 {
            return Err(CodecError::invalid(format!(
                "flag bits 0x{:X} are not defined for class {}",
                undefined, class.name
            ))
            .in_field(FLAGS_FIELD));
        }

        write_flag_words(flags, w).map_err(|e| e.in_field(FLAGS_FIELD))?;

        for field in &class.properties {
            if field.is_bit() || flags & field.flag == 0 {
                continue;
            }
            let value = props.value_at(field.ordinal).ok_or_else(|| {
                CodecError::invalid("flagged present but has no value").in_field(&field.name)
            })?;
            encode_field(&self.tables, field.primitive, value, w)
                .map_err(|e| e.in_field(&field.name))?;
        }
        Ok(())
    }

    pub(crate) fn read_properties(
        &self,
        class: &ClassSpec,
        r: &mut WireReader<'_>,
    ) -> Result<PropertyList> {
        let flags = read_flag_words(r).map_err(|e| e.in_field(FLAGS_FIELD))?;

        let mut values: Vec<Option<Value>> = vec![None; class.properties.len()];
        for field in &class.properties {
            if field.is_bit() || flags & field.flag == 0 {
                continue;
            }
            let value = decode_field(&self.tables, field.primitive, r)
                .map_err(|e| e.in_field(&field.name))?;
            values[field.ordinal] = Some(value);
        }
        Ok(PropertyList::from_parts(class.id, flags, values))
    }
}

/// Write `flags` as chained 16-bit words, low word first.
///
/// Bit 0 of each word is set when a later word carries a set bit.
fn write_flag_words(mut flags: u64, w: &mut WireWriter<'_>) -> Result<()> {
    loop {
        let remainder = flags >> 16;
        let mut word = (flags & 0xFFFE) as u16;
        if remainder != 0 {
            word |= 0x0001;
        }
        w.put_u16(word)?;
        flags = remainder;
        if flags == 0 {
            return Ok(());
        }
    }
}

/// Read chained flag words into one u64.
fn read_flag_words(r: &mut WireReader<'_>) -> Result<u64> {
    let mut flags = 0u64;
    for index in 0..MAX_FLAG_WORDS {
        let word = r.get_u16()?;
        flags |= u64::from(word & 0xFFFE) << (index * 16);
        if word & 0x0001 == 0 {
            return Ok(flags);
        }
    }
    Err(CodecError::malformed(
        r.offset(),
        format!("more than {} property flag words", MAX_FLAG_WORDS),
    ))
}

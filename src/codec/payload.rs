//! Method-frame and header-frame payloads.
//!
//! ```text
//! method payload:  [class-id u16][method-id u16][arguments ...]
//! header payload:  [class-id u16][weight u16][body-size u64][properties ...]
//! ```
//!
//! Frame envelopes (type, channel, size, frame-end octet) are the
//! transport's business and are not handled here.

use bytes::Bytes;

use super::table::TableCodec;
use super::value::{MethodInstance, PropertyList};
use super::wire::{WireReader, WireWriter};
use super::Codec;
use crate::error::{CodecError, Result};
use crate::spec::MethodNumber;

/// Size of the fixed part of a header payload.
pub const CONTENT_HEADER_PREFIX_LEN: usize = 12;

/// Decoded content header.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentHeader {
    /// Class of the content (60 for `basic`).
    pub class_id: u16,
    /// Unused by 0-9-1, always 0 on the wire.
    pub weight: u16,
    /// Total body size in bytes across all body frames.
    pub body_size: u64,
    /// Content properties.
    pub properties: PropertyList,
}

impl ContentHeader {
    /// Create a header with weight 0.
    pub fn new(properties: PropertyList, body_size: u64) -> Self {
        Self {
            class_id: properties.class_id(),
            weight: 0,
            body_size,
            properties,
        }
    }
}

impl<'s, T: TableCodec> Codec<'s, T> {
    /// Encode a complete method-frame payload: method number then arguments.
    pub fn encode_method_payload(&self, instance: &MethodInstance, out: &mut [u8]) -> Result<usize> {
        let method = self.spec.method(instance.number).ok_or_else(|| {
            tracing::debug!("Unknown method {} for method frame", instance.number);
            CodecError::UnknownMethod(instance.number)
        })?;
        let mut w = WireWriter::new(out);
        w.put_u32(instance.number.value())
            .map_err(|e| e.in_field("method-number"))
            .and_then(|()| self.write_arguments(method, instance, &mut w))
            .map_err(|e| {
                tracing::debug!("Failed to encode {} payload: {}", method.name, e);
                e
            })?;
        tracing::trace!("Encoded {} payload ({} bytes)", method.name, w.offset());
        Ok(w.offset())
    }

    /// Decode a complete method-frame payload.
    ///
    /// # Errors
    ///
    /// - [`CodecError::MalformedFrame`] if the payload is shorter than the
    ///   method number or the arguments are truncated
    /// - [`CodecError::UnknownMethod`] if the number is not in the metadata
    pub fn decode_method_payload(&self, payload: &Bytes) -> Result<MethodInstance> {
        let mut r = WireReader::new(payload);
        let number = MethodNumber(r.get_u32().map_err(|e| e.in_field("method-number"))?);
        let method = self.spec.method(number).ok_or_else(|| {
            tracing::debug!("Unknown method {} in method frame", number);
            CodecError::UnknownMethod(number)
        })?;
        let args = self.read_arguments(method, &mut r).map_err(|e| {
            tracing::debug!("Failed to decode {} payload: {}", method.name, e);
            e
        })?;
        tracing::trace!("Decoded {} payload ({} bytes)", method.name, r.offset());
        Ok(MethodInstance { number, args })
    }

    /// Encode a complete header-frame payload.
    ///
    /// # Errors
    ///
    /// - [`CodecError::InvalidValue`] if `header.class_id` differs from the
    ///   property list's class
    /// - any error of [`encode_properties`](Self::encode_properties)
    pub fn encode_content_header(&self, header: &ContentHeader, out: &mut [u8]) -> Result<usize> {
        if header.class_id != header.properties.class_id() {
            return Err(CodecError::invalid(format!(
                "header class {} carries properties of class {}",
                header.class_id,
                header.properties.class_id()
            ))
            .in_field("class-id"));
        }
        let class = self.lookup_class(header.class_id)?;
        let mut w = WireWriter::new(out);
        w.put_u16(header.class_id)
            .map_err(|e| e.in_field("class-id"))?;
        w.put_u16(header.weight).map_err(|e| e.in_field("weight"))?;
        w.put_u64(header.body_size)
            .map_err(|e| e.in_field("body-size"))?;
        self.write_properties(class, &header.properties, &mut w)?;
        tracing::trace!(
            "Encoded {} content header, body size {} ({} bytes)",
            class.name,
            header.body_size,
            w.offset()
        );
        Ok(w.offset())
    }

    /// Decode a complete header-frame payload.
    pub fn decode_content_header(&self, payload: &Bytes) -> Result<ContentHeader> {
        let mut r = WireReader::new(payload);
        if r.remaining() < CONTENT_HEADER_PREFIX_LEN {
            return Err(CodecError::malformed(
                0,
                format!(
                    "content header needs {} bytes, {} remaining",
                    CONTENT_HEADER_PREFIX_LEN,
                    r.remaining()
                ),
            )
            .in_field("class-id"));
        }
        let class_id = r.get_u16()?;
        let weight = r.get_u16()?;
        let body_size = r.get_u64()?;
        let class = self.lookup_class(class_id)?;
        let properties = self.read_properties(class, &mut r).map_err(|e| {
            tracing::debug!("Failed to decode {} content header: {}", class.name, e);
            e
        })?;
        Ok(ContentHeader {
            class_id,
            weight,
            body_size,
            properties,
        })
    }
}

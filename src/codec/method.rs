//! Method argument encoding and decoding.
//!
//! Arguments are written back to back in declaration order. Consecutive
//! `bit` arguments share bytes (see [`bits`](super::bits)); any other
//! argument ends the current run.

use bytes::Bytes;

use super::bits::{BitPacker, BitUnpacker};
use super::field::{decode_field, encode_field};
use super::table::TableCodec;
use super::value::{MethodInstance, Value};
use super::wire::{WireReader, WireWriter};
use super::Codec;
use crate::error::{CodecError, Result};
use crate::spec::{FieldSpec, MethodNumber, MethodSpec};

impl<'s, T: TableCodec> Codec<'s, T> {
    /// Encode the arguments of `instance` into `out`.
    ///
    /// Returns the number of bytes written. `out` is left untouched when
    /// the method number is unknown.
    ///
    /// # Errors
    ///
    /// - [`CodecError::UnknownMethod`] if `number` is not in the metadata
    /// - [`CodecError::InvalidValue`] if the instance does not match the
    ///   method's arguments
    /// - [`CodecError::BufferOverflow`] if `out` is too small
    pub fn encode_method(
        &self,
        number: MethodNumber,
        instance: &MethodInstance,
        out: &mut [u8],
    ) -> Result<usize> {
        let method = self.lookup_method(number)?;
        let mut w = WireWriter::new(out);
        match self.write_arguments(method, instance, &mut w) {
            Ok(()) => {
                tracing::trace!("Encoded {} ({} bytes)", method.name, w.offset());
                Ok(w.offset())
            }
            Err(e) => {
                tracing::debug!("Failed to encode {}: {}", method.name, e);
                Err(e)
            }
        }
    }

    /// Encode into a fresh buffer of [`frame_max`](super::CodecConfig::frame_max) bytes.
    pub fn encode_method_to_bytes(
        &self,
        number: MethodNumber,
        instance: &MethodInstance,
    ) -> Result<Bytes> {
        let mut buf = vec![0u8; self.config.frame_max];
        let len = self.encode_method(number, instance, &mut buf)?;
        buf.truncate(len);
        Ok(Bytes::from(buf))
    }

    /// Decode the arguments of method `number` from `payload`.
    ///
    /// Bytes after the last argument are ignored. Short-string and
    /// long-string values are zero-copy slices of `payload`.
    ///
    /// # Errors
    ///
    /// - [`CodecError::UnknownMethod`] if `number` is not in the metadata
    /// - [`CodecError::MalformedFrame`] on truncated input, a length prefix
    ///   running past the end, or an undecodable table
    pub fn decode_method(&self, number: MethodNumber, payload: &Bytes) -> Result<MethodInstance> {
        let method = self.lookup_method(number)?;
        let mut r = WireReader::new(payload);
        match self.read_arguments(method, &mut r) {
            Ok(args) => {
                tracing::trace!("Decoded {} ({} bytes)", method.name, r.offset());
                Ok(MethodInstance { number, args })
            }
            Err(e) => {
                tracing::debug!("Failed to decode {}: {}", method.name, e);
                Err(e)
            }
        }
    }

    fn lookup_method(&self, number: MethodNumber) -> Result<&'s MethodSpec> {
        self.spec.method(number).ok_or_else(|| {
            tracing::debug!("Unknown method {}", number);
            CodecError::UnknownMethod(number)
        })
    }

    pub(crate) fn write_arguments(
        &self,
        method: &MethodSpec,
        instance: &MethodInstance,
        w: &mut WireWriter<'_>,
    ) -> Result<()> {
        if instance.number != method.number {
            return Err(CodecError::invalid(format!(
                "instance is for method {}, not {}",
                instance.number, method.name
            )));
        }
        if instance.args.len() != method.arguments.len() {
            return Err(CodecError::invalid(format!(
                "{} takes {} arguments, got {}",
                method.name,
                method.arguments.len(),
                instance.args.len()
            )));
        }

        let mut bits = BitPacker::new();
        for (field, value) in method.arguments.iter().zip(&instance.args) {
            self.write_argument(field, value, &mut bits, w)
                .map_err(|e| e.in_field(&field.name))?;
        }
        bits.flush(w)
    }

    fn write_argument(
        &self,
        field: &FieldSpec,
        value: &Value,
        bits: &mut BitPacker,
        w: &mut WireWriter<'_>,
    ) -> Result<()> {
        if field.is_bit() {
            let bit = value.as_bool().ok_or_else(|| {
                CodecError::invalid(format!("expected bit, got {}", value.primitive()))
            })?;
            return bits.push(w, bit);
        }
        bits.flush(w)?;
        encode_field(&self.tables, field.primitive, value, w)
    }

    pub(crate) fn read_arguments(
        &self,
        method: &MethodSpec,
        r: &mut WireReader<'_>,
    ) -> Result<Vec<Value>> {
        let mut bits = BitUnpacker::new();
        let mut args = Vec::with_capacity(method.arguments.len());
        for field in &method.arguments {
            let value = if field.is_bit() {
                bits.next_bit(r).map(Value::Bit)
            } else {
                bits.reset();
                decode_field(&self.tables, field.primitive, r)
            };
            args.push(value.map_err(|e| e.in_field(&field.name))?);
        }
        Ok(args)
    }
}

//! Codec module - binary encoding/decoding of AMQP 0-9-1 payloads.
//!
//! Everything here is driven by a [`ProtocolSpec`]:
//!
//! - [`Codec::encode_method`] / [`Codec::decode_method`] - method arguments
//! - [`Codec::encode_properties`] / [`Codec::decode_properties`] - content
//!   header property lists with chained flag words
//! - [`Codec::encode_method_payload`] / [`Codec::encode_content_header`] -
//!   the full payloads of method and header frames
//!
//! # Design
//!
//! The codec borrows the metadata table and never mutates it, so one table
//! can back any number of codecs on any number of threads. Field tables go
//! through the [`TableCodec`] seam; [`FieldTableCodec`] is the default.
//!
//! # Example
//!
//! ```
//! use amqp_codec::amqp091;
//! use amqp_codec::codec::{MethodInstance, Value};
//!
//! let codec = amqp091::codec();
//! let tune = MethodInstance::new(
//!     amqp091::CONNECTION_TUNE,
//!     vec![Value::Short(2047), Value::Long(131_072), Value::Short(60)],
//! );
//!
//! let mut buf = [0u8; 64];
//! let len = codec.encode_method(amqp091::CONNECTION_TUNE, &tune, &mut buf).unwrap();
//! assert_eq!(&buf[..len], &[0x07, 0xFF, 0x00, 0x02, 0x00, 0x00, 0x00, 0x3C]);
//! ```

mod bits;
mod config;
mod field;
mod method;
mod payload;
mod properties;
mod table;
mod value;
mod wire;

pub use bits::{packed_len, BitPacker, BitUnpacker};
pub use config::{CodecConfig, DEFAULT_FRAME_MAX};
pub use payload::{ContentHeader, CONTENT_HEADER_PREFIX_LEN};
pub use table::{
    kind, FieldTable, FieldTableCodec, FieldValue, TableCodec, DEFAULT_MAX_TABLE_DEPTH,
};
pub use value::{MethodInstance, PropertyList, Value};
pub use wire::{WireReader, WireWriter};

use crate::spec::{MethodNumber, ProtocolSpec};

/// Metadata-driven codec for method arguments and content properties.
#[derive(Debug, Clone)]
pub struct Codec<'s, T: TableCodec = FieldTableCodec> {
    spec: &'s ProtocolSpec,
    tables: T,
    config: CodecConfig,
}

impl<'s> Codec<'s> {
    /// Create a codec with the default configuration.
    pub fn new(spec: &'s ProtocolSpec) -> Self {
        Self::with_config(spec, CodecConfig::default())
    }

    /// Create a codec with a custom configuration.
    pub fn with_config(spec: &'s ProtocolSpec, config: CodecConfig) -> Self {
        let tables = FieldTableCodec::with_max_depth(config.max_table_depth);
        Self::with_table_codec(spec, tables, config)
    }
}

impl<'s, T: TableCodec> Codec<'s, T> {
    /// Create a codec with a caller-supplied table codec.
    pub fn with_table_codec(spec: &'s ProtocolSpec, tables: T, config: CodecConfig) -> Self {
        Self {
            spec,
            tables,
            config,
        }
    }

    /// Metadata table this codec reads.
    #[inline]
    pub fn spec(&self) -> &'s ProtocolSpec {
        self.spec
    }

    /// Active configuration.
    #[inline]
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Table codec in use.
    #[inline]
    pub fn tables(&self) -> &T {
        &self.tables
    }

    /// Whether content follows the method. Unknown numbers have none.
    pub fn has_content(&self, number: MethodNumber) -> bool {
        self.spec.has_content(number)
    }

    /// Dotted method name, or `None` for unknown numbers.
    pub fn method_name(&self, number: MethodNumber) -> Option<&'s str> {
        self.spec.method_name(number)
    }
}

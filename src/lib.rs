//! # amqp-codec
//!
//! Binary wire codec for AMQP 0-9-1 method arguments and content-header
//! property lists.
//!
//! The codec is a data-driven walker over a [`ProtocolSpec`] metadata
//! table: every method and class goes through the same generic field loop,
//! so a different protocol revision is a data change, not a code change.
//!
//! ## Architecture
//!
//! - **Metadata** ([`spec`]): domains, classes, methods and constants,
//!   resolved once into an immutable table
//! - **Codec** ([`codec`]): method arguments, packed bit runs, property
//!   lists with chained flag words, field tables
//! - **Built-in table** ([`amqp091`]): the RabbitMQ flavour of 0-9-1
//!
//! Transport framing (splitting a byte stream into frames, socket I/O) is
//! out of scope; this crate encodes and decodes frame payloads.
//!
//! ## Example
//!
//! ```
//! use amqp_codec::amqp091;
//! use amqp_codec::codec::{MethodInstance, Value};
//!
//! let codec = amqp091::codec();
//! let ack = MethodInstance::new(
//!     amqp091::BASIC_ACK,
//!     vec![Value::LongLong(42), Value::Bit(false)],
//! );
//!
//! let encoded = codec.encode_method_to_bytes(amqp091::BASIC_ACK, &ack).unwrap();
//! assert_eq!(encoded.len(), 9);
//!
//! let decoded = codec.decode_method(amqp091::BASIC_ACK, &encoded).unwrap();
//! assert_eq!(decoded, ack);
//! ```

pub mod amqp091;
pub mod codec;
pub mod error;
pub mod spec;

pub use codec::{Codec, CodecConfig, MethodInstance, PropertyList, Value};
pub use error::{CodecError, ErrorKind, Result};
pub use spec::{MethodNumber, ProtocolSpec};

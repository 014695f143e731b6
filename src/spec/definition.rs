//! Raw protocol definitions, as read from a metadata document.
//!
//! The layout follows the JSON protocol documents shipped with RabbitMQ
//! (`amqp-rabbitmq-0.9.1.json`), so such a document can be loaded as-is:
//!
//! ```text
//! {
//!   "major-version": 0, "minor-version": 9, "revision": 1, "port": 5672,
//!   "domains":   [["queue-name", "shortstr"], ...],
//!   "constants": [{"name": "NOT-FOUND", "value": 404, "class": "soft-error"}, ...],
//!   "classes":   [{"id": 60, "name": "basic",
//!                  "methods": [{"id": 40, "name": "publish", "content": true,
//!                               "arguments": [{"name": "exchange", "domain": "exchange-name"}]}],
//!                  "properties": [{"name": "content-type", "type": "shortstr"}]}]
//! }
//! ```
//!
//! Unknown keys (labels, default values, documentation) are ignored.
//! Definitions are validated and resolved by
//! [`ProtocolSpec::from_definition`](super::ProtocolSpec::from_definition).

use serde::{Deserialize, Serialize};

/// A complete protocol definition for one protocol version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolDefinition {
    /// Protocol major version.
    #[serde(rename = "major-version")]
    pub major: u8,
    /// Protocol minor version.
    #[serde(rename = "minor-version")]
    pub minor: u8,
    /// Protocol revision.
    #[serde(default)]
    pub revision: u8,
    /// Default TCP port.
    pub port: u16,
    /// `[name, target]` domain declarations.
    #[serde(default)]
    pub domains: Vec<(String, String)>,
    /// Named numeric constants.
    #[serde(default)]
    pub constants: Vec<ConstantDefinition>,
    /// Classes with their methods and properties.
    pub classes: Vec<ClassDefinition>,
}

/// A named numeric constant, optionally tagged with an error class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantDefinition {
    /// Constant name (e.g. `"NOT-FOUND"`).
    pub name: String,
    /// Constant value.
    pub value: u32,
    /// `"soft-error"`, `"hard-error"`, or absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

/// A class definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDefinition {
    /// Numeric class id.
    pub id: u16,
    /// Class name (e.g. `"basic"`).
    pub name: String,
    /// Methods, in any order.
    #[serde(default)]
    pub methods: Vec<MethodDefinition>,
    /// Content-header property fields, in wire order.
    #[serde(default)]
    pub properties: Vec<FieldDefinition>,
}

/// A method definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDefinition {
    /// Numeric method id within its class.
    pub id: u16,
    /// Method name (e.g. `"publish"`).
    pub name: String,
    /// Whether a content header and body follow the method frame.
    #[serde(default)]
    pub content: bool,
    /// Argument fields, in wire order.
    #[serde(default)]
    pub arguments: Vec<FieldDefinition>,
}

/// A field of a method argument list or a class property list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field name.
    pub name: String,
    /// Domain name; documents use either `"domain"` or `"type"`.
    #[serde(alias = "type")]
    pub domain: String,
}

impl FieldDefinition {
    /// Create a field definition.
    pub fn new(name: &str, domain: &str) -> Self {
        Self {
            name: name.to_string(),
            domain: domain.to_string(),
        }
    }
}

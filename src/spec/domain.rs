//! Domain resolution.
//!
//! Every AMQP field is typed by a *domain*. A domain is either one of the
//! primitive wire types below or an alias for another domain:
//!
//! ```text
//! queue-name ──► shortstr          (primitive)
//! no-wait    ──► bit               (primitive)
//! my-tag     ──► consumer-tag ──► shortstr
//! ```
//!
//! Resolution follows alias chains until it lands on a primitive.

use std::collections::HashMap;
use std::fmt;

use crate::error::{CodecError, Result};

/// Primitive wire type a domain resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Packed boolean, 8 per byte within a run.
    Bit,
    /// 1 byte.
    Octet,
    /// 2 bytes, big endian.
    Short,
    /// 4 bytes, big endian.
    Long,
    /// 8 bytes, big endian.
    LongLong,
    /// 8 bytes, big endian (seconds since the epoch).
    Timestamp,
    /// 1-byte length followed by up to 255 bytes.
    ShortStr,
    /// 4-byte big endian length followed by bytes.
    LongStr,
    /// Field table, delegated to the table codec.
    Table,
}

impl PrimitiveType {
    /// All primitive types.
    pub const ALL: [PrimitiveType; 9] = [
        PrimitiveType::Bit,
        PrimitiveType::Octet,
        PrimitiveType::Short,
        PrimitiveType::Long,
        PrimitiveType::LongLong,
        PrimitiveType::Timestamp,
        PrimitiveType::ShortStr,
        PrimitiveType::LongStr,
        PrimitiveType::Table,
    ];

    /// Keyword used for this type in protocol definitions.
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Bit => "bit",
            PrimitiveType::Octet => "octet",
            PrimitiveType::Short => "short",
            PrimitiveType::Long => "long",
            PrimitiveType::LongLong => "longlong",
            PrimitiveType::Timestamp => "timestamp",
            PrimitiveType::ShortStr => "shortstr",
            PrimitiveType::LongStr => "longstr",
            PrimitiveType::Table => "table",
        }
    }

    /// Parse a primitive keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.keyword() == keyword)
    }

    /// Encoded width for fixed-width types, `None` for bits, strings and tables.
    #[inline]
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            PrimitiveType::Octet => Some(1),
            PrimitiveType::Short => Some(2),
            PrimitiveType::Long => Some(4),
            PrimitiveType::LongLong | PrimitiveType::Timestamp => Some(8),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Maps domain names to primitive wire types.
#[derive(Debug, Clone, Default)]
pub struct DomainResolver {
    /// Domain name -> target domain name.
    aliases: HashMap<String, String>,
}

impl DomainResolver {
    /// Create a resolver that knows only the primitive keywords.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` as an alias for `target`.
    ///
    /// A declaration of a primitive keyword onto itself (`"bit" -> "bit"`),
    /// as protocol documents list them, is accepted and ignored.
    pub fn define(&mut self, name: &str, target: &str) {
        if name == target && PrimitiveType::from_keyword(name).is_some() {
            return;
        }
        self.aliases.insert(name.to_string(), target.to_string());
    }

    /// Number of declared aliases.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Check if no aliases are declared.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Resolve a domain name to its primitive type.
    ///
    /// Fails with [`CodecError::UnknownDomain`] when the chain hits an
    /// undeclared name or loops.
    pub fn resolve(&self, domain: &str) -> Result<PrimitiveType> {
        let mut current = domain;
        // A chain longer than the alias count must revisit a name.
        for _ in 0..=self.aliases.len() {
            if let Some(target) = self.aliases.get(current) {
                current = target;
                continue;
            }
            return PrimitiveType::from_keyword(current)
                .ok_or_else(|| CodecError::UnknownDomain(domain.to_string()));
        }
        Err(CodecError::UnknownDomain(domain.to_string()))
    }
}

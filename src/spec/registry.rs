//! Resolved, immutable protocol metadata.
//!
//! [`ProtocolSpec`] is built once from a [`ProtocolDefinition`] and never
//! mutated afterwards. All domains are resolved at build time, so the codec
//! hot path dispatches on [`PrimitiveType`] without any string lookups.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::{CodecError, Result};

use super::constants::{ConstantTable, ExceptionCategory};
use super::definition::{FieldDefinition, ProtocolDefinition};
use super::domain::{DomainResolver, PrimitiveType};

/// Usable presence bits per 16-bit flag word (bit 0 is the continuation flag).
pub const FLAG_BITS_PER_WORD: usize = 15;

/// Maximum number of chained flag words a property list may use.
pub const MAX_FLAG_WORDS: usize = 4;

/// Maximum property fields per class (`MAX_FLAG_WORDS * FLAG_BITS_PER_WORD`).
pub const MAX_PROPERTY_FIELDS: usize = MAX_FLAG_WORDS * FLAG_BITS_PER_WORD;

/// 32-bit method number: `(class_id << 16) | method_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodNumber(pub u32);

impl MethodNumber {
    /// Compose a method number from class and method ids.
    #[inline]
    pub const fn new(class_id: u16, method_id: u16) -> Self {
        Self(((class_id as u32) << 16) | method_id as u32)
    }

    /// Class id (high 16 bits).
    #[inline]
    pub const fn class_id(self) -> u16 {
        (self.0 >> 16) as u16
    }

    /// Method id within the class (low 16 bits).
    #[inline]
    pub const fn method_id(self) -> u16 {
        self.0 as u16
    }

    /// Raw 32-bit value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for MethodNumber {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for MethodNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:08X} ({}, {})",
            self.0,
            self.class_id(),
            self.method_id()
        )
    }
}

/// Presence-flag bit for the property field at `ordinal`.
///
/// Fields fill each flag word from bit 15 down to bit 1; the 16th field
/// starts the next word.
///
/// ```
/// use amqp_codec::spec::property_flag;
///
/// assert_eq!(property_flag(0), 1 << 15);
/// assert_eq!(property_flag(14), 1 << 1);
/// assert_eq!(property_flag(15), 1 << 31);
/// ```
#[inline]
pub const fn property_flag(ordinal: usize) -> u64 {
    let word = ordinal / FLAG_BITS_PER_WORD;
    let bit_within_word = 15 - (ordinal % FLAG_BITS_PER_WORD);
    1u64 << (word * 16 + bit_within_word)
}

/// A resolved argument or property field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name.
    pub name: String,
    /// Zero-based position in its list.
    pub ordinal: usize,
    /// Declared domain name.
    pub domain: String,
    /// Primitive the domain resolves to.
    pub primitive: PrimitiveType,
    /// Presence-flag mask (property fields only, 0 for arguments).
    pub flag: u64,
}

impl FieldSpec {
    /// Check if this field is a packed bit.
    #[inline]
    pub fn is_bit(&self) -> bool {
        self.primitive == PrimitiveType::Bit
    }
}

/// A resolved method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    /// Method number.
    pub number: MethodNumber,
    /// Dotted name, e.g. `"basic.publish"`.
    pub name: String,
    /// Whether a content header and body follow.
    pub has_content: bool,
    /// Argument fields in wire order.
    pub arguments: Vec<FieldSpec>,
}

/// A resolved class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSpec {
    /// Class id.
    pub id: u16,
    /// Class name.
    pub name: String,
    /// Property fields in wire order.
    pub properties: Vec<FieldSpec>,
}

impl ClassSpec {
    /// Union of all defined property flag bits.
    pub fn flag_mask(&self) -> u64 {
        self.properties.iter().fold(0, |mask, f| mask | f.flag)
    }

    /// Find a property field by name.
    pub fn property(&self, name: &str) -> Option<&FieldSpec> {
        self.properties.iter().find(|f| f.name == name)
    }
}

/// Immutable protocol metadata table.
#[derive(Debug, Clone)]
pub struct ProtocolSpec {
    major: u8,
    minor: u8,
    revision: u8,
    port: u16,
    domains: DomainResolver,
    constants: ConstantTable,
    classes: BTreeMap<u16, ClassSpec>,
    methods: HashMap<MethodNumber, MethodSpec>,
    methods_by_name: HashMap<String, MethodNumber>,
}

impl ProtocolSpec {
    /// Validate a definition and resolve every field domain.
    ///
    /// # Errors
    ///
    /// - [`CodecError::UnknownDomain`] if a field's domain does not resolve
    /// - [`CodecError::Metadata`] on duplicate class/method ids or a class
    ///   with more than [`MAX_PROPERTY_FIELDS`] properties
    pub fn from_definition(def: &ProtocolDefinition) -> Result<Self> {
        let mut domains = DomainResolver::new();
        for (name, target) in &def.domains {
            domains.define(name, target);
        }

        let constants = ConstantTable::from_definitions(&def.constants)?;

        let mut classes = BTreeMap::new();
        let mut methods = HashMap::new();
        let mut methods_by_name = HashMap::new();

        for class in &def.classes {
            if class.properties.len() > MAX_PROPERTY_FIELDS {
                return Err(CodecError::Metadata(format!(
                    "Class {} has {} property fields, at most {} are supported",
                    class.name,
                    class.properties.len(),
                    MAX_PROPERTY_FIELDS
                )));
            }

            let mut properties = resolve_fields(&domains, &class.properties)?;
            for field in &mut properties {
                field.flag = property_flag(field.ordinal);
            }

            for method in &class.methods {
                let number = MethodNumber::new(class.id, method.id);
                let spec = MethodSpec {
                    number,
                    name: format!("{}.{}", class.name, method.name),
                    has_content: method.content,
                    arguments: resolve_fields(&domains, &method.arguments)?,
                };
                if methods.contains_key(&number) {
                    return Err(CodecError::Metadata(format!(
                        "Duplicate method {}",
                        number
                    )));
                }
                methods_by_name.insert(spec.name.clone(), number);
                methods.insert(number, spec);
            }

            let spec = ClassSpec {
                id: class.id,
                name: class.name.clone(),
                properties,
            };
            if classes.insert(class.id, spec).is_some() {
                return Err(CodecError::Metadata(format!(
                    "Duplicate class id {}",
                    class.id
                )));
            }
        }

        tracing::debug!(
            "Built AMQP {}-{}-{} metadata: {} classes, {} methods",
            def.major,
            def.minor,
            def.revision,
            classes.len(),
            methods.len()
        );

        Ok(Self {
            major: def.major,
            minor: def.minor,
            revision: def.revision,
            port: def.port,
            domains,
            constants,
            classes,
            methods,
            methods_by_name,
        })
    }

    /// Parse a JSON protocol document and build the table from it.
    pub fn from_json(json: &str) -> Result<Self> {
        let def: ProtocolDefinition = serde_json::from_str(json)?;
        Self::from_definition(&def)
    }

    /// Protocol `(major, minor, revision)`.
    #[inline]
    pub fn version(&self) -> (u8, u8, u8) {
        (self.major, self.minor, self.revision)
    }

    /// Default TCP port.
    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Resolve a domain name to its primitive type.
    pub fn resolve(&self, domain: &str) -> Result<PrimitiveType> {
        self.domains.resolve(domain)
    }

    /// Look up a method by number.
    #[inline]
    pub fn method(&self, number: MethodNumber) -> Option<&MethodSpec> {
        self.methods.get(&number)
    }

    /// Look up a method number by dotted name (`"queue.declare"`).
    pub fn method_number(&self, name: &str) -> Option<MethodNumber> {
        self.methods_by_name.get(name).copied()
    }

    /// All methods, in method-number order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodSpec> {
        let mut all: Vec<&MethodSpec> = self.methods.values().collect();
        all.sort_by_key(|m| m.number);
        all.into_iter()
    }

    /// Look up a class by id.
    #[inline]
    pub fn class(&self, class_id: u16) -> Option<&ClassSpec> {
        self.classes.get(&class_id)
    }

    /// All classes, in id order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassSpec> {
        self.classes.values()
    }

    /// Dotted method name, or `None` for unknown numbers.
    pub fn method_name(&self, number: MethodNumber) -> Option<&str> {
        self.method(number).map(|m| m.name.as_str())
    }

    /// Whether content follows the method. Unknown numbers have none.
    pub fn has_content(&self, number: MethodNumber) -> bool {
        self.method(number).is_some_and(|m| m.has_content)
    }

    /// Constant table.
    #[inline]
    pub fn constants(&self) -> &ConstantTable {
        &self.constants
    }

    /// Look up a named constant.
    pub fn constant(&self, name: &str) -> Option<u32> {
        self.constants.get(name)
    }

    /// Failure scope for a reply code.
    pub fn exception_category(&self, code: u16) -> ExceptionCategory {
        self.constants.exception_category(code)
    }
}

fn resolve_fields(domains: &DomainResolver, defs: &[FieldDefinition]) -> Result<Vec<FieldSpec>> {
    defs.iter()
        .enumerate()
        .map(|(ordinal, def)| {
            Ok(FieldSpec {
                name: def.name.clone(),
                ordinal,
                domain: def.domain.clone(),
                primitive: domains.resolve(&def.domain)?,
                flag: 0,
            })
        })
        .collect()
}

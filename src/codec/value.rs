//! Decoded method and property instances.
//!
//! A [`MethodInstance`] holds one [`Value`] per argument, in declaration
//! order. A [`PropertyList`] holds a presence-flags word plus one optional
//! value per property field; bit-domain properties never store a value,
//! their presence bit is the datum.

use bytes::Bytes;

use super::table::FieldTable;
use crate::spec::{
    property_flag, ClassSpec, FieldSpec, MethodNumber, PrimitiveType, MAX_PROPERTY_FIELDS,
};

/// A value of one of the primitive wire types.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `bit`
    Bit(bool),
    /// `octet`
    Octet(u8),
    /// `short`
    Short(u16),
    /// `long`
    Long(u32),
    /// `longlong`
    LongLong(u64),
    /// `timestamp`
    Timestamp(u64),
    /// `shortstr` (at most 255 bytes on the wire)
    ShortStr(Bytes),
    /// `longstr`
    LongStr(Bytes),
    /// `table`
    Table(FieldTable),
}

impl Value {
    /// Primitive type this value encodes as.
    pub fn primitive(&self) -> PrimitiveType {
        match self {
            Value::Bit(_) => PrimitiveType::Bit,
            Value::Octet(_) => PrimitiveType::Octet,
            Value::Short(_) => PrimitiveType::Short,
            Value::Long(_) => PrimitiveType::Long,
            Value::LongLong(_) => PrimitiveType::LongLong,
            Value::Timestamp(_) => PrimitiveType::Timestamp,
            Value::ShortStr(_) => PrimitiveType::ShortStr,
            Value::LongStr(_) => PrimitiveType::LongStr,
            Value::Table(_) => PrimitiveType::Table,
        }
    }

    /// Zero value of a primitive type.
    pub fn default_for(primitive: PrimitiveType) -> Self {
        match primitive {
            PrimitiveType::Bit => Value::Bit(false),
            PrimitiveType::Octet => Value::Octet(0),
            PrimitiveType::Short => Value::Short(0),
            PrimitiveType::Long => Value::Long(0),
            PrimitiveType::LongLong => Value::LongLong(0),
            PrimitiveType::Timestamp => Value::Timestamp(0),
            PrimitiveType::ShortStr => Value::ShortStr(Bytes::new()),
            PrimitiveType::LongStr => Value::LongStr(Bytes::new()),
            PrimitiveType::Table => Value::Table(FieldTable::new()),
        }
    }

    /// Short string from text (copied).
    pub fn short_str(s: &str) -> Self {
        Value::ShortStr(Bytes::copy_from_slice(s.as_bytes()))
    }

    /// Long string from text (copied).
    pub fn long_str(s: &str) -> Self {
        Value::LongStr(Bytes::copy_from_slice(s.as_bytes()))
    }

    /// Boolean payload of a `bit`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bit(v) => Some(*v),
            _ => None,
        }
    }

    /// Any integer payload widened to u64.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Octet(v) => Some(u64::from(*v)),
            Value::Short(v) => Some(u64::from(*v)),
            Value::Long(v) => Some(u64::from(*v)),
            Value::LongLong(v) | Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    /// Raw bytes of a short or long string.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::ShortStr(b) | Value::LongStr(b) => Some(b),
            _ => None,
        }
    }

    /// Text of a short or long string, if valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Table payload.
    pub fn as_table(&self) -> Option<&FieldTable> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bit(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::Octet(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Short(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Long(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::LongLong(v)
    }
}

impl From<FieldTable> for Value {
    fn from(v: FieldTable) -> Self {
        Value::Table(v)
    }
}

/// Decoded method arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInstance {
    /// Method number the arguments belong to.
    pub number: MethodNumber,
    /// One value per argument field, in declaration order.
    pub args: Vec<Value>,
}

impl MethodInstance {
    /// Create an instance from argument values.
    pub fn new(number: impl Into<MethodNumber>, args: Vec<Value>) -> Self {
        Self {
            number: number.into(),
            args,
        }
    }

    /// Argument value by position.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Number of arguments.
    #[inline]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Check if the method has no arguments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// Decoded content-header properties for one class.
///
/// Two lists are equal when they share a class, flags, and the values of
/// their present fields. Slots of absent fields are not compared.
#[derive(Debug, Clone)]
pub struct PropertyList {
    class_id: u16,
    flags: u64,
    values: Vec<Option<Value>>,
}

impl PropertyList {
    /// Create an empty list (no property present) for `class`.
    pub fn new(class: &ClassSpec) -> Self {
        Self {
            class_id: class.id,
            flags: 0,
            values: vec![None; class.properties.len()],
        }
    }

    pub(crate) fn from_parts(class_id: u16, flags: u64, values: Vec<Option<Value>>) -> Self {
        Self {
            class_id,
            flags,
            values,
        }
    }

    /// Class the properties belong to.
    #[inline]
    pub fn class_id(&self) -> u16 {
        self.class_id
    }

    /// Presence flags, one bit per field (see [`crate::spec::property_flag`]).
    #[inline]
    pub fn flags(&self) -> u64 {
        self.flags
    }

    /// Replace the presence flags wholesale.
    ///
    /// Values of fields whose bit is cleared are dropped.
    pub fn set_flags(&mut self, flags: u64) {
        self.flags = flags;
        for (ordinal, slot) in self.values.iter_mut().enumerate() {
            if flags & flag_at(ordinal) == 0 {
                *slot = None;
            }
        }
    }

    /// Check if `field`'s presence bit is set.
    #[inline]
    pub fn is_present(&self, field: &FieldSpec) -> bool {
        self.flags & field.flag != 0
    }

    /// Value of a present non-bit field.
    pub fn get(&self, field: &FieldSpec) -> Option<&Value> {
        if !self.is_present(field) {
            return None;
        }
        self.value_at(field.ordinal)
    }

    /// Stored value by ordinal, regardless of presence.
    #[inline]
    pub fn value_at(&self, ordinal: usize) -> Option<&Value> {
        self.values.get(ordinal).and_then(Option::as_ref)
    }

    /// Mark `field` present with `value`.
    ///
    /// For bit-domain fields the boolean sets or clears the presence bit and
    /// nothing is stored. A non-`Bit` value for a bit-domain field is ignored
    /// and leaves the flags unchanged.
    pub fn set(&mut self, field: &FieldSpec, value: Value) {
        if field.is_bit() {
            match value {
                Value::Bit(true) => self.flags |= field.flag,
                Value::Bit(false) => self.flags &= !field.flag,
                other => tracing::debug!(
                    "Ignoring {:?} value for bit property {}",
                    other.primitive(),
                    field.name
                ),
            }
            return;
        }
        if self.values.len() <= field.ordinal {
            self.values.resize(field.ordinal + 1, None);
        }
        self.flags |= field.flag;
        self.values[field.ordinal] = Some(value);
    }

    /// Mark `field` absent and drop its value.
    pub fn clear(&mut self, field: &FieldSpec) {
        self.flags &= !field.flag;
        if let Some(slot) = self.values.get_mut(field.ordinal) {
            *slot = None;
        }
    }
}

impl PartialEq for PropertyList {
    fn eq(&self, other: &Self) -> bool {
        if self.class_id != other.class_id || self.flags != other.flags {
            return false;
        }
        let slots = self.values.len().max(other.values.len());
        (0..slots)
            .filter(|&ordinal| self.flags & flag_at(ordinal) != 0)
            .all(|ordinal| self.value_at(ordinal) == other.value_at(ordinal))
    }
}

/// Presence bit of `ordinal`, zero past the last encodable field.
fn flag_at(ordinal: usize) -> u64 {
    if ordinal < MAX_PROPERTY_FIELDS {
        property_flag(ordinal)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, ordinal: usize, primitive: PrimitiveType) -> FieldSpec {
        FieldSpec {
            name: name.to_string(),
            ordinal,
            domain: primitive.keyword().to_string(),
            primitive,
            flag: property_flag(ordinal),
        }
    }

    fn class() -> ClassSpec {
        ClassSpec {
            id: 60,
            name: "basic".to_string(),
            properties: vec![
                field("content-type", 0, PrimitiveType::ShortStr),
                field("flag", 1, PrimitiveType::Bit),
                field("priority", 2, PrimitiveType::Octet),
            ],
        }
    }

    #[test]
    fn test_value_primitive_matches_default() {
        for p in PrimitiveType::ALL {
            assert_eq!(Value::default_for(p).primitive(), p);
        }
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(7u8).as_u64(), Some(7));
        assert_eq!(Value::Timestamp(9).as_u64(), Some(9));
        assert_eq!(Value::short_str("go").as_str(), Some("go"));
        assert_eq!(Value::long_str("x").primitive(), PrimitiveType::LongStr);
        assert_eq!(Value::Octet(1).as_str(), None);
        assert!(Value::from(FieldTable::new()).as_table().unwrap().is_empty());
    }

    #[test]
    fn test_property_set_get_clear() {
        let class = class();
        let content_type = &class.properties[0];
        let priority = &class.properties[2];

        let mut props = PropertyList::new(&class);
        assert_eq!(props.flags(), 0);
        assert!(props.get(content_type).is_none());

        props.set(content_type, Value::short_str("text/plain"));
        props.set(priority, Value::Octet(5));
        assert_eq!(props.flags(), 0x8000 | 0x2000);
        assert_eq!(props.get(priority), Some(&Value::Octet(5)));

        props.clear(content_type);
        assert!(!props.is_present(content_type));
        assert!(props.get(content_type).is_none());
        assert_eq!(props.flags(), 0x2000);
    }

    #[test]
    fn test_bit_property_is_presence_only() {
        let class = class();
        let flag = &class.properties[1];

        let mut props = PropertyList::new(&class);
        props.set(flag, Value::Bit(true));
        assert!(props.is_present(flag));
        assert_eq!(props.value_at(1), None);

        props.set(flag, Value::Bit(false));
        assert!(!props.is_present(flag));
    }

    #[test]
    fn test_bit_property_ignores_other_values() {
        let class = class();
        let flag = &class.properties[1];

        let mut props = PropertyList::new(&class);
        props.set(flag, Value::Bit(true));
        props.set(flag, Value::Octet(0));
        assert!(props.is_present(flag));
        assert_eq!(props.value_at(1), None);
    }

    #[test]
    fn test_set_flags_drops_cleared_values() {
        let class = class();
        let content_type = &class.properties[0];
        let priority = &class.properties[2];

        let mut props = PropertyList::new(&class);
        props.set(content_type, Value::short_str("a/b"));
        props.set(priority, Value::Octet(3));
        props.set_flags(priority.flag);

        assert_eq!(props.value_at(0), None);
        assert_eq!(props.get(priority), Some(&Value::Octet(3)));
    }

    #[test]
    fn test_equality_ignores_absent_slots() {
        let class = class();
        let content_type = &class.properties[0];

        let mut stale = PropertyList::new(&class);
        stale.values[0] = Some(Value::short_str("a/b"));
        assert_eq!(stale, PropertyList::new(&class));

        stale.set(content_type, Value::short_str("a/b"));
        assert_ne!(stale, PropertyList::new(&class));

        let mut other = PropertyList::new(&class);
        other.set(content_type, Value::short_str("c/d"));
        assert_ne!(stale, other);
    }

    #[test]
    fn test_flags_accessors() {
        let class = class();
        let mut props = PropertyList::new(&class);
        props.set_flags(0x4000);
        assert!(props.is_present(&class.properties[1]));
        assert_eq!(props.class_id(), 60);
    }
}

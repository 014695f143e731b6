//! Protocol metadata - domains, classes, methods, constants.
//!
//! This module holds the read-only tables the codec walks:
//! - Domain resolution (alias chains down to primitive wire types)
//! - Raw definitions as found in protocol documents
//! - The resolved [`ProtocolSpec`] keyed by method number and class id
//! - Constants and reply-code exception categories

mod constants;
mod definition;
mod domain;
mod registry;

pub use constants::{Constant, ConstantTable, ExceptionCategory};
pub use definition::{
    ClassDefinition, ConstantDefinition, FieldDefinition, MethodDefinition, ProtocolDefinition,
};
pub use domain::{DomainResolver, PrimitiveType};
pub use registry::{
    property_flag, ClassSpec, FieldSpec, MethodNumber, MethodSpec, ProtocolSpec,
    FLAG_BITS_PER_WORD, MAX_FLAG_WORDS, MAX_PROPERTY_FIELDS,
};

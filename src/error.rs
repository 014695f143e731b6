//! Error types for amqp-codec.

use thiserror::Error;

use crate::spec::MethodNumber;

/// Main error type for all codec operations.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Method number not present in the protocol metadata.
    #[error("Unknown method: {0}")]
    UnknownMethod(MethodNumber),

    /// Class id not present in the protocol metadata.
    #[error("Unknown class: {0}")]
    UnknownClass(u16),

    /// Domain name does not resolve to a primitive wire type.
    #[error("Unknown domain: {0}")]
    UnknownDomain(String),

    /// Input ended early, carried a corrupt length prefix, or held an
    /// undecodable nested table.
    #[error("Malformed frame at offset {offset} (field '{field}'): {reason}")]
    MalformedFrame {
        /// Field being decoded when the failure happened.
        field: String,
        /// Byte offset into the input.
        offset: usize,
        /// Human readable cause.
        reason: String,
    },

    /// Output buffer too small for the encoded value.
    #[error(
        "Buffer overflow at offset {offset} (field '{field}'): need {needed} bytes, {available} available"
    )]
    BufferOverflow {
        /// Field being encoded when the buffer ran out.
        field: String,
        /// Byte offset into the output buffer.
        offset: usize,
        /// Bytes the write needed.
        needed: usize,
        /// Bytes left in the buffer.
        available: usize,
    },

    /// Instance value does not fit the field's metadata.
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidValue {
        /// Offending field.
        field: String,
        /// Human readable cause.
        reason: String,
    },

    /// Protocol metadata definition is inconsistent.
    #[error("Invalid protocol metadata: {0}")]
    Metadata(String),

    /// Metadata document could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of a [`CodecError`], for deciding failure scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`CodecError::UnknownMethod`].
    UnknownMethod,
    /// See [`CodecError::UnknownClass`].
    UnknownClass,
    /// See [`CodecError::UnknownDomain`].
    UnknownDomain,
    /// See [`CodecError::MalformedFrame`].
    MalformedFrame,
    /// See [`CodecError::BufferOverflow`].
    BufferOverflow,
    /// See [`CodecError::InvalidValue`].
    InvalidValue,
    /// Metadata or metadata-document failure.
    Metadata,
}

impl CodecError {
    /// Shorthand for a [`CodecError::MalformedFrame`] with no field attached yet.
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedFrame {
            field: String::new(),
            offset,
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`CodecError::InvalidValue`] with no field attached yet.
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: String::new(),
            reason: reason.into(),
        }
    }

    /// Attach a field name to a frame/value error that does not carry one yet.
    ///
    /// An error that already names a field keeps it.
    pub(crate) fn in_field(mut self, name: &str) -> Self {
        match &mut self {
            Self::MalformedFrame { field, .. }
            | Self::BufferOverflow { field, .. }
            | Self::InvalidValue { field, .. }
                if field.is_empty() =>
            {
                name.clone_into(field);
            }
            _ => {}
        }
        self
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownMethod(_) => ErrorKind::UnknownMethod,
            Self::UnknownClass(_) => ErrorKind::UnknownClass,
            Self::UnknownDomain(_) => ErrorKind::UnknownDomain,
            Self::MalformedFrame { .. } => ErrorKind::MalformedFrame,
            Self::BufferOverflow { .. } => ErrorKind::BufferOverflow,
            Self::InvalidValue { .. } => ErrorKind::InvalidValue,
            Self::Metadata(_) | Self::Json(_) => ErrorKind::Metadata,
        }
    }

    /// Name of the offending field, if the error is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MalformedFrame { field, .. }
            | Self::BufferOverflow { field, .. }
            | Self::InvalidValue { field, .. }
                if !field.is_empty() =>
            {
                Some(field)
            }
            _ => None,
        }
    }

    /// Byte offset of the failure, for frame and buffer errors.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::MalformedFrame { offset, .. } | Self::BufferOverflow { offset, .. } => {
                Some(*offset)
            }
            _ => None,
        }
    }
}

/// Result type alias using CodecError.
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_field_fills_empty_name() {
        let err = CodecError::malformed(3, "short read").in_field("mechanism");
        assert_eq!(err.field(), Some("mechanism"));
        assert_eq!(err.offset(), Some(3));
        assert_eq!(err.kind(), ErrorKind::MalformedFrame);
    }

    #[test]
    fn test_in_field_keeps_inner_name() {
        let err = CodecError::malformed(9, "bad tag")
            .in_field("x-match")
            .in_field("arguments");
        assert_eq!(err.field(), Some("x-match"));
    }

    #[test]
    fn test_display_mentions_field_and_offset() {
        let err = CodecError::BufferOverflow {
            field: "routing-key".to_string(),
            offset: 12,
            needed: 8,
            available: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("routing-key"));
        assert!(msg.contains("offset 12"));
    }

    #[test]
    fn test_lookup_errors_have_no_field() {
        let err = CodecError::UnknownClass(99);
        assert_eq!(err.field(), None);
        assert_eq!(err.offset(), None);
        assert_eq!(err.kind(), ErrorKind::UnknownClass);
    }
}

//! Codec configuration.

use super::table::DEFAULT_MAX_TABLE_DEPTH;

/// Default maximum frame payload (the 0-9-1 `frame-max` most brokers offer).
pub const DEFAULT_FRAME_MAX: usize = 131_072;

/// Configuration for a [`Codec`](super::Codec).
///
/// # Example
///
/// ```
/// use amqp_codec::codec::CodecConfig;
///
/// let config = CodecConfig::default()
///     .with_frame_max(4096)
///     .with_max_table_depth(8);
/// assert_eq!(config.frame_max, 4096);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Buffer size used by the allocating encoders; a payload that does not
    /// fit is a [`BufferOverflow`](crate::CodecError::BufferOverflow).
    pub frame_max: usize,
    /// Maximum nesting of tables and arrays accepted by the default table codec.
    pub max_table_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            frame_max: DEFAULT_FRAME_MAX,
            max_table_depth: DEFAULT_MAX_TABLE_DEPTH,
        }
    }
}

impl CodecConfig {
    /// Set the maximum frame payload size.
    pub fn with_frame_max(mut self, frame_max: usize) -> Self {
        self.frame_max = frame_max;
        self
    }

    /// Set the maximum table nesting depth.
    pub fn with_max_table_depth(mut self, depth: usize) -> Self {
        self.max_table_depth = depth;
        self
    }
}

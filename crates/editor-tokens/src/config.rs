//! Tokenizer configuration.

use crate::registry::BufferId;
use serde::Deserialize;

/// Default number of rows tokenized per scheduling tick.
pub const DEFAULT_CHUNK_SIZE: usize = 50;

/// Options for a [`TokenizedBuffer`](crate::TokenizedBuffer).
///
/// Deserializable so hosts can keep it next to the rest of their settings; every field has a
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Rows tokenized per tick, and the synchronous window for an edit. Clamped to at least 1.
    pub chunk_size: usize,
    /// Force placeholder mode: every row is one root-scope token and nothing is scheduled.
    pub large_file_mode: bool,
    /// Enter large-file mode when the buffer is bigger than this many bytes at construction.
    pub large_file_threshold: Option<usize>,
    /// Identity reported in diagnostics and used as the registry key. Allocated when absent.
    pub buffer_id: Option<BufferId>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            large_file_mode: false,
            large_file_threshold: None,
            buffer_id: None,
        }
    }
}

impl TokenizerConfig {
    /// Set the chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Force large-file mode on or off.
    pub fn with_large_file_mode(mut self, enabled: bool) -> Self {
        self.large_file_mode = enabled;
        self
    }

    /// Set the large-file byte threshold.
    pub fn with_large_file_threshold(mut self, bytes: usize) -> Self {
        self.large_file_threshold = Some(bytes);
        self
    }

    /// Use a fixed buffer id.
    pub fn with_buffer_id(mut self, id: BufferId) -> Self {
        self.buffer_id = Some(id);
        self
    }

    /// Chunk size actually used (never zero).
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }

    /// Whether a buffer of `byte_len` bytes should be handled in large-file mode.
    pub fn is_large_file(&self, byte_len: usize) -> bool {
        self.large_file_mode
            || self
                .large_file_threshold
                .is_some_and(|threshold| byte_len > threshold)
    }
}

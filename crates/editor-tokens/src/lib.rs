#![warn(missing_docs)]
//! Editor Tokens - incremental scope tokenization for live editor buffers
//!
//! # Overview
//!
//! `editor-tokens` keeps, for every row of an editable buffer, a classification of the text
//! into nested lexical scopes (`source.js`, `string.quoted.double.js`, ...). It stays
//! consistent under localized edits without rescanning the whole document: an edit
//! re-tokenizes a bounded window synchronously, and the remaining rows are drained by
//! cooperative ticks that stop as soon as a row's end state matches what was cached.
//!
//! The pattern matcher and the text storage are collaborators behind the [`Grammar`] and
//! [`TextBuffer`] traits. [`RopeBuffer`] is a ready-made buffer; a TextMate-style grammar lives
//! in the `editor-tokens-textmate` crate.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  TokenizedBuffer (cache, queue, scheduler)  │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  TokenizedBufferIterator / TokenIterator    │  ← Consumers
//! ├─────────────────────────────────────────────┤
//! │  TokenizedLine + tag stream                 │  ← Per-row data
//! ├─────────────────────────────────────────────┤
//! │  Grammar / TextBuffer collaborators         │  ← Pluggable
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use editor_tokens::{Range, RopeBuffer, TokenizedBuffer, TokenizerConfig};
//!
//! let mut tokenized = TokenizedBuffer::new(
//!     RopeBuffer::from_text("first\nsecond"),
//!     None,
//!     TokenizerConfig::default().with_chunk_size(10),
//! );
//! tokenized.set_visible(true);
//!
//! tokenized.on_did_invalidate_range(|range| println!("re-render {range:?}"));
//! tokenized
//!     .edit(Range::empty((1, 0)), "a ")
//!     .unwrap();
//!
//! while tokenized.run_pending_chunk() {}
//! let scopes = tokenized.scope_descriptor_for_position((1, 3));
//! assert_eq!(scopes.scopes(), &["text.plain.null-grammar".to_string()]);
//! ```
//!
//! # Module Description
//!
//! - [`tag`] - tag stream encoding and scope replay
//! - [`line`] - immutable tokenized rows
//! - [`token_iterator`] - token cursor over one row
//! - [`buffer_iterator`] - boundary cursor across rows
//! - [`tokenized_buffer`] - the orchestrator
//! - [`invalidation`] - invalid-row queue
//! - [`grammar`] / [`buffer`] - collaborator interfaces

pub mod buffer;
pub mod buffer_iterator;
pub mod class_names;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod grammar;
pub mod invalidation;
pub mod line;
pub mod line_ending;
pub mod point;
pub mod registry;
pub mod selector;
pub mod state;
pub mod tag;
pub mod token_iterator;
pub mod tokenized_buffer;

pub use buffer::{BufferChange, EditableBuffer, RopeBuffer, TextBuffer};
pub use buffer_iterator::TokenizedBufferIterator;
pub use class_names::{ClassNameCache, class_name_for_scope};
pub use config::{DEFAULT_CHUNK_SIZE, TokenizerConfig};
pub use diagnostics::{DiagnosticHandler, TokenizeDiagnostic};
pub use error::{BufferError, GrammarError};
pub use events::{EventEmitter, SubscriptionId, TokenizeEvent, TokenizeEventCallback};
pub use grammar::{Grammar, LineTokens, NullGrammar, placeholder_tags};
pub use invalidation::InvalidRows;
pub use line::{Token, TokenizedLine};
pub use line_ending::LineEnding;
pub use point::{Point, Range};
pub use registry::{BufferId, BufferRegistry};
pub use selector::{ScopeDescriptor, selector_matches_any_scope, selector_matches_scope};
pub use state::{EndState, LineState};
pub use tag::{ScopeId, ScopeReplay, Tag, scopes_from_tags, text_len};
pub use token_iterator::TokenIterator;
pub use tokenized_buffer::TokenizedBuffer;

#![warn(missing_docs)]
//! `editor-tokens-textmate` - TextMate-style pattern grammars for `editor-tokens`.
//!
//! Grammars are loaded from YAML or JSON (`scopeName`, `patterns`, `repository`, ...),
//! compiled once with Oniguruma regexes, and then tokenize one line at a time. The end state
//! of a line is the stack of begin/end regions still open, so an edit that does not change
//! which regions are open stops re-tokenization right away.
//!
//! ```rust
//! use editor_tokens::{RopeBuffer, TokenizedBuffer, TokenizerConfig};
//! use editor_tokens_textmate::TextMateGrammar;
//! use std::sync::Arc;
//!
//! let grammar = TextMateGrammar::from_yaml(
//!     r#"
//! scopeName: source.demo
//! patterns:
//!   - match: '\d+'
//!     name: constant.numeric.demo
//! "#,
//! )
//! .unwrap();
//!
//! let mut tokenized = TokenizedBuffer::new(
//!     RopeBuffer::from_text("x = 42"),
//!     Some(Arc::new(grammar)),
//!     TokenizerConfig::default(),
//! );
//! tokenized.set_visible(true);
//! while tokenized.run_pending_chunk() {}
//!
//! let scopes = tokenized.scope_descriptor_for_position((0, 5));
//! assert_eq!(scopes.scopes(), &["source.demo", "constant.numeric.demo"]);
//! ```

mod compiler;
mod definition;
mod engine;
mod error;
mod grammar;
mod scope;
mod set;

pub use compiler::{CaptureScopes, CompiledGrammar, MatchRule, RegionRule, Rule, RuleId};
pub use definition::{CaptureSpec, GrammarDefinition, RawRule};
pub use engine::{RuleStack, tokenize_line};
pub use error::TextMateError;
pub use grammar::TextMateGrammar;
pub use scope::ScopeRegistry;
pub use set::GrammarSet;

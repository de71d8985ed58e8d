//! Out-of-band reports about grammar misbehavior.
//!
//! Tokenization never fails outright: when a grammar produces an unbalanced tag stream or
//! errors on a row, the engine recovers and reports what happened through the installed
//! [`DiagnosticHandler`], and also logs it with `tracing`.

use crate::error::GrammarError;
use crate::registry::BufferId;
use std::fmt;
use std::path::PathBuf;

/// A recoverable problem found while tokenizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizeDiagnostic {
    /// A close tag had no matching open scope.
    UnmatchedScopeEnd {
        /// Buffer being tokenized.
        buffer_id: BufferId,
        /// Offending row.
        row: usize,
        /// Root scope of the grammar that produced the tags.
        grammar_scope: String,
        /// Name of the unmatched scope, if the grammar knows it.
        unmatched_scope: Option<String>,
        /// Buffer path, when file-backed.
        path: Option<PathBuf>,
        /// Full buffer contents at the time of the report.
        contents: String,
    },
    /// The grammar returned an error; the row was given a fallback tokenization.
    GrammarFault {
        /// Buffer being tokenized.
        buffer_id: BufferId,
        /// Offending row.
        row: usize,
        /// What the grammar reported.
        error: GrammarError,
    },
}

impl TokenizeDiagnostic {
    /// Row the diagnostic refers to.
    pub fn row(&self) -> usize {
        match self {
            Self::UnmatchedScopeEnd { row, .. } | Self::GrammarFault { row, .. } => *row,
        }
    }
}

impl fmt::Display for TokenizeDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmatchedScopeEnd {
                buffer_id,
                row,
                grammar_scope,
                unmatched_scope,
                ..
            } => write!(
                f,
                "{buffer_id}: encountered an unmatched scope end tag on row {row} ({grammar_scope}, scope {})",
                unmatched_scope.as_deref().unwrap_or("<unknown>")
            ),
            Self::GrammarFault {
                buffer_id,
                row,
                error,
            } => write!(f, "{buffer_id}: row {row}: {error}"),
        }
    }
}

/// Diagnostic callback function type
pub type DiagnosticHandler = Box<dyn FnMut(&TokenizeDiagnostic) + Send>;

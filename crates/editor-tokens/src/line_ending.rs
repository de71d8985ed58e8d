//! Line ending helpers.
//!
//! Every row except the last one is terminated by a newline sequence. Tokenized lines keep the
//! terminator of the row they were built from so consumers can reconstruct the exact text.

/// The newline sequence terminating a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineEnding {
    /// Unix-style LF (`'\n'`).
    Lf,
    /// Windows-style CRLF (`"\r\n"`).
    Crlf,
}

impl LineEnding {
    /// Detect the terminator at the end of a raw row slice (which may include it).
    ///
    /// Returns `None` for the last row of a document, which has no terminator.
    pub fn detect_at_end(raw_line: &str) -> Option<Self> {
        if raw_line.ends_with("\r\n") {
            Some(Self::Crlf)
        } else if raw_line.ends_with('\n') {
            Some(Self::Lf)
        } else {
            None
        }
    }

    /// The literal newline sequence.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }
}

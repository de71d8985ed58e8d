use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while loading or compiling a TextMate grammar.
pub enum TextMateError {
    #[error("YAML parse error: {0}")]
    /// YAML parsing failed.
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    /// JSON parsing failed.
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    /// Filesystem I/O failed.
    Io(#[from] std::io::Error),

    #[error("missing required field: {0}")]
    /// A required field was missing from a rule.
    MissingField(&'static str),

    #[error("unknown include '{0}'")]
    /// An `include` could not be resolved within the grammar.
    UnknownInclude(String),

    #[error("regex compile error for pattern '{pattern}': {message}")]
    /// A regex pattern failed to compile.
    RegexCompile {
        /// The regex pattern string.
        pattern: String,
        /// The compiler error message.
        message: String,
    },
}

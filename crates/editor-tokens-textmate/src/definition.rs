use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Raw TextMate grammar, as found in `.tmLanguage.json` / `.tmLanguage.yaml` files.
pub struct GrammarDefinition {
    #[serde(default)]
    /// Optional human-readable name.
    pub name: Option<String>,

    /// Root scope (e.g. `source.js`).
    pub scope_name: String,

    #[serde(default)]
    /// File extensions associated with this grammar.
    pub file_types: Vec<String>,

    #[serde(default)]
    /// Optional regex matched against the first line to detect the grammar.
    pub first_line_match: Option<String>,

    #[serde(default)]
    /// Top-level rules.
    pub patterns: Vec<RawRule>,

    #[serde(default)]
    /// Named rules, referenced with `include: '#name'`.
    pub repository: HashMap<String, RawRule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One rule of a grammar.
///
/// Which fields are set decides the kind: `match` makes a single-match rule, `begin` a
/// begin/end region, `include` a reference, and a bare `patterns` list a group.
pub struct RawRule {
    #[serde(default)]
    /// Scope applied to the matched text (or the whole region).
    pub name: Option<String>,

    #[serde(default)]
    /// Scope applied between the begin and end matches of a region.
    pub content_name: Option<String>,

    #[serde(default, rename = "match")]
    /// Single-match regex.
    pub regex: Option<String>,

    #[serde(default)]
    /// Region start regex.
    pub begin: Option<String>,

    #[serde(default)]
    /// Region end regex.
    pub end: Option<String>,

    #[serde(default)]
    /// `#name` or `$self`.
    pub include: Option<String>,

    #[serde(default)]
    /// Capture scopes for `match`, or for both `begin` and `end` when the specific maps are
    /// absent.
    pub captures: HashMap<u32, CaptureSpec>,

    #[serde(default)]
    /// Capture scopes for `begin`.
    pub begin_captures: HashMap<u32, CaptureSpec>,

    #[serde(default)]
    /// Capture scopes for `end`.
    pub end_captures: HashMap<u32, CaptureSpec>,

    #[serde(default)]
    /// Nested rules active inside a region, or the members of a group.
    pub patterns: Vec<RawRule>,

    #[serde(default)]
    /// Optional comment (ignored).
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
/// Scope for one capture group.
pub struct CaptureSpec {
    #[serde(default)]
    /// Scope applied to the captured text.
    pub name: Option<String>,
}

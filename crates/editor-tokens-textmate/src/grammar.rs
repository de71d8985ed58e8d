use crate::compiler::CompiledGrammar;
use crate::definition::GrammarDefinition;
use crate::engine::{self, RuleStack};
use crate::error::TextMateError;
use crate::scope::ScopeRegistry;
use editor_tokens::{Grammar, GrammarError, LineState, LineTokens, ScopeId};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// A compiled TextMate grammar usable as an [`editor_tokens::Grammar`].
///
/// The end state handed to the engine is the stack of open begin/end regions
/// ([`RuleStack`]); two rows end in the same state exactly when the same regions are open.
#[derive(Debug)]
pub struct TextMateGrammar {
    compiled: CompiledGrammar,
    generation: AtomicU64,
}

impl TextMateGrammar {
    /// Compile a parsed definition.
    pub fn compile(definition: GrammarDefinition) -> Result<Self, TextMateError> {
        Ok(Self {
            compiled: CompiledGrammar::compile(definition)?,
            generation: AtomicU64::new(0),
        })
    }

    /// Parse and compile a YAML grammar.
    pub fn from_yaml(yaml: &str) -> Result<Self, TextMateError> {
        let definition: GrammarDefinition = serde_yaml::from_str(yaml)?;
        Self::compile(definition)
    }

    /// Parse and compile a JSON grammar (`.tmLanguage.json`).
    pub fn from_json(json: &str) -> Result<Self, TextMateError> {
        let definition: GrammarDefinition = serde_json::from_str(json)?;
        Self::compile(definition)
    }

    /// Load a grammar file. `.json` files are parsed as JSON, anything else as YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TextMateError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&source)
        } else {
            Self::from_yaml(&source)
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> Option<&str> {
        self.compiled.name.as_deref()
    }

    /// File extensions (or whole file names) this grammar is meant for.
    pub fn file_types(&self) -> &[String] {
        &self.compiled.file_types
    }

    /// Whether `line` matches the grammar's `firstLineMatch`.
    pub fn first_line_match(&self, line: &str) -> bool {
        self.compiled
            .first_line_match
            .as_ref()
            .is_some_and(|regex| regex.find(line).is_some())
    }

    /// Scope names used by this grammar.
    pub fn scopes(&self) -> &ScopeRegistry {
        &self.compiled.scopes
    }

    /// The compiled rules.
    pub fn compiled(&self) -> &CompiledGrammar {
        &self.compiled
    }

    /// Signal that the rules this grammar depends on changed. Buffers using the grammar
    /// re-tokenize the next time they check.
    pub fn mark_updated(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl Grammar for TextMateGrammar {
    fn scope_name(&self) -> &str {
        &self.compiled.scope_name
    }

    fn root_scope_id(&self) -> ScopeId {
        self.compiled.root_scope
    }

    fn scope_name_for_id(&self, id: ScopeId) -> Option<&str> {
        self.compiled.scopes.scope_for_id(id)
    }

    fn tokenize_line(
        &self,
        text: &str,
        prior: Option<&LineState>,
        is_first_line: bool,
    ) -> Result<LineTokens, GrammarError> {
        let stack = match prior {
            Some(state) => state
                .downcast_ref::<RuleStack>()
                .cloned()
                .ok_or(GrammarError::ForeignState)?,
            None => RuleStack::default(),
        };

        let (tags, stack) = engine::tokenize_line(&self.compiled, text, stack, is_first_line)?;
        Ok(LineTokens {
            tags,
            state: LineState::new(stack),
        })
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

use crate::error::TextMateError;
use crate::grammar::TextMateGrammar;
use editor_tokens::Grammar;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
/// A collection of compiled grammars, with lookup by scope and selection for a file.
pub struct GrammarSet {
    grammars: Vec<Arc<TextMateGrammar>>,
    by_scope: HashMap<String, Arc<TextMateGrammar>>,
}

impl GrammarSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a compiled grammar, replacing any grammar with the same scope name.
    pub fn add(&mut self, grammar: TextMateGrammar) -> Arc<TextMateGrammar> {
        let grammar = Arc::new(grammar);
        let scope = grammar.scope_name().to_string();
        debug!(scope = %scope, "registered grammar");
        if let Some(previous) = self.by_scope.insert(scope, grammar.clone()) {
            self.grammars.retain(|existing| !Arc::ptr_eq(existing, &previous));
        }
        self.grammars.push(grammar.clone());
        grammar
    }

    /// Compile a YAML grammar and add it.
    pub fn load_from_yaml(&mut self, yaml: &str) -> Result<Arc<TextMateGrammar>, TextMateError> {
        Ok(self.add(TextMateGrammar::from_yaml(yaml)?))
    }

    /// Compile a JSON grammar and add it.
    pub fn load_from_json(&mut self, json: &str) -> Result<Arc<TextMateGrammar>, TextMateError> {
        Ok(self.add(TextMateGrammar::from_json(json)?))
    }

    /// Load a grammar file and add it.
    pub fn load_from_path(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<Arc<TextMateGrammar>, TextMateError> {
        Ok(self.add(TextMateGrammar::from_path(path)?))
    }

    /// Get a grammar by its scope name (e.g. `"source.js"`).
    pub fn get_by_scope(&self, scope: &str) -> Option<Arc<TextMateGrammar>> {
        self.by_scope.get(scope).cloned()
    }

    /// Pick a grammar for a file.
    ///
    /// A grammar listing the file's name or extension in its `fileTypes` wins; otherwise the
    /// first grammar whose `firstLineMatch` accepts `first_line`.
    pub fn select(&self, path: Option<&Path>, first_line: &str) -> Option<Arc<TextMateGrammar>> {
        let file_name = path
            .and_then(Path::file_name)
            .and_then(|name| name.to_str());
        let extension = path
            .and_then(Path::extension)
            .and_then(|extension| extension.to_str());

        let by_file_type = self.grammars.iter().find(|grammar| {
            grammar.file_types().iter().any(|file_type| {
                Some(file_type.as_str()) == extension || Some(file_type.as_str()) == file_name
            })
        });

        by_file_type
            .or_else(|| {
                self.grammars
                    .iter()
                    .find(|grammar| grammar.first_line_match(first_line))
            })
            .cloned()
    }

    /// Number of grammars.
    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }
}

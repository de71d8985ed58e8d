//! CSS-style class names for scopes.

use crate::grammar::Grammar;
use crate::tag::ScopeId;
use std::collections::HashMap;

/// Memoized `syntax--` class strings per scope id.
///
/// Valid for one grammar; call [`clear`](Self::clear) when the grammar changes.
#[derive(Debug, Default, Clone)]
pub struct ClassNameCache {
    names: HashMap<ScopeId, Option<String>>,
}

impl ClassNameCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Class string for `id`: each dotted component of the scope name prefixed with
    /// `syntax--`, space separated. `None` when the grammar does not know the id.
    pub fn class_name_for_scope_id(&mut self, grammar: &dyn Grammar, id: ScopeId) -> Option<&str> {
        self.names
            .entry(id)
            .or_insert_with(|| grammar.scope_name_for_id(id).map(class_name_for_scope))
            .as_deref()
    }

    /// Forget every cached name.
    pub fn clear(&mut self) {
        self.names.clear();
    }
}

/// `"meta.function.js"` becomes `"syntax--meta syntax--function syntax--js"`.
pub fn class_name_for_scope(scope: &str) -> String {
    scope
        .split('.')
        .filter(|part| !part.is_empty())
        .map(|part| format!("syntax--{part}"))
        .collect::<Vec<_>>()
        .join(" ")
}

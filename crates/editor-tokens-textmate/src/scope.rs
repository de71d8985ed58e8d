use editor_tokens::ScopeId;
use std::collections::HashMap;

/// Dense, stable scope-name to [`ScopeId`] mapping for one grammar.
///
/// Ids start at 1 and are never reused, so tags produced before and after a lookup agree.
#[derive(Debug, Default, Clone)]
pub struct ScopeRegistry {
    scope_to_id: HashMap<String, ScopeId>,
    id_to_scope: Vec<String>,
}

impl ScopeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (or allocate) the id of a scope name.
    pub fn id_for_scope(&mut self, scope: &str) -> ScopeId {
        if let Some(&id) = self.scope_to_id.get(scope) {
            return id;
        }

        let id = ScopeId(self.id_to_scope.len() as u32 + 1);
        self.id_to_scope.push(scope.to_string());
        self.scope_to_id.insert(scope.to_string(), id);
        id
    }

    /// Ids for a whitespace-separated scope list (`"meta.a meta.b"`).
    pub fn ids_for_scopes(&mut self, scopes: Option<&str>) -> Vec<ScopeId> {
        scopes
            .unwrap_or_default()
            .split_whitespace()
            .map(|scope| self.id_for_scope(scope))
            .collect()
    }

    /// Return the scope name for a previously allocated id.
    pub fn scope_for_id(&self, id: ScopeId) -> Option<&str> {
        let index = (id.0 as usize).checked_sub(1)?;
        self.id_to_scope.get(index).map(String::as_str)
    }

    /// Number of distinct scopes.
    pub fn len(&self) -> usize {
        self.id_to_scope.len()
    }

    /// Whether no scope has been allocated.
    pub fn is_empty(&self) -> bool {
        self.id_to_scope.is_empty()
    }
}

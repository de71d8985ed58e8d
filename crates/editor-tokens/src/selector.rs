//! Scope descriptors and simple class selectors.

use std::fmt;

/// The stack of scope names enclosing a buffer position, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ScopeDescriptor {
    scopes: Vec<String>,
}

impl ScopeDescriptor {
    /// Build a descriptor from scope names (outermost first).
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }

    /// Scope names, outermost first.
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Whether `selector` matches any scope in the descriptor.
    pub fn matches(&self, selector: &str) -> bool {
        selector_matches_any_scope(selector, &self.scopes)
    }
}

impl fmt::Display for ScopeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, scope) in self.scopes.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, ".{scope}")?;
        }
        Ok(())
    }
}

/// Whether a class selector matches a single scope name.
///
/// The selector is a dotted class list with an optional leading `.`; it matches when every
/// class in it is one of the scope's dotted segments (`.function` matches
/// `meta.function.js`, `.string.quoted` matches `string.quoted.double.js`).
pub fn selector_matches_scope(selector: &str, scope: &str) -> bool {
    let selector = selector.strip_prefix('.').unwrap_or(selector);
    if selector.is_empty() {
        return false;
    }
    selector
        .split('.')
        .all(|class| scope.split('.').any(|segment| segment == class))
}

/// Whether `selector` matches any of `scopes`.
pub fn selector_matches_any_scope<S: AsRef<str>>(selector: &str, scopes: &[S]) -> bool {
    scopes
        .iter()
        .any(|scope| selector_matches_scope(selector, scope.as_ref()))
}

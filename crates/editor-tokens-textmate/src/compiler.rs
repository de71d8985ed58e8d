use crate::definition::{CaptureSpec, GrammarDefinition, RawRule};
use crate::error::TextMateError;
use crate::scope::ScopeRegistry;
use editor_tokens::ScopeId;
use onig::Regex;
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Index of a rule in a [`CompiledGrammar`]'s rule arena.
pub struct RuleId(pub usize);

/// Scope ids per capture group index.
pub type CaptureScopes = HashMap<usize, Vec<ScopeId>>;

#[derive(Debug)]
/// A compiled TextMate grammar.
///
/// Rules live in one arena and reference each other by [`RuleId`]; includes are resolved at
/// compile time, so matching never looks names up.
pub struct CompiledGrammar {
    /// Optional human-readable name.
    pub name: Option<String>,
    /// Root scope name (e.g. `source.js`).
    pub scope_name: String,
    /// Id of the root scope.
    pub root_scope: ScopeId,
    /// File extensions associated with this grammar.
    pub file_types: Vec<String>,
    /// Compiled `firstLineMatch`.
    pub first_line_match: Option<Regex>,
    /// Rule arena. Index 0 is the top-level group.
    pub rules: Vec<Rule>,
    /// Match and region rules tried when no region is open, in priority order.
    pub root_candidates: Vec<RuleId>,
    /// Scope names used by the rules.
    pub scopes: ScopeRegistry,
}

#[derive(Debug)]
/// A compiled rule.
pub enum Rule {
    /// A single regex match.
    Match(MatchRule),
    /// A begin/end region.
    Region(RegionRule),
    /// A list of rules with no regex of its own (top level, repository groups, aliases).
    Group {
        /// Member rules.
        patterns: Vec<RuleId>,
    },
}

#[derive(Debug)]
/// A compiled `match` rule.
pub struct MatchRule {
    /// Regex source.
    pub regex_source: String,
    /// Compiled regex.
    pub regex: Regex,
    /// Scopes applied to the match.
    pub scopes: Vec<ScopeId>,
    /// Scopes applied to capture groups.
    pub captures: CaptureScopes,
}

#[derive(Debug)]
/// A compiled `begin`/`end` rule.
pub struct RegionRule {
    /// Begin regex source.
    pub begin_source: String,
    /// Compiled begin regex.
    pub begin: Regex,
    /// End regex source.
    pub end_source: String,
    /// Compiled end regex.
    pub end: Regex,
    /// Scopes applied to the whole region, delimiters included.
    pub scopes: Vec<ScopeId>,
    /// Scopes applied between the delimiters.
    pub content_scopes: Vec<ScopeId>,
    /// Scopes for the begin match's capture groups.
    pub begin_captures: CaptureScopes,
    /// Scopes for the end match's capture groups.
    pub end_captures: CaptureScopes,
    /// Nested rules as written.
    pub patterns: Vec<RuleId>,
    /// Nested match and region rules with groups flattened, in priority order.
    pub candidates: Vec<RuleId>,
}

impl CompiledGrammar {
    /// Id of the top-level group.
    pub const ROOT: RuleId = RuleId(0);

    /// Compile a parsed [`GrammarDefinition`].
    pub fn compile(definition: GrammarDefinition) -> Result<Self, TextMateError> {
        let mut scopes = ScopeRegistry::new();
        let root_scope = scopes.id_for_scope(&definition.scope_name);

        let mut compiler = Compiler {
            rules: vec![Rule::Group {
                patterns: Vec::new(),
            }],
            repository: HashMap::new(),
            scopes,
        };

        // Reserve repository ids first so includes resolve regardless of declaration order.
        let mut entries: Vec<(&String, &RawRule)> = definition.repository.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        let mut reserved = Vec::with_capacity(entries.len());
        for (name, _) in &entries {
            let id = compiler.push(Rule::Group {
                patterns: Vec::new(),
            });
            compiler.repository.insert((*name).clone(), id);
            reserved.push(id);
        }
        for ((_, raw), id) in entries.iter().zip(reserved) {
            let rule = compiler.compile_rule(raw)?;
            compiler.rules[id.0] = rule;
        }

        let patterns = compiler.compile_patterns(&definition.patterns)?;
        compiler.rules[Self::ROOT.0] = Rule::Group { patterns };

        let first_line_match = definition
            .first_line_match
            .as_deref()
            .map(compile_regex)
            .transpose()?;

        let Compiler {
            mut rules, scopes, ..
        } = compiler;
        let root_candidates = flatten_candidates(&rules, &[Self::ROOT]);
        let region_candidates: Vec<(usize, Vec<RuleId>)> = rules
            .iter()
            .enumerate()
            .filter_map(|(index, rule)| match rule {
                Rule::Region(region) => Some((index, flatten_candidates(&rules, &region.patterns))),
                _ => None,
            })
            .collect();
        for (index, candidates) in region_candidates {
            if let Rule::Region(region) = &mut rules[index] {
                region.candidates = candidates;
            }
        }

        debug!(
            scope = %definition.scope_name,
            rules = rules.len(),
            scopes = scopes.len(),
            "compiled grammar"
        );

        Ok(Self {
            name: definition.name,
            scope_name: definition.scope_name,
            root_scope,
            file_types: definition.file_types,
            first_line_match,
            rules,
            root_candidates,
            scopes,
        })
    }

    /// The rule with id `id`.
    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id.0)
    }

    /// The region rule with id `id`, if `id` names one.
    pub fn region(&self, id: RuleId) -> Option<&RegionRule> {
        match self.rule(id)? {
            Rule::Region(region) => Some(region),
            _ => None,
        }
    }
}

struct Compiler {
    rules: Vec<Rule>,
    repository: HashMap<String, RuleId>,
    scopes: ScopeRegistry,
}

impl Compiler {
    fn push(&mut self, rule: Rule) -> RuleId {
        self.rules.push(rule);
        RuleId(self.rules.len() - 1)
    }

    fn compile_patterns(&mut self, patterns: &[RawRule]) -> Result<Vec<RuleId>, TextMateError> {
        let mut ids = Vec::with_capacity(patterns.len());
        for raw in patterns {
            let id = match &raw.include {
                Some(include) if raw.regex.is_none() && raw.begin.is_none() => {
                    self.resolve_include(include)?
                }
                _ => {
                    let rule = self.compile_rule(raw)?;
                    self.push(rule)
                }
            };
            ids.push(id);
        }
        Ok(ids)
    }

    fn compile_rule(&mut self, raw: &RawRule) -> Result<Rule, TextMateError> {
        if let Some(source) = &raw.regex {
            return Ok(Rule::Match(MatchRule {
                regex_source: source.clone(),
                regex: compile_regex(source)?,
                scopes: self.scopes.ids_for_scopes(raw.name.as_deref()),
                captures: self.capture_scopes(&raw.captures),
            }));
        }

        if let Some(begin_source) = &raw.begin {
            let Some(end_source) = &raw.end else {
                return Err(TextMateError::MissingField("end (required by begin)"));
            };
            let begin_captures = if raw.begin_captures.is_empty() {
                &raw.captures
            } else {
                &raw.begin_captures
            };
            let end_captures = if raw.end_captures.is_empty() {
                &raw.captures
            } else {
                &raw.end_captures
            };

            return Ok(Rule::Region(RegionRule {
                begin_source: begin_source.clone(),
                begin: compile_regex(begin_source)?,
                end_source: end_source.clone(),
                end: compile_regex(end_source)?,
                scopes: self.scopes.ids_for_scopes(raw.name.as_deref()),
                content_scopes: self.scopes.ids_for_scopes(raw.content_name.as_deref()),
                begin_captures: self.capture_scopes(begin_captures),
                end_captures: self.capture_scopes(end_captures),
                patterns: self.compile_patterns(&raw.patterns)?,
                candidates: Vec::new(),
            }));
        }

        if let Some(include) = &raw.include {
            let target = self.resolve_include(include)?;
            return Ok(Rule::Group {
                patterns: vec![target],
            });
        }

        Ok(Rule::Group {
            patterns: self.compile_patterns(&raw.patterns)?,
        })
    }

    fn resolve_include(&self, include: &str) -> Result<RuleId, TextMateError> {
        if include == "$self" || include == "$base" {
            return Ok(CompiledGrammar::ROOT);
        }
        include
            .strip_prefix('#')
            .and_then(|name| self.repository.get(name))
            .copied()
            .ok_or_else(|| TextMateError::UnknownInclude(include.to_string()))
    }

    fn capture_scopes(&mut self, captures: &HashMap<u32, CaptureSpec>) -> CaptureScopes {
        let mut entries: Vec<_> = captures.iter().collect();
        entries.sort_by_key(|(index, _)| **index);
        entries
            .into_iter()
            .filter_map(|(index, spec)| {
                let scopes = self.scopes.ids_for_scopes(spec.name.as_deref());
                (!scopes.is_empty()).then_some((*index as usize, scopes))
            })
            .collect()
    }
}

/// Expand groups into the match and region rules they contain, keeping order.
///
/// Each group is expanded at most once, which also cuts include cycles.
fn flatten_candidates(rules: &[Rule], patterns: &[RuleId]) -> Vec<RuleId> {
    let mut out = Vec::new();
    let mut visiting = HashSet::new();
    flatten_into(rules, patterns, &mut out, &mut visiting);
    out
}

fn flatten_into(
    rules: &[Rule],
    patterns: &[RuleId],
    out: &mut Vec<RuleId>,
    visiting: &mut HashSet<RuleId>,
) {
    for &id in patterns {
        match rules.get(id.0) {
            Some(Rule::Group { patterns }) => {
                if visiting.insert(id) {
                    flatten_into(rules, patterns, out, visiting);
                }
            }
            Some(_) => out.push(id),
            None => {}
        }
    }
}

fn compile_regex(source: &str) -> Result<Regex, TextMateError> {
    Regex::new(source).map_err(|e| TextMateError::RegexCompile {
        pattern: source.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(yaml: &str) -> Result<CompiledGrammar, TextMateError> {
        let definition: GrammarDefinition = serde_yaml::from_str(yaml)?;
        CompiledGrammar::compile(definition)
    }

    #[test]
    fn test_repository_includes_resolve_in_any_order() {
        let grammar = compile(
            r#"
scopeName: source.test
patterns:
  - include: '#later'
repository:
  later:
    patterns:
      - include: '#words'
  words:
    match: '\w+'
    name: word.test
"#,
        )
        .unwrap();

        assert_eq!(grammar.root_candidates.len(), 1);
        let Some(Rule::Match(rule)) = grammar.rule(grammar.root_candidates[0]) else {
            panic!("expected a match rule");
        };
        assert_eq!(rule.regex_source, r"\w+");
        assert_eq!(grammar.scopes.scope_for_id(rule.scopes[0]), Some("word.test"));
    }

    #[test]
    fn test_include_cycles_are_cut() {
        let grammar = compile(
            r#"
scopeName: source.test
patterns:
  - include: '#a'
repository:
  a:
    patterns:
      - include: '#b'
      - match: 'a'
  b:
    patterns:
      - include: '#a'
      - include: '$self'
      - match: 'b'
"#,
        )
        .unwrap();

        let sources: Vec<&str> = grammar
            .root_candidates
            .iter()
            .filter_map(|id| match grammar.rule(*id) {
                Some(Rule::Match(rule)) => Some(rule.regex_source.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(sources, vec!["b", "a"]);
    }

    #[test]
    fn test_region_captures_fall_back_to_captures() {
        let grammar = compile(
            r#"
scopeName: source.test
patterns:
  - begin: '(")'
    end: '(")'
    name: string.test
    contentName: meta.content.test
    captures:
      1: { name: punctuation.test }
    patterns:
      - include: '$self'
"#,
        )
        .unwrap();

        let region = grammar.region(grammar.root_candidates[0]).unwrap();
        assert_eq!(region.begin_captures, region.end_captures);
        assert_eq!(region.begin_captures.len(), 1);
        assert_eq!(region.content_scopes.len(), 1);
        assert_eq!(region.candidates, vec![grammar.root_candidates[0]]);
    }

    #[test]
    fn test_compile_errors() {
        let unknown = compile("scopeName: source.test\npatterns:\n  - include: '#nope'\n");
        assert!(matches!(unknown, Err(TextMateError::UnknownInclude(name)) if name == "#nope"));

        let missing_end = compile("scopeName: source.test\npatterns:\n  - begin: 'a'\n");
        assert!(matches!(missing_end, Err(TextMateError::MissingField(_))));

        let bad_regex = compile("scopeName: source.test\npatterns:\n  - match: '(a'\n");
        assert!(matches!(
            bad_regex,
            Err(TextMateError::RegexCompile { pattern, .. }) if pattern == "(a"
        ));

        let external = compile("scopeName: source.test\npatterns:\n  - include: 'source.js'\n");
        assert!(matches!(external, Err(TextMateError::UnknownInclude(_))));
    }
}

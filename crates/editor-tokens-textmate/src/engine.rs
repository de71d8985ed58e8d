use crate::compiler::{CaptureScopes, CompiledGrammar, Rule, RuleId};
use editor_tokens::{GrammarError, ScopeId, Tag};
use onig::{Region, Regex, SearchOptions};

/// End-of-line continuation state: the regions still open, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RuleStack(Vec<RuleId>);

impl RuleStack {
    /// Open regions, outermost first.
    pub fn rules(&self) -> &[RuleId] {
        &self.0
    }

    /// Whether no region is open.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

enum MatchKind {
    /// The end pattern of the innermost open region.
    End(RuleId),
    /// A candidate rule.
    Rule(RuleId),
}

struct FoundMatch {
    start: usize,
    end: usize,
    region: Region,
    kind: MatchKind,
}

/// Tokenize one line, starting from `stack`.
///
/// Returns the line's tags and the stack left at its end. The first line opens the grammar's
/// root scope and never closes it; later lines inherit it.
pub fn tokenize_line(
    grammar: &CompiledGrammar,
    text: &str,
    stack: RuleStack,
    is_first_line: bool,
) -> Result<(Vec<Tag>, RuleStack), GrammarError> {
    let mut stack = stack.0;
    if stack.iter().any(|id| grammar.region(*id).is_none()) {
        return Err(GrammarError::ForeignState);
    }

    let mut line = LineTags::new(text);
    if is_first_line {
        line.tags.push(Tag::Open(grammar.root_scope));
    }

    let len = text.len();
    let mut pos = 0usize;

    // Zero-width matches that leave the stack alone are stepped over below; anything else
    // that fails to make progress is caught by this bound.
    let mut iterations = 0usize;
    let max_iterations = (len + 1).saturating_mul(32).max(128);

    while pos <= len {
        iterations += 1;
        if iterations > max_iterations {
            return Err(GrammarError::IterationLimit {
                column: text[..pos].chars().count(),
            });
        }

        let Some(found) = find_next_match(grammar, &stack, text, pos) else {
            break;
        };

        line.emit_text(found.start);
        let depth_before = stack.len();

        match found.kind {
            MatchKind::End(id) => {
                if let Some(region) = grammar.region(id) {
                    line.close(&region.content_scopes);
                    line.emit_span(found.start, found.end, &region.end_captures, &found.region);
                    line.close(&region.scopes);
                }
                stack.pop();
            }
            MatchKind::Rule(id) => match grammar.rule(id) {
                Some(Rule::Match(rule)) => {
                    if found.end > found.start {
                        line.open(&rule.scopes);
                        line.emit_span(found.start, found.end, &rule.captures, &found.region);
                        line.close(&rule.scopes);
                    }
                }
                Some(Rule::Region(region)) => {
                    line.open(&region.scopes);
                    line.emit_span(
                        found.start,
                        found.end,
                        &region.begin_captures,
                        &found.region,
                    );
                    line.open(&region.content_scopes);
                    stack.push(id);
                }
                Some(Rule::Group { .. }) | None => {}
            },
        }

        pos = found.end;
        if found.start == found.end && stack.len() == depth_before {
            if pos >= len {
                break;
            }
            pos += text[pos..].chars().next().map_or(1, char::len_utf8);
        }
    }

    line.emit_text(len);
    Ok((line.tags, RuleStack(stack)))
}

fn find_next_match(
    grammar: &CompiledGrammar,
    stack: &[RuleId],
    text: &str,
    from: usize,
) -> Option<FoundMatch> {
    let mut best: Option<FoundMatch> = None;
    let mut consider = |found: Option<(usize, usize, Region)>, kind: MatchKind| {
        let Some((start, end, region)) = found else {
            return;
        };
        // Ties keep the earlier candidate: the end pattern first, then definition order.
        if best.as_ref().is_none_or(|best| start < best.start) {
            best = Some(FoundMatch {
                start,
                end,
                region,
                kind,
            });
        }
    };

    let candidates = match stack.last().and_then(|id| Some((*id, grammar.region(*id)?))) {
        Some((id, region)) => {
            consider(search(&region.end, text, from), MatchKind::End(id));
            &region.candidates
        }
        None => &grammar.root_candidates,
    };

    for &id in candidates {
        let regex = match grammar.rule(id) {
            Some(Rule::Match(rule)) => &rule.regex,
            Some(Rule::Region(region)) => &region.begin,
            _ => continue,
        };
        consider(search(regex, text, from), MatchKind::Rule(id));
    }

    best
}

fn search(regex: &Regex, text: &str, from: usize) -> Option<(usize, usize, Region)> {
    let mut region = Region::new();
    regex.search_with_options(
        text,
        from,
        text.len(),
        SearchOptions::SEARCH_OPTION_NONE,
        Some(&mut region),
    )?;
    let (start, end) = region.pos(0)?;
    Some((start, end, region))
}

/// Tag accumulator for one line. Offsets are bytes; emitted token lengths are chars.
struct LineTags<'a> {
    text: &'a str,
    tags: Vec<Tag>,
    emitted: usize,
}

impl<'a> LineTags<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            tags: Vec::new(),
            emitted: 0,
        }
    }

    fn emit_text(&mut self, to: usize) {
        if to <= self.emitted {
            return;
        }
        let len = self.text[self.emitted..to].chars().count();
        self.tags.push(Tag::Token(len));
        self.emitted = to;
    }

    fn open(&mut self, scopes: &[ScopeId]) {
        self.tags.extend(scopes.iter().map(|id| Tag::Open(*id)));
    }

    fn close(&mut self, scopes: &[ScopeId]) {
        self.tags.extend(scopes.iter().rev().map(|id| Tag::Close(*id)));
    }

    /// Emit `start..end`, wrapping captured groups in their scopes. Groups nest by
    /// position; a group overlapping an already closed sibling is ignored.
    fn emit_span(&mut self, start: usize, end: usize, captures: &CaptureScopes, region: &Region) {
        let mut groups: Vec<(usize, usize, &[ScopeId])> = (0..region.len())
            .filter_map(|index| {
                let scopes = captures.get(&index)?;
                let (group_start, group_end) = region.pos(index)?;
                (group_start < group_end && group_start >= start && group_end <= end)
                    .then_some((group_start, group_end, scopes.as_slice()))
            })
            .collect();
        groups.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        let mut open: Vec<(usize, &[ScopeId])> = Vec::new();
        for (group_start, group_end, scopes) in groups {
            while let Some(&(open_end, open_scopes)) = open.last()
                && open_end <= group_start
            {
                self.emit_text(open_end);
                self.close(open_scopes);
                open.pop();
            }
            if group_start < self.emitted {
                continue;
            }
            self.emit_text(group_start);
            self.open(scopes);
            open.push((group_end, scopes));
        }
        while let Some((open_end, open_scopes)) = open.pop() {
            self.emit_text(open_end);
            self.close(open_scopes);
        }
        self.emit_text(end);
    }
}

#![allow(dead_code)]

use editor_tokens::{
    Grammar, GrammarError, LineState, LineTokens, RopeBuffer, ScopeId, Tag, TextBuffer,
    TokenizeEvent, TokenizedBuffer, TokenizerConfig,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub const SAMPLE_JS: &str = "var quicksort = function () {
  var sort = function(items) {
    if (items.length <= 1) return items;
    var pivot = items.shift(), current, left = [], right = [];
    while(items.length > 0) {
      current = items.shift();
      current < pivot ? left.push(current) : right.push(current);
    }
    return sort(left).concat(pivot).concat(sort(right));
  };

  return sort(Array.apply(this, arguments));
};
";

pub const SOURCE: ScopeId = ScopeId(1);
pub const COMMENT: ScopeId = ScopeId(2);
pub const KEYWORD: ScopeId = ScopeId(3);

/// End state of [`BlockGrammar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockState {
    pub in_comment: bool,
    pub depth: usize,
}

/// A tiny C-like grammar: `/* */` block comments spanning rows, `var` keywords, and brace
/// depth carried in the end state.
///
/// Row 0 opens `source.test` and never closes it, so later rows inherit it through their open
/// scopes. A row containing `!fail` makes the grammar error; a row containing `!unmatched`
/// emits a close for a scope that was never opened.
#[derive(Debug, Default)]
pub struct BlockGrammar {
    log: Mutex<Vec<String>>,
    generation: AtomicU64,
}

impl BlockGrammar {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Texts passed to `tokenize_line`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    pub fn reset_calls(&self) {
        self.log.lock().unwrap().clear();
    }

    pub fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl Grammar for BlockGrammar {
    fn scope_name(&self) -> &str {
        "source.test"
    }

    fn root_scope_id(&self) -> ScopeId {
        SOURCE
    }

    fn scope_name_for_id(&self, id: ScopeId) -> Option<&str> {
        match id {
            SOURCE => Some("source.test"),
            COMMENT => Some("comment.block.test"),
            KEYWORD => Some("storage.type.var.test"),
            _ => None,
        }
    }

    fn tokenize_line(
        &self,
        text: &str,
        prior: Option<&LineState>,
        is_first_line: bool,
    ) -> Result<LineTokens, GrammarError> {
        self.log.lock().unwrap().push(text.to_string());
        if text.contains("!fail") {
            return Err(GrammarError::fault("refusing to tokenize"));
        }

        let mut state = match prior {
            Some(prior) => *prior
                .downcast_ref::<BlockState>()
                .ok_or(GrammarError::ForeignState)?,
            None => BlockState::default(),
        };

        let mut tags = Vec::new();
        if is_first_line {
            tags.push(Tag::Open(SOURCE));
        }
        if text.contains("!unmatched") {
            tags.push(Tag::Close(KEYWORD));
        }

        let chars: Vec<char> = text.chars().collect();
        let mut pending = 0;
        let mut i = 0;
        while i < chars.len() {
            let next = chars.get(i + 1).copied();
            if !state.in_comment && chars[i] == '/' && next == Some('*') {
                flush(&mut tags, &mut pending);
                tags.push(Tag::Open(COMMENT));
                pending = 2;
                state.in_comment = true;
                i += 2;
            } else if state.in_comment && chars[i] == '*' && next == Some('/') {
                tags.push(Tag::Token(pending + 2));
                tags.push(Tag::Close(COMMENT));
                pending = 0;
                state.in_comment = false;
                i += 2;
            } else if !state.in_comment && chars[i..].starts_with(&['v', 'a', 'r']) {
                flush(&mut tags, &mut pending);
                tags.extend([Tag::Open(KEYWORD), Tag::Token(3), Tag::Close(KEYWORD)]);
                i += 3;
            } else {
                if !state.in_comment {
                    match chars[i] {
                        '{' => state.depth += 1,
                        '}' => state.depth = state.depth.saturating_sub(1),
                        _ => {}
                    }
                }
                pending += 1;
                i += 1;
            }
        }
        flush(&mut tags, &mut pending);

        Ok(LineTokens {
            tags,
            state: LineState::new(state),
        })
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

fn flush(tags: &mut Vec<Tag>, pending: &mut usize) {
    if *pending > 0 {
        tags.push(Tag::Token(*pending));
        *pending = 0;
    }
}

/// Returns fixed tags per line text; every row ends in the same state.
#[derive(Debug, Default)]
pub struct ScriptedGrammar {
    lines: HashMap<String, Vec<Tag>>,
}

impl ScriptedGrammar {
    pub const A: ScopeId = ScopeId(1);
    pub const B: ScopeId = ScopeId(2);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_line(mut self, text: &str, tags: Vec<Tag>) -> Self {
        self.lines.insert(text.to_string(), tags);
        self
    }
}

impl Grammar for ScriptedGrammar {
    fn scope_name(&self) -> &str {
        "a"
    }

    fn root_scope_id(&self) -> ScopeId {
        Self::A
    }

    fn scope_name_for_id(&self, id: ScopeId) -> Option<&str> {
        match id {
            Self::A => Some("a"),
            Self::B => Some("b"),
            _ => None,
        }
    }

    fn tokenize_line(
        &self,
        text: &str,
        _prior: Option<&LineState>,
        _is_first_line: bool,
    ) -> Result<LineTokens, GrammarError> {
        let tags = self
            .lines
            .get(text)
            .cloned()
            .unwrap_or_else(|| vec![Tag::Token(text.chars().count())]);
        Ok(LineTokens {
            tags,
            state: LineState::new(()),
        })
    }
}

pub fn block_buffer(text: &str, chunk_size: usize) -> (TokenizedBuffer<RopeBuffer>, Arc<BlockGrammar>) {
    let grammar = BlockGrammar::new();
    let tokenized = TokenizedBuffer::new(
        RopeBuffer::from_text(text),
        Some(grammar.clone()),
        TokenizerConfig::default().with_chunk_size(chunk_size),
    );
    (tokenized, grammar)
}

/// Run one scheduled tick.
pub fn advance_clock<B: TextBuffer>(tokenized: &mut TokenizedBuffer<B>) -> bool {
    tokenized.run_pending_chunk()
}

/// Make the buffer visible and run ticks until nothing is pending. Returns the tick count.
pub fn fully_tokenize<B: TextBuffer>(tokenized: &mut TokenizedBuffer<B>) -> usize {
    tokenized.set_visible(true);
    let mut ticks = 0;
    while tokenized.run_pending_chunk() {
        ticks += 1;
    }
    ticks
}

/// Collect every event emitted by `tokenized`.
pub fn record_events<B: TextBuffer>(
    tokenized: &mut TokenizedBuffer<B>,
) -> Arc<Mutex<Vec<TokenizeEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    tokenized.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
    events
}

/// Scope names of the first token of `row`.
pub fn first_token_scopes<B: TextBuffer>(tokenized: &TokenizedBuffer<B>, row: usize) -> Vec<String> {
    tokenized
        .tokenized_line_for_row(row)
        .and_then(|line| line.tokens().into_iter().next())
        .map(|token| token.scopes)
        .unwrap_or_default()
}

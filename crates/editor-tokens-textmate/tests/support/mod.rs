#![allow(dead_code)]

use editor_tokens::{
    Grammar, RopeBuffer, ScopeId, TextBuffer, TokenizedBuffer, TokenizerConfig, class_name_for_scope,
};
use editor_tokens_textmate::TextMateGrammar;
use std::sync::Arc;

pub const MINI_JS: &str = include_str!("../fixtures/mini-js.yaml");
pub const BROKEN: &str = include_str!("../fixtures/broken.json");

pub fn mini_js() -> Arc<TextMateGrammar> {
    Arc::new(TextMateGrammar::from_yaml(MINI_JS).unwrap())
}

pub fn broken() -> Arc<TextMateGrammar> {
    Arc::new(TextMateGrammar::from_json(BROKEN).unwrap())
}

/// A visible buffer using `grammar`, tokenized to completion.
pub fn fully_tokenized(
    text: &str,
    grammar: Arc<TextMateGrammar>,
    chunk_size: usize,
) -> TokenizedBuffer<RopeBuffer> {
    let mut tokenized = TokenizedBuffer::new(
        RopeBuffer::from_text(text),
        Some(grammar),
        TokenizerConfig::default().with_chunk_size(chunk_size),
    );
    drain(&mut tokenized);
    tokenized
}

/// Make the buffer visible and run ticks until nothing is pending.
pub fn drain<B: TextBuffer>(tokenized: &mut TokenizedBuffer<B>) -> usize {
    tokenized.set_visible(true);
    let mut ticks = 0;
    while tokenized.run_pending_chunk() {
        ticks += 1;
    }
    ticks
}

/// `syntax--` class names for scope ids, resolved through the buffer's grammar.
pub fn class_names<B: TextBuffer>(tokenized: &TokenizedBuffer<B>, ids: &[ScopeId]) -> Vec<String> {
    ids.iter()
        .map(|id| {
            tokenized
                .grammar()
                .scope_name_for_id(*id)
                .map(class_name_for_scope)
                .unwrap_or_default()
        })
        .collect()
}

/// Scope names of the first token of `row`.
pub fn first_token_scopes<B: TextBuffer>(tokenized: &TokenizedBuffer<B>, row: usize) -> Vec<String> {
    tokenized
        .tokenized_line_for_row(row)
        .and_then(|line| line.tokens().into_iter().next())
        .map(|token| token.scopes)
        .unwrap_or_default()
}

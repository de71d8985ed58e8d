mod support;

use editor_tokens::{
    BufferRegistry, Grammar, Point, Range, RopeBuffer, ScopeDescriptor, TextBuffer,
    TokenizedBuffer, TokenizedBufferIterator, TokenizerConfig,
};
use editor_tokens_textmate::{GrammarSet, TextMateGrammar};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::{Arc, Mutex};
use support::{broken, class_names, drain, first_token_scopes, fully_tokenized, mini_js};

fn classes(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn test_iterates_over_scope_boundaries() {
    let tokenized = fully_tokenized("var foo = 1 /*\nhello*/var bar = 2\n", mini_js(), 50);
    let mut iter = tokenized.build_iterator();
    iter.seek((0, 0));

    let var = "syntax--storage syntax--type syntax--var syntax--js";
    let assign = "syntax--keyword syntax--operator syntax--assignment syntax--js";
    let number = "syntax--constant syntax--numeric syntax--decimal syntax--js";
    let comment = "syntax--comment syntax--block syntax--js";
    let begin = "syntax--punctuation syntax--definition syntax--comment syntax--begin syntax--js";
    let end = "syntax--punctuation syntax--definition syntax--comment syntax--end syntax--js";

    let expected: Vec<(Point, Vec<String>, Vec<String>)> = vec![
        (Point::new(0, 0), classes(&[]), classes(&["syntax--source syntax--js", var])),
        (Point::new(0, 3), classes(&[var]), classes(&[])),
        (Point::new(0, 8), classes(&[]), classes(&[assign])),
        (Point::new(0, 9), classes(&[assign]), classes(&[])),
        (Point::new(0, 10), classes(&[]), classes(&[number])),
        (Point::new(0, 11), classes(&[number]), classes(&[])),
        (Point::new(0, 12), classes(&[]), classes(&[comment, begin])),
        (Point::new(0, 14), classes(&[begin]), classes(&[])),
        (Point::new(1, 5), classes(&[]), classes(&[end])),
        (Point::new(1, 7), classes(&[end, comment]), classes(&[var])),
        (Point::new(1, 10), classes(&[var]), classes(&[])),
        (Point::new(1, 15), classes(&[]), classes(&[assign])),
        (Point::new(1, 16), classes(&[assign]), classes(&[])),
        (Point::new(1, 17), classes(&[]), classes(&[number])),
        (Point::new(1, 18), classes(&[number]), classes(&[])),
    ];

    let mut boundaries = Vec::new();
    loop {
        boundaries.push((
            iter.position(),
            class_names(&tokenized, iter.close_scope_ids()),
            class_names(&tokenized, iter.open_scope_ids()),
        ));
        if !iter.move_to_successor() {
            break;
        }
    }
    assert_eq!(boundaries, expected);

    let seek = |iter: &mut TokenizedBufferIterator<'_, RopeBuffer>, point: (usize, usize)| {
        let scopes = iter.seek(point);
        class_names(&tokenized, &scopes)
    };
    assert_eq!(
        seek(&mut iter, (0, 1)),
        classes(&["syntax--source syntax--js", var])
    );
    assert_eq!(iter.position(), Point::new(0, 3));
    assert_eq!(seek(&mut iter, (0, 8)), classes(&["syntax--source syntax--js"]));
    assert_eq!(iter.position(), Point::new(0, 8));
    assert_eq!(
        seek(&mut iter, (1, 0)),
        classes(&["syntax--source syntax--js", comment])
    );
    assert_eq!(iter.position(), Point::new(1, 0));
    assert_eq!(
        seek(&mut iter, (1, 18)),
        classes(&["syntax--source syntax--js", number])
    );
    assert_eq!(iter.position(), Point::new(1, 18));

    assert_eq!(seek(&mut iter, (2, 0)), classes(&["syntax--source syntax--js"]));
    assert!(!iter.move_to_successor());
}

#[test]
fn test_terminates_scopes_at_the_beginning_of_a_line() {
    let tokenized = fully_tokenized("start x\nend x\nx", broken(), 50);
    let mut iter = tokenized.build_iterator();
    let containing = iter.seek((1, 0));

    assert_eq!(
        class_names(&tokenized, &containing),
        classes(&["syntax--text syntax--broken", "syntax--blue syntax--broken"])
    );
    assert_eq!(iter.position(), Point::new(1, 0));
    assert_eq!(
        class_names(&tokenized, iter.close_scope_ids()),
        classes(&["syntax--blue syntax--broken"])
    );
    assert_eq!(
        class_names(&tokenized, iter.open_scope_ids()),
        classes(&["syntax--yellow syntax--broken"])
    );
}

#[test]
fn test_scope_descriptor_agrees_with_token_iterator() {
    let text = "var a = \"x\\ty\" // note\nwhile (a) { /* multi\n line */ return 42 }\n";
    let tokenized = fully_tokenized(text, mini_js(), 50);

    for row in 0..=tokenized.buffer().last_row() {
        let line = tokenized.tokenized_line_for_row(row).unwrap();
        let mut iter = line.token_iterator();
        while iter.next() {
            let expected = ScopeDescriptor::new(iter.scopes());
            for column in [iter.buffer_start(), iter.buffer_end() - 1] {
                assert_eq!(
                    tokenized.scope_descriptor_for_position((row, column)),
                    expected,
                    "row {row} column {column}"
                );
            }
        }
    }

    assert_eq!(
        tokenized.scope_descriptor_for_position((0, 10)).scopes(),
        &[
            "source.js",
            "string.quoted.double.js",
            "constant.character.escape.js"
        ]
    );
    assert_eq!(
        tokenized.scope_descriptor_for_position((0, 16)).scopes(),
        &[
            "source.js",
            "comment.line.double-slash.js",
            "punctuation.definition.comment.js"
        ]
    );
    assert_eq!(
        tokenized.scope_descriptor_for_position((1, 3)).scopes(),
        &["source.js", "keyword.control.js"]
    );
}

#[test]
fn test_buffer_range_for_scope_at_position() {
    let tokenized = fully_tokenized("var s = \"ab\\n\"", mini_js(), 50);

    assert_eq!(
        tokenized.buffer_range_for_scope_at_position(".string.quoted", (0, 10)),
        Some(Range::new((0, 8), (0, 14)))
    );
    assert_eq!(
        tokenized.buffer_range_for_scope_at_position(".constant.character.escape", (0, 12)),
        Some(Range::new((0, 11), (0, 13)))
    );
    assert_eq!(
        tokenized.buffer_range_for_scope_at_position(".string.quoted", (0, 1)),
        None
    );
}

#[test]
fn test_opening_and_closing_a_comment_across_rows() {
    let text = (0..8)
        .map(|row| format!("var v{row} = {row}"))
        .collect::<Vec<_>>()
        .join("\n");
    let mut tokenized = fully_tokenized(&text, mini_js(), 3);
    let comment = vec!["source.js".to_string(), "comment.block.js".to_string()];

    tokenized.edit(Range::empty((1, 0)), "/*").unwrap();
    assert_eq!(tokenized.first_invalid_row(), Some(2));
    assert_eq!(
        first_token_scopes(&tokenized, 2),
        vec!["source.js", "storage.type.var.js"]
    );

    drain(&mut tokenized);
    for row in 2..8 {
        assert_eq!(first_token_scopes(&tokenized, row), comment, "row {row}");
        assert!(tokenized.is_row_commented(row));
    }

    let end_of_row_3 = tokenized.buffer().line_length_for_row(3).unwrap();
    tokenized.edit(Range::empty((3, end_of_row_3)), " */").unwrap();
    drain(&mut tokenized);
    assert_eq!(first_token_scopes(&tokenized, 3), comment);
    for row in 4..8 {
        assert_eq!(
            first_token_scopes(&tokenized, row),
            vec!["source.js", "storage.type.var.js"],
            "row {row}"
        );
    }

    let fresh = fully_tokenized(&tokenized.buffer().text(), mini_js(), 50);
    assert_eq!(
        tokenized.tokenized_lines_for_rows(0, 7),
        fresh.tokenized_lines_for_rows(0, 7)
    );
}

#[test]
fn test_grammar_update_retokenizes() {
    let grammar = mini_js();
    let mut tokenized = fully_tokenized("var a\nvar b", grammar.clone(), 50);
    let first = tokenized.cached_line(0).cloned();

    grammar.mark_updated();
    assert!(tokenized.check_grammar_update());
    assert!(tokenized.cached_line(0).is_none());
    drain(&mut tokenized);
    assert_eq!(tokenized.cached_line(0).cloned(), first);
}

#[test]
fn test_runaway_grammar_falls_back_per_row() {
    let grammar = Arc::new(
        TextMateGrammar::from_yaml(
            r#"
scopeName: source.loop
patterns:
  - begin: '(?=x)'
    end: '(?=x)'
    name: loop.test
  - match: 'ok'
    name: fine.test
"#,
        )
        .unwrap(),
    );
    let mut tokenized = TokenizedBuffer::new(
        RopeBuffer::from_text("ok\na x\nok"),
        Some(grammar),
        TokenizerConfig::default(),
    );
    let diagnostics = Arc::new(Mutex::new(Vec::new()));
    let sink = diagnostics.clone();
    tokenized.set_diagnostic_handler(move |diagnostic| sink.lock().unwrap().push(diagnostic.row()));
    drain(&mut tokenized);

    assert_eq!(*diagnostics.lock().unwrap(), vec![1]);
    assert_eq!(first_token_scopes(&tokenized, 1), vec!["source.loop"]);
    assert_eq!(
        first_token_scopes(&tokenized, 2),
        vec!["source.loop", "fine.test"]
    );
    assert!(tokenized.is_fully_tokenized());
}

#[test]
fn test_host_drives_many_buffers_through_a_registry() {
    let mut grammars = GrammarSet::new();
    grammars
        .load_from_path(Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/mini-js.yaml"))
        .unwrap();
    grammars
        .load_from_path(Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/broken.json"))
        .unwrap();
    assert_eq!(grammars.len(), 2);

    let mut registry: BufferRegistry<TokenizedBuffer<RopeBuffer>> = BufferRegistry::new();
    let mut ids = Vec::new();
    for (path, text) in [("app.js", "var a = 1"), ("notes.txt", "plain words")] {
        let buffer = RopeBuffer::from_text(text).with_path(path);
        let grammar: Option<Arc<dyn Grammar>> = grammars
            .select(Some(Path::new(path)), text)
            .map(|grammar| grammar as Arc<dyn Grammar>);
        let mut tokenized = TokenizedBuffer::new(buffer, grammar, TokenizerConfig::default());
        tokenized.set_visible(true);
        ids.push(tokenized.id());
        assert!(registry.attach(tokenized.id(), tokenized).is_none());
    }

    for id in &ids {
        if let Some(tokenized) = registry.get_mut(*id) {
            while tokenized.run_pending_chunk() {}
        }
    }

    let js = registry.get(ids[0]).unwrap();
    assert_eq!(js.grammar().scope_name(), "source.js");
    assert!(js.is_fully_tokenized());
    assert_eq!(
        js.scope_descriptor_for_position((0, 1)).scopes(),
        &["source.js", "storage.type.var.js"]
    );

    let notes = registry.get(ids[1]).unwrap();
    assert!(notes.grammar().is_null());
    assert_eq!(
        notes.scope_descriptor_for_position((0, 1)).scopes(),
        &["text.plain.null-grammar"]
    );

    let mut detached = registry.detach(ids[1]).unwrap();
    detached.destroy();
    assert!(!registry.contains(ids[1]));
    assert_eq!(registry.len(), 1);
}

//! Tests for the span tagger sweep.

use crate::tagging::{
    Span, SpanTagger, Token, Tokenizer, TreebankTokenizer, WhitespaceTokenizer,
    create_tokens_and_tags,
};

fn tags_for(text: &str, spans: &[Span]) -> Vec<String> {
    SpanTagger::new(WhitespaceTokenizer).tag(text, spans).tags
}

#[test]
fn test_no_spans_falls_back_to_outside() {
    let tagged = SpanTagger::new(TreebankTokenizer::new()).tag("hello world", &[]);
    assert_eq!(tagged.tokens, vec!["hello", "world"]);
    assert_eq!(tagged.tags, vec!["O", "O"]);
}

#[test]
fn test_missing_bound_falls_back_to_outside() {
    let spans = [
        Span::new(0, 4, ["PER"]),
        Span {
            start: Some(5),
            end: None,
            labels: Some(vec!["LOC".to_string()]),
        },
    ];
    assert_eq!(tags_for("John Paris", &spans), vec!["O", "O"]);
}

#[test]
fn test_basic_bio() {
    let tokenizer = |_: &str| {
        vec![
            Token::new("John", 0),
            Token::new("lives", 5),
            Token::new("in", 11),
            Token::new("Paris", 14),
        ]
    };
    let (tokens, tags) =
        create_tokens_and_tags("John lives in Paris", &[Span::new(0, 4, ["PER"])], &tokenizer);
    assert_eq!(tokens, vec!["John", "lives", "in", "Paris"]);
    assert_eq!(tags, vec!["B-PER", "O", "O", "O"]);
}

#[test]
fn test_single_token_span_at_end() {
    let tags = tags_for("John lives in Paris", &[Span::new(14, 19, ["LOC"])]);
    assert_eq!(tags, vec!["O", "O", "O", "B-LOC"]);
}

#[test]
fn test_multi_token_span() {
    let tags = tags_for("She moved to New York City", &[Span::new(13, 26, ["LOC"])]);
    assert_eq!(tags, vec!["O", "O", "O", "B-LOC", "I-LOC", "I-LOC"]);
}

#[test]
fn test_adjacent_spans_with_same_label_restart_at_begin() {
    let tags = tags_for(
        "Paris London",
        &[Span::new(0, 5, ["LOC"]), Span::new(6, 12, ["LOC"])],
    );
    assert_eq!(tags, vec!["B-LOC", "B-LOC"]);
}

#[test]
fn test_spans_are_sorted_before_sweep() {
    let tags = tags_for(
        "John met Mary in Rome",
        &[
            Span::new(17, 21, ["LOC"]),
            Span::new(0, 4, ["PER"]),
            Span::new(9, 13, ["PER"]),
        ],
    );
    assert_eq!(tags, vec!["B-PER", "O", "B-PER", "O", "B-LOC"]);
}

#[test]
fn test_span_without_labels_forces_outside() {
    // The first span covers both tokens but has no label. Smith stays under
    // it, so the labeled second span is never reached.
    let spans = [
        Span::new(0, 10, Vec::<String>::new()),
        Span::new(5, 10, ["PER"]),
    ];
    assert_eq!(tags_for("John Smith", &spans), vec!["O", "O"]);

    let no_labels = [Span {
        start: Some(0),
        end: Some(4),
        labels: None,
    }];
    assert_eq!(tags_for("John Smith", &no_labels), vec!["O", "O"]);
}

#[test]
fn test_only_first_label_is_used() {
    let tags = tags_for("Acme Corp", &[Span::new(0, 9, ["ORG", "COMPANY"])]);
    assert_eq!(tags, vec!["B-ORG", "I-ORG"]);
}

#[test]
fn test_overlapping_spans_keep_first() {
    let tags = tags_for(
        "John Smith",
        &[Span::new(0, 10, ["PER"]), Span::new(5, 10, ["NAME"])],
    );
    assert_eq!(tags, vec!["B-PER", "I-PER"]);
}

#[test]
fn test_span_ending_on_token_first_char_tags_token() {
    // end is exclusive, so the span's last character is 'c' at offset 3,
    // the first character of "cd". The whole token is tagged.
    let tags = tags_for("ab cd", &[Span::new(0, 4, ["X"])]);
    assert_eq!(tags, vec!["B-X", "I-X"]);
}

#[test]
fn test_span_ending_before_token_does_not_tag_it() {
    let tags = tags_for("ab cd", &[Span::new(0, 3, ["X"])]);
    assert_eq!(tags, vec!["B-X", "O"]);
}

#[test]
fn test_span_starting_mid_token_tags_token() {
    let tags = tags_for("unbelievable story", &[Span::new(2, 12, ["ADJ"])]);
    assert_eq!(tags, vec!["B-ADJ", "O"]);
}

#[test]
fn test_token_before_span_is_outside() {
    let tags = tags_for("John lives", &[Span::new(5, 10, ["VERB"])]);
    assert_eq!(tags, vec!["O", "B-VERB"]);
}

#[test]
fn test_zero_width_span() {
    let tags = tags_for("John lives", &[Span::new(0, 0, ["X"])]);
    assert_eq!(tags, vec!["O", "O"]);
}

#[test]
fn test_skips_spans_that_fall_between_tokens() {
    // The first two spans end before "c" starts; the sweep skips both and
    // lands on the third.
    let tags = tags_for(
        "a    c",
        &[
            Span::new(1, 2, ["GAP"]),
            Span::new(2, 4, ["GAP"]),
            Span::new(5, 6, ["C"]),
        ],
    );
    assert_eq!(tags, vec!["O", "B-C"]);
}

#[test]
fn test_unicode_offsets_are_characters() {
    let tags = tags_for("Café Zürich", &[Span::new(5, 11, ["LOC"])]);
    assert_eq!(tags, vec!["O", "B-LOC"]);
}

#[test]
fn test_treebank_punctuation_inside_span() {
    let tagged = SpanTagger::new(TreebankTokenizer::new())
        .tag("Visit Washington, D.C. today", &[Span::new(6, 22, ["LOC"])]);
    let pairs: Vec<_> = tagged.iter().collect();
    assert_eq!(pairs[0], ("Visit", "O"));
    assert_eq!(pairs[1], ("Washington", "B-LOC"));
    assert_eq!(pairs[2], (",", "I-LOC"));
    assert_eq!(pairs.last(), Some(&("today", "O")));
}

#[test]
fn test_tokens_are_not_normalized() {
    let tagged = SpanTagger::new(TreebankTokenizer::new()).tag(r#"He said "hi"."#, &[]);
    assert_eq!(tagged.tokens, vec!["He", "said", "\"", "hi", "\"", "."]);
    assert_eq!(tagged.len(), 6);
}

#[test]
fn test_tagged_sequence_parts() {
    let tagger = SpanTagger::new(WhitespaceTokenizer);
    assert_eq!(tagger.tokenizer().tokenize("a b").len(), 2);

    let (tokens, tags) = tagger
        .tag("New York", &[Span::new(0, 8, ["LOC"])])
        .into_parts();
    assert_eq!(tokens, vec!["New", "York"]);
    assert_eq!(tags, vec!["B-LOC", "I-LOC"]);
}

#[test]
fn test_empty_text() {
    let tagged = SpanTagger::new(WhitespaceTokenizer).tag("", &[Span::new(0, 3, ["X"])]);
    assert!(tagged.is_empty());
    assert!(tagged.tags.is_empty());
}

#[test]
fn test_works_with_trait_objects() {
    let tokenizer: &dyn Tokenizer = &WhitespaceTokenizer;
    let (tokens, tags) = create_tokens_and_tags("a b", &[Span::new(2, 3, ["B"])], tokenizer);
    assert_eq!(tokens, vec!["a", "b"]);
    assert_eq!(tags, vec!["O", "B-B"]);
}

#[test]
fn test_span_from_result_json() {
    let value = serde_json::json!({"start": 0, "end": 4, "labels": ["PER"], "text": "John"});
    let span: Span = serde_json::from_value(value).unwrap();
    assert_eq!(span, Span::new(0, 4, ["PER"]));

    let unbounded: Span = serde_json::from_value(serde_json::json!({"labels": ["PER"]})).unwrap();
    assert!(!unbounded.has_bounds());
}

//! BIO tagging of character spans over tokenized text.

use serde::{Deserialize, Serialize};

use super::token::{Token, Tokenizer};

/// Tag for tokens outside any labeled span.
pub const OUTSIDE: &str = "O";

/// Prefix of the first token of a span.
pub const BEGIN_PREFIX: &str = "B-";

/// Prefix of every following token of a span.
pub const INSIDE_PREFIX: &str = "I-";

/// A labeled character range `[start, end)` in a text.
///
/// Deserializes directly from the `value` object of a labeling result
/// (`{"start": 0, "end": 4, "labels": ["PER"]}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Character offset of the first character
    #[serde(default)]
    pub start: Option<usize>,
    /// Character offset one past the last character
    #[serde(default)]
    pub end: Option<usize>,
    /// Label names; only the first one is used for tagging
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

impl Span {
    /// Create a span with both bounds set.
    pub fn new<I, S>(start: usize, end: usize, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            start: Some(start),
            end: Some(end),
            labels: Some(labels.into_iter().map(Into::into).collect()),
        }
    }

    /// Check if both `start` and `end` are set.
    pub fn has_bounds(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// The label used for BIO tagging, if any.
    pub fn first_label(&self) -> Option<&str> {
        self.labels
            .as_deref()
            .and_then(|labels| labels.first())
            .map(String::as_str)
    }
}

/// Tokens paired positionally with their BIO tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedSequence {
    /// Token texts as produced by the tokenizer
    pub tokens: Vec<String>,
    /// One tag per token: `O`, `B-<label>` or `I-<label>`
    pub tags: Vec<String>,
}

impl TaggedSequence {
    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if the text produced no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterate over `(token, tag)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tokens
            .iter()
            .map(String::as_str)
            .zip(self.tags.iter().map(String::as_str))
    }

    /// Split into `(tokens, tags)`.
    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.tokens, self.tags)
    }
}

/// Materializes BIO-tagged training sequences from text and spans.
#[derive(Debug, Clone, Default)]
pub struct SpanTagger<T> {
    tokenizer: T,
}

impl<T: Tokenizer> SpanTagger<T> {
    /// Create a tagger around a tokenizer.
    pub fn new(tokenizer: T) -> Self {
        Self { tokenizer }
    }

    /// The tokenizer used by this tagger.
    pub fn tokenizer(&self) -> &T {
        &self.tokenizer
    }

    /// Tokenize `text` and tag every token against `spans`.
    ///
    /// Never fails: if `spans` is empty or any span lacks a bound, every
    /// token is tagged `O`.
    pub fn tag(&self, text: &str, spans: &[Span]) -> TaggedSequence {
        let (tokens, tags) = create_tokens_and_tags(text, spans, &self.tokenizer);
        TaggedSequence { tokens, tags }
    }
}

/// Tokenize `text` and compute BIO tags for `spans`.
///
/// Returns token texts exactly as the tokenizer produced them, paired
/// positionally with their tags.
pub fn create_tokens_and_tags<T>(
    text: &str,
    spans: &[Span],
    tokenizer: &T,
) -> (Vec<String>, Vec<String>)
where
    T: Tokenizer + ?Sized,
{
    let tokens = tokenizer.tokenize(text);

    let tags = if spans.is_empty() {
        vec![OUTSIDE.to_string(); tokens.len()]
    } else if !spans.iter().all(Span::has_bounds) {
        log::debug!(
            "{} of {} spans lack start/end, tagging all tokens as {}",
            spans.iter().filter(|s| !s.has_bounds()).count(),
            spans.len(),
            OUTSIDE
        );
        vec![OUTSIDE.to_string(); tokens.len()]
    } else {
        tag_tokens(&tokens, spans)
    };

    (tokens.into_iter().map(|t| t.text).collect(), tags)
}

/// A span with resolved, inclusive bounds.
struct ActiveSpan<'a> {
    start: i64,
    /// Offset of the last character (`end - 1`)
    last: i64,
    label: Option<&'a str>,
}

impl<'a> ActiveSpan<'a> {
    fn from_span(span: &'a Span) -> Self {
        Self {
            start: span.start.unwrap_or_default() as i64,
            last: span.end.unwrap_or_default() as i64 - 1,
            label: span.first_label(),
        }
    }
}

/// Single forward sweep over tokens and sorted spans.
///
/// Every span must have both bounds set.
fn tag_tokens(tokens: &[Token], spans: &[Span]) -> Vec<String> {
    let mut sorted: Vec<&Span> = spans.iter().collect();
    // Stable: spans sharing a start keep their input order
    sorted.sort_by_key(|span| span.start);
    let mut pending = sorted.into_iter().map(ActiveSpan::from_span);

    let mut current = pending.next();
    let mut prefix = BEGIN_PREFIX;
    let mut tags = Vec::with_capacity(tokens.len());

    for token in tokens {
        let token_start = token.start as i64;
        let token_last = token_start + token.len() as i64 - 1;

        if current.as_ref().is_some_and(|span| token_start > span.last) {
            current = None;
            for span in pending.by_ref() {
                prefix = BEGIN_PREFIX;
                if token_start <= span.last {
                    current = Some(span);
                    break;
                }
            }
        }

        let tag = match &current {
            Some(span) if token_last >= span.start => match span.label {
                // Compares the span's last offset to the token's *start*, so
                // a span ending on a token's first character tags the whole token.
                Some(label) if span.last >= token_start => {
                    let tag = format!("{}{}", prefix, label);
                    prefix = INSIDE_PREFIX;
                    tag
                }
                _ => OUTSIDE.to_string(),
            },
            _ => OUTSIDE.to_string(),
        };
        tags.push(tag);
    }

    tags
}

//! BIO tagging of labeled character spans.
//!
//! Converts a text plus a set of labeled `[start, end)` character spans into
//! a token sequence with one `O` / `B-<label>` / `I-<label>` tag per token,
//! ready to be used as a sequence-labeling (e.g. NER) training example.
//!
//! Tokenization is pluggable through the [`Tokenizer`] trait. Two
//! implementations ship with the crate:
//!
//! - [`TreebankTokenizer`]: penn-treebank-style word splitting with
//!   configurable punctuation rules (the default for NER exports)
//! - [`WhitespaceTokenizer`]: splits on whitespace only
//!
//! ## Usage
//!
//! ```rust
//! use label_converter::tagging::{Span, SpanTagger, TreebankTokenizer};
//!
//! let tagger = SpanTagger::new(TreebankTokenizer::new());
//! let tagged = tagger.tag("John lives in New York", &[
//!     Span::new(0, 4, ["PER"]),
//!     Span::new(14, 22, ["LOC"]),
//! ]);
//!
//! assert_eq!(tagged.tags, vec!["B-PER", "O", "O", "B-LOC", "I-LOC"]);
//! ```

mod tagger;
mod token;
mod treebank;

#[cfg(test)]
mod tests;

pub use tagger::{
    BEGIN_PREFIX, INSIDE_PREFIX, OUTSIDE, Span, SpanTagger, TaggedSequence,
    create_tokens_and_tags,
};
pub use token::{Token, Tokenizer, WhitespaceTokenizer};
pub use treebank::{PunctuationRule, TreebankTokenizer};

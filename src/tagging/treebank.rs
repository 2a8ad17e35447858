//! Penn-treebank-style word tokenizer.
//!
//! The text is rewritten by a fixed cascade of regex substitutions that pad
//! token boundaries with spaces, split on whitespace, and the resulting
//! tokens are then aligned back onto the source text to recover offsets.
//!
//! The punctuation stage is configurable. The default rules split `:` and `,`
//! only when not followed by a digit, so `10,000` and `12:30` stay whole.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::token::{Token, Tokenizer};

/// A regex substitution applied during tokenization.
///
/// `replacement` uses the `regex` crate syntax (`$1`, `${1}`, `$0`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunctuationRule {
    /// Regex pattern
    pub pattern: String,
    /// Replacement template
    pub replacement: String,
}

impl PunctuationRule {
    /// Create a new rule.
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    /// The default punctuation rules.
    pub fn defaults() -> Vec<Self> {
        DEFAULT_PUNCTUATION
            .iter()
            .map(|(pattern, replacement)| Self::new(*pattern, *replacement))
            .collect()
    }
}

const DEFAULT_PUNCTUATION: &[(&str, &str)] = &[
    (r"([:,])([^\d])", " ${1} ${2}"),
    (r"([:,])$", " ${1} "),
    (r"\.\.\.", " ... "),
    (r"[;@#$/%&]", " ${0} "),
    // final period
    (r#"([^\.])(\.)([\]\)}>"']*)\s*$"#, "${1} ${2}${3} "),
    (r"[?!]", " ${0} "),
    (r"([^'])' ", "${1} ' "),
];

const STARTING_QUOTES: &[(&str, &str)] = &[
    (r#"^""#, "``"),
    (r"(``)", " ${1} "),
    (r#"([ (\[{<])("|'{2})"#, "${1} `` "),
];

const PARENS_BRACKETS: (&str, &str) = (r"[\]\[(){}<>]", " ${0} ");

const DOUBLE_DASHES: (&str, &str) = (r"--", " -- ");

const ENDING_QUOTES: &[(&str, &str)] = &[
    (r"''", " '' "),
    (r#"""#, " '' "),
    (r"([^' ])('[sS]|'[mM]|'[dD]|') ", "${1} ${2} "),
    (r"([^' ])('ll|'LL|'re|'RE|'ve|'VE|n't|N'T) ", "${1} ${2} "),
];

const CONTRACTIONS: &[&str] = &[
    r"(?i)\b(can)(not)\b",
    r"(?i)\b(d)('ye)\b",
    r"(?i)\b(gim)(me)\b",
    r"(?i)\b(gon)(na)\b",
    r"(?i)\b(got)(ta)\b",
    r"(?i)\b(lem)(me)\b",
    r"(?i)\b(more)('n)\b",
    r"(?i)\b(wan)(na)\s",
    r"(?i) ('t)(is)\b",
    r"(?i) ('t)(was)\b",
];

const CONTRACTION_REPLACEMENT: &str = " ${1} ${2} ";

#[derive(Debug, Clone)]
struct Substitution {
    regex: Regex,
    replacement: String,
}

impl Substitution {
    fn compile(pattern: &str, replacement: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            replacement: replacement.to_string(),
        })
    }

    fn builtin(pattern: &str, replacement: &str) -> Self {
        Self::compile(pattern, replacement).expect("built-in tokenizer pattern must compile")
    }

    fn apply(&self, text: &str) -> String {
        self.regex
            .replace_all(text, self.replacement.as_str())
            .into_owned()
    }
}

fn builtin_all(rules: &[(&str, &str)]) -> Vec<Substitution> {
    rules
        .iter()
        .map(|(pattern, replacement)| Substitution::builtin(pattern, replacement))
        .collect()
}

static STARTING_QUOTE_RULES: LazyLock<Vec<Substitution>> =
    LazyLock::new(|| builtin_all(STARTING_QUOTES));

static DEFAULT_PUNCTUATION_RULES: LazyLock<Vec<Substitution>> =
    LazyLock::new(|| builtin_all(DEFAULT_PUNCTUATION));

static BRACKET_AND_DASH_RULES: LazyLock<Vec<Substitution>> =
    LazyLock::new(|| builtin_all(&[PARENS_BRACKETS, DOUBLE_DASHES]));

static ENDING_QUOTE_RULES: LazyLock<Vec<Substitution>> =
    LazyLock::new(|| builtin_all(ENDING_QUOTES));

static CONTRACTION_RULES: LazyLock<Vec<Substitution>> = LazyLock::new(|| {
    CONTRACTIONS
        .iter()
        .map(|pattern| Substitution::builtin(pattern, CONTRACTION_REPLACEMENT))
        .collect()
});

/// Quotes in the source text that the substitutions rewrite to `` or ''.
static SOURCE_QUOTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"``|'{2}|""#).expect("built-in tokenizer pattern must compile"));

/// Penn-treebank-style word tokenizer with configurable punctuation rules.
#[derive(Debug, Clone)]
pub struct TreebankTokenizer {
    punctuation: Vec<Substitution>,
}

impl TreebankTokenizer {
    /// Create a tokenizer with the default punctuation rules.
    pub fn new() -> Self {
        Self {
            punctuation: DEFAULT_PUNCTUATION_RULES.clone(),
        }
    }

    /// Create a tokenizer with custom punctuation rules, applied in order.
    pub fn with_punctuation(rules: &[PunctuationRule]) -> Result<Self, regex::Error> {
        let punctuation = rules
            .iter()
            .map(|rule| Substitution::compile(&rule.pattern, &rule.replacement))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { punctuation })
    }

    /// Split text into token strings. Quotes come back rewritten as `` and ''.
    pub fn word_tokenize(&self, text: &str) -> Vec<String> {
        let mut text = text.to_string();
        let stages = [
            STARTING_QUOTE_RULES.as_slice(),
            self.punctuation.as_slice(),
            BRACKET_AND_DASH_RULES.as_slice(),
        ];
        for rule in stages.into_iter().flatten() {
            text = rule.apply(&text);
        }

        text = format!(" {} ", text);
        for rule in ENDING_QUOTE_RULES.iter().chain(CONTRACTION_RULES.iter()) {
            text = rule.apply(&text);
        }

        text.split_whitespace().map(str::to_string).collect()
    }
}

impl Default for TreebankTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for TreebankTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut words = self.word_tokenize(text);

        // Map rewritten quote tokens back to the quotes actually in the text
        if text.contains('"') || text.contains("''") {
            let mut quotes = SOURCE_QUOTES.find_iter(text).map(|m| m.as_str());
            for word in words.iter_mut() {
                if matches!(word.as_str(), "\"" | "``" | "''") {
                    if let Some(quote) = quotes.next() {
                        *word = quote.to_string();
                    }
                }
            }
        }

        align_tokens(&words, text)
    }
}

/// Locate each word in `text`, left to right, and attach character offsets.
///
/// Words that cannot be found after the previous match are skipped.
fn align_tokens(words: &[String], text: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(words.len());
    let mut byte_cursor = 0;
    let mut char_cursor = 0;

    for word in words {
        let Some(found) = text[byte_cursor..].find(word.as_str()) else {
            log::warn!(
                "Tokenizer produced {:?} which cannot be aligned after byte {}; skipping it",
                word,
                byte_cursor
            );
            continue;
        };
        let byte_start = byte_cursor + found;
        let char_start = char_cursor + text[byte_cursor..byte_start].chars().count();

        tokens.push(Token::new(word.as_str(), char_start));

        byte_cursor = byte_start + word.len();
        char_cursor = char_start + word.chars().count();
    }

    tokens
}

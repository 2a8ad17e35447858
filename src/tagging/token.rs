//! Tokens and the tokenizer seam.

/// A token produced by a [`Tokenizer`].
///
/// Offsets count characters (Unicode scalar values), the same unit span
/// offsets use, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token text exactly as it appears in the source
    pub text: String,
    /// Character offset of the token's first character
    pub start: usize,
}

impl Token {
    /// Create a new token.
    pub fn new(text: impl Into<String>, start: usize) -> Self {
        Self {
            text: text.into(),
            start,
        }
    }

    /// Length of the token in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Check if the token text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Character offset one past the token's last character.
    pub fn end(&self) -> usize {
        self.start + self.len()
    }
}

/// Splits text into tokens.
///
/// Implementations must return non-overlapping tokens sorted by `start`,
/// covering the text without normalizing it: every token's text must equal
/// the source characters at its offsets.
///
/// Any `Fn(&str) -> Vec<Token>` is a tokenizer.
pub trait Tokenizer {
    /// Tokenize a text.
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

impl<F> Tokenizer for F
where
    F: Fn(&str) -> Vec<Token>,
{
    fn tokenize(&self, text: &str) -> Vec<Token> {
        self(text)
    }
}

/// Splits on Unicode whitespace only.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut current: Option<Token> = None;

        for (offset, c) in text.chars().enumerate() {
            if c.is_whitespace() {
                tokens.extend(current.take());
            } else {
                current
                    .get_or_insert_with(|| Token::new(String::new(), offset))
                    .text
                    .push(c);
            }
        }
        tokens.extend(current);

        tokens
    }
}

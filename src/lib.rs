//! Label Converter - labeling config parsing and BIO span tagging
//!
//! Turns a labeling tool's XML-like labeling config into a structured
//! schema of output tags, and turns labeled text spans into BIO-tagged token
//! sequences for sequence-labeling exports.
//!
//! ## Modules
//!
//! - [`label_config`]: config tree building and schema extraction
//! - [`tagging`]: tokenizers and the BIO span tagger
//! - [`results`]: helpers over exported annotation results
//! - [`config`]: converter settings persisted as JSON

pub mod config;
pub mod label_config;
pub mod results;
pub mod tagging;

pub use config::{ConfigError, ConverterConfig};
pub use label_config::{ConfigParser, LabelConfigError, ParseResult, Schema, parse_config};
pub use results::ResultError;
pub use tagging::{Span, SpanTagger, TaggedSequence, TreebankTokenizer, create_tokens_and_tags};

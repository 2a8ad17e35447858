//! Labeling config parsing.
//!
//! A labeling config is an XML-like tag tree that declares:
//!
//! - **Input tags** (`Text`, `Image`, ...): carry `name` and `value`, and
//!   supply the content being annotated.
//! - **Output tags** (`Labels`, `Choices`, ...): carry `name` and `toName`,
//!   and produce annotation results for the named input tags.
//! - **Label tags** (`Label`, `Choice`): nested anywhere below an output tag,
//!   and declare the values that output tag can produce.
//!
//! ## Usage
//!
//! ```rust
//! use label_converter::label_config::parse_config;
//!
//! let schema = parse_config(
//!     r#"<View>
//!          <Text name="text" value="$text"/>
//!          <Labels name="ner" toName="text">
//!            <Label value="PER"/>
//!            <Label value="ORG"/>
//!          </Labels>
//!        </View>"#,
//! )
//! .unwrap();
//!
//! let ner = schema.get("ner").unwrap();
//! assert_eq!(ner.labels, vec!["PER", "ORG"]);
//! assert_eq!(ner.inputs[0].value, "text");
//! ```

mod error;
mod parser;
mod schema;
mod tree;

#[cfg(test)]
mod tests;

pub use error::LabelConfigError;
pub use parser::{
    ConfigParser, DEFAULT_EXCLUDED_OUTPUT_TAGS, DEFAULT_LABEL_TAGS, ParseResult, parse_config,
};
pub use schema::{
    Attributes, ConditionalRule, InputTag, LabelEntry, OrderedMap, OutputTag, Schema,
};
pub use tree::{Ancestors, ConfigNode, ConfigTree, NodeId};

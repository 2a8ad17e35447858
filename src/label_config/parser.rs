//! Label config parser.
//!
//! Turns a labeling config into a [`Schema`] in a single document-order pass
//! followed by a resolution pass over the recorded output tags.

use std::collections::HashSet;

use super::error::LabelConfigError;
use super::schema::{
    Attributes, ConditionalRule, InputTag, LabelEntry, OrderedMap, OutputTag, Schema,
};
use super::tree::{ConfigNode, ConfigTree, NodeId};

/// Tag kinds whose values become labels of their owning output tag.
pub const DEFAULT_LABEL_TAGS: &[&str] = &["Label", "Choice"];

/// Tag kinds that carry `name` and `toName` but never produce results.
pub const DEFAULT_EXCLUDED_OUTPUT_TAGS: &[&str] = &["Filter"];

/// Result of parsing a label config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseResult {
    /// Parsed schema.
    pub schema: Schema,
    /// Non-fatal diagnostics (unresolved `toName`, labels without value, ...).
    pub warnings: Vec<String>,
}

impl ParseResult {
    /// Create an empty parse result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and log it.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        log::debug!("{}", warning);
        self.warnings.push(warning);
    }

    /// Check if there were any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Parser for labeling configs.
///
/// The two tag sets that drive classification are configurable; the
/// defaults match the labeling tool (`Label`/`Choice` are label tags,
/// `Filter` is never an output tag).
#[derive(Debug, Clone)]
pub struct ConfigParser {
    label_tags: HashSet<String>,
    excluded_output_tags: HashSet<String>,
}

impl ConfigParser {
    /// Create a parser with the default tag sets.
    pub fn new() -> Self {
        Self {
            label_tags: DEFAULT_LABEL_TAGS.iter().map(|s| s.to_string()).collect(),
            excluded_output_tags: DEFAULT_EXCLUDED_OUTPUT_TAGS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Replace the set of label tag kinds.
    pub fn with_label_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.label_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the set of tag kinds excluded from output classification.
    pub fn with_excluded_output_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_output_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Parse a config string.
    ///
    /// An empty string yields an empty schema. Markup that is not
    /// well-formed yields [`LabelConfigError::Malformed`].
    pub fn parse(&self, config: &str) -> Result<ParseResult, LabelConfigError> {
        if config.is_empty() {
            return Ok(ParseResult::new());
        }
        let tree = ConfigTree::parse(config)?;
        Ok(self.parse_tree(&tree))
    }

    /// Build a schema from an already parsed tree.
    ///
    /// Nodes are visited in document order, and a label tag is attached to
    /// the nearest ancestor already recorded as an output tag. This relies on
    /// output tags being visited before their descendants, which pre-order
    /// traversal guarantees.
    pub fn parse_tree(&self, tree: &ConfigTree) -> ParseResult {
        let mut result = ParseResult::new();
        let mut outputs: OrderedMap<OutputTag> = OrderedMap::new();
        let mut inputs: OrderedMap<InputTag> = OrderedMap::new();
        let mut labels: OrderedMap<OrderedMap<Attributes>> = OrderedMap::new();

        for (id, node) in tree.iter() {
            if let Some((name, tag)) = self.output_tag(node, &mut result) {
                outputs.insert(name, tag);
            } else if let (Some(name), Some(value)) = (node.attr("name"), node.attr("value")) {
                inputs.insert(name, InputTag::new(node.tag.as_str(), value));
            }

            if !self.label_tags.contains(&node.tag) {
                continue;
            }
            let Some(owner) = owning_output(tree, id, &outputs) else {
                continue;
            };
            match LabelEntry::from_attributes(&node.attributes) {
                Some(entry) => {
                    labels
                        .get_or_insert_default(owner)
                        .insert(entry.value, entry.attrs);
                }
                None => result.add_warning(format!(
                    "Inspecting tag <{}> under \"{}\": found no \"value\" or \"alias\" attributes",
                    node.tag, owner
                )),
            }
        }

        let mut resolved = OrderedMap::new();
        for (name, tag) in outputs.iter() {
            let mut tag = tag.clone();
            for input_name in &tag.to_name {
                match inputs.get(input_name) {
                    Some(input) => tag.inputs.push(input.clone()),
                    None => result.add_warning(format!(
                        "to_name={} is specified for output tag name={}, but we can't find it among input tags",
                        input_name, name
                    )),
                }
            }
            if let Some(ConditionalRule::Tag { name: target }) = &tag.conditionals {
                if !outputs.contains_key(target) {
                    result.add_warning(format!(
                        "whenTagName={} is specified for output tag name={}, but we can't find it among output tags",
                        target, name
                    ));
                }
            }
            if let Some(owned) = labels.get(name) {
                tag.labels = owned.keys().map(str::to_string).collect();
                tag.labels_attrs = owned.clone();
            }
            resolved.insert(name, tag);
        }

        result.schema = Schema::from_outputs(resolved);
        result
    }

    /// Classify a node as an output tag.
    fn output_tag(
        &self,
        node: &ConfigNode,
        result: &mut ParseResult,
    ) -> Option<(String, OutputTag)> {
        let name = node.attr("name")?;
        let to_name = node.attr("toName")?;
        if self.excluded_output_tags.contains(&node.tag) {
            return None;
        }

        let to_name = to_name.split(',').map(str::to_string).collect();
        let conditionals = if node.attributes.get_str("perRegion") == Some("true") {
            conditional_rule(node, name, result)
        } else {
            None
        };

        Some((
            name.to_string(),
            OutputTag::new(node.tag.as_str(), to_name).with_conditionals(conditionals),
        ))
    }
}

impl Default for ConfigParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the conditional rule of a per-region output tag. The first set
/// attribute in precedence order wins; a per-region tag without any is
/// reported.
fn conditional_rule(
    node: &ConfigNode,
    name: &str,
    result: &mut ParseResult,
) -> Option<ConditionalRule> {
    let set: Vec<(&str, &str)> = ConditionalRule::ATTRIBUTES
        .iter()
        .filter_map(|attr| node.attr(attr).map(|value| (*attr, value)))
        .collect();

    if set.len() > 1 {
        let names: Vec<_> = set.iter().map(|(attr, _)| *attr).collect();
        result.add_warning(format!(
            "Output tag name={} sets several conditional attributes ({}); using {}",
            name,
            names.join(", "),
            names[0]
        ));
    }

    let Some((attr, value)) = set.first() else {
        result.add_warning(format!(
            "Output tag name={} has perRegion=\"true\" but none of {} is set",
            name,
            ConditionalRule::ATTRIBUTES.join(", ")
        ));
        return None;
    };
    ConditionalRule::from_attribute(attr, value)
}

/// Find the nearest ancestor of `id` already recorded as an output tag.
fn owning_output<'a>(
    tree: &'a ConfigTree,
    id: NodeId,
    outputs: &OrderedMap<OutputTag>,
) -> Option<&'a str> {
    tree.ancestors(id)
        .filter_map(|(_, node)| node.attributes.get_str("name"))
        .find(|name| outputs.contains_key(name))
}

/// Parse a config with the default parser, discarding warnings.
///
/// Warnings are still emitted through the `log` facade.
pub fn parse_config(config: &str) -> Result<Schema, LabelConfigError> {
    ConfigParser::new().parse(config).map(|result| result.schema)
}

//! Schema types produced by the label config parser.
//!
//! A [`Schema`] maps every output (control) tag name to an [`OutputTag`]
//! record. It serializes to the same JSON shape downstream exporters already
//! consume:
//!
//! ```json
//! {
//!   "label": {
//!     "type": "Labels",
//!     "to_name": ["text"],
//!     "inputs": [{"type": "Text", "value": "text"}],
//!     "labels": ["PER", "ORG"],
//!     "labels_attrs": {"PER": {"value": "PER"}, "ORG": {"value": "ORG"}}
//!   }
//! }
//! ```

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

// ============================================================================
// Ordered Map
// ============================================================================

/// String-keyed map that iterates in first-insertion order.
///
/// Re-inserting an existing key replaces its value but keeps its position.
#[derive(Debug, Clone)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> OrderedMap<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert or replace a value, returning the previous one if any.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.index.get(&key) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Get a mutable value by key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        match self.index.get(key) {
            Some(&i) => Some(&mut self.entries[i].1),
            None => None,
        }
    }

    /// Get a mutable value, inserting `V::default()` at the end if absent.
    pub fn get_or_insert_default(&mut self, key: &str) -> &mut V
    where
        V: Default,
    {
        let i = match self.index.get(key) {
            Some(&i) => i,
            None => {
                self.insert(key, V::default());
                self.entries.len() - 1
            }
        };
        &mut self.entries[i].1
    }

    /// Check whether the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate over values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: PartialEq> PartialEq for OrderedMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<V: Eq> Eq for OrderedMap<V> {}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Raw attributes of a config tag, in document order.
///
/// The accepted key set is open-ended and defined by the labeling tool, so
/// attributes stay a plain string map.
pub type Attributes = OrderedMap<String>;

impl OrderedMap<String> {
    /// Get an attribute value as a string slice.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }

    /// Get an attribute value, treating an empty string as absent.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get_str(key).filter(|v| !v.is_empty())
    }
}

// ============================================================================
// Tag Descriptors
// ============================================================================

/// An input (object) tag: supplies the content being annotated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputTag {
    /// Tag kind, e.g. `Text` or `Image`
    #[serde(rename = "type")]
    pub kind: String,
    /// Data key the tag reads from, with the leading `$` stripped
    pub value: String,
}

impl InputTag {
    /// Create an input tag descriptor from a raw `value` attribute.
    pub fn new(kind: impl Into<String>, raw_value: &str) -> Self {
        Self {
            kind: kind.into(),
            value: raw_value.trim_start_matches('$').to_string(),
        }
    }
}

/// Per-region restriction on an output tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConditionalRule {
    /// Applies when a region of the named tag is selected (`whenTagName`)
    Tag {
        /// Referenced tag name
        name: String,
    },
    /// Applies when the named label is selected (`whenLabelValue`)
    Label {
        /// Referenced label value
        name: String,
    },
    /// Applies when the named choice is selected (`whenChoiceValue`)
    Choice {
        /// Referenced choice value
        name: String,
    },
}

impl ConditionalRule {
    /// Attributes that declare a rule, in precedence order.
    pub const ATTRIBUTES: [&'static str; 3] = ["whenTagName", "whenLabelValue", "whenChoiceValue"];

    /// Build the rule for one of the [`ATTRIBUTES`](Self::ATTRIBUTES).
    pub fn from_attribute(attribute: &str, name: &str) -> Option<Self> {
        let name = name.to_string();
        match attribute {
            "whenTagName" => Some(Self::Tag { name }),
            "whenLabelValue" => Some(Self::Label { name }),
            "whenChoiceValue" => Some(Self::Choice { name }),
            _ => None,
        }
    }

    /// Name of the referenced tag, label or choice.
    pub fn name(&self) -> &str {
        match self {
            Self::Tag { name } | Self::Label { name } | Self::Choice { name } => name,
        }
    }
}

/// A label or choice value together with the raw attributes of its tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEntry {
    /// `alias` attribute if present, else `value`
    pub value: String,
    /// Copy of every attribute on the label tag
    pub attrs: Attributes,
}

impl LabelEntry {
    /// Resolve the label value of a tag. Returns `None` if the tag has
    /// neither a non-empty `alias` nor a non-empty `value`.
    pub fn from_attributes(attrs: &Attributes) -> Option<Self> {
        let value = attrs.non_empty("alias").or_else(|| attrs.non_empty("value"))?;
        Some(Self {
            value: value.to_string(),
            attrs: attrs.clone(),
        })
    }
}

/// An output (control) tag: produces annotation results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputTag {
    /// Tag kind, e.g. `Labels` or `Choices`
    #[serde(rename = "type")]
    pub kind: String,
    /// Names of the input tags this tag annotates, from `toName`
    pub to_name: Vec<String>,
    /// Descriptors of the `to_name` entries that resolved to input tags
    pub inputs: Vec<InputTag>,
    /// Label values in first-seen order
    pub labels: Vec<String>,
    /// Attributes of each label, keyed by label value
    pub labels_attrs: OrderedMap<Attributes>,
    /// Per-region conditional rule, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditionals: Option<ConditionalRule>,
}

impl OutputTag {
    /// Create an output tag with no resolved inputs or labels yet.
    pub fn new(kind: impl Into<String>, to_name: Vec<String>) -> Self {
        Self {
            kind: kind.into(),
            to_name,
            inputs: Vec::new(),
            labels: Vec::new(),
            labels_attrs: OrderedMap::new(),
            conditionals: None,
        }
    }

    /// Set the conditional rule.
    pub fn with_conditionals(mut self, rule: Option<ConditionalRule>) -> Self {
        self.conditionals = rule;
        self
    }

    /// Attributes of a label value.
    pub fn label_attrs(&self, label: &str) -> Option<&Attributes> {
        self.labels_attrs.get(label)
    }

    /// Check whether a label value is declared for this tag.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels_attrs.contains_key(label)
    }

    /// Labels as `LabelEntry` values, in first-seen order.
    pub fn label_entries(&self) -> Vec<LabelEntry> {
        self.labels_attrs
            .iter()
            .map(|(value, attrs)| LabelEntry {
                value: value.to_string(),
                attrs: attrs.clone(),
            })
            .collect()
    }
}

// ============================================================================
// Schema
// ============================================================================

/// Structured view of a labeling config: output tag name → descriptor.
///
/// Built in one pass by [`ConfigParser`](super::ConfigParser) and immutable
/// afterwards. Iteration follows the document order of the output tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    outputs: OrderedMap<OutputTag>,
}

impl Schema {
    pub(crate) fn from_outputs(outputs: OrderedMap<OutputTag>) -> Self {
        Self { outputs }
    }

    /// Look up an output tag by name.
    pub fn get(&self, name: &str) -> Option<&OutputTag> {
        self.outputs.get(name)
    }

    /// Number of output tags.
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Check if the config declared no output tags.
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Iterate over `(name, output tag)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OutputTag)> {
        self.outputs.iter()
    }

    /// Output tag names in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.outputs.keys()
    }

    /// Output tags of the given kind (e.g. every `Labels` tag).
    pub fn outputs_of_kind<'a>(
        &'a self,
        kind: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a OutputTag)> {
        self.outputs.iter().filter(move |(_, tag)| tag.kind == kind)
    }

    /// Serialize to the JSON shape consumed by exporters.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.outputs.serialize(serializer)
    }
}

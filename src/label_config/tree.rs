//! Arena-backed element tree for labeling configs.
//!
//! Nodes are stored in a flat `Vec` and reference their parent by index, so
//! upward walks never need owning back-pointers. Nodes are pushed as their
//! start tag is read, which makes arena order identical to document
//! (pre-)order: a node's index is always greater than its parent's.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::error::LabelConfigError;
use super::schema::Attributes;

/// Index of a node inside a [`ConfigTree`].
pub type NodeId = usize;

/// A single element of the config tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigNode {
    /// Tag kind (element name), e.g. `Labels`
    pub tag: String,
    /// Attributes in document order
    pub attributes: Attributes,
    /// Enclosing element, `None` for the root
    pub parent: Option<NodeId>,
    /// Child elements in document order
    pub children: Vec<NodeId>,
}

impl ConfigNode {
    /// Get an attribute, treating an empty value as absent.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.non_empty(key)
    }
}

/// A parsed config document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigTree {
    nodes: Vec<ConfigNode>,
}

impl ConfigTree {
    /// Parse a config string into a tree.
    ///
    /// Only well-formedness is checked. DOCTYPE declarations are skipped
    /// without being processed, so no external or custom entity is ever
    /// resolved.
    pub fn parse(config: &str) -> Result<Self, LabelConfigError> {
        let mut reader = Reader::from_str(config);
        reader.check_comments(true);
        let mut tree = Self::default();
        let mut open: Vec<NodeId> = Vec::new();

        loop {
            let event = reader
                .read_event()
                .map_err(|e| LabelConfigError::malformed(e.to_string(), reader.buffer_position()))?;
            let position = reader.buffer_position();

            match event {
                Event::Start(ref e) => {
                    let id = tree.open_element(e, open.last().copied(), position)?;
                    open.push(id);
                }
                Event::Empty(ref e) => {
                    tree.open_element(e, open.last().copied(), position)?;
                }
                Event::End(_) => {
                    // quick-xml already checked the end name against the open tag
                    open.pop();
                }
                Event::Text(ref e) => {
                    let text = e
                        .unescape()
                        .map_err(|err| LabelConfigError::malformed(err.to_string(), position))?;
                    if open.is_empty() && !text.trim().is_empty() {
                        return Err(LabelConfigError::malformed(
                            "Text content outside of the root element",
                            position,
                        ));
                    }
                }
                Event::CData(_) if open.is_empty() => {
                    return Err(LabelConfigError::malformed(
                        "CDATA section outside of the root element",
                        position,
                    ));
                }
                Event::DocType(_) => {
                    log::debug!("Skipping DOCTYPE declaration in label config");
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(&id) = open.last() {
            return Err(LabelConfigError::malformed(
                format!("Unclosed element <{}>", tree.nodes[id].tag),
                config.len(),
            ));
        }
        if tree.nodes.is_empty() {
            return Err(LabelConfigError::malformed(
                "Document is empty: no root element",
                config.len(),
            ));
        }

        Ok(tree)
    }

    fn open_element(
        &mut self,
        start: &BytesStart<'_>,
        parent: Option<NodeId>,
        position: usize,
    ) -> Result<NodeId, LabelConfigError> {
        if parent.is_none() && !self.nodes.is_empty() {
            return Err(LabelConfigError::malformed(
                "Extra content at the end of the document: more than one root element",
                position,
            ));
        }

        let tag = xml_name(start.name().as_ref(), position)?;

        let mut attributes = Attributes::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| LabelConfigError::malformed(e.to_string(), position))?;
            let key = xml_name(attr.key.as_ref(), position)?;
            let value = attribute_value(&attr.value, position)?;
            attributes.insert(key, value);
        }

        let id = self.nodes.len();
        self.nodes.push(ConfigNode {
            tag,
            attributes,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(id);
        }
        Ok(id)
    }

    /// The root element, if the tree is non-empty.
    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() { None } else { Some(0) }
    }

    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Option<&ConfigNode> {
        self.nodes.get(id)
    }

    /// Number of elements in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no elements.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over every node in document order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &ConfigNode)> {
        self.nodes.iter().enumerate()
    }

    /// Iterate over the ancestors of a node, nearest first. The node itself
    /// is not included.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.nodes.get(id).and_then(|n| n.parent),
        }
    }
}

/// Decode an element or attribute name, rejecting anything that is not an
/// XML `Name`.
fn xml_name(raw: &[u8], position: usize) -> Result<String, LabelConfigError> {
    let name = std::str::from_utf8(raw)
        .map_err(|e| LabelConfigError::malformed(e.to_string(), position))?;

    let mut chars = name.chars();
    let valid = chars.next().is_some_and(is_name_start_char) && chars.all(is_name_char);
    if !valid {
        return Err(LabelConfigError::malformed(
            format!("Invalid element or attribute name {:?}", name),
            position,
        ));
    }
    Ok(name.to_string())
}

fn is_name_start_char(c: char) -> bool {
    matches!(
        c,
        ':' | 'A'..='Z'
            | '_'
            | 'a'..='z'
            | '\u{C0}'..='\u{D6}'
            | '\u{D8}'..='\u{F6}'
            | '\u{F8}'..='\u{2FF}'
            | '\u{370}'..='\u{37D}'
            | '\u{37F}'..='\u{1FFF}'
            | '\u{200C}'..='\u{200D}'
            | '\u{2070}'..='\u{218F}'
            | '\u{2C00}'..='\u{2FEF}'
            | '\u{3001}'..='\u{D7FF}'
            | '\u{F900}'..='\u{FDCF}'
            | '\u{FDF0}'..='\u{FFFD}'
            | '\u{10000}'..='\u{EFFFF}'
    )
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(
            c,
            '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}'
        )
}

/// Decode a raw attribute value.
///
/// A literal `<` is rejected. Literal tabs and line breaks are normalized to
/// spaces before entities are expanded, so `&#10;` still yields a newline.
fn attribute_value(raw: &[u8], position: usize) -> Result<String, LabelConfigError> {
    let raw = std::str::from_utf8(raw)
        .map_err(|e| LabelConfigError::malformed(e.to_string(), position))?;
    if raw.contains('<') {
        return Err(LabelConfigError::malformed(
            "Unescaped '<' not allowed in attribute values",
            position,
        ));
    }

    let normalized = raw.replace("\r\n", " ").replace(['\t', '\n', '\r'], " ");
    let value = quick_xml::escape::unescape(&normalized)
        .map_err(|e| LabelConfigError::malformed(e.to_string(), position))?;
    Ok(value.into_owned())
}

/// Iterator over the ancestors of a node.
pub struct Ancestors<'a> {
    tree: &'a ConfigTree,
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = (NodeId, &'a ConfigNode);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let node = &self.tree.nodes[id];
        self.next = node.parent;
        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_order_and_parents() {
        let tree = ConfigTree::parse(
            r#"<View><Text name="t" value="$text"/><Labels name="l" toName="t"><Label value="A"/></Labels></View>"#,
        )
        .unwrap();

        let tags: Vec<_> = tree.iter().map(|(_, n)| n.tag.as_str()).collect();
        assert_eq!(tags, vec!["View", "Text", "Labels", "Label"]);

        assert_eq!(tree.root(), Some(0));
        assert_eq!(tree.node(0).unwrap().children, vec![1, 2]);
        assert_eq!(tree.node(3).unwrap().parent, Some(2));

        let ancestors: Vec<_> = tree.ancestors(3).map(|(id, _)| id).collect();
        assert_eq!(ancestors, vec![2, 0]);
    }

    #[test]
    fn test_attributes_are_unescaped() {
        let tree = ConfigTree::parse(r#"<Label value="R&amp;D" hint="a &lt; b"/>"#).unwrap();
        let node = tree.node(0).unwrap();
        assert_eq!(node.attributes.get_str("value"), Some("R&D"));
        assert_eq!(node.attributes.get_str("hint"), Some("a < b"));
    }

    #[test]
    fn test_raw_less_than_in_attribute() {
        let err = ConfigTree::parse(r#"<View a="x<y"/>"#).unwrap_err();
        assert!(err.message().contains('<'), "{}", err);
        assert!(ConfigTree::parse(r#"<View a="x&lt;y"/>"#).is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert!(ConfigTree::parse("<1View/>").is_err());
        assert!(ConfigTree::parse(r#"<View 2a="x"/>"#).is_err());
        assert!(ConfigTree::parse(r#"<my-View x.y="1" _z="2"/>"#).is_ok());
    }

    #[test]
    fn test_double_hyphen_in_comment() {
        assert!(ConfigTree::parse("<View><!-- a -- b --></View>").is_err());
        assert!(ConfigTree::parse("<View><!-- a - b --></View>").is_ok());
    }

    #[test]
    fn test_attribute_whitespace_is_normalized() {
        let config = "<Label value=\"New\nYork\" hint=\"a\tb\r\nc\" raw=\"x&#10;y\"/>";
        let tree = ConfigTree::parse(config).unwrap();
        let node = tree.node(0).unwrap();
        assert_eq!(node.attributes.get_str("value"), Some("New York"));
        assert_eq!(node.attributes.get_str("hint"), Some("a b c"));
        assert_eq!(node.attributes.get_str("raw"), Some("x\ny"));
    }

    #[test]
    fn test_empty_attribute_reads_as_absent() {
        let tree = ConfigTree::parse(r#"<Label value="" alias="x"/>"#).unwrap();
        let node = tree.node(0).unwrap();
        assert_eq!(node.attr("value"), None);
        assert_eq!(node.attr("alias"), Some("x"));
        assert_eq!(node.attributes.get_str("value"), Some(""));
    }

    #[test]
    fn test_mismatched_end_tag() {
        let err = ConfigTree::parse("<View><Text></View>").unwrap_err();
        assert!(matches!(err, LabelConfigError::Malformed { .. }));
    }

    #[test]
    fn test_unclosed_element() {
        let err = ConfigTree::parse("<View><Text/>").unwrap_err();
        assert!(err.message().contains("View"), "{}", err);
    }

    #[test]
    fn test_multiple_roots() {
        assert!(ConfigTree::parse("<View/><View/>").is_err());
    }

    #[test]
    fn test_text_outside_root() {
        assert!(ConfigTree::parse("<View/>trailing").is_err());
        assert!(ConfigTree::parse("  <View/>\n").is_ok());
    }

    #[test]
    fn test_whitespace_only_is_empty_document() {
        let err = ConfigTree::parse("   ").unwrap_err();
        assert!(err.message().contains("empty"));
    }

    #[test]
    fn test_doctype_entities_are_not_expanded() {
        let config = r#"<!DOCTYPE View [<!ENTITY x "boom">]><View><Label value="&x;"/></View>"#;
        assert!(ConfigTree::parse(config).is_err());
    }

    #[test]
    fn test_comments_and_declaration_are_ignored() {
        let config = "<?xml version=\"1.0\"?>\n<!-- header --><View><!-- inner --></View>";
        let tree = ConfigTree::parse(config).unwrap();
        assert_eq!(tree.len(), 1);
    }
}

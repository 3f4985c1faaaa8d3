//! Decoded wire structure
//!
//! The transport collaborator decodes one XML response into a tree of
//! [`WireNode`] values: an attribute map, an ordered child map and optional
//! element text. Parsers read it through the typed accessors below; the
//! `req_*` variants raise a data-format error naming the missing piece, so a
//! well-formed-but-sparse response degrades to defaults while a structurally
//! broken one fails loudly.

use std::collections::BTreeMap;

use crate::coerce;
use crate::{Error, Result};

/// One decoded XML element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WireNode {
    attributes: BTreeMap<String, String>,
    children: BTreeMap<String, Vec<WireNode>>,
    text: Option<String>,
}

impl WireNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a leaf element carrying only text
    pub fn with_text<S: Into<String>>(text: S) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Builder-style attribute insertion, used by transports and fixtures
    pub fn set_attr<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder-style child insertion; repeated names accumulate in order
    pub fn push_child<K: Into<String>>(mut self, name: K, child: WireNode) -> Self {
        self.children.entry(name.into()).or_default().push(child);
        self
    }

    /// Builder-style text child insertion, shorthand for a text-only element
    pub fn push_text_child<K: Into<String>, V: Into<String>>(self, name: K, text: V) -> Self {
        self.push_child(name, WireNode::with_text(text))
    }

    pub fn set_text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn req_attr(&self, name: &str) -> Result<&str> {
        self.attr(name)
            .ok_or_else(|| Error::data_format(format!("missing required attribute '{}'", name)))
    }

    pub fn attr_int(&self, name: &str) -> Option<i64> {
        coerce::assure_int(self.attr(name), None)
    }

    pub fn req_attr_int(&self, name: &str) -> Result<i64> {
        self.req_attr(name)
            .map(|text| coerce::assure_int(Some(text), None).unwrap_or(0))
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn req_text(&self) -> Result<&str> {
        self.text()
            .ok_or_else(|| Error::data_format("missing element contents".to_string()))
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&WireNode> {
        self.children.get(name).and_then(|nodes| nodes.first())
    }

    pub fn req_child(&self, name: &str) -> Result<&WireNode> {
        self.child(name)
            .ok_or_else(|| Error::data_format(format!("missing required element '{}'", name)))
    }

    /// All child elements with the given name, empty when absent
    pub fn children(&self, name: &str) -> &[WireNode] {
        self.children
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(WireNode::text)
    }

    pub fn req_child_text(&self, name: &str) -> Result<&str> {
        self.req_child(name)?.req_text()
    }

    pub fn child_string(&self, name: &str) -> Option<String> {
        coerce::assure_string(self.child_text(name), None)
    }

    pub fn child_int(&self, name: &str) -> Option<i64> {
        coerce::assure_int(self.child_text(name), None)
    }

    pub fn req_child_int(&self, name: &str) -> Result<i64> {
        self.req_child_text(name)
            .map(|text| coerce::assure_int(Some(text), None).unwrap_or(0))
    }

    pub fn child_positive_int(&self, name: &str) -> Option<i64> {
        coerce::assure_positive_int(self.child_text(name), None)
    }

    pub fn child_bool(&self, name: &str) -> bool {
        coerce::assure_bool(self.child_text(name))
    }

    /// Integer list from repeated scalar children of a container element,
    /// e.g. `<usergroups><id>1</id><id>2</id></usergroups>`
    pub fn child_int_list(&self, container: &str, item: &str) -> Vec<i64> {
        match self.child(container) {
            Some(parent) => parent
                .children(item)
                .iter()
                .filter_map(|node| coerce::assure_positive_int(node.text(), None))
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WireNode {
        WireNode::new()
            .set_attr("id", "7")
            .set_attr("type", "6")
            .push_text_child("title", "General")
            .push_text_child("displayorder", "3")
            .push_text_child("enabled", "1")
            .push_child(
                "usergroups",
                WireNode::new()
                    .push_text_child("id", "1")
                    .push_text_child("id", "2"),
            )
    }

    #[test]
    fn test_attr_accessors() {
        let node = sample();
        assert_eq!(node.attr("id"), Some("7"));
        assert_eq!(node.attr_int("type"), Some(6));
        assert_eq!(node.attr("missing"), None);
        assert!(node.req_attr("missing").is_err());
    }

    #[test]
    fn test_child_accessors() {
        let node = sample();
        assert_eq!(node.child_text("title"), Some("General"));
        assert_eq!(node.child_int("displayorder"), Some(3));
        assert!(node.child_bool("enabled"));
        assert!(!node.child_bool("absent"));
        assert_eq!(node.child_positive_int("absent"), None);
    }

    #[test]
    fn test_req_child_raises_data_format() {
        let node = sample();
        let err = node.req_child("nope").unwrap_err();
        assert!(err.is_data_format());
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_repeated_children_preserve_order() {
        let node = sample();
        assert_eq!(node.child_int_list("usergroups", "id"), vec![1, 2]);
        assert_eq!(node.children("usergroups").len(), 1);
        assert!(node.children("absent").is_empty());
    }

    #[test]
    fn test_sparse_input_degrades_to_defaults() {
        let node = WireNode::new().push_text_child("id", "1");
        assert_eq!(node.child_text("title"), None);
        assert_eq!(node.child_int("displayorder"), None);
        assert!(!node.child_bool("enabled"));
        assert!(node.child_int_list("usergroups", "id").is_empty());
    }
}

//! XML Tree Module
//!
//! This module converts XML text into a generic nested key/value tree: elements
//! become map keys, text content becomes string leaves, and repeated sibling
//! elements collapse into an ordered list. Attributes are ignored (the DMARC
//! aggregate format does not use them). A recursion depth limit protects
//! against pathologically nested input.
//!
//! `XmlValue` is the only place untyped report data lives; the extractor walks
//! it through the narrow lookup interface below and nothing else interprets
//! the tree.

use crate::error::{RelayError, Result};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::BTreeMap;
use std::slice;

const MAX_DEPTH: usize = 20;

/// A parsed XML subtree.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlValue {
    /// Leaf element: its text content (empty for `<tag/>`).
    Text(String),
    /// Element with child elements, keyed by tag name.
    Map(BTreeMap<String, XmlValue>),
    /// Repeated sibling elements, in document order.
    List(Vec<XmlValue>),
}

impl XmlValue {
    /// Looks up a child element by name. `None` on leaves and lists.
    pub fn child(&self, name: &str) -> Option<&XmlValue> {
        match self {
            XmlValue::Map(children) => children.get(name),
            _ => None,
        }
    }

    /// The text content of a leaf element.
    pub fn text(&self) -> Option<&str> {
        match self {
            XmlValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Views this value as a list, wrapping a single node in a one-element
    /// slice. This is the normalization point for schema positions that are
    /// ambiguous between one and many elements.
    pub fn as_list(&self) -> &[XmlValue] {
        match self {
            XmlValue::List(items) => items,
            single => slice::from_ref(single),
        }
    }

    /// The text of the named child, or `""` when the child is missing or not
    /// a leaf.
    pub fn text_of(&self, name: &str) -> &str {
        self.child(name).and_then(XmlValue::text).unwrap_or("")
    }

    /// The named child's text parsed as an integer, coercing anything
    /// unparsable or absent to 0.
    pub fn int_of(&self, name: &str) -> i64 {
        self.text_of(name).trim().parse().unwrap_or(0)
    }
}

// The free-form report error field is forwarded as the JSON rendering of
// whatever subtree the reporter sent, so the tree needs a JSON view.
impl Serialize for XmlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            XmlValue::Text(text) => serializer.serialize_str(text),
            XmlValue::Map(children) => {
                let mut map = serializer.serialize_map(Some(children.len()))?;
                for (name, value) in children {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            XmlValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// One element being built: accumulated children and text.
#[derive(Default)]
struct Node {
    children: BTreeMap<String, XmlValue>,
    text: String,
}

impl Node {
    fn insert(&mut self, name: String, value: XmlValue) {
        match self.children.entry(name) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(value);
            }
            std::collections::btree_map::Entry::Occupied(mut slot) => match slot.get_mut() {
                XmlValue::List(items) => items.push(value),
                existing => {
                    let first = std::mem::replace(existing, XmlValue::List(Vec::with_capacity(2)));
                    if let XmlValue::List(items) = existing {
                        items.push(first);
                        items.push(value);
                    }
                }
            },
        }
    }

    fn into_value(self) -> XmlValue {
        if self.children.is_empty() {
            XmlValue::Text(self.text)
        } else {
            XmlValue::Map(self.children)
        }
    }
}

/// Parses XML text into a generic tree.
///
/// No schema validation happens here; well-formed XML of the wrong shape
/// passes through and is rejected by the extractor.
pub fn parse_xml_tree(xml: &str) -> Result<XmlValue> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // Index 0 is a synthetic document root.
    let mut stack: Vec<(String, Node)> = vec![(String::new(), Node::default())];

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if stack.len() > MAX_DEPTH {
                    return Err(RelayError::XmlStructure("nesting depth limit exceeded"));
                }
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                stack.push((name, Node::default()));
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if let Some((_, parent)) = stack.last_mut() {
                    parent.insert(name, XmlValue::Text(String::new()));
                }
            }
            Event::Text(t) => {
                let text = t.decode().map_err(quick_xml::Error::from)?;
                if let Some((_, node)) = stack.last_mut() {
                    node.text.push_str(&text);
                }
            }
            Event::CData(t) => {
                let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                if let Some((_, node)) = stack.last_mut() {
                    node.text.push_str(&text);
                }
            }
            Event::GeneralRef(e) => {
                // Character and predefined entity references; anything else
                // (external or custom entities) is dropped.
                if let Some((_, node)) = stack.last_mut() {
                    if let Ok(Some(ch)) = e.resolve_char_ref() {
                        node.text.push(ch);
                    } else {
                        match e.as_ref() {
                            b"amp" => node.text.push('&'),
                            b"lt" => node.text.push('<'),
                            b"gt" => node.text.push('>'),
                            b"quot" => node.text.push('"'),
                            b"apos" => node.text.push('\''),
                            _ => {}
                        }
                    }
                }
            }
            Event::End(_) => {
                // quick-xml verifies end-tag names, so the stack cannot
                // underflow past the synthetic root.
                let (name, node) = stack
                    .pop()
                    .ok_or(RelayError::XmlStructure("unbalanced end tag"))?;
                let (_, parent) = stack
                    .last_mut()
                    .ok_or(RelayError::XmlStructure("unbalanced end tag"))?;
                parent.insert(name, node.into_value());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(RelayError::XmlStructure("unexpected end of document"));
    }
    let (_, root) = stack
        .pop()
        .ok_or(RelayError::XmlStructure("unexpected end of document"))?;
    Ok(XmlValue::Map(root.children))
}

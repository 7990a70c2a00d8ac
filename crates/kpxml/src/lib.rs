//! Parse XML into a generic element tree using quick-xml.
//!
//! The tree keeps every element with its attributes, text and children in
//! document order. Children are always looked up as a sequence, so a single
//! `<Group>` and a run of repeated `<Group>` siblings are handled the same way.

mod value;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use tracing::trace;

pub use value::{normalize, XmlValue};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Deepest element nesting accepted by [`parse_document`]. Bounds every
/// recursive walk over the resulting tree.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("xml: {0}")]
    Xml(String),
    #[error("malformed document: {0}")]
    Malformed(String),
}

/// A single XML element with its attributes, text content and child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text.push_str(&text.into());
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Look up an attribute value by its exact name.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Raw character data directly inside this element.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// Iterate over child elements with the given tag name in document order.
    ///
    /// Yields nothing when no such child exists.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |child| child.name == tag)
    }

    pub fn first_child(&self, tag: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == tag)
    }

    pub fn has_children_named(&self, tag: &str) -> bool {
        self.first_child(tag).is_some()
    }

    /// True when the element carries attributes or child elements, i.e. it
    /// cannot be represented by its text alone.
    pub fn is_structured(&self) -> bool {
        !self.attributes.is_empty() || !self.children.is_empty()
    }

    /// Text body of a structured element.
    ///
    /// Whitespace-only text next to child elements is layout, not content,
    /// and yields `None`.
    pub fn body(&self) -> Option<&str> {
        if self.text.trim().is_empty() {
            None
        } else {
            Some(&self.text)
        }
    }

    /// All children named `tag` as a loosely typed value.
    ///
    /// Returns [`XmlValue::Missing`] when the element has no such child and a
    /// [`XmlValue::List`] otherwise, even for a single child.
    pub fn value<'a>(&'a self, tag: &str) -> XmlValue<'a> {
        let items: Vec<XmlValue<'a>> = self
            .children
            .iter()
            .filter(|child| child.name == tag)
            .map(XmlValue::of)
            .collect();
        if items.is_empty() {
            XmlValue::Missing
        } else {
            XmlValue::List(items)
        }
    }

    /// Follow a chain of child tag names, taking the first match at each step.
    pub fn descend(&self, path: &[&str]) -> Option<&XmlElement> {
        path.iter()
            .try_fold(self, |element, tag| element.first_child(tag))
    }
}

/// A parsed XML document with exactly one root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlElement,
}

impl XmlDocument {
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Resolve an absolute path such as `["KeePassFile", "Root"]`.
    ///
    /// The first segment must name the root element.
    pub fn find_path(&self, path: &[&str]) -> Option<&XmlElement> {
        let (first, rest) = path.split_first()?;
        if self.root.name != *first {
            return None;
        }
        self.root.descend(rest)
    }
}

/// Parse raw bytes, rejecting content that is not valid UTF-8.
pub fn parse_bytes(bytes: &[u8]) -> Result<XmlDocument, XmlError> {
    let xml = std::str::from_utf8(bytes)
        .map_err(|err| XmlError::Xml(format!("invalid UTF-8: {err}")))?;
    parse_document(xml)
}

/// Parse an XML document into an element tree.
pub fn parse_document(xml: &str) -> Result<XmlDocument, XmlError> {
    let xml = xml.strip_prefix(BYTE_ORDER_MARK).unwrap_or(xml);
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    reader.check_end_names(true);
    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                ensure_depth(stack.len())?;
                let element = open_element(&e, root.is_some())?;
                stack.push(element);
            }
            Ok(Event::Empty(e)) => {
                ensure_depth(stack.len())?;
                let element = open_element(&e, root.is_some())?;
                close_element(element, &mut stack, &mut root);
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlError::Malformed("unexpected closing tag".into()))?;
                close_element(element, &mut stack, &mut root);
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| XmlError::Xml(err.to_string()))?;
                push_text(&mut stack, &text)?;
            }
            Ok(Event::CData(e)) => {
                let raw = e.into_inner();
                push_text(&mut stack, &String::from_utf8_lossy(&raw))?;
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(XmlError::Xml(err.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::Malformed(format!(
            "unclosed element <{}>",
            open.name
        )));
    }
    let root = root.ok_or_else(|| XmlError::Malformed("document has no root element".into()))?;
    trace!(root = %root.name, children = root.children.len(), "parsed xml document");
    Ok(XmlDocument { root })
}

fn ensure_depth(open: usize) -> Result<(), XmlError> {
    if open >= MAX_DEPTH {
        return Err(XmlError::Malformed(format!(
            "element nesting exceeds {MAX_DEPTH} levels"
        )));
    }
    Ok(())
}

fn open_element(event: &BytesStart<'_>, has_root: bool) -> Result<XmlElement, XmlError> {
    let name = String::from_utf8_lossy(event.name().as_ref()).into_owned();
    if has_root {
        return Err(XmlError::Malformed(format!(
            "element <{name}> after the root element"
        )));
    }
    let mut element = XmlElement::new(name);
    for attr in event.attributes() {
        let attr = attr.map_err(|err| XmlError::Xml(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| XmlError::Xml(err.to_string()))?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn close_element(element: XmlElement, stack: &mut [XmlElement], root: &mut Option<XmlElement>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn push_text(stack: &mut [XmlElement], text: &str) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(current) => {
            current.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(XmlError::Malformed(
            "text content outside the root element".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_nested_elements() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>
            <KeePassFile>
                <Meta><Generator>KeePass</Generator></Meta>
                <Root>
                    <Group><Name>General</Name></Group>
                    <Group><Name>Email</Name></Group>
                </Root>
            </KeePassFile>
        "#;
        let doc = parse_document(xml).expect("parse xml");
        assert_eq!(doc.root().name(), "KeePassFile");
        let root = doc.find_path(&["KeePassFile", "Root"]).expect("root");
        let names: Vec<&str> = root
            .children_named("Group")
            .filter_map(|group| group.first_child("Name"))
            .map(XmlElement::text)
            .collect();
        assert_eq!(names, ["General", "Email"]);
        assert!(doc.find_path(&["Database", "Root"]).is_none());
        assert!(doc.find_path(&["KeePassFile", "Missing"]).is_none());
    }

    #[test]
    fn keeps_attributes_entities_and_cdata() {
        let xml = r#"<Entry>
            <String><Key>Password</Key><Value ProtectInMemory="True">a&amp;b</Value></String>
            <String><Key>Notes</Key><Value><![CDATA[<raw> & text]]></Value></String>
            <Empty/>
        </Entry>"#;
        let doc = parse_document(xml).expect("parse xml");
        let pairs: Vec<&XmlElement> = doc.root().children_named("String").collect();
        assert_eq!(pairs.len(), 2);
        let protected = pairs[0].first_child("Value").expect("value");
        assert_eq!(protected.attribute("ProtectInMemory"), Some("True"));
        assert_eq!(protected.text(), "a&b");
        assert_eq!(protected.body(), Some("a&b"));
        let notes = pairs[1].first_child("Value").expect("value");
        assert_eq!(notes.text(), "<raw> & text");
        let empty = doc.root().first_child("Empty").expect("empty");
        assert_eq!(empty.text(), "");
        assert!(!empty.is_structured());
    }

    #[test]
    fn whitespace_is_preserved_in_leaf_text() {
        let doc = parse_document("<Value>  padded  </Value>").expect("parse xml");
        assert_eq!(doc.root().text(), "  padded  ");
    }

    #[test]
    fn strips_byte_order_mark() {
        let doc = parse_document("\u{feff}<KeePassFile/>").expect("parse xml");
        assert_eq!(doc.root().name(), "KeePassFile");
    }

    #[test]
    fn rejects_unclosed_element() {
        assert!(parse_document("<KeePassFile><Root>").is_err());
        assert!(parse_document("<KeePassFile><Root><Group>").is_err());
    }

    #[test]
    fn rejects_mismatched_end_tag() {
        let err = parse_document("<KeePassFile><Root></Group></KeePassFile>").unwrap_err();
        assert!(matches!(err, XmlError::Xml(_)));
    }

    #[test]
    fn rejects_documents_without_single_root() {
        assert!(matches!(
            parse_document("   ").unwrap_err(),
            XmlError::Malformed(_)
        ));
        assert!(matches!(
            parse_document("<a/><b/>").unwrap_err(),
            XmlError::Malformed(_)
        ));
        assert!(matches!(
            parse_document("not xml at all").unwrap_err(),
            XmlError::Malformed(_)
        ));
    }

    fn nested(depth: usize) -> String {
        format!("{}{}", "<Group>".repeat(depth), "</Group>".repeat(depth))
    }

    #[test]
    fn nesting_up_to_limit_is_accepted() {
        let doc = parse_document(&nested(MAX_DEPTH)).expect("parse at limit");
        let mut depth = 1;
        let mut current = doc.root();
        while let Some(child) = current.first_child("Group") {
            depth += 1;
            current = child;
        }
        assert_eq!(depth, MAX_DEPTH);
        assert!(parse_document(&format!(
            "{}<Leaf/>{}",
            "<Group>".repeat(MAX_DEPTH - 1),
            "</Group>".repeat(MAX_DEPTH - 1)
        ))
        .is_ok());
    }

    #[test]
    fn rejects_excessive_nesting() {
        for xml in [
            nested(MAX_DEPTH + 1),
            nested(10_000),
            format!("{}<Leaf/>{}", "<Group>".repeat(MAX_DEPTH), "</Group>".repeat(MAX_DEPTH)),
        ] {
            let err = parse_document(&xml).unwrap_err();
            assert!(matches!(err, XmlError::Malformed(msg) if msg.contains("nesting")));
        }
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = parse_bytes(&[b'<', b'a', b'>', 0xff, b'<', b'/', b'a', b'>']).unwrap_err();
        assert!(matches!(err, XmlError::Xml(msg) if msg.contains("UTF-8")));
    }

    #[test]
    fn value_lookup_distinguishes_missing_and_lists() {
        let element = XmlElement::new("Group")
            .with_child(XmlElement::new("Name").with_text("Banking"))
            .with_child(XmlElement::new("Tag").with_text("a"))
            .with_child(XmlElement::new("Tag").with_text("b"));
        assert_eq!(element.value("Notes"), XmlValue::Missing);
        assert_eq!(element.value("Name"), XmlValue::List(vec![XmlValue::Text("Banking")]));
        assert_eq!(
            element.value("Tag"),
            XmlValue::List(vec![XmlValue::Text("a"), XmlValue::Text("b")])
        );
        assert_eq!(
            element.descend(&["Name"]).map(XmlElement::text),
            Some("Banking")
        );
    }
}

//! Minimal XML tree used to read worksheet and shared-strings parts.
//!
//! Row composition and value resolution only need three capabilities from a
//! document tree: child elements by tag, attribute lookup, and direct text.
//! [`XmlNode`] captures exactly that, and [`Element`] is the owned tree that
//! implements it. Tests build `Element` trees by hand instead of parsing.

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use std::fs;
use std::path::Path;

/// Read-only view over one element of an XML tree.
pub trait XmlNode: Sized {
    /// Local element name, without any namespace prefix.
    fn name(&self) -> &str;

    /// Child elements in document order.
    fn children(&self) -> &[Self];

    /// Attribute value by qualified name (e.g. `"r"` or `"r:id"`).
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Text directly contained in this element.
    fn text(&self) -> &str;

    /// Child elements with the given local name.
    fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        self.children().iter().filter(move |c| c.name() == tag)
    }

    /// First child element with the given local name.
    fn child(&self, tag: &str) -> Option<&Self> {
        self.children().iter().find(|c| c.name() == tag)
    }

    /// Concatenated text of every descendant named `tag`, in document order.
    fn descendant_text(&self, tag: &str) -> String {
        fn collect<N: XmlNode>(node: &N, tag: &str, out: &mut String) {
            for child in node.children() {
                if child.name() == tag {
                    out.push_str(child.text());
                }
                collect(child, tag, out);
            }
        }

        let mut out = String::new();
        collect(self, tag, &mut out);
        out
    }
}

/// An owned XML element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Append a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Append direct text.
    pub fn with_text(mut self, text: impl AsRef<str>) -> Self {
        self.text.push_str(text.as_ref());
        self
    }

    fn from_start(e: &BytesStart<'_>) -> Self {
        let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
        let attributes = e
            .attributes()
            .flatten()
            .map(|attr| {
                (
                    String::from_utf8_lossy(attr.key.as_ref()).to_string(),
                    String::from_utf8_lossy(&attr.value).to_string(),
                )
            })
            .collect();

        Self {
            name,
            attributes,
            ..Default::default()
        }
    }
}

impl XmlNode for Element {
    fn name(&self) -> &str {
        &self.name
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn text(&self) -> &str {
        &self.text
    }
}

/// Parse an XML document from a string and return its root element.
///
/// Text is kept verbatim; whitespace in `<t xml:space="preserve">` runs
/// is significant.
pub fn parse_str(xml: &str) -> Result<Element> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(Element::from_start(&e)),
            Ok(Event::Empty(e)) => attach(&mut stack, &mut root, Element::from_start(&e)),
            Ok(Event::End(_)) => {
                if let Some(done) = stack.pop() {
                    attach(&mut stack, &mut root, done);
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(top) = stack.last_mut() {
                    let text = e.unescape().map_err(|e| Error::XmlParse(e.to_string()))?;
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::XmlParse("unexpected end of document".to_string()));
    }
    root.ok_or_else(|| Error::XmlParse("document has no root element".to_string()))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Load an XML file from disk into a tree.
pub fn load(path: impl AsRef<Path>) -> Result<Element> {
    let bytes = fs::read(path.as_ref())?;
    let xml = decode_xml_bytes(&bytes)?;
    parse_str(&xml)
}

/// Decode XML bytes as UTF-8 (with or without BOM) or BOM-marked UTF-16.
///
/// UTF-16 content has its declaration rewritten to `UTF-8`, since the
/// returned string is no longer UTF-16.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    let content = match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => return utf8(rest),
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes)?,
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes)?,
        _ => return utf8(bytes),
    };
    Ok(fix_encoding_declaration(content))
}

fn utf8(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| Error::XmlParse(format!("invalid UTF-8: {}", e)))
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String> {
    let units = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::XmlParse(format!("invalid UTF-16: {}", e)))
}

fn fix_encoding_declaration(content: String) -> String {
    if !content.starts_with("<?xml") {
        return content;
    }
    match content.find("?>") {
        Some(end) => {
            let (decl, rest) = content.split_at(end + 2);
            let decl = decl
                .replace("\"UTF-16\"", "\"UTF-8\"")
                .replace("'UTF-16'", "'UTF-8'")
                .replace("\"utf-16\"", "\"UTF-8\"")
                .replace("'utf-16'", "'UTF-8'");
            format!("{}{}", decl, rest)
        }
        None => content,
    }
}

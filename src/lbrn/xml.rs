//! Owned XML element tree read from a LightBurn project with `quick-xml`.
//!
//! LightBurn stores the same field sometimes as an attribute and sometimes as
//! child text, so the converter needs random access to a node's attributes
//! and children rather than a single streaming pass.

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

/// Malformed or unreadable XML input
#[derive(Debug, Error)]
#[error("malformed XML at byte {position}: {message}")]
pub struct XmlError {
    pub position: u64,
    pub message: String,
}

impl XmlError {
    pub(crate) fn new(position: u64, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

/// A single XML element with its namespace prefix stripped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Direct text content, trimmed
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First direct child with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text of the first direct child with the given name
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    /// All descendants in document order, not including `self`
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    pub fn find_descendant(&self, name: &str) -> Option<&Element> {
        self.descendants().find(|e| e.name == name)
    }
}

/// Depth-first pre-order iterator over an element's subtree
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

fn element_from_start(e: &BytesStart, position: u64) -> Result<Element, XmlError> {
    let mut element = Element::new(String::from_utf8_lossy(e.local_name().as_ref()));

    for attr in e.attributes() {
        let attr = attr.map_err(|err| XmlError::new(position, err.to_string()))?;
        let raw_key = attr.key.as_ref();
        if raw_key == b"xmlns" || raw_key.starts_with(b"xmlns:") {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();

        // Attribute-value normalization: literal line breaks and tabs become spaces,
        // character references such as &#10; survive as real newlines.
        let raw = String::from_utf8_lossy(&attr.value).replace(['\r', '\n', '\t'], " ");
        let value = unescape(&raw)
            .map_err(|err| XmlError::new(position, format!("attribute {key}: {err}")))?
            .into_owned();
        element.attributes.push((key, value));
    }

    Ok(element)
}

/// Parse an XML document into its root element
pub fn parse_document(xml: &str) -> Result<Element, XmlError> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut buf = Vec::new();

    fn close(stack: &mut Vec<Element>, root: &mut Option<Element>, mut element: Element) {
        element.text = element.text.trim().to_string();
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None => *root = Some(element),
        }
    }

    fn push_text(
        stack: &mut [Element],
        text: &str,
        position: u64,
    ) -> Result<(), XmlError> {
        match stack.last_mut() {
            Some(current) => {
                current.text.push_str(text);
                Ok(())
            }
            None if text.trim().is_empty() => Ok(()),
            None => Err(XmlError::new(position, "text outside of the root element")),
        }
    }

    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if stack.is_empty() && root.is_some() {
                    return Err(XmlError::new(position, "junk after document element"));
                }
                stack.push(element_from_start(e, position)?);
            }
            Ok(Event::Empty(ref e)) => {
                if stack.is_empty() && root.is_some() {
                    return Err(XmlError::new(position, "junk after document element"));
                }
                let element = element_from_start(e, position)?;
                close(&mut stack, &mut root, element);
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlError::new(position, "unexpected closing tag"))?;
                close(&mut stack, &mut root, element);
            }
            Ok(Event::Text(ref e)) => {
                let raw = String::from_utf8_lossy(e.as_ref());
                let text = unescape(&raw).map_err(|err| XmlError::new(position, err.to_string()))?;
                push_text(&mut stack, &text, position)?;
            }
            Ok(Event::GeneralRef(ref e)) => {
                let reference = format!("&{};", String::from_utf8_lossy(e));
                let text = unescape(&reference)
                    .map_err(|err| XmlError::new(position, err.to_string()))?;
                push_text(&mut stack, &text, position)?;
            }
            Ok(Event::CData(ref e)) => {
                push_text(&mut stack, &String::from_utf8_lossy(e), position)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XmlError::new(position, e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::new(
            reader.buffer_position() as u64,
            format!("unexpected end of document, <{}> is not closed", open.name),
        ));
    }

    root.ok_or_else(|| XmlError::new(0, "no root element"))
}

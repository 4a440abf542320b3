//! XML view of a response body.
//!
//! Bodies are parsed with `quick_xml` into a small owned tree. Each [`XmlNode`] carries its name,
//! the concatenated text and CDATA found directly inside it, its attributes and its child elements.

use crate::errors::HttpError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct XmlNode {
    pub name: String,
    pub text: String,
    pub cdata: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// First direct child called `name`.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Parses `content` and returns the root element.
pub fn parse(content: &str) -> Result<XmlNode, HttpError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event() {
            Err(e) => return Err(xml_error(e)),
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                stack.push(open_node(&e)?);
            }
            Ok(Event::Empty(e)) => {
                let node = open_node(&e)?;
                close_node(node, &mut stack, &mut root)?;
            }
            Ok(Event::End(_)) => {
                // quick_xml checks that end tags match their start tags
                let node = stack
                    .pop()
                    .ok_or_else(|| HttpError::Xml("unexpected closing tag".into()))?;
                close_node(node, &mut stack, &mut root)?;
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(xml_error)?;
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text);
                } else if !text.trim().is_empty() {
                    return Err(HttpError::Xml("text outside of the root element".into()));
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(node) = stack.last_mut() {
                    node.cdata.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            // Declarations, comments, processing instructions, doctype
            Ok(_) => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(HttpError::Xml(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| HttpError::Xml("document has no root element".into()))
}

fn open_node(start: &BytesStart<'_>) -> Result<XmlNode, HttpError> {
    let mut node = XmlNode {
        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        ..Default::default()
    };

    for attr in start.attributes() {
        let attr = attr.map_err(xml_error)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(xml_error)?.into_owned();
        node.attributes.insert(key, value);
    }

    Ok(node)
}

fn close_node(
    node: XmlNode,
    stack: &mut Vec<XmlNode>,
    root: &mut Option<XmlNode>,
) -> Result<(), HttpError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => return Err(HttpError::Xml("more than one root element".into())),
    }
    Ok(())
}

fn xml_error(e: impl std::fmt::Display) -> HttpError {
    HttpError::Xml(e.to_string())
}

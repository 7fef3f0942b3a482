//! Minimal owned XML tree over quick-xml events
//!
//! Template rendering needs to move, clone and drop whole paragraphs and table
//! rows, which is awkward on a flat event stream. Parts are parsed into a tree
//! of [`Node`]s, edited, and written back.
//!
//! Text content is kept in its escaped form. Values inserted into the tree must
//! be escaped with [`quick_xml::escape::escape`] first.

use std::io::Write;

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{OoxmlError, Result};

/// A node in the tree
#[derive(Debug, Clone)]
pub enum Node {
    /// An element with its children
    Element(Element),
    /// Escaped character data
    Text(String),
    /// Declarations, comments, CDATA and processing instructions, kept verbatim
    Other(Event<'static>),
}

impl Node {
    /// Borrow the element, if this node is one
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Whether this node is an element with the given qualified name
    pub fn is_element(&self, name: &str) -> bool {
        self.as_element().is_some_and(|el| el.is(name))
    }
}

/// An element: its start tag (name and attributes) and children
#[derive(Debug, Clone)]
pub struct Element {
    pub start: BytesStart<'static>,
    pub children: Vec<Node>,
}

impl Element {
    /// A new empty element
    pub fn new(name: &str) -> Self {
        Self {
            start: BytesStart::new(name.to_string()),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute
    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.start.push_attribute((key, value));
        self
    }

    /// Builder-style child
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Qualified name comparison, e.g. `el.is("w:p")`
    pub fn is(&self, name: &str) -> bool {
        self.start.name().as_ref() == name.as_bytes()
    }

    /// Raw value of an attribute
    pub fn attribute(&self, key: &str) -> Option<String> {
        self.start
            .attributes()
            .flatten()
            .find(|attr| attr.key.as_ref() == key.as_bytes())
            .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children
            .iter()
            .filter_map(Node::as_element)
            .find(|el| el.is(name))
    }

    /// Concatenated escaped text of all `w:t` descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        if let Node::Element(el) = node {
            if el.is("w:t") {
                for child in &el.children {
                    if let Node::Text(text) = child {
                        out.push_str(text);
                    }
                }
            } else {
                collect_text(&el.children, out);
            }
        }
    }
}

/// Parse an XML part into top-level nodes
pub fn parse(xml: &[u8]) -> Result<Vec<Node>> {
    let mut reader = Reader::from_reader(xml);
    // Whitespace inside w:t is content
    reader.config_mut().trim_text(false);

    let mut roots = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut buf = Vec::new();

    loop {
        let node = match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                stack.push(Element {
                    start: e.into_owned(),
                    children: Vec::new(),
                });
                None
            }
            Event::End(_) => {
                let el = stack.pop().ok_or_else(|| {
                    OoxmlError::InvalidStructure("closing tag without opening tag".to_string())
                })?;
                Some(Node::Element(el))
            }
            Event::Empty(e) => Some(Node::Element(Element {
                start: e.into_owned(),
                children: Vec::new(),
            })),
            Event::Text(t) => Some(Node::Text(String::from_utf8_lossy(&t).into_owned())),
            Event::Eof => break,
            other => Some(Node::Other(other.into_owned())),
        };
        buf.clear();

        if let Some(node) = node {
            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => roots.push(node),
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(OoxmlError::InvalidStructure(format!(
            "unclosed element <{}>",
            String::from_utf8_lossy(open.start.name().as_ref())
        )));
    }

    Ok(roots)
}

/// Serialize nodes back to XML
pub fn write(nodes: &[Node]) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    for node in nodes {
        write_node(&mut writer, node)?;
    }
    Ok(writer.into_inner())
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &Node) -> Result<()> {
    match node {
        Node::Element(el) if el.children.is_empty() => {
            writer.write_event(Event::Empty(el.start.borrow()))?;
        }
        Node::Element(el) => {
            writer.write_event(Event::Start(el.start.borrow()))?;
            for child in &el.children {
                write_node(writer, child)?;
            }
            writer.write_event(Event::End(el.start.to_end()))?;
        }
        Node::Text(text) => {
            writer.write_event(Event::Text(BytesText::from_escaped(text.as_str())))?;
        }
        Node::Other(event) => {
            writer.write_event(event.borrow())?;
        }
    }
    Ok(())
}

//! A minimal element tree built on `quick-xml`.
//!
//! MultiTree documents are small and element-only, so they are read into an
//! owned tree and queried by child element name. Attributes are ignored.

use quick_xml::events::Event;
use quick_xml::Reader;

/// An XML element with its direct text and child elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    /// Concatenated, trimmed text content directly inside this element.
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parse a document and return its document element.
    pub fn parse(xml: &str) -> Result<Self, String> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => stack.push(Self::new(tag_name(e.name().as_ref())?)),
                Ok(Event::Empty(e)) => {
                    let element = Self::new(tag_name(e.name().as_ref())?);
                    attach(&mut stack, &mut root, element);
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| "unexpected closing tag".to_string())?;
                    attach(&mut stack, &mut root, element);
                }
                Ok(Event::Text(t)) => {
                    let text = t.unescape().map_err(|e| e.to_string())?;
                    if let Some(top) = stack.last_mut() {
                        push_text(&mut top.text, &text);
                    }
                }
                Ok(Event::CData(c)) => {
                    let raw = c.into_inner();
                    if let Some(top) = stack.last_mut() {
                        push_text(&mut top.text, String::from_utf8_lossy(&raw).trim());
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(format!(
                        "error at position {}: {e}",
                        reader.buffer_position()
                    ))
                }
                Ok(_) => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(format!("unclosed element <{}>", open.name));
        }
        root.ok_or_else(|| "document has no root element".to_string())
    }

    /// First direct child with the given name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given name, in document order.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Elements reached by following `path` one child level per step,
    /// like ElementTree's `findall("a/b")`.
    #[must_use]
    pub fn find_path(&self, path: &[&str]) -> Vec<&Element> {
        let mut current = vec![self];
        for &step in path {
            current = current
                .into_iter()
                .flat_map(|e| e.children.iter())
                .filter(|c| c.name == step)
                .collect();
        }
        current
    }

    /// Text of the first direct child named `name`, if non-empty.
    #[must_use]
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.find(name)
            .map(|e| e.text.as_str())
            .filter(|t| !t.is_empty())
    }
}

fn tag_name(raw: &[u8]) -> Result<String, String> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|e| format!("tag name is not UTF-8: {e}"))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    }
}

fn push_text(buf: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    if !buf.is_empty() {
        buf.push(' ');
    }
    buf.push_str(text);
}

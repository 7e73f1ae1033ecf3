//! Markup document parsing
//!
//! Parses XML and HTML-like payloads into one owned tree with a shared query
//! interface. Two modes are supported:
//!
//! - [`ParseMode::Strict`]: well-formed XML via `roxmltree`. Used for the
//!   container descriptor and the package document.
//! - [`ParseMode::Lenient`]: HTML5 parsing via `scraper`. Never fails; broken
//!   content documents are recovered the way a browser would.
//!
//! Tag and attribute names are matched by local name, so `opf:item` and
//! `item` are the same element for query purposes.

mod tree;

pub use tree::{Element, Node};

use scraper::{ElementRef, Html};
use thiserror::Error;

/// A document could not be parsed in strict mode
#[derive(Debug, Clone, Error)]
#[error("Malformed markup: {message}")]
pub struct MalformedMarkupError {
    pub message: String,
}

impl From<roxmltree::Error> for MalformedMarkupError {
    fn from(e: roxmltree::Error) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}

/// How a payload should be validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Well-formed XML only
    Strict,
    /// Best-effort HTML parsing
    Lenient,
}

/// Parsed markup document
#[derive(Debug)]
pub struct Document {
    root: Element,
    mode: ParseMode,
}

impl Document {
    /// Parse a payload in the given mode
    pub fn parse(text: &str, mode: ParseMode) -> Result<Self, MalformedMarkupError> {
        let root = match mode {
            ParseMode::Strict => parse_strict(text)?,
            ParseMode::Lenient => parse_lenient(text),
        };
        Ok(Self { root, mode })
    }

    /// Parse well-formed XML
    pub fn parse_xml(text: &str) -> Result<Self, MalformedMarkupError> {
        Self::parse(text, ParseMode::Strict)
    }

    /// Parse HTML-like markup, recovering from errors
    pub fn parse_html(text: &str) -> Self {
        Self {
            root: parse_lenient(text),
            mode: ParseMode::Lenient,
        }
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    /// The document element
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// First element named `tag` in document order
    pub fn find_first(&self, tag: &str) -> Option<&Element> {
        self.root.find_first(tag)
    }

    /// All elements matching a child-combinator path.
    ///
    /// `select(&["manifest", "item"])` behaves like the CSS selector
    /// `manifest > item`: every `item` whose parent is a `manifest`,
    /// wherever that `manifest` sits in the tree.
    pub fn select(&self, path: &[&str]) -> Vec<&Element> {
        let mut out = Vec::new();
        if path.is_empty() {
            return out;
        }
        // (element, depth) pairs, so the ancestor chain can be cut back
        // when the walk moves to a sibling branch
        let mut ancestors: Vec<&str> = Vec::new();
        let mut stack = vec![(&self.root, 0)];
        while let Some((element, depth)) = stack.pop() {
            ancestors.truncate(depth);
            if matches_path(element.name(), &ancestors, path) {
                out.push(element);
            }
            ancestors.push(element.name());
            stack.extend(element.elements().rev().map(|child| (child, depth + 1)));
        }
        out
    }

    /// The `body` element, if the document has one
    pub fn body(&self) -> Option<&Element> {
        self.find_first("body")
    }

    /// Plain text of the document.
    ///
    /// Uses the body when present, the document element otherwise.
    pub fn text_content(&self) -> String {
        match self.body() {
            Some(body) => body.text_content(),
            None => self.root.text_content(),
        }
    }
}

fn matches_path(name: &str, ancestors: &[&str], path: &[&str]) -> bool {
    let Some((last, parents)) = path.split_last() else {
        return false;
    };
    if name != *last || ancestors.len() < parents.len() {
        return false;
    }
    ancestors
        .iter()
        .rev()
        .zip(parents.iter().rev())
        .all(|(ancestor, expected)| ancestor == expected)
}

fn parse_strict(text: &str) -> Result<Element, MalformedMarkupError> {
    let mut options = roxmltree::ParsingOptions::default();
    options.allow_dtd = true;
    let doc = roxmltree::Document::parse_with_options(text, options)?;
    Ok(convert_xml(doc.root_element()))
}

fn convert_xml(root: roxmltree::Node<'_, '_>) -> Element {
    let mut open: Vec<Element> = Vec::new();
    for edge in root.traverse() {
        match edge {
            roxmltree::Edge::Open(node) if node.is_element() => {
                let mut element = Element::new(node.tag_name().name());
                for attr in node.attributes() {
                    element.push_attribute(attr.name(), attr.value());
                }
                open.push(element);
            }
            roxmltree::Edge::Open(node) if node.is_text() => {
                if let (Some(parent), Some(text)) = (open.last_mut(), node.text()) {
                    parent.push_child(Node::Text(text.to_string()));
                }
            }
            roxmltree::Edge::Close(node) if node.is_element() => {
                if let Some(element) = close_element(&mut open) {
                    return element;
                }
            }
            _ => {}
        }
    }
    open.into_iter().next().unwrap_or_else(|| Element::new(root.tag_name().name()))
}

/// Pop the innermost open element into its parent. Returns the element once
/// the outermost one closes.
fn close_element(open: &mut Vec<Element>) -> Option<Element> {
    let element = open.pop()?;
    match open.last_mut() {
        Some(parent) => {
            parent.push_child(Node::Element(element));
            None
        }
        None => Some(element),
    }
}

fn parse_lenient(text: &str) -> Element {
    let html = Html::parse_document(text);
    convert_html(html.root_element())
}

fn convert_html(root: ElementRef<'_>) -> Element {
    // Open elements paired with the node they were built from
    let mut open = vec![(html_element(root.value()), *root)];
    let mut cursor = root.first_child();

    loop {
        match cursor {
            Some(node) => {
                if let Some(value) = node.value().as_element() {
                    open.push((html_element(value), node));
                    cursor = node.first_child();
                    continue;
                }
                if let (Some((parent, _)), Some(text)) = (open.last_mut(), node.value().as_text()) {
                    let text: &str = text;
                    parent.push_child(Node::Text(text.to_string()));
                }
                cursor = node.next_sibling();
            }
            None => {
                let Some((element, source)) = open.pop() else {
                    return Element::new(root.value().name());
                };
                match open.last_mut() {
                    Some((parent, _)) => {
                        parent.push_child(Node::Element(element));
                        cursor = source.next_sibling();
                    }
                    None => return element,
                }
            }
        }
    }
}

fn html_element(value: &scraper::node::Element) -> Element {
    let mut element = Element::new(value.name());
    for (name, attr_value) in value.attrs() {
        element.push_attribute(local_name(name), attr_value);
    }
    element
}

// html5ever keeps prefixed attributes such as `xml:lang` as one name
fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, local)| local).unwrap_or(name)
}

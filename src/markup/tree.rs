//! Owned markup tree shared by both parse modes
//!
//! Content documents can nest arbitrarily deep, so every walk over the tree
//! uses an explicit stack and dropping a tree never recurses.

/// Tree node
#[derive(Debug)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// Element with its local name, attributes and children
#[derive(Debug)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn push_attribute(&mut self, name: &str, value: &str) {
        self.attributes.push((name.to_string(), value.to_string()));
    }

    pub(crate) fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value by local name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements, skipping text
    pub fn elements(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First element named `tag`, this one included, in document order
    pub fn find_first(&self, tag: &str) -> Option<&Element> {
        let mut stack = vec![self];
        while let Some(element) = stack.pop() {
            if element.name == tag {
                return Some(element);
            }
            stack.extend(element.elements().rev());
        }
        None
    }

    /// Concatenation of every descendant text node
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        let mut stack: Vec<&Node> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            match node {
                Node::Text(chunk) => text.push_str(chunk),
                Node::Element(element) => stack.extend(element.children.iter().rev()),
            }
        }
        text
    }
}

impl Drop for Element {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let Node::Element(mut element) = node {
                pending.append(&mut element.children);
            }
        }
    }
}

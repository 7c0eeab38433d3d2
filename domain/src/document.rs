//! Schema-less model of a domain description.
//!
//! Elements are kept as ordered `(name, node)` pairs so that anything this
//! service does not understand survives a parse/serialize cycle. Attributes are
//! stored under `-name` keys and character data under `#text`, mirroring the
//! usual XML-to-map conventions.
//!
//! Adjacent siblings sharing a name are grouped into a `List`. A repeat that
//! follows a differently named sibling starts a new entry, so sibling order is
//! kept exactly and lookups by name see the first entry.

use crate::error::DomainError;

/// Key prefix for attribute entries.
pub const ATTR_PREFIX: &str = "-";

/// Key of the character data entry of an element.
pub const TEXT_KEY: &str = "#text";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Scalar content: an attribute value or a text-only element.
    Text(String),
    /// Repeated sibling elements sharing one name, in document order.
    List(Vec<Node>),
    Element(Element),
}

impl Node {
    pub fn empty() -> Self {
        Node::Element(Element::new())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    entries: Vec<(String, Node)>,
}

impl Element {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(key, node)| (key.as_str(), node))
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, node)| node)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, node)| node)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.get(&format!("{ATTR_PREFIX}{name}"))
            .and_then(Node::as_text)
    }

    pub fn text(&self) -> Option<&str> {
        self.get(TEXT_KEY).and_then(Node::as_text)
    }

    /// Replaces the entry stored under `key` in place, or appends a new one.
    /// Returns the previous node if there was one.
    pub fn insert(&mut self, key: impl Into<String>, node: Node) -> Option<Node> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(existing) => Some(std::mem::replace(existing, node)),
            None => {
                self.entries.push((key, node));
                None
            }
        }
    }

    /// Adds a child the way a parser sees siblings: when the last entry has
    /// the same name it turns into a `List`, otherwise a new entry is added.
    pub fn append(&mut self, key: impl Into<String>, node: Node) {
        let key = key.into();
        match self.entries.last_mut() {
            Some((last, Node::List(items))) if *last == key => items.push(node),
            Some((last, existing)) if *last == key => {
                let first = std::mem::replace(existing, Node::List(Vec::with_capacity(2)));
                if let Node::List(items) = existing {
                    items.push(first);
                    items.push(node);
                }
            }
            _ => self.entries.push((key, node)),
        }
    }

    /// Every child named `key` in document order, with lists flattened.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .flat_map(|(_, node)| match node {
                Node::List(items) => items.iter().collect::<Vec<_>>(),
                other => vec![other],
            })
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        match self.get_mut(TEXT_KEY) {
            Some(Node::Text(existing)) => existing.push_str(text),
            _ => {
                self.insert(TEXT_KEY, Node::Text(text.to_string()));
            }
        }
    }

    fn get_or_insert_with(&mut self, key: &str, f: impl FnOnce() -> Node) -> &mut Node {
        let idx = match self.entries.iter().position(|(k, _)| k == key) {
            Some(idx) => idx,
            None => {
                self.entries.push((key.to_string(), f()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    /// Collapses a text-only element into a scalar.
    pub(crate) fn into_node(self) -> Node {
        if let [(key, Node::Text(text))] = self.entries.as_slice() {
            if key == TEXT_KEY {
                return Node::Text(text.clone());
            }
        }
        Node::Element(self)
    }
}

/// A parsed domain description: the root element name and its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    name: String,
    body: Node,
}

impl Document {
    pub fn new(name: impl Into<String>, body: Node) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &Node {
        &self.body
    }

    /// Looks up a dotted path such as `domain.devices.emulator`. The first
    /// segment names the root element. Lists are entered through their first
    /// element.
    pub fn value_for_path(&self, path: &str) -> Option<&Node> {
        let segments = self.split_path(path).ok()?;
        let mut node = &self.body;
        for segment in segments {
            node = container(node)?.get(segment)?;
        }
        Some(node)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.value_for_path(path).is_some()
    }

    /// Creates every missing segment of `path` as an empty element. Existing
    /// content is left alone, so calling this twice is the same as calling it
    /// once.
    pub fn ensure_path(&mut self, path: &str) -> Result<(), DomainError> {
        self.walk_mut(path).map(|_| ())
    }

    /// Stores `value` at `path`, creating the parent segments first.
    pub fn set_value_for_path(&mut self, value: Node, path: &str) -> Result<(), DomainError> {
        let Some((parent, last)) = path.rsplit_once('.') else {
            self.split_path(path)?;
            self.body = value;
            return Ok(());
        };
        if last.is_empty() {
            return Err(DomainError::InvalidPath(path.to_string()));
        }

        let parent = self.walk_mut(parent)?;
        container_mut(parent, path, last)?.insert(last, value);
        Ok(())
    }

    fn walk_mut(&mut self, path: &str) -> Result<&mut Node, DomainError> {
        let segments = self.split_path(path)?;
        let mut node = &mut self.body;
        for segment in segments {
            node = container_mut(node, path, segment)?.get_or_insert_with(segment, Node::empty);
        }
        Ok(node)
    }

    /// Validates `path` against the root name and returns the segments below it.
    fn split_path<'p>(&self, path: &'p str) -> Result<Vec<&'p str>, DomainError> {
        let mut segments = path.split('.');
        if segments.next() != Some(self.name.as_str()) {
            return Err(DomainError::InvalidPath(path.to_string()));
        }
        let segments: Vec<&str> = segments.collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(DomainError::InvalidPath(path.to_string()));
        }
        Ok(segments)
    }
}

fn container(node: &Node) -> Option<&Element> {
    match node {
        Node::Element(element) => Some(element),
        Node::List(items) => items.iter().find_map(Node::as_element),
        Node::Text(_) => None,
    }
}

fn container_mut<'a>(
    node: &'a mut Node,
    path: &str,
    segment: &str,
) -> Result<&'a mut Element, DomainError> {
    if matches!(node, Node::Text(text) if text.is_empty()) {
        *node = Node::empty();
    }

    let element = match node {
        Node::Element(element) => Some(element),
        Node::List(items) => items.iter_mut().find_map(|item| match item {
            Node::Element(element) => Some(element),
            _ => None,
        }),
        Node::Text(_) => None,
    };

    element.ok_or_else(|| DomainError::PathConflict {
        path: path.to_string(),
        segment: segment.to_string(),
    })
}

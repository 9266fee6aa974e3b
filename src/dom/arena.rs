//! Arena-allocated HTML tree.
//!
//! Pages are parsed into a flat vector of nodes linked by indices. The
//! decorator and the menu renderer rewrite subtrees in place; detached nodes
//! simply stay in the arena unreferenced.

use std::collections::HashMap;

use html5ever::{LocalName, Namespace, QualName, local_name, ns};

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel for "no node".
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Payload of a node.
#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Cached `id` attribute.
        id: Option<String>,
        /// Cached `class` attribute, split on whitespace.
        classes: Vec<String>,
    },
    Text(String),
    Comment(String),
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

/// Element attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

impl Attribute {
    /// Attribute in the null namespace, which is where HTML attributes live.
    pub fn new(local: &str, value: impl Into<String>) -> Self {
        Self {
            name: QualName::new(None, ns!(), LocalName::from(local)),
            value: value.into(),
        }
    }
}

#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

/// An HTML document held in an arena.
pub struct Dom {
    nodes: Vec<Node>,
    document: NodeId,
    id_map: HashMap<String, NodeId>,
}

impl Dom {
    /// Create an empty tree holding only the document node.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: NodeId::NONE,
            id_map: HashMap::new(),
        };
        dom.document = dom.alloc(Node::new(NodeData::Document));
        dom
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn document(&self) -> NodeId {
        self.document
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Create a detached element. `id` and `class` are cached for matching.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        let mut id = None;
        let mut classes = Vec::new();

        for attr in &attrs {
            match attr.name.local.as_ref() {
                "id" => id = Some(attr.value.clone()),
                "class" => {
                    classes = attr
                        .value
                        .split_whitespace()
                        .map(str::to_string)
                        .collect()
                }
                _ => {}
            }
        }

        let node_id = self.alloc(Node::new(NodeData::Element {
            name,
            attrs,
            id: id.clone(),
            classes,
        }));

        if let Some(id) = id {
            self.id_map.entry(id).or_insert(node_id);
        }

        node_id
    }

    /// Create a detached HTML element by tag name.
    pub fn create_html_element(&mut self, tag: &str, attrs: Vec<Attribute>) -> NodeId {
        self.create_element(QualName::new(None, ns!(html), LocalName::from(tag)), attrs)
    }

    /// Create a detached `<a href=...>` holding a single text node.
    pub fn create_link(&mut self, href: &str, text: &str) -> NodeId {
        let anchor = self.create_element(
            QualName::new(None, ns!(html), local_name!("a")),
            vec![Attribute::new("href", href)],
        );
        let text = self.create_text(text.to_string());
        self.append(anchor, text);
        anchor
    }

    pub fn create_text(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text)))
    }

    pub fn create_comment(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text)))
    }

    pub fn create_doctype(&mut self, name: String, public_id: String, system_id: String) -> NodeId {
        self.alloc(Node::new(NodeData::Doctype {
            name,
            public_id,
            system_id,
        }))
    }

    /// Append `child` as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let last_child = self.get(parent).map_or(NodeId::NONE, |n| n.last_child);

        if let Some(node) = self.get_mut(child) {
            node.parent = parent;
            node.prev_sibling = last_child;
            node.next_sibling = NodeId::NONE;
        }

        if let Some(last) = self.get_mut(last_child) {
            last.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert `child` as the first child of `parent`.
    pub fn prepend(&mut self, parent: NodeId, child: NodeId) {
        let first = self.get(parent).map_or(NodeId::NONE, |n| n.first_child);
        if first.is_none() {
            self.append(parent, child);
        } else {
            self.insert_before(first, child);
        }
    }

    /// Insert `new_node` immediately before `sibling`.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        let (parent, prev) = match self.get(sibling) {
            Some(n) => (n.parent, n.prev_sibling),
            None => return,
        };

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Append text to `parent`, merging with a trailing text node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last_child = self.get(parent).map_or(NodeId::NONE, |n| n.last_child);

        if let Some(last) = self.get_mut(last_child)
            && let NodeData::Text(existing) = &mut last.data
        {
            existing.push_str(text);
            return;
        }

        let node = self.create_text(text.to_string());
        self.append(parent, node);
    }

    /// Unlink `target` from its parent and siblings.
    pub fn detach(&mut self, target: NodeId) {
        let (parent, prev, next) = match self.get(target) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(target) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Detach every child of `parent`, returning them in order.
    pub fn detach_children(&mut self, parent: NodeId) -> Vec<NodeId> {
        let children: Vec<_> = self.children(parent).collect();
        for &child in &children {
            if let Some(c) = self.get_mut(child) {
                c.parent = NodeId::NONE;
                c.prev_sibling = NodeId::NONE;
                c.next_sibling = NodeId::NONE;
            }
        }
        if let Some(p) = self.get_mut(parent) {
            p.first_child = NodeId::NONE;
            p.last_child = NodeId::NONE;
        }
        children
    }

    /// Look up an element by its `id` attribute.
    pub fn get_by_id(&self, id: &str) -> Option<NodeId> {
        self.id_map.get(id).copied()
    }

    /// Number of allocated nodes, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn children(&self, parent: NodeId) -> Children<'_> {
        Children {
            dom: self,
            current: self.get(parent).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// All elements reachable from the document, in document order.
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.document];
        while let Some(id) = stack.pop() {
            if self.is_element(id) {
                out.push(id);
            }
            let mut children: Vec<_> = self.children(id).collect();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// First element with the given tag name, depth first.
    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|&id| self.element_name(id).is_some_and(|n| n.as_ref() == tag))
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Children<'a> {
    dom: &'a Dom,
    current: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self.dom.get(id).map_or(NodeId::NONE, |n| n.next_sibling);
        Some(id)
    }
}

/// Element and text accessors.
impl Dom {
    pub fn element_name(&self, id: NodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    pub fn element_namespace(&self, id: NodeId) -> Option<&Namespace> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.ns),
            _ => None,
        })
    }

    pub fn get_attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { id, .. } => id.as_deref(),
            _ => None,
        })
    }

    pub fn element_classes(&self, id: NodeId) -> &[String] {
        self.get(id)
            .and_then(|n| match &n.data {
                NodeData::Element { classes, .. } => Some(classes.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element_classes(id).iter().any(|c| c == class)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Element { .. }))
    }

    /// Whether any child of `id` is an element.
    pub fn has_element_children(&self, id: NodeId) -> bool {
        self.children(id).any(|c| self.is_element(c))
    }

    /// Contents of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        for child in self.children(id) {
            match self.get(child).map(|n| &n.data) {
                Some(NodeData::Text(s)) => out.push_str(s),
                Some(NodeData::Element { .. }) => self.collect_text(child, out),
                _ => {}
            }
        }
    }
}

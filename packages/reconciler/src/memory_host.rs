//! In-memory host tree.
//!
//! A small arena-backed tree that implements [`Host`]. It records every
//! mutation it receives and renders markup, which makes it the binding of
//! choice for tests and for running the reconciler outside a real UI.

use crate::host::Host;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use twig_common::{HostError, HostResult};
use twig_vdom::{AttrValue, Event, Listener, VNode};

/// Handle to a node of a [`MemoryHost`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One host operation, as recorded in the journal
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    CreateElement { id: NodeId, tag: String },
    CreateText { id: NodeId, content: String },
    SetText { id: NodeId, content: String },
    SetAttribute { id: NodeId, name: String, value: AttrValue },
    RemoveAttribute { id: NodeId, name: String },
    AddListener { id: NodeId, event: String },
    RemoveListener { id: NodeId, event: String },
    Insert { parent: NodeId, child: NodeId, before: Option<NodeId> },
    Detach { id: NodeId },
}

impl Mutation {
    pub fn is_attribute_write(&self) -> bool {
        matches!(self, Mutation::SetAttribute { .. } | Mutation::RemoveAttribute { .. })
    }
}

#[derive(Debug)]
enum NodeData {
    Element {
        tag: String,
        attributes: BTreeMap<String, AttrValue>,
        listeners: Vec<(String, Listener)>,
    },
    Text(String),
}

#[derive(Debug)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    reflected: Option<VNode<NodeId>>,
}

/// Arena-backed host tree with a built-in `<body>` root
#[derive(Debug)]
pub struct MemoryHost {
    nodes: RefCell<Vec<Slot>>,
    journal: RefCell<Vec<Mutation>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        let body = Slot {
            data: NodeData::Element {
                tag: "body".to_string(),
                attributes: BTreeMap::new(),
                listeners: Vec::new(),
            },
            parent: None,
            children: Vec::new(),
            reflected: None,
        };
        Self {
            nodes: RefCell::new(vec![body]),
            journal: RefCell::new(Vec::new()),
        }
    }

    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    pub fn body(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes ever created, including the body
    pub fn node_count(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn journal(&self) -> Vec<Mutation> {
        self.journal.borrow().clone()
    }

    pub fn clear_journal(&self) {
        self.journal.borrow_mut().clear();
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .borrow()
            .get(id.0)
            .map(|slot| slot.children.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.borrow().get(id.0).and_then(|slot| slot.parent)
    }

    pub fn tag_name(&self, id: NodeId) -> Option<String> {
        match &self.nodes.borrow().get(id.0)?.data {
            NodeData::Element { tag, .. } => Some(tag.clone()),
            NodeData::Text(_) => None,
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<AttrValue> {
        match &self.nodes.borrow().get(id.0)?.data {
            NodeData::Element { attributes, .. } => attributes.get(name).cloned(),
            NodeData::Text(_) => None,
        }
    }

    pub fn listener_count(&self, id: NodeId) -> usize {
        match self.nodes.borrow().get(id.0).map(|slot| &slot.data) {
            Some(NodeData::Element { listeners, .. }) => listeners.len(),
            _ => 0,
        }
    }

    /// Concatenated text of the subtree
    pub fn text_content(&self, id: NodeId) -> String {
        let nodes = self.nodes.borrow();
        let mut out = String::new();
        collect_text(&nodes, id, &mut out);
        out
    }

    /// Markup of the node itself
    pub fn to_html(&self, id: NodeId) -> String {
        let nodes = self.nodes.borrow();
        let mut out = String::new();
        render(&nodes, id, &mut out);
        out
    }

    /// Markup of the node's children
    pub fn inner_html(&self, id: NodeId) -> String {
        let nodes = self.nodes.borrow();
        let mut out = String::new();
        if let Some(slot) = nodes.get(id.0) {
            for child in &slot.children {
                render(&nodes, *child, &mut out);
            }
        }
        out
    }

    /// Deliver an event to the listeners registered on `id` for `event`
    ///
    /// Returns how many listeners ran.
    pub fn dispatch(&self, id: NodeId, event: &str, detail: serde_json::Value) -> HostResult<usize> {
        // Collected first so a listener may mutate the tree
        let listeners: Vec<Listener> = {
            let nodes = self.nodes.borrow();
            match &slot(&nodes, id)?.data {
                NodeData::Element { listeners, .. } => listeners
                    .iter()
                    .filter(|(name, _)| name == event)
                    .map(|(_, listener)| listener.clone())
                    .collect(),
                NodeData::Text(_) => return Err(HostError::NotAnElement(id.to_string())),
            }
        };
        let event = Event::new(event, detail);
        for listener in &listeners {
            listener.call(&event);
        }
        Ok(listeners.len())
    }

    fn record(&self, mutation: Mutation) {
        self.journal.borrow_mut().push(mutation);
    }

    fn alloc(&self, data: NodeData) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(Slot {
            data,
            parent: None,
            children: Vec::new(),
            reflected: None,
        });
        NodeId(nodes.len() - 1)
    }

    fn with_element<T>(
        &self,
        id: NodeId,
        f: impl FnOnce(&mut BTreeMap<String, AttrValue>, &mut Vec<(String, Listener)>) -> T,
    ) -> HostResult<T> {
        let mut nodes = self.nodes.borrow_mut();
        match &mut slot_mut(&mut nodes, id)?.data {
            NodeData::Element {
                attributes,
                listeners,
                ..
            } => Ok(f(attributes, listeners)),
            NodeData::Text(_) => Err(HostError::NotAnElement(id.to_string())),
        }
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

fn slot(nodes: &[Slot], id: NodeId) -> HostResult<&Slot> {
    nodes
        .get(id.0)
        .ok_or_else(|| HostError::UnknownNode(id.to_string()))
}

fn slot_mut(nodes: &mut [Slot], id: NodeId) -> HostResult<&mut Slot> {
    nodes
        .get_mut(id.0)
        .ok_or_else(|| HostError::UnknownNode(id.to_string()))
}

fn unlink(nodes: &mut [Slot], id: NodeId) {
    if let Some(parent) = nodes[id.0].parent.take() {
        nodes[parent.0].children.retain(|child| *child != id);
    }
}

/// Take the side tags of a whole subtree
fn release_tags(nodes: &mut [Slot], id: NodeId) -> Vec<VNode<NodeId>> {
    let mut released = Vec::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        let slot = &mut nodes[current.0];
        released.extend(slot.reflected.take());
        stack.extend(slot.children.iter().copied());
    }
    released
}

fn collect_text(nodes: &[Slot], id: NodeId, out: &mut String) {
    let Some(slot) = nodes.get(id.0) else {
        return;
    };
    match &slot.data {
        NodeData::Text(content) => out.push_str(content),
        NodeData::Element { .. } => {
            for child in &slot.children {
                collect_text(nodes, *child, out);
            }
        }
    }
}

fn render(nodes: &[Slot], id: NodeId, out: &mut String) {
    let Some(slot) = nodes.get(id.0) else {
        return;
    };
    match &slot.data {
        NodeData::Text(content) => out.push_str(&escape(content, false)),
        NodeData::Element {
            tag, attributes, ..
        } => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in attributes {
                match value.to_markup() {
                    Some(markup) if markup.is_empty() => {
                        out.push(' ');
                        out.push_str(name);
                    }
                    Some(markup) => {
                        out.push_str(&format!(" {}=\"{}\"", name, escape(&markup, true)));
                    }
                    None => {}
                }
            }
            out.push('>');
            for child in &slot.children {
                render(nodes, *child, out);
            }
            out.push_str(&format!("</{}>", tag));
        }
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

impl Host for MemoryHost {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        self.body()
    }

    fn create_element(&self, tag: &str) -> HostResult<NodeId> {
        let id = self.alloc(NodeData::Element {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            listeners: Vec::new(),
        });
        self.record(Mutation::CreateElement {
            id,
            tag: tag.to_string(),
        });
        Ok(id)
    }

    fn create_text(&self, content: &str) -> HostResult<NodeId> {
        let id = self.alloc(NodeData::Text(content.to_string()));
        self.record(Mutation::CreateText {
            id,
            content: content.to_string(),
        });
        Ok(id)
    }

    fn set_text(&self, node: &NodeId, content: &str) -> HostResult<()> {
        {
            let mut nodes = self.nodes.borrow_mut();
            match &mut slot_mut(&mut nodes, *node)?.data {
                NodeData::Text(text) => *text = content.to_string(),
                NodeData::Element { .. } => return Err(HostError::NotAText(node.to_string())),
            }
        }
        self.record(Mutation::SetText {
            id: *node,
            content: content.to_string(),
        });
        Ok(())
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &AttrValue) -> HostResult<()> {
        self.with_element(*node, |attributes, _| {
            attributes.insert(name.to_string(), value.clone());
        })?;
        self.record(Mutation::SetAttribute {
            id: *node,
            name: name.to_string(),
            value: value.clone(),
        });
        Ok(())
    }

    fn remove_attribute(&self, node: &NodeId, name: &str) -> HostResult<()> {
        self.with_element(*node, |attributes, _| {
            attributes.remove(name);
        })?;
        self.record(Mutation::RemoveAttribute {
            id: *node,
            name: name.to_string(),
        });
        Ok(())
    }

    fn add_listener(&self, node: &NodeId, event: &str, listener: &Listener) -> HostResult<()> {
        self.with_element(*node, |_, listeners| {
            listeners.push((event.to_string(), listener.clone()));
        })?;
        self.record(Mutation::AddListener {
            id: *node,
            event: event.to_string(),
        });
        Ok(())
    }

    fn remove_listener(&self, node: &NodeId, event: &str, listener: &Listener) -> HostResult<()> {
        self.with_element(*node, |_, listeners| {
            listeners.retain(|(name, registered)| !(name == event && registered == listener));
        })?;
        self.record(Mutation::RemoveListener {
            id: *node,
            event: event.to_string(),
        });
        Ok(())
    }

    fn insert_before(
        &self,
        parent: &NodeId,
        child: &NodeId,
        before: Option<&NodeId>,
    ) -> HostResult<()> {
        {
            let mut nodes = self.nodes.borrow_mut();
            slot(&nodes, *child)?;
            if let NodeData::Text(_) = slot(&nodes, *parent)?.data {
                return Err(HostError::NotAnElement(parent.to_string()));
            }
            if let Some(before) = before {
                if slot(&nodes, *before)?.parent != Some(*parent) {
                    return Err(HostError::NotAChild {
                        child: before.to_string(),
                        parent: parent.to_string(),
                    });
                }
            }
            let mut ancestor = Some(*parent);
            while let Some(current) = ancestor {
                if current == *child {
                    return Err(HostError::Cycle {
                        child: child.to_string(),
                        parent: parent.to_string(),
                    });
                }
                ancestor = nodes[current.0].parent;
            }

            unlink(&mut nodes, *child);
            let siblings = &mut nodes[parent.0].children;
            let index = before
                .and_then(|before| siblings.iter().position(|sibling| sibling == before))
                .unwrap_or(siblings.len());
            siblings.insert(index, *child);
            nodes[child.0].parent = Some(*parent);
        }
        self.record(Mutation::Insert {
            parent: *parent,
            child: *child,
            before: before.copied(),
        });
        Ok(())
    }

    /// Detached subtrees are never reinserted by the reconciler, so their
    /// side tags are dropped with them. The tags hold hook closures, which
    /// may in turn hold the host.
    fn detach(&self, node: &NodeId) -> HostResult<()> {
        let released = {
            let mut nodes = self.nodes.borrow_mut();
            slot(&nodes, *node)?;
            unlink(&mut nodes, *node);
            release_tags(&mut nodes, *node)
        };
        drop(released);
        self.record(Mutation::Detach { id: *node });
        Ok(())
    }

    fn parent_node(&self, node: &NodeId) -> HostResult<Option<NodeId>> {
        Ok(slot(&self.nodes.borrow(), *node)?.parent)
    }

    fn child_nodes(&self, node: &NodeId) -> HostResult<Vec<NodeId>> {
        Ok(slot(&self.nodes.borrow(), *node)?.children.clone())
    }

    fn set_reflected(&self, node: &NodeId, vnode: Option<VNode<NodeId>>) -> HostResult<()> {
        // Swapped out so the previous VNode drops after the borrow ends
        let previous = {
            let mut nodes = self.nodes.borrow_mut();
            std::mem::replace(&mut slot_mut(&mut nodes, *node)?.reflected, vnode)
        };
        drop(previous);
        Ok(())
    }

    fn reflected(&self, node: &NodeId) -> HostResult<Option<VNode<NodeId>>> {
        Ok(slot(&self.nodes.borrow(), *node)?.reflected.clone())
    }
}

use crate::props::{AttrValue, Props};
use std::fmt;
use std::rc::Rc;

/// Element payload of a [`VNode`]
pub struct Element<N> {
    pub tag: String,
    pub props: Props<N>,
    pub children: Vec<VNode<N>>,
    /// Copied from the `key` prop when the node is built
    pub key: Option<String>,
}

impl<N> Clone for Element<N> {
    fn clone(&self) -> Self {
        Self {
            tag: self.tag.clone(),
            props: self.props.clone(),
            children: self.children.clone(),
            key: self.key.clone(),
        }
    }
}

/// Virtual DOM node
///
/// Immutable once built. `N` is the host handle type hooks receive.
pub enum VNode<N> {
    /// Element with tag, props and children
    Element(Rc<Element<N>>),

    /// Text leaf
    Text(Rc<str>),
}

impl<N> VNode<N> {
    pub fn element(tag: impl Into<String>) -> Self {
        VNode::Element(Rc::new(Element {
            tag: tag.into(),
            props: Props::new(),
            children: Vec::new(),
            key: None,
        }))
    }

    pub fn text(content: impl Into<String>) -> Self {
        let content: String = content.into();
        VNode::Text(Rc::from(content))
    }

    pub fn with_attr(self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.map_element(|el| {
            let props = std::mem::take(&mut el.props);
            el.props = props.attr(name, value);
            el.key = el.props.key();
        })
    }

    pub fn with_props(self, props: Props<N>) -> Self {
        self.map_element(|el| {
            el.key = props.key();
            el.props = props;
        })
    }

    pub fn with_child(self, child: VNode<N>) -> Self {
        self.map_element(|el| el.children.push(child))
    }

    pub fn with_children(self, new_children: Vec<VNode<N>>) -> Self {
        self.map_element(|el| el.children.extend(new_children))
    }

    pub fn with_key(self, key: impl Into<AttrValue>) -> Self {
        self.with_attr("key", key)
    }

    fn map_element(self, f: impl FnOnce(&mut Element<N>)) -> Self {
        match self {
            VNode::Element(mut el) => {
                f(Rc::make_mut(&mut el));
                VNode::Element(el)
            }
            text => text,
        }
    }

    pub fn as_element(&self) -> Option<&Element<N>> {
        match self {
            VNode::Element(el) => Some(&**el),
            VNode::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            VNode::Text(content) => Some(&**content),
            VNode::Element(_) => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, VNode::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, VNode::Text(_))
    }

    pub fn tag(&self) -> Option<&str> {
        self.as_element().map(|el| el.tag.as_str())
    }

    pub fn key(&self) -> Option<&str> {
        self.as_element().and_then(|el| el.key.as_deref())
    }

    pub fn props(&self) -> Option<&Props<N>> {
        self.as_element().map(|el| &el.props)
    }

    /// Children of an element; text leaves have none
    pub fn children(&self) -> &[VNode<N>] {
        match self {
            VNode::Element(el) => &el.children,
            VNode::Text(_) => &[],
        }
    }

    /// Whether a host node built for `self` can be patched into `other`
    ///
    /// Both must be text, or both elements with the same tag. Keys are not
    /// part of the identity class.
    pub fn same_identity(&self, other: &VNode<N>) -> bool {
        match (self, other) {
            (VNode::Text(_), VNode::Text(_)) => true,
            (VNode::Element(a), VNode::Element(b)) => a.tag == b.tag,
            _ => false,
        }
    }

    /// Whether both values share the same allocation
    pub fn ptr_eq(&self, other: &VNode<N>) -> bool {
        match (self, other) {
            (VNode::Element(a), VNode::Element(b)) => Rc::ptr_eq(a, b),
            (VNode::Text(a), VNode::Text(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Number of nodes in the subtree, including `self`
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(VNode::count).sum::<usize>()
    }
}

impl<N> Clone for VNode<N> {
    fn clone(&self) -> Self {
        match self {
            VNode::Element(el) => VNode::Element(Rc::clone(el)),
            VNode::Text(content) => VNode::Text(Rc::clone(content)),
        }
    }
}

impl<N> fmt::Debug for VNode<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VNode::Element(el) => {
                let mut s = f.debug_struct("Element");
                s.field("tag", &el.tag).field("props", &el.props);
                if let Some(key) = &el.key {
                    s.field("key", key);
                }
                s.field("children", &el.children).finish()
            }
            VNode::Text(content) => f.debug_tuple("Text").field(content).finish(),
        }
    }
}

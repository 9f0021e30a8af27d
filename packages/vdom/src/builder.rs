//! VTree builder: turns a tag, a props bag and loosely typed children into a
//! canonical [`VNode`].

use crate::props::{format_number, Props};
use crate::vdom::{Element, VNode};
use std::rc::Rc;

/// A child argument before normalization
///
/// Anything that can appear in a child list converts into a `Child`:
/// nodes, strings, numbers, booleans, options and (nested) vectors.
pub enum Child<N> {
    Node(VNode<N>),
    Text(String),
    /// Dropped during normalization (`None`, booleans, `()`)
    Empty,
    /// Flattened into the parent's child list
    List(Vec<Child<N>>),
}

impl<N> From<VNode<N>> for Child<N> {
    fn from(node: VNode<N>) -> Self {
        Child::Node(node)
    }
}

impl<N> From<&str> for Child<N> {
    fn from(s: &str) -> Self {
        Child::Text(s.to_string())
    }
}

impl<N> From<String> for Child<N> {
    fn from(s: String) -> Self {
        Child::Text(s)
    }
}

impl<N> From<&String> for Child<N> {
    fn from(s: &String) -> Self {
        Child::Text(s.clone())
    }
}

impl<N> From<bool> for Child<N> {
    fn from(_: bool) -> Self {
        Child::Empty
    }
}

impl<N> From<()> for Child<N> {
    fn from(_: ()) -> Self {
        Child::Empty
    }
}

impl<N> From<f64> for Child<N> {
    fn from(n: f64) -> Self {
        Child::Text(format_number(n))
    }
}

impl<N> From<f32> for Child<N> {
    fn from(n: f32) -> Self {
        Child::Text(format_number(f64::from(n)))
    }
}

macro_rules! impl_integer_child {
    ($($ty:ty),*) => {
        $(
            impl<N> From<$ty> for Child<N> {
                fn from(n: $ty) -> Self {
                    Child::Text(n.to_string())
                }
            }
        )*
    };
}

impl_integer_child!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<N, T: Into<Child<N>>> From<Option<T>> for Child<N> {
    fn from(child: Option<T>) -> Self {
        child.map_or(Child::Empty, Into::into)
    }
}

impl<N, T: Into<Child<N>>> From<Vec<T>> for Child<N> {
    fn from(children: Vec<T>) -> Self {
        Child::List(children.into_iter().map(Into::into).collect())
    }
}

/// Normalize a child argument into a flat list of nodes
pub fn normalize_children<N>(children: impl Into<Child<N>>) -> Vec<VNode<N>> {
    let mut nodes = Vec::new();
    let mut stack = vec![children.into()];
    while let Some(child) = stack.pop() {
        match child {
            Child::Node(node) => nodes.push(node),
            Child::Text(content) => nodes.push(VNode::text(content)),
            Child::Empty => {}
            // Reversed so the stack pops them in document order
            Child::List(items) => stack.extend(items.into_iter().rev()),
        }
    }
    nodes
}

/// Build an element node
///
/// ```rust,ignore
/// let list = h("ul", Props::new(), vec![
///     h("li", Props::new(), "one"),
///     h("li", Props::new().with_key(2), 2),
/// ]);
/// ```
pub fn h<N>(tag: impl Into<String>, props: Props<N>, children: impl Into<Child<N>>) -> VNode<N> {
    let key = props.key();
    VNode::Element(Rc::new(Element {
        tag: tag.into(),
        props,
        children: normalize_children(children),
        key,
    }))
}

/// Build a text leaf
pub fn text<N>(content: impl Into<String>) -> VNode<N> {
    VNode::text(content)
}

/// Build a node through a component function
///
/// The children are normalized before the component sees them.
pub fn component<N, F>(render: F, props: Props<N>, children: impl Into<Child<N>>) -> VNode<N>
where
    F: FnOnce(Props<N>, Vec<VNode<N>>) -> VNode<N>,
{
    render(props, normalize_children(children))
}

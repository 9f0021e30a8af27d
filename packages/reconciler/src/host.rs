use std::fmt::Debug;
use twig_common::HostResult;
use twig_vdom::{AttrValue, Listener, VNode};

/// Capabilities the reconciler needs from a live host tree
///
/// Every method takes `&self`: a host is shared behind an `Rc` because a
/// deferred removal reaches back into it after the reconciliation pass has
/// returned. Implementations use interior mutability.
pub trait Host {
    /// Handle to a node in the host tree
    type Node: Clone + PartialEq + Debug + 'static;

    /// Default parent for a first mount when the caller supplies none
    fn root(&self) -> Self::Node;

    fn create_element(&self, tag: &str) -> HostResult<Self::Node>;

    fn create_text(&self, content: &str) -> HostResult<Self::Node>;

    fn set_text(&self, node: &Self::Node, content: &str) -> HostResult<()>;

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &AttrValue) -> HostResult<()>;

    fn remove_attribute(&self, node: &Self::Node, name: &str) -> HostResult<()>;

    fn add_listener(&self, node: &Self::Node, event: &str, listener: &Listener) -> HostResult<()>;

    fn remove_listener(&self, node: &Self::Node, event: &str, listener: &Listener) -> HostResult<()>;

    /// Insert `child` under `parent` right before `before`, or last when
    /// `before` is `None`. A child that already has a parent is moved.
    fn insert_before(
        &self,
        parent: &Self::Node,
        child: &Self::Node,
        before: Option<&Self::Node>,
    ) -> HostResult<()>;

    /// Remove `node` from its parent. Detaching an orphan is a no-op.
    fn detach(&self, node: &Self::Node) -> HostResult<()>;

    fn parent_node(&self, node: &Self::Node) -> HostResult<Option<Self::Node>>;

    fn child_nodes(&self, node: &Self::Node) -> HostResult<Vec<Self::Node>>;

    /// Record which VNode `node` currently reflects (`None` clears it)
    fn set_reflected(&self, node: &Self::Node, vnode: Option<VNode<Self::Node>>) -> HostResult<()>;

    fn reflected(&self, node: &Self::Node) -> HostResult<Option<VNode<Self::Node>>>;
}

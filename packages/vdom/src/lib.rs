//! # Twig VDOM
//!
//! Immutable virtual nodes and the builder that produces them.
//!
//! A [`VNode`] describes one element or text leaf. It is generic over the
//! host handle type `N` so that lifecycle hooks can receive the live node
//! they are attached to. Nodes are reference counted: cloning a tree is
//! cheap and never copies children.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use twig_vdom::{h, Props};
//!
//! let view = h(
//!     "ul",
//!     Props::new().attr("class", "todos"),
//!     vec![h("li", Props::new(), "one"), h("li", Props::new(), "two")],
//! );
//! ```

pub mod builder;
pub mod hooks;
pub mod props;
pub mod vdom;

pub use builder::{component, h, text, Child};
pub use builder::h as build;
pub use hooks::{Hook, HookKind, HookResult, Removal};
pub use props::{format_number, AttrValue, Event, Listener, Prop, PropClass, Props};
pub use vdom::{Element, VNode};

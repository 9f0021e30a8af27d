//! # Twig Reconciler
//!
//! Keeps a live host tree in sync with successive virtual trees.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ twig-vdom: h(tag, props, children) → VNode  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ reconciler: (old, new, node) → node         │
//! │  - reuse nodes whose tag is unchanged       │
//! │  - diff attributes and listeners            │
//! │  - match children by key, then position     │
//! │  - queue hooks in post-order, then flush    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ Host: create / set / insert / detach        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//!
//! - `oncreate(node)` and `onupdate(node, old_props)` run after the whole
//!   pass has been applied to the host, every child before its parent.
//! - A node leaving the tree first fires `ondestroy` on itself and every
//!   descendant. It is then detached immediately, or, if it declares
//!   `onremove(node, removal)`, once the hook calls `removal.complete()`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use twig_reconciler::{memory_host::MemoryHost, Reconciler};
//! use twig_vdom::{h, Props};
//!
//! let host = MemoryHost::shared();
//! let reconciler = Reconciler::new(Rc::clone(&host));
//!
//! let view = |label: &str| h("button", Props::new().attr("class", "primary"), label);
//! let node = reconciler.reconcile(None, &view("Save"), None, None)?;
//! reconciler.reconcile(None, &view("Saved"), Some(node), None)?;
//!
//! assert_eq!(host.inner_html(host.body()), r#"<button class="primary">Saved</button>"#);
//! ```

mod children;
pub mod error;
pub mod host;
pub mod memory_host;
pub mod options;
pub mod reconciler;
mod removal;

pub use error::{ReconcileError, ReconcileResult};
pub use host::Host;
pub use options::ReconcileOptions;
pub use reconciler::{reconcile, PassStats, Reconciler};

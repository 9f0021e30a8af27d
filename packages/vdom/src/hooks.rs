use crate::props::Props;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use twig_common::HostResult;

/// Result returned by every lifecycle hook
pub type HookResult = anyhow::Result<()>;

/// The four lifecycle events a VNode can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookKind {
    Create,
    Update,
    Remove,
    Destroy,
}

impl HookKind {
    pub const ALL: [HookKind; 4] = [
        HookKind::Create,
        HookKind::Update,
        HookKind::Remove,
        HookKind::Destroy,
    ];

    /// Prop name the hook is registered under
    pub fn prop_name(self) -> &'static str {
        match self {
            HookKind::Create => "oncreate",
            HookKind::Update => "onupdate",
            HookKind::Remove => "onremove",
            HookKind::Destroy => "ondestroy",
        }
    }

    pub fn from_prop_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.prop_name() == name)
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prop_name())
    }
}

/// A lifecycle callback
///
/// - `Create(node)` fires once the node and its whole subtree are built and attached.
/// - `Update(node, old_props)` fires after the node and its children are patched.
/// - `Remove(node, removal)` fires when the node leaves the tree; the node stays
///   attached until [`Removal::complete`] is called.
/// - `Destroy(node)` fires for every node of a subtree that is being discarded.
pub enum Hook<N> {
    Create(Rc<dyn Fn(&N) -> HookResult>),
    Update(Rc<dyn Fn(&N, &Props<N>) -> HookResult>),
    Remove(Rc<dyn Fn(&N, Removal) -> HookResult>),
    Destroy(Rc<dyn Fn(&N) -> HookResult>),
}

impl<N> Hook<N> {
    pub fn kind(&self) -> HookKind {
        match self {
            Hook::Create(_) => HookKind::Create,
            Hook::Update(_) => HookKind::Update,
            Hook::Remove(_) => HookKind::Remove,
            Hook::Destroy(_) => HookKind::Destroy,
        }
    }

    fn addr(&self) -> *const () {
        match self {
            Hook::Create(f) => Rc::as_ptr(f) as *const (),
            Hook::Update(f) => Rc::as_ptr(f) as *const (),
            Hook::Remove(f) => Rc::as_ptr(f) as *const (),
            Hook::Destroy(f) => Rc::as_ptr(f) as *const (),
        }
    }
}

impl<N> Clone for Hook<N> {
    fn clone(&self) -> Self {
        match self {
            Hook::Create(f) => Hook::Create(Rc::clone(f)),
            Hook::Update(f) => Hook::Update(Rc::clone(f)),
            Hook::Remove(f) => Hook::Remove(Rc::clone(f)),
            Hook::Destroy(f) => Hook::Destroy(Rc::clone(f)),
        }
    }
}

/// Hooks are equal only when they are the same closure allocation
impl<N> PartialEq for Hook<N> {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.addr() == other.addr()
    }
}

impl<N> fmt::Debug for Hook<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hook({}, {:p})", self.kind(), self.addr())
    }
}

type DetachFn = Box<dyn FnOnce() -> HostResult<()>>;

/// One-shot completion token handed to `onremove`
///
/// The node it was issued for stays in the host tree until `complete` is
/// called. Only the first call detaches; every later call (including calls
/// on clones of the token) is a no-op returning `Ok(false)`.
#[derive(Clone)]
pub struct Removal {
    pending: Rc<RefCell<Option<DetachFn>>>,
}

impl Removal {
    pub fn new(detach: impl FnOnce() -> HostResult<()> + 'static) -> Self {
        Self {
            pending: Rc::new(RefCell::new(Some(Box::new(detach)))),
        }
    }

    /// Detach the node. Returns `Ok(true)` if this call performed the detach.
    ///
    /// The token is consumed even if the host reports an error.
    pub fn complete(&self) -> HostResult<bool> {
        let detach = self.pending.borrow_mut().take();
        match detach {
            Some(detach) => {
                detach()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.pending.borrow().is_none()
    }
}

impl fmt::Debug for Removal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Removal")
            .field("complete", &self.is_complete())
            .finish()
    }
}

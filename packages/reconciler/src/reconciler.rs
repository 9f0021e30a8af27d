use crate::error::{ReconcileError, ReconcileResult};
use crate::host::Host;
use crate::options::ReconcileOptions;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::{debug, instrument, warn};
use twig_vdom::{Hook, HookKind, HookResult, Prop, PropClass, Props, VNode};

/// Counters collected over one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassStats {
    pub created: usize,
    pub updated: usize,
    pub moved: usize,
    pub removed: usize,
    pub attribute_writes: usize,
    pub listener_writes: usize,
    pub hooks_fired: usize,
}

/// Synchronizes a host tree with successive virtual trees
///
/// ```rust,ignore
/// let host = MemoryHost::shared();
/// let reconciler = Reconciler::new(Rc::clone(&host));
///
/// let root = reconciler.reconcile(None, &view(1), None, None)?;
/// reconciler.reconcile(None, &view(2), Some(root), None)?;
/// ```
pub struct Reconciler<H: Host> {
    host: Rc<H>,
    options: ReconcileOptions,
}

impl<H: Host + 'static> Reconciler<H> {
    pub fn new(host: Rc<H>) -> Self {
        Self::with_options(host, ReconcileOptions::default())
    }

    pub fn with_options(host: Rc<H>, options: ReconcileOptions) -> Self {
        Self { host, options }
    }

    pub fn host(&self) -> &Rc<H> {
        &self.host
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Patch `node` (or mount a new node) so it reflects `new`
    ///
    /// - `node` absent: a fresh node is built and appended to `parent`, or to
    ///   the host root when `parent` is absent too.
    /// - `old` absent but `node` present: the previous VNode is read from the
    ///   node's side tag.
    /// - identity class changed (or nothing to diff against): a fresh node
    ///   takes the old node's place and the old one goes through the removal
    ///   protocol.
    ///
    /// Lifecycle hooks run after the structural walk, children before parents.
    /// The first failing hook aborts the pass. Applied mutations stay, and
    /// removals that did not finish are picked up again by the next pass.
    pub fn reconcile(
        &self,
        old: Option<&VNode<H::Node>>,
        new: &VNode<H::Node>,
        node: Option<H::Node>,
        parent: Option<H::Node>,
    ) -> ReconcileResult<H::Node> {
        self.reconcile_with_stats(old, new, node, parent)
            .map(|(node, _)| node)
    }

    #[instrument(level = "debug", skip_all, fields(root = new.tag().unwrap_or("#text")))]
    pub fn reconcile_with_stats(
        &self,
        old: Option<&VNode<H::Node>>,
        new: &VNode<H::Node>,
        node: Option<H::Node>,
        parent: Option<H::Node>,
    ) -> ReconcileResult<(H::Node, PassStats)> {
        let mut pass = Pass::new(&self.host, &self.options);
        let root = pass.patch_root(old, new, node, parent)?;
        pass.flush()?;

        debug!(
            created = pass.stats.created,
            updated = pass.stats.updated,
            moved = pass.stats.moved,
            removed = pass.stats.removed,
            hooks = pass.stats.hooks_fired,
            "Reconciliation pass complete"
        );
        Ok((root, pass.stats))
    }
}

/// Reconcile with default options
pub fn reconcile<H: Host + 'static>(
    host: &Rc<H>,
    old: Option<&VNode<H::Node>>,
    new: &VNode<H::Node>,
    node: Option<H::Node>,
    parent: Option<H::Node>,
) -> ReconcileResult<H::Node> {
    Reconciler::new(Rc::clone(host)).reconcile(old, new, node, parent)
}

/// Work deferred until the structural walk is done, in post-order
pub(crate) enum Effect<N> {
    Create {
        hook: Rc<dyn Fn(&N) -> HookResult>,
        node: N,
        tag: String,
    },
    Update {
        hook: Rc<dyn Fn(&N, &Props<N>) -> HookResult>,
        node: N,
        old_props: Props<N>,
        tag: String,
    },
    /// `vnode` is `None` for host nodes that never reflected a VNode
    Remove { node: N, vnode: Option<VNode<N>> },
}

/// State of a single reconciliation pass
pub(crate) struct Pass<'a, H: Host> {
    pub(crate) host: &'a Rc<H>,
    pub(crate) options: &'a ReconcileOptions,
    pub(crate) effects: Vec<Effect<H::Node>>,
    pub(crate) stats: PassStats,
}

impl<'a, H: Host + 'static> Pass<'a, H> {
    pub(crate) fn new(host: &'a Rc<H>, options: &'a ReconcileOptions) -> Self {
        Self {
            host,
            options,
            effects: Vec::new(),
            stats: PassStats::default(),
        }
    }

    fn patch_root(
        &mut self,
        old: Option<&VNode<H::Node>>,
        new: &VNode<H::Node>,
        node: Option<H::Node>,
        parent: Option<H::Node>,
    ) -> ReconcileResult<H::Node> {
        let Some(node) = node else {
            let parent = parent.unwrap_or_else(|| self.host.root());
            let created = self.create(new)?;
            self.insert(&parent, &created, None)?;
            return Ok(created);
        };

        let old = match old {
            Some(old) => Some(old.clone()),
            None => self.host.reflected(&node)?,
        };
        match old {
            Some(old) if old.same_identity(new) => {
                self.update(&node, &old, new)?;
                Ok(node)
            }
            old => self.replace(&node, old, new, parent),
        }
    }

    /// Build `new` in place of `node` and queue `node` for removal
    fn replace(
        &mut self,
        node: &H::Node,
        old: Option<VNode<H::Node>>,
        new: &VNode<H::Node>,
        parent: Option<H::Node>,
    ) -> ReconcileResult<H::Node> {
        let created = self.create(new)?;
        match self.host.parent_node(node)? {
            Some(current) => self.insert(&current, &created, Some(node))?,
            None => {
                if let Some(parent) = parent {
                    self.insert(&parent, &created, None)?;
                }
            }
        }
        self.schedule_removal(node, old)?;
        Ok(created)
    }

    /// Build a detached host subtree for `vnode`
    pub(crate) fn create(&mut self, vnode: &VNode<H::Node>) -> ReconcileResult<H::Node> {
        let node = match vnode {
            VNode::Text(content) => {
                let node = self.host.create_text(content)?;
                self.trace("create_text", &node);
                node
            }
            VNode::Element(el) => {
                let node = self.host.create_element(&el.tag)?;
                self.trace("create_element", &node);
                for (name, prop) in el.props.iter() {
                    self.apply_prop(&node, name, None, prop)?;
                }
                for child in &el.children {
                    let child_node = self.create(child)?;
                    self.insert(&node, &child_node, None)?;
                }
                if let Some(Hook::Create(hook)) = el.props.hook(HookKind::Create) {
                    self.effects.push(Effect::Create {
                        hook: Rc::clone(hook),
                        node: node.clone(),
                        tag: el.tag.clone(),
                    });
                }
                node
            }
        };
        self.host.set_reflected(&node, Some(vnode.clone()))?;
        self.stats.created += 1;
        Ok(node)
    }

    /// Patch `node` from `old` to `new`; both must share an identity class
    pub(crate) fn update(
        &mut self,
        node: &H::Node,
        old: &VNode<H::Node>,
        new: &VNode<H::Node>,
    ) -> ReconcileResult<()> {
        match (old, new) {
            (VNode::Text(before), VNode::Text(after)) => {
                if before != after {
                    self.host.set_text(node, after)?;
                    self.trace("set_text", node);
                }
            }
            (VNode::Element(before), VNode::Element(after)) => {
                self.patch_props(node, &before.props, &after.props)?;
                self.patch_children(node, after)?;
                if let Some(Hook::Update(hook)) = after.props.hook(HookKind::Update) {
                    self.effects.push(Effect::Update {
                        hook: Rc::clone(hook),
                        node: node.clone(),
                        old_props: before.props.clone(),
                        tag: after.tag.clone(),
                    });
                }
            }
            // callers check same_identity first
            _ => {}
        }
        self.host.set_reflected(node, Some(new.clone()))?;
        self.stats.updated += 1;
        Ok(())
    }

    fn patch_props(
        &mut self,
        node: &H::Node,
        old: &Props<H::Node>,
        new: &Props<H::Node>,
    ) -> ReconcileResult<()> {
        for (name, prop) in old.iter() {
            if !new.contains_key(name) {
                self.remove_prop(node, name, prop)?;
            }
        }
        for (name, prop) in new.iter() {
            let previous = old.get(name);
            if previous != Some(prop) {
                self.apply_prop(node, name, previous, prop)?;
            }
        }
        Ok(())
    }

    fn apply_prop(
        &mut self,
        node: &H::Node,
        name: &str,
        previous: Option<&Prop<H::Node>>,
        prop: &Prop<H::Node>,
    ) -> ReconcileResult<()> {
        match (PropClass::classify(name), prop) {
            (PropClass::Hook(kind), Prop::Hook(hook)) if hook.kind() == kind => {}
            (PropClass::Listener(event), Prop::Listener(listener)) => {
                if let Some(Prop::Listener(previous)) = previous {
                    self.host.remove_listener(node, event, previous)?;
                }
                self.host.add_listener(node, event, listener)?;
                self.stats.listener_writes += 1;
                self.trace("add_listener", node);
            }
            (PropClass::Attribute, Prop::Value(value)) => {
                self.host.set_attribute(node, name, value)?;
                self.stats.attribute_writes += 1;
                self.trace("set_attribute", node);
            }
            (class, _) => {
                // Unbind whatever the previous value registered
                if let Some(previous) = previous {
                    self.remove_prop(node, name, previous)?;
                }
                warn!(prop = name, ?class, "Ignoring prop whose value does not fit its name");
            }
        }
        Ok(())
    }

    fn remove_prop(
        &mut self,
        node: &H::Node,
        name: &str,
        prop: &Prop<H::Node>,
    ) -> ReconcileResult<()> {
        match (PropClass::classify(name), prop) {
            (PropClass::Listener(event), Prop::Listener(listener)) => {
                self.host.remove_listener(node, event, listener)?;
                self.stats.listener_writes += 1;
                self.trace("remove_listener", node);
            }
            (PropClass::Attribute, Prop::Value(_)) => {
                self.host.remove_attribute(node, name)?;
                self.stats.attribute_writes += 1;
                self.trace("remove_attribute", node);
            }
            _ => {}
        }
        Ok(())
    }

    pub(crate) fn insert(
        &mut self,
        parent: &H::Node,
        child: &H::Node,
        before: Option<&H::Node>,
    ) -> ReconcileResult<()> {
        self.host.insert_before(parent, child, before)?;
        if self.options.trace_mutations {
            debug!(?parent, ?child, ?before, "insert_before");
        }
        Ok(())
    }

    pub(crate) fn trace(&self, op: &'static str, node: &H::Node) {
        if self.options.trace_mutations {
            debug!(op, ?node, "Host mutation");
        }
    }

    /// Run queued hooks and removals in the order they were queued
    ///
    /// On the first failure the removals still queued are handed back to the
    /// host tree (see `abandon`) so a later pass can finish them.
    fn flush(&mut self) -> ReconcileResult<()> {
        let mut effects = std::mem::take(&mut self.effects).into_iter();
        while let Some(effect) = effects.next() {
            if let Err(err) = self.run(effect) {
                self.abandon(effects);
                return Err(err);
            }
        }
        Ok(())
    }

    fn run(&mut self, effect: Effect<H::Node>) -> ReconcileResult<()> {
        match effect {
            Effect::Create { hook, node, tag } => {
                self.stats.hooks_fired += 1;
                hook(&node).map_err(|e| ReconcileError::hook(HookKind::Create, &tag, e))
            }
            Effect::Update {
                hook,
                node,
                old_props,
                tag,
            } => {
                self.stats.hooks_fired += 1;
                hook(&node, &old_props).map_err(|e| ReconcileError::hook(HookKind::Update, &tag, e))
            }
            Effect::Remove { node, vnode } => self.remove(&node, vnode.as_ref()),
        }
    }
}

//! Removal protocol: destroy cascade, then an immediate or gated detach.

use crate::error::{ReconcileError, ReconcileResult};
use crate::host::Host;
use crate::reconciler::{Effect, Pass};
use std::rc::Rc;
use tracing::warn;
use twig_vdom::{Hook, HookKind, Removal, VNode};

impl<'a, H: Host + 'static> Pass<'a, H> {
    /// Take `node` out of child matching and queue its removal
    ///
    /// Clearing the side tag right away means a node that is still waiting on
    /// `onremove` is never matched or removed a second time.
    pub(crate) fn schedule_removal(
        &mut self,
        node: &H::Node,
        vnode: Option<VNode<H::Node>>,
    ) -> ReconcileResult<()> {
        self.host.set_reflected(node, None)?;
        self.effects.push(Effect::Remove {
            node: node.clone(),
            vnode,
        });
        Ok(())
    }

    pub(crate) fn remove(
        &mut self,
        node: &H::Node,
        vnode: Option<&VNode<H::Node>>,
    ) -> ReconcileResult<()> {
        self.stats.removed += 1;
        let Some(vnode) = vnode else {
            self.host.detach(node)?;
            self.trace("detach", node);
            return Ok(());
        };

        if let Err(err) = self.destroy(node, vnode) {
            self.reinstate(node, vnode);
            return Err(err);
        }

        let detach = {
            let host = Rc::clone(self.host);
            let node = node.clone();
            move || host.detach(&node)
        };
        match vnode.props().and_then(|props| props.hook(HookKind::Remove)) {
            Some(Hook::Remove(hook)) => {
                self.stats.hooks_fired += 1;
                let removal = Removal::new(detach);
                if let Err(e) = hook(node, removal.clone()) {
                    if !removal.is_complete() {
                        self.reinstate(node, vnode);
                    }
                    return Err(ReconcileError::hook(
                        HookKind::Remove,
                        vnode.tag().unwrap_or_default(),
                        e,
                    ));
                }
            }
            _ => {
                detach()?;
                self.trace("detach", node);
            }
        }
        Ok(())
    }

    /// Fire `ondestroy` over the subtree, parents before children
    fn destroy(&mut self, node: &H::Node, vnode: &VNode<H::Node>) -> ReconcileResult<()> {
        let VNode::Element(el) = vnode else {
            return Ok(());
        };
        if let Some(Hook::Destroy(hook)) = el.props.hook(HookKind::Destroy) {
            self.stats.hooks_fired += 1;
            hook(node).map_err(|e| ReconcileError::hook(HookKind::Destroy, &el.tag, e))?;
        }
        for child in self.host.child_nodes(node)? {
            if let Some(child_vnode) = self.host.reflected(&child)? {
                self.destroy(&child, &child_vnode)?;
            }
        }
        Ok(())
    }

    /// Settle the effects left behind by a failed flush
    ///
    /// Hooks that did not run are dropped. A removal that did not run gets
    /// its side tag back, so the next pass matches the node again and either
    /// keeps it or removes it from scratch. Untagged nodes have no hooks to
    /// wait for and are detached on the spot.
    pub(crate) fn abandon(&mut self, effects: impl Iterator<Item = Effect<H::Node>>) {
        for effect in effects {
            match effect {
                Effect::Remove {
                    node,
                    vnode: Some(vnode),
                } => self.reinstate(&node, &vnode),
                Effect::Remove { node, vnode: None } => {
                    if let Err(err) = self.host.detach(&node) {
                        warn!(?node, %err, "Failed to detach node after an aborted pass");
                    }
                }
                Effect::Create { .. } | Effect::Update { .. } => {}
            }
        }
    }

    /// Hand an unfinished removal back to child matching
    fn reinstate(&self, node: &H::Node, vnode: &VNode<H::Node>) {
        if let Err(err) = self.host.set_reflected(node, Some(vnode.clone())) {
            warn!(?node, %err, "Failed to restore side tag of an unfinished removal");
        }
    }
}

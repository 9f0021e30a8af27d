//! Child list reconciliation.
//!
//! Existing children are discovered through the host: every host child that
//! still reflects a VNode takes part in matching, anything else (foreign
//! nodes, nodes waiting for `onremove` to complete) is left where it is.

use crate::error::ReconcileResult;
use crate::host::Host;
use crate::reconciler::Pass;
use std::collections::HashMap;
use twig_vdom::{Element, VNode};

/// How one new child relates to the existing children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChildMatch {
    /// Patch the existing child at this index in place
    Reuse(usize),
    /// The existing child at this index is consumed but belongs to another
    /// identity class, so a fresh node replaces it
    Replace(usize),
    Create,
}

/// Pair each new child with at most one existing child
///
/// With `keyed` set, a keyed child only ever matches the existing child with
/// the same key, and unkeyed children pair up in order among themselves.
/// Without it every child pairs by position. Returns one match per new child
/// plus the indices of existing children nobody claimed.
pub(crate) fn match_children<N>(
    existing: &[VNode<N>],
    new: &[VNode<N>],
    keyed: bool,
) -> (Vec<ChildMatch>, Vec<usize>) {
    let mut consumed = vec![false; existing.len()];
    let mut by_key: HashMap<&str, usize> = HashMap::new();
    if keyed {
        for (index, vnode) in existing.iter().enumerate() {
            if let Some(key) = vnode.key() {
                by_key.entry(key).or_insert(index);
            }
        }
    }

    let mut cursor = 0;
    let mut matches = Vec::with_capacity(new.len());
    for child in new {
        let candidate = match child.key().filter(|_| keyed) {
            Some(key) => by_key.get(key).copied().filter(|&index| !consumed[index]),
            None => {
                while cursor < existing.len()
                    && (consumed[cursor] || (keyed && existing[cursor].key().is_some()))
                {
                    cursor += 1;
                }
                (cursor < existing.len()).then_some(cursor)
            }
        };

        matches.push(match candidate {
            Some(index) => {
                consumed[index] = true;
                if existing[index].same_identity(child) {
                    ChildMatch::Reuse(index)
                } else {
                    ChildMatch::Replace(index)
                }
            }
            None => ChildMatch::Create,
        });
    }

    let leftover = consumed
        .iter()
        .enumerate()
        .filter(|(_, consumed)| !**consumed)
        .map(|(index, _)| index)
        .collect();
    (matches, leftover)
}

impl<'a, H: Host + 'static> Pass<'a, H> {
    pub(crate) fn patch_children(
        &mut self,
        parent: &H::Node,
        element: &Element<H::Node>,
    ) -> ReconcileResult<()> {
        let mut existing_nodes = Vec::new();
        let mut existing = Vec::new();
        for child in self.host.child_nodes(parent)? {
            if let Some(vnode) = self.host.reflected(&child)? {
                existing_nodes.push(child);
                existing.push(vnode);
            }
        }

        let (matches, leftover) =
            match_children(&existing, &element.children, self.options.keyed_children);

        let mut placed = Vec::with_capacity(matches.len());
        for (child, matched) in element.children.iter().zip(matches) {
            let node = match matched {
                ChildMatch::Reuse(index) => {
                    self.update(&existing_nodes[index], &existing[index], child)?;
                    existing_nodes[index].clone()
                }
                ChildMatch::Replace(index) => {
                    let node = self.create(child)?;
                    self.schedule_removal(&existing_nodes[index], Some(existing[index].clone()))?;
                    node
                }
                ChildMatch::Create => self.create(child)?,
            };
            placed.push(node);
        }

        for index in leftover {
            self.schedule_removal(&existing_nodes[index], Some(existing[index].clone()))?;
        }

        self.place(parent, &placed)
    }

    /// Order `placed` under `parent`, moving reused nodes only when needed
    fn place(&mut self, parent: &H::Node, placed: &[H::Node]) -> ReconcileResult<()> {
        // Reused children in their current order
        let mut live = Vec::new();
        for child in self.host.child_nodes(parent)? {
            if self.host.reflected(&child)?.is_some() {
                live.push(child);
            }
        }

        let mut next = 0;
        for node in placed {
            if live.get(next) == Some(node) {
                next += 1;
                continue;
            }
            if let Some(offset) = live[next..].iter().position(|candidate| candidate == node) {
                live.remove(next + offset);
                self.stats.moved += 1;
            }
            self.insert(parent, node, live.get(next))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twig_vdom::{h, Props};

    type Node = VNode<u32>;

    fn li(key: Option<&str>) -> Node {
        let props = match key {
            Some(key) => Props::new().with_key(key),
            None => Props::new(),
        };
        h("li", props, ())
    }

    #[test]
    fn test_positional_matching() {
        let old = vec![li(None), li(None)];
        let new = vec![li(None)];
        let (matches, leftover) = match_children(&old, &new, true);
        assert_eq!(matches, vec![ChildMatch::Reuse(0)]);
        assert_eq!(leftover, vec![1]);
    }

    #[test]
    fn test_keyed_reorder_reuses_every_node() {
        let old = vec![li(Some("a")), li(Some("b")), li(Some("c"))];
        let new = vec![li(Some("c")), li(Some("a")), li(Some("b"))];
        let (matches, leftover) = match_children(&old, &new, true);
        assert_eq!(
            matches,
            vec![ChildMatch::Reuse(2), ChildMatch::Reuse(0), ChildMatch::Reuse(1)]
        );
        assert!(leftover.is_empty());
    }

    #[test]
    fn test_unkeyed_children_skip_keyed_ones() {
        let old = vec![li(Some("a")), li(None), li(Some("b"))];
        let new = vec![li(None), li(Some("b")), li(Some("z"))];
        let (matches, leftover) = match_children(&old, &new, true);
        assert_eq!(
            matches,
            vec![ChildMatch::Reuse(1), ChildMatch::Reuse(2), ChildMatch::Create]
        );
        assert_eq!(leftover, vec![0]);
    }

    #[test]
    fn test_duplicate_keys_match_once() {
        let old = vec![li(Some("a"))];
        let new = vec![li(Some("a")), li(Some("a"))];
        let (matches, _) = match_children(&old, &new, true);
        assert_eq!(matches, vec![ChildMatch::Reuse(0), ChildMatch::Create]);
    }

    #[test]
    fn test_identity_change_is_a_replacement() {
        let old: Vec<Node> = vec![h("div", Props::new().with_key("x"), ())];
        let new: Vec<Node> = vec![h("span", Props::new().with_key("x"), ())];
        let (matches, leftover) = match_children(&old, &new, true);
        assert_eq!(matches, vec![ChildMatch::Replace(0)]);
        assert!(leftover.is_empty());
    }

    #[test]
    fn test_unkeyed_mode_ignores_keys() {
        let old = vec![li(Some("a")), li(Some("b"))];
        let new = vec![li(Some("b")), li(Some("a"))];
        let (matches, _) = match_children(&old, &new, false);
        assert_eq!(matches, vec![ChildMatch::Reuse(0), ChildMatch::Reuse(1)]);
    }
}

use crate::diff::{AttrPatch, ChildrenPatch, KeyedOp, KeyedPatch, Patch};
use crate::dom::{Dom, NodeId};
use crate::error::DomResult;
use crate::tree::LiveTree;
use tracing::debug;

impl<D: Dom> LiveTree<'_, D> {
    /// Apply `patch` to the live `node`.
    ///
    /// Returns the node occupying the slot afterwards: `node` itself, its
    /// replacement, or `None` once removed. Patches aimed at nodes the
    /// document no longer knows are skipped.
    pub fn apply(&mut self, node: NodeId, patch: &Patch) -> DomResult<Option<NodeId>> {
        if !self.dom.contains(node) {
            debug!(%node, "patch target vanished");
            return Ok(None);
        }

        match patch {
            Patch::Replace(next) => {
                let Some(parent) = self.dom.parent(node) else {
                    debug!(%node, "replace skipped, node has no parent");
                    return Ok(Some(node));
                };
                let replacement = self.materialize(next)?;
                self.dom.replace_child(parent, replacement, node)?;
                self.detach_subtree(node)?;
                Ok(Some(replacement))
            }
            Patch::Remove => {
                if self.dom.parent(node).is_none() {
                    debug!(%node, "remove skipped, node has no parent");
                    return Ok(Some(node));
                }
                self.detach_subtree(node)?;
                Ok(None)
            }
            Patch::Text(text) => {
                if self.dom.tag(node).is_some() {
                    // Element content becomes a single text node.
                    for child in self.dom.children(node) {
                        self.detach_subtree(child)?;
                    }
                    self.dom.set_text(node, text)?;
                } else if self.dom.text(node).as_deref() != Some(text.as_str()) {
                    self.dom.set_text(node, text)?;
                }
                Ok(Some(node))
            }
            Patch::Update { attrs, children } => {
                if let Some(attrs) = attrs {
                    self.apply_attrs(node, attrs)?;
                }
                match children {
                    Some(ChildrenPatch::Positional(slots)) => self.apply_positional(node, slots)?,
                    Some(ChildrenPatch::Keyed(plan)) => self.apply_keyed(node, plan)?,
                    None => {}
                }
                Ok(Some(node))
            }
        }
    }

    fn apply_attrs(&mut self, node: NodeId, attrs: &AttrPatch) -> DomResult<()> {
        for (name, value) in attrs {
            match value {
                Some(value) => self.write_attr(node, name, value)?,
                None => self.clear_attr(node, name)?,
            }
        }
        Ok(())
    }

    fn apply_positional(&mut self, parent: NodeId, slots: &[Option<Patch>]) -> DomResult<()> {
        let live = self.dom.children(parent);
        for (index, slot) in slots.iter().enumerate() {
            let Some(patch) = slot else { continue };
            match (live.get(index), patch) {
                (Some(&child), _) => {
                    self.apply(child, patch)?;
                }
                (None, Patch::Replace(next)) => {
                    let child = self.materialize(next)?;
                    self.dom.append_child(parent, child)?;
                }
                (None, _) => debug!(%parent, index, "no live child at index"),
            }
        }
        for &extra in live.iter().skip(slots.len()) {
            self.detach_subtree(extra)?;
        }
        Ok(())
    }

    fn apply_keyed(&mut self, parent: NodeId, plan: &KeyedPatch) -> DomResult<()> {
        let live = self.dom.children(parent);
        for &index in &plan.removed {
            if let Some(&child) = live.get(index) {
                self.detach_subtree(child)?;
            }
        }

        let mut position = 0;
        for op in &plan.ops {
            let child = match op {
                KeyedOp::Move { from, patch } => {
                    let Some(&reused) = live.get(*from) else {
                        debug!(%parent, from, "no live child to move");
                        continue;
                    };
                    match patch {
                        Some(patch) => match self.apply(reused, patch)? {
                            Some(child) => child,
                            None => continue,
                        },
                        None => reused,
                    }
                }
                KeyedOp::Insert(next) => self.materialize(next)?,
            };

            let current = self.dom.children(parent);
            let reference = current.get(position).copied();
            if reference != Some(child) {
                self.dom.insert_before(parent, child, reference)?;
            }
            position += 1;
        }

        let current = self.dom.children(parent);
        for &extra in current.iter().skip(position) {
            self.detach_subtree(extra)?;
        }
        Ok(())
    }
}

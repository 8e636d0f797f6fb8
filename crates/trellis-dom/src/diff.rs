//! Diff engine
//!
//! Compares the previous and next description of the same slot and
//! produces the smallest [`Patch`] that turns one into the other.

use crate::attr::{AttrValue, Attrs};
use crate::node::{Element, Key, Node};
use std::collections::{btree_map, BTreeMap, HashMap, HashSet};
use tracing::trace;
use trellis_config::ReconcileMode;

/// Change to one node slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    /// Build the new subtree and swap it in for the live node.
    Replace(Node),
    /// Detach the live node.
    Remove,
    /// Write new text into a live text node.
    Text(String),
    /// Patch the live element in place.
    Update {
        attrs: Option<AttrPatch>,
        children: Option<ChildrenPatch>,
    },
}

/// Attribute changes of one element. `None` marks a removed attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttrPatch(BTreeMap<String, Option<AttrValue>>);

impl AttrPatch {
    pub fn get(&self, name: &str) -> Option<&Option<AttrValue>> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Option<AttrValue>> {
        self.0.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<AttrValue>)> for AttrPatch {
    fn from_iter<I: IntoIterator<Item = (K, Option<AttrValue>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<'a> IntoIterator for &'a AttrPatch {
    type Item = (&'a String, &'a Option<AttrValue>);
    type IntoIter = btree_map::Iter<'a, String, Option<AttrValue>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Changes to the child list of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildrenPatch {
    /// Index-aligned patches, one slot per index of the longer list.
    Positional(Vec<Option<Patch>>),
    /// Reorder plan for a fully keyed child list.
    Keyed(KeyedPatch),
}

/// Key-aware reorder plan.
///
/// `removed` lists old indices whose keys are gone. `ops` has one entry per
/// new child, in new order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyedPatch {
    pub removed: Vec<usize>,
    pub ops: Vec<KeyedOp>,
}

/// Where the new child at one position comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyedOp {
    /// Reuse the live node at old index `from`, patched if needed.
    Move { from: usize, patch: Option<Patch> },
    /// Build a node for a key that did not exist before.
    Insert(Node),
}

/// Diff engine configured with a child reconciliation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Differ {
    mode: ReconcileMode,
}

/// Positional diff of two optional descriptions.
pub fn diff(old: Option<&Node>, new: Option<&Node>) -> Option<Patch> {
    Differ::default().diff(old, new)
}

/// Symmetric attribute diff: changed and added names carry the new value,
/// removed names carry `None`.
pub fn diff_attrs(old: &Attrs, new: &Attrs) -> Option<AttrPatch> {
    let mut patch = BTreeMap::new();
    for (name, value) in new {
        if old.get(name) != Some(value) {
            trace!(attr = %name, "attribute changed");
            patch.insert(name.clone(), Some(value.clone()));
        }
    }
    for name in old.names() {
        if !new.contains(name) {
            trace!(attr = %name, "attribute removed");
            patch.insert(name.to_string(), None);
        }
    }
    (!patch.is_empty()).then_some(AttrPatch(patch))
}

impl Differ {
    pub fn new(mode: ReconcileMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ReconcileMode {
        self.mode
    }

    pub fn diff(&self, old: Option<&Node>, new: Option<&Node>) -> Option<Patch> {
        match (old, new) {
            (None, None) => None,
            (None, Some(new)) => Some(Patch::Replace(new.clone())),
            (Some(_), None) => Some(Patch::Remove),
            (Some(Node::Text(a)), Some(Node::Text(b))) => {
                (a != b).then(|| Patch::Text(b.clone()))
            }
            (Some(Node::Element(a)), Some(Node::Element(b))) => self.diff_elements(a, b),
            (Some(_), Some(new)) => {
                trace!("node kind changed");
                Some(Patch::Replace(new.clone()))
            }
        }
    }

    fn diff_elements(&self, old: &Element, new: &Element) -> Option<Patch> {
        if old.tag != new.tag {
            trace!(old = %old.tag, new = %new.tag, "tag changed");
            return Some(Patch::Replace(Node::Element(new.clone())));
        }
        if (old.key.is_some() || new.key.is_some()) && old.key != new.key {
            trace!(tag = %new.tag, "key changed");
            return Some(Patch::Replace(Node::Element(new.clone())));
        }

        let attrs = diff_attrs(&old.attrs, &new.attrs);
        let children = self.diff_children(&old.children, &new.children);
        if attrs.is_none() && children.is_none() {
            return None;
        }
        Some(Patch::Update { attrs, children })
    }

    fn diff_children(&self, old: &[Node], new: &[Node]) -> Option<ChildrenPatch> {
        if self.mode == ReconcileMode::Keyed {
            if let (Some(old_keys), Some(new_keys)) = (unique_keys(old), unique_keys(new)) {
                return self.diff_keyed(old, new, &old_keys, &new_keys);
            }
            trace!("child list not uniquely keyed, diffing by position");
        }

        let len = old.len().max(new.len());
        let patches: Vec<Option<Patch>> = (0..len)
            .map(|i| self.diff(old.get(i), new.get(i)))
            .collect();
        patches
            .iter()
            .any(Option::is_some)
            .then_some(ChildrenPatch::Positional(patches))
    }

    fn diff_keyed(
        &self,
        old: &[Node],
        new: &[Node],
        old_keys: &[&Key],
        new_keys: &[&Key],
    ) -> Option<ChildrenPatch> {
        let old_index: HashMap<&Key, usize> = old_keys
            .iter()
            .enumerate()
            .map(|(i, key)| (*key, i))
            .collect();
        let kept: HashSet<&Key> = new_keys.iter().copied().collect();

        let removed: Vec<usize> = old_keys
            .iter()
            .enumerate()
            .filter(|(_, key)| !kept.contains(*key))
            .map(|(i, _)| i)
            .collect();

        let ops: Vec<KeyedOp> = new_keys
            .iter()
            .zip(new)
            .map(|(key, child)| match old_index.get(key) {
                Some(&from) => KeyedOp::Move {
                    from,
                    patch: self.diff(old.get(from), Some(child)),
                },
                None => KeyedOp::Insert(child.clone()),
            })
            .collect();

        let unchanged = removed.is_empty()
            && ops.iter().enumerate().all(|(i, op)| {
                matches!(op, KeyedOp::Move { from, patch: None } if *from == i)
            });
        if unchanged {
            return None;
        }
        trace!(removed = removed.len(), positions = ops.len(), "keyed reorder");
        Some(ChildrenPatch::Keyed(KeyedPatch { removed, ops }))
    }
}

/// Keys of every child, or `None` if any child is unkeyed or a key repeats.
fn unique_keys(children: &[Node]) -> Option<Vec<&Key>> {
    let mut seen = HashSet::with_capacity(children.len());
    children
        .iter()
        .map(|child| child.key().filter(|key| seen.insert(*key)))
        .collect()
}

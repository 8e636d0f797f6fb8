//! Stateful components

use crate::diff::Differ;
use crate::dom::{Dom, NodeId};
use crate::error::DomResult;
use crate::node::Node;
use crate::tree::LiveTree;
use tracing::debug;

pub trait Component {
    type State;

    fn view(&self, state: &Self::State) -> Node;
}

/// A component mounted somewhere in a live tree, together with its state.
///
/// Changing the state re-renders only this component's subtree.
pub struct Instance<C: Component> {
    component: C,
    state: C::State,
    differ: Differ,
    tree: Option<Node>,
    node: Option<NodeId>,
}

impl<C: Component> Instance<C> {
    pub fn new(component: C, state: C::State) -> Self {
        Self {
            component,
            state,
            differ: Differ::default(),
            tree: None,
            node: None,
        }
    }

    pub fn with_differ(mut self, differ: Differ) -> Self {
        self.differ = differ;
        self
    }

    pub fn component(&self) -> &C {
        &self.component
    }

    pub fn state(&self) -> &C::State {
        &self.state
    }

    /// Live node of the rendered view, once mounted.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn is_mounted(&self) -> bool {
        self.node.is_some()
    }

    /// Render the view and append it to `parent`.
    pub fn mount<D: Dom>(&mut self, live: &mut LiveTree<'_, D>, parent: NodeId) -> DomResult<NodeId> {
        let tree = self.component.view(&self.state);
        let node = live.materialize(&tree)?;
        live.dom.append_child(parent, node)?;
        self.tree = Some(tree);
        self.node = Some(node);
        Ok(node)
    }

    pub fn set_state<D: Dom>(&mut self, live: &mut LiveTree<'_, D>, state: C::State) -> DomResult<()> {
        self.state = state;
        self.render(live)
    }

    pub fn update_state<D: Dom>(
        &mut self,
        live: &mut LiveTree<'_, D>,
        f: impl FnOnce(&mut C::State),
    ) -> DomResult<()> {
        f(&mut self.state);
        self.render(live)
    }

    /// Patch the mounted subtree to the current state.
    pub fn render<D: Dom>(&mut self, live: &mut LiveTree<'_, D>) -> DomResult<()> {
        let Some(node) = self.node else {
            debug!("render of unmounted component skipped");
            return Ok(());
        };
        let next = self.component.view(&self.state);
        if let Some(patch) = self.differ.diff(self.tree.as_ref(), Some(&next)) {
            self.node = live.apply(node, &patch)?;
        }
        self.tree = Some(next);
        Ok(())
    }

    /// Remove the rendered subtree, releasing its handlers.
    pub fn unmount<D: Dom>(&mut self, live: &mut LiveTree<'_, D>) -> DomResult<()> {
        self.tree = None;
        if let Some(node) = self.node.take() {
            live.detach_subtree(node)?;
        }
        Ok(())
    }
}

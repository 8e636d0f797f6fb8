//! Render entry point

use crate::diff::Differ;
use crate::dom::{Dom, NodeId, Property, PropertyName};
use crate::error::{DomError, DomResult};
use crate::event::{DomEvent, ListenerOptions};
use crate::events::{Dispatch, DispatchOutcome, EventManager};
use crate::node::Node;
use crate::tree::LiveTree;
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::debug;
use trellis_config::TrellisConfig;

/// The last tree rendered into one container.
#[derive(Debug, Clone)]
pub struct RenderRoot {
    container: NodeId,
    tree: Node,
}

impl RenderRoot {
    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn tree(&self) -> &Node {
        &self.tree
    }
}

/// Render context: a document, its handler table and one [`RenderRoot`]
/// per container rendered into.
pub struct Renderer<D: Dom> {
    dom: D,
    events: EventManager,
    differ: Differ,
    roots: HashMap<NodeId, RenderRoot>,
}

impl<D: Dom> Renderer<D> {
    pub fn new(dom: D) -> Self {
        Self::with_parts(dom, EventManager::new(), Differ::default())
    }

    pub fn with_config(dom: D, config: &TrellisConfig) -> Self {
        Self::with_parts(
            dom,
            EventManager::from_config(&config.events),
            Differ::new(config.render.reconcile),
        )
    }

    pub fn with_parts(dom: D, events: EventManager, differ: Differ) -> Self {
        Self {
            dom,
            events,
            differ,
            roots: HashMap::new(),
        }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    /// Direct access to the document, bypassing handler bookkeeping.
    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn events(&self) -> &EventManager {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventManager {
        &mut self.events
    }

    pub fn differ(&self) -> Differ {
        self.differ
    }

    /// Document and handler table together.
    pub fn live(&mut self) -> LiveTree<'_, D> {
        LiveTree::new(&mut self.dom, &mut self.events)
    }

    pub fn root(&self, container: NodeId) -> Option<&RenderRoot> {
        self.roots.get(&container)
    }

    /// The tree last rendered into `container`.
    pub fn tree(&self, container: NodeId) -> Option<&Node> {
        self.roots.get(&container).map(RenderRoot::tree)
    }

    /// Live node holding the rendered tree of `container`.
    pub fn mounted_node(&self, container: NodeId) -> Option<NodeId> {
        self.roots.get(&container)?;
        self.dom.children(container).first().copied()
    }

    /// Render `node` into `container`.
    ///
    /// The first render of a container clears it and mounts the tree; later
    /// renders patch the live tree with the diff against the previous one.
    pub fn render(&mut self, node: Node, container: NodeId) -> DomResult<()> {
        if !self.dom.contains(container) {
            return Err(DomError::UnknownNode(container));
        }
        let differ = self.differ;
        let mut live = LiveTree::new(&mut self.dom, &mut self.events);

        match self.roots.get_mut(&container) {
            Some(root) => {
                match live.dom.children(container).first().copied() {
                    Some(current) => match differ.diff(Some(&root.tree), Some(&node)) {
                        Some(patch) => {
                            live.apply(current, &patch)?;
                        }
                        None => debug!(%container, "render produced no changes"),
                    },
                    None => {
                        debug!(%container, "mounted node missing, remounting");
                        mount(&mut live, &node, container)?;
                    }
                }
                root.tree = node;
            }
            None => {
                for child in live.dom.children(container) {
                    live.detach_subtree(child)?;
                }
                mount(&mut live, &node, container)?;
                self.roots.insert(
                    container,
                    RenderRoot {
                        container,
                        tree: node,
                    },
                );
            }
        }
        Ok(())
    }

    /// Tear down the tree rendered into `container`, releasing its handlers.
    ///
    /// Returns `false` when nothing was rendered there.
    pub fn unmount(&mut self, container: NodeId) -> DomResult<bool> {
        if self.roots.remove(&container).is_none() {
            return Ok(false);
        }
        let mut live = self.live();
        for child in live.dom.children(container) {
            live.detach_subtree(child)?;
        }
        Ok(true)
    }

    /// Event on `target` carrying the live `value` of the target control.
    pub fn event(&self, event_type: &str, target: NodeId) -> DomEvent {
        self.prepare(DomEvent::new(event_type, target))
    }

    /// Fill in the live value of the target when the event lacks one.
    pub fn prepare(&self, event: DomEvent) -> DomEvent {
        if event.has_value() {
            return event;
        }
        match self.dom.property(event.target(), PropertyName::Value) {
            Some(Property::Value(value)) => event.with_value(value),
            _ => event,
        }
    }

    pub fn resolve(&mut self, event: &DomEvent) -> Option<Dispatch> {
        self.events.resolve(&self.dom, event)
    }

    /// Dispatch an event whose handlers do not touch this renderer.
    pub fn dispatch(&mut self, event: DomEvent) -> DispatchOutcome {
        let event = self.prepare(event);
        self.events.dispatch(&self.dom, &event)
    }

    /// Dispatch through a shared renderer. The renderer is not borrowed
    /// while handlers run, so a handler may re-render.
    pub fn dispatch_shared(this: &RefCell<Self>, event: DomEvent) -> DispatchOutcome {
        let (event, dispatch) = {
            let mut renderer = this.borrow_mut();
            let event = renderer.prepare(event);
            let dispatch = renderer.resolve(&event);
            (event, dispatch)
        };
        dispatch
            .map(|dispatch| dispatch.invoke(&event))
            .unwrap_or_default()
    }

    /// Register a handler on a live node. Returns `false` for nodes the
    /// document does not know.
    pub fn on(
        &mut self,
        node: NodeId,
        event_type: &str,
        handler: impl Fn(&DomEvent) + 'static,
    ) -> bool {
        self.on_with(node, event_type, handler, ListenerOptions::default())
    }

    pub fn on_with(
        &mut self,
        node: NodeId,
        event_type: &str,
        handler: impl Fn(&DomEvent) + 'static,
        options: ListenerOptions,
    ) -> bool {
        if !self.dom.contains(node) {
            debug!(%node, event = event_type, "registration on unknown node ignored");
            return false;
        }
        self.events.on_with(node, event_type, handler, options);
        true
    }

    pub fn off(&mut self, node: NodeId, event_type: &str) -> bool {
        self.events.off(node, event_type)
    }

    pub fn release(&mut self, node: NodeId) -> usize {
        self.events.release(node)
    }
}

fn mount<D: Dom>(live: &mut LiveTree<'_, D>, node: &Node, container: NodeId) -> DomResult<()> {
    let id = live.materialize(node)?;
    live.dom.append_child(container, id)
}

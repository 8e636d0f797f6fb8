//! Delegated event manager
//!
//! The document gets one capturing listener per delegated event type; the
//! manager owns the table that maps each live node to its handlers and
//! decides which handler an event reaches.
//!
//! Dispatch is split in two so a handler can re-render the same document:
//! [`EventManager::resolve`] looks the handler up (and applies `once`) while
//! the manager is borrowed, and [`Dispatch::invoke`] runs it after the
//! borrow ends.

use crate::dom::{Dom, NodeId};
use crate::event::{Callback, DomEvent, ListenerOptions};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, trace, warn};
use trellis_config::{EventsConfig, DEFAULT_DELEGATED_EVENTS};

/// A handler together with the options it was registered with.
#[derive(Debug, Clone)]
pub struct Registration {
    callback: Callback,
    options: ListenerOptions,
}

impl Registration {
    pub fn new(callback: Callback, options: ListenerOptions) -> Self {
        Self { callback, options }
    }

    pub fn callback(&self) -> &Callback {
        &self.callback
    }

    pub fn options(&self) -> &ListenerOptions {
        &self.options
    }
}

/// Handler table and delegation policy for one document.
#[derive(Debug)]
pub struct EventManager {
    delegated: BTreeSet<String>,
    handlers: HashMap<NodeId, HashMap<String, Registration>>,
    globals: HashMap<String, Callback>,
}

impl Default for EventManager {
    fn default() -> Self {
        Self::with_delegated(DEFAULT_DELEGATED_EVENTS.iter().copied())
    }
}

/// What a resolved event will run.
#[derive(Debug, Default)]
pub struct Dispatch {
    matched: Option<(NodeId, Registration)>,
    global: Option<Callback>,
}

/// Result of running a [`Dispatch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Node whose handler ran.
    pub handled_by: Option<NodeId>,
    pub global_ran: bool,
    pub default_prevented: bool,
    pub propagation_stopped: bool,
}

impl Dispatch {
    /// Node whose registration the event reached, if any.
    pub fn target(&self) -> Option<NodeId> {
        self.matched.as_ref().map(|(node, _)| *node)
    }

    pub fn is_empty(&self) -> bool {
        self.matched.is_none() && self.global.is_none()
    }

    /// Run the matched handler, then the global handler for the type.
    ///
    /// A registration whose condition rejects the event does not run, but
    /// its `stop_propagation`/`prevent_default` options still apply.
    pub fn invoke(self, event: &DomEvent) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();

        if let Some((node, registration)) = self.matched {
            event.set_current_target(Some(node));
            if registration.options.allows(event) {
                registration.callback.call(event);
                outcome.handled_by = Some(node);
            } else {
                trace!(%node, event = event.event_type(), "condition rejected event");
            }
            if registration.options.stop_propagation {
                event.stop_propagation();
            }
            if registration.options.prevent_default {
                event.prevent_default();
            }
        }

        if let Some(global) = self.global {
            event.set_current_target(None);
            global.call(event);
            outcome.global_ran = true;
        }

        outcome.default_prevented = event.default_prevented();
        outcome.propagation_stopped = event.propagation_stopped();
        outcome
    }
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manager that dispatches exactly the given event types.
    pub fn with_delegated(types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            delegated: types.into_iter().map(Into::into).collect(),
            handlers: HashMap::new(),
            globals: HashMap::new(),
        }
    }

    pub fn from_config(config: &EventsConfig) -> Self {
        Self::with_delegated(config.delegated.iter().cloned())
    }

    /// Event types that get a document listener, in sorted order.
    pub fn delegated_types(&self) -> impl Iterator<Item = &str> {
        self.delegated.iter().map(String::as_str)
    }

    pub fn is_delegated(&self, event_type: &str) -> bool {
        self.delegated.contains(event_type)
    }

    /// Store `callback` as the `event_type` handler of `node`, replacing any
    /// previous one.
    ///
    /// The manager does not see the document, so `node` is taken on trust:
    /// it must be live in the document events are dispatched against. An id
    /// that is not stays in the table until [`release`](Self::release) or
    /// [`prune`](Self::prune). [`Renderer::on`](crate::Renderer::on) checks
    /// the node first.
    pub fn register(
        &mut self,
        node: NodeId,
        event_type: &str,
        callback: Callback,
        options: ListenerOptions,
    ) {
        if event_type.is_empty() {
            debug!(%node, "registration with empty event type ignored");
            return;
        }
        if !self.is_delegated(event_type) {
            warn!(%node, event = event_type, "handler registered for undelegated event type");
        }
        trace!(%node, event = event_type, "handler registered");
        self.handlers
            .entry(node)
            .or_default()
            .insert(event_type.to_string(), Registration::new(callback, options));
    }

    pub fn on(&mut self, node: NodeId, event_type: &str, handler: impl Fn(&DomEvent) + 'static) {
        self.register(node, event_type, Callback::new(handler), ListenerOptions::default());
    }

    pub fn on_with(
        &mut self,
        node: NodeId,
        event_type: &str,
        handler: impl Fn(&DomEvent) + 'static,
        options: ListenerOptions,
    ) {
        self.register(node, event_type, Callback::new(handler), options);
    }

    /// Remove one handler. Returns whether there was one.
    pub fn off(&mut self, node: NodeId, event_type: &str) -> bool {
        let Some(table) = self.handlers.get_mut(&node) else {
            return false;
        };
        let removed = table.remove(event_type).is_some();
        if table.is_empty() {
            self.handlers.remove(&node);
        }
        removed
    }

    /// Remove every handler of one node. Returns how many were removed.
    pub fn release(&mut self, node: NodeId) -> usize {
        self.handlers.remove(&node).map_or(0, |table| table.len())
    }

    /// Remove every handler registered on `root` or its descendants.
    pub fn release_subtree<D: Dom + ?Sized>(&mut self, dom: &D, root: NodeId) -> usize {
        if self.handlers.is_empty() {
            return 0;
        }
        let mut released = 0;
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            released += self.release(node);
            stack.extend(dom.children(node));
        }
        if released > 0 {
            trace!(%root, released, "released subtree handlers");
        }
        released
    }

    /// Drop the handlers of every node `dom` no longer contains. Returns how
    /// many registrations were removed.
    pub fn prune<D: Dom + ?Sized>(&mut self, dom: &D) -> usize {
        let mut pruned = 0;
        self.handlers.retain(|node, table| {
            if dom.contains(*node) {
                return true;
            }
            debug!(%node, handlers = table.len(), "pruned handlers of unknown node");
            pruned += table.len();
            false
        });
        pruned
    }

    pub fn registration(&self, node: NodeId, event_type: &str) -> Option<&Registration> {
        self.handlers.get(&node)?.get(event_type)
    }

    pub fn has_handler(&self, node: NodeId, event_type: &str) -> bool {
        self.registration(node, event_type).is_some()
    }

    /// Total number of registrations across all nodes.
    pub fn handler_count(&self) -> usize {
        self.handlers.values().map(HashMap::len).sum()
    }

    /// Number of nodes with at least one registration.
    pub fn registered_nodes(&self) -> usize {
        self.handlers.len()
    }

    /// Document-level handler that runs after node dispatch for `event_type`.
    pub fn on_global(&mut self, event_type: &str, handler: impl Fn(&DomEvent) + 'static) {
        self.globals
            .insert(event_type.to_string(), Callback::new(handler));
    }

    pub fn off_global(&mut self, event_type: &str) -> bool {
        self.globals.remove(event_type).is_some()
    }

    /// Find what `event` will run. `None` for event types outside the
    /// delegated set, which the document never listens for.
    pub fn resolve<D: Dom + ?Sized>(&mut self, dom: &D, event: &DomEvent) -> Option<Dispatch> {
        if !self.is_delegated(event.event_type()) {
            debug!(event = event.event_type(), "event type not delegated");
            return None;
        }
        Some(self.lookup(dom, event))
    }

    /// Resolve and run `event` in one step.
    ///
    /// Handlers must not reach back into this manager; use
    /// [`resolve`](Self::resolve) and [`Dispatch::invoke`] for that.
    pub fn dispatch<D: Dom + ?Sized>(&mut self, dom: &D, event: &DomEvent) -> DispatchOutcome {
        self.resolve(dom, event)
            .map(|dispatch| dispatch.invoke(event))
            .unwrap_or_default()
    }

    /// Synthesize a bubbling custom event on `target` and dispatch it.
    ///
    /// Custom event types need no document listener, so the delegated set
    /// does not apply.
    pub fn emit<D: Dom + ?Sized>(
        &mut self,
        dom: &D,
        target: NodeId,
        event_type: &str,
        detail: impl Into<String>,
    ) -> DispatchOutcome {
        let event = DomEvent::new(event_type, target).with_detail(detail);
        self.lookup(dom, &event).invoke(&event)
    }

    fn lookup<D: Dom + ?Sized>(&mut self, dom: &D, event: &DomEvent) -> Dispatch {
        let event_type = event.event_type();
        let mut current = Some(event.target());
        let mut matched = None;

        while let Some(node) = current {
            if let Some(registration) = self.registration(node, event_type).cloned() {
                if registration.options.once {
                    self.off(node, event_type);
                }
                matched = Some((node, registration));
                break;
            }
            current = dom.parent(node);
        }

        Dispatch {
            matched,
            global: self.globals.get(event_type).cloned(),
        }
    }

    pub fn on_click(&mut self, node: NodeId, handler: impl Fn(&DomEvent) + 'static) {
        self.on(node, "click", handler);
    }

    pub fn on_dblclick(&mut self, node: NodeId, handler: impl Fn(&DomEvent) + 'static) {
        self.on(node, "dblclick", handler);
    }

    pub fn on_input(&mut self, node: NodeId, handler: impl Fn(&DomEvent) + 'static) {
        self.on(node, "input", handler);
    }

    pub fn on_change(&mut self, node: NodeId, handler: impl Fn(&DomEvent) + 'static) {
        self.on(node, "change", handler);
    }

    pub fn on_blur(&mut self, node: NodeId, handler: impl Fn(&DomEvent) + 'static) {
        self.on(node, "blur", handler);
    }

    pub fn on_focus(&mut self, node: NodeId, handler: impl Fn(&DomEvent) + 'static) {
        self.on(node, "focus", handler);
    }

    pub fn on_keydown(&mut self, node: NodeId, handler: impl Fn(&DomEvent) + 'static) {
        self.on(node, "keydown", handler);
    }

    /// `submit` handler that also prevents the default form submission.
    pub fn on_submit(&mut self, node: NodeId, handler: impl Fn(&DomEvent) + 'static) {
        self.on_with(node, "submit", handler, ListenerOptions::new().prevent_default());
    }

    /// `submit` handler that only runs when `validator` accepts the event.
    pub fn on_valid_submit(
        &mut self,
        node: NodeId,
        validator: impl Fn(&DomEvent) -> bool + 'static,
        handler: impl Fn(&DomEvent) + 'static,
    ) {
        self.on_submit(node, move |e| {
            if validator(e) {
                handler(e);
            }
        });
    }

    pub fn on_enter_key(&mut self, node: NodeId, handler: impl Fn(&DomEvent) + 'static) {
        self.on_key(node, "Enter", handler);
    }

    pub fn on_escape_key(&mut self, node: NodeId, handler: impl Fn(&DomEvent) + 'static) {
        self.on_key(node, "Escape", handler);
    }

    fn on_key(&mut self, node: NodeId, key: &'static str, handler: impl Fn(&DomEvent) + 'static) {
        self.on_keydown(node, move |e| {
            if e.key() == Some(key) {
                handler(e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;
    use std::cell::RefCell;
    use std::rc::Rc;
    use test_case::test_case;

    /// `main > ul > li > button`
    fn tree() -> (MemoryDom, [NodeId; 4]) {
        let mut dom = MemoryDom::new();
        let main = dom.create_container("main");
        let ul = dom.create_element("ul").unwrap();
        let li = dom.create_element("li").unwrap();
        let button = dom.create_element("button").unwrap();
        dom.append_child(main, ul).unwrap();
        dom.append_child(ul, li).unwrap();
        dom.append_child(li, button).unwrap();
        (dom, [main, ul, li, button])
    }

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&'static str) -> Callback) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let make = move |label: &'static str| {
            let sink = sink.clone();
            Callback::new(move |_| sink.borrow_mut().push(label.to_string()))
        };
        (log, make)
    }

    #[test]
    fn first_match_up_the_tree_wins() {
        let (dom, [main, ul, _, button]) = tree();
        let (log, make) = recorder();
        let mut events = EventManager::new();
        events.register(ul, "click", make("ul"), ListenerOptions::default());
        events.register(main, "click", make("main"), ListenerOptions::default());

        let outcome = events.dispatch(&dom, &DomEvent::new("click", button));

        assert_eq!(outcome.handled_by, Some(ul));
        assert_eq!(*log.borrow(), vec!["ul"]);
    }

    #[test]
    fn prune_drops_handlers_of_unknown_nodes() {
        let (mut dom, [_, ul, li, button]) = tree();
        let mut events = EventManager::new();
        events.on(ul, "click", |_| {});
        events.on(button, "click", |_| {});
        events.on(button, "keydown", |_| {});
        events.on(NodeId::new(999), "click", |_| {});

        assert_eq!(events.prune(&dom), 1);
        assert_eq!(events.handler_count(), 3);

        dom.discard(li);

        assert_eq!(events.prune(&dom), 2);
        assert!(events.has_handler(ul, "click"));
        assert!(!events.has_handler(button, "click"));
        assert_eq!(events.prune(&dom), 0);
    }

    #[test]
    fn current_target_is_the_matched_node() {
        let (dom, [_, ul, _, button]) = tree();
        let seen = Rc::new(RefCell::new(None));
        let sink = seen.clone();
        let mut events = EventManager::new();
        events.on(ul, "click", move |e| *sink.borrow_mut() = e.current_target());

        events.dispatch(&dom, &DomEvent::new("click", button));

        assert_eq!(*seen.borrow(), Some(ul));
    }

    #[test]
    fn undelegated_types_never_dispatch() {
        let (dom, [_, _, _, button]) = tree();
        let (log, make) = recorder();
        let mut events = EventManager::new();
        events.register(button, "scroll", make("scroll"), ListenerOptions::default());

        assert!(events.resolve(&dom, &DomEvent::new("scroll", button)).is_none());
        assert!(log.borrow().is_empty());
        assert!(events.has_handler(button, "scroll"));
    }

    #[test]
    fn once_removes_before_running() {
        let (dom, [_, _, _, button]) = tree();
        let (log, make) = recorder();
        let mut events = EventManager::new();
        events.register(button, "click", make("once"), ListenerOptions::new().once());

        events.dispatch(&dom, &DomEvent::new("click", button));
        events.dispatch(&dom, &DomEvent::new("click", button));

        assert_eq!(*log.borrow(), vec!["once"]);
        assert_eq!(events.registered_nodes(), 0);
    }

    #[test]
    fn rejected_condition_still_stops_the_walk() {
        let (dom, [_, ul, _, button]) = tree();
        let (log, make) = recorder();
        let mut events = EventManager::new();
        events.register(ul, "keydown", make("ul"), ListenerOptions::default());
        events.register(
            button,
            "keydown",
            make("button"),
            ListenerOptions::new().when(|e| e.key() == Some("Enter")),
        );

        let outcome = events.dispatch(&dom, &DomEvent::keydown(button, "a"));

        assert_eq!(outcome.handled_by, None);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn options_mark_the_event() {
        let (dom, [_, _, _, button]) = tree();
        let mut events = EventManager::new();
        events.on_with(
            button,
            "click",
            |_| {},
            ListenerOptions::new().stop_propagation().prevent_default(),
        );

        let outcome = events.dispatch(&dom, &DomEvent::new("click", button));

        assert!(outcome.default_prevented);
        assert!(outcome.propagation_stopped);
    }

    #[test]
    fn global_runs_after_node_handler() {
        let (dom, [_, _, li, button]) = tree();
        let (log, make) = recorder();
        let mut events = EventManager::new();
        events.register(li, "click", make("li"), ListenerOptions::default());
        let global = make("global");
        events.on_global("click", move |e| global.call(e));

        let outcome = events.dispatch(&dom, &DomEvent::new("click", button));

        assert!(outcome.global_ran);
        assert_eq!(*log.borrow(), vec!["li", "global"]);

        assert!(events.off_global("click"));
        let outcome = events.dispatch(&dom, &DomEvent::new("click", button));
        assert!(!outcome.global_ran);
    }

    #[test]
    fn off_removes_empty_entries() {
        let (_, [_, ul, _, _]) = tree();
        let mut events = EventManager::new();
        events.on(ul, "click", |_| {});
        events.on(ul, "dblclick", |_| {});

        assert!(events.off(ul, "click"));
        assert!(!events.off(ul, "click"));
        assert_eq!(events.registered_nodes(), 1);
        assert!(events.off(ul, "dblclick"));
        assert_eq!(events.registered_nodes(), 0);
    }

    #[test]
    fn release_subtree_counts() {
        let (dom, [main, ul, li, button]) = tree();
        let mut events = EventManager::new();
        events.on(main, "click", |_| {});
        events.on(li, "click", |_| {});
        events.on(button, "click", |_| {});
        events.on(button, "focus", |_| {});

        assert_eq!(events.release_subtree(&dom, ul), 3);
        assert_eq!(events.handler_count(), 1);
    }

    #[test]
    fn empty_event_type_is_ignored() {
        let mut events = EventManager::new();
        events.on(NodeId::new(1), "", |_| {});
        assert_eq!(events.handler_count(), 0);
    }

    #[test_case("Enter", true)]
    #[test_case("Escape", false)]
    #[test_case("a", false)]
    fn enter_key_helper(key: &str, fires: bool) {
        let (dom, [_, _, _, button]) = tree();
        let (log, make) = recorder();
        let mut events = EventManager::new();
        let cb = make("enter");
        events.on_enter_key(button, move |e| cb.call(e));

        events.dispatch(&dom, &DomEvent::keydown(button, key));

        assert_eq!(log.borrow().len(), usize::from(fires));
    }

    #[test]
    fn submit_prevents_default() {
        let (dom, [_, _, _, button]) = tree();
        let mut events = EventManager::new();
        events.on_submit(button, |_| {});

        let outcome = events.dispatch(&dom, &DomEvent::new("submit", button));

        assert!(outcome.default_prevented);
    }

    #[test]
    fn valid_submit_consults_validator() {
        let (dom, [_, _, _, button]) = tree();
        let (log, make) = recorder();
        let mut events = EventManager::new();
        let cb = make("submitted");
        events.on_valid_submit(button, |e| e.value() == Some("ok"), move |e| cb.call(e));

        events.dispatch(&dom, &DomEvent::new("submit", button).with_value("bad"));
        events.dispatch(&dom, &DomEvent::new("submit", button).with_value("ok"));

        assert_eq!(*log.borrow(), vec!["submitted"]);
    }

    #[test]
    fn emit_bypasses_delegation_and_bubbles() {
        let (dom, [main, _, _, button]) = tree();
        let detail = Rc::new(RefCell::new(None));
        let sink = detail.clone();
        let mut events = EventManager::new();
        events.on(main, "todo-added", move |e| {
            *sink.borrow_mut() = e.detail().map(String::from)
        });

        let outcome = events.emit(&dom, button, "todo-added", "milk");

        assert_eq!(outcome.handled_by, Some(main));
        assert_eq!(detail.borrow().as_deref(), Some("milk"));
    }

    #[test]
    fn resolve_then_invoke_allows_reentrant_registration() {
        let (dom, [_, _, _, button]) = tree();
        let events = Rc::new(RefCell::new(EventManager::new()));
        let inner = events.clone();
        events.borrow_mut().on(button, "click", move |e| {
            inner.borrow_mut().on(e.target(), "dblclick", |_| {});
        });

        let event = DomEvent::new("click", button);
        let dispatch = events.borrow_mut().resolve(&dom, &event).unwrap();
        dispatch.invoke(&event);

        assert!(events.borrow().has_handler(button, "dblclick"));
    }

    #[test]
    fn custom_delegated_set() {
        let config = EventsConfig {
            delegated: vec!["click".into()],
        };
        let events = EventManager::from_config(&config);

        assert!(events.is_delegated("click"));
        assert!(!events.is_delegated("keydown"));
        assert_eq!(events.delegated_types().collect::<Vec<_>>(), vec!["click"]);
    }
}

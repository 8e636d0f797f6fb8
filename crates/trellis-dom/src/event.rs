//! Events delivered to handlers

use crate::dom::NodeId;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// An event routed through the delegated listener.
///
/// Backends fill in what the framework cannot know on its own: the key of
/// a keyboard event and the live `value` of the target control.
#[derive(Debug, Clone)]
pub struct DomEvent {
    event_type: String,
    target: NodeId,
    current_target: Cell<Option<NodeId>>,
    key: Option<String>,
    value: Option<String>,
    detail: Option<String>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl DomEvent {
    pub fn new(event_type: impl Into<String>, target: NodeId) -> Self {
        Self {
            event_type: event_type.into(),
            target,
            current_target: Cell::new(None),
            key: None,
            value: None,
            detail: None,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    /// A `keydown` event for `key` (`"Enter"`, `"Escape"`, `"a"`, ...).
    pub fn keydown(target: NodeId, key: impl Into<String>) -> Self {
        Self::new("keydown", target).with_key(key)
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The node the event originated on.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The node whose handler is running, once dispatch found one.
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target.get()
    }

    pub(crate) fn set_current_target(&self, node: Option<NodeId>) {
        self.current_target.set(node);
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Live value of the target control at dispatch time.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Payload of a synthetic event created by
    /// [`EventManager::emit`](crate::EventManager::emit).
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

/// A reference-counted event handler.
///
/// Equality is pointer identity: two callbacks are equal only when they
/// share one allocation, so a closure rebuilt on every render always reads
/// as changed.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(&DomEvent)>);

impl Callback {
    pub fn new(f: impl Fn(&DomEvent) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, event: &DomEvent) {
        (self.0)(event)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::eq(
            Rc::as_ptr(&self.0) as *const u8,
            Rc::as_ptr(&other.0) as *const u8,
        )
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Rc::as_ptr(&self.0) as *const u8)
    }
}

impl<F> From<F> for Callback
where
    F: Fn(&DomEvent) + 'static,
{
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

type Condition = Rc<dyn Fn(&DomEvent) -> bool>;

/// Per-registration behaviour.
#[derive(Clone, Default)]
pub struct ListenerOptions {
    pub once: bool,
    pub stop_propagation: bool,
    pub prevent_default: bool,
    condition: Option<Condition>,
}

impl ListenerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the registration the first time it is reached.
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    pub fn stop_propagation(mut self) -> Self {
        self.stop_propagation = true;
        self
    }

    pub fn prevent_default(mut self) -> Self {
        self.prevent_default = true;
        self
    }

    /// Only run the handler when `condition` holds. The lookup still stops
    /// at this node when it does not.
    pub fn when(mut self, condition: impl Fn(&DomEvent) -> bool + 'static) -> Self {
        self.condition = Some(Rc::new(condition));
        self
    }

    pub(crate) fn allows(&self, event: &DomEvent) -> bool {
        self.condition.as_ref().map_or(true, |c| c(event))
    }
}

impl fmt::Debug for ListenerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerOptions")
            .field("once", &self.once)
            .field("stop_propagation", &self.stop_propagation)
            .field("prevent_default", &self.prevent_default)
            .field("condition", &self.condition.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn callback_equality_is_identity() {
        let a = Callback::new(|_| {});
        let b = a.clone();
        let c = Callback::new(|_| {});

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn callback_receives_event() {
        let seen = Rc::new(RefCell::new(None));
        let sink = seen.clone();
        let cb = Callback::new(move |e| *sink.borrow_mut() = e.key().map(String::from));

        cb.call(&DomEvent::keydown(NodeId::new(1), "Enter"));

        assert_eq!(seen.borrow().as_deref(), Some("Enter"));
    }

    #[test]
    fn flags_are_settable_through_shared_reference() {
        let event = DomEvent::new("submit", NodeId::new(3));
        assert!(!event.default_prevented());

        event.prevent_default();
        event.stop_propagation();

        assert!(event.default_prevented());
        assert!(event.propagation_stopped());
    }

    #[test]
    fn condition_gates_options() {
        let options = ListenerOptions::new().when(|e| e.key() == Some("Escape"));

        assert!(options.allows(&DomEvent::keydown(NodeId::new(1), "Escape")));
        assert!(!options.allows(&DomEvent::keydown(NodeId::new(1), "Enter")));
        assert!(ListenerOptions::default().allows(&DomEvent::new("click", NodeId::new(1))));
    }
}

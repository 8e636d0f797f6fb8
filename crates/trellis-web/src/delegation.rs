//! Capturing document listeners that feed the event manager

use crate::dom::{js_error, node_id_of};
use js_sys::Reflect;
use std::rc::Rc;
use tracing::{debug, trace};
use trellis_dom::{DispatchOutcome, DomEvent, DomResult, NodeId};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CustomEvent, Document, Event, KeyboardEvent, Node};

type Listener = Closure<dyn FnMut(Event)>;

/// Installed document listeners. Dropping it removes them.
pub struct Delegation {
    document: Document,
    listeners: Vec<(String, Listener)>,
}

impl Delegation {
    /// Event types with a listener.
    pub fn event_types(&self) -> impl Iterator<Item = &str> {
        self.listeners.iter().map(|(t, _)| t.as_str())
    }
}

impl Drop for Delegation {
    fn drop(&mut self) {
        for (event_type, listener) in &self.listeners {
            if let Err(err) = self.document.remove_event_listener_with_callback_and_bool(
                event_type,
                listener.as_ref().unchecked_ref(),
                true,
            ) {
                debug!(event = %event_type, ?err, "listener removal failed");
            }
        }
    }
}

/// Attach one capturing listener per event type to `document`.
///
/// Each browser event is translated into a [`DomEvent`] (target id, key,
/// live value, custom detail) and handed to `sink`; the returned outcome is
/// mirrored back onto the browser event. Events whose target was never
/// rendered by a [`WebDom`](crate::WebDom) are ignored.
///
/// ```no_run
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use trellis_dom::Renderer;
/// use trellis_web::{install_delegation, WebDom};
///
/// # fn main() -> trellis_dom::DomResult<()> {
/// let dom = WebDom::new()?;
/// let document = dom.document().clone();
/// let renderer = Rc::new(RefCell::new(Renderer::new(dom)));
/// let types: Vec<String> = renderer
///     .borrow()
///     .events()
///     .delegated_types()
///     .map(String::from)
///     .collect();
/// let shared = renderer.clone();
/// let _delegation = install_delegation(&document, types, move |event| {
///     Renderer::dispatch_shared(&shared, event)
/// })?;
/// # Ok(())
/// # }
/// ```
pub fn install_delegation<I, S>(
    document: &Document,
    event_types: I,
    sink: impl Fn(DomEvent) -> DispatchOutcome + 'static,
) -> DomResult<Delegation>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let sink = Rc::new(sink);
    let mut delegation = Delegation {
        document: document.clone(),
        listeners: Vec::new(),
    };

    for event_type in event_types {
        let event_type = event_type.into();
        let sink = Rc::clone(&sink);
        let listener: Listener = Closure::new(move |event: Event| {
            let Some(dom_event) = translate(&event) else {
                return;
            };
            let outcome = (*sink)(dom_event);
            if outcome.default_prevented {
                event.prevent_default();
            }
            if outcome.propagation_stopped {
                event.stop_propagation();
            }
        });
        document
            .add_event_listener_with_callback_and_bool(
                &event_type,
                listener.as_ref().unchecked_ref(),
                true,
            )
            .map_err(js_error)?;
        debug!(event = %event_type, "delegated listener installed");
        delegation.listeners.push((event_type, listener));
    }
    Ok(delegation)
}

/// Nearest node with an id, starting at the event target.
fn target_id(event: &Event) -> Option<NodeId> {
    let mut node = event.target()?.dyn_into::<Node>().ok();
    while let Some(current) = node {
        if let Some(id) = node_id_of(&current) {
            return Some(id);
        }
        node = current.parent_node();
    }
    None
}

fn translate(event: &Event) -> Option<DomEvent> {
    let Some(target) = target_id(event) else {
        trace!(event = %event.type_(), "event target not rendered by trellis");
        return None;
    };
    let mut dom_event = DomEvent::new(event.type_(), target);

    if let Some(keyboard) = event.dyn_ref::<KeyboardEvent>() {
        dom_event = dom_event.with_key(keyboard.key());
    }
    if let Some(custom) = event.dyn_ref::<CustomEvent>() {
        if let Some(detail) = custom.detail().as_string() {
            dom_event = dom_event.with_detail(detail);
        }
    }
    let value = event
        .target()
        .and_then(|t| Reflect::get(&t, &JsValue::from_str("value")).ok())
        .and_then(|v| v.as_string());
    if let Some(value) = value {
        dom_event = dom_event.with_value(value);
    }
    Some(dom_event)
}

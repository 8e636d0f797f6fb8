//! A live document paired with its handler table

use crate::attr::{event_type, AttrValue};
use crate::dom::{Dom, NodeId, Property, PropertyName};
use crate::error::DomResult;
use crate::event::ListenerOptions;
use crate::events::EventManager;
use tracing::{debug, warn};

/// Mutable view over a document and the handlers registered on its nodes.
///
/// Materialization, patch application and subtree removal all go through
/// this type so that nodes and their handler registrations change together.
pub struct LiveTree<'a, D: Dom> {
    pub(crate) dom: &'a mut D,
    pub(crate) events: &'a mut EventManager,
}

impl<'a, D: Dom> LiveTree<'a, D> {
    pub fn new(dom: &'a mut D, events: &'a mut EventManager) -> Self {
        Self { dom, events }
    }

    pub fn dom(&self) -> &D {
        self.dom
    }

    pub fn events(&self) -> &EventManager {
        self.events
    }

    /// Release every handler in the subtree rooted at `node`, detach it from
    /// its parent and discard it.
    ///
    /// Returns the number of handler registrations released. A node the
    /// document no longer knows is a no-op.
    pub fn detach_subtree(&mut self, node: NodeId) -> DomResult<usize> {
        if !self.dom.contains(node) {
            debug!(%node, "detach of unknown node skipped");
            return Ok(0);
        }
        let released = self.events.release_subtree(&*self.dom, node);
        if let Some(parent) = self.dom.parent(node) {
            self.dom.remove_child(parent, node)?;
        }
        self.dom.discard(node);
        Ok(released)
    }

    pub(crate) fn write_attr(
        &mut self,
        node: NodeId,
        name: &str,
        value: &AttrValue,
    ) -> DomResult<()> {
        if let Some(event) = event_type(name) {
            if let AttrValue::Handler(callback) = value {
                self.events
                    .register(node, &event, callback.clone(), ListenerOptions::default());
                return Ok(());
            }
            self.events.off(node, &event);
        } else if matches!(value, AttrValue::Handler(_)) {
            warn!(attr = name, %node, "handler under a name without `on` prefix ignored");
            return Ok(());
        }

        if let Some(property) = PropertyName::from_attr(name).and_then(|p| p.with(value)) {
            if let Property::Value(_) = property {
                if self.dom.property(node, PropertyName::Value).as_ref() == Some(&property) {
                    return Ok(());
                }
            }
            return self.dom.set_property(node, &property);
        }

        match value {
            AttrValue::Static(s) => self.dom.set_attribute(node, name, s),
            AttrValue::Bool(true) => self.dom.set_attribute(node, name, ""),
            AttrValue::Bool(false) => self.dom.remove_attribute(node, name),
            AttrValue::Handler(_) => Ok(()),
        }
    }

    pub(crate) fn clear_attr(&mut self, node: NodeId, name: &str) -> DomResult<()> {
        if let Some(event) = event_type(name) {
            self.events.off(node, &event);
            return self.dom.remove_attribute(node, name);
        }
        match PropertyName::from_attr(name) {
            Some(property) => self.dom.set_property(node, &property.cleared()),
            None => self.dom.remove_attribute(node, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;

    #[test]
    fn detach_releases_handlers_of_whole_subtree() {
        let mut dom = MemoryDom::new();
        let mut events = EventManager::new();
        let root = dom.create_container("main");
        let ul = dom.create_element("ul").unwrap();
        let li = dom.create_element("li").unwrap();
        dom.append_child(root, ul).unwrap();
        dom.append_child(ul, li).unwrap();
        events.on(ul, "click", |_| {});
        events.on(li, "dblclick", |_| {});
        events.on(li, "click", |_| {});

        let mut tree = LiveTree::new(&mut dom, &mut events);
        let released = tree.detach_subtree(ul).unwrap();

        assert_eq!(released, 3);
        assert_eq!(events.handler_count(), 0);
        assert!(dom.children(root).is_empty());
        assert!(!dom.contains(li));
    }

    #[test]
    fn detach_of_unknown_node_is_noop() {
        let mut dom = MemoryDom::new();
        let mut events = EventManager::new();
        let mut tree = LiveTree::new(&mut dom, &mut events);

        assert_eq!(tree.detach_subtree(NodeId::new(99)), Ok(0));
    }

    #[test]
    fn properties_are_not_attributes() {
        let mut dom = MemoryDom::new();
        let mut events = EventManager::new();
        let input = dom.create_element("input").unwrap();
        let mut tree = LiveTree::new(&mut dom, &mut events);

        tree.write_attr(input, "value", &AttrValue::from("hi")).unwrap();
        tree.write_attr(input, "checked", &AttrValue::Bool(true)).unwrap();
        tree.write_attr(input, "autofocus", &AttrValue::Bool(true)).unwrap();

        assert_eq!(dom.attribute(input, "value"), None);
        assert_eq!(dom.attribute(input, "autofocus").as_deref(), Some(""));
        assert_eq!(dom.to_html(input), r#"<input autofocus="" :value="hi" :checked>"#);
    }

    #[test]
    fn clearing_resets_properties() {
        let mut dom = MemoryDom::new();
        let mut events = EventManager::new();
        let input = dom.create_element("input").unwrap();
        let mut tree = LiveTree::new(&mut dom, &mut events);
        tree.write_attr(input, "value", &AttrValue::from("hi")).unwrap();
        tree.write_attr(input, "disabled", &AttrValue::Bool(true)).unwrap();

        tree.clear_attr(input, "value").unwrap();
        tree.clear_attr(input, "disabled").unwrap();

        assert_eq!(dom.to_html(input), "<input>");
    }

    #[test]
    fn handler_attributes_go_to_the_table() {
        let mut dom = MemoryDom::new();
        let mut events = EventManager::new();
        let button = dom.create_element("button").unwrap();
        let mut tree = LiveTree::new(&mut dom, &mut events);

        tree.write_attr(button, "onClick", &AttrValue::handler(|_| {})).unwrap();
        tree.write_attr(button, "title", &AttrValue::handler(|_| {})).unwrap();

        assert!(events.has_handler(button, "click"));
        assert_eq!(events.handler_count(), 1);
        assert_eq!(dom.to_html(button), "<button></button>");

        let mut tree = LiveTree::new(&mut dom, &mut events);
        tree.clear_attr(button, "onClick").unwrap();
        assert_eq!(events.handler_count(), 0);
    }
}

//! [`Dom`] over the browser document

use js_sys::Reflect;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use tracing::{debug, trace};
use trellis_dom::{Dom, DomError, DomResult, NodeId, Property, PropertyName};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Node};

/// Property under which every node known to a [`WebDom`] carries its id.
pub(crate) const ID_PROPERTY: &str = "__trellisId";

/// Browser document backend.
///
/// Each node handed out gets its [`NodeId`] stored on the JS object, so a
/// delegated listener can map an event target back to it without a lookup
/// table. Nodes the backend did not create (a server-rendered container,
/// its placeholder children) are adopted the first time they are seen.
pub struct WebDom {
    document: Document,
    nodes: RefCell<HashMap<NodeId, Node>>,
    next_id: Cell<u64>,
}

/// Id stored on a JS node by a [`WebDom`], if any.
pub fn node_id_of(node: &JsValue) -> Option<NodeId> {
    Reflect::get(node, &JsValue::from_str(ID_PROPERTY))
        .ok()
        .and_then(|v| v.as_f64())
        .map(|raw| NodeId::new(raw as u64))
}

pub(crate) fn js_error(err: JsValue) -> DomError {
    DomError::Backend(
        err.as_string()
            .or_else(|| {
                err.dyn_ref::<js_sys::Error>()
                    .map(|e| String::from(e.message()))
            })
            .unwrap_or_else(|| format!("{err:?}")),
    )
}

impl WebDom {
    /// Backend over the document of the current window.
    pub fn new() -> DomResult<Self> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| DomError::Backend("no document available".to_string()))?;
        Ok(Self::from_document(document))
    }

    pub fn from_document(document: Document) -> Self {
        Self {
            document,
            nodes: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Id of an existing node, registering it if this backend has not seen
    /// it before.
    pub fn adopt(&self, node: &Node) -> NodeId {
        if let Some(id) = node_id_of(node) {
            if self.nodes.borrow().contains_key(&id) {
                return id;
            }
        }
        let id = NodeId::new(self.next_id.get() + 1);
        self.next_id.set(id.raw());
        if let Err(err) = Reflect::set(
            node,
            &JsValue::from_str(ID_PROPERTY),
            &JsValue::from_f64(id.raw() as f64),
        ) {
            debug!(%id, ?err, "could not tag node with its id");
        }
        self.nodes.borrow_mut().insert(id, node.clone());
        id
    }

    /// Adopt the element with the given `id` attribute as a render container.
    pub fn container(&self, element_id: &str) -> DomResult<NodeId> {
        let element = self
            .document
            .get_element_by_id(element_id)
            .ok_or_else(|| DomError::Backend(format!("no element with id `{element_id}`")))?;
        Ok(self.adopt(&element.into()))
    }

    /// The JS node behind an id.
    pub fn node(&self, id: NodeId) -> Option<Node> {
        self.nodes.borrow().get(&id).cloned()
    }

    fn get(&self, id: NodeId) -> DomResult<Node> {
        self.node(id).ok_or(DomError::UnknownNode(id))
    }

    fn element(&self, id: NodeId) -> DomResult<Element> {
        self.get(id)?
            .dyn_into::<Element>()
            .map_err(|_| DomError::Hierarchy(format!("{id} is not an element")))
    }
}

impl Dom for WebDom {
    fn create_element(&mut self, tag: &str) -> DomResult<NodeId> {
        let element = self.document.create_element(tag).map_err(js_error)?;
        trace!(tag, "created element");
        Ok(self.adopt(&element.into()))
    }

    fn create_text(&mut self, text: &str) -> DomResult<NodeId> {
        let node = self.document.create_text_node(text);
        Ok(self.adopt(&node.into()))
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes.borrow().contains_key(&node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.node(node)?.parent_node()?;
        node_id_of(&parent).filter(|id| self.contains(*id))
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        let Some(node) = self.node(node) else {
            return Vec::new();
        };
        let list = node.child_nodes();
        (0..list.length())
            .filter_map(|i| list.get(i))
            .map(|child| self.adopt(&child))
            .collect()
    }

    fn tag(&self, node: NodeId) -> Option<String> {
        self.node(node)?
            .dyn_ref::<Element>()
            .map(|el| el.tag_name().to_lowercase())
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        let parent = self.get(parent)?;
        let child = self.get(child)?;
        let reference = reference.map(|r| self.get(r)).transpose()?;
        parent
            .insert_before(&child, reference.as_ref())
            .map(drop)
            .map_err(js_error)
    }

    fn replace_child(&mut self, parent: NodeId, new: NodeId, old: NodeId) -> DomResult<()> {
        let parent = self.get(parent)?;
        parent
            .replace_child(&self.get(new)?, &self.get(old)?)
            .map(drop)
            .map_err(js_error)
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let parent_node = self.get(parent)?;
        let child_node = self.get(child)?;
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        parent_node
            .remove_child(&child_node)
            .map(drop)
            .map_err(js_error)
    }

    fn text(&self, node: NodeId) -> Option<String> {
        let node = self.node(node)?;
        (node.node_type() == Node::TEXT_NODE).then(|| node.node_value().unwrap_or_default())
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> DomResult<()> {
        let target = self.get(node)?;
        if target.node_type() == Node::ELEMENT_NODE {
            for child in self.children(node) {
                self.discard(child);
            }
        }
        target.set_text_content(Some(text));
        Ok(())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node).ok()?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.element(node)?
            .set_attribute(name, value)
            .map_err(js_error)
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> DomResult<()> {
        self.element(node)?.remove_attribute(name).map_err(js_error)
    }

    fn property(&self, node: NodeId, name: PropertyName) -> Option<Property> {
        let element = self.element(node).ok()?;
        let value = Reflect::get(&element, &JsValue::from_str(name.as_str())).ok()?;
        match name {
            PropertyName::Value => value.as_string().map(Property::Value),
            PropertyName::Checked => value.as_bool().map(Property::Checked),
            PropertyName::Disabled => value.as_bool().map(Property::Disabled),
        }
    }

    fn set_property(&mut self, node: NodeId, property: &Property) -> DomResult<()> {
        let element = self.element(node)?;
        let value = match property {
            Property::Value(v) => JsValue::from_str(v),
            Property::Checked(b) | Property::Disabled(b) => JsValue::from_bool(*b),
        };
        Reflect::set(&element, &JsValue::from_str(property.name().as_str()), &value)
            .map(drop)
            .map_err(js_error)
    }

    fn discard(&mut self, node: NodeId) {
        let Some(root) = self.node(node) else {
            return;
        };
        if let Some(parent) = root.parent_node() {
            if let Err(err) = parent.remove_child(&root) {
                debug!(%node, ?err, "detach on discard failed");
            }
        }
        let mut stack = vec![root];
        let mut nodes = self.nodes.borrow_mut();
        while let Some(current) = stack.pop() {
            if let Some(id) = node_id_of(&current) {
                nodes.remove(&id);
            }
            let list = current.child_nodes();
            stack.extend((0..list.length()).filter_map(|i| list.get(i)));
        }
    }
}

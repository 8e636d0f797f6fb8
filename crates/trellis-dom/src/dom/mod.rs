//! The live-document seam
//!
//! Everything the framework does to a document goes through [`Dom`]. Nodes
//! are addressed by [`NodeId`], a small copyable handle the backend hands
//! out on creation and keeps stable for the lifetime of the node.

mod memory;

pub use memory::MemoryDom;

use crate::attr::AttrValue;
use crate::error::DomResult;
use std::fmt;

/// Stable identity of a live node within one [`Dom`] backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Wrap a backend-specific raw id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element state that lives on the node object rather than in its
/// attributes.
///
/// Browsers stop reflecting these attributes into the live state as soon
/// as the user interacts with the control, so the framework always writes
/// the property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyName {
    Value,
    Checked,
    Disabled,
}

/// A property together with its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    Value(String),
    Checked(bool),
    Disabled(bool),
}

impl PropertyName {
    /// The property an attribute name maps to, if any.
    pub fn from_attr(name: &str) -> Option<Self> {
        match name {
            "value" => Some(Self::Value),
            "checked" => Some(Self::Checked),
            "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Checked => "checked",
            Self::Disabled => "disabled",
        }
    }

    /// Property value for an attribute value under this name.
    ///
    /// Strings written to boolean properties follow DOM truthiness: any
    /// non-empty string is `true`. Handlers carry no property value.
    pub fn with(self, value: &AttrValue) -> Option<Property> {
        match (self, value) {
            (_, AttrValue::Handler(_)) => None,
            (Self::Value, AttrValue::Static(s)) => Some(Property::Value(s.clone())),
            (Self::Value, AttrValue::Bool(b)) => Some(Property::Value(b.to_string())),
            (Self::Checked, AttrValue::Static(s)) => Some(Property::Checked(!s.is_empty())),
            (Self::Checked, AttrValue::Bool(b)) => Some(Property::Checked(*b)),
            (Self::Disabled, AttrValue::Static(s)) => Some(Property::Disabled(!s.is_empty())),
            (Self::Disabled, AttrValue::Bool(b)) => Some(Property::Disabled(*b)),
        }
    }

    /// The value a property takes when its attribute disappears.
    pub fn cleared(self) -> Property {
        match self {
            Self::Value => Property::Value(String::new()),
            Self::Checked => Property::Checked(false),
            Self::Disabled => Property::Disabled(false),
        }
    }
}

impl Property {
    pub fn name(&self) -> PropertyName {
        match self {
            Self::Value(_) => PropertyName::Value,
            Self::Checked(_) => PropertyName::Checked,
            Self::Disabled(_) => PropertyName::Disabled,
        }
    }
}

/// A mutable document tree.
///
/// Query methods answer `None`/empty for unknown nodes. Mutations return
/// [`DomError`](crate::DomError) for unknown nodes and invalid hierarchies,
/// mirroring what a browser would throw.
pub trait Dom {
    fn create_element(&mut self, tag: &str) -> DomResult<NodeId>;

    fn create_text(&mut self, text: &str) -> DomResult<NodeId>;

    /// Whether the node is still known to the backend.
    fn contains(&self, node: NodeId) -> bool;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Child nodes in document order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Tag name of an element, `None` for text nodes.
    fn tag(&self, node: NodeId) -> Option<String>;

    /// Insert `child` before `reference`, or at the end when `reference` is
    /// `None`. A child that already has a parent is moved.
    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()>;

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Put `new` where `old` is and detach `old`.
    fn replace_child(&mut self, parent: NodeId, new: NodeId, old: NodeId) -> DomResult<()>;

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()>;

    /// Text content of a text node, `None` for elements.
    fn text(&self, node: NodeId) -> Option<String>;

    fn set_text(&mut self, node: NodeId, text: &str) -> DomResult<()>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()>;

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> DomResult<()>;

    fn property(&self, node: NodeId, name: PropertyName) -> Option<Property>;

    fn set_property(&mut self, node: NodeId, property: &Property) -> DomResult<()>;

    /// Forget a detached subtree. Backends that garbage collect can ignore
    /// this.
    fn discard(&mut self, _node: NodeId) {}
}

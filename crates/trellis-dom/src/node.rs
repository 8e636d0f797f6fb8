//! Node descriptions and builders

use crate::attr::{handler_attr, AttrValue, Attrs};
use crate::event::{Callback, DomEvent};
use std::fmt;
use tracing::warn;

/// Attribute name that sets [`Element::key`] instead of an attribute.
pub const KEY_ATTR: &str = "key";

/// Opt-in identity of a list item.
///
/// Never written to the DOM. Two elements with different keys are never
/// patched into each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self(s)
    }
}

macro_rules! key_from_number {
    ($($t:ty),*) => {
        $(impl From<$t> for Key {
            fn from(n: $t) -> Self {
                Self(n.to_string())
            }
        })*
    };
}

key_from_number!(i32, i64, u32, u64, usize);

/// Immutable description of a piece of UI.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Element(Element),
}

/// Description of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub key: Option<Key>,
    pub attrs: Attrs,
    pub children: Vec<Node>,
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        }
    }

    pub fn key(&self) -> Option<&Key> {
        self.as_element().and_then(|el| el.key.as_ref())
    }

    /// Number of nodes in this tree, including itself.
    pub fn size(&self) -> usize {
        match self {
            Node::Text(_) => 1,
            Node::Element(el) => 1 + el.children.iter().map(Node::size).sum::<usize>(),
        }
    }

    /// Number of handler attributes in this tree.
    pub fn handler_count(&self) -> usize {
        match self {
            Node::Text(_) => 0,
            Node::Element(el) => {
                el.attrs
                    .iter()
                    .filter(|(_, v)| matches!(v, AttrValue::Handler(_)))
                    .count()
                    + el.children.iter().map(Node::handler_count).sum::<usize>()
            }
        }
    }
}

/// Anything that can appear in a child list.
///
/// `None` and empty text are dropped when the list is built, which lets
/// conditional children be written inline as `cond.then(|| ...)`.
pub trait IntoChild {
    fn into_child(self) -> Option<Node>;
}

impl IntoChild for Node {
    fn into_child(self) -> Option<Node> {
        match self {
            Node::Text(t) if t.is_empty() => None,
            node => Some(node),
        }
    }
}

impl IntoChild for Element {
    fn into_child(self) -> Option<Node> {
        Some(Node::Element(self))
    }
}

impl<T: IntoChild> IntoChild for Option<T> {
    fn into_child(self) -> Option<Node> {
        self.and_then(IntoChild::into_child)
    }
}

impl IntoChild for &str {
    fn into_child(self) -> Option<Node> {
        Node::from(self).into_child()
    }
}

impl IntoChild for String {
    fn into_child(self) -> Option<Node> {
        Node::from(self).into_child()
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Text(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Text(s)
    }
}

macro_rules! text_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Node {
                fn from(n: $t) -> Self {
                    Node::Text(n.to_string())
                }
            }

            impl IntoChild for $t {
                fn into_child(self) -> Option<Node> {
                    Some(Node::from(self))
                }
            }
        )*
    };
}

text_from_number!(i32, i64, u32, u64, usize, f64);

/// Text node.
pub fn text(s: impl Into<String>) -> Node {
    Node::Text(s.into())
}

/// Element description from a tag, attributes and children.
///
/// ```
/// use trellis_dom::{h, text, AttrValue};
///
/// let node = h(
///     "li",
///     [("class", AttrValue::from("completed"))],
///     [text("buy milk")],
/// );
/// assert_eq!(node.size(), 2);
/// ```
pub fn h<K, V>(
    tag: impl Into<String>,
    attrs: impl IntoIterator<Item = (K, V)>,
    children: impl IntoIterator<Item = impl IntoChild>,
) -> Node
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    attrs
        .into_iter()
        .fold(Element::new(tag), |element, (name, value)| element.attr(name, value))
        .children(children)
        .build()
}

/// Start building an element.
pub fn el(tag: impl Into<String>) -> Element {
    Element::new(tag)
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            key: None,
            attrs: Attrs::new(),
            children: Vec::new(),
        }
    }

    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set an attribute. A string under [`KEY_ATTR`] becomes the identity
    /// key and is never stored as an attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        let name = name.into();
        let value = value.into();
        if name != KEY_ATTR {
            self.attrs.insert(name, value);
            return self;
        }
        match value {
            AttrValue::Static(key) => self.key = Some(Key(key)),
            _ => warn!(tag = %self.tag, "non-string `key` attribute ignored"),
        }
        self
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        self.attr("class", AttrValue::Static(class.into()))
    }

    /// Boolean attribute or property (`checked`, `disabled`, `autofocus`).
    pub fn flag(self, name: impl Into<String>, on: bool) -> Self {
        self.attr(name, AttrValue::Bool(on))
    }

    /// Handler for `event_type`, stored under the `on<type>` attribute.
    pub fn on(self, event_type: &str, handler: impl Fn(&DomEvent) + 'static) -> Self {
        self.on_callback(event_type, Callback::new(handler))
    }

    pub fn on_callback(self, event_type: &str, handler: Callback) -> Self {
        self.attr(handler_attr(event_type), AttrValue::Handler(handler))
    }

    pub fn child(mut self, child: impl IntoChild) -> Self {
        self.children.extend(child.into_child());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = impl IntoChild>) -> Self {
        self.children
            .extend(children.into_iter().filter_map(IntoChild::into_child));
        self
    }

    pub fn build(self) -> Node {
        Node::Element(self)
    }
}

//! Attribute values and attribute maps

use crate::event::{Callback, DomEvent};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Value of one attribute in a node description.
///
/// A closed set: plain string attributes, booleans (written as live
/// properties for `checked`/`disabled`, as presence attributes otherwise)
/// and event handlers under `on*` names.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Static(String),
    Bool(bool),
    Handler(Callback),
}

impl AttrValue {
    pub fn handler(f: impl Fn(&DomEvent) + 'static) -> Self {
        Self::Handler(Callback::new(f))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Static(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&Callback> {
        match self {
            Self::Handler(cb) => Some(cb),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Static(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Static(s)
    }
}

impl From<&String> for AttrValue {
    fn from(s: &String) -> Self {
        Self::Static(s.clone())
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Callback> for AttrValue {
    fn from(cb: Callback) -> Self {
        Self::Handler(cb)
    }
}

macro_rules! attr_from_number {
    ($($t:ty),*) => {
        $(impl From<$t> for AttrValue {
            fn from(n: $t) -> Self {
                Self::Static(n.to_string())
            }
        })*
    };
}

attr_from_number!(i32, i64, u32, u64, usize, f64);

/// Event type named by a handler attribute: `onClick` -> `click`.
///
/// `None` when the name does not start with `on` or nothing follows it.
pub fn event_type(attr_name: &str) -> Option<String> {
    attr_name
        .strip_prefix("on")
        .filter(|rest| !rest.is_empty())
        .map(str::to_lowercase)
}

/// Attribute name for a handler of `event_type`: `click` -> `onclick`.
pub fn handler_attr(event_type: &str) -> String {
    format!("on{}", event_type.to_lowercase())
}

/// Ordered attribute map of an element description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attrs(BTreeMap<String, AttrValue>);

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, AttrValue> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for Attrs
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Attrs {
    type Item = (&'a String, &'a AttrValue);
    type IntoIter = btree_map::Iter<'a, String, AttrValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

//! Proptest strategies for diff/patch property tests
//!
//! Trees are kept small and shallow: a handful of tags, a closed set of
//! attribute names that covers plain attributes, live properties, boolean
//! attributes and handlers, and fully keyed lists so both reconcile modes
//! get exercised.

use crate::attr::{AttrValue, Attrs};
use crate::diff::Differ;
use crate::node::{el, Element, Node};
use proptest::prelude::*;
use trellis_config::ReconcileMode;

pub fn arb_tag() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["div", "span", "ul", "li", "p", "button"])
}

/// Non-empty lowercase text.
pub fn arb_text() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

/// One attribute, weighted towards names with special handling.
pub fn arb_attr() -> impl Strategy<Value = (String, AttrValue)> {
    prop_oneof![
        2 => "[a-z]{0,5}".prop_map(|v| ("class".to_string(), AttrValue::Static(v))),
        1 => "[a-z]{1,5}".prop_map(|v| ("title".to_string(), AttrValue::Static(v))),
        2 => "[a-z]{0,5}".prop_map(|v| ("value".to_string(), AttrValue::Static(v))),
        2 => any::<bool>().prop_map(|b| ("checked".to_string(), AttrValue::Bool(b))),
        1 => any::<bool>().prop_map(|b| ("disabled".to_string(), AttrValue::Bool(b))),
        1 => any::<bool>().prop_map(|b| ("hidden".to_string(), AttrValue::Bool(b))),
        2 => Just(()).prop_map(|_| ("onclick".to_string(), AttrValue::handler(|_| {}))),
        1 => Just(()).prop_map(|_| ("oninput".to_string(), AttrValue::handler(|_| {}))),
    ]
}

pub fn arb_attrs() -> impl Strategy<Value = Attrs> {
    prop::collection::vec(arb_attr(), 0..4).prop_map(|attrs| attrs.into_iter().collect())
}

fn element(tag: &str, attrs: Attrs, children: Vec<Node>) -> Node {
    Node::Element(Element {
        tag: tag.to_string(),
        key: None,
        attrs,
        children,
    })
}

/// `ul` of uniquely keyed items in random order.
pub fn arb_keyed_list() -> impl Strategy<Value = Node> {
    prop::collection::btree_set(0u32..10, 0..7)
        .prop_map(|keys| keys.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
        .prop_flat_map(|keys| {
            let n = keys.len();
            (
                Just(keys),
                prop::collection::vec((arb_tag(), arb_attrs(), arb_text()), n),
            )
        })
        .prop_map(|(keys, items)| {
            el("ul")
                .children(keys.into_iter().zip(items).map(|(key, (tag, attrs, label))| {
                    let mut item = el(tag).key(key).child(label);
                    item.attrs = attrs;
                    item
                }))
                .build()
        })
}

/// Bounded-depth node tree.
pub fn arb_node() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![
        3 => arb_text().prop_map(Node::Text),
        1 => (arb_tag(), arb_attrs()).prop_map(|(tag, attrs)| element(tag, attrs, Vec::new())),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            3 => (arb_tag(), arb_attrs(), prop::collection::vec(inner, 0..4))
                .prop_map(|(tag, attrs, children)| element(tag, attrs, children)),
            1 => arb_keyed_list(),
        ]
    })
}

/// Root element wrapping an arbitrary tree, so renders never replace the
/// mounted node's kind.
pub fn arb_root() -> impl Strategy<Value = Node> {
    (arb_attrs(), prop::collection::vec(arb_node(), 0..4))
        .prop_map(|(attrs, children)| element("main", attrs, children))
}

pub fn arb_differ() -> impl Strategy<Value = Differ> {
    prop_oneof![
        Just(Differ::new(ReconcileMode::Positional)),
        Just(Differ::new(ReconcileMode::Keyed)),
    ]
}

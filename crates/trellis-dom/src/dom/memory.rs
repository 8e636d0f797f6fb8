use super::{Dom, NodeId, Property, PropertyName};
use crate::error::{DomError, DomResult};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

#[derive(Debug, Clone)]
struct MemNode {
    parent: Option<NodeId>,
    kind: MemKind,
}

#[derive(Debug, Clone)]
enum MemKind {
    Text(String),
    Element(MemElement),
}

#[derive(Debug, Clone, Default)]
struct MemElement {
    tag: String,
    attributes: BTreeMap<String, String>,
    children: Vec<NodeId>,
    value: String,
    checked: bool,
    disabled: bool,
}

/// In-process document.
///
/// Behaves like a browser DOM for everything the framework touches:
/// attributes and live properties are separate, moving an attached node
/// detaches it from its old parent, and a node cannot be inserted into its
/// own subtree.
#[derive(Debug, Default)]
pub struct MemoryDom {
    nodes: HashMap<NodeId, MemNode>,
    next_id: u64,
    created: usize,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached element to render into.
    pub fn create_container(&mut self, tag: &str) -> NodeId {
        self.insert(MemKind::Element(MemElement {
            tag: tag.to_string(),
            ..Default::default()
        }))
    }

    /// Number of live (not discarded) nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes ever created, including discarded ones.
    pub fn created_count(&self) -> usize {
        self.created
    }

    /// Serialize a node and its subtree.
    ///
    /// Attributes are written as in `outerHTML`. Live properties that
    /// differ from their defaults follow the attributes in binding syntax:
    /// `:value="..."`, `:checked`, `:disabled`.
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    /// Serialize the children of a node, like `innerHTML`.
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_html(child, &mut out);
        }
        out
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, node: NodeId) -> String {
        match self.nodes.get(&node).map(|n| &n.kind) {
            Some(MemKind::Text(t)) => t.clone(),
            Some(MemKind::Element(el)) => el
                .children
                .iter()
                .map(|c| self.text_content(*c))
                .collect(),
            None => String::new(),
        }
    }

    /// Descendants of `root` (including `root`) in document order that
    /// satisfy `pred`.
    pub fn find_all(&self, root: NodeId, pred: impl Fn(&Self, NodeId) -> bool) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if !self.contains(node) {
                continue;
            }
            if pred(self, node) {
                found.push(node);
            }
            stack.extend(self.children(node).into_iter().rev());
        }
        found
    }

    /// Elements under `root` whose `class` attribute contains `class`.
    pub fn query_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.find_all(root, |dom, node| {
            dom.attribute(node, "class")
                .is_some_and(|c| c.split_whitespace().any(|c| c == class))
        })
    }

    /// Elements under `root` with the given tag name.
    pub fn query_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.find_all(root, |dom, node| dom.tag(node).as_deref() == Some(tag))
    }

    fn insert(&mut self, kind: MemKind) -> NodeId {
        self.next_id += 1;
        self.created += 1;
        let id = NodeId::new(self.next_id);
        self.nodes.insert(id, MemNode { parent: None, kind });
        id
    }

    fn node(&self, id: NodeId) -> DomResult<&MemNode> {
        self.nodes.get(&id).ok_or(DomError::UnknownNode(id))
    }

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut MemElement> {
        match self.nodes.get_mut(&id) {
            Some(MemNode {
                kind: MemKind::Element(el),
                ..
            }) => Ok(el),
            Some(_) => Err(DomError::Hierarchy(format!("{id} is a text node"))),
            None => Err(DomError::UnknownNode(id)),
        }
    }

    fn element(&self, id: NodeId) -> Option<&MemElement> {
        match self.nodes.get(&id) {
            Some(MemNode {
                kind: MemKind::Element(el),
                ..
            }) => Some(el),
            _ => None,
        }
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.parent(node) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.nodes.get_mut(&child).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Ok(el) = self.element_mut(parent) {
            el.children.retain(|c| *c != child);
        }
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        match self.nodes.get(&node).map(|n| &n.kind) {
            Some(MemKind::Text(t)) => escape_into(t, false, out),
            Some(MemKind::Element(el)) => {
                let _ = write!(out, "<{}", el.tag);
                for (name, value) in &el.attributes {
                    let _ = write!(out, " {name}=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
                if !el.value.is_empty() {
                    out.push_str(" :value=\"");
                    escape_into(&el.value, true, out);
                    out.push('"');
                }
                if el.checked {
                    out.push_str(" :checked");
                }
                if el.disabled {
                    out.push_str(" :disabled");
                }
                out.push('>');
                if is_void(&el.tag) && el.children.is_empty() {
                    return;
                }
                for child in &el.children {
                    self.write_html(*child, out);
                }
                let _ = write!(out, "</{}>", el.tag);
            }
            None => {}
        }
    }
}

fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta" | "source"
    )
}

fn escape_into(s: &str, attribute: bool, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

impl Dom for MemoryDom {
    fn create_element(&mut self, tag: &str) -> DomResult<NodeId> {
        if tag.is_empty() {
            return Err(DomError::Backend("empty tag name".to_string()));
        }
        Ok(self.create_container(tag))
    }

    fn create_text(&mut self, text: &str) -> DomResult<NodeId> {
        Ok(self.insert(MemKind::Text(text.to_string())))
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.element(node)
            .map(|el| el.children.clone())
            .unwrap_or_default()
    }

    fn tag(&self, node: NodeId) -> Option<String> {
        self.element(node).map(|el| el.tag.clone())
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        self.node(child)?;
        self.element_mut(parent)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::Hierarchy(format!(
                "cannot insert {child} into its own subtree"
            )));
        }
        if let Some(reference) = reference {
            if reference == child {
                return Ok(());
            }
            if self.parent(reference) != Some(parent) {
                return Err(DomError::NotAChild {
                    parent,
                    child: reference,
                });
            }
        }

        self.detach(child);
        let el = self.element_mut(parent)?;
        let index = reference
            .and_then(|r| el.children.iter().position(|c| *c == r))
            .unwrap_or(el.children.len());
        el.children.insert(index, child);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        Ok(())
    }

    fn replace_child(&mut self, parent: NodeId, new: NodeId, old: NodeId) -> DomResult<()> {
        if new == old {
            return Ok(());
        }
        if self.parent(old) != Some(parent) {
            return Err(DomError::NotAChild { parent, child: old });
        }
        self.insert_before(parent, new, Some(old))?;
        self.detach(old);
        Ok(())
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child);
        Ok(())
    }

    fn text(&self, node: NodeId) -> Option<String> {
        match self.nodes.get(&node).map(|n| &n.kind) {
            Some(MemKind::Text(t)) => Some(t.clone()),
            _ => None,
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> DomResult<()> {
        match self.nodes.get_mut(&node).map(|n| &mut n.kind) {
            Some(MemKind::Text(t)) => {
                *t = text.to_string();
                Ok(())
            }
            Some(MemKind::Element(el)) => {
                // Same as assigning textContent on an element.
                let children = std::mem::take(&mut el.children);
                for child in children {
                    self.discard(child);
                }
                if !text.is_empty() {
                    let text_node = self.insert(MemKind::Text(text.to_string()));
                    self.append_child(node, text_node)?;
                }
                Ok(())
            }
            None => Err(DomError::UnknownNode(node)),
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node).and_then(|el| el.attributes.get(name).cloned())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.element_mut(node)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> DomResult<()> {
        self.element_mut(node)?.attributes.remove(name);
        Ok(())
    }

    fn property(&self, node: NodeId, name: PropertyName) -> Option<Property> {
        let el = self.element(node)?;
        Some(match name {
            PropertyName::Value => Property::Value(el.value.clone()),
            PropertyName::Checked => Property::Checked(el.checked),
            PropertyName::Disabled => Property::Disabled(el.disabled),
        })
    }

    fn set_property(&mut self, node: NodeId, property: &Property) -> DomResult<()> {
        let el = self.element_mut(node)?;
        match property {
            Property::Value(v) => el.value = v.clone(),
            Property::Checked(b) => el.checked = *b,
            Property::Disabled(b) => el.disabled = *b,
        }
        Ok(())
    }

    fn discard(&mut self, node: NodeId) {
        self.detach(node);
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(removed) = self.nodes.remove(&id) {
                if let MemKind::Element(el) = removed.kind {
                    stack.extend(el.children);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn div_with_text(dom: &mut MemoryDom, text: &str) -> NodeId {
        let div = dom.create_element("div").unwrap();
        let t = dom.create_text(text).unwrap();
        dom.append_child(div, t).unwrap();
        div
    }

    #[test]
    fn serializes_attributes_and_properties() {
        let mut dom = MemoryDom::new();
        let input = dom.create_element("input").unwrap();
        dom.set_attribute(input, "type", "checkbox").unwrap();
        dom.set_attribute(input, "class", "toggle").unwrap();
        dom.set_property(input, &Property::Checked(true)).unwrap();

        assert_eq!(
            dom.to_html(input),
            r#"<input class="toggle" type="checkbox" :checked>"#
        );
    }

    #[test]
    fn escapes_text_and_attributes() {
        let mut dom = MemoryDom::new();
        let div = div_with_text(&mut dom, "a < b & c");
        dom.set_attribute(div, "title", "say \"hi\"").unwrap();

        assert_eq!(
            dom.to_html(div),
            r#"<div title="say &quot;hi&quot;">a &lt; b &amp; c</div>"#
        );
    }

    #[test]
    fn appending_attached_node_moves_it() {
        let mut dom = MemoryDom::new();
        let a = dom.create_element("ul").unwrap();
        let b = dom.create_element("ol").unwrap();
        let li = dom.create_element("li").unwrap();
        dom.append_child(a, li).unwrap();
        dom.append_child(b, li).unwrap();

        assert!(dom.children(a).is_empty());
        assert_eq!(dom.children(b), vec![li]);
        assert_eq!(dom.parent(li), Some(b));
    }

    #[test]
    fn insert_before_reference() {
        let mut dom = MemoryDom::new();
        let ul = dom.create_element("ul").unwrap();
        let first = dom.create_element("li").unwrap();
        let second = dom.create_element("li").unwrap();
        dom.append_child(ul, second).unwrap();
        dom.insert_before(ul, first, Some(second)).unwrap();

        assert_eq!(dom.children(ul), vec![first, second]);
    }

    #[test]
    fn rejects_cycles() {
        let mut dom = MemoryDom::new();
        let outer = dom.create_element("div").unwrap();
        let inner = dom.create_element("div").unwrap();
        dom.append_child(outer, inner).unwrap();

        let err = dom.append_child(inner, outer).unwrap_err();
        assert!(matches!(err, DomError::Hierarchy(_)));
    }

    #[test]
    fn text_nodes_cannot_have_children() {
        let mut dom = MemoryDom::new();
        let text = dom.create_text("x").unwrap();
        let span = dom.create_element("span").unwrap();

        assert!(dom.append_child(text, span).is_err());
    }

    #[test]
    fn replace_child_keeps_position() {
        let mut dom = MemoryDom::new();
        let ul = dom.create_element("ul").unwrap();
        let items: Vec<_> = (0..3).map(|_| dom.create_element("li").unwrap()).collect();
        for item in &items {
            dom.append_child(ul, *item).unwrap();
        }
        let replacement = dom.create_element("p").unwrap();
        dom.replace_child(ul, replacement, items[1]).unwrap();

        assert_eq!(dom.children(ul), vec![items[0], replacement, items[2]]);
        assert_eq!(dom.parent(items[1]), None);
    }

    #[test]
    fn remove_child_requires_parent_relation() {
        let mut dom = MemoryDom::new();
        let ul = dom.create_element("ul").unwrap();
        let li = dom.create_element("li").unwrap();

        let err = dom.remove_child(ul, li).unwrap_err();
        assert_eq!(err, DomError::NotAChild { parent: ul, child: li });
    }

    #[test]
    fn discard_frees_whole_subtree() {
        let mut dom = MemoryDom::new();
        let root = dom.create_container("main");
        let div = div_with_text(&mut dom, "bye");
        dom.append_child(root, div).unwrap();
        assert_eq!(dom.node_count(), 3);

        dom.discard(div);

        assert_eq!(dom.node_count(), 1);
        assert!(dom.children(root).is_empty());
        assert_eq!(dom.created_count(), 3);
    }

    #[test]
    fn set_text_on_element_replaces_children() {
        let mut dom = MemoryDom::new();
        let div = div_with_text(&mut dom, "old");
        let old_text = dom.children(div)[0];
        dom.set_text(div, "new").unwrap();

        assert_eq!(dom.inner_html(div), "new");
        assert!(!dom.contains(old_text));
        assert_eq!(dom.node_count(), 2);

        dom.set_text(div, "").unwrap();
        assert_eq!(dom.node_count(), 1);
    }

    #[test]
    fn queries_by_class_and_tag_in_document_order() {
        let mut dom = MemoryDom::new();
        let ul = dom.create_element("ul").unwrap();
        let a = dom.create_element("li").unwrap();
        let b = dom.create_element("li").unwrap();
        dom.set_attribute(a, "class", "completed item").unwrap();
        dom.set_attribute(b, "class", "item").unwrap();
        dom.append_child(ul, a).unwrap();
        dom.append_child(ul, b).unwrap();

        assert_eq!(dom.query_class(ul, "item"), vec![a, b]);
        assert_eq!(dom.query_class(ul, "completed"), vec![a]);
        assert_eq!(dom.query_tag(ul, "li"), vec![a, b]);
    }

    #[test]
    fn property_and_attribute_are_independent() {
        let mut dom = MemoryDom::new();
        let input = dom.create_element("input").unwrap();
        dom.set_attribute(input, "value", "attr").unwrap();
        dom.set_property(input, &Property::Value("live".into())).unwrap();

        assert_eq!(dom.attribute(input, "value").as_deref(), Some("attr"));
        assert_eq!(
            dom.property(input, PropertyName::Value),
            Some(Property::Value("live".into()))
        );
    }
}

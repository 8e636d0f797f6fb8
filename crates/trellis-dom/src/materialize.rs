use crate::dom::{Dom, NodeId};
use crate::error::DomResult;
use crate::node::{Element, Node};
use crate::tree::LiveTree;
use tracing::trace;

impl<D: Dom> LiveTree<'_, D> {
    /// Build live nodes for a description, registering its handlers.
    ///
    /// The result is detached; the caller inserts it. On failure nothing
    /// created by this call is left behind.
    pub fn materialize(&mut self, node: &Node) -> DomResult<NodeId> {
        match node {
            Node::Text(text) => self.dom.create_text(text),
            Node::Element(el) => {
                let id = self.dom.create_element(&el.tag)?;
                if let Err(err) = self.fill(id, el) {
                    self.events.release_subtree(&*self.dom, id);
                    self.dom.discard(id);
                    return Err(err);
                }
                trace!(tag = %el.tag, node = %id, "materialized element");
                Ok(id)
            }
        }
    }

    fn fill(&mut self, id: NodeId, el: &Element) -> DomResult<()> {
        // Children first so a `value` written afterwards can select among
        // them.
        for child in &el.children {
            let child_id = self.materialize(child)?;
            self.dom.append_child(id, child_id)?;
        }
        for (name, value) in &el.attrs {
            self.write_attr(id, name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::{Dom, MemoryDom};
    use crate::events::EventManager;
    use crate::node::{el, text};
    use crate::tree::LiveTree;

    #[test]
    fn builds_elements_text_and_handlers() {
        let mut dom = MemoryDom::new();
        let mut events = EventManager::new();
        let node = el("li")
            .key(1)
            .class("completed")
            .child(
                el("input")
                    .class("toggle")
                    .attr("type", "checkbox")
                    .flag("checked", true)
                    .on("change", |_| {}),
            )
            .child(el("label").child("Buy milk"))
            .build();

        let id = LiveTree::new(&mut dom, &mut events)
            .materialize(&node)
            .unwrap();

        insta::assert_snapshot!(
            dom.to_html(id),
            @r#"<li class="completed"><input class="toggle" type="checkbox" :checked><label>Buy milk</label></li>"#
        );
        assert_eq!(events.handler_count(), 1);
        assert_eq!(dom.parent(id), None);
    }

    #[test]
    fn text_node() {
        let mut dom = MemoryDom::new();
        let mut events = EventManager::new();
        let id = LiveTree::new(&mut dom, &mut events)
            .materialize(&text("hello"))
            .unwrap();

        assert_eq!(dom.text(id).as_deref(), Some("hello"));
    }

    #[test]
    fn failure_leaves_nothing_behind() {
        let mut dom = MemoryDom::new();
        let mut events = EventManager::new();
        let node = el("div")
            .on("click", |_| {})
            .child(el("span").on("click", |_| {}))
            .child(el(""))
            .build();

        let result = LiveTree::new(&mut dom, &mut events).materialize(&node);

        assert!(result.is_err());
        assert_eq!(dom.node_count(), 0);
        assert_eq!(events.handler_count(), 0);
    }
}

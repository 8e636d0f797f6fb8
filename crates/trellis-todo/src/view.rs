//! TodoMVC markup

use crate::state::{Filter, Todo, TodoState};
use trellis_dom::{el, Component, DomEvent, Element, Node, Store};

/// Renders [`TodoState`] as the TodoMVC page. Every handler writes back to
/// the store it was built with.
#[derive(Clone)]
pub struct TodoView {
    store: Store<TodoState>,
}

impl TodoView {
    pub fn new(store: Store<TodoState>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store<TodoState> {
        &self.store
    }

    fn header(&self, state: &TodoState) -> Element {
        let on_input = self.store.clone();
        let on_enter = self.store.clone();

        el("header").class("header").child(el("h1").child("todos")).child(
            el("input")
                .class("new-todo")
                .attr("placeholder", "What needs to be done?")
                .flag("autofocus", true)
                .attr("value", state.draft.as_str())
                .on("input", move |e: &DomEvent| {
                    let value = e.value().unwrap_or_default().to_string();
                    on_input.update(|s| s.draft = value);
                })
                .on("keydown", move |e: &DomEvent| {
                    if e.key() != Some("Enter") {
                        return;
                    }
                    let text = e.value().unwrap_or_default().to_string();
                    on_enter.update(|s| {
                        if s.add(&text).is_some() {
                            s.draft.clear();
                        }
                    });
                }),
        )
    }

    fn main_section(&self, state: &TodoState) -> Option<Element> {
        let visible: Vec<&Todo> = state.visible().collect();
        if visible.is_empty() {
            return None;
        }
        let toggle_all = self.store.clone();

        Some(
            el("section")
                .class("main")
                .child(
                    el("input")
                        .attr("id", "toggle-all")
                        .class("toggle-all")
                        .attr("type", "checkbox")
                        .flag("checked", state.all_completed())
                        .on("change", move |_: &DomEvent| toggle_all.update(TodoState::toggle_all)),
                )
                .child(
                    el("label")
                        .attr("for", "toggle-all")
                        .child("Mark all as complete"),
                )
                .child(
                    el("ul")
                        .class("todo-list")
                        .children(visible.into_iter().map(|t| self.item(t, state.editing))),
                ),
        )
    }

    fn item(&self, todo: &Todo, editing: Option<u64>) -> Element {
        let id = todo.id;
        let is_editing = editing == Some(id);

        let classes: Vec<&str> = [
            todo.completed.then_some("completed"),
            is_editing.then_some("editing"),
        ]
        .into_iter()
        .flatten()
        .collect();

        let mut li = el("li").key(id).attr("data-todo-id", id);
        if !classes.is_empty() {
            li = li.class(classes.join(" "));
        }

        let toggle = self.store.clone();
        let begin = self.store.clone();
        let destroy = self.store.clone();
        li = li.child(
            el("div")
                .class("view")
                .child(
                    el("input")
                        .class("toggle")
                        .attr("type", "checkbox")
                        .flag("checked", todo.completed)
                        .on("change", move |_: &DomEvent| toggle.update(|s| s.toggle(id))),
                )
                .child(
                    el("label")
                        .on("dblclick", move |_: &DomEvent| begin.update(|s| s.begin_edit(id)))
                        .child(todo.text.as_str()),
                )
                .child(
                    el("button")
                        .class("destroy")
                        .on("click", move |_: &DomEvent| destroy.update(|s| s.destroy(id))),
                ),
        );

        if is_editing {
            li = li.child(self.edit_input(todo));
        }
        li
    }

    fn edit_input(&self, todo: &Todo) -> Element {
        let on_key = self.store.clone();
        let on_blur = self.store.clone();

        el("input")
            .class("edit")
            .attr("value", todo.text.as_str())
            .on("keydown", move |e: &DomEvent| match e.key() {
                Some("Enter") => {
                    let text = e.value().unwrap_or_default().to_string();
                    on_key.update(|s| s.commit_edit(&text));
                }
                Some("Escape") => on_key.update(TodoState::cancel_edit),
                _ => {}
            })
            .on("blur", move |e: &DomEvent| {
                if on_blur.with(|s| s.editing.is_none()) {
                    return;
                }
                let text = e.value().unwrap_or_default().to_string();
                on_blur.update(|s| s.commit_edit(&text));
            })
    }

    fn footer(&self, state: &TodoState) -> Option<Element> {
        if state.todos.is_empty() {
            return None;
        }
        let active = state.active_count();
        let noun = if active == 1 { "item" } else { "items" };

        let clear = (state.completed_count() > 0).then(|| {
            let store = self.store.clone();
            el("button")
                .class("clear-completed")
                .on("click", move |_: &DomEvent| store.update(TodoState::clear_completed))
                .child("Clear completed")
        });

        Some(
            el("footer")
                .class("footer")
                .child(
                    el("span")
                        .class("todo-count")
                        .child(el("strong").child(active))
                        .child(format!(" {noun} left")),
                )
                .child(
                    el("ul")
                        .class("filters")
                        .children(Filter::ALL.map(|f| el("li").child(self.filter_link(f, state.filter)))),
                )
                .child(clear),
        )
    }

    fn filter_link(&self, filter: Filter, current: Filter) -> Element {
        let store = self.store.clone();
        let mut link = el("a").attr("href", filter.route()).on("click", move |e: &DomEvent| {
            e.prevent_default();
            if store.with(|s| s.filter != filter) {
                store.update(|s| s.filter = filter);
            }
        });
        if filter == current {
            link = link.class("selected");
        }
        link.child(filter.label())
    }
}

impl Component for TodoView {
    type State = TodoState;

    fn view(&self, state: &TodoState) -> Node {
        el("div")
            .class("todoapp")
            .child(self.header(state))
            .child(self.main_section(state))
            .child(self.footer(state))
            .build()
    }
}

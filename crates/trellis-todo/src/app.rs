//! Headless todo application driven by simulated user input

use crate::script::Step;
use crate::state::{Filter, TodoState};
use crate::view::TodoView;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, info};
use trellis_config::TrellisConfig;
use trellis_dom::{
    Component, Dom, DomError, DomEvent, MemoryDom, NodeId, Property, Renderer, Store, Subscription,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("no {0} on the page")]
    Missing(&'static str),

    #[error("no visible todo at position {0}")]
    NoSuchItem(usize),

    #[error(transparent)]
    Dom(#[from] DomError),
}

pub type AppResult<T> = Result<T, AppError>;

type SharedRenderer = Rc<RefCell<Renderer<MemoryDom>>>;

/// The todo page rendered into a [`MemoryDom`].
///
/// Interactions go through the delegated event path exactly as browser
/// input would: the live control value is set, then the event is
/// dispatched at the control and the handler updates the store, whose
/// subscriber re-renders.
pub struct TodoApp {
    renderer: SharedRenderer,
    store: Store<TodoState>,
    container: NodeId,
    render_error: Rc<RefCell<Option<DomError>>>,
    subscription: Option<Subscription>,
}

impl TodoApp {
    pub fn new(config: &TrellisConfig) -> AppResult<Self> {
        Self::with_state(config, TodoState::new())
    }

    pub fn with_state(config: &TrellisConfig, state: TodoState) -> AppResult<Self> {
        let mut dom = MemoryDom::new();
        let container = dom.create_container("section");
        let renderer = Rc::new(RefCell::new(Renderer::with_config(dom, config)));
        let store = Store::new(state);
        let view = TodoView::new(store.clone());

        let initial = store.with(|s| view.view(s));
        renderer.borrow_mut().render(initial, container)?;

        let render_error = Rc::new(RefCell::new(None));
        let subscription = {
            let renderer = Rc::downgrade(&renderer);
            let errors = Rc::clone(&render_error);
            let state = store.clone();
            store.subscribe(move || {
                let Some(renderer) = renderer.upgrade() else {
                    return;
                };
                let node = state.with(|s| view.view(s));
                let rendered = renderer.borrow_mut().render(node, container);
                if let Err(err) = rendered {
                    *errors.borrow_mut() = Some(err);
                }
            })
        };

        Ok(Self {
            renderer,
            store,
            container,
            render_error,
            subscription: Some(subscription),
        })
    }

    pub fn store(&self) -> &Store<TodoState> {
        &self.store
    }

    pub fn state(&self) -> TodoState {
        self.store.get()
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn renderer(&self) -> &SharedRenderer {
        &self.renderer
    }

    /// Current markup of the page.
    pub fn html(&self) -> String {
        self.renderer.borrow().dom().inner_html(self.container)
    }

    /// Type `text` into the new-todo input and press Enter.
    pub fn add(&self, text: &str) -> AppResult<()> {
        let input = self.first_by_class("new-todo")?;
        self.type_into(input, text)?;
        self.dispatch(DomEvent::keydown(input, "Enter"))
    }

    pub fn toggle(&self, position: usize) -> AppResult<()> {
        let checkbox = self.in_item(position, "toggle")?;
        self.dispatch(DomEvent::new("change", checkbox))
    }

    pub fn destroy(&self, position: usize) -> AppResult<()> {
        let button = self.in_item(position, "destroy")?;
        self.dispatch(DomEvent::new("click", button))
    }

    /// Double-click the label, replace the text and press Enter.
    pub fn edit(&self, position: usize, text: &str) -> AppResult<()> {
        let label = {
            let item = self.item(position)?;
            let renderer = self.renderer.borrow();
            renderer
                .dom()
                .query_tag(item, "label")
                .first()
                .copied()
                .ok_or(AppError::Missing("todo label"))?
        };
        self.dispatch(DomEvent::new("dblclick", label))?;

        let input = self.in_item(position, "edit")?;
        self.type_into(input, text)?;
        self.dispatch(DomEvent::keydown(input, "Enter"))
    }

    /// Press Escape in the edit field of an item being edited.
    pub fn cancel_edit(&self, position: usize) -> AppResult<()> {
        let input = self.in_item(position, "edit")?;
        self.dispatch(DomEvent::keydown(input, "Escape"))
    }

    pub fn toggle_all(&self) -> AppResult<()> {
        let checkbox = self.first_by_class("toggle-all")?;
        self.dispatch(DomEvent::new("change", checkbox))
    }

    pub fn clear_completed(&self) -> AppResult<()> {
        let button = self.first_by_class("clear-completed")?;
        self.dispatch(DomEvent::new("click", button))
    }

    /// Click the filter link for `filter`.
    pub fn select_filter(&self, filter: Filter) -> AppResult<()> {
        let link = {
            let renderer = self.renderer.borrow();
            let dom = renderer.dom();
            dom.query_class(self.container, "filters")
                .first()
                .map(|list| dom.query_tag(*list, "a"))
                .unwrap_or_default()
                .into_iter()
                .find(|a| dom.attribute(*a, "href").as_deref() == Some(filter.route()))
                .ok_or(AppError::Missing("filter link"))?
        };
        let outcome = self.dispatch_event(DomEvent::new("click", link))?;
        debug!(prevented = outcome, "filter link clicked");
        Ok(())
    }

    pub fn run(&self, step: &Step) -> AppResult<()> {
        info!(%step, "running step");
        match step {
            Step::Add(text) => self.add(text),
            Step::Toggle(n) => self.toggle(*n),
            Step::Destroy(n) => self.destroy(*n),
            Step::Edit(n, text) => self.edit(*n, text),
            Step::ToggleAll => self.toggle_all(),
            Step::ClearCompleted => self.clear_completed(),
            Step::Filter(filter) => self.select_filter(*filter),
        }
    }

    fn type_into(&self, input: NodeId, text: &str) -> AppResult<()> {
        self.renderer
            .borrow_mut()
            .dom_mut()
            .set_property(input, &Property::Value(text.to_string()))?;
        self.dispatch(DomEvent::new("input", input))
    }

    fn dispatch(&self, event: DomEvent) -> AppResult<()> {
        self.dispatch_event(event).map(drop)
    }

    /// Returns whether a handler prevented the default action.
    fn dispatch_event(&self, event: DomEvent) -> AppResult<bool> {
        let outcome = Renderer::dispatch_shared(&self.renderer, event);
        if let Some(err) = self.render_error.borrow_mut().take() {
            return Err(err.into());
        }
        Ok(outcome.default_prevented)
    }

    fn first_by_class(&self, class: &'static str) -> AppResult<NodeId> {
        self.renderer
            .borrow()
            .dom()
            .query_class(self.container, class)
            .first()
            .copied()
            .ok_or(AppError::Missing(class))
    }

    /// Live `li` of the visible item at a 1-based position.
    fn item(&self, position: usize) -> AppResult<NodeId> {
        let list = self.first_by_class("todo-list").map_err(|_| AppError::NoSuchItem(position))?;
        let renderer = self.renderer.borrow();
        position
            .checked_sub(1)
            .and_then(|i| renderer.dom().children(list).get(i).copied())
            .ok_or(AppError::NoSuchItem(position))
    }

    fn in_item(&self, position: usize, class: &'static str) -> AppResult<NodeId> {
        let item = self.item(position)?;
        self.renderer
            .borrow()
            .dom()
            .query_class(item, class)
            .first()
            .copied()
            .ok_or(AppError::Missing(class))
    }
}

impl Drop for TodoApp {
    fn drop(&mut self) {
        // The subscriber holds a store handle; end it so the store is freed.
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> TodoApp {
        TodoApp::new(&TrellisConfig::default()).unwrap()
    }

    #[test]
    fn adding_clears_the_input() {
        let app = app();
        app.add("buy milk").unwrap();

        let state = app.state();
        assert_eq!(state.todos.len(), 1);
        assert_eq!(state.draft, "");

        let renderer = app.renderer().borrow();
        let input = renderer.dom().query_class(app.container(), "new-todo")[0];
        assert_eq!(
            renderer.dom().property(input, trellis_dom::PropertyName::Value),
            Some(Property::Value(String::new()))
        );
    }

    #[test]
    fn store_updates_rerender_through_the_subscriber() {
        let app = app();
        app.store().update(|s| {
            s.add("from the store");
        });

        assert!(app.html().contains("<label>from the store</label>"));

        let renderer = app.renderer().clone();
        drop(app);
        assert_eq!(Rc::strong_count(&renderer), 1);
    }

    #[test]
    fn blank_input_adds_nothing() {
        let app = app();
        app.add("   ").unwrap();
        assert!(app.state().todos.is_empty());
    }

    #[test]
    fn positions_follow_the_filter() {
        let app = app();
        app.add("a").unwrap();
        app.add("b").unwrap();
        app.toggle(1).unwrap();
        app.select_filter(Filter::Active).unwrap();

        app.destroy(1).unwrap();

        let texts: Vec<_> = app.state().todos.into_iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["a"]);
    }

    #[test]
    fn filter_click_prevents_navigation() {
        let app = app();
        app.add("a").unwrap();
        let link = {
            let renderer = app.renderer().borrow();
            let dom = renderer.dom();
            dom.query_tag(app.container(), "a")[1]
        };
        assert!(app.dispatch_event(DomEvent::new("click", link)).unwrap());
        assert_eq!(app.state().filter, Filter::Active);
    }

    #[test]
    fn escape_leaves_text_untouched() {
        let app = app();
        app.add("a").unwrap();
        let label = {
            let renderer = app.renderer().borrow();
            renderer.dom().query_tag(app.container(), "label")[1]
        };
        app.dispatch(DomEvent::new("dblclick", label)).unwrap();
        assert_eq!(app.state().editing, Some(1));

        app.cancel_edit(1).unwrap();

        assert_eq!(app.state().editing, None);
        assert_eq!(app.state().todos[0].text, "a");
    }

    #[test]
    fn missing_controls_are_reported() {
        let app = app();
        assert!(matches!(app.toggle(1), Err(AppError::NoSuchItem(1))));
        assert!(matches!(
            app.clear_completed(),
            Err(AppError::Missing("clear-completed"))
        ));
    }

    #[test]
    fn destroyed_items_release_their_handlers() {
        let app = app();
        app.add("a").unwrap();
        app.add("b").unwrap();
        let with_two = app.renderer().borrow().events().handler_count();

        app.destroy(2).unwrap();

        let with_one = app.renderer().borrow().events().handler_count();
        assert_eq!(with_two - with_one, 3);
    }

    #[test]
    fn dropping_the_app_ends_the_subscription() {
        let app = app();
        let store = app.store().clone();
        assert_eq!(store.subscriber_count(), 1);

        drop(app);

        assert_eq!(store.subscriber_count(), 0);
    }
}

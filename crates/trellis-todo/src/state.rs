//! Todo list state and the operations the UI performs on it

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: u64,
    pub text: String,
    pub completed: bool,
}

/// Which todos the list shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown filter `{0}` (expected all, active or completed)")]
pub struct UnknownFilter(pub String);

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Active => "Active",
            Filter::Completed => "Completed",
        }
    }

    /// Location hash that selects this filter.
    pub fn route(self) -> &'static str {
        match self {
            Filter::All => "#/",
            Filter::Active => "#/active",
            Filter::Completed => "#/completed",
        }
    }

    /// Filter named by a location hash. Unknown routes show everything.
    pub fn from_route(hash: &str) -> Self {
        let name = hash.trim_start_matches('#').trim_start_matches('/');
        name.parse().unwrap_or_default()
    }

    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !todo.completed,
            Filter::Completed => todo.completed,
        }
    }
}

impl FromStr for Filter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" => Ok(Filter::Completed),
            other => Err(UnknownFilter(other.to_string())),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the todo UI renders from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoState {
    pub todos: Vec<Todo>,
    pub filter: Filter,
    /// Todo whose label is being edited.
    pub editing: Option<u64>,
    /// Contents of the new-todo input.
    pub draft: String,
    next_id: u64,
}

impl TodoState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a todo. Blank text is rejected.
    pub fn add(&mut self, text: &str) -> Option<u64> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.next_id += 1;
        self.todos.push(Todo {
            id: self.next_id,
            text: text.to_string(),
            completed: false,
        });
        Some(self.next_id)
    }

    pub fn get(&self, id: u64) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    pub fn toggle(&mut self, id: u64) {
        if let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) {
            todo.completed = !todo.completed;
        }
    }

    pub fn destroy(&mut self, id: u64) {
        self.todos.retain(|t| t.id != id);
        if self.editing == Some(id) {
            self.editing = None;
        }
    }

    /// Complete every todo, or reopen them all when all are complete.
    pub fn toggle_all(&mut self) {
        let completed = !self.all_completed();
        for todo in &mut self.todos {
            todo.completed = completed;
        }
    }

    pub fn clear_completed(&mut self) {
        self.todos.retain(|t| !t.completed);
    }

    pub fn begin_edit(&mut self, id: u64) {
        if self.get(id).is_some() {
            self.editing = Some(id);
        }
    }

    /// Store the edited text. Blank text deletes the todo.
    pub fn commit_edit(&mut self, text: &str) {
        let Some(id) = self.editing.take() else {
            return;
        };
        let text = text.trim();
        if text.is_empty() {
            self.destroy(id);
        } else if let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) {
            todo.text = text.to_string();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub fn visible(&self) -> impl Iterator<Item = &Todo> {
        let filter = self.filter;
        self.todos.iter().filter(move |t| filter.matches(t))
    }

    pub fn active_count(&self) -> usize {
        self.todos.iter().filter(|t| !t.completed).count()
    }

    pub fn completed_count(&self) -> usize {
        self.todos.len() - self.active_count()
    }

    pub fn all_completed(&self) -> bool {
        !self.todos.is_empty() && self.active_count() == 0
    }
}

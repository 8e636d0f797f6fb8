//! TodoMVC on trellis
//!
//! [`TodoView`] renders [`TodoState`] as the classic TodoMVC page and
//! [`TodoApp`] drives it headlessly over a [`trellis_dom::MemoryDom`], one
//! simulated interaction ([`Step`]) at a time.

pub mod app;
pub mod cli;
pub mod logging;
pub mod script;
pub mod state;
pub mod view;

pub use app::{AppError, AppResult, TodoApp};
pub use script::{Step, StepParseError};
pub use state::{Filter, Todo, TodoState, UnknownFilter};
pub use view::TodoView;

//! Virtual-DOM renderer with delegated events
//!
//! A minimal Elm/React-inspired UI framework: describe the UI as an
//! immutable [`Node`] tree, hand it to a [`Renderer`], and the renderer
//! patches the live document with only what changed.
//!
//! # Architecture
//!
//! ```text
//! State -> view() -> Node tree -> diff(prev, next) -> Patch -> LiveTree -> Dom
//!   ^                                                             |
//!   |                                                             v
//!   +-------- handler(&DomEvent) <---- EventManager <---- delegated event
//! ```
//!
//! - [`Dom`] is the seam to a live document. [`MemoryDom`] is an
//!   in-process document used by tests and headless tools; a browser
//!   backend lives in `trellis-web`.
//! - [`EventManager`] keeps one handler table keyed by [`NodeId`]; the
//!   document gets a single capturing listener per delegated event type.
//! - [`LiveTree::detach_subtree`] is the only way nodes leave the tree, and
//!   it releases their handlers in the same call.

mod attr;
mod component;
mod diff;
mod dom;
mod error;
mod event;
mod events;
mod materialize;
mod node;
mod patch;
mod render;
mod store;
mod tree;

#[cfg(any(test, feature = "test-utils"))]
pub mod proptest_strategies;

pub use attr::*;
pub use component::*;
pub use diff::*;
pub use dom::*;
pub use error::*;
pub use event::*;
pub use events::*;
pub use node::*;
pub use render::*;
pub use store::*;
pub use tree::*;

pub use trellis_config::ReconcileMode;

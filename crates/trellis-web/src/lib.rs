//! Browser backend for trellis
//!
//! [`WebDom`] implements [`trellis_dom::Dom`] over `web-sys`, and
//! [`install_delegation`] attaches the capturing document listeners that
//! turn browser events into [`trellis_dom::DomEvent`]s.

mod delegation;
mod dom;

pub use delegation::{install_delegation, Delegation};
pub use dom::{node_id_of, WebDom};

//! domkit - owned DOM trees with HTML serialization
//!
//! Small DOM toolkit: an arena-backed node tree, a DOM-to-string serializer,
//! selector-based ancestor/descendant search, and explicit mutation
//! observation.
//!
//! ## Core Design
//!
//! ```text
//! JSON / builders → DomNode (owned) → DomArena → serialize → String
//!                                        ↓
//!                                  NodeId (u32)
//! ```
//!
//! The serializer walks a root's direct children (first child, next sibling)
//! and emits per-kind markup; elements render their whole subtree as outer
//! markup. Mutations go through [`Document`], which delivers
//! [`MutationRecord`]s to subscriptions with an explicit observe/disconnect
//! lifecycle.

pub mod arena;
pub mod document;
pub mod error;
pub mod observer;
pub mod query;
pub mod serializer;
pub mod types;

pub use arena::DomArena;
pub use document::Document;
pub use error::{DomError, Result};
pub use observer::{MutationKind, MutationRecord, ObserverConfig, ObserverId};
pub use query::{closest, query_selector_all, Selector};
pub use serializer::{outer_html, serialize};
pub use types::{DomNode, NodeId, NodeType};

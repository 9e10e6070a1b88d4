//! Mutation observation types
//!
//! Mutations are observed through explicit subscriptions held by a
//! `Document`: a callback plus a config saying which mutation kinds it wants
//! and whether descendants of the target count. No global observer state;
//! `Document::observe` starts delivery and `Document::disconnect` stops it.

use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;

/// Handle identifying a subscription, returned by `Document::observe`
pub type ObserverId = Uuid;

/// Which mutations a subscription receives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverConfig {
    pub attributes: bool,
    pub child_list: bool,
    pub character_data: bool,
    /// Also deliver mutations of the target's descendants
    pub subtree: bool,
}

impl ObserverConfig {
    /// Config selecting every mutation kind on the target node
    pub fn all() -> Self {
        Self {
            attributes: true,
            child_list: true,
            character_data: true,
            subtree: false,
        }
    }

    pub(crate) fn wants(&self, kind: MutationKind) -> bool {
        match kind {
            MutationKind::Attributes => self.attributes,
            MutationKind::ChildList => self.child_list,
            MutationKind::CharacterData => self.character_data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    Attributes,
    ChildList,
    CharacterData,
}

/// A single observed mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationRecord {
    pub kind: MutationKind,
    /// The mutated node
    pub target: NodeId,
    /// Set for Attributes records
    pub attribute_name: Option<String>,
    /// Previous attribute value or character data, if there was one
    pub old_value: Option<String>,
    pub added_nodes: SmallVec<[NodeId; 2]>,
    pub removed_nodes: SmallVec<[NodeId; 2]>,
}

impl MutationRecord {
    pub(crate) fn new(kind: MutationKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            attribute_name: None,
            old_value: None,
            added_nodes: SmallVec::new(),
            removed_nodes: SmallVec::new(),
        }
    }
}

/// Callback invoked synchronously with each delivered record batch
pub type MutationCallback = Box<dyn FnMut(&[MutationRecord])>;

/// An active observation registered on a `Document`
pub(crate) struct Subscription {
    pub(crate) id: ObserverId,
    pub(crate) target: NodeId,
    pub(crate) config: ObserverConfig,
    pub(crate) callback: MutationCallback,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

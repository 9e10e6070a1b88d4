//! Document - owning facade over the DOM arena
//!
//! All mutation goes through this type so mutation records can be delivered
//! to observers. Construction is either programmatic (`create_element`,
//! `append_child`, ...) or from a CDP-style JSON node description
//! (`from_json`).

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::observer::{
    MutationCallback, MutationKind, MutationRecord, ObserverConfig, ObserverId, Subscription,
};
use crate::query::{self, Selector};
use crate::serializer;
use crate::types::{DomNode, NodeId, NodeType};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

/// An owned DOM tree with mutation observation
pub struct Document {
    arena: DomArena,
    observers: Vec<Subscription>,
}

impl Document {
    /// Create a document containing only a `#document` root node
    pub fn new() -> Self {
        let mut arena = DomArena::new();
        let root = arena.add_node(DomNode::new(0, NodeType::Document, "#document".to_string()));
        arena.set_root(root).expect("root node was just added");
        Self {
            arena,
            observers: Vec::new(),
        }
    }

    /// Build a document from a CDP-style JSON node tree.
    ///
    /// Expected node object fields: `nodeType` (required), `nodeName`,
    /// `nodeValue`, `attributes` (flat `[name, value, ...]` array),
    /// `publicId` / `systemId`, `children`.
    pub fn from_json(root: &Value) -> Result<Self> {
        let mut arena = DomArena::new();
        let root_id = Self::parse_node(&mut arena, root, None)?;
        arena.set_root(root_id)?;
        Ok(Self {
            arena,
            observers: Vec::new(),
        })
    }

    fn parse_node(arena: &mut DomArena, json: &Value, parent_id: Option<NodeId>) -> Result<NodeId> {
        let node_type_val = json["nodeType"]
            .as_u64()
            .ok_or(DomError::MissingField("nodeType"))? as u8;
        let node_type =
            NodeType::from_u8(node_type_val).ok_or(DomError::InvalidNodeType(node_type_val))?;

        let node_name = json["nodeName"].as_str().unwrap_or("").to_string();

        let mut node = DomNode::new(0, node_type, node_name);
        node.node_value = json["nodeValue"].as_str().unwrap_or("").to_string();
        node.parent_id = parent_id;

        // Attributes arrive as a flat [name, value, name, value, ...] array
        if let Some(attrs) = json["attributes"].as_array() {
            let mut i = 0;
            while i + 1 < attrs.len() {
                if let (Some(key), Some(value)) = (attrs[i].as_str(), attrs[i + 1].as_str()) {
                    node.set_attr(key, value.to_string());
                }
                i += 2;
            }
        }

        // Empty identifiers count as absent
        node.public_id = json["publicId"].as_str().filter(|s| !s.is_empty()).map(String::from);
        node.system_id = json["systemId"].as_str().filter(|s| !s.is_empty()).map(String::from);

        let current_id = arena.add_node(node);

        if let Some(children) = json["children"].as_array() {
            let mut child_ids = smallvec::SmallVec::new();
            for child in children {
                let child_id = Self::parse_node(arena, child, Some(current_id))?;
                child_ids.push(child_id);
            }
            arena.get_mut(current_id)?.children_ids = child_ids;
        }

        Ok(current_id)
    }

    /// Get reference to internal arena
    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    /// Get mutable reference to internal arena
    pub fn arena_mut(&mut self) -> &mut DomArena {
        &mut self.arena
    }

    /// Root node id
    pub fn root(&self) -> NodeId {
        self.arena.root_id().expect("document always has a root")
    }

    // ---- node construction (nodes start detached) ----

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena
            .add_node(DomNode::new(0, NodeType::Element, tag.to_string()))
    }

    pub fn create_text(&mut self, data: &str) -> NodeId {
        let mut node = DomNode::new(0, NodeType::Text, "#text".to_string());
        node.node_value = data.to_string();
        self.arena.add_node(node)
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        let mut node = DomNode::new(0, NodeType::Comment, "#comment".to_string());
        node.node_value = data.to_string();
        self.arena.add_node(node)
    }

    pub fn create_cdata(&mut self, data: &str) -> NodeId {
        let mut node = DomNode::new(0, NodeType::CdataSection, "#cdata-section".to_string());
        node.node_value = data.to_string();
        self.arena.add_node(node)
    }

    pub fn create_doctype(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> NodeId {
        let mut node = DomNode::new(0, NodeType::DocumentType, name.to_string());
        node.public_id = public_id.filter(|s| !s.is_empty()).map(String::from);
        node.system_id = system_id.filter(|s| !s.is_empty()).map(String::from);
        self.arena.add_node(node)
    }

    pub fn create_processing_instruction(&mut self, target: &str, data: &str) -> NodeId {
        let mut node = DomNode::new(0, NodeType::ProcessingInstruction, target.to_string());
        node.node_value = data.to_string();
        self.arena.add_node(node)
    }

    // ---- mutations (each delivers a MutationRecord) ----

    /// Append a detached node as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.arena.get(parent)?;
        let child_node = self.arena.get(child)?;
        if child_node.parent_id.is_some() {
            return Err(DomError::Hierarchy(format!(
                "node {child} already has a parent"
            )));
        }
        if child == parent || self.arena.is_ancestor(child, parent)? {
            return Err(DomError::Hierarchy(format!(
                "node {child} contains node {parent}"
            )));
        }

        self.arena.get_mut(child)?.parent_id = Some(parent);
        self.arena.get_mut(parent)?.children_ids.push(child);

        let mut record = MutationRecord::new(MutationKind::ChildList, parent);
        record.added_nodes.push(child);
        self.notify(record)?;
        Ok(())
    }

    /// Remove `child` from `parent`; the node stays in the arena, detached
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_node = self.arena.get(parent)?;
        let pos = parent_node
            .children_ids
            .iter()
            .position(|&id| id == child)
            .ok_or_else(|| {
                DomError::Hierarchy(format!("node {child} is not a child of node {parent}"))
            })?;

        self.arena.get_mut(parent)?.children_ids.remove(pos);
        self.arena.get_mut(child)?.parent_id = None;

        let mut record = MutationRecord::new(MutationKind::ChildList, parent);
        record.removed_nodes.push(child);
        self.notify(record)?;
        Ok(())
    }

    /// Set an attribute on an element
    pub fn set_attribute(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let node = self.arena.get_mut(node_id)?;
        let old_value = node.set_attr(name, value.to_string());
        if name == "id" {
            self.arena.reindex_id(node_id, old_value.as_deref(), Some(value));
        }

        let mut record = MutationRecord::new(MutationKind::Attributes, node_id);
        record.attribute_name = Some(name.to_string());
        record.old_value = old_value;
        self.notify(record)?;
        Ok(())
    }

    /// Remove an attribute; no record is delivered if it was absent
    pub fn remove_attribute(&mut self, node_id: NodeId, name: &str) -> Result<()> {
        let node = self.arena.get_mut(node_id)?;
        let old_value = match node.remove_attr(name) {
            Some(v) => v,
            None => return Ok(()),
        };
        if name == "id" {
            self.arena.reindex_id(node_id, Some(&old_value), None);
        }

        let mut record = MutationRecord::new(MutationKind::Attributes, node_id);
        record.attribute_name = Some(name.to_string());
        record.old_value = Some(old_value);
        self.notify(record)?;
        Ok(())
    }

    /// Replace a node's character data (text, comment, CDATA)
    pub fn set_character_data(&mut self, node_id: NodeId, data: &str) -> Result<()> {
        let node = self.arena.get_mut(node_id)?;
        let old_value = std::mem::replace(&mut node.node_value, data.to_string());

        let mut record = MutationRecord::new(MutationKind::CharacterData, node_id);
        record.old_value = Some(old_value);
        self.notify(record)?;
        Ok(())
    }

    // ---- observation lifecycle ----

    /// Start observing `target`. Records are delivered synchronously on the
    /// mutating call. Returns the id used to stop observation.
    pub fn observe<F>(&mut self, target: NodeId, config: ObserverConfig, callback: F) -> Result<ObserverId>
    where
        F: FnMut(&[MutationRecord]) + 'static,
    {
        self.arena.get(target)?;
        let id = Uuid::new_v4();
        debug!(observer = %id, node = target, ?config, "observer attached");
        self.observers.push(Subscription {
            id,
            target,
            config,
            callback: Box::new(callback) as MutationCallback,
        });
        Ok(id)
    }

    /// Stop delivering to the subscription. Returns false if unknown.
    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|sub| sub.id != id);
        let removed = self.observers.len() < before;
        if removed {
            debug!(observer = %id, "observer disconnected");
        }
        removed
    }

    fn notify(&mut self, record: MutationRecord) -> Result<()> {
        if self.observers.is_empty() {
            return Ok(());
        }
        let records = [record];
        let record = &records[0];
        for sub in self.observers.iter_mut() {
            if !sub.config.wants(record.kind) {
                continue;
            }
            let hit = sub.target == record.target
                || (sub.config.subtree && self.arena.is_ancestor(sub.target, record.target)?);
            if hit {
                debug!(observer = %sub.id, kind = ?record.kind, node = record.target, "delivering mutation record");
                (sub.callback)(&records);
            }
        }
        Ok(())
    }

    // ---- reads ----

    /// Serialize the document root's children to an HTML string
    pub fn to_html(&self) -> Result<String> {
        serializer::serialize(&self.arena, self.root())
    }

    /// Serialize the children of an arbitrary node
    pub fn serialize_node(&self, node_id: NodeId) -> Result<String> {
        serializer::serialize(&self.arena, node_id)
    }

    /// Full outer markup of an element
    pub fn outer_html(&self, node_id: NodeId) -> Result<String> {
        serializer::outer_html(&self.arena, node_id)
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.arena.find_by_id(id)
    }

    pub fn closest(&self, start: NodeId, selector: &Selector) -> Result<Option<NodeId>> {
        query::closest(&self.arena, start, selector)
    }

    pub fn query_selector_all(&self, root: NodeId, selector: &Selector) -> Result<Vec<NodeId>> {
        query::query_selector_all(&self.arena, root, selector)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("arena", &self.arena)
            .field("observers", &self.observers)
            .finish()
    }
}

//! Selector matching and ancestor search
//!
//! Supports compound simple selectors: an optional tag name followed by any
//! number of `#id` and `.class` segments (`div`, `#main`, `button.primary`,
//! `input#q.wide`). Combinators are not supported; `closest` and
//! `query_selector_all` cover the two traversal directions this crate needs.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId};

/// A parsed compound simple selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    /// Parse a selector string.
    ///
    /// Rejects empty input, whitespace, and combinators with
    /// `DomError::InvalidSelector`.
    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() {
            return Err(DomError::InvalidSelector("empty selector".to_string()));
        }
        if input.chars().any(|c| c.is_whitespace() || c == '>' || c == '+' || c == '~' || c == ',')
        {
            return Err(DomError::InvalidSelector(format!(
                "combinators are not supported: {input:?}"
            )));
        }

        let mut selector = Selector {
            tag: None,
            id: None,
            classes: Vec::new(),
        };

        let mut rest = input;
        if !rest.starts_with('#') && !rest.starts_with('.') {
            let end = rest.find(|c| c == '#' || c == '.').unwrap_or(rest.len());
            let tag = &rest[..end];
            // "*" is the universal selector: no tag constraint
            if tag != "*" {
                selector.tag = Some(tag.to_string());
            }
            rest = &rest[end..];
        }

        while !rest.is_empty() {
            let marker = rest.chars().next().unwrap();
            let body = &rest[1..];
            let end = body.find(|c| c == '#' || c == '.').unwrap_or(body.len());
            let name = &body[..end];
            if name.is_empty() {
                return Err(DomError::InvalidSelector(format!(
                    "empty segment in {input:?}"
                )));
            }
            match marker {
                '#' => selector.id = Some(name.to_string()),
                '.' => selector.classes.push(name.to_string()),
                _ => unreachable!(),
            }
            rest = &body[end..];
        }

        Ok(selector)
    }

    /// Check whether an element node matches this selector.
    ///
    /// Non-element nodes never match. Tag names compare
    /// case-insensitively; class segments must each be a whitespace-separated
    /// token of the `class` attribute.
    pub fn matches(&self, node: &DomNode) -> bool {
        if !node.is_element() {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !node.node_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if node.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class_attr = node.attr("class").unwrap_or("");
            let tokens: Vec<&str> = class_attr.split_whitespace().collect();
            if !self.classes.iter().all(|c| tokens.contains(&c.as_str())) {
                return false;
            }
        }
        true
    }
}

/// Find the closest element matching `selector`, starting at `start` itself
/// and walking up the parent chain. Returns `None` when the chain is
/// exhausted without a match.
pub fn closest(arena: &DomArena, start: NodeId, selector: &Selector) -> Result<Option<NodeId>> {
    let mut current = Some(start);
    while let Some(node_id) = current {
        let node = arena.get(node_id)?;
        if selector.matches(node) {
            return Ok(Some(node_id));
        }
        current = node.parent_id;
    }
    Ok(None)
}

/// All descendants of `root` matching `selector`, in document order.
/// `root` itself is not considered.
pub fn query_selector_all(
    arena: &DomArena,
    root: NodeId,
    selector: &Selector,
) -> Result<Vec<NodeId>> {
    let mut matches = Vec::new();
    arena.traverse_df(root, |node| {
        if node.node_id != root && selector.matches(node) {
            matches.push(node.node_id);
        }
        Ok(())
    })?;
    Ok(matches)
}

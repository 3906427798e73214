//! Structured tree snapshots (thought index + lexeme index).
//!
//! A snapshot is the JSON dump of a whole thought tree. Current snapshots carry
//! a derived `childrenMap` on every thought; legacy ones only carry the raw
//! `children` reference and must be repaired before export.

use super::ids::ThoughtId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Derived child lookup: key (child id, or the value for meta attributes) to child id
pub type ChildrenMap = BTreeMap<String, ThoughtId>;

/// A single thought record inside a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thought {
    pub id: ThoughtId,

    #[serde(default)]
    pub value: String,

    #[serde(default)]
    pub rank: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ThoughtId>,

    /// Raw children reference from legacy snapshots (object keyed by child id,
    /// or a plain list of ids)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children_map: Option<ChildrenMap>,

    /// Fields this crate does not interpret, preserved as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Thought {
    pub fn new(id: impl Into<ThoughtId>, value: impl Into<String>, rank: f64) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            rank,
            parent_id: None,
            children: None,
            children_map: None,
            extra: Map::new(),
        }
    }

    /// Child ids listed in the legacy `children` field
    pub fn raw_child_ids(&self) -> Vec<ThoughtId> {
        match &self.children {
            Some(Value::Object(map)) => map.keys().map(|k| ThoughtId::from(k.as_str())).collect(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(ThoughtId::from(s.as_str())),
                    Value::Object(obj) => obj
                        .get("id")
                        .and_then(Value::as_str)
                        .map(ThoughtId::from),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Meta attributes are thoughts whose value starts with `=`
pub fn is_attribute(value: &str) -> bool {
    value.starts_with('=')
}

/// Lexeme record; only the contexts are interpreted
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lexeme {
    #[serde(default)]
    pub contexts: Vec<ThoughtId>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A complete structured snapshot
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThoughtIndices {
    #[serde(default)]
    pub thought_index: BTreeMap<ThoughtId, Thought>,

    #[serde(default)]
    pub lexeme_index: BTreeMap<String, Lexeme>,
}

impl ThoughtIndices {
    /// Build a children map for `child_ids`, skipping ids that are not in the index.
    pub fn children_map_for(&self, child_ids: &[ThoughtId]) -> ChildrenMap {
        child_ids
            .iter()
            .filter_map(|id| {
                let child = self.thought_index.get(id)?;
                let key = if is_attribute(&child.value) {
                    child.value.clone()
                } else {
                    id.as_str().to_string()
                };
                Some((key, id.clone()))
            })
            .collect()
    }

    /// True when at least one thought lacks the derived children map
    pub fn needs_children_map(&self) -> bool {
        self.thought_index
            .values()
            .any(|thought| thought.children_map.is_none())
    }

    /// Children of `id`, ordered by rank then value
    pub fn children_of(&self, id: &ThoughtId) -> Vec<&Thought> {
        let Some(thought) = self.thought_index.get(id) else {
            return Vec::new();
        };
        let mut children: Vec<&Thought> = thought
            .children_map
            .iter()
            .flat_map(|map| map.values())
            .filter_map(|child_id| self.thought_index.get(child_id))
            .collect();
        children.sort_by(|a, b| {
            a.rank
                .total_cmp(&b.rank)
                .then_with(|| a.value.cmp(&b.value))
        });
        children
    }
}

//! Identifier types for thoughts, imports and destination paths.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token of the conventional top-level context every tree hangs from.
pub const HOME_TOKEN: &str = "__ROOT__";

/// Identifier of a single thought (tree node)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThoughtId(String);

impl ThoughtId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// The id of the top-level context
    pub fn home() -> Self {
        Self(HOME_TOKEN.to_string())
    }

    pub fn is_home(&self) -> bool {
        self.0 == HOME_TOKEN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThoughtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ThoughtId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ThoughtId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of one file import.
///
/// Importing the same file twice yields two different ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImportId(String);

impl ImportId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImportId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Ordered sequence of thought ids locating where imported content attaches.
///
/// An empty path denotes the home context itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationPath(Vec<ThoughtId>);

impl DestinationPath {
    pub fn new(ids: Vec<ThoughtId>) -> Self {
        Self(ids)
    }

    /// The home path: `[__ROOT__]`
    pub fn home() -> Self {
        Self(vec![ThoughtId::home()])
    }

    /// Parse a `/`-separated list of ids. Empty segments are ignored and an
    /// empty string yields the home path.
    pub fn parse(s: &str) -> Self {
        let ids: Vec<ThoughtId> = s
            .split('/')
            .map(str::trim)
            .filter(|seg| !seg.is_empty())
            .map(ThoughtId::from)
            .collect();
        if ids.is_empty() {
            Self::home()
        } else {
            Self(ids)
        }
    }

    /// Last id of the path, i.e. the node content is attached beneath.
    pub fn head(&self) -> ThoughtId {
        self.0.last().cloned().unwrap_or_else(ThoughtId::home)
    }

    /// Path without its last element
    pub fn parent(&self) -> Self {
        let mut ids = self.0.clone();
        ids.pop();
        Self(ids)
    }

    /// Path with `id` appended
    #[must_use]
    pub fn child(&self, id: ThoughtId) -> Self {
        let mut ids = self.0.clone();
        ids.push(id);
        Self(ids)
    }

    pub fn ids(&self) -> &[ThoughtId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DestinationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.0.iter().map(ThoughtId::as_str).collect();
        f.write_str(&joined.join("/"))
    }
}

//! Domain types shared across the grove crates

pub mod ids;
pub mod manifest;
pub mod snapshot;

pub use ids::{DestinationPath, ImportId, ThoughtId, HOME_TOKEN};
pub use manifest::{creation_order, next_sequence, ImportManifest, ManifestIndex};
pub use snapshot::{is_attribute, ChildrenMap, Lexeme, Thought, ThoughtIndices};

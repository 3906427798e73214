//! Import manifests: the durable record of one file's import progress.

use super::ids::{DestinationPath, ImportId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Durable progress record for one in-flight file import.
///
/// `lines_completed` only ever moves forward, in whole chunks, and never past
/// the outline's total line count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportManifest {
    /// Unique id of the import
    pub id: ImportId,

    /// Modification time reported by the source file
    pub last_modified: DateTime<Utc>,

    /// Outline lines already durably merged
    pub lines_completed: usize,

    /// File name, for progress reporting
    pub name: String,

    /// Where the imported content attaches
    pub path: DestinationPath,

    /// Source size in bytes
    pub size: u64,

    /// Creation order among recorded imports, assigned by the ledger on first
    /// write. Records written before this field existed read as 0.
    #[serde(default)]
    pub sequence: u64,
}

impl ImportManifest {
    /// Manifest for a file that has not imported any lines yet
    pub fn new(
        id: ImportId,
        name: impl Into<String>,
        size: u64,
        last_modified: DateTime<Utc>,
        path: DestinationPath,
    ) -> Self {
        Self {
            id,
            last_modified,
            lines_completed: 0,
            name: name.into(),
            path,
            size,
            sequence: 0,
        }
    }

    /// Builder-style: copy of this manifest with an updated progress counter
    #[must_use]
    pub fn with_lines_completed(mut self, lines_completed: usize) -> Self {
        self.lines_completed = lines_completed;
        self
    }
}

/// The manifest collection, keyed by import id
pub type ManifestIndex = BTreeMap<ImportId, ImportManifest>;

/// Sequence number for a manifest about to be added to `index`
pub fn next_sequence(index: &ManifestIndex) -> u64 {
    index.values().map(|m| m.sequence).max().map_or(1, |max| max + 1)
}

/// Manifests in the order their imports were created; ties fall back to id
pub fn creation_order(index: ManifestIndex) -> Vec<ImportManifest> {
    let mut manifests: Vec<_> = index.into_values().collect();
    manifests.sort_by(|a, b| a.sequence.cmp(&b.sequence).then_with(|| a.id.cmp(&b.id)));
    manifests
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_serializes_camel_case() {
        let manifest = ImportManifest::new(
            ImportId::from("abc"),
            "notes.txt",
            42,
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            DestinationPath::parse("a/b"),
        )
        .with_lines_completed(20);

        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["linesCompleted"], 20);
        assert_eq!(json["lastModified"], "2023-11-14T22:13:20Z");
        assert_eq!(json["path"], serde_json::json!(["a", "b"]));

        let back: ImportManifest = serde_json::from_value(json).unwrap();
        assert_eq!(back, manifest);
    }

    #[test]
    fn test_creation_order_ignores_id_order() {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let mut index = ManifestIndex::new();
        for (id, sequence) in [("zz", 1), ("aa", 2), ("mm", 0)] {
            let mut manifest =
                ImportManifest::new(ImportId::from(id), id, 1, at, DestinationPath::home());
            manifest.sequence = sequence;
            index.insert(manifest.id.clone(), manifest);
        }
        assert_eq!(next_sequence(&index), 3);

        let ids: Vec<_> = creation_order(index)
            .into_iter()
            .map(|m| m.id.to_string())
            .collect();
        assert_eq!(ids, vec!["mm", "zz", "aa"]);
    }

    #[test]
    fn test_legacy_manifest_without_sequence() {
        let legacy = serde_json::json!({
            "id": "old",
            "lastModified": "2023-11-14T22:13:20Z",
            "linesCompleted": 0,
            "name": "old.txt",
            "path": [],
            "size": 3
        });
        let manifest: ImportManifest = serde_json::from_value(legacy).unwrap();
        assert_eq!(manifest.sequence, 0);
        assert_eq!(next_sequence(&ManifestIndex::new()), 1);
    }
}

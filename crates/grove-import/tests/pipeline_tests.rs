//! End-to-end import runs against the in-memory collaborators

use async_trait::async_trait;
use grove_config::FailureScope;
use grove_core::test_support::{InMemoryProgressStore, InMemoryThoughtTree, RecordingNotifier};
use grove_core::{
    Alert, DestinationPath, ImportId, ImportManifest, ImportMerger, MergeError, MergeReceipt,
    MergeRequest, Notifier, OutlineExporter, ProgressStore, StorageError, StorageResult,
    ThoughtId, UpdateFn,
};
use grove_import::{
    ImportError, ImportPipeline, ImportRequest, ImportServices, ImportSettings, MemoryFile,
    ProgressLedger, VirtualFile, MANIFESTS_KEY,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Progress store that records `linesCompleted` of every manifest write
#[derive(Clone, Default)]
struct ProgressSpy {
    inner: InMemoryProgressStore,
    progress: Arc<Mutex<Vec<usize>>>,
    reject_manifests: Arc<AtomicBool>,
}

impl ProgressSpy {
    fn progress(&self) -> Vec<usize> {
        self.progress.lock().clone()
    }

    /// Fail every write to the manifest collection from now on
    fn reject_manifest_writes(&self) {
        self.reject_manifests.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProgressStore for ProgressSpy {
    async fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> StorageResult<()> {
        self.inner.set(key, value).await
    }

    async fn update(&self, key: &str, f: UpdateFn) -> StorageResult<Value> {
        if key == MANIFESTS_KEY && self.reject_manifests.load(Ordering::SeqCst) {
            return Err(StorageError::backend("manifest collection is read-only"));
        }
        let next = self.inner.update(key, f).await?;
        if key == MANIFESTS_KEY {
            let lines = next
                .as_object()
                .and_then(|index| index.values().next())
                .and_then(|manifest| manifest["linesCompleted"].as_u64());
            if let Some(lines) = lines {
                self.progress.lock().push(lines as usize);
            }
        }
        Ok(next)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key).await
    }
}

struct Harness {
    store: ProgressSpy,
    tree: InMemoryThoughtTree,
    notifier: Arc<RecordingNotifier>,
}

impl Harness {
    fn new() -> Self {
        Self {
            store: ProgressSpy::default(),
            tree: InMemoryThoughtTree::new(),
            notifier: Arc::new(RecordingNotifier::new()),
        }
    }

    fn services(&self) -> ImportServices {
        ImportServices {
            store: Arc::new(self.store.clone()),
            merger: Arc::new(self.tree.clone()),
            sync: Arc::new(self.tree.clone()),
            writer: Arc::new(self.tree.clone()),
            exporter: Arc::new(OutlineExporter),
            notifier: self.notifier.clone(),
        }
    }

    fn pipeline(&self, chunk_size: usize) -> ImportPipeline {
        ImportPipeline::with_settings(
            self.services(),
            ImportSettings::default().with_chunk_size(chunk_size),
        )
    }

    fn ledger(&self) -> ProgressLedger {
        ProgressLedger::new(Arc::new(self.store.clone()))
    }

    fn merged_texts(&self) -> Vec<String> {
        self.tree.merges().into_iter().map(|m| m.text).collect()
    }
}

fn numbered(n: usize) -> String {
    (1..=n).map(|i| format!("- line {i}\n")).collect()
}

fn file(name: &str, text: &str) -> Box<dyn VirtualFile> {
    Box::new(MemoryFile::new(name, text))
}

#[tokio::test]
async fn test_47_lines_record_progress_in_whole_chunks() {
    let h = Harness::new();
    let text = numbered(47);

    let summary = h
        .pipeline(20)
        .run(ImportRequest::files(vec![file("notes.txt", &text)]))
        .await
        .unwrap();

    assert!(summary.is_success());
    assert_eq!(h.store.progress(), vec![0, 20, 40, 47]);
    assert_eq!(h.tree.merges().len(), 3);
    assert_eq!(h.tree.outline(), text.trim_end());

    // manifest and blob are gone once every chunk is durable
    assert_eq!(h.store.inner.keys(), vec![MANIFESTS_KEY]);
    assert_eq!(h.store.inner.peek(MANIFESTS_KEY), Some(json!({})));
}

#[tokio::test]
async fn test_interrupted_import_resumes_with_final_chunk_only() {
    let h = Harness::new();
    let text = numbered(47);
    h.tree.fail_on_merge(3);

    let summary = h
        .pipeline(20)
        .run(ImportRequest::files(vec![file("notes.txt", &text)]))
        .await
        .unwrap();

    assert_eq!(summary.completed(), 0);
    assert!(matches!(
        summary.files[0].result,
        Err(ImportError::Merge(MergeError::Failed(_)))
    ));
    assert_eq!(h.store.progress(), vec![0, 20, 40]);

    let pending = h.ledger().pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].manifest.lines_completed, 40);
    assert!(pending[0].has_blob);

    // a new process: fresh pipeline over the same durable state
    let summary = h.pipeline(20).run(ImportRequest::resume()).await.unwrap();

    assert!(summary.is_success());
    assert!(summary.files[0].resumed);
    let report = summary.files[0].result.as_ref().unwrap();
    assert_eq!(report.chunks_skipped, 2);
    assert_eq!(report.chunks_merged, 1);

    let merges = h.tree.merges();
    assert_eq!(merges.len(), 4);
    let last = &merges[3];
    assert!(last.text.starts_with("- line 41\n"));
    assert_eq!(last.text.lines().count(), 7);

    assert_eq!(h.tree.pulls().len(), 1);
    assert_eq!(h.tree.pulls()[0].0, vec![ThoughtId::home()]);
    assert!(h.tree.pulls()[0].1.force);

    assert_eq!(h.store.progress(), vec![0, 20, 40, 47]);
    assert_eq!(h.tree.outline(), text.trim_end());
    assert!(h.ledger().pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_resume_after_final_chunk_applies_nothing() {
    let h = Harness::new();
    let ledger = h.ledger();
    let manifest = ImportManifest::new(
        ImportId::from("done"),
        "done.txt",
        10,
        chrono::Utc::now(),
        DestinationPath::home(),
    )
    .with_lines_completed(3);
    ledger.upsert_manifest(&manifest).await.unwrap();
    ledger.put_blob(&manifest.id, "- a\n- b\n- c\n").await.unwrap();

    let summary = h.pipeline(2).run(ImportRequest::resume()).await.unwrap();

    assert!(summary.is_success());
    assert!(h.tree.merges().is_empty());
    assert!(ledger.pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_blob_imports_nothing_and_does_not_block_others() {
    let h = Harness::new();
    let ledger = h.ledger();
    let lost = ImportManifest::new(
        ImportId::from("a-lost"),
        "lost.txt",
        10,
        chrono::Utc::now(),
        DestinationPath::home(),
    );
    let kept = ImportManifest::new(
        ImportId::from("b-kept"),
        "kept.txt",
        10,
        chrono::Utc::now(),
        DestinationPath::home(),
    );
    ledger.upsert_manifest(&lost).await.unwrap();
    ledger.upsert_manifest(&kept).await.unwrap();
    ledger.put_blob(&kept.id, "- kept\n").await.unwrap();

    let summary = h.pipeline(20).run(ImportRequest::resume()).await.unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.files.len(), 2);
    let lost_report = summary.files[0].result.as_ref().unwrap();
    assert_eq!(lost_report.total_lines, 0);
    assert_eq!(lost_report.chunks_merged, 0);
    assert_eq!(h.merged_texts(), vec!["- kept\n"]);
    assert!(ledger.pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_resume_follows_creation_order_not_id_order() {
    let h = Harness::new();
    let ledger = h.ledger();
    for (id, text) in [("zz-first", "- first\n"), ("aa-second", "- second\n")] {
        let manifest = ImportManifest::new(
            ImportId::from(id),
            format!("{id}.txt"),
            text.len() as u64,
            chrono::Utc::now(),
            DestinationPath::home(),
        );
        ledger.upsert_manifest(&manifest).await.unwrap();
        ledger.put_blob(&manifest.id, text).await.unwrap();
    }

    let summary = h.pipeline(20).run(ImportRequest::resume()).await.unwrap();

    assert!(summary.is_success());
    let names: Vec<_> = summary.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["zz-first.txt", "aa-second.txt"]);
    assert_eq!(h.merged_texts(), vec!["- first\n", "- second\n"]);
    assert_eq!(h.tree.outline(), "- first\n- second");
}

#[tokio::test]
async fn test_failed_files_resume_in_the_order_they_were_given() {
    let h = Harness::new();
    h.tree.fail_on_merge(1);
    h.tree.fail_on_merge(2);

    let summary = h
        .pipeline(20)
        .run(ImportRequest::files(vec![
            file("one.txt", "- one\n"),
            file("two.txt", "- two\n"),
            file("three.txt", "- three\n"),
        ]))
        .await
        .unwrap();
    assert_eq!(summary.failed(), 2);

    let summary = h.pipeline(20).run(ImportRequest::resume()).await.unwrap();

    assert!(summary.is_success());
    let names: Vec<_> = summary.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["one.txt", "two.txt"]);
    assert_eq!(h.tree.outline(), "- three\n- one\n- two");
}

#[tokio::test]
async fn test_unrecorded_import_leaves_no_blob_behind() {
    let h = Harness::new();
    h.store.reject_manifest_writes();

    let summary = h
        .pipeline(20)
        .run(ImportRequest::files(vec![file("notes.txt", "- a\n")]))
        .await
        .unwrap();

    assert!(matches!(
        summary.files[0].result,
        Err(ImportError::Storage(StorageError::Backend(_)))
    ));
    assert!(h.tree.merges().is_empty());
    assert!(h.store.inner.keys().is_empty());
}

#[tokio::test]
async fn test_invalid_request_touches_nothing() {
    let h = Harness::new();

    let result = h.pipeline(20).run(ImportRequest::default()).await;

    assert!(matches!(result, Err(ImportError::InvalidRequest(_))));
    assert!(h.store.inner.calls().is_empty());
    assert!(h.tree.merges().is_empty());
    assert!(h.notifier.alerts().is_empty());
}

#[tokio::test]
async fn test_both_files_and_resume_is_rejected() {
    let h = Harness::new();
    let mut request = ImportRequest::files(vec![file("a.txt", "- a")]);
    request.resume = true;

    assert!(matches!(
        h.pipeline(20).run(request).await,
        Err(ImportError::InvalidRequest(_))
    ));
    assert!(h.store.inner.calls().is_empty());
}

#[tokio::test]
async fn test_legacy_snapshot_imports_like_current_one() {
    let legacy = json!({
        "thoughtIndex": {
            "__ROOT__": { "id": "__ROOT__", "value": "", "rank": 0, "children": ["a", "b"] },
            "a": { "id": "a", "value": "fruit", "rank": 1, "children": ["c"] },
            "b": { "id": "b", "value": "vegetables", "rank": 2 },
            "c": { "id": "c", "value": "apple", "rank": 1 }
        },
        "lexemeIndex": {}
    });
    let current = json!({
        "thoughtIndex": {
            "__ROOT__": { "id": "__ROOT__", "value": "", "rank": 0, "childrenMap": { "a": "a", "b": "b" } },
            "a": { "id": "a", "value": "fruit", "rank": 1, "childrenMap": { "c": "c" } },
            "b": { "id": "b", "value": "vegetables", "rank": 2, "childrenMap": {} },
            "c": { "id": "c", "value": "apple", "rank": 1, "childrenMap": {} }
        },
        "lexemeIndex": {}
    });

    let from_legacy = Harness::new();
    from_legacy
        .pipeline(20)
        .run(ImportRequest::files(vec![file("legacy.json", &legacy.to_string())]))
        .await
        .unwrap();

    let from_current = Harness::new();
    from_current
        .pipeline(20)
        .run(ImportRequest::files(vec![file("current.json", &current.to_string())]))
        .await
        .unwrap();

    assert_eq!(from_legacy.tree.outline(), "- fruit\n  - apple\n- vegetables");
    assert_eq!(from_legacy.merged_texts(), from_current.merged_texts());

    let alerts = from_legacy.notifier.values();
    assert!(alerts.contains(&Some("Parsing legacy.json".to_string())));
    assert!(alerts.contains(&Some("Normalizing legacy.json".to_string())));
}

#[tokio::test]
async fn test_malformed_snapshot_fails_only_that_file() {
    let h = Harness::new();

    let summary = h
        .pipeline(20)
        .run(ImportRequest::files(vec![
            file("broken.json", "{ not json"),
            file("fine.txt", "- fine\n"),
        ]))
        .await
        .unwrap();

    assert_eq!(summary.completed(), 1);
    assert!(matches!(
        summary.files[0].result,
        Err(ImportError::MalformedSnapshot(_))
    ));
    assert!(summary.files[1].result.is_ok());
    assert_eq!(h.tree.outline(), "- fine");

    // the broken file stays resumable; the finished one is cleaned up
    let pending = h.ledger().pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].manifest.name, "broken.json");
}

#[tokio::test]
async fn test_run_failure_scope_stops_remaining_files() {
    let h = Harness::new();
    let pipeline = ImportPipeline::with_settings(
        h.services(),
        ImportSettings::default().with_failure_scope(FailureScope::Run),
    );

    let summary = pipeline
        .run(ImportRequest::files(vec![
            file("broken.json", "{ not json"),
            file("never.txt", "- never\n"),
        ]))
        .await
        .unwrap();

    assert_eq!(summary.files.len(), 1);
    assert_eq!(summary.not_started, 1);
    assert!(!summary.is_success());
    assert!(h.tree.is_empty());
    assert_eq!(h.ledger().pending().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_chunks_and_files_merge_in_order() {
    let h = Harness::new();

    h.pipeline(2)
        .run(ImportRequest::files(vec![
            file("a.txt", "- a1\n- a2\n- a3\n"),
            file("b.txt", "- b1\n- b2\n"),
        ]))
        .await
        .unwrap();

    assert_eq!(
        h.merged_texts(),
        vec!["- a1\n- a2\n", "- a3\n", "- b1\n- b2\n"]
    );
    assert_eq!(
        h.tree.child_values(&ThoughtId::home()),
        vec!["a1", "a2", "a3", "b1", "b2"]
    );
}

#[tokio::test]
async fn test_chunk_starting_mid_hierarchy_keeps_its_parents() {
    let h = Harness::new();
    let text = "- fruit\n  - apple\n  - pear\n- vegetables\n  - leek\n";

    h.pipeline(2)
        .run(ImportRequest::files(vec![file("food.txt", text)]))
        .await
        .unwrap();

    assert_eq!(h.tree.outline(), text.trim_end());
    assert_eq!(h.tree.merges()[1].ancestors, vec!["- fruit"]);
}

#[tokio::test]
async fn test_insert_before_creates_one_placeholder_for_the_run() {
    let h = Harness::new();
    let home = ThoughtId::home();
    h.tree.insert(&home, "one");
    let two = h.tree.insert(&home, "two");

    let summary = h
        .pipeline(20)
        .run(
            ImportRequest::files(vec![file("a.txt", "- a\n"), file("b.txt", "- b\n")])
                .with_path(DestinationPath::home().child(two))
                .with_insert_before(true),
        )
        .await
        .unwrap();

    assert!(summary.is_success());
    assert_eq!(h.tree.child_values(&home), vec!["one", "", "two"]);

    let import_path = summary.import_path.unwrap();
    assert_eq!(import_path.len(), 2);
    assert_eq!(h.tree.child_values(&import_path.head()), vec!["a", "b"]);
    assert!(h
        .tree
        .merges()
        .iter()
        .all(|m| m.destination == import_path && m.suppress_cursor_move));
}

#[tokio::test]
async fn test_progress_alerts() {
    let h = Harness::new();
    let settings = ImportSettings {
        progress_clear_delay: Duration::from_millis(1500),
        complete_clear_delay: Duration::from_millis(3000),
        ..ImportSettings::default().with_chunk_size(2)
    };
    let pipeline = ImportPipeline::with_settings(h.services(), settings);

    pipeline
        .run(ImportRequest::files(vec![file(
            "a.txt",
            "- 1\n- 2\n- 3\n- 4\n- 5\n",
        )]))
        .await
        .unwrap();

    let alerts = h.notifier.alerts();
    let values: Vec<String> = alerts.iter().filter_map(|a| a.value.clone()).collect();
    assert_eq!(
        values,
        vec![
            "Reading a.txt",
            "Storing a.txt",
            "Importing a.txt... 33%",
            "Importing a.txt... 66%",
            "Importing a.txt... 100%",
            "Import complete",
        ]
    );
    assert_eq!(alerts[3].clear_delay, None);
    assert_eq!(alerts[4].clear_delay, Some(Duration::from_millis(1500)));
    assert_eq!(alerts[5].clear_delay, Some(Duration::from_millis(3000)));
}

#[tokio::test]
async fn test_multi_file_alerts_carry_position() {
    let h = Harness::new();

    h.pipeline(20)
        .run(ImportRequest::files(vec![
            file("a.txt", "- a\n"),
            file("b.txt", "- b\n"),
        ]))
        .await
        .unwrap();

    let values = h.notifier.values();
    assert!(values.contains(&Some("Reading a.txt (1/2)".to_string())));
    assert!(values.contains(&Some("Importing b.txt (2/2)... 100%".to_string())));
}

/// Merger whose durability signal is dropped without resolving
struct NeverDurable;

#[async_trait]
impl ImportMerger for NeverDurable {
    async fn dispatch(&self, _request: MergeRequest) -> Result<MergeReceipt, MergeError> {
        let (signal, receipt) = grove_core::durability_channel();
        drop(signal);
        Ok(receipt)
    }
}

#[tokio::test]
async fn test_no_cleanup_without_durability() {
    let h = Harness::new();
    let services = ImportServices {
        merger: Arc::new(NeverDurable),
        ..h.services()
    };

    let summary = ImportPipeline::new(services)
        .run(ImportRequest::files(vec![file("a.txt", "- a\n")]))
        .await
        .unwrap();

    assert!(matches!(
        summary.files[0].result,
        Err(ImportError::Merge(MergeError::Abandoned))
    ));
    let pending = h.ledger().pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].manifest.lines_completed, 0);
    assert!(pending[0].has_blob);
}

#[tokio::test]
async fn test_cancelled_token_stops_before_any_work() {
    let h = Harness::new();
    let token = CancellationToken::new();
    token.cancel();

    let result = h
        .pipeline(20)
        .with_cancellation(token)
        .run(ImportRequest::files(vec![file("a.txt", "- a\n")]))
        .await;

    assert!(matches!(result, Err(ImportError::Cancelled)));
    assert!(h.store.inner.calls().is_empty());
}

/// Cancels the token once the first file reports full progress
struct CancelAfterFirstFile {
    token: CancellationToken,
}

impl Notifier for CancelAfterFirstFile {
    fn alert(&self, alert: Alert) {
        if alert.value.is_some_and(|v| v.ends_with("100%")) {
            self.token.cancel();
        }
    }
}

#[tokio::test]
async fn test_cancellation_between_files() {
    let h = Harness::new();
    let token = CancellationToken::new();
    let services = ImportServices {
        notifier: Arc::new(CancelAfterFirstFile {
            token: token.clone(),
        }),
        ..h.services()
    };

    let summary = ImportPipeline::new(services)
        .with_cancellation(token)
        .run(ImportRequest::files(vec![
            file("a.txt", "- a\n"),
            file("b.txt", "- b\n"),
        ]))
        .await
        .unwrap();

    // the first file still finished its chunks and cleanup
    assert!(summary.cancelled);
    assert_eq!(summary.completed(), 1);
    assert_eq!(summary.not_started, 1);
    assert_eq!(h.tree.child_values(&ThoughtId::home()), vec!["a"]);
    assert!(h.ledger().pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_abandon_removes_manifest_and_blob() {
    let h = Harness::new();
    h.tree.fail_on_merge(1);
    let pipeline = h.pipeline(20);
    pipeline
        .run(ImportRequest::files(vec![file("a.txt", "- a\n")]))
        .await
        .unwrap();

    let pending = pipeline.pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    let id = pending[0].manifest.id.clone();

    assert!(pipeline.abandon(&id).await.unwrap());
    assert!(!pipeline.abandon(&id).await.unwrap());
    assert!(pipeline.pending().await.unwrap().is_empty());
    assert_eq!(h.store.inner.keys(), vec![MANIFESTS_KEY]);

    // nothing left to resume
    let summary = pipeline.run(ImportRequest::resume()).await.unwrap();
    assert!(summary.files.is_empty());
}

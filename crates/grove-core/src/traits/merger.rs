//! Import merger: applies one chunk of outline text to the thought tree

use crate::error::MergeError;
use crate::outline::{self, OutlineLine};
use crate::types::DestinationPath;
use async_trait::async_trait;
use tokio::sync::oneshot;

/// One chunk to merge beneath a destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    /// Verbatim chunk text
    pub text: String,

    /// Outline lines of the ancestors of the chunk's first line, outermost first.
    /// They were merged by an earlier chunk; merging them again must reuse the
    /// existing thoughts.
    pub ancestors: Vec<String>,

    /// Where the chunk attaches
    pub destination: DestinationPath,

    /// Do not move the editing cursor to the merged content
    pub suppress_cursor_move: bool,
}

impl MergeRequest {
    pub fn new(text: impl Into<String>, destination: DestinationPath) -> Self {
        Self {
            text: text.into(),
            ancestors: Vec::new(),
            destination,
            suppress_cursor_move: true,
        }
    }

    #[must_use]
    pub fn with_ancestors(mut self, ancestors: Vec<String>) -> Self {
        self.ancestors = ancestors;
        self
    }

    /// `(depth, value)` of every line to merge, ancestors first.
    ///
    /// Depths are relative to the destination: 0 attaches directly beneath it.
    pub fn entries(&self) -> Vec<(usize, String)> {
        let lines: Vec<OutlineLine> = self
            .ancestors
            .iter()
            .filter_map(|line| OutlineLine::parse(line))
            .chain(outline::parse_lines(&self.text))
            .collect();
        outline::depths(&lines)
            .into_iter()
            .zip(lines)
            .map(|(depth, line)| (depth, line.value))
            .collect()
    }
}

/// Completion handle returned by [`ImportMerger::dispatch`].
///
/// Resolves once the merged content has been durably persisted.
#[derive(Debug)]
pub struct MergeReceipt {
    rx: oneshot::Receiver<Result<(), MergeError>>,
}

/// Sending half of a [`MergeReceipt`], held by the merge engine
#[derive(Debug)]
pub struct DurabilitySignal {
    tx: oneshot::Sender<Result<(), MergeError>>,
}

/// Create a linked signal/receipt pair
pub fn durability_channel() -> (DurabilitySignal, MergeReceipt) {
    let (tx, rx) = oneshot::channel();
    (DurabilitySignal { tx }, MergeReceipt { rx })
}

impl DurabilitySignal {
    /// Report the durability outcome. A receiver that has gone away is ignored.
    pub fn resolve(self, result: Result<(), MergeError>) {
        let _ = self.tx.send(result);
    }
}

impl MergeReceipt {
    /// A receipt that is already resolved
    pub fn ready(result: Result<(), MergeError>) -> Self {
        let (signal, receipt) = durability_channel();
        signal.resolve(result);
        receipt
    }

    /// Wait until the merge is durable.
    ///
    /// Returns [`MergeError::Abandoned`] if the engine dropped its signal.
    pub async fn durable(self) -> Result<(), MergeError> {
        self.rx.await.unwrap_or(Err(MergeError::Abandoned))
    }
}

/// The merge engine.
///
/// Re-applying the same chunk to the same destination must not duplicate
/// content, as long as the destination subtree is fully loaded (see
/// [`crate::traits::SubtreeSync`]).
#[async_trait]
pub trait ImportMerger: Send + Sync {
    /// Start merging `request`; the returned receipt resolves when it is durable
    async fn dispatch(&self, request: MergeRequest) -> Result<MergeReceipt, MergeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_include_ancestors() {
        let request = MergeRequest::new("    - c\n  - d\n", DestinationPath::home())
            .with_ancestors(vec!["- a".to_string(), "  - b".to_string()]);
        assert_eq!(
            request.entries(),
            vec![
                (0, "a".to_string()),
                (1, "b".to_string()),
                (2, "c".to_string()),
                (1, "d".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_receipt_resolves_from_signal() {
        let (signal, receipt) = durability_channel();
        tokio::spawn(async move { signal.resolve(Ok(())) });
        assert!(receipt.durable().await.is_ok());
    }

    #[tokio::test]
    async fn test_dropped_signal_is_abandoned() {
        let (signal, receipt) = durability_channel();
        drop(signal);
        assert!(matches!(receipt.durable().await, Err(MergeError::Abandoned)));
    }
}

//! Notification helpers

use crate::traits::{Alert, Notifier};
use parking_lot::Mutex;
use std::sync::Arc;

/// Forwards alerts, dropping any whose value equals the alert currently shown.
///
/// Clears (`value: None`) are forwarded unless nothing is shown.
pub struct DedupNotifier {
    inner: Arc<dyn Notifier>,
    current: Mutex<Option<String>>,
}

impl DedupNotifier {
    pub fn new(inner: Arc<dyn Notifier>) -> Self {
        Self {
            inner,
            current: Mutex::new(None),
        }
    }
}

impl Notifier for DedupNotifier {
    fn alert(&self, alert: Alert) {
        {
            let mut current = self.current.lock();
            if current.is_some() && *current == alert.value {
                return;
            }
            if current.is_none() && alert.value.is_none() {
                return;
            }
            *current = alert.value.clone();
        }
        self.inner.alert(alert);
    }
}

/// Discards every alert
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn alert(&self, _alert: Alert) {}
}

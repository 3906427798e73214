//! User-facing notifications

use std::time::Duration;

/// Category of an alert, used to replace or clear alerts of the same kind
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AlertType {
    /// Progress of a file import
    ImportFile,
    Other(String),
}

/// A fire-and-forget alert. `value: None` clears the current alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub value: Option<String>,
    pub alert_type: Option<AlertType>,
    pub clear_delay: Option<Duration>,
}

impl Alert {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            alert_type: None,
            clear_delay: None,
        }
    }

    /// An alert that clears whatever is shown
    pub fn clear() -> Self {
        Self {
            value: None,
            alert_type: None,
            clear_delay: None,
        }
    }

    #[must_use]
    pub fn with_type(mut self, alert_type: AlertType) -> Self {
        self.alert_type = Some(alert_type);
        self
    }

    #[must_use]
    pub fn with_clear_delay(mut self, delay: Duration) -> Self {
        self.clear_delay = Some(delay);
        self
    }
}

/// Displays alerts. Implementations must not block.
pub trait Notifier: Send + Sync {
    fn alert(&self, alert: Alert);
}

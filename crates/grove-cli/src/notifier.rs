//! Terminal progress alerts

use colored::Colorize;
use grove_core::{Alert, Notifier};

/// Prints each alert as a line on stderr. Clears are not printed.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn alert(&self, alert: Alert) {
        if let Some(value) = alert.value {
            eprintln!("{}", value.dimmed());
        }
    }
}

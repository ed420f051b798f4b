//! Terminal progress for long transforms

use distmap::ProgressSink;
use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{spinner} [{elapsed_precise}] {msg} {bar:50} {pos}/{len} rows ({eta})";

/// Progress sink drawing an indicatif bar of completed rows
pub struct RowProgressBar {
    bar: ProgressBar,
}

impl RowProgressBar {
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        Self { bar }
    }

    /// Bar that never draws, for quiet runs and tests
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for RowProgressBar {
    fn rows_completed(&self, _completed: usize, total: usize) {
        let total = total as u64;
        if self.bar.length() != Some(total) {
            self.bar.set_length(total);
        }
        self.bar.inc(1);
    }
}

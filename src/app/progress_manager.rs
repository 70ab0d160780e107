//! Progress bar for the page download loop.

use antenati_core::{PageOutcome, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str = "{bar:40.cyan/blue} {pos}/{len} {msg}";

/// indicatif bar advanced once per processed page.
///
/// Draws to stderr and stays hidden when stderr is not a terminal.
pub(crate) struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    pub(crate) fn new(total_pages: usize) -> Self {
        let bar = ProgressBar::new(total_pages as u64);
        bar.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }

    #[cfg(test)]
    fn hidden(total_pages: usize) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(total_pages as u64);
        Self { bar }
    }

    pub(crate) fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressReporter for ProgressManager {
    fn page_finished(&self, page: u32, completed: usize, _total: usize, outcome: &PageOutcome) {
        let state = match outcome {
            PageOutcome::Downloaded { .. } => "downloaded",
            PageOutcome::Skipped => "already present",
        };
        self.bar.set_message(format!("page {page} {state}"));
        self.bar.set_position(completed as u64);
    }
}

//! Terminal progress bar for parsing passes.

use codesum_indexer::Progress;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;

const BAR_TEMPLATE: &str = "{msg} [{elapsed}] {wide_bar:.cyan/blue} {pos:>5}/{len:5}";

/// One bar per pass, drawn on stderr.
#[derive(Default)]
pub struct BarProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn with_bar(bar: ProgressBar) -> Self {
        Self {
            bar: Mutex::new(Some(bar)),
        }
    }

    #[cfg(test)]
    fn position(&self) -> Option<u64> {
        self.bar.lock().as_ref().map(ProgressBar::position)
    }
}

impl Progress for BarProgress {
    fn begin(&self, total: u64) {
        let bar = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
            bar.set_style(style);
        }
        bar.set_message("Parsing files");

        *self.bar.lock() = Some(bar);
    }

    fn advance(&self) {
        if let Some(bar) = self.bar.lock().as_ref() {
            bar.inc(1);
        }
    }

    fn finish(&self) {
        if let Some(bar) = self.bar.lock().take() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_lifecycle_per_pass() {
        let progress = BarProgress::new();
        assert_eq!(progress.position(), None);

        progress.begin(3);
        progress.advance();
        progress.advance();
        assert_eq!(progress.position(), Some(2));

        progress.finish();
        assert_eq!(progress.position(), None);

        // A second pass starts from zero
        progress.begin(1);
        assert_eq!(progress.position(), Some(0));
    }

    #[test]
    fn test_advance_without_begin_is_ignored() {
        let progress = BarProgress::new();
        progress.advance();
        progress.finish();
        assert_eq!(progress.position(), None);
    }

    #[test]
    fn test_hidden_bar_still_counts() {
        let progress = BarProgress::with_bar(ProgressBar::hidden());
        progress.advance();
        assert_eq!(progress.position(), Some(1));
    }
}

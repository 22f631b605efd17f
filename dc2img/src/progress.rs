use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::models::RunSummary;

pub const WINDOW_TITLE: &str = "Discord Bot Image Downloader";
pub const FINISHED_LABEL: &str = "Finished processing all messages!";
pub const INTERRUPTED_LABEL: &str = "Stopped early: the rest of the history could not be read";

pub fn processed_label(count: usize) -> String {
    format!("Messages processed: {}", count)
}

/// Receives progress from the download workflow. Called only from the task
/// driving the workflow.
pub trait ProgressObserver {
    fn on_message_processed(&mut self, count: usize);

    fn on_finished(&mut self, _summary: &RunSummary) {}
}

/// Terminal rendition of the counter window: a titled spinner whose label is
/// the processed count, switching to a completion label at the end. It lives
/// in the shared `MultiProgress` so log output can suspend it.
pub struct ProgressWindow {
    bar: ProgressBar,
}

impl ProgressWindow {
    pub fn open(progress: &MultiProgress) -> Self {
        let bar = progress.add(ProgressBar::new_spinner());
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{prefix:.bold} {spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix(WINDOW_TITLE);
        bar.set_message(processed_label(0));
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Keep the window up for `delay`, then take it down.
    pub async fn close_after(self, delay: Duration) {
        tokio::time::sleep(delay).await;
        self.bar.finish_and_clear();
    }
}

impl ProgressObserver for ProgressWindow {
    fn on_message_processed(&mut self, count: usize) {
        self.bar.set_message(processed_label(count));
    }

    fn on_finished(&mut self, summary: &RunSummary) {
        self.bar.disable_steady_tick();
        if summary.history_interrupted {
            self.bar.set_message(INTERRUPTED_LABEL);
        } else {
            self.bar.set_message(FINISHED_LABEL);
        }
        self.bar.tick();
    }
}

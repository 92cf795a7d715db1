//! Progress reporting using indicatif
//!
//! [`ConsoleProgress`] renders the pipeline's progress counters as one bar
//! per phase on stderr, leaving stdout free for the report.

use crate::pipeline::PipelineObserver;
use crate::utils::format::format_number;
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};
use std::sync::OnceLock;

/// Progress bar wrapper for displaying processing status
pub struct ProgressBar {
    bar: IndicatifBar,
}

impl ProgressBar {
    /// Create a new progress bar with known total
    pub fn new(total: usize, label: &str) -> Self {
        let bar = IndicatifBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{msg} [{bar:40.cyan/blue}] {percent:>3}% ({pos}/{len}) ({per_sec}) {eta}",
                )
                .expect("Invalid progress bar template")
                .progress_chars("█░"),
        );
        bar.set_message(label.to_string());

        Self { bar }
    }

    /// Update progress
    pub fn update(&self, current: usize) {
        self.bar.set_position(current as u64);
    }

    /// Finish with custom message
    pub fn finish_with_message(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Whether the bar has been finished
    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }
}

/// Console rendering of pipeline progress
#[derive(Default)]
pub struct ConsoleProgress {
    listing: OnceLock<ProgressBar>,
    processing: OnceLock<ProgressBar>,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PipelineObserver for ConsoleProgress {
    fn shards_discovered(&self, shards: usize) {
        if shards > 1 {
            eprintln!("Found {} shard prefixes.", format_number(shards));
        } else {
            eprintln!("Single shard detected or no deeper prefixes.");
        }
    }

    fn shard_listed(&self, done: usize, total: usize) {
        let bar = self
            .listing
            .get_or_init(|| ProgressBar::new(total, "Listing shards"));
        bar.update(done);
        if done == total {
            bar.finish_with_message("Listing shards done");
        }
    }

    fn files_discovered(&self, files: usize) {
        if let Some(bar) = self.listing.get() {
            if !bar.is_finished() {
                bar.finish_with_message("Listing shards stopped");
            }
        }
        eprintln!("Total log files: {}", format_number(files));
    }

    fn file_processed(&self, done: usize, total: usize) {
        let bar = self
            .processing
            .get_or_init(|| ProgressBar::new(total, "Processing logs"));
        // Throttle redraws.
        if done % 100 == 0 || done == total {
            bar.update(done);
        }
        if done == total {
            bar.finish_with_message("Processing logs done");
        }
    }
}

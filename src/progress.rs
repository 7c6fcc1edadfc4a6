//! Progress indicators for driftscan CLI.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tfstate::{AggregatedState, ProgressCallback};

use crate::ui;

/// Progress bar over the files of an aggregation scan.
#[derive(Default)]
pub struct ScanBar {
    bar: Option<ProgressBar>,
}

impl ScanBar {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressCallback for ScanBar {
    fn on_start(&mut self, total_files: usize) {
        let pb = ProgressBar::new(total_files as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        pb.set_style(style);
        self.bar = Some(pb);
    }

    fn on_file(&mut self, path: &Path) {
        if let Some(pb) = &self.bar {
            pb.set_message(ui::truncate_path(&path.display().to_string(), 50));
        }
    }

    fn on_file_complete(&mut self, _success: bool) {
        if let Some(pb) = &self.bar {
            pb.inc(1);
        }
    }

    fn on_complete(&mut self, _state: &AggregatedState) {
        if let Some(pb) = self.bar.take() {
            pb.finish_and_clear();
        }
    }
}

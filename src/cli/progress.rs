//! Download progress display
//!
//! A single indicatif bar on stderr. It starts as a byte-counting spinner and
//! turns into a proper bar as soon as the node announces the archive size.
//! Redraws are capped at a fixed rate so large downloads do not flood the
//! terminal.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::constants::progress::REFRESH_HZ;

const BAR_TEMPLATE: &str =
    "{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg} {bytes} ({bytes_per_sec})";

/// Progress display for one archive download
#[derive(Clone)]
pub struct DownloadProgress {
    bar: ProgressBar,
    sized: bool,
}

impl DownloadProgress {
    /// Visible progress on stderr (hidden automatically when stderr is not a terminal)
    pub fn new(label: &str) -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr_with_hz(REFRESH_HZ));
        Self::configure(bar, label)
    }

    /// Progress that tracks state without drawing anything
    pub fn hidden(label: &str) -> Self {
        Self::configure(ProgressBar::hidden(), label)
    }

    fn configure(bar: ProgressBar, label: &str) -> Self {
        bar.set_style(spinner_style());
        bar.set_message(label.to_string());
        Self { bar, sized: false }
    }

    /// Record `written` bytes out of `total`, if known
    pub fn update(&mut self, written: u64, total: Option<u64>) {
        if let Some(total) = total {
            if !self.sized {
                self.bar.set_length(total);
                self.bar.set_style(bar_style());
                self.sized = true;
            }
        }
        self.bar.set_position(written);
    }

    /// Bytes recorded so far
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

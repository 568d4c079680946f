//! Terminal progress bar for renders.

use indicatif::{ProgressBar, ProgressStyle};
use lumen_renderer::ProgressMonitor;

const TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg} {eta_precise}";

/// Shows completed work units (rows or buckets) as an indicatif bar.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new(unit: &'static str) -> Self {
        let bar = ProgressBar::new(0);
        match ProgressStyle::with_template(TEMPLATE) {
            Ok(style) => bar.set_style(style.progress_chars("#>-")),
            Err(err) => log::warn!("Invalid progress template, using default: {err}"),
        }
        bar.set_message(unit);
        Self { bar }
    }
}

impl ProgressMonitor for BarProgress {
    fn update(&mut self, remaining: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(total.saturating_sub(remaining) as u64);
    }

    fn finish(&mut self) {
        self.bar.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_tracks_completed_units() {
        let mut progress = BarProgress::new("rows");
        progress.bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());

        progress.update(10, 10);
        assert_eq!(progress.bar.position(), 0);
        progress.update(3, 10);
        assert_eq!(progress.bar.position(), 7);
        assert_eq!(progress.bar.length(), Some(10));

        progress.finish();
        assert!(progress.bar.is_finished());
    }
}

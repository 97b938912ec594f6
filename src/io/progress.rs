//! Terminal progress display for a multithreaded solve

use crate::io::configuration::{PROGRESS_BAR_STEPS, PROGRESS_BAR_WIDTH};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static SOLVE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] {{prefix}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{percent:>3}}% {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Single progress bar tracking solved cells and task counts
pub struct SolveProgress {
    bar: ProgressBar,
    task_count: usize,
}

impl SolveProgress {
    /// Create a bar for a run of `task_count` tasks
    pub fn new(name: &str, task_count: usize) -> Self {
        let bar = ProgressBar::new(PROGRESS_BAR_STEPS);
        bar.set_style(SOLVE_STYLE.clone());
        bar.set_prefix(name.to_string());
        Self { bar, task_count }
    }

    /// Show the solved fraction and how many tasks have finished
    ///
    /// The bar never moves backwards.
    pub fn update(&self, progress: f32, completed_tasks: usize) {
        let position = (f64::from(progress.clamp(0.0, 1.0)) * PROGRESS_BAR_STEPS as f64) as u64;
        if position > self.bar.position() {
            self.bar.set_position(position);
        }
        self.bar
            .set_message(format!("{completed_tasks}/{} tasks", self.task_count));
    }

    /// Complete the bar and leave it on screen
    pub fn finish(&self) {
        self.bar.set_position(PROGRESS_BAR_STEPS);
        self.bar.finish();
    }

    /// Current bar position in `0..=PROGRESS_BAR_STEPS`
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

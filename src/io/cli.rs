//! Command-line interface: learn rules from a PNG sample and solve a larger grid

use crate::algorithm::runner::{MultithreadedRunner, default_max_threads};
use crate::algorithm::solver::SolverSettings;
use crate::analysis::rules::Rules2D;
use crate::io::configuration::{
    DEFAULT_OUTPUT_SIZE, DEFAULT_SEED, MAX_GRID_DIMENSION, OUTPUT_SUFFIX, RUNNER_POLL_INTERVAL_MS,
};
use crate::io::error::{Result, invalid_parameter};
use crate::io::image::{Sample, export_solved_grid_png, load_sample_png};
use crate::io::progress::SolveProgress;
use crate::spatial::grid::SolvedGrid;
use crate::spatial::problem::Grid2DProblem;
use crate::spatial::rect::Rect2i;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "gridwfc")]
#[command(
    author,
    version,
    about = "Generate tile grids from a PNG sample with wave function collapse"
)]
/// Command-line arguments for the solver
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Sample PNG; every distinct colour becomes one tile
    #[arg(value_name = "SAMPLE")]
    pub sample: PathBuf,

    /// Output width in cells (implies square if height not specified)
    #[arg(short = 'w', long)]
    pub width: Option<usize>,

    /// Output height in cells
    #[arg(short = 'H', long)]
    pub height: Option<usize>,

    /// Worker threads; the grid is split for this many
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Random seed for reproducible generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Mark contradicting cells as failed instead of undoing guesses
    #[arg(long)]
    pub no_backtracking: bool,

    /// Give up backtracking after this many undone guesses per task
    #[arg(long)]
    pub backtracking_limit: Option<usize>,

    /// Propagate with AC3 revision instead of AC4 support counting
    #[arg(long)]
    pub ac3: bool,

    /// Pick tiles in proportion to their frequency in the sample
    #[arg(long)]
    pub weighted: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Log solver diagnostics
    #[arg(short, long)]
    pub verbose: bool,

    /// Output PNG path (defaults to <sample>_result.png)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Output `(width, height)` in cells
    pub fn output_size(&self) -> (usize, usize) {
        match (self.width, self.height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, w),
            (None, Some(h)) => (h, h),
            (None, None) => (DEFAULT_OUTPUT_SIZE, DEFAULT_OUTPUT_SIZE),
        }
    }

    /// Thread cap for the runner
    pub fn thread_count(&self) -> usize {
        self.threads.unwrap_or_else(default_max_threads)
    }

    /// Solver settings selected by the flags
    pub fn solver_settings(&self) -> SolverSettings {
        SolverSettings {
            allow_backtracking: !self.no_backtracking,
            backtracking_limit: self.backtracking_limit,
            force_ac3: self.ac3,
            seed: self.seed,
        }
    }

    /// Reject sizes and thread counts the solver cannot use
    ///
    /// # Errors
    ///
    /// Returns an invalid parameter error for a zero or oversized dimension,
    /// or a zero thread count
    pub fn validate(&self) -> Result<()> {
        let (width, height) = self.output_size();
        for (parameter, value) in [("width", width), ("height", height)] {
            if value == 0 || value > MAX_GRID_DIMENSION {
                return Err(invalid_parameter(
                    parameter,
                    &value,
                    &format!("must be between 1 and {MAX_GRID_DIMENSION}"),
                ));
            }
        }
        if self.threads == Some(0) {
            return Err(invalid_parameter("threads", &0, &"must be at least 1"));
        }
        Ok(())
    }

    /// Where the result is written
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| Self::default_output_path(&self.sample))
    }

    fn default_output_path(sample_path: &Path) -> PathBuf {
        let stem = sample_path.file_stem().unwrap_or_default();
        let output_name = format!("{}{OUTPUT_SUFFIX}.png", stem.to_string_lossy());

        if let Some(parent) = sample_path.parent() {
            parent.join(output_name)
        } else {
            PathBuf::from(output_name)
        }
    }
}

/// Drives one solve from sample to exported image
pub struct SolveProcessor {
    cli: Cli,
}

impl SolveProcessor {
    /// Create a processor for the given CLI arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Arguments the processor was created with
    pub const fn cli(&self) -> &Cli {
        &self.cli
    }

    /// Load the sample, solve and export the result
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments are invalid, the sample cannot be
    /// loaded or learned from, or the result cannot be written
    pub fn process(&self) -> Result<()> {
        self.cli.validate()?;
        let sample = load_sample_png(&self.cli.sample)?;
        let grid = self.solve_sample(&sample)?;

        let output_path = self.cli.output_path();
        export_solved_grid_png(&grid, &sample.palette, &output_path)?;
        tracing::debug!(path = %output_path.display(), "exported result");
        Ok(())
    }

    /// Learn rules from `sample` and solve a grid of the requested size
    ///
    /// # Errors
    ///
    /// Returns an error if the sample cannot be turned into rules
    pub fn solve_sample(&self, sample: &Sample) -> Result<SolvedGrid> {
        let start_time = Instant::now();
        let mut rules = Rules2D::from_sample(&sample.labels, sample.tile_count())?;
        rules.set_probabilities_enabled(self.cli.weighted);

        let (width, height) = self.cli.output_size();
        let rect = Rect2i::from_size(width as i32, height as i32);
        let problem = Grid2DProblem::new(Arc::new(rules), rect);

        let threads = self.cli.thread_count();
        let sub_problems = problem.split(threads);
        tracing::debug!(
            tiles = sample.tile_count(),
            %rect,
            tasks = sub_problems.len(),
            threads,
            "solving"
        );

        let progress = self.cli.should_show_progress().then(|| {
            let name = self
                .cli
                .sample
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            SolveProgress::new(&name, sub_problems.len())
        });

        let mut runner = MultithreadedRunner::new();
        runner.start(sub_problems, self.cli.solver_settings(), threads);
        while !runner.update() {
            if let Some(ref bar) = progress {
                bar.update(runner.get_progress(), runner.get_completed_task_count());
            }
            std::thread::sleep(Duration::from_millis(RUNNER_POLL_INTERVAL_MS));
        }
        if let Some(ref bar) = progress {
            bar.finish();
        }

        let grid = runner.solved_grid(rect);
        if !grid.is_complete() {
            tracing::warn!(unsolved = grid.unsolved_count(), "some cells have no tile");
        }
        tracing::debug!(elapsed = ?start_time.elapsed(), "solve finished");
        Ok(grid)
    }
}

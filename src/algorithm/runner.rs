//! Dependency-ordered parallel solving of split sub-problems
//!
//! Every sub-problem becomes a task in an index-addressed arena. A task
//! starts once all of its dependencies have completed, after the solved
//! cells along their shared borders have been copied in as preconditions.
//! Each running task owns one OS thread and one solver; the only state
//! shared across threads is each task's counters and latest snapshot.

use crate::algorithm::solver::{Solver, SolverSettings};
use crate::algorithm::state::SolverState;
use crate::io::configuration::MAX_DEFAULT_THREADS;
use crate::spatial::grid::SolvedGrid;
use crate::spatial::problem::Grid2DProblem;
use crate::spatial::rect::Rect2i;
use crate::spatial::split::SubProblem;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

/// Thread cap used when none is given: one less than the hardware threads, within `1..=MAX_DEFAULT_THREADS`
pub fn default_max_threads() -> usize {
    let hardware_threads = thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
    hardware_threads
        .saturating_sub(1)
        .clamp(1, MAX_DEFAULT_THREADS)
}

struct Task {
    rect: Rect2i,
    renderable_rect: Rect2i,
    cell_count: usize,
    dependencies: Vec<usize>,
    started: AtomicBool,
    completed: AtomicBool,
    unsolved_cells: AtomicUsize,
    snapshot_requested: AtomicBool,
    snapshot: Mutex<Option<Arc<SolverState>>>,
}

impl Task {
    fn new(problem: &Grid2DProblem, dependencies: Vec<usize>) -> Self {
        Self {
            rect: problem.rect(),
            renderable_rect: problem.renderable_rect(),
            cell_count: problem.cell_count(),
            dependencies,
            started: AtomicBool::new(false),
            completed: AtomicBool::new(false),
            unsolved_cells: AtomicUsize::new(problem.cell_count()),
            snapshot_requested: AtomicBool::new(false),
            snapshot: Mutex::new(None),
        }
    }

    fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    fn snapshot(&self) -> Option<Arc<SolverState>> {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store_snapshot(&self, snapshot: Arc<SolverState>) {
        *self
            .snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
    }

    fn publish_unsolved(&self, unsolved: usize) {
        self.unsolved_cells.fetch_min(unsolved, Ordering::AcqRel);
    }
}

/// Copy committed tiles from a finished dependency into `target`'s preconditions
///
/// `source_solutions` holds the dependency's solution-or-entropy values over
/// `source_rect`. Only cells inside `read_rect`, both rects, and holding a
/// non-negative value are written. Returns the number of cells copied.
pub fn copy_boundary_solutions(
    target: &mut Grid2DProblem,
    source_rect: Rect2i,
    source_solutions: &[i64],
    read_rect: Rect2i,
) -> usize {
    if !read_rect.has_area() {
        return 0;
    }

    let target_rect = target.rect();
    let source_width = usize::try_from(source_rect.size.x).unwrap_or(0);
    let mut copied = 0;

    for point in read_rect.points() {
        if !source_rect.has_point(point) || !target_rect.has_point(point) {
            continue;
        }
        let source_local = point - source_rect.position;
        let source_id = source_local.y as usize * source_width + source_local.x as usize;
        let Some(tile) = source_solutions
            .get(source_id)
            .and_then(|&value| usize::try_from(value).ok())
        else {
            continue;
        };
        let Some(target_id) = target.coord_to_id(point - target_rect.position) else {
            continue;
        };
        target.set_precondition_solution(target_id, tile);
        copied += 1;
    }

    copied
}

fn run_task(
    index: usize,
    task: &Task,
    problem: Arc<Grid2DProblem>,
    settings: SolverSettings,
    interrupted: &AtomicBool,
) {
    tracing::trace!(index, rect = %task.rect, "task started");

    let mut solver = match Solver::new(problem, settings) {
        Ok(solver) => solver,
        Err(error) => {
            tracing::error!(index, %error, "could not initialize solver");
            task.completed.store(true, Ordering::Release);
            return;
        }
    };
    task.publish_unsolved(solver.get_current_state().get_unsolved_cells());

    while !interrupted.load(Ordering::Acquire)
        && solver.get_current_state().get_unsolved_cells() > 0
    {
        let done = match solver.solve_step() {
            Ok(done) => done,
            Err(error) => {
                tracing::error!(index, %error, "solver step failed");
                true
            }
        };

        let state = solver.get_current_state();
        task.publish_unsolved(state.get_unsolved_cells());
        if task.snapshot_requested.swap(false, Ordering::AcqRel) {
            task.store_snapshot(state.make_snapshot());
        }

        if done {
            break;
        }
    }

    let state = solver.get_current_state();
    task.publish_unsolved(state.get_unsolved_cells());
    task.store_snapshot(state.make_snapshot());
    solver.current_state_mut().unlink_from_previous();

    tracing::trace!(
        index,
        backtracks = solver.backtrack_count(),
        unsolved = solver.get_current_state().get_unsolved_cells(),
        "task finished"
    );
    task.completed.store(true, Ordering::Release);
}

/// Runs split sub-problems concurrently, honouring their dependencies
///
/// Drive it by calling [`MultithreadedRunner::update`] until it returns
/// `true`. Dropping the runner interrupts and joins every running task.
pub struct MultithreadedRunner {
    tasks: Vec<Arc<Task>>,
    problems: Vec<Arc<Grid2DProblem>>,
    handles: Vec<Option<JoinHandle<()>>>,
    interrupted: Arc<AtomicBool>,
    settings: SolverSettings,
    max_threads: usize,
}

impl Default for MultithreadedRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MultithreadedRunner {
    /// Create an idle runner with the default thread cap
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            problems: Vec::new(),
            handles: Vec::new(),
            interrupted: Arc::new(AtomicBool::new(false)),
            settings: SolverSettings::default(),
            max_threads: default_max_threads(),
        }
    }

    /// Maximum number of tasks running at once
    pub const fn max_threads(&self) -> usize {
        self.max_threads
    }

    /// Change the thread cap for tasks started from now on; zero is raised to one
    pub fn set_max_threads(&mut self, max_threads: usize) {
        self.max_threads = max_threads.max(1);
    }

    /// Interrupt any previous run, then schedule `sub_problems`
    ///
    /// A `max_threads` of zero keeps the current cap. Task `i` solves with
    /// seed `settings.seed + i`.
    pub fn start(&mut self, sub_problems: Vec<SubProblem>, settings: SolverSettings, max_threads: usize) {
        self.interrupt();

        if max_threads > 0 {
            self.max_threads = max_threads;
        }
        self.settings = settings;
        self.interrupted = Arc::new(AtomicBool::new(false));

        let count = sub_problems.len();
        self.tasks = Vec::with_capacity(count);
        self.problems = Vec::with_capacity(count);
        self.handles = Vec::with_capacity(count);
        for SubProblem {
            problem,
            dependencies,
        } in sub_problems
        {
            self.tasks.push(Arc::new(Task::new(&problem, dependencies)));
            self.problems.push(Arc::new(problem));
            self.handles.push(None);
        }

        tracing::debug!(tasks = count, max_threads = self.max_threads, "runner started");
        self.start_available_tasks();
    }

    fn is_task_blocked(&self, index: usize) -> bool {
        self.tasks.get(index).is_none_or(|task| {
            task.dependencies.iter().any(|&dependency| {
                dependency != index
                    && self
                        .tasks
                        .get(dependency)
                        .is_some_and(|dependency_task| !dependency_task.is_completed())
            })
        })
    }

    fn start_available_tasks(&mut self) -> usize {
        let mut running = self
            .tasks
            .iter()
            .filter(|task| task.is_started() && !task.is_completed())
            .count();
        let mut started = 0;

        for index in 0..self.tasks.len() {
            if running >= self.max_threads {
                break;
            }
            let Some(task) = self.tasks.get(index).map(Arc::clone) else {
                continue;
            };
            if task.is_started() || self.is_task_blocked(index) {
                continue;
            }

            self.import_boundaries(index, &task);
            let Some(problem) = self.problems.get(index).map(Arc::clone) else {
                continue;
            };

            let mut settings = self.settings.clone();
            settings.seed = settings.seed.wrapping_add(index as u64);
            let interrupted = Arc::clone(&self.interrupted);
            let thread_task = Arc::clone(&task);

            task.started.store(true, Ordering::Release);
            let spawned = thread::Builder::new()
                .name(format!("wfc-task-{index}"))
                .spawn(move || run_task(index, &thread_task, problem, settings, &interrupted));

            match spawned {
                Ok(handle) => {
                    if let Some(slot) = self.handles.get_mut(index) {
                        *slot = Some(handle);
                    }
                    started += 1;
                    running += 1;
                }
                Err(error) => {
                    task.started.store(false, Ordering::Release);
                    tracing::warn!(index, %error, "could not spawn task thread");
                    break;
                }
            }
        }

        started
    }

    fn import_boundaries(&mut self, index: usize, task: &Task) {
        let Some(problem) = self.problems.get_mut(index) else {
            return;
        };
        let read_rects = problem.init_read_rects().to_vec();

        for (&dependency, read_rect) in task.dependencies.iter().zip(read_rects) {
            let Some(dependency_task) = self.tasks.get(dependency) else {
                continue;
            };
            let Some(snapshot) = dependency_task.snapshot() else {
                continue;
            };
            let copied = copy_boundary_solutions(
                Arc::make_mut(problem),
                dependency_task.rect,
                snapshot.get_cell_solution_or_entropy(),
                read_rect,
            );
            tracing::trace!(index, dependency, %read_rect, copied, "imported boundary solutions");
        }
    }

    /// Join finished tasks and start newly unblocked ones
    ///
    /// Never blocks on a running solver. Returns `true` once every task has completed.
    pub fn update(&mut self) -> bool {
        if self.tasks.is_empty() {
            return true;
        }

        for (task, slot) in self.tasks.iter().zip(self.handles.iter_mut()) {
            let finished = slot
                .as_ref()
                .is_some_and(|handle| task.is_completed() || handle.is_finished());
            if !finished {
                continue;
            }
            if let Some(handle) = slot.take() {
                if handle.join().is_err() {
                    tracing::warn!(rect = %task.rect, "task thread panicked");
                    task.completed.store(true, Ordering::Release);
                }
            }
        }

        if !self.interrupted.load(Ordering::Acquire) {
            self.start_available_tasks();
        }

        self.tasks.iter().all(|task| task.is_completed())
    }

    /// Stop every task at its next step boundary and wait for the threads to exit
    ///
    /// Tasks that never started are marked completed without a snapshot, so
    /// [`MultithreadedRunner::update`] reports completion afterwards.
    pub fn interrupt(&mut self) {
        self.interrupted.store(true, Ordering::Release);
        for slot in &mut self.handles {
            if let Some(handle) = slot.take() {
                if handle.join().is_err() {
                    tracing::warn!("task thread panicked during interrupt");
                }
            }
        }

        let mut skipped = 0;
        for task in &self.tasks {
            if !task.is_started() {
                task.started.store(true, Ordering::Release);
                task.completed.store(true, Ordering::Release);
                skipped += 1;
            }
        }
        if skipped > 0 {
            tracing::debug!(skipped, "interrupted before some tasks started");
        }
    }

    /// Fraction of cells solved across all tasks, 1.0 when there are none
    pub fn get_progress(&self) -> f32 {
        let (total, unsolved) = self.tasks.iter().fold((0usize, 0usize), |(cells, open), task| {
            (
                cells + task.cell_count,
                open + task.unsolved_cells.load(Ordering::Acquire),
            )
        });
        if total == 0 {
            return 1.0;
        }
        1.0 - unsolved as f32 / total as f32
    }

    /// Whether any task is currently running
    pub fn is_running(&self) -> bool {
        self.tasks
            .iter()
            .any(|task| task.is_started() && !task.is_completed())
    }

    /// Whether [`MultithreadedRunner::start`] has scheduled any tasks
    pub fn is_started(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Ask every running task to publish a snapshot after its next step
    pub fn request_snapshots(&self) {
        for task in &self.tasks {
            if task.is_started() && !task.is_completed() {
                task.snapshot_requested.store(true, Ordering::Release);
            }
        }
    }

    /// Latest published state of a task
    ///
    /// `None` until the task publishes, and for tasks an interrupt kept from starting.
    pub fn get_task_snapshot(&self, index: usize) -> Option<Arc<SolverState>> {
        self.tasks.get(index)?.snapshot()
    }

    /// Number of scheduled tasks
    pub fn get_task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Number of tasks that have finished
    pub fn get_completed_task_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.is_completed()).count()
    }

    /// Combine the latest snapshots into one grid over `rect`
    ///
    /// Each task contributes only its renderable region.
    pub fn solved_grid(&self, rect: Rect2i) -> SolvedGrid {
        let mut grid = SolvedGrid::new(rect);
        for task in &self.tasks {
            if let Some(snapshot) = task.snapshot() {
                grid.write_region(task.rect, &snapshot, task.renderable_rect);
            }
        }
        grid
    }
}

impl Drop for MultithreadedRunner {
    fn drop(&mut self) {
        self.interrupt();
    }
}

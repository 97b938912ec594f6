//! Solver constants and runtime configuration defaults

// Default values for configurable parameters
/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;

/// Output width and height in cells when neither is given
pub const DEFAULT_OUTPUT_SIZE: usize = 64;

// Safety limit to prevent excessive memory allocation
/// Maximum allowed grid dimension
pub const MAX_GRID_DIMENSION: usize = 10_000;

/// Most distinct colours a sample may contain
pub const MAX_SAMPLE_TILES: usize = 4096;

// Threading
/// Upper bound of the default runner thread cap
pub const MAX_DEFAULT_THREADS: usize = 4;

/// Delay between runner polls in the command-line front end
pub const RUNNER_POLL_INTERVAL_MS: u64 = 10;

// Progress bar display settings
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 50;

/// Resolution of the progress bar position
pub const PROGRESS_BAR_STEPS: u64 = 1000;

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_result";

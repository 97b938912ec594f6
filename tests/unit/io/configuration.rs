//! Tests for solver configuration constants

#[cfg(test)]
mod tests {
    use gridwfc::io::configuration::{
        DEFAULT_OUTPUT_SIZE, DEFAULT_SEED, MAX_DEFAULT_THREADS, MAX_GRID_DIMENSION,
        MAX_SAMPLE_TILES, OUTPUT_SUFFIX, PROGRESS_BAR_STEPS, PROGRESS_BAR_WIDTH,
        RUNNER_POLL_INTERVAL_MS,
    };

    // Tests the default seed value
    // Verified by changing the constant
    #[test]
    fn test_default_seed() {
        assert_eq!(DEFAULT_SEED, 42);
    }

    // Tests the default output fits inside the dimension limit
    #[test]
    fn test_default_output_size_within_limit() {
        assert!(DEFAULT_OUTPUT_SIZE > 0);
        assert!(DEFAULT_OUTPUT_SIZE <= MAX_GRID_DIMENSION);
        assert_eq!(MAX_GRID_DIMENSION, 10_000);
    }

    // Tests threading limits allow at least one worker
    #[test]
    fn test_threading_limits() {
        assert!(MAX_DEFAULT_THREADS >= 1);
        assert!(RUNNER_POLL_INTERVAL_MS > 0);
    }

    // Tests display and output settings
    #[test]
    fn test_display_settings() {
        assert_eq!(PROGRESS_BAR_WIDTH, 50);
        assert_eq!(PROGRESS_BAR_STEPS, 1000);
        assert!(MAX_SAMPLE_TILES >= 2);
        assert_eq!(OUTPUT_SUFFIX, "_result");
    }
}

//! Tests for the solve progress bar

#[cfg(test)]
mod tests {
    use gridwfc::io::configuration::PROGRESS_BAR_STEPS;
    use gridwfc::io::progress::SolveProgress;

    // Tests the bar follows the solved fraction
    // Verified by ignoring the progress argument
    #[test]
    fn test_progress_position() {
        let progress = SolveProgress::new("sample.png", 4);
        assert_eq!(progress.position(), 0);

        progress.update(0.5, 1);
        assert_eq!(progress.position(), PROGRESS_BAR_STEPS / 2);
    }

    // Tests the bar never moves backwards
    // Verified by setting the position unconditionally
    #[test]
    fn test_progress_never_decreases() {
        let progress = SolveProgress::new("sample.png", 2);
        progress.update(0.75, 1);
        progress.update(0.25, 1);
        assert_eq!(progress.position(), PROGRESS_BAR_STEPS * 3 / 4);
    }

    // Tests out-of-range fractions are clamped and finishing fills the bar
    #[test]
    fn test_progress_clamp_and_finish() {
        let progress = SolveProgress::new("sample.png", 1);
        progress.update(3.0, 0);
        assert_eq!(progress.position(), PROGRESS_BAR_STEPS);

        let other = SolveProgress::new("other.png", 1);
        other.update(-1.0, 0);
        assert_eq!(other.position(), 0);
        other.finish();
        assert_eq!(other.position(), PROGRESS_BAR_STEPS);
    }
}

//! Tests for assembling solved tiles into one grid

#[cfg(test)]
mod tests {
    use gridwfc::algorithm::state::SolverState;
    use gridwfc::spatial::grid::{SolvedGrid, UNSOLVED_TILE};
    use gridwfc::spatial::rect::{Rect2i, Vec2i};

    // Verifies a new grid is entirely unsolved
    #[test]
    fn test_new_grid() {
        let grid = SolvedGrid::new(Rect2i::new(2, 2, 3, 2));
        assert_eq!(grid.tiles().dim(), (2, 3));
        assert!(grid.tiles().iter().all(|&v| v == UNSOLVED_TILE));
        assert_eq!(grid.unsolved_count(), 6);
        assert!(!grid.is_complete());
        assert_eq!(grid.get(Vec2i::new(2, 2)), None);
    }

    // Tests writes are limited to the region and skip open or failed cells
    // Verified by writing the whole source rect instead of the region
    #[test]
    fn test_write_region() {
        let source_rect = Rect2i::new(0, 0, 3, 1);
        let mut state = SolverState::new(3, 2);
        state.set_solution(0, 1);
        state.set_solution(1, 0);
        state.mark_failed(2);

        let mut grid = SolvedGrid::new(Rect2i::from_size(3, 1));
        let written = grid.write_region(source_rect, &state, Rect2i::new(1, 0, 2, 1));
        assert_eq!(written, 1);
        assert_eq!(grid.get(Vec2i::new(0, 0)), None);
        assert_eq!(grid.get(Vec2i::new(1, 0)), Some(0));
        assert_eq!(grid.get(Vec2i::new(2, 0)), None);
    }

    // Tests source cells are mapped through the source rect offset
    #[test]
    fn test_write_region_offset() {
        let source_rect = Rect2i::new(4, 2, 2, 2);
        let mut state = SolverState::new(4, 3);
        for id in 0..4 {
            state.set_solution(id, id % 3);
        }

        let mut grid = SolvedGrid::new(Rect2i::new(4, 2, 2, 2));
        assert_eq!(grid.write_region(source_rect, &state, source_rect), 4);
        assert!(grid.is_complete());
        assert_eq!(grid.get(Vec2i::new(5, 3)), Some(0));
        assert_eq!(grid.get(Vec2i::new(4, 3)), Some(2));
        assert_eq!(grid.tiles()[[0, 1]], 1);
    }
}

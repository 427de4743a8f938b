#![no_std]

//! Line checks for grid-based connection games (tic-tac-toe, connect-N, gomoku).
//!
//! Boards are flat row-major slices: the cell at `(row, col)` lives at
//! `row * cols + col`. Every check looks "forward" from a starting cell only
//! (right, down-right, down, down-left), so a line is examined from exactly one
//! of its two ends and never counted twice.

/// One of the four forward scanning directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Right,
    DownRight,
    Down,
    DownLeft,
}

impl Direction {
    /// All forward directions, in scan order.
    pub const FORWARD: [Direction; 4] = [
        Direction::Right,
        Direction::DownRight,
        Direction::Down,
        Direction::DownLeft,
    ];

    /// Returns true if a line of `line_size` cells starting at `start` and
    /// running in this direction stays inside a `cols` x `rows` grid.
    pub fn fits(self, start: usize, cols: usize, rows: usize, line_size: usize) -> bool {
        if cols == 0 || line_size == 0 {
            return false;
        }
        let row = start / cols;
        let col = start % cols;
        let room_right = col + line_size <= cols;
        let room_down = row + line_size <= rows;
        let room_left = col + 1 >= line_size;
        match self {
            Direction::Right => room_right && row < rows,
            Direction::DownRight => room_right && room_down,
            Direction::Down => room_down,
            Direction::DownLeft => room_left && room_down,
        }
    }

    /// Index offset between consecutive cells of a line in this direction.
    ///
    /// `DownLeft` is `cols - 1`, which is only meaningful once `fits` has
    /// confirmed there is room to the left.
    pub fn stride(self, cols: usize) -> usize {
        match self {
            Direction::Right => 1,
            Direction::DownRight => cols + 1,
            Direction::Down => cols,
            Direction::DownLeft => cols - 1,
        }
    }
}

/// Checks whether `line_size` consecutive cells starting at `start` in
/// `direction` all hold `player`.
///
/// # Arguments
/// * `board` - The board data as a flat slice
/// * `cols` - Board width
/// * `rows` - Board height
/// * `start` - Flat index of the first cell of the line
/// * `direction` - Direction the line runs in
/// * `player` - The mark to look for (e.g., 1 or -1)
/// * `line_size` - Number of consecutive pieces needed to win
pub fn is_line_from(
    board: &[i32],
    cols: usize,
    rows: usize,
    start: usize,
    direction: Direction,
    player: i32,
    line_size: usize,
) -> bool {
    if !direction.fits(start, cols, rows, line_size) {
        return false;
    }
    let stride = direction.stride(cols);
    (0..line_size).all(|k| board.get(start + k * stride) == Some(&player))
}

/// Returns the mark at `start` if it begins a complete forward line of
/// `line_size` cells in any direction. Empty cells (mark 0) never own a line.
pub fn forward_line_owner(
    board: &[i32],
    cols: usize,
    rows: usize,
    start: usize,
    line_size: usize,
) -> Option<i32> {
    let player = *board.get(start)?;
    if player == 0 {
        return None;
    }
    Direction::FORWARD
        .iter()
        .any(|&direction| is_line_from(board, cols, rows, start, direction, player, line_size))
        .then_some(player)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_respects_edges() {
        // 3x3, line of 3
        assert!(Direction::Right.fits(0, 3, 3, 3));
        assert!(!Direction::Right.fits(1, 3, 3, 3));
        assert!(Direction::Down.fits(2, 3, 3, 3));
        assert!(!Direction::Down.fits(3, 3, 3, 3));
        assert!(Direction::DownLeft.fits(2, 3, 3, 3));
        assert!(!Direction::DownLeft.fits(1, 3, 3, 3));
        assert!(Direction::DownRight.fits(0, 3, 3, 3));
        assert!(!Direction::DownRight.fits(1, 3, 3, 3));
    }

    #[test]
    fn detects_each_direction() {
        let horizontal = [1, 1, 1, 0, 0, 0, 0, 0, 0];
        let vertical = [0, -1, 0, 0, -1, 0, 0, -1, 0];
        let diagonal = [1, 0, 0, 0, 1, 0, 0, 0, 1];
        let anti_diagonal = [0, 0, -1, 0, -1, 0, -1, 0, 0];

        assert_eq!(forward_line_owner(&horizontal, 3, 3, 0, 3), Some(1));
        assert_eq!(forward_line_owner(&vertical, 3, 3, 1, 3), Some(-1));
        assert_eq!(forward_line_owner(&diagonal, 3, 3, 0, 3), Some(1));
        assert_eq!(forward_line_owner(&anti_diagonal, 3, 3, 2, 3), Some(-1));
    }

    #[test]
    fn line_is_only_seen_from_its_forward_end() {
        let horizontal = [1, 1, 1, 0, 0, 0, 0, 0, 0];
        assert_eq!(forward_line_owner(&horizontal, 3, 3, 2, 3), None);
        assert_eq!(forward_line_owner(&horizontal, 3, 3, 0, 3), Some(1));
        assert_eq!(forward_line_owner(&horizontal, 3, 3, 3, 3), None);
    }

    #[test]
    fn rectangular_boards() {
        // 2 rows x 4 cols, connect 2 on the down-left diagonal from (0,3)
        let board = [0, 0, 0, 1, 0, 0, 1, 0];
        assert_eq!(forward_line_owner(&board, 4, 2, 3, 2), Some(1));
        assert!(!Direction::Down.fits(4, 4, 2, 2));
    }
}

//! The board: a fixed 15×15 grid of claimed-or-empty cells.

use parlor_protocol::{CellPos, TeamColor};

/// Board side length.
pub const BOARD_SIZE: usize = 15;

/// Minimum unbroken line length that can end a game.
pub const WIN_LENGTH: usize = 5;

/// The four scan directions: horizontal, vertical, both diagonals.
/// The reverse directions are covered because every line has a start cell.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// A 15×15 board. Cells are set once and never revert to empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<TeamColor>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self {
            cells: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Whether `pos` is on the board at all.
    pub fn in_bounds(pos: CellPos) -> bool {
        pos[0] < BOARD_SIZE && pos[1] < BOARD_SIZE
    }

    /// The color occupying `pos`, or `None` for an empty cell.
    /// Out-of-bounds positions read as empty.
    pub fn cell(&self, pos: CellPos) -> Option<TeamColor> {
        if !Self::in_bounds(pos) {
            return None;
        }
        self.cells[pos[0]][pos[1]]
    }

    /// Whether `pos` is in bounds and unoccupied.
    pub fn is_open(&self, pos: CellPos) -> bool {
        Self::in_bounds(pos) && self.cells[pos[0]][pos[1]].is_none()
    }

    /// Places a stone. Ignored out of bounds; overwrites are not checked
    /// here; the judging path only ever targets cells it verified open.
    pub fn set(&mut self, pos: CellPos, color: TeamColor) {
        if Self::in_bounds(pos) {
            self.cells[pos[0]][pos[1]] = Some(color);
        }
    }

    /// Total stones of any color on the board.
    pub fn stone_total(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|c| c.is_some())
            .count()
    }

    /// Length of the longest unbroken straight line of `color`, in any of
    /// the four directions. Zero if the color has no stones.
    pub fn longest_line(&self, color: TeamColor) -> usize {
        let mut best = 0;
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                if self.cells[row][col] != Some(color) {
                    continue;
                }
                for (dr, dc) in DIRECTIONS {
                    let mut len = 1;
                    let mut r = row as isize + dr;
                    let mut c = col as isize + dc;
                    while r >= 0
                        && (r as usize) < BOARD_SIZE
                        && c >= 0
                        && (c as usize) < BOARD_SIZE
                        && self.cells[r as usize][c as usize] == Some(color)
                    {
                        len += 1;
                        r += dr;
                        c += dc;
                    }
                    best = best.max(len);
                }
            }
        }
        best
    }

    /// The board as nested vectors, the shape snapshots serialize.
    pub fn to_rows(&self) -> Vec<Vec<Option<TeamColor>>> {
        self.cells.iter().map(|row| row.to_vec()).collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(stones: &[(usize, usize, TeamColor)]) -> Board {
        let mut board = Board::new();
        for &(r, c, color) in stones {
            board.set([r, c], color);
        }
        board
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        assert_eq!(board.stone_total(), 0);
        assert!(board.is_open([0, 0]));
        assert!(board.is_open([14, 14]));
    }

    #[test]
    fn test_in_bounds_edges() {
        assert!(Board::in_bounds([0, 0]));
        assert!(Board::in_bounds([14, 14]));
        assert!(!Board::in_bounds([15, 0]));
        assert!(!Board::in_bounds([0, 15]));
    }

    #[test]
    fn test_set_and_read_back() {
        let mut board = Board::new();
        board.set([7, 7], TeamColor::Red);
        assert_eq!(board.cell([7, 7]), Some(TeamColor::Red));
        assert!(!board.is_open([7, 7]));
        assert_eq!(board.stone_total(), 1);
    }

    #[test]
    fn test_set_out_of_bounds_is_ignored() {
        let mut board = Board::new();
        board.set([99, 99], TeamColor::Red);
        assert_eq!(board.stone_total(), 0);
    }

    #[test]
    fn test_longest_line_empty_color_is_zero() {
        let board = Board::new();
        assert_eq!(board.longest_line(TeamColor::Red), 0);
    }

    #[test]
    fn test_longest_line_horizontal() {
        let board = board_with(&[
            (7, 3, TeamColor::Red),
            (7, 4, TeamColor::Red),
            (7, 5, TeamColor::Red),
            (7, 6, TeamColor::Red),
        ]);
        assert_eq!(board.longest_line(TeamColor::Red), 4);
    }

    #[test]
    fn test_longest_line_vertical() {
        let board = board_with(&[
            (2, 9, TeamColor::Blue),
            (3, 9, TeamColor::Blue),
            (4, 9, TeamColor::Blue),
        ]);
        assert_eq!(board.longest_line(TeamColor::Blue), 3);
    }

    #[test]
    fn test_longest_line_diagonal() {
        let board = board_with(&[
            (0, 0, TeamColor::Green),
            (1, 1, TeamColor::Green),
            (2, 2, TeamColor::Green),
            (3, 3, TeamColor::Green),
            (4, 4, TeamColor::Green),
        ]);
        assert_eq!(board.longest_line(TeamColor::Green), 5);
    }

    #[test]
    fn test_longest_line_anti_diagonal() {
        let board = board_with(&[
            (4, 0, TeamColor::Yellow),
            (3, 1, TeamColor::Yellow),
            (2, 2, TeamColor::Yellow),
            (1, 3, TeamColor::Yellow),
            (0, 4, TeamColor::Yellow),
        ]);
        assert_eq!(board.longest_line(TeamColor::Yellow), 5);
    }

    #[test]
    fn test_longest_line_broken_by_other_color() {
        let board = board_with(&[
            (7, 3, TeamColor::Red),
            (7, 4, TeamColor::Red),
            (7, 5, TeamColor::Blue),
            (7, 6, TeamColor::Red),
            (7, 7, TeamColor::Red),
            (7, 8, TeamColor::Red),
        ]);
        assert_eq!(board.longest_line(TeamColor::Red), 3);
    }

    #[test]
    fn test_longest_line_counts_past_win_length() {
        let board = board_with(&[
            (0, 0, TeamColor::Red),
            (0, 1, TeamColor::Red),
            (0, 2, TeamColor::Red),
            (0, 3, TeamColor::Red),
            (0, 4, TeamColor::Red),
            (0, 5, TeamColor::Red),
            (0, 6, TeamColor::Red),
        ]);
        assert_eq!(board.longest_line(TeamColor::Red), 7);
    }

    #[test]
    fn test_to_rows_shape() {
        let mut board = Board::new();
        board.set([1, 2], TeamColor::Blue);
        let rows = board.to_rows();
        assert_eq!(rows.len(), BOARD_SIZE);
        assert_eq!(rows[0].len(), BOARD_SIZE);
        assert_eq!(rows[1][2], Some(TeamColor::Blue));
        assert_eq!(rows[0][0], None);
    }
}

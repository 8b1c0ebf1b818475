//! Round judging: simultaneous-move conflict resolution and the win check.
//!
//! Resolution is deterministic by construction; cells are visited in
//! row-major order (`BTreeMap` keys) and every tie-break compares values,
//! never iteration order or submission timing.

use std::collections::BTreeMap;

use parlor_protocol::{CellPos, RoundMove, RoundResult, TeamColor, TeamId};

use crate::{Board, WIN_LENGTH};

/// The per-team numbers the tie-break needs: who a team is and how many
/// stones it already has on the board (from prior rounds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamStanding {
    pub id: TeamId,
    pub color: TeamColor,
    pub stone_count: u32,
}

/// Outcome of [`check_win`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinCheck {
    /// Whether the game is over.
    pub ended: bool,
    /// The winning color, when `ended`.
    pub winner: Option<TeamColor>,
    /// The longest qualifying line found (0 if none reached
    /// [`WIN_LENGTH`]). Reported even when the game continues, so the
    /// "two teams tied at 5" case can be surfaced to clients.
    pub line_length: usize,
}

/// Judges all pending moves of a round. One [`RoundResult`] per distinct
/// targeted cell that is still open on the board; moves aimed at cells
/// occupied in a *prior* round produce no result at all.
pub fn resolve_round(
    board: &Board,
    moves: &[RoundMove],
    teams: &[TeamStanding],
) -> Vec<RoundResult> {
    // Row-major grouping keeps the output order stable across runs.
    let mut by_cell: BTreeMap<CellPos, Vec<&RoundMove>> = BTreeMap::new();
    for mv in moves {
        by_cell.entry(mv.position).or_default().push(mv);
    }

    by_cell
        .into_iter()
        .filter(|(pos, _)| board.is_open(*pos))
        .map(|(pos, cell_moves)| resolve_cell(pos, &cell_moves, teams))
        .collect()
}

/// Resolves a single contested-or-claimed cell:
///
/// 1. One team targeting it wins outright.
/// 2. Otherwise the contenders with the *fewest* total stones on the board
///    survive.
/// 3. Among survivors, the team that committed the *most* moves at this
///    cell this round wins.
/// 4. Still tied: nobody gets the cell this round.
fn resolve_cell(
    pos: CellPos,
    moves: &[&RoundMove],
    teams: &[TeamStanding],
) -> RoundResult {
    let mut by_team: BTreeMap<u8, usize> = BTreeMap::new();
    for mv in moves {
        *by_team.entry(mv.team_id.0).or_default() += 1;
    }

    let standing = |id: u8| teams.iter().find(|t| t.id.0 == id);

    // Moves from teams the room no longer knows about cannot win a cell.
    let contenders: Vec<(TeamStanding, usize)> = by_team
        .iter()
        .filter_map(|(&id, &count)| standing(id).map(|t| (*t, count)))
        .collect();

    let Some(&(first, _)) = contenders.first() else {
        return RoundResult {
            position: pos,
            winner: None,
            contested: true,
            message: "contested, no winner".into(),
        };
    };

    if contenders.len() == 1 {
        return RoundResult {
            position: pos,
            winner: Some(first.color),
            contested: false,
            message: format!("{} takes the cell", first.color),
        };
    }

    // Tie-break 1: fewest stones already on the board.
    let min_stones = contenders
        .iter()
        .map(|(t, _)| t.stone_count)
        .min()
        .unwrap_or(0);
    let behind: Vec<(TeamStanding, usize)> = contenders
        .iter()
        .copied()
        .filter(|(t, _)| t.stone_count == min_stones)
        .collect();

    if let [(team, _)] = behind.as_slice() {
        return RoundResult {
            position: pos,
            winner: Some(team.color),
            contested: true,
            message: format!("{} takes the cell (fewest stones)", team.color),
        };
    }

    // Tie-break 2: most moves committed at this cell this round.
    let max_moves = behind.iter().map(|(_, n)| *n).max().unwrap_or(0);
    let eager: Vec<(TeamStanding, usize)> = behind
        .iter()
        .copied()
        .filter(|(_, n)| *n == max_moves)
        .collect();

    if let [(team, _)] = eager.as_slice() {
        return RoundResult {
            position: pos,
            winner: Some(team.color),
            contested: true,
            message: format!("{} takes the cell (more moves committed)", team.color),
        };
    }

    // A dead heat is a normal outcome: the cell stays empty this round.
    RoundResult {
        position: pos,
        winner: None,
        contested: true,
        message: "contested, no winner".into(),
    }
}

/// Commits judged results to the board. Cells with no winner are left
/// untouched. Stone-count bookkeeping stays with the caller, which owns
/// the team records.
pub fn apply_results(board: &mut Board, results: &[RoundResult]) {
    for result in results {
        if let Some(color) = result.winner {
            board.set(result.position, color);
        }
    }
}

/// The win check, run after results are applied.
///
/// A color wins only with the *strict* maximum line length among all
/// colors that reached [`WIN_LENGTH`]; reaching 5 while a rival also
/// holds 5 settles nothing, which rewards being first to exceed rivals
/// rather than merely reaching the threshold.
pub fn check_win(board: &Board) -> WinCheck {
    let qualifying: Vec<(TeamColor, usize)> = TeamColor::PALETTE
        .iter()
        .map(|&color| (color, board.longest_line(color)))
        .filter(|&(_, len)| len >= WIN_LENGTH)
        .collect();

    if qualifying.is_empty() {
        return WinCheck {
            ended: false,
            winner: None,
            line_length: 0,
        };
    }

    let max_len = qualifying.iter().map(|&(_, len)| len).max().unwrap_or(0);
    let at_max: Vec<TeamColor> = qualifying
        .iter()
        .filter(|&&(_, len)| len == max_len)
        .map(|&(color, _)| color)
        .collect();

    match at_max.as_slice() {
        [winner] => WinCheck {
            ended: true,
            winner: Some(*winner),
            line_length: max_len,
        },
        _ => WinCheck {
            ended: false,
            winner: None,
            line_length: max_len,
        },
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_protocol::PlayerId;

    // -- Helpers ----------------------------------------------------------

    fn standing(id: u8, color: TeamColor, stones: u32) -> TeamStanding {
        TeamStanding {
            id: TeamId(id),
            color,
            stone_count: stones,
        }
    }

    fn mv(team: u8, pos: CellPos) -> RoundMove {
        RoundMove {
            player_id: PlayerId::generate(),
            team_id: TeamId(team),
            position: pos,
            timestamp: 0,
        }
    }

    fn two_teams(stones_a: u32, stones_b: u32) -> Vec<TeamStanding> {
        vec![
            standing(0, TeamColor::Red, stones_a),
            standing(1, TeamColor::Blue, stones_b),
        ]
    }

    // =====================================================================
    // resolve_round
    // =====================================================================

    #[test]
    fn test_uncontested_cell_goes_to_the_only_team() {
        let board = Board::new();
        let teams = two_teams(0, 0);
        let results = resolve_round(&board, &[mv(0, [7, 7])], &teams);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].winner, Some(TeamColor::Red));
        assert!(!results[0].contested);
        assert_eq!(results[0].position, [7, 7]);
    }

    #[test]
    fn test_fewest_total_stones_wins_regardless_of_move_counts() {
        // Team red has 10 stones, team blue has 7. Red floods the cell
        // with two moves, blue sends one; blue still takes it, because
        // the stone-count comparison comes first.
        let board = Board::new();
        let teams = two_teams(10, 7);
        let moves = [mv(0, [7, 7]), mv(0, [7, 7]), mv(1, [7, 7])];
        let results = resolve_round(&board, &moves, &teams);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].winner, Some(TeamColor::Blue));
        assert!(results[0].contested);
    }

    #[test]
    fn test_equal_stones_more_moves_at_cell_wins() {
        let board = Board::new();
        let teams = two_teams(8, 8);
        let moves = [mv(0, [3, 3]), mv(0, [3, 3]), mv(1, [3, 3])];
        let results = resolve_round(&board, &moves, &teams);

        assert_eq!(results[0].winner, Some(TeamColor::Red));
        assert!(results[0].contested);
    }

    #[test]
    fn test_equal_stones_equal_moves_is_a_dead_heat() {
        // Both teams at 8 stones, both committing exactly 2 moves at
        // (3,3): the cell stays empty and that's a normal outcome.
        let board = Board::new();
        let teams = two_teams(8, 8);
        let moves = [
            mv(0, [3, 3]),
            mv(0, [3, 3]),
            mv(1, [3, 3]),
            mv(1, [3, 3]),
        ];
        let results = resolve_round(&board, &moves, &teams);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].winner, None);
        assert!(results[0].contested);
    }

    #[test]
    fn test_three_way_tie_break_narrows_then_compares_moves() {
        // Green trails on stones together with red; blue is ahead and
        // drops out in stage one. Red out-commits green at the cell.
        let teams = vec![
            standing(0, TeamColor::Red, 2),
            standing(1, TeamColor::Blue, 5),
            standing(2, TeamColor::Green, 2),
        ];
        let board = Board::new();
        let moves = [
            mv(0, [0, 0]),
            mv(0, [0, 0]),
            mv(1, [0, 0]),
            mv(2, [0, 0]),
        ];
        let results = resolve_round(&board, &moves, &teams);

        assert_eq!(results[0].winner, Some(TeamColor::Red));
    }

    #[test]
    fn test_cell_occupied_in_prior_round_produces_no_result() {
        let mut board = Board::new();
        board.set([7, 7], TeamColor::Green);
        let teams = two_teams(0, 0);
        let moves = [mv(0, [7, 7]), mv(1, [7, 7])];
        let results = resolve_round(&board, &moves, &teams);

        assert!(results.is_empty());
    }

    #[test]
    fn test_independent_cells_resolve_independently() {
        let board = Board::new();
        let teams = two_teams(0, 0);
        let moves = [mv(0, [1, 1]), mv(1, [2, 2])];
        let results = resolve_round(&board, &moves, &teams);

        assert_eq!(results.len(), 2);
        // Row-major order: (1,1) before (2,2).
        assert_eq!(results[0].position, [1, 1]);
        assert_eq!(results[0].winner, Some(TeamColor::Red));
        assert_eq!(results[1].position, [2, 2]);
        assert_eq!(results[1].winner, Some(TeamColor::Blue));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let board = Board::new();
        let teams = vec![
            standing(0, TeamColor::Red, 3),
            standing(1, TeamColor::Blue, 3),
            standing(2, TeamColor::Green, 1),
        ];
        let moves = [
            mv(0, [5, 5]),
            mv(1, [5, 5]),
            mv(2, [5, 5]),
            mv(0, [9, 2]),
            mv(1, [9, 2]),
        ];

        let first = resolve_round(&board, &moves, &teams);
        let second = resolve_round(&board, &moves, &teams);
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_moves_no_results() {
        let board = Board::new();
        let teams = two_teams(0, 0);
        assert!(resolve_round(&board, &[], &teams).is_empty());
    }

    // =====================================================================
    // apply_results
    // =====================================================================

    #[test]
    fn test_apply_places_winners_only() {
        let mut board = Board::new();
        let results = vec![
            RoundResult {
                position: [1, 1],
                winner: Some(TeamColor::Red),
                contested: false,
                message: String::new(),
            },
            RoundResult {
                position: [2, 2],
                winner: None,
                contested: true,
                message: String::new(),
            },
        ];
        apply_results(&mut board, &results);

        assert_eq!(board.cell([1, 1]), Some(TeamColor::Red));
        assert!(board.is_open([2, 2]));
        assert_eq!(board.stone_total(), 1);
    }

    #[test]
    fn test_apply_empty_results_changes_nothing() {
        let mut board = Board::new();
        board.set([4, 4], TeamColor::Blue);
        let before = board.clone();
        apply_results(&mut board, &[]);
        assert_eq!(board, before);
    }

    // =====================================================================
    // check_win
    // =====================================================================

    fn row_of(board: &mut Board, color: TeamColor, row: usize, len: usize) {
        for col in 0..len {
            board.set([row, col], color);
        }
    }

    #[test]
    fn test_no_line_means_continue() {
        let mut board = Board::new();
        row_of(&mut board, TeamColor::Red, 0, 4);
        let check = check_win(&board);
        assert!(!check.ended);
        assert_eq!(check.winner, None);
        assert_eq!(check.line_length, 0);
    }

    #[test]
    fn test_single_five_wins() {
        let mut board = Board::new();
        row_of(&mut board, TeamColor::Red, 0, 5);
        let check = check_win(&board);
        assert!(check.ended);
        assert_eq!(check.winner, Some(TeamColor::Red));
        assert_eq!(check.line_length, 5);
    }

    #[test]
    fn test_six_beats_a_simultaneous_five() {
        let mut board = Board::new();
        row_of(&mut board, TeamColor::Red, 0, 6);
        row_of(&mut board, TeamColor::Blue, 2, 5);
        let check = check_win(&board);
        assert!(check.ended);
        assert_eq!(check.winner, Some(TeamColor::Red));
        assert_eq!(check.line_length, 6);
    }

    #[test]
    fn test_two_fives_settle_nothing() {
        let mut board = Board::new();
        row_of(&mut board, TeamColor::Red, 0, 5);
        row_of(&mut board, TeamColor::Blue, 2, 5);
        let check = check_win(&board);
        assert!(!check.ended);
        assert_eq!(check.winner, None);
        // The tie length is still reported for the client's banner.
        assert_eq!(check.line_length, 5);
    }

    #[test]
    fn test_two_sixes_also_settle_nothing() {
        let mut board = Board::new();
        row_of(&mut board, TeamColor::Red, 0, 6);
        row_of(&mut board, TeamColor::Blue, 2, 6);
        let check = check_win(&board);
        assert!(!check.ended);
        assert_eq!(check.line_length, 6);
    }

    #[test]
    fn test_five_against_a_rival_six_loses() {
        let mut board = Board::new();
        row_of(&mut board, TeamColor::Red, 0, 5);
        row_of(&mut board, TeamColor::Blue, 2, 6);
        let check = check_win(&board);
        assert!(check.ended);
        assert_eq!(check.winner, Some(TeamColor::Blue));
    }
}

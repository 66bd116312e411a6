use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// One full-board pass worth of counts used by the win predicates.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BoardTally {
    pub revealed_safe: CellCount,
    pub correct_flags: CellCount,
    pub wrong_flags: CellCount,
    pub unopened: CellCount,
}

impl BoardTally {
    pub fn count(minefield: &Minefield, revealed: &Array2<bool>, flagged: &Array2<bool>) -> Self {
        let mut tally = Self::default();
        for coords in iter_coords(minefield.size()) {
            let index = coords.to_nd_index();
            let mine = minefield.contains_mine(coords);
            if revealed[index] && !mine {
                tally.revealed_safe += 1;
            }
            if flagged[index] {
                if mine {
                    tally.correct_flags += 1;
                } else {
                    tally.wrong_flags += 1;
                }
            }
            if !revealed[index] && !flagged[index] {
                tally.unopened += 1;
            }
        }
        tally
    }
}

/// Which predicate decided the win, in priority order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinKind {
    /// Every safe cell is revealed.
    AllSafeRevealed,
    /// Every mine is flagged, no flag is wrong, and the counter is exhausted.
    AllMinesFlagged,
    /// The number of untouched cells equals the counter.
    UnopenedMatchesCounter,
}

impl WinKind {
    /// Whether unflagged mines get shown as flags on the final board.
    pub const fn auto_flags(self) -> bool {
        matches!(self, Self::AllSafeRevealed | Self::AllMinesFlagged)
    }
}

/// Checks the win predicates, first match wins.
///
/// While the counter tracks flags in lock-step, `UnopenedMatchesCounter` holds exactly when `AllSafeRevealed` does, so
/// it is only reachable if the two ever drift apart.
pub fn evaluate_win(
    tally: BoardTally,
    config: GameConfig,
    mines_left: CellCount,
) -> Option<WinKind> {
    if tally.revealed_safe == config.safe_cells() {
        Some(WinKind::AllSafeRevealed)
    } else if mines_left == 0 && tally.correct_flags == config.mines && tally.wrong_flags == 0 {
        Some(WinKind::AllMinesFlagged)
    } else if tally.unopened == mines_left {
        Some(WinKind::UnopenedMatchesCounter)
    } else {
        None
    }
}

/// How a finished game ended; drives the final display overlay.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ending {
    Won(WinKind),
    /// `triggered` is the detonated cell, absent when the clock ran out.
    Lost { triggered: Option<Coord2> },
}

impl Ending {
    pub const fn is_win(self) -> bool {
        matches!(self, Self::Won(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Board {
        minefield: Minefield,
        revealed: Array2<bool>,
        flagged: Array2<bool>,
    }

    impl Board {
        fn new(size: Coord2, mines: &[Coord2]) -> Self {
            Self {
                minefield: Minefield::from_mine_coords(size, mines).unwrap(),
                revealed: Array2::default(size.to_nd_index()),
                flagged: Array2::default(size.to_nd_index()),
            }
        }

        fn tally(&self) -> BoardTally {
            BoardTally::count(&self.minefield, &self.revealed, &self.flagged)
        }
    }

    #[test]
    fn tally_counts_each_category() {
        let mut board = Board::new((2, 2), &[(0, 0)]);
        board.revealed[[1, 1]] = true;
        board.flagged[[0, 0]] = true;
        board.flagged[[0, 1]] = true;

        assert_eq!(
            board.tally(),
            BoardTally {
                revealed_safe: 1,
                correct_flags: 1,
                wrong_flags: 1,
                unopened: 1,
            }
        );
    }

    #[test]
    fn all_safe_revealed_wins_first() {
        let mut board = Board::new((3, 3), &[(2, 2)]);
        board.revealed.fill(true);
        board.revealed[[2, 2]] = false;
        let config = board.minefield.game_config();

        assert_eq!(
            evaluate_win(board.tally(), config, 1),
            Some(WinKind::AllSafeRevealed)
        );
    }

    #[test]
    fn flagging_every_mine_wins_without_revealing() {
        let mut board = Board::new((3, 3), &[(0, 0), (2, 2)]);
        board.flagged[[0, 0]] = true;
        board.flagged[[2, 2]] = true;
        let config = board.minefield.game_config();

        assert_eq!(
            evaluate_win(board.tally(), config, 0),
            Some(WinKind::AllMinesFlagged)
        );
    }

    #[test]
    fn wrong_flag_blocks_flag_win() {
        let mut board = Board::new((3, 3), &[(0, 0), (2, 2)]);
        board.flagged[[0, 0]] = true;
        board.flagged[[1, 1]] = true;
        let config = board.minefield.game_config();

        assert_eq!(evaluate_win(board.tally(), config, 0), None);
    }

    #[test]
    fn unopened_predicate_fires_on_drifted_counter() {
        let mut board = Board::new((2, 2), &[(0, 0)]);
        board.revealed[[0, 1]] = true;
        board.flagged[[1, 0]] = true;
        let config = board.minefield.game_config();

        // two cells untouched, counter claims two mines left
        assert_eq!(
            evaluate_win(board.tally(), config, 2),
            Some(WinKind::UnopenedMatchesCounter)
        );
        assert!(!WinKind::UnopenedMatchesCounter.auto_flags());
    }

    #[test]
    fn in_progress_board_has_no_winner() {
        let mut board = Board::new((3, 3), &[(0, 0)]);
        board.revealed[[2, 2]] = true;
        let config = board.minefield.game_config();

        assert_eq!(evaluate_win(board.tally(), config, 1), None);
    }
}

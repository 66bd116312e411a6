use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Player flags and the "mines remaining" counter they drive.
///
/// The counter moves in lock-step with flag toggles and never drops below zero: once it reaches zero, new flags are
/// refused even if some existing flags are wrong.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlagManager {
    flagged: Array2<bool>,
    mines_left: CellCount,
}

impl FlagManager {
    pub fn new(config: GameConfig) -> Self {
        Self {
            flagged: Array2::default(config.size.to_nd_index()),
            mines_left: config.mines,
        }
    }

    pub fn grid(&self) -> &Array2<bool> {
        &self.flagged
    }

    pub fn is_flagged(&self, coords: Coord2) -> bool {
        self.flagged
            .get(coords.to_nd_index())
            .copied()
            .unwrap_or(false)
    }

    pub fn mines_left(&self) -> CellCount {
        self.mines_left
    }

    pub fn flag_count(&self) -> usize {
        self.flagged.iter().filter(|&&flag| flag).count()
    }

    pub fn toggle(&mut self, coords: Coord2, revealed: &Array2<bool>) -> MarkOutcome {
        use MarkOutcome::*;

        let index = coords.to_nd_index();
        if revealed[index] {
            return NoChange;
        }

        if self.flagged[index] {
            self.flagged[index] = false;
            self.mines_left += 1;
            log::trace!("Unflagged {:?}, {} mines left", coords, self.mines_left);
            Changed
        } else if self.mines_left == 0 {
            log::trace!("Refused flag at {:?}, counter exhausted", coords);
            NoChange
        } else {
            self.flagged[index] = true;
            self.mines_left -= 1;
            log::trace!("Flagged {:?}, {} mines left", coords, self.mines_left);
            Changed
        }
    }

    /// Zeroes the counter once the game is won; flags themselves stay untouched.
    pub(crate) fn settle(&mut self) {
        self.mines_left = 0;
    }
}

use core::fmt;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Read-only copy of everything the presentation layer draws.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub config: GameConfig,
    pub phase: GamePhase,
    pub ending: Option<Ending>,
    pub face: Face,
    pub mines_left: CellCount,
    pub elapsed_secs: u16,
    pub display: Array2<DisplayCode>,
    pub revealed: Array2<bool>,
    pub flagged: Array2<bool>,
}

impl Snapshot {
    pub fn from_session(session: &Session) -> Self {
        Self {
            config: session.config(),
            phase: session.phase(),
            ending: session.ending(),
            face: session.face(),
            mines_left: session.mines_left(),
            elapsed_secs: session.elapsed_secs(),
            display: session.display_grid(),
            revealed: session.revealed().clone(),
            flagged: session.flagged().clone(),
        }
    }

    /// # Panics
    ///
    /// If `coords` lies outside the board.
    pub fn display_at(&self, coords: Coord2) -> DisplayCode {
        self.display[coords.to_nd_index()]
    }

    pub fn mines_left_digits(&self) -> [u8; 3] {
        counter_digits(i32::from(self.mines_left))
    }

    pub fn elapsed_digits(&self) -> [u8; 3] {
        counter_digits(i32::from(self.elapsed_secs))
    }
}

/// One line per row, one display symbol per cell.
impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, row) in self.display.rows().into_iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            for code in row {
                write!(f, "{}", code)?;
            }
        }
        Ok(())
    }
}

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

/// Player-visible state of a single cell, as handed to the presentation layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayCode {
    Hidden,
    Flagged,
    /// Revealed cell with no adjacent mines.
    Blank,
    Number(u8),
    /// Transient marker for cells a held chord would open.
    ChordPreview,
    // only used to show the result after the game finishes:
    Exploded,
    WrongFlag,
    UnexplodedMine,
}

impl DisplayCode {
    pub const fn symbol(self) -> char {
        use DisplayCode::*;
        match self {
            Hidden => '0',
            Flagged => 'F',
            Blank => 'Z',
            Number(count) => (b'0' + count) as char,
            ChordPreview => 'D',
            Exploded => 'E',
            WrongFlag => 'X',
            UnexplodedMine => 'M',
        }
    }
}

impl Default for DisplayCode {
    fn default() -> Self {
        Self::Hidden
    }
}

impl fmt::Display for DisplayCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Inputs the display code of one cell is derived from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CellView {
    pub coords: Coord2,
    /// `None` until the minefield exists.
    pub value: Option<CellValue>,
    pub revealed: bool,
    pub flagged: bool,
}

/// Pure projection of a cell's state and the game ending onto a display code.
pub fn project(cell: CellView, ending: Option<Ending>) -> DisplayCode {
    let mine = cell.value.is_some_and(CellValue::is_mine);
    match ending {
        Some(Ending::Lost { triggered }) if triggered == Some(cell.coords) => DisplayCode::Exploded,
        Some(Ending::Lost { .. }) if cell.flagged && !mine => DisplayCode::WrongFlag,
        Some(Ending::Lost { .. }) if !cell.flagged && mine => DisplayCode::UnexplodedMine,
        Some(Ending::Won(kind)) if kind.auto_flags() && mine && !cell.flagged => {
            DisplayCode::Flagged
        }
        _ => project_live(cell),
    }
}

fn project_live(cell: CellView) -> DisplayCode {
    match (cell.revealed, cell.flagged, cell.value) {
        (true, _, Some(CellValue::Clear(0))) => DisplayCode::Blank,
        (true, _, Some(CellValue::Clear(count))) => DisplayCode::Number(count),
        (_, true, _) => DisplayCode::Flagged,
        _ => DisplayCode::Hidden,
    }
}

/// Three decimal digits for a header counter, clamped to `0..=999`.
pub fn counter_digits(value: i32) -> [u8; 3] {
    let value = value.clamp(0, 999) as u16;
    [
        (value / 100) as u8,
        (value / 10 % 10) as u8,
        (value % 10) as u8,
    ]
}

/// Mood of the status face above the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Face {
    Normal,
    Victory,
    Loss,
}

impl Face {
    pub const fn new(phase: GamePhase) -> Self {
        match phase {
            GamePhase::Won => Self::Victory,
            GamePhase::Lost => Self::Loss,
            GamePhase::NotStarted | GamePhase::InProgress => Self::Normal,
        }
    }
}

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::*;

bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MouseButtons: u8 {
        const PRIMARY   = 1;
        const SECONDARY = 1 << 1;
    }
}

/// A completed button gesture on a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Click {
    Primary(Coord2),
    Secondary(Coord2),
    Chord(Coord2),
}

/// Board-global button tracking; which cell a button went down on does not matter.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputClassifier {
    held: MouseButtons,
    chord_anchor: Option<Coord2>,
}

impl InputClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell the chord preview is anchored at, while both buttons are down.
    pub fn chord_anchor(&self) -> Option<Coord2> {
        self.chord_anchor
    }

    pub fn press(&mut self, buttons: MouseButtons, coords: Coord2) {
        self.held |= buttons;
        if self.held.contains(MouseButtons::all()) {
            self.chord_anchor = Some(coords);
        }
        log::trace!("{:?} mouse down ({:?})", coords, self.held);
    }

    /// Moves the chord preview along with the pointer.
    pub fn hover(&mut self, coords: Coord2) {
        if self.chord_anchor.is_some() {
            self.chord_anchor = Some(coords);
        }
    }

    /// Classifies by what was held when the first button came up, then forgets every held button.
    pub fn release(&mut self, coords: Coord2) -> Option<Click> {
        let held = core::mem::take(&mut self.held);
        self.chord_anchor = None;

        let click = if held == MouseButtons::all() {
            Some(Click::Chord(coords))
        } else if held == MouseButtons::PRIMARY {
            Some(Click::Primary(coords))
        } else if held == MouseButtons::SECONDARY {
            Some(Click::Secondary(coords))
        } else {
            None
        };
        log::trace!("{:?} mouse up ({:?}) -> {:?}", coords, held, click);
        click
    }

    pub fn cancel(&mut self) {
        self.held = MouseButtons::empty();
        self.chord_anchor = None;
    }
}

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

/// Valid transitions:
/// - NotStarted -> InProgress
/// - InProgress -> Won
/// - InProgress -> Lost
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    NotStarted,
    InProgress,
    Won,
    Lost,
}

impl GamePhase {
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::NotStarted)
    }

    /// Indicates the game has ended and no moves can be made anymore
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Result of a classified pointer gesture.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ActionOutcome {
    Ignored,
    Reveal(RevealOutcome),
    Mark(MarkOutcome),
}

impl ActionOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::Ignored => false,
            Self::Reveal(outcome) => outcome.has_update(),
            Self::Mark(outcome) => outcome.has_update(),
        }
    }
}

/// One game from the first click to the end, plus the input and timer state around it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    config: GameConfig,
    seed: u64,
    minefield: Option<Minefield>,
    revealed: Array2<bool>,
    flags: FlagManager,
    phase: GamePhase,
    ending: Option<Ending>,
    timer: SessionTimer,
    input: InputClassifier,
}

impl Session {
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::with_seed(config, rand::random(), DEFAULT_MAX_SECONDS)
    }

    pub fn with_settings(config: GameConfig, settings: &Settings) -> Result<Self> {
        Self::with_seed(config, rand::random(), settings.max_seconds)
    }

    /// Session whose minefield will be generated from `seed` at the first reveal.
    pub fn with_seed(config: GameConfig, seed: u64, max_seconds: u16) -> Result<Self> {
        config.validate()?;
        if max_seconds == 0 {
            return Err(GameError::InvalidMaxTime);
        }
        log::debug!(
            "new {}x{} session with {} mines",
            config.rows(),
            config.cols(),
            config.mines
        );
        Ok(Self::blank(config, seed, SessionTimer::new(max_seconds)))
    }

    /// Session played on a fixed layout instead of a generated one.
    pub fn from_minefield(minefield: Minefield, max_seconds: u16) -> Result<Self> {
        let mut session = Self::with_seed(minefield.game_config(), 0, max_seconds)?;
        session.minefield = Some(minefield);
        Ok(session)
    }

    fn blank(config: GameConfig, seed: u64, timer: SessionTimer) -> Self {
        Self {
            config,
            seed,
            minefield: None,
            revealed: Array2::default(config.size.to_nd_index()),
            flags: FlagManager::new(config),
            phase: GamePhase::NotStarted,
            ending: None,
            timer,
            input: InputClassifier::new(),
        }
    }

    /// Starts over on the same board size; ticks scheduled for the old game are ignored from now on.
    pub fn reset(&mut self) {
        self.replace(self.config);
    }

    /// Starts over with a different board configuration.
    pub fn restart(&mut self, config: GameConfig) -> Result<()> {
        config.validate()?;
        self.replace(config);
        Ok(())
    }

    fn replace(&mut self, config: GameConfig) {
        let timer = self.timer.successor(self.timer.max_seconds());
        *self = Self::blank(config, rand::random(), timer);
        log::debug!("session reset to {:?}", config);
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_final()
    }

    pub fn ending(&self) -> Option<Ending> {
        self.ending
    }

    pub fn mines_left(&self) -> CellCount {
        self.flags.mines_left()
    }

    pub fn elapsed_secs(&self) -> u16 {
        self.timer.elapsed_secs()
    }

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub fn minefield(&self) -> Option<&Minefield> {
        self.minefield.as_ref()
    }

    pub fn revealed(&self) -> &Array2<bool> {
        &self.revealed
    }

    pub fn flagged(&self) -> &Array2<bool> {
        self.flags.grid()
    }

    /// Off-board coordinates are never revealed.
    pub fn is_revealed(&self, coords: Coord2) -> bool {
        self.revealed
            .get(coords.to_nd_index())
            .copied()
            .unwrap_or(false)
    }

    /// Off-board coordinates are never flagged.
    pub fn is_flagged(&self, coords: Coord2) -> bool {
        self.flags.is_flagged(coords)
    }

    pub fn input(&self) -> &InputClassifier {
        &self.input
    }

    pub fn face(&self) -> Face {
        Face::new(self.phase)
    }

    /// Opens a hidden cell; the first one also lays out the minefield around it.
    pub fn primary_click(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        use RevealOutcome::*;

        let coords = self.config.validate_coords(coords)?;
        if self.phase.is_final() || self.is_flagged(coords) || self.is_revealed(coords) {
            return Ok(NoChange);
        }

        self.mark_started();
        let (seed, config) = (self.seed, self.config);
        let minefield = self
            .minefield
            .get_or_insert_with(|| RandomMinefieldGenerator::new(seed, coords).generate(config));

        let outcome = match flood_reveal(minefield, &mut self.revealed, self.flags.grid(), coords) {
            None => {
                self.end_game(Ending::Lost {
                    triggered: Some(coords),
                });
                HitMine
            }
            Some(_) => self.settle_reveal(),
        };
        self.sync_timer();
        Ok(outcome)
    }

    /// Toggles the flag on a hidden cell.
    pub fn secondary_click(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.config.validate_coords(coords)?;
        if self.phase.is_final() {
            return Ok(MarkOutcome::NoChange);
        }

        let outcome = self.flags.toggle(coords, &self.revealed);
        if outcome.has_update() {
            self.check_win();
            self.sync_timer();
        }
        Ok(outcome)
    }

    /// Opens every unflagged neighbor of a revealed number whose flags are all placed.
    ///
    /// If any of those neighbors is a mine the game is lost and none of them is opened.
    pub fn chord_click(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        use RevealOutcome::*;

        let coords = self.config.validate_coords(coords)?;
        if self.phase != GamePhase::InProgress {
            return Ok(NoChange);
        }
        let Some(minefield) = self.minefield.as_ref() else {
            return Ok(NoChange);
        };

        let outcome = match plan_chord(minefield, &self.revealed, self.flags.grid(), coords) {
            ChordPlan::Unsatisfied => NoChange,
            ChordPlan::Detonate(mine) => {
                log::debug!("chord at {:?} hit mine at {:?}", coords, mine);
                self.end_game(Ending::Lost {
                    triggered: Some(mine),
                });
                HitMine
            }
            ChordPlan::Reveal(targets) => {
                let opened = targets
                    .iter()
                    .map(|&target| {
                        let opened =
                            flood_reveal(minefield, &mut self.revealed, self.flags.grid(), target);
                        match opened {
                            Some(0) | None => NoChange,
                            Some(_) => Revealed,
                        }
                    })
                    .fold(NoChange, core::ops::BitOr::bitor);
                match opened {
                    NoChange => NoChange,
                    _ => self.settle_reveal(),
                }
            }
        };
        self.sync_timer();
        Ok(outcome)
    }

    pub fn press(&mut self, buttons: MouseButtons, coords: Coord2) -> Result<()> {
        let coords = self.config.validate_coords(coords)?;
        if !self.phase.is_final() {
            self.input.press(buttons, coords);
        }
        Ok(())
    }

    pub fn hover(&mut self, coords: Coord2) -> Result<()> {
        let coords = self.config.validate_coords(coords)?;
        self.input.hover(coords);
        Ok(())
    }

    /// Button release over `coords`: classifies the gesture and dispatches it.
    ///
    /// Held buttons are forgotten even when `coords` is off the board.
    pub fn release(&mut self, coords: Coord2) -> Result<ActionOutcome> {
        let click = self.input.release(coords);
        self.config.validate_coords(coords)?;
        if self.phase.is_final() {
            return Ok(ActionOutcome::Ignored);
        }

        match click {
            Some(click) => self.dispatch(click),
            None => Ok(ActionOutcome::Ignored),
        }
    }

    pub fn dispatch(&mut self, click: Click) -> Result<ActionOutcome> {
        Ok(match click {
            Click::Primary(coords) => ActionOutcome::Reveal(self.primary_click(coords)?),
            Click::Secondary(coords) => ActionOutcome::Mark(self.secondary_click(coords)?),
            Click::Chord(coords) => ActionOutcome::Reveal(self.chord_click(coords)?),
        })
    }

    /// Cells a chord at the held position would open, empty unless both buttons are down.
    pub fn chord_preview(&self) -> Neighbors {
        let (Some(anchor), Some(minefield)) = (self.input.chord_anchor(), self.minefield.as_ref())
        else {
            return Neighbors::new();
        };
        if self.phase.is_final() {
            return Neighbors::new();
        }
        chord_targets(minefield, &self.revealed, self.flags.grid(), anchor).unwrap_or_default()
    }

    /// Token for the host to schedule one-second ticks with, while the timer runs.
    pub fn timer_token(&self) -> Option<TickToken> {
        self.timer.token()
    }

    /// Host visibility changed; returns the token for the restarted timer if it runs again.
    pub fn set_foreground(&mut self, foreground: bool) -> Option<TickToken> {
        self.timer
            .set_foreground(foreground, self.phase == GamePhase::InProgress)
    }

    pub fn tick(&mut self, token: TickToken) -> TickOutcome {
        let outcome = self.timer.tick(token);
        if outcome == TickOutcome::Expired {
            log::debug!("out of time after {}s", self.timer.elapsed_secs());
            self.end_game(Ending::Lost { triggered: None });
        }
        outcome
    }

    /// Applies every tick `ticker` has due at `now`, stopping early once they stop counting.
    pub fn advance(&mut self, ticker: &mut Ticker, now: Instant) -> TickOutcome {
        let mut last = TickOutcome::Ignored;
        for _ in 0..ticker.poll(now) {
            last = self.tick(ticker.token());
            if last != TickOutcome::Counted {
                break;
            }
        }
        last
    }

    /// # Panics
    ///
    /// If `coords` lies outside the board.
    pub fn display_at(&self, coords: Coord2) -> DisplayCode {
        self.display_with_preview(coords, &self.chord_preview())
    }

    /// Display codes for the whole board, including the chord preview while it is held.
    pub fn display_grid(&self) -> Array2<DisplayCode> {
        let preview = self.chord_preview();
        Array2::from_shape_fn(self.config.size.to_nd_index(), |(row, col)| {
            self.display_with_preview((row as Coord, col as Coord), &preview)
        })
    }

    fn display_with_preview(&self, coords: Coord2, preview: &[Coord2]) -> DisplayCode {
        let cell = CellView {
            coords,
            value: self.minefield.as_ref().map(|minefield| minefield[coords]),
            revealed: self.is_revealed(coords),
            flagged: self.is_flagged(coords),
        };
        match project(cell, self.ending) {
            DisplayCode::Hidden if preview.contains(&coords) => DisplayCode::ChordPreview,
            code => code,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_session(self)
    }

    fn settle_reveal(&mut self) -> RevealOutcome {
        if self.check_win() {
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        }
    }

    fn check_win(&mut self) -> bool {
        if self.phase != GamePhase::InProgress {
            return false;
        }
        let Some(minefield) = self.minefield.as_ref() else {
            return false;
        };

        let tally = BoardTally::count(minefield, &self.revealed, self.flags.grid());
        match evaluate_win(tally, self.config, self.flags.mines_left()) {
            Some(kind) => {
                self.end_game(Ending::Won(kind));
                true
            }
            None => false,
        }
    }

    fn mark_started(&mut self) {
        if self.phase.is_initial() {
            log::debug!("game started");
            self.phase = GamePhase::InProgress;
        }
    }

    fn end_game(&mut self, ending: Ending) {
        if self.phase.is_final() {
            return;
        }

        self.phase = if ending.is_win() {
            GamePhase::Won
        } else {
            GamePhase::Lost
        };
        if ending.is_win() {
            self.flags.settle();
        }
        self.ending = Some(ending);
        self.timer.stop();
        self.input.cancel();
        log::debug!("game ended: {:?} after {}s", ending, self.timer.elapsed_secs());
    }

    fn sync_timer(&mut self) {
        self.timer.sync(self.phase == GamePhase::InProgress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(size: Coord2, mines: &[Coord2]) -> Session {
        let minefield = Minefield::from_mine_coords(size, mines).unwrap();
        Session::from_minefield(minefield, DEFAULT_MAX_SECONDS).unwrap()
    }

    #[test]
    fn first_click_generates_safe_start() {
        let config = GameConfig::new((9, 9), 10).unwrap();
        let mut game = Session::with_seed(config, 42, DEFAULT_MAX_SECONDS).unwrap();

        assert!(game.minefield().is_none());
        let outcome = game.primary_click((4, 4)).unwrap();

        assert!(outcome.has_update());
        assert_ne!(outcome, RevealOutcome::HitMine);
        assert_eq!(game.minefield().unwrap().mine_count(), 10);
        assert_eq!(game.display_at((4, 4)), DisplayCode::Blank);
        assert!(game.timer_token().is_some() || game.phase() == GamePhase::Won);
    }

    #[test]
    fn out_of_range_coords_are_rejected_without_change() {
        let mut game = session((3, 3), &[(0, 0)]);
        let before = game.clone();

        assert_eq!(game.primary_click((3, 0)), Err(GameError::InvalidCoords));
        assert_eq!(game.secondary_click((0, 3)), Err(GameError::InvalidCoords));
        assert_eq!(game.chord_click((9, 9)), Err(GameError::InvalidCoords));
        assert_eq!(game, before);
    }

    #[test]
    fn flagged_cell_ignores_primary_click() {
        let mut game = session((3, 3), &[(0, 0)]);
        game.secondary_click((2, 2)).unwrap();

        assert_eq!(game.primary_click((2, 2)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(game.phase(), GamePhase::NotStarted);
    }

    #[test]
    fn hitting_mine_stops_timer_and_inputs() {
        let mut game = session((3, 3), &[(0, 0), (2, 2)]);
        game.primary_click((1, 1)).unwrap();
        let token = game.timer_token().unwrap();

        assert_eq!(game.primary_click((0, 0)).unwrap(), RevealOutcome::HitMine);
        assert_eq!(game.tick(token), TickOutcome::Ignored);
        assert_eq!(game.secondary_click((0, 1)).unwrap(), MarkOutcome::NoChange);
        assert_eq!(game.primary_click((0, 1)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(game.face(), Face::Loss);
    }

    #[test]
    fn winning_zeroes_counter() {
        let mut game = session((2, 1), &[(0, 0)]);

        assert_eq!(game.primary_click((1, 0)).unwrap(), RevealOutcome::Won);
        assert_eq!(game.phase(), GamePhase::Won);
        assert_eq!(game.mines_left(), 0);
        assert_eq!(game.display_at((0, 0)), DisplayCode::Flagged);
        assert_eq!(game.timer_token(), None);
    }

    #[test]
    fn release_dispatches_classified_click() {
        let mut game = session((3, 3), &[(0, 0)]);

        game.press(MouseButtons::SECONDARY, (0, 0)).unwrap();
        assert_eq!(game.face(), Face::Normal);
        assert_eq!(
            game.release((0, 0)).unwrap(),
            ActionOutcome::Mark(MarkOutcome::Changed)
        );
        assert!(game.is_flagged((0, 0)));

        game.press(MouseButtons::PRIMARY, (2, 2)).unwrap();
        assert_eq!(
            game.release((2, 2)).unwrap(),
            ActionOutcome::Reveal(RevealOutcome::Won)
        );
    }

    #[test]
    fn chord_preview_marks_cells_while_both_buttons_held() {
        let mut game = session((3, 4), &[(0, 0), (2, 2), (0, 3)]);
        game.primary_click((1, 1)).unwrap();
        game.secondary_click((0, 0)).unwrap();
        game.secondary_click((2, 2)).unwrap();

        game.press(MouseButtons::PRIMARY, (1, 1)).unwrap();
        game.press(MouseButtons::SECONDARY, (1, 1)).unwrap();
        assert_eq!(game.chord_preview().len(), 6);
        assert_eq!(game.display_at((0, 1)), DisplayCode::ChordPreview);
        assert_eq!(game.display_at((0, 0)), DisplayCode::Flagged);

        let outcome = game.release((1, 1)).unwrap();
        assert_eq!(outcome, ActionOutcome::Reveal(RevealOutcome::Revealed));
        assert!(game.chord_preview().is_empty());
        assert_eq!(game.display_at((2, 0)), DisplayCode::Blank);
        assert_eq!(game.display_at((1, 2)), DisplayCode::Number(2));
        assert_eq!(game.display_at((1, 3)), DisplayCode::Hidden);
    }

    #[test]
    fn reset_invalidates_pending_ticks() {
        let mut game = session((3, 3), &[(0, 0), (2, 2)]);
        game.primary_click((1, 1)).unwrap();
        let token = game.timer_token().unwrap();
        assert_eq!(game.tick(token), TickOutcome::Counted);

        game.reset();

        assert_eq!(game.phase(), GamePhase::NotStarted);
        assert_eq!(game.elapsed_secs(), 0);
        assert_eq!(game.mines_left(), 2);
        assert!(game.minefield().is_none());
        assert_eq!(game.timer_token(), None);
        assert_eq!(game.tick(token), TickOutcome::Ignored);
        assert_eq!(game.elapsed_secs(), 0);
    }

    #[test]
    fn restart_validates_new_config() {
        let mut game = session((3, 3), &[(0, 0)]);
        let bad = GameConfig::new_unchecked((2, 2), 4);

        assert_eq!(game.restart(bad), Err(GameError::TooManyMines));
        game.restart(GameConfig::new((4, 5), 3).unwrap()).unwrap();
        assert_eq!(game.size(), (4, 5));
        assert_eq!(game.mines_left(), 3);
    }
}

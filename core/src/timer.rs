use core::time::Duration;
use serde::{Deserialize, Serialize};
use web_time::Instant;

const TICK: Duration = Duration::from_secs(1);

/// Ties a scheduled tick to the timer run it was scheduled for.
///
/// Every stop, restart, or session reset starts a new generation; ticks carrying an older token are ignored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickToken {
    generation: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale token or timer not running.
    Ignored,
    Counted,
    /// The cap was reached; the session is over.
    Expired,
}

/// Whole-second counter that only runs while the game is in progress and the host is in the foreground.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionTimer {
    elapsed: u16,
    max_seconds: u16,
    foreground: bool,
    running: bool,
    generation: u64,
}

impl SessionTimer {
    pub fn new(max_seconds: u16) -> Self {
        Self {
            elapsed: 0,
            max_seconds,
            foreground: true,
            running: false,
            generation: 0,
        }
    }

    /// Fresh timer for a new session; tokens handed out by `self` stay stale forever.
    pub(crate) fn successor(&self, max_seconds: u16) -> Self {
        Self {
            foreground: self.foreground,
            generation: self.generation + 1,
            ..Self::new(max_seconds)
        }
    }

    pub fn elapsed_secs(&self) -> u16 {
        self.elapsed
    }

    pub fn max_seconds(&self) -> u16 {
        self.max_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Token the host should schedule ticks with, if the timer is running.
    pub fn token(&self) -> Option<TickToken> {
        self.running.then_some(TickToken {
            generation: self.generation,
        })
    }

    /// Starts or stops according to `in_progress`; an already running timer keeps its token.
    pub(crate) fn sync(&mut self, in_progress: bool) -> Option<TickToken> {
        let eligible = in_progress && self.foreground;
        if eligible != self.running {
            self.restart(eligible);
        }
        self.token()
    }

    /// Foreground changes always stop the current run, the partial second is dropped.
    pub(crate) fn set_foreground(
        &mut self,
        foreground: bool,
        in_progress: bool,
    ) -> Option<TickToken> {
        self.foreground = foreground;
        self.restart(in_progress && foreground);
        self.token()
    }

    pub(crate) fn stop(&mut self) {
        if self.running {
            self.restart(false);
        }
    }

    pub(crate) fn tick(&mut self, token: TickToken) -> TickOutcome {
        if !self.running || token.generation != self.generation {
            log::trace!("Ignoring stale tick {:?}", token);
            return TickOutcome::Ignored;
        }

        self.elapsed = self.elapsed.saturating_add(1).min(self.max_seconds);
        if self.elapsed >= self.max_seconds {
            log::debug!("Timer reached its cap of {}s", self.max_seconds);
            self.restart(false);
            TickOutcome::Expired
        } else {
            TickOutcome::Counted
        }
    }

    fn restart(&mut self, run: bool) {
        self.generation += 1;
        self.running = run;
        log::trace!(
            "Timer {} at {}s (generation {})",
            if run { "running" } else { "stopped" },
            self.elapsed,
            self.generation
        );
    }
}

/// Host-side helper turning wall-clock readings into whole-second ticks for one timer run.
#[derive(Clone, Debug)]
pub struct Ticker {
    token: TickToken,
    next_due: Instant,
}

impl Ticker {
    pub fn start(token: TickToken, now: Instant) -> Self {
        Self {
            token,
            next_due: now + TICK,
        }
    }

    pub fn token(&self) -> TickToken {
        self.token
    }

    /// Number of seconds that became due since the last poll.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let mut due = 0;
        while now >= self.next_due {
            due += 1;
            self.next_due += TICK;
        }
        due
    }
}

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, SystemTime};

use crate::error::DrillError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionMode {
    Questions,
    Time,
}

/// When a session stops on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub mode: SessionMode,
    pub question_count: Option<u32>,
    /// Minutes.
    pub time_limit: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: SessionMode::Questions,
            question_count: Some(10),
            time_limit: None,
        }
    }
}

impl SessionConfig {
    pub fn questions(count: u32) -> Self {
        Self {
            mode: SessionMode::Questions,
            question_count: Some(count),
            time_limit: None,
        }
    }

    pub fn timed(minutes: u32) -> Self {
        Self {
            mode: SessionMode::Time,
            question_count: None,
            time_limit: Some(minutes),
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        match self.mode {
            SessionMode::Questions => match self.question_count {
                Some(n) if n > 0 => Ok(()),
                other => Err(DrillError::invalid(
                    "question count",
                    format!("{other:?}"),
                    "questions mode needs a count above zero",
                )),
            },
            SessionMode::Time => match self.time_limit {
                Some(m) if m > 0 => Ok(()),
                other => Err(DrillError::invalid(
                    "time limit",
                    format!("{other:?}"),
                    "time mode needs a limit above zero minutes",
                )),
            },
        }
    }

    pub fn time_limit_duration(&self) -> Option<Duration> {
        match self.mode {
            SessionMode::Time => self.time_limit.map(|m| Duration::from_secs(m as u64 * 60)),
            SessionMode::Questions => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub correct: u32,
    pub total: u32,
    pub current_streak: u32,
    pub best_streak: u32,
}

impl Stats {
    pub fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
            self.current_streak += 1;
            self.best_streak = self.best_streak.max(self.current_streak);
        } else {
            self.current_streak = 0;
        }
    }

    /// Clears the session counters; the best streak survives across sessions.
    pub fn reset_keep_best(&mut self) {
        *self = Self {
            best_streak: self.best_streak,
            ..Self::default()
        };
    }

    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            ((self.correct as f64 / self.total as f64) * 100.0).round()
        }
    }
}

/// Source of wall-clock time for the session timer.
pub trait Clock: std::fmt::Debug {
    fn now(&self) -> SystemTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<SystemTime>>,
}

impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: SystemTime) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        self.now.get()
    }
}

/// Wall-clock session timer. Elapsed time is derived from the start
/// timestamp on every tick, so late or coalesced ticks do not drift.
#[derive(Debug, Clone, Default)]
pub struct SessionTimer {
    pub started_at: Option<SystemTime>,
    pub elapsed: Duration,
    pub running: bool,
}

impl SessionTimer {
    pub fn start(&mut self, now: SystemTime) {
        self.started_at = Some(now);
        self.elapsed = Duration::ZERO;
        self.running = true;
    }

    pub fn tick(&mut self, now: SystemTime) -> Duration {
        if self.running {
            if let Some(started_at) = self.started_at {
                // A clock that stepped backwards reads as no time passed.
                self.elapsed = now.duration_since(started_at).unwrap_or(Duration::ZERO);
            }
        }
        self.elapsed
    }

    pub fn stop(&mut self, now: SystemTime) {
        self.tick(now);
        self.running = false;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

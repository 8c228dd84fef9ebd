//! 01-game checkout rules: bust detection and double-out.
//!
//! Argument violations are programming errors on the caller's side and come
//! back as [`DrillError::InvalidArgument`]; a bust is a game event and is
//! reported through [`BustInfo`].

use serde::{Deserialize, Serialize};

use crate::error::DrillError;
use crate::throw_sim::ThrowResult;

pub const MAX_DART_SCORE: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BustReason {
    /// Scored more than was left.
    Over,
    /// Left exactly 1, which no double can finish.
    FinishImpossible,
    /// Reached zero without a double or the bull.
    DoubleOutRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BustInfo {
    pub is_bust: bool,
    pub reason: Option<BustReason>,
}

impl BustInfo {
    pub fn valid() -> Self {
        Self {
            is_bust: false,
            reason: None,
        }
    }

    pub fn bust(reason: BustReason) -> Self {
        Self {
            is_bust: true,
            reason: Some(reason),
        }
    }
}

pub fn check_bust(remaining: i64, throw_score: i64, is_double: bool) -> crate::Result<BustInfo> {
    if remaining <= 0 {
        return Err(DrillError::invalid(
            "remaining score",
            remaining,
            "must be a positive integer",
        ));
    }
    if !(0..=MAX_DART_SCORE).contains(&throw_score) {
        return Err(DrillError::invalid(
            "throw score",
            throw_score,
            "must be within 0..=60",
        ));
    }

    let left = remaining - throw_score;
    let info = if throw_score > remaining {
        BustInfo::bust(BustReason::Over)
    } else if left == 1 {
        BustInfo::bust(BustReason::FinishImpossible)
    } else if left == 0 && !is_double {
        BustInfo::bust(BustReason::DoubleOutRequired)
    } else {
        BustInfo::valid()
    };
    Ok(info)
}

/// True when one dart can finish from `remaining`: an even score up to 40 or
/// the bull.
pub fn can_finish_with_double(remaining: i64) -> bool {
    remaining > 0 && ((remaining <= 40 && remaining % 2 == 0) || remaining == 50)
}

pub fn is_game_finished(remaining: i64) -> crate::Result<bool> {
    if remaining < 0 {
        return Err(DrillError::invalid(
            "remaining score",
            remaining,
            "must not be negative",
        ));
    }
    Ok(remaining == 0)
}

fn whole_number(name: &'static str, value: f64) -> crate::Result<i64> {
    if !value.is_finite() {
        return Err(DrillError::invalid(name, value, "must be finite"));
    }
    if value.fract() != 0.0 {
        return Err(DrillError::invalid(name, value, "must be an integer"));
    }
    Ok(value as i64)
}

/// [`check_bust`] for callers holding raw floating point numbers.
pub fn check_bust_f64(remaining: f64, throw_score: f64, is_double: bool) -> crate::Result<BustInfo> {
    let remaining = whole_number("remaining score", remaining)?;
    let throw_score = whole_number("throw score", throw_score)?;
    check_bust(remaining, throw_score, is_double)
}

pub fn can_finish_with_double_f64(remaining: f64) -> crate::Result<bool> {
    whole_number("remaining score", remaining).map(can_finish_with_double)
}

pub fn is_game_finished_f64(remaining: f64) -> crate::Result<bool> {
    is_game_finished(whole_number("remaining score", remaining)?)
}

/// How a visit of one to three darts played out from its starting score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitOutcome {
    pub bust: BustInfo,
    /// Remaining score after the visit; the starting score again on a bust.
    pub remaining: i64,
    pub checked_out: bool,
    /// Darts that counted before the visit ended.
    pub darts_used: usize,
}

/// Applies [`check_bust`] dart by dart. The first bust or checkout ends the
/// visit and later darts are ignored.
pub fn evaluate_visit(start: i64, throws: &[ThrowResult]) -> crate::Result<VisitOutcome> {
    let mut remaining = start;
    for (idx, throw) in throws.iter().enumerate() {
        let info = check_bust(remaining, throw.score as i64, throw.is_double())?;
        if info.is_bust {
            return Ok(VisitOutcome {
                bust: info,
                remaining: start,
                checked_out: false,
                darts_used: idx + 1,
            });
        }
        remaining -= throw.score as i64;
        if remaining == 0 {
            return Ok(VisitOutcome {
                bust: info,
                remaining,
                checked_out: true,
                darts_used: idx + 1,
            });
        }
    }

    // Zero darts still has to satisfy check_bust's positive-start contract.
    if throws.is_empty() {
        check_bust(start, 0, false)?;
    }
    Ok(VisitOutcome {
        bust: BustInfo::valid(),
        remaining,
        checked_out: false,
        darts_used: throws.len(),
    })
}

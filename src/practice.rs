//! The practice session: question generation, answer judgment, statistics
//! and termination.
//!
//! A session moves `Setup -> Practicing -> Results` and goes back to `Setup`
//! from anywhere; a new session always starts from `Setup`. All mutation goes
//! through the action methods on [`PracticeSession`]; every action validates
//! its input before touching any state.

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::time::Duration;

use crate::checkout::optimal_target;
use crate::config::{
    find_preset, validate_starting_score, validate_std_dev, JudgmentTiming, PracticeConfig,
    QuestionType, ThrowUnit,
};
use crate::error::DrillError;
use crate::rules::{evaluate_visit, BustInfo};
use crate::session::{Clock, SessionConfig, SessionMode, SessionTimer, Stats, SystemClock};
use crate::target::{Target, DEFAULT_TARGET};
use crate::target_bag::TargetBag;
use crate::throw_sim::{execute_throw, ThrowResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameState {
    Setup,
    Practicing,
    Results,
}

/// What a single question asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuestionMode {
    Score,
    Remaining,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    UserEnded,
    TimeUp,
    QuestionLimit,
    Checkout,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub mode: QuestionMode,
    pub throws: Vec<ThrowResult>,
    pub correct_answer: i64,
    pub question_text: String,
    /// Remaining score at the start of the round, when it is tracked.
    pub starting_score: Option<i64>,
    /// Leading darts that count toward the answer. Darts thrown after a bust
    /// or checkout are still shown but score nothing.
    pub counted_darts: usize,
    pub bust_info: Option<BustInfo>,
    pub answered: bool,
}

impl Question {
    /// With `visit_rules` the round is played as a 01 visit from `round_start`:
    /// the first bust or checkout ends it.
    pub(crate) fn new(
        mode: QuestionMode,
        throws: Vec<ThrowResult>,
        round_start: Option<i64>,
        visit_rules: bool,
    ) -> crate::Result<Self> {
        let start = round_start.unwrap_or(0);
        let counted_darts = if visit_rules && start > 0 {
            evaluate_visit(start, &throws)?.darts_used
        } else {
            throws.len()
        };
        let total: i64 = throws[..counted_darts].iter().map(|t| t.score as i64).sum();
        let (correct_answer, mut question_text) = match mode {
            QuestionMode::Score if throws.len() == 1 => {
                (total, "What did this dart score?".to_string())
            }
            QuestionMode::Score => (
                total,
                format!("What is the total of these {} darts?", throws.len()),
            ),
            QuestionMode::Remaining => (
                start - total,
                format!("{start} left. What remains after this round?"),
            ),
        };
        if visit_rules && throws.len() > 1 {
            question_text.push_str(" Darts after a bust or checkout do not count.");
        }
        Ok(Self {
            mode,
            throws,
            correct_answer,
            question_text,
            starting_score: round_start,
            counted_darts,
            bust_info: None,
            answered: false,
        })
    }

    /// Sum of the darts that count.
    pub fn total(&self) -> i64 {
        self.counted_throws().iter().map(|t| t.score as i64).sum()
    }

    pub fn counted_throws(&self) -> &[ThrowResult] {
        &self.throws[..self.counted_darts.min(self.throws.len())]
    }
}

/// Result of judging one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_answer: i64,
    pub bust: Option<BustInfo>,
    pub remaining_score: i64,
    pub session_over: bool,
}

#[derive(Debug)]
pub struct PracticeSession<R: Rng = ChaCha8Rng> {
    pub(crate) practice_config: PracticeConfig,
    pub(crate) session_config: SessionConfig,
    pub(crate) game_state: GameState,
    pub(crate) question: Option<Question>,
    pub(crate) stats: Stats,
    pub(crate) remaining_score: i64,
    pub(crate) round_start_score: i64,
    pub(crate) revealed: usize,
    pub(crate) bag: Option<TargetBag>,
    pub(crate) timer: SessionTimer,
    pub(crate) end_reason: Option<EndReason>,
    rng: R,
    clock: Box<dyn Clock>,
}

impl PracticeSession<ChaCha8Rng> {
    /// Session with an entropy-seeded generator and the system clock.
    pub fn new(practice_config: PracticeConfig, session_config: SessionConfig) -> Self {
        Self::with_rng(practice_config, session_config, ChaCha8Rng::from_entropy())
    }

    /// Session whose throws, shuffles and coin flips replay exactly for a seed.
    pub fn seeded(practice_config: PracticeConfig, session_config: SessionConfig, seed: u64) -> Self {
        Self::with_rng(practice_config, session_config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> PracticeSession<R> {
    pub fn with_rng(practice_config: PracticeConfig, session_config: SessionConfig, rng: R) -> Self {
        let start = practice_config.starting_score.unwrap_or(0);
        Self {
            practice_config,
            session_config,
            game_state: GameState::Setup,
            question: None,
            stats: Stats::default(),
            remaining_score: start,
            round_start_score: start,
            revealed: 0,
            bag: None,
            timer: SessionTimer::default(),
            end_reason: None,
            rng,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    // Queries

    pub fn game_state(&self) -> GameState {
        self.game_state
    }

    pub fn practice_config(&self) -> &PracticeConfig {
        &self.practice_config
    }

    pub fn session_config(&self) -> &SessionConfig {
        &self.session_config
    }

    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn remaining_score(&self) -> i64 {
        self.remaining_score
    }

    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer.running
    }

    pub fn end_reason(&self) -> Option<&EndReason> {
        self.end_reason.as_ref()
    }

    pub fn target_bag(&self) -> Option<&TargetBag> {
        self.bag.as_ref()
    }

    pub fn revealed_throws(&self) -> &[ThrowResult] {
        match &self.question {
            Some(q) => &q.throws[..self.revealed.min(q.throws.len())],
            None => &[],
        }
    }

    /// Whether the front-end should prompt for an answer now.
    pub fn answer_ready(&self) -> bool {
        let Some(q) = &self.question else {
            return false;
        };
        if q.answered || self.game_state != GameState::Practicing {
            return false;
        }
        match self.practice_config.judgment_timing {
            JudgmentTiming::Cumulative => self.revealed >= q.throws.len(),
            JudgmentTiming::Independent => self.revealed >= 1,
        }
    }

    // Settings

    pub fn set_practice_config(&mut self, cfg: PracticeConfig) -> crate::Result<()> {
        cfg.validate()?;
        self.practice_config = cfg;
        Ok(())
    }

    pub fn set_session_config(&mut self, cfg: SessionConfig) -> crate::Result<()> {
        cfg.validate()?;
        self.session_config = cfg;
        Ok(())
    }

    pub fn set_throw_unit(&mut self, count: u8) -> crate::Result<()> {
        self.practice_config.throw_unit = ThrowUnit::try_from(count)?;
        Ok(())
    }

    pub fn set_question_type(&mut self, question_type: QuestionType) -> crate::Result<()> {
        if question_type != QuestionType::Score && self.practice_config.starting_score.is_none() {
            return Err(DrillError::invalid(
                "question type",
                question_type,
                "set a starting score before tracking the remaining score",
            ));
        }
        self.practice_config.question_type = question_type;
        Ok(())
    }

    pub fn set_judgment_timing(&mut self, timing: JudgmentTiming) {
        self.practice_config.judgment_timing = timing;
    }

    pub fn set_starting_score(&mut self, score: i64) -> crate::Result<()> {
        self.practice_config.starting_score = Some(validate_starting_score(score)?);
        Ok(())
    }

    pub fn set_std_dev(&mut self, std_dev_mm: f64) -> crate::Result<()> {
        self.practice_config.std_dev_mm = validate_std_dev(std_dev_mm)?;
        Ok(())
    }

    pub fn set_target(&mut self, target: Option<Target>) -> crate::Result<()> {
        self.practice_config.target = target.map(Target::validate).transpose()?;
        Ok(())
    }

    pub fn set_randomize_target(&mut self, randomize: bool) {
        self.practice_config.randomize_target = randomize;
    }

    pub fn set_basic_targets(&mut self, basic: bool) {
        self.practice_config.basic_targets = basic;
    }

    pub fn select_preset(&mut self, id: &str) -> crate::Result<()> {
        let cfg = find_preset(id)?;
        info!("selected preset {id}");
        self.practice_config = cfg;
        Ok(())
    }

    // Lifecycle

    pub fn start_practice(&mut self) -> crate::Result<()> {
        if self.game_state != GameState::Setup {
            return Err(self.wrong_state("start practice"));
        }
        self.practice_config.validate()?;
        self.session_config.validate()?;

        let start = self.practice_config.starting_score.unwrap_or(0);
        self.stats.reset_keep_best();
        self.timer.start(self.clock.now());
        self.remaining_score = start;
        self.round_start_score = start;
        self.end_reason = None;
        self.bag = if self.practice_config.uses_target_bag() {
            Some(TargetBag::new(&mut self.rng))
        } else {
            None
        };
        self.game_state = GameState::Practicing;
        info!(
            "practice started: {} darts per round, {} questions, session {}",
            self.practice_config.throw_unit.count(),
            self.practice_config.question_type,
            self.session_config.mode
        );
        self.generate_question()
    }

    /// Builds the next round from the current remaining score.
    pub fn generate_question(&mut self) -> crate::Result<()> {
        if self.game_state != GameState::Practicing {
            return Err(self.wrong_state("generate a question"));
        }
        let cfg = self.practice_config.clone();
        let tracking = cfg.tracks_remaining();
        // Randomised drilling is exempt from bust and checkout rules.
        let visit_rules = tracking && !cfg.randomize_target;
        let darts = cfg.throw_unit.count();

        self.question = None;
        let round_target = if cfg.randomize_target {
            Some(self.random_target())
        } else {
            None
        };

        // The projection only steers target choice; the persisted remaining
        // score moves when the answer is judged.
        let mut projected = self.remaining_score;
        let mut throws = Vec::with_capacity(darts);
        for i in 0..darts {
            let darts_left = (darts - i) as u8;
            let target = round_target.unwrap_or_else(|| self.pick_target(projected, darts_left));
            let throw = execute_throw(target, cfg.std_dev_mm, &mut self.rng)?;
            projected -= throw.score as i64;
            throws.push(throw);
        }

        let mode = match cfg.question_type {
            QuestionType::Score => QuestionMode::Score,
            QuestionType::Remaining => QuestionMode::Remaining,
            QuestionType::Both if self.remaining_score <= 0 => QuestionMode::Score,
            QuestionType::Both => {
                if self.rng.gen_bool(0.5) {
                    QuestionMode::Remaining
                } else {
                    QuestionMode::Score
                }
            }
        };

        let round_start = tracking.then_some(self.round_start_score);
        let question = Question::new(mode, throws, round_start, visit_rules)?;
        self.revealed = if cfg.throw_unit == ThrowUnit::One {
            question.throws.len()
        } else {
            0
        };
        debug!(
            "question: {} mode, darts [{}], answer {}",
            question.mode,
            question
                .throws
                .iter()
                .map(|t| format!("{}->{}", t.target, t.hit_label()))
                .collect::<Vec<_>>()
                .join(", "),
            question.correct_answer
        );
        self.question = Some(question);
        Ok(())
    }

    /// Shows one more dart of a multi-dart round.
    pub fn reveal_next_throw(&mut self) -> Option<ThrowResult> {
        if self.game_state != GameState::Practicing {
            return None;
        }
        let q = self.question.as_ref()?;
        let next = q.throws.get(self.revealed).copied()?;
        self.revealed += 1;
        Some(next)
    }

    pub fn submit_answer(&mut self, answer: i64) -> crate::Result<AnswerOutcome> {
        if answer < 0 {
            return Err(DrillError::invalid(
                "answer",
                answer,
                "must be a non-negative integer",
            ));
        }
        if self.game_state != GameState::Practicing {
            return Err(self.wrong_state("submit an answer"));
        }
        let Some(question) = self.question.as_ref() else {
            return Err(self.wrong_state("submit an answer"));
        };
        if question.answered {
            return Err(DrillError::AlreadyAnswered);
        }

        let tracking = self.practice_config.tracks_remaining();
        let randomized = self.practice_config.randomize_target;
        let visit = if tracking && !randomized && self.round_start_score > 0 {
            Some(evaluate_visit(self.round_start_score, &question.throws)?)
        } else {
            None
        };
        let is_bust = visit.is_some_and(|v| v.bust.is_bust);
        let correct = answer == question.correct_answer && !is_bust;
        let correct_answer = question.correct_answer;
        let total = question.total();

        if tracking {
            self.remaining_score = match visit {
                Some(v) => v.remaining,
                None => self.round_start_score - total,
            };
        }
        if let Some(q) = self.question.as_mut() {
            q.answered = true;
            q.bust_info = visit.map(|v| v.bust);
            self.revealed = q.throws.len();
        }
        self.stats.record(correct);
        if let Some(bag) = self.bag.as_mut() {
            bag.advance(&mut self.rng);
        }
        debug!(
            "answer {answer} (expected {correct_answer}): correct={correct} bust={is_bust} remaining={}",
            self.remaining_score
        );

        if self.session_config.mode == SessionMode::Questions
            && self
                .session_config
                .question_count
                .is_some_and(|limit| self.stats.total >= limit)
        {
            self.finish(EndReason::QuestionLimit);
        }

        Ok(AnswerOutcome {
            correct,
            correct_answer,
            bust: visit.map(|v| v.bust),
            remaining_score: self.remaining_score,
            session_over: self.game_state == GameState::Results,
        })
    }

    pub fn next_question(&mut self) -> crate::Result<()> {
        if self.game_state != GameState::Practicing {
            return Err(self.wrong_state("advance to the next question"));
        }
        if self.practice_config.tracks_remaining() && self.remaining_score == 0 {
            self.finish(EndReason::Checkout);
            return Ok(());
        }
        self.round_start_score = self.remaining_score;
        self.generate_question()
    }

    /// Ends the session now. The reason is kept for reporting only.
    pub fn end_session(&mut self, reason: Option<EndReason>) {
        self.finish(reason.unwrap_or(EndReason::UserEnded));
    }

    /// Recomputes elapsed time from the start timestamp and enforces the time
    /// limit. Safe to call as often as wanted.
    pub fn tick(&mut self) -> Duration {
        let elapsed = self.timer.tick(self.clock.now());
        if self.game_state == GameState::Practicing {
            if let Some(limit) = self.session_config.time_limit_duration() {
                if elapsed >= limit {
                    self.finish(EndReason::TimeUp);
                }
            }
        }
        self.timer.elapsed
    }

    pub fn reset_to_setup(&mut self) {
        let start = self.practice_config.starting_score.unwrap_or(0);
        self.game_state = GameState::Setup;
        self.question = None;
        self.revealed = 0;
        self.bag = None;
        self.timer.reset();
        self.remaining_score = start;
        self.round_start_score = start;
        self.end_reason = None;
        info!("session reset to setup");
    }

    fn finish(&mut self, reason: EndReason) {
        self.timer.stop(self.clock.now());
        self.game_state = GameState::Results;
        info!(
            "session finished ({reason:?}): {}/{} correct, best streak {}",
            self.stats.correct, self.stats.total, self.stats.best_streak
        );
        self.end_reason = Some(reason);
    }

    fn wrong_state(&self, action: &'static str) -> DrillError {
        DrillError::InvalidState {
            action,
            state: self.game_state,
        }
    }

    fn random_target(&mut self) -> Target {
        if let Some(target) = self.bag.as_ref().and_then(|b| b.current()) {
            return target;
        }
        Target::basic_set()
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(DEFAULT_TARGET)
    }

    /// Checkout play from the projected score when a starting score is set,
    /// in either question mode; otherwise the fixed target, then T20.
    fn pick_target(&self, projected: i64, darts_left: u8) -> Target {
        let fixed = self.practice_config.target.unwrap_or(DEFAULT_TARGET);
        if self.practice_config.starting_score.is_none() {
            return fixed;
        }
        optimal_target(projected, darts_left).unwrap_or(fixed)
    }
}

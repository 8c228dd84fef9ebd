mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use dartdrill::{
    config::{find_preset, ConfigStore, FileConfigStore, JudgmentTiming, PracticeConfig, QuestionType},
    practice::{AnswerOutcome, EndReason, GameState, PracticeSession},
    runtime::{Command, DrillEvent, Runner},
    session::{SessionConfig, SessionMode},
    target::Target,
};
use log::info;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

const TICK_RATE_MS: u64 = 100;
const MAX_ANSWER_DIGITS: usize = 4;

/// darts scoring trainer: read simulated throws, call the score, count down to a double
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal darts trainer. Simulated darts land around an aim point with a Gaussian spread; you call the score or what is left, and the 01 bust rules are enforced."
)]
pub struct Cli {
    /// start from a named preset (score-1, score-3, remaining-501, checkout-170, checkout-40, basic-drill)
    #[clap(long)]
    preset: Option<String>,

    /// darts per round (1 or 3)
    #[clap(short = 'd', long)]
    darts: Option<u8>,

    /// what each question asks for
    #[clap(short = 'q', long, value_enum)]
    question_type: Option<QuestionType>,

    /// when an answer may be given in multi-dart rounds
    #[clap(long, value_enum)]
    judgment: Option<JudgmentTiming>,

    /// score to count down from
    #[clap(short = 's', long)]
    starting_score: Option<i64>,

    /// throw spread in millimetres (standard deviation per axis)
    #[clap(long)]
    std_dev: Option<f64>,

    /// fixed aim point, e.g. T20, D16, 25, BULL
    #[clap(short = 't', long)]
    target: Option<Target>,

    /// aim at a random target each round
    #[clap(long)]
    random_target: bool,

    /// draw random targets from the shuffled basic set without repeats
    #[clap(long, requires = "random_target")]
    basic: bool,

    /// end the session after this many questions
    #[clap(short = 'n', long, conflicts_with = "minutes")]
    questions: Option<u32>,

    /// end the session after this many minutes
    #[clap(short = 'm', long)]
    minutes: Option<u32>,

    /// seed for reproducible throws
    #[clap(long)]
    seed: Option<u64>,

    /// store the resulting practice settings as the new defaults
    #[clap(long)]
    save: bool,
}

impl Cli {
    /// Stored settings, then the preset, then individual flags.
    fn practice_config(&self, stored: PracticeConfig) -> dartdrill::Result<PracticeConfig> {
        let mut cfg = match &self.preset {
            Some(id) => find_preset(id)?,
            None => stored,
        };
        if let Some(darts) = self.darts {
            cfg.throw_unit = darts.try_into()?;
        }
        if let Some(question_type) = self.question_type {
            cfg.question_type = question_type;
        }
        if let Some(timing) = self.judgment {
            cfg.judgment_timing = timing;
        }
        if let Some(score) = self.starting_score {
            cfg.starting_score = Some(score);
        }
        if let Some(std_dev) = self.std_dev {
            cfg.std_dev_mm = std_dev;
        }
        if self.target.is_some() {
            cfg.target = self.target;
        }
        if self.random_target {
            cfg.randomize_target = true;
            cfg.basic_targets = self.basic;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    fn session_config(&self) -> SessionConfig {
        match (self.minutes, self.questions) {
            (Some(m), _) => SessionConfig::timed(m),
            (None, Some(n)) => SessionConfig::questions(n),
            (None, None) => SessionConfig::default(),
        }
    }
}

#[derive(Debug)]
pub struct App {
    pub session: PracticeSession,
    pub input: String,
    pub last_outcome: Option<AnswerOutcome>,
    pub message: Option<String>,
}

impl App {
    pub fn new(session: PracticeSession) -> Self {
        Self {
            session,
            input: String::new(),
            last_outcome: None,
            message: None,
        }
    }

    fn clear_round(&mut self) {
        self.input.clear();
        self.last_outcome = None;
        self.message = None;
    }

    fn report<T>(&mut self, res: dartdrill::Result<T>) -> Option<T> {
        match res {
            Ok(v) => Some(v),
            Err(e) => {
                self.message = Some(e.to_string());
                None
            }
        }
    }

    /// Applies one player command. Returns `true` when the app should quit.
    pub fn on_command(&mut self, cmd: Command) -> bool {
        if cmd == Command::Quit {
            return true;
        }

        match (self.session.game_state(), cmd) {
            (GameState::Setup, Command::Confirm) => self.start(),
            (GameState::Practicing, Command::End) => {
                self.session.end_session(Some(EndReason::UserEnded))
            }
            (GameState::Practicing, Command::Confirm | Command::Next) if self.last_outcome.is_some() => {
                self.clear_round();
                let res = self.session.next_question();
                self.report(res);
            }
            (GameState::Practicing, _) if self.last_outcome.is_some() => {}
            (GameState::Practicing, Command::Reveal) => {
                self.session.reveal_next_throw();
            }
            (GameState::Practicing, Command::Digit(d)) => {
                if self.input.len() < MAX_ANSWER_DIGITS {
                    self.input.push(char::from(b'0' + d));
                }
            }
            (GameState::Practicing, Command::Erase) => {
                self.input.pop();
            }
            (GameState::Practicing, Command::Confirm) => self.submit(),
            (GameState::Results, Command::Restart) => {
                self.session.reset_to_setup();
                self.start();
            }
            (GameState::Results, Command::Setup) => {
                self.clear_round();
                self.session.reset_to_setup();
            }
            _ => {}
        }
        false
    }

    fn start(&mut self) {
        self.clear_round();
        let res = self.session.start_practice();
        self.report(res);
    }

    fn submit(&mut self) {
        if !self.session.answer_ready() {
            self.message = Some("reveal the darts first (space)".to_string());
            return;
        }
        let Ok(answer) = self.input.parse::<i64>() else {
            self.message = Some("type a number first".to_string());
            return;
        };
        let res = self.session.submit_answer(answer);
        if let Some(outcome) = self.report(res) {
            self.message = None;
            self.last_outcome = Some(outcome);
        }
    }

    pub fn on_tick(&mut self) {
        self.session.tick();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let practice = cli.practice_config(store.load())?;
    let session_config = cli.session_config();
    session_config.validate()?;

    if cli.save {
        store.save(&practice)?;
        info!("saved practice settings to {}", store.path().display());
    }

    let session = match cli.seed {
        Some(seed) => PracticeSession::seeded(practice, session_config, seed),
        None => PracticeSession::new(practice, session_config),
    };
    let mut app = App::new(session);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::terminal(Duration::from_millis(TICK_RATE_MS));

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    loop {
        match runner.step() {
            DrillEvent::Tick => {
                if app.session.game_state() == GameState::Practicing {
                    app.on_tick();
                    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
                }
            }
            DrillEvent::Redraw => {
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            DrillEvent::Command(cmd) => {
                if app.on_command(cmd) {
                    break;
                }
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
        }
    }

    Ok(())
}

/// Shown in the setup screen and results footer.
fn describe_session(cfg: &SessionConfig) -> String {
    match cfg.mode {
        SessionMode::Questions => format!("{} questions", cfg.question_count.unwrap_or(0)),
        SessionMode::Time => format!("{} min", cfg.time_limit.unwrap_or(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use dartdrill::config::ThrowUnit;

    fn press(app: &mut App, cmd: Command) -> bool {
        app.on_command(cmd)
    }

    fn type_str(app: &mut App, s: &str) {
        for b in s.bytes() {
            press(app, Command::Digit(b - b'0'));
        }
    }

    fn seeded_app(practice: PracticeConfig, session: SessionConfig) -> App {
        App::new(PracticeSession::seeded(practice, session, 7))
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["dartdrill"]);
        assert_eq!(cli.preset, None);
        assert_eq!(cli.darts, None);
        assert_eq!(cli.seed, None);
        assert!(!cli.random_target);
        assert!(!cli.save);

        let cfg = cli.practice_config(PracticeConfig::default()).unwrap();
        assert_eq!(cfg, PracticeConfig::default());
        assert_eq!(cli.session_config(), SessionConfig::default());
    }

    #[test]
    fn test_cli_flags_override_stored_config() {
        let cli = Cli::parse_from([
            "dartdrill", "-d", "3", "-q", "remaining", "-s", "301", "--std-dev", "12.5", "-t", "T19",
            "--judgment", "independent",
        ]);
        let cfg = cli.practice_config(PracticeConfig::default()).unwrap();
        assert_eq!(cfg.throw_unit, ThrowUnit::Three);
        assert_eq!(cfg.question_type, QuestionType::Remaining);
        assert_eq!(cfg.starting_score, Some(301));
        assert_eq!(cfg.std_dev_mm, 12.5);
        assert_eq!(cfg.target, Some(Target::Triple(19)));
        assert_eq!(cfg.judgment_timing, JudgmentTiming::Independent);
    }

    #[test]
    fn test_cli_preset_then_flags() {
        let cli = Cli::parse_from(["dartdrill", "--preset", "checkout-40", "--std-dev", "5"]);
        let cfg = cli.practice_config(PracticeConfig::default()).unwrap();
        assert_eq!(cfg.starting_score, Some(40));
        assert_eq!(cfg.std_dev_mm, 5.0);
    }

    #[test]
    fn test_cli_rejects_bad_values() {
        let cli = Cli::parse_from(["dartdrill", "-d", "2"]);
        assert!(cli.practice_config(PracticeConfig::default()).is_err());

        let cli = Cli::parse_from(["dartdrill", "--preset", "cricket"]);
        assert!(cli.practice_config(PracticeConfig::default()).is_err());

        assert!(Cli::try_parse_from(["dartdrill", "-t", "T25"]).is_err());
        assert!(Cli::try_parse_from(["dartdrill", "-n", "5", "-m", "2"]).is_err());
        assert!(Cli::try_parse_from(["dartdrill", "--basic"]).is_err());
    }

    #[test]
    fn test_cli_session_modes() {
        let cli = Cli::parse_from(["dartdrill", "-m", "3"]);
        assert_eq!(cli.session_config(), SessionConfig::timed(3));
        let cli = Cli::parse_from(["dartdrill", "--questions", "20"]);
        assert_eq!(cli.session_config(), SessionConfig::questions(20));
        assert_eq!(describe_session(&SessionConfig::questions(20)), "20 questions");
        assert_eq!(describe_session(&SessionConfig::timed(3)), "3 min");
    }

    #[test]
    fn test_cli_random_basic_targets() {
        let cli = Cli::parse_from(["dartdrill", "--random-target", "--basic"]);
        let cfg = cli.practice_config(PracticeConfig::default()).unwrap();
        assert!(cfg.randomize_target);
        assert!(cfg.basic_targets);
    }

    #[test]
    fn test_app_enter_starts_practice() {
        let mut app = seeded_app(PracticeConfig::default(), SessionConfig::default());
        assert_eq!(app.session.game_state(), GameState::Setup);
        assert!(!press(&mut app, Command::Confirm));
        assert_eq!(app.session.game_state(), GameState::Practicing);
        assert!(app.session.question().is_some());
    }

    #[test]
    fn test_app_answer_and_advance() {
        let mut app = seeded_app(PracticeConfig::default(), SessionConfig::default());
        press(&mut app, Command::Confirm);
        let answer = app.session.question().unwrap().correct_answer;

        type_str(&mut app, "9");
        press(&mut app, Command::Erase);
        type_str(&mut app, &answer.to_string());
        assert_eq!(app.input, answer.to_string());
        press(&mut app, Command::Confirm);

        let outcome = app.last_outcome.unwrap();
        assert!(outcome.correct);
        assert_eq!(app.session.stats().correct, 1);

        press(&mut app, Command::Next);
        assert!(app.last_outcome.is_none());
        assert!(app.input.is_empty());
        assert!(!app.session.question().unwrap().answered);
    }

    #[test]
    fn test_app_requires_reveal_before_submit() {
        let practice = PracticeConfig {
            throw_unit: ThrowUnit::Three,
            ..PracticeConfig::default()
        };
        let mut app = seeded_app(practice, SessionConfig::default());
        press(&mut app, Command::Confirm);
        type_str(&mut app, "60");
        press(&mut app, Command::Confirm);
        assert!(app.last_outcome.is_none());
        assert!(app.message.is_some());

        for _ in 0..3 {
            press(&mut app, Command::Reveal);
        }
        press(&mut app, Command::Confirm);
        assert!(app.last_outcome.is_some());
        assert_eq!(app.session.stats().total, 1);
    }

    #[test]
    fn test_app_input_is_bounded() {
        let mut app = seeded_app(PracticeConfig::default(), SessionConfig::default());
        press(&mut app, Command::Confirm);
        type_str(&mut app, "1234567");
        assert_eq!(app.input, "1234");
    }

    #[test]
    fn test_app_results_restart_and_setup() {
        let mut app = seeded_app(PracticeConfig::default(), SessionConfig::questions(1));
        press(&mut app, Command::Confirm);
        type_str(&mut app, "0");
        press(&mut app, Command::Confirm);
        assert_eq!(app.session.game_state(), GameState::Results);

        press(&mut app, Command::Restart);
        assert_eq!(app.session.game_state(), GameState::Practicing);
        assert_eq!(app.session.stats().total, 0);

        press(&mut app, Command::End);
        assert_eq!(app.session.game_state(), GameState::Results);
        assert_eq!(app.session.end_reason(), Some(&EndReason::UserEnded));
        press(&mut app, Command::Setup);
        assert_eq!(app.session.game_state(), GameState::Setup);
    }

    #[test]
    fn test_app_quit_works_everywhere() {
        let mut app = seeded_app(PracticeConfig::default(), SessionConfig::default());
        assert!(press(&mut app, Command::Quit));
        press(&mut app, Command::Confirm);
        assert!(press(&mut app, Command::Quit));
    }

    #[test]
    fn test_app_ignores_commands_outside_their_screen() {
        let mut app = seeded_app(PracticeConfig::default(), SessionConfig::default());
        press(&mut app, Command::Digit(5));
        press(&mut app, Command::Restart);
        assert_eq!(app.session.game_state(), GameState::Setup);
        assert!(app.input.is_empty());

        press(&mut app, Command::Confirm);
        let answer = app.session.question().unwrap().correct_answer;
        type_str(&mut app, &answer.to_string());
        press(&mut app, Command::Confirm);
        // Typing after feedback does not start the next answer.
        press(&mut app, Command::Digit(1));
        assert_eq!(app.input, answer.to_string());
    }
}

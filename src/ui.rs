use std::time::Duration;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};

use dartdrill::{
    board::{
        Point, DOUBLE_INNER_RADIUS, DOUBLE_OUTER_RADIUS, OUTER_BULL_RADIUS, TRIPLE_INNER_RADIUS,
        TRIPLE_OUTER_RADIUS,
    },
    config::PracticeConfig,
    practice::{EndReason, GameState},
    rules::BustReason,
    session::SessionMode,
    target::DEFAULT_TARGET,
};

use crate::{describe_session, App};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
const BOARD_BOUND: f64 = 180.0;
const OUTLINE_POINTS: usize = 90;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.session.game_state() {
            GameState::Setup => render_setup(self, area, buf),
            GameState::Practicing => render_practice(self, area, buf),
            GameState::Results => render_results(self, area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

/// `mm:ss`
pub fn format_clock(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn describe_target(cfg: &PracticeConfig) -> String {
    let fixed = cfg.target.unwrap_or(DEFAULT_TARGET);
    match (cfg.randomize_target, cfg.basic_targets) {
        (true, true) => "random (basic set)".to_string(),
        (true, false) => "random".to_string(),
        (false, _) if cfg.starting_score.is_some() => format!("checkout suggestion / {fixed}"),
        (false, _) => fixed.to_string(),
    }
}

fn describe_bust(reason: Option<BustReason>) -> &'static str {
    match reason {
        Some(BustReason::Over) => "scored more than was left",
        Some(BustReason::FinishImpossible) => "left 1",
        Some(BustReason::DoubleOutRequired) => "must finish on a double",
        None => "bust",
    }
}

fn describe_end(reason: Option<&EndReason>) -> String {
    match reason {
        Some(EndReason::UserEnded) | None => "ended".to_string(),
        Some(EndReason::TimeUp) => "time up".to_string(),
        Some(EndReason::QuestionLimit) => "all questions answered".to_string(),
        Some(EndReason::Checkout) => "checked out!".to_string(),
        Some(EndReason::Other(s)) => s.clone(),
    }
}

fn ring_outline(radius: f64) -> Vec<(f64, f64)> {
    (0..OUTLINE_POINTS)
        .map(|i| {
            let p = Point::polar(radius, i as f64 * 360.0 / OUTLINE_POINTS as f64);
            (p.x, p.y)
        })
        .collect()
}

fn message_line(app: &App) -> Paragraph<'_> {
    Paragraph::new(Span::styled(
        app.message.clone().unwrap_or_default(),
        Style::default().fg(Color::Red).add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
}

fn render_setup(app: &App, area: Rect, buf: &mut Buffer) {
    let cfg = app.session.practice_config();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Min(8),    // settings
            Constraint::Length(1), // message
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled("dartdrill", bold().fg(Color::Magenta)))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let starting = cfg
        .starting_score
        .map_or_else(|| "-".to_string(), |s| s.to_string());
    let rows = [
        ("darts per round", cfg.throw_unit.count().to_string()),
        ("question", cfg.question_type.to_string()),
        ("judgment", cfg.judgment_timing.to_string()),
        ("starting score", starting),
        ("spread", format!("{:.1} mm", cfg.std_dev_mm)),
        ("target", describe_target(cfg)),
        ("session", describe_session(app.session.session_config())),
    ];
    let lines = rows
        .into_iter()
        .map(|(k, v)| {
            Line::from(vec![
                Span::styled(format!("{k:>16}  "), dim_bold()),
                Span::styled(v, bold()),
            ])
        })
        .collect::<Vec<_>>();
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    message_line(app).render(chunks[2], buf);
    Paragraph::new(Span::styled("(enter) start / (esc)ape", italic())).render(chunks[3], buf);
}

fn render_practice(app: &App, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let Some(question) = session.question() else {
        return;
    };
    let tracking = session.practice_config().tracks_remaining();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // stats + clock
            Constraint::Min(6),    // board
            Constraint::Length(1), // darts
            Constraint::Length(1), // remaining
            Constraint::Length(1), // question
            Constraint::Length(1), // input
            Constraint::Length(1), // feedback
            Constraint::Length(1), // legend
        ])
        .split(area);

    let stats = session.stats();
    let clock = match session.session_config().time_limit_duration() {
        Some(limit) => format!(
            "{} left",
            format_clock(limit.saturating_sub(session.elapsed()))
        ),
        None => format_clock(session.elapsed()),
    };
    Paragraph::new(Span::styled(
        format!(
            "{}/{} correct   streak {}   best {}   {}",
            stats.correct, stats.total, stats.current_streak, stats.best_streak, clock
        ),
        dim_bold(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let outlines = [
        ring_outline(DOUBLE_OUTER_RADIUS),
        ring_outline(DOUBLE_INNER_RADIUS),
        ring_outline(TRIPLE_OUTER_RADIUS),
        ring_outline(TRIPLE_INNER_RADIUS),
        ring_outline(OUTER_BULL_RADIUS),
    ];
    let landings = session
        .revealed_throws()
        .iter()
        .map(|t| (t.landing_point.x, t.landing_point.y))
        .collect::<Vec<_>>();
    let mut datasets = outlines
        .iter()
        .map(|pts| {
            Dataset::default()
                .marker(Marker::Braille)
                .style(Style::default().fg(Color::DarkGray))
                .graph_type(GraphType::Scatter)
                .data(pts)
        })
        .collect::<Vec<_>>();
    datasets.push(
        Dataset::default()
            .marker(Marker::Block)
            .style(Style::default().fg(Color::Magenta))
            .graph_type(GraphType::Scatter)
            .data(&landings),
    );
    Chart::new(datasets)
        .x_axis(Axis::default().bounds([-BOARD_BOUND, BOARD_BOUND]))
        .y_axis(Axis::default().bounds([-BOARD_BOUND, BOARD_BOUND]))
        .render(chunks[1], buf);

    let revealed = session.revealed_throws().len();
    let mut darts = vec![Span::styled(
        format!(
            "aim {}   ",
            question
                .throws
                .first()
                .map_or_else(String::new, |t| t.target.to_string())
        ),
        dim_bold(),
    )];
    for (idx, throw) in question.throws.iter().enumerate() {
        let text = match (idx < revealed, question.answered) {
            (true, true) if idx >= question.counted_darts => {
                format!("{} (void)  ", throw.hit_label())
            }
            (true, true) => format!("{} ({})  ", throw.hit_label(), throw.score),
            (true, false) => format!("{}  ", throw.hit_label()),
            (false, _) => "?  ".to_string(),
        };
        darts.push(Span::styled(text, bold()));
    }
    Paragraph::new(Line::from(darts))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    if tracking {
        Paragraph::new(Span::styled(
            format!("remaining {}", session.remaining_score()),
            bold().fg(Color::Cyan),
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
    }

    Paragraph::new(Span::styled(question.question_text.as_str(), bold()))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[4], buf);

    Paragraph::new(Line::from(vec![
        Span::styled("> ", dim_bold()),
        Span::styled(app.input.as_str(), bold()),
        Span::styled("_", dim_bold().add_modifier(Modifier::SLOW_BLINK)),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[5], buf);

    let feedback = match (&app.last_outcome, &app.message) {
        (_, Some(msg)) => Span::styled(msg.clone(), italic().fg(Color::Red)),
        (Some(outcome), None) => match outcome.bust {
            Some(bust) if bust.is_bust => Span::styled(
                format!(
                    "BUST ({}): score stays at {}",
                    describe_bust(bust.reason),
                    outcome.remaining_score
                ),
                bold().fg(Color::Red),
            ),
            _ if outcome.correct => Span::styled("correct!", bold().fg(Color::Green)),
            _ => Span::styled(
                format!("not quite, it was {}", outcome.correct_answer),
                bold().fg(Color::Red),
            ),
        },
        (None, None) => Span::raw(""),
    };
    Paragraph::new(feedback)
        .alignment(Alignment::Center)
        .render(chunks[6], buf);

    let legend = if app.last_outcome.is_some() {
        "(n)ext / (e)nd / (esc)ape"
    } else if revealed < question.throws.len() {
        "(space) reveal / (0-9) answer / (enter) submit / (e)nd / (esc)ape"
    } else {
        "(0-9) answer / (enter) submit / (e)nd / (esc)ape"
    };
    Paragraph::new(Span::styled(legend, italic())).render(chunks[7], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let stats = session.stats();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // reason
            Constraint::Length(1), // stats
            Constraint::Length(1), // streaks + time
            Constraint::Min(1),
            Constraint::Length(1), // message
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(
        describe_end(session.end_reason()),
        bold().fg(Color::Magenta),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!(
            "{}/{} correct   {}% acc",
            stats.correct,
            stats.total,
            stats.accuracy()
        ),
        bold(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    let mut detail = format!(
        "best streak {}   time {}",
        stats.best_streak,
        format_clock(session.elapsed())
    );
    if session.session_config().mode == SessionMode::Questions
        && session.practice_config().tracks_remaining()
    {
        detail.push_str(&format!("   remaining {}", session.remaining_score()));
    }
    Paragraph::new(Span::styled(detail, dim_bold()))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    message_line(app).render(chunks[5], buf);
    Paragraph::new(Span::styled("(r)estart / (s)etup / (esc)ape", italic())).render(chunks[6], buf);
}

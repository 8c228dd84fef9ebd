//! Player input for the drill. Terminal keys are decoded into [`Command`]s
//! on a reader thread, so the app only ever sees drill actions. Headless runs
//! feed the same channel by hand.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::warn;

/// One thing the player asked for. What `Confirm` means depends on the
/// screen: start in setup, submit while answering, advance after feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Digit(u8),
    Erase,
    Confirm,
    Reveal,
    Next,
    End,
    Restart,
    Setup,
    Quit,
}

impl Command {
    /// Presses only. Keys with no drill meaning give `None`.
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return (key.code == KeyCode::Char('c')).then_some(Command::Quit);
        }
        let cmd = match key.code {
            KeyCode::Esc => Command::Quit,
            KeyCode::Enter => Command::Confirm,
            KeyCode::Backspace => Command::Erase,
            KeyCode::Char(' ') => Command::Reveal,
            KeyCode::Char(c @ '0'..='9') => Command::Digit(c as u8 - b'0'),
            KeyCode::Char('n') => Command::Next,
            KeyCode::Char('e') => Command::End,
            KeyCode::Char('r') => Command::Restart,
            KeyCode::Char('s') => Command::Setup,
            _ => return None,
        };
        Some(cmd)
    }

    /// The digits of `value` followed by `Confirm`.
    pub fn answer(value: u32) -> Vec<Self> {
        value
            .to_string()
            .bytes()
            .map(|b| Command::Digit(b - b'0'))
            .chain([Command::Confirm])
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillEvent {
    Command(Command),
    /// The terminal changed size.
    Redraw,
    /// No input within the tick interval.
    Tick,
}

/// Paces the event loop: hands out queued events and falls back to a tick.
pub struct Runner {
    rx: Receiver<DrillEvent>,
    tick: Duration,
}

impl Runner {
    pub fn new(rx: Receiver<DrillEvent>, tick: Duration) -> Self {
        Self { rx, tick }
    }

    /// Reads the terminal on a background thread. The thread stops once the
    /// runner is dropped or the terminal read fails.
    pub fn terminal(tick: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || pump_terminal(tx));
        Self::new(rx, tick)
    }

    pub fn step(&self) -> DrillEvent {
        match self.rx.recv_timeout(self.tick) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => DrillEvent::Tick,
        }
    }
}

fn pump_terminal(tx: Sender<DrillEvent>) {
    loop {
        let ev = match event::read() {
            Ok(Event::Key(key)) => match Command::from_key(key) {
                Some(cmd) => DrillEvent::Command(cmd),
                None => continue,
            },
            Ok(Event::Resize(..)) => DrillEvent::Redraw,
            Ok(_) => continue,
            Err(e) => {
                warn!("terminal input stopped: {e}");
                return;
            }
        };
        if tx.send(ev).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn keys_decode_to_commands() {
        assert_eq!(Command::from_key(key(KeyCode::Char('7'))), Some(Command::Digit(7)));
        assert_eq!(Command::from_key(key(KeyCode::Enter)), Some(Command::Confirm));
        assert_eq!(Command::from_key(key(KeyCode::Char(' '))), Some(Command::Reveal));
        assert_eq!(Command::from_key(key(KeyCode::Backspace)), Some(Command::Erase));
        assert_eq!(Command::from_key(key(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(
            Command::from_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Command::Quit)
        );
        assert_eq!(Command::from_key(key(KeyCode::Char('x'))), None);
        assert_eq!(
            Command::from_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL)),
            None
        );
    }

    #[test]
    fn key_releases_are_ignored() {
        let mut release = key(KeyCode::Enter);
        release.kind = KeyEventKind::Release;
        assert_eq!(Command::from_key(release), None);
    }

    #[test]
    fn answer_spells_digits_then_confirms() {
        assert_eq!(
            Command::answer(140),
            vec![Command::Digit(1), Command::Digit(4), Command::Digit(0), Command::Confirm]
        );
        assert_eq!(Command::answer(0), vec![Command::Digit(0), Command::Confirm]);
    }

    #[test]
    fn step_ticks_when_idle_or_closed() {
        let (tx, rx) = mpsc::channel();
        let runner = Runner::new(rx, Duration::from_millis(1));
        assert_matches!(runner.step(), DrillEvent::Tick);
        drop(tx);
        assert_matches!(runner.step(), DrillEvent::Tick);
    }

    #[test]
    fn step_keeps_event_order() {
        let (tx, rx) = mpsc::channel();
        tx.send(DrillEvent::Redraw).unwrap();
        for cmd in Command::answer(42) {
            tx.send(DrillEvent::Command(cmd)).unwrap();
        }
        let runner = Runner::new(rx, Duration::from_millis(10));

        assert_matches!(runner.step(), DrillEvent::Redraw);
        assert_matches!(runner.step(), DrillEvent::Command(Command::Digit(4)));
        assert_matches!(runner.step(), DrillEvent::Command(Command::Digit(2)));
        assert_matches!(runner.step(), DrillEvent::Command(Command::Confirm));
        assert_matches!(runner.step(), DrillEvent::Tick);
    }
}

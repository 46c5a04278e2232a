use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::clock::Clock;
use crate::corpus::WordProvider;
use crate::timer::Scheduler;
use crate::typing_test::{Phase, TypingTest};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum EngineEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<EngineEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(EngineEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(EngineEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Channel-backed event source for tests
pub struct TestEventSource {
    rx: Receiver<EngineEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<EngineEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> EngineEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                EngineEvent::Tick
            }
        }
    }
}

/// What a key press means to a typing test
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Type(char),
    Backspace,
    UndoWord,
    Reset,
    /// Finish a running test, quit otherwise
    Escape,
    Quit,
    Ignore,
}

impl KeyAction {
    pub fn from_key(key: &KeyEvent) -> Self {
        if key.kind == KeyEventKind::Release {
            return KeyAction::Ignore;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => KeyAction::Quit,
            KeyCode::Char('z') if ctrl => KeyAction::UndoWord,
            KeyCode::Char(_) if ctrl => KeyAction::Ignore,
            KeyCode::Char(c) => KeyAction::Type(c),
            KeyCode::Backspace => KeyAction::Backspace,
            KeyCode::Tab => KeyAction::Reset,
            KeyCode::Esc => KeyAction::Escape,
            _ => KeyAction::Ignore,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Applies one key action to the test, editing its input buffer
pub fn apply_action<P, C, S>(test: &mut TypingTest<P, C, S>, action: KeyAction) -> Flow
where
    P: WordProvider,
    C: Clock,
    S: Scheduler,
{
    match action {
        KeyAction::Type(c) => {
            let mut buffer = test.input().to_string();
            buffer.push(c);
            test.submit_input(&buffer);
        }
        KeyAction::Backspace => {
            let mut buffer = test.input().to_string();
            if buffer.pop().is_some() {
                test.submit_input(&buffer);
            }
        }
        KeyAction::UndoWord => test.undo_last_word(),
        KeyAction::Reset => test.reset(),
        KeyAction::Escape if test.phase() == Phase::Running => test.finish(),
        KeyAction::Escape | KeyAction::Quit => return Flow::Quit,
        KeyAction::Ignore => {}
    }
    Flow::Continue
}

/// Routes one runner event into the test and runs any timers now due
pub fn handle_event<P, C, S>(test: &mut TypingTest<P, C, S>, event: &EngineEvent) -> Flow
where
    P: WordProvider,
    C: Clock,
    S: Scheduler,
{
    let flow = match event {
        EngineEvent::Key(key) => apply_action(test, KeyAction::from_key(key)),
        EngineEvent::Resize | EngineEvent::Tick => Flow::Continue,
    };
    test.pump();
    flow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::{Mode, TestConfig};
    use crate::corpus::FixedCorpus;
    use crate::timer::TimerQueue;
    use std::sync::mpsc;

    fn key(c: KeyCode) -> KeyEvent {
        KeyEvent::new(c, KeyModifiers::NONE)
    }

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        // With no events available, step should yield Tick
        let ev = runner.step();
        match ev {
            EngineEvent::Tick => {}
            _ => panic!("expected Tick on timeout"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(EngineEvent::Resize).unwrap();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        match runner.step() {
            EngineEvent::Resize => {}
            _ => panic!("expected Resize event"),
        }
    }

    #[test]
    fn key_mapping() {
        assert_eq!(KeyAction::from_key(&key(KeyCode::Char('a'))), KeyAction::Type('a'));
        assert_eq!(KeyAction::from_key(&key(KeyCode::Char(' '))), KeyAction::Type(' '));
        assert_eq!(KeyAction::from_key(&key(KeyCode::Backspace)), KeyAction::Backspace);
        assert_eq!(KeyAction::from_key(&key(KeyCode::Tab)), KeyAction::Reset);
        assert_eq!(KeyAction::from_key(&key(KeyCode::Esc)), KeyAction::Escape);
        assert_eq!(KeyAction::from_key(&key(KeyCode::Left)), KeyAction::Ignore);
        assert_eq!(
            KeyAction::from_key(&KeyEvent::new(KeyCode::Char('z'), KeyModifiers::CONTROL)),
            KeyAction::UndoWord
        );
        assert_eq!(
            KeyAction::from_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyAction::Quit
        );
    }

    #[test]
    fn actions_edit_the_input_buffer() {
        let mut test = TypingTest::new(
            TestConfig::new(Mode::Zen, "english"),
            FixedCorpus::from_prompt("ab cd"),
            ManualClock::new(),
            TimerQueue::new(),
        );

        apply_action(&mut test, KeyAction::Type('a'));
        apply_action(&mut test, KeyAction::Type('x'));
        assert_eq!(test.input(), "ax");
        apply_action(&mut test, KeyAction::Backspace);
        assert_eq!(test.input(), "a");
        apply_action(&mut test, KeyAction::Type('b'));
        apply_action(&mut test, KeyAction::Type(' '));
        assert_eq!(test.active_index(), 1);
        assert_eq!(test.input(), "");

        assert_eq!(apply_action(&mut test, KeyAction::Escape), Flow::Continue);
        assert_eq!(test.phase(), Phase::Done);
        assert_eq!(apply_action(&mut test, KeyAction::Escape), Flow::Quit);
    }

    #[test]
    fn backspace_on_empty_buffer_does_nothing() {
        let mut test = TypingTest::new(
            TestConfig::new(Mode::Timed15, "english"),
            FixedCorpus::from_prompt("ab"),
            ManualClock::new(),
            TimerQueue::new(),
        );
        apply_action(&mut test, KeyAction::Backspace);
        assert_eq!(test.phase(), Phase::Idle);
    }
}

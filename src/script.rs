//! Replay scripts: a timestamped list of inputs and control actions that
//! can be fed to a [`TypingTest`] on a manual clock, giving reproducible
//! runs without a terminal.
//!
//! ```text
//! # millis  action  [json string]
//! 0     input "h"
//! 180   input "hi"
//! 350   input "hi "
//! 900   undo
//! 5000  finish
//! ```

use std::str::FromStr;
use std::time::Duration;

use crate::clock::{Clock, ManualClock};
use crate::corpus::WordProvider;
use crate::error::{Error, Result};
use crate::timer::{Scheduler, TICK_INTERVAL};
use crate::typing_test::{Phase, TypingTest};

/// How long a replay keeps ticking after the last line before giving up
pub const DEFAULT_TAIL: Duration = Duration::from_secs(600);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Input(String),
    Undo,
    Reset,
    Finish,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub at: Duration,
    pub action: Action,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Script {
    pub steps: Vec<Step>,
}

fn parse_line(line_no: usize, line: &str) -> Result<Step> {
    let err = |message: String| Error::Script {
        line: line_no,
        message,
    };

    let (at, rest) = line
        .split_once(char::is_whitespace)
        .ok_or_else(|| err("expected `<millis> <action>`".into()))?;
    let at = at
        .parse::<u64>()
        .map_err(|e| err(format!("bad timestamp `{at}`: {e}")))?;

    let rest = rest.trim_start();
    let (name, arg) = rest
        .split_once(char::is_whitespace)
        .map_or((rest, ""), |(n, a)| (n, a.trim()));

    let action = match (name, arg) {
        ("input", arg) if !arg.is_empty() => {
            let text: String = serde_json::from_str(arg)
                .map_err(|e| err(format!("input needs a JSON string: {e}")))?;
            Action::Input(text)
        }
        ("input", _) => return Err(err("input needs a JSON string".into())),
        ("undo", "") => Action::Undo,
        ("reset", "") => Action::Reset,
        ("finish", "") => Action::Finish,
        (other, _) => return Err(err(format!("unknown action `{other}`"))),
    };

    Ok(Step {
        at: Duration::from_millis(at),
        action,
    })
}

impl FromStr for Script {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut steps: Vec<Step> = vec![];
        for (idx, raw) in s.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let step = parse_line(idx + 1, line)?;
            if let Some(prev) = steps.last() {
                if step.at < prev.at {
                    return Err(Error::Script {
                        line: idx + 1,
                        message: "timestamps must not go backwards".into(),
                    });
                }
            }
            steps.push(step);
        }
        Ok(Self { steps })
    }
}

impl Script {
    /// Replays every step at its timestamp, then lets the clock run one tick
    /// at a time for at most `tail` until the test is done.
    pub fn run<P, S>(&self, test: &mut TypingTest<P, ManualClock, S>, clock: &ManualClock, tail: Duration)
    where
        P: WordProvider,
        S: Scheduler,
    {
        let origin = clock.now();
        for step in &self.steps {
            advance_to(test, clock, origin + step.at);
            match &step.action {
                Action::Input(text) => test.submit_input(text),
                Action::Undo => test.undo_last_word(),
                Action::Reset => test.reset(),
                Action::Finish => test.finish(),
            }
            test.pump();
        }

        let deadline = clock.now() + tail;
        while test.phase() != Phase::Done && clock.now() < deadline {
            clock.advance(TICK_INTERVAL);
            test.pump();
        }
    }
}

// Moves the clock forward in tick-sized steps so every timer fires at its
// own deadline rather than all at once.
fn advance_to<P, S>(test: &mut TypingTest<P, ManualClock, S>, clock: &ManualClock, target: Duration)
where
    P: WordProvider,
    S: Scheduler,
{
    while clock.now() < target {
        let step = (target - clock.now()).min(TICK_INTERVAL);
        clock.advance(step);
        test.pump();
    }
}

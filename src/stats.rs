use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::{Mode, TestConfig};
use crate::corpus::Finger;
use crate::util::{mean, round_tenth, std_dev};

/// Characters per standard word
const CHARS_PER_WORD: f64 = 5.0;

/// Append-only tallies for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub total: u32,
    pub correct: u32,
    pub char_errors: BTreeMap<char, u32>,
    pub substitutions: BTreeMap<char, BTreeMap<char, u32>>,
    /// Instantaneous WPM, one sample per second
    pub timeline: Vec<u32>,
}

impl RunCounters {
    /// Scores one freshly typed character. `expected` is `None` when the
    /// character lands past the end of the word; that still counts towards
    /// the total but never towards the per-character tallies.
    pub fn record_keystroke(&mut self, expected: Option<char>, typed: char) -> bool {
        self.total += 1;
        match expected {
            Some(e) if e == typed => {
                self.correct += 1;
                true
            }
            Some(e) => {
                *self.char_errors.entry(e).or_insert(0) += 1;
                *self
                    .substitutions
                    .entry(e)
                    .or_default()
                    .entry(typed)
                    .or_insert(0) += 1;
                false
            }
            None => false,
        }
    }

    /// Charges a character the user skipped over when ending a word early
    pub fn record_skipped(&mut self, expected: char) {
        self.total += 1;
        *self.char_errors.entry(expected).or_insert(0) += 1;
    }

    pub fn push_sample(&mut self, wpm: u32) {
        self.timeline.push(wpm);
    }

    pub fn wrong(&self) -> u32 {
        self.total - self.correct
    }
}

fn elapsed_minutes(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() / 60.0
}

/// `chars / 5` per elapsed minute, rounded; 0 when no time has passed
pub fn words_per_minute(chars: u32, elapsed: Duration) -> u32 {
    let minutes = elapsed_minutes(elapsed);
    if minutes > 0.0 {
        (chars as f64 / CHARS_PER_WORD / minutes).round() as u32
    } else {
        0
    }
}

/// Percentage to one decimal; 100 when nothing was typed
pub fn accuracy(correct: u32, total: u32) -> f64 {
    if total > 0 {
        round_tenth(correct as f64 / total as f64 * 100.0)
    } else {
        100.0
    }
}

/// 100 minus the coefficient of variation of the timeline, clamped at 0.
/// Fewer than two samples count as no spread; an empty timeline takes
/// `fallback_mean` as its mean.
pub fn consistency(timeline: &[u32], fallback_mean: f64) -> f64 {
    let samples: Vec<f64> = timeline.iter().map(|&w| w as f64).collect();
    let spread = if samples.len() < 2 {
        0.0
    } else {
        std_dev(&samples).unwrap_or(0.0)
    };
    let avg = mean(&samples).unwrap_or(fallback_mean);

    if avg > 0.0 {
        round_tenth((100.0 - spread / avg * 100.0).max(0.0))
    } else {
        100.0
    }
}

/// Frozen outcome of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub wpm: u32,
    pub raw_wpm: u32,
    pub accuracy: f64,
    pub consistency: f64,
    pub chars_correct: u32,
    pub chars_wrong: u32,
    pub chars_total: u32,
    /// Seconds
    pub duration: u32,
    pub char_errors: BTreeMap<char, u32>,
    pub char_substitutions: BTreeMap<char, BTreeMap<char, u32>>,
    pub wpm_timeline: Vec<u32>,
    pub finger_errors: BTreeMap<Finger, u32>,
    pub mode: Mode,
    pub language: String,
}

/// Derives the final result from a frozen snapshot of the counters.
///
/// `elapsed` is the wall-clock time between the first keystroke and the
/// finish. `finger_of` receives lower-cased characters.
pub fn compute_result<F>(
    counters: &RunCounters,
    elapsed: Duration,
    config: &TestConfig,
    finger_of: F,
) -> TestResult
where
    F: Fn(char) -> Option<Finger>,
{
    let wpm = words_per_minute(counters.correct, elapsed);
    let raw_wpm = words_per_minute(counters.total, elapsed);

    let mut finger_errors = BTreeMap::new();
    for (&c, &count) in &counters.char_errors {
        let lower = c.to_lowercase().next().unwrap_or(c);
        let finger = finger_of(lower).unwrap_or(Finger::Unknown);
        *finger_errors.entry(finger).or_insert(0) += count;
    }

    let duration = config
        .duration
        .unwrap_or_else(|| elapsed.as_secs_f64().round() as u32);

    TestResult {
        wpm,
        raw_wpm,
        accuracy: accuracy(counters.correct, counters.total),
        consistency: consistency(&counters.timeline, wpm as f64),
        chars_correct: counters.correct,
        chars_wrong: counters.wrong(),
        chars_total: counters.total,
        duration,
        char_errors: counters.char_errors.clone(),
        char_substitutions: counters.substitutions.clone(),
        wpm_timeline: counters.timeline.clone(),
        finger_errors,
        mode: config.mode,
        language: config.language.clone(),
    }
}

use itertools::Itertools;
use std::fmt;

use crate::corpus::{Finger, WordProvider};
use crate::stats::TestResult;

const MAX_PROBLEM_CHARS: usize = 8;
const MAX_SUBSTITUTIONS: usize = 5;
const LOW_CONSISTENCY: f64 = 70.0;
const LOW_ACCURACY: f64 = 90.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Substitution {
    pub expected: char,
    pub typed: char,
    pub count: u32,
}

/// Relative error intensity of a key, for heatmap style displays
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeatLevel {
    None,
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Tip {
    PracticeChars(Vec<char>),
    WeakFinger { finger: Finger, keys: Vec<char> },
    Inconsistent,
    Inaccurate,
    CommonMistake(Substitution),
    NoWeakness,
}

impl fmt::Display for Tip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tip::PracticeChars(chars) => write!(
                f,
                "Practice typing: {}. These are your most error-prone characters.",
                chars.iter().map(|c| format!("\"{c}\"")).join(", ")
            ),
            Tip::WeakFinger { finger, keys } => write!(
                f,
                "{finger} is your weakest finger. Focus on these keys: {}",
                keys.iter().join(", ")
            ),
            Tip::Inconsistent => write!(
                f,
                "Your speed is inconsistent. Try to keep a steady rhythm instead of bursting fast then slowing down."
            ),
            Tip::Inaccurate => write!(
                f,
                "Accuracy is below 90%. Slow down and focus on precision; speed will follow."
            ),
            Tip::CommonMistake(s) => write!(
                f,
                "You often type \"{}\" when you mean \"{}\" ({}x). Pay extra attention there.",
                s.typed, s.expected, s.count
            ),
            Tip::NoWeakness => write!(
                f,
                "Great job! No major weakness detected. Keep practicing to build more speed."
            ),
        }
    }
}

/// Post-run breakdown of where the errors went
#[derive(Clone, Debug, PartialEq)]
pub struct Analysis {
    pub problem_chars: Vec<(char, u32)>,
    pub top_substitutions: Vec<Substitution>,
    pub weakest_finger: Option<(Finger, u32)>,
    pub tips: Vec<Tip>,
    max_errors: u32,
    errors: Vec<(char, u32)>,
}

impl Analysis {
    pub fn of<P: WordProvider + ?Sized>(result: &TestResult, provider: &P) -> Self {
        let errors: Vec<(char, u32)> = result
            .char_errors
            .iter()
            .filter(|&(_, &n)| n > 0)
            .map(|(&c, &n)| (c, n))
            .collect();

        let problem_chars: Vec<(char, u32)> = errors
            .iter()
            .copied()
            .sorted_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)))
            .take(MAX_PROBLEM_CHARS)
            .collect();

        let top_substitutions: Vec<Substitution> = result
            .char_substitutions
            .iter()
            .flat_map(|(&expected, typed_map)| {
                typed_map.iter().map(move |(&typed, &count)| Substitution {
                    expected,
                    typed,
                    count,
                })
            })
            .sorted_by(|a, b| b.count.cmp(&a.count))
            .take(MAX_SUBSTITUTIONS)
            .collect();

        let weakest_finger = result
            .finger_errors
            .iter()
            .filter(|&(&f, &n)| n > 0 && f != Finger::Unknown)
            .map(|(&f, &n)| (f, n))
            .sorted_by(|a, b| b.1.cmp(&a.1))
            .next();

        let mut tips = vec![];
        if !problem_chars.is_empty() {
            tips.push(Tip::PracticeChars(
                problem_chars.iter().take(3).map(|(c, _)| *c).collect(),
            ));
        }
        if let Some((finger, _)) = weakest_finger {
            let keys = provider
                .keys_for(finger)
                .into_iter()
                .filter(|k| *k != ' ')
                .collect();
            tips.push(Tip::WeakFinger { finger, keys });
        }
        if result.consistency < LOW_CONSISTENCY {
            tips.push(Tip::Inconsistent);
        }
        if result.accuracy < LOW_ACCURACY {
            tips.push(Tip::Inaccurate);
        }
        if let Some(s) = top_substitutions.first() {
            tips.push(Tip::CommonMistake(*s));
        }
        if tips.is_empty() {
            tips.push(Tip::NoWeakness);
        }

        let max_errors = errors.iter().map(|(_, n)| *n).max().unwrap_or(0);

        Self {
            problem_chars,
            top_substitutions,
            weakest_finger,
            tips,
            max_errors,
            errors,
        }
    }

    pub fn heat_level(&self, c: char) -> HeatLevel {
        let errors = self
            .errors
            .iter()
            .find(|(k, _)| *k == c)
            .map_or(0, |(_, n)| *n);
        if errors == 0 {
            return HeatLevel::None;
        }

        let intensity = errors as f64 / self.max_errors.max(1) as f64;
        if intensity < 0.33 {
            HeatLevel::Low
        } else if intensity < 0.66 {
            HeatLevel::Medium
        } else {
            HeatLevel::High
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Mode, TestConfig};
    use crate::corpus::{qwerty_finger, FixedCorpus};
    use crate::stats::{compute_result, RunCounters};
    use std::time::Duration;

    fn result_from(counters: &RunCounters) -> TestResult {
        compute_result(
            counters,
            Duration::from_secs(30),
            &TestConfig::new(Mode::Timed30, "english"),
            qwerty_finger,
        )
    }

    fn sloppy_counters() -> RunCounters {
        let mut c = RunCounters::default();
        for _ in 0..10 {
            c.record_keystroke(Some('a'), 'a');
        }
        for _ in 0..6 {
            c.record_keystroke(Some('e'), 'r');
        }
        for _ in 0..2 {
            c.record_keystroke(Some('i'), 'o');
        }
        c.record_keystroke(Some('i'), 'u');
        c.record_skipped('t');
        c.timeline = vec![20, 80, 20, 80];
        c
    }

    #[test]
    fn clean_run_has_no_weakness() {
        let mut c = RunCounters::default();
        for ch in "steady".chars() {
            c.record_keystroke(Some(ch), ch);
        }
        c.timeline = vec![50, 50];
        let analysis = Analysis::of(&result_from(&c), &FixedCorpus::default());

        assert!(analysis.problem_chars.is_empty());
        assert!(analysis.top_substitutions.is_empty());
        assert_eq!(analysis.weakest_finger, None);
        assert_eq!(analysis.tips, vec![Tip::NoWeakness]);
    }

    #[test]
    fn unmapped_chars_never_make_the_weakest_finger() {
        let mut c = RunCounters::default();
        for _ in 0..4 {
            c.record_keystroke(Some('é'), 'e');
        }
        c.record_keystroke(Some('k'), 'j');
        c.timeline = vec![40, 40];
        let result = result_from(&c);
        assert_eq!(result.finger_errors.get(&Finger::Unknown), Some(&4));

        let analysis = Analysis::of(&result, &FixedCorpus::default());
        assert_eq!(analysis.weakest_finger, Some((Finger::RightMiddle, 1)));
        assert!(!analysis
            .tips
            .iter()
            .any(|tip| matches!(tip, Tip::WeakFinger { finger: Finger::Unknown, .. })));
    }

    #[test]
    fn only_unmapped_errors_give_no_finger_tip() {
        let mut c = RunCounters::default();
        c.record_keystroke(Some('é'), 'e');
        c.timeline = vec![40, 40];
        let analysis = Analysis::of(&result_from(&c), &FixedCorpus::default());

        assert_eq!(analysis.weakest_finger, None);
        assert!(!analysis
            .tips
            .iter()
            .any(|tip| matches!(tip, Tip::WeakFinger { .. })));
    }

    #[test]
    fn problem_chars_sorted_by_count() {
        let analysis = Analysis::of(&result_from(&sloppy_counters()), &FixedCorpus::default());
        assert_eq!(analysis.problem_chars, vec![('e', 6), ('i', 3), ('t', 1)]);
    }

    #[test]
    fn substitutions_flattened_and_ranked() {
        let analysis = Analysis::of(&result_from(&sloppy_counters()), &FixedCorpus::default());
        assert_eq!(
            analysis.top_substitutions,
            vec![
                Substitution { expected: 'e', typed: 'r', count: 6 },
                Substitution { expected: 'i', typed: 'o', count: 2 },
                Substitution { expected: 'i', typed: 'u', count: 1 },
            ]
        );
    }

    #[test]
    fn tips_in_priority_order() {
        let analysis = Analysis::of(&result_from(&sloppy_counters()), &FixedCorpus::default());

        assert_eq!(analysis.weakest_finger, Some((Finger::LeftMiddle, 6)));
        assert_eq!(
            analysis.tips,
            vec![
                Tip::PracticeChars(vec!['e', 'i', 't']),
                Tip::WeakFinger {
                    finger: Finger::LeftMiddle,
                    keys: vec!['3', 'e', 'd', 'c'],
                },
                Tip::Inconsistent,
                Tip::Inaccurate,
                Tip::CommonMistake(Substitution { expected: 'e', typed: 'r', count: 6 }),
            ]
        );
        assert_eq!(
            analysis.tips[4].to_string(),
            "You often type \"r\" when you mean \"e\" (6x). Pay extra attention there."
        );
    }

    #[test]
    fn heat_levels_relative_to_worst_key() {
        let analysis = Analysis::of(&result_from(&sloppy_counters()), &FixedCorpus::default());
        assert_eq!(analysis.heat_level('e'), HeatLevel::High);
        assert_eq!(analysis.heat_level('i'), HeatLevel::Medium);
        assert_eq!(analysis.heat_level('t'), HeatLevel::Low);
        assert_eq!(analysis.heat_level('a'), HeatLevel::None);
    }
}

pub mod embedded;

pub use embedded::{languages, EmbeddedCorpus, WordList};

use serde::{Deserialize, Serialize};

/// Finger conventionally used to press a key in touch typing
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum Finger {
    #[strum(serialize = "Left pinky")]
    LeftPinky,
    #[strum(serialize = "Left ring")]
    LeftRing,
    #[strum(serialize = "Left middle")]
    LeftMiddle,
    #[strum(serialize = "Left index")]
    LeftIndex,
    #[strum(serialize = "Right index")]
    RightIndex,
    #[strum(serialize = "Right middle")]
    RightMiddle,
    #[strum(serialize = "Right ring")]
    RightRing,
    #[strum(serialize = "Right pinky")]
    RightPinky,
    #[strum(serialize = "Thumb")]
    Thumb,
    /// Bucket for characters with no known finger
    #[strum(serialize = "Unknown")]
    Unknown,
}

use Finger::*;

const QWERTY: &[(char, Finger)] = &[
    ('`', LeftPinky),
    ('1', LeftPinky),
    ('q', LeftPinky),
    ('a', LeftPinky),
    ('z', LeftPinky),
    ('2', LeftRing),
    ('w', LeftRing),
    ('s', LeftRing),
    ('x', LeftRing),
    ('3', LeftMiddle),
    ('e', LeftMiddle),
    ('d', LeftMiddle),
    ('c', LeftMiddle),
    ('4', LeftIndex),
    ('5', LeftIndex),
    ('r', LeftIndex),
    ('t', LeftIndex),
    ('f', LeftIndex),
    ('g', LeftIndex),
    ('v', LeftIndex),
    ('b', LeftIndex),
    ('6', RightIndex),
    ('7', RightIndex),
    ('y', RightIndex),
    ('u', RightIndex),
    ('h', RightIndex),
    ('j', RightIndex),
    ('n', RightIndex),
    ('m', RightIndex),
    ('8', RightMiddle),
    ('i', RightMiddle),
    ('k', RightMiddle),
    (',', RightMiddle),
    ('9', RightRing),
    ('o', RightRing),
    ('l', RightRing),
    ('.', RightRing),
    ('0', RightPinky),
    ('-', RightPinky),
    ('=', RightPinky),
    ('p', RightPinky),
    ('[', RightPinky),
    (']', RightPinky),
    ('\\', RightPinky),
    (';', RightPinky),
    ('\'', RightPinky),
    ('/', RightPinky),
    (' ', Thumb),
];

// shifted symbol -> key it lives on
const SHIFTED: &[(char, char)] = &[
    ('~', '`'),
    ('!', '1'),
    ('@', '2'),
    ('#', '3'),
    ('$', '4'),
    ('%', '5'),
    ('^', '6'),
    ('&', '7'),
    ('*', '8'),
    ('(', '9'),
    (')', '0'),
    ('_', '-'),
    ('+', '='),
    ('{', '['),
    ('}', ']'),
    ('|', '\\'),
    (':', ';'),
    ('"', '\''),
    ('<', ','),
    ('>', '.'),
    ('?', '/'),
];

/// QWERTY touch-typing finger for a character, case-insensitive
pub fn qwerty_finger(c: char) -> Option<Finger> {
    let lower = c.to_lowercase().next().unwrap_or(c);
    let key = SHIFTED
        .iter()
        .find(|(shifted, _)| *shifted == lower)
        .map_or(lower, |(_, base)| *base);

    QWERTY
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, finger)| *finger)
}

/// Unshifted keys assigned to `finger` on QWERTY
pub fn qwerty_keys(finger: Finger) -> Vec<char> {
    QWERTY
        .iter()
        .filter(|(_, f)| *f == finger)
        .map(|(k, _)| *k)
        .collect()
}

/// Source of test words and of the finger map. Implementations are
/// stateless from the engine's point of view.
pub trait WordProvider {
    /// `count` words for `language`, in display order
    fn words(&self, language: &str, count: usize) -> Vec<String>;

    fn finger_of(&self, c: char) -> Option<Finger> {
        qwerty_finger(c)
    }

    fn keys_for(&self, finger: Finger) -> Vec<char> {
        qwerty_keys(finger)
    }
}

impl<T: WordProvider + ?Sized> WordProvider for Box<T> {
    fn words(&self, language: &str, count: usize) -> Vec<String> {
        (**self).words(language, count)
    }

    fn finger_of(&self, c: char) -> Option<Finger> {
        (**self).finger_of(c)
    }

    fn keys_for(&self, finger: Finger) -> Vec<char> {
        (**self).keys_for(finger)
    }
}

/// Always returns the same words, ignoring the language
#[derive(Debug, Clone, Default)]
pub struct FixedCorpus {
    words: Vec<String>,
}

impl FixedCorpus {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Splits a prompt on whitespace
    pub fn from_prompt(prompt: &str) -> Self {
        Self::new(prompt.split_whitespace())
    }
}

impl WordProvider for FixedCorpus {
    fn words(&self, _language: &str, count: usize) -> Vec<String> {
        self.words.iter().take(count).cloned().collect()
    }
}

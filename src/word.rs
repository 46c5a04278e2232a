use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CharStatus {
    Untyped,
    Correct,
    Wrong,
    /// Typed past the end of the word
    Extra,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CharSlot {
    pub char: char,
    pub status: CharStatus,
}

impl CharSlot {
    fn untyped(c: char) -> Self {
        Self {
            char: c,
            status: CharStatus::Untyped,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    Untyped,
    Active,
    Correct,
    Wrong,
}

/// A word of the test together with its display state.
///
/// `chars` always has one slot per character of `word`. Overtyped characters
/// live in `extras` and never count towards the word's length.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WordState {
    pub word: String,
    pub chars: Vec<CharSlot>,
    pub extras: Vec<CharSlot>,
    pub status: WordStatus,
}

impl WordState {
    pub fn new(word: impl Into<String>) -> Self {
        let word = word.into();
        let chars = word.chars().map(CharSlot::untyped).collect();
        Self {
            word,
            chars,
            extras: vec![],
            status: WordStatus::Untyped,
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn expected_char(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).map(|slot| slot.char)
    }

    /// Drops all typed state, leaving `status` alone
    pub fn clear(&mut self) {
        for slot in &mut self.chars {
            slot.status = CharStatus::Untyped;
        }
        self.extras.clear();
    }

    /// Re-derives every slot from the in-progress input by position.
    pub fn render_input(&mut self, input: &str) {
        let mut typed = input.chars();
        for slot in &mut self.chars {
            slot.status = match typed.next() {
                Some(c) if c == slot.char => CharStatus::Correct,
                Some(_) => CharStatus::Wrong,
                None => CharStatus::Untyped,
            };
        }
        self.extras = typed
            .map(|c| CharSlot {
                char: c,
                status: CharStatus::Extra,
            })
            .collect();
    }

    /// Settles the word against the typed text (separator already trimmed).
    ///
    /// Positions the user never reached are marked wrong and returned so the
    /// caller can charge them as errors.
    pub fn finalize(&mut self, typed: &str) -> Vec<char> {
        let mut typed_chars = typed.chars();
        let mut skipped = vec![];
        for slot in &mut self.chars {
            slot.status = match typed_chars.next() {
                Some(c) if c == slot.char => CharStatus::Correct,
                Some(_) => CharStatus::Wrong,
                None => {
                    skipped.push(slot.char);
                    CharStatus::Wrong
                }
            };
        }
        self.extras = typed_chars
            .map(|c| CharSlot {
                char: c,
                status: CharStatus::Extra,
            })
            .collect();

        self.status = if typed == self.word {
            WordStatus::Correct
        } else {
            WordStatus::Wrong
        };

        skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statuses(w: &WordState) -> Vec<CharStatus> {
        w.chars.iter().map(|s| s.status).collect()
    }

    #[test]
    fn new_word_is_untyped() {
        let w = WordState::new("cat");
        assert_eq!(w.len(), 3);
        assert_eq!(w.status, WordStatus::Untyped);
        assert!(w.chars.iter().all(|s| s.status == CharStatus::Untyped));
        assert_eq!(w.expected_char(1), Some('a'));
        assert_eq!(w.expected_char(3), None);
    }

    #[test]
    fn render_input_compares_by_position() {
        let mut w = WordState::new("cat");
        w.render_input("cx");
        assert_eq!(
            statuses(&w),
            vec![CharStatus::Correct, CharStatus::Wrong, CharStatus::Untyped]
        );
        assert!(w.extras.is_empty());
    }

    #[test]
    fn render_input_shows_overtyped_chars_as_extra() {
        let mut w = WordState::new("cat");
        w.render_input("catss");
        assert_eq!(w.len(), 3);
        assert_eq!(w.extras.len(), 2);
        assert!(w.extras.iter().all(|s| s.status == CharStatus::Extra));
    }

    #[test]
    fn finalize_exact_word_is_correct() {
        let mut w = WordState::new("hello");
        let skipped = w.finalize("hello");
        assert!(skipped.is_empty());
        assert_eq!(w.status, WordStatus::Correct);
        assert!(w.chars.iter().all(|s| s.status == CharStatus::Correct));
    }

    #[test]
    fn finalize_short_word_reports_skipped_chars() {
        let mut w = WordState::new("hello");
        let skipped = w.finalize("he");
        assert_eq!(skipped, vec!['l', 'l', 'o']);
        assert_eq!(w.status, WordStatus::Wrong);
        assert_eq!(
            statuses(&w),
            vec![
                CharStatus::Correct,
                CharStatus::Correct,
                CharStatus::Wrong,
                CharStatus::Wrong,
                CharStatus::Wrong
            ]
        );
    }

    #[test]
    fn finalize_overtyped_word_is_wrong() {
        let mut w = WordState::new("cat");
        let skipped = w.finalize("cats");
        assert!(skipped.is_empty());
        assert_eq!(w.status, WordStatus::Wrong);
        assert!(w.chars.iter().all(|s| s.status == CharStatus::Correct));
        assert_eq!(w.extras.len(), 1);
    }

    #[test]
    fn clear_resets_slots() {
        let mut w = WordState::new("cat");
        w.render_input("cxtt");
        w.clear();
        assert!(w.chars.iter().all(|s| s.status == CharStatus::Untyped));
        assert!(w.extras.is_empty());
    }
}

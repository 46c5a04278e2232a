use include_dir::{include_dir, Dir};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Deserialize;
use serde_json::from_str;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::warn;

use super::WordProvider;
use crate::error::{Error, Result};

static LANG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lang");

#[derive(Deserialize, Clone, Debug)]
pub struct WordList {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl WordList {
    pub fn load(language: &str) -> Result<Self> {
        let file = LANG_DIR
            .get_file(format!("{language}.json"))
            .ok_or_else(|| Error::UnknownLanguage(language.to_string()))?;

        let contents = file
            .contents_utf8()
            .ok_or_else(|| Error::UnknownLanguage(language.to_string()))?;

        Ok(from_str(contents)?)
    }
}

/// Names of the bundled word lists
pub fn languages() -> Vec<String> {
    let mut names: Vec<String> = LANG_DIR
        .files()
        .filter(|f| f.path().extension().is_some_and(|ext| ext == "json"))
        .filter_map(|f| f.path().file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Word lists compiled into the binary, parsed once up front and sampled
/// uniformly with replacement
#[derive(Debug)]
pub struct EmbeddedCorpus {
    lists: BTreeMap<String, Vec<String>>,
    rng: Mutex<StdRng>,
}

impl EmbeddedCorpus {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let lists = languages()
            .into_iter()
            .filter_map(|language| match WordList::load(&language) {
                Ok(list) => Some((language, list.words)),
                Err(e) => {
                    warn!(language, error = %e, "skipping word list");
                    None
                }
            })
            .collect();

        Self {
            lists,
            rng: Mutex::new(rng),
        }
    }

    /// Languages whose word lists parsed
    pub fn loaded(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }
}

impl Default for EmbeddedCorpus {
    fn default() -> Self {
        Self::new()
    }
}

impl WordProvider for EmbeddedCorpus {
    fn words(&self, language: &str, count: usize) -> Vec<String> {
        let Some(words) = self.lists.get(language) else {
            warn!(language, "no words available");
            return vec![];
        };

        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        (0..count)
            .filter_map(|_| words.choose(&mut *rng).cloned())
            .collect()
    }
}

//! Seed phrase captured during backup

use std::fmt;

use crate::error::{E2eError, E2eResult};

pub const SEED_PHRASE_WORDS: usize = 12;

/// An ordered backup phrase of exactly twelve words
#[derive(Clone, PartialEq, Eq)]
pub struct SeedPhrase {
    words: Vec<String>,
}

impl SeedPhrase {
    pub fn parse(text: &str) -> E2eResult<Self> {
        let words: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        if words.len() != SEED_PHRASE_WORDS {
            return Err(E2eError::AssertionFailed(format!(
                "seed phrase should have {} words, found {}",
                SEED_PHRASE_WORDS,
                words.len()
            )));
        }
        Ok(Self { words })
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

impl fmt::Display for SeedPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.words.join(" "))
    }
}

impl fmt::Debug for SeedPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SeedPhrase({} words)", self.words.len())
    }
}

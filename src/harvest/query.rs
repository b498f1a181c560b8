//! Search term generation
//!
//! Each call is independent: nothing is remembered between calls, so a term
//! may repeat.

use crate::config::{FetchConfig, QueryPolicy};
use rand::seq::SliceRandom;
use rand::Rng;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Produces search terms for the volumes endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryGenerator {
    /// A uniformly random lowercase letter
    RandomLetter,
    /// A uniformly random pick from a fixed topic list
    Topics(Vec<String>),
}

impl QueryGenerator {
    /// Builds the generator selected by `fetch.query-policy`
    pub fn from_config(config: &FetchConfig) -> Self {
        match config.query_policy {
            QueryPolicy::RandomLetter => Self::RandomLetter,
            QueryPolicy::Topics => Self::Topics(config.topics.clone()),
        }
    }

    /// Returns the next search term using the thread-local RNG
    pub fn next_query(&self) -> String {
        self.next_query_with(&mut rand::thread_rng())
    }

    /// Returns the next search term using the supplied RNG
    ///
    /// An empty topic list falls back to a random letter.
    pub fn next_query_with<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match self {
            Self::Topics(topics) => match topics.choose(rng) {
                Some(topic) => topic.clone(),
                None => random_letter(rng),
            },
            Self::RandomLetter => random_letter(rng),
        }
    }
}

fn random_letter<R: Rng + ?Sized>(rng: &mut R) -> String {
    let index = rng.gen_range(0..LETTERS.len());
    char::from(LETTERS[index]).to_string()
}

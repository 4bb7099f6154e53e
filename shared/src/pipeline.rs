//! Progress of the remote call behind a screen.
//!
//! Every invocation gets a generation number. `start` emits `Loading`;
//! `complete` emits the one terminal state for that generation. Answers for
//! an older generation, and a second answer for the current one, are
//! dropped, so the screen only ever renders the newest invocation.

use std::fmt::Display;

use tracing::debug;

use crate::model::{Recipe, RecipeDetails};
use crate::progress::ProgressState;

pub type DetailFetchPipeline = FetchPipeline<RecipeDetails>;
pub type SearchPipeline = FetchPipeline<Vec<Recipe>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchPipeline<T> {
    generation: u64,
    state: ProgressState<T>,
}

impl<T> Default for FetchPipeline<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            state: ProgressState::Idle,
        }
    }
}

impl<T> FetchPipeline<T> {
    /// Begins a fresh invocation and returns its generation.
    pub fn start(&mut self) -> u64 {
        self.generation += 1;
        self.state = ProgressState::Loading;
        self.generation
    }

    /// Applies the answer for `generation`. Returns whether it was rendered.
    pub fn complete<E: Display>(&mut self, generation: u64, result: Result<T, E>) -> bool {
        if generation != self.generation {
            debug!(generation, latest = self.generation, "discarding stale answer");
            return false;
        }
        if !self.state.is_loading() {
            debug!(generation, "invocation already settled");
            return false;
        }
        self.state = result.into();
        true
    }

    pub fn state(&self) -> &ProgressState<T> {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

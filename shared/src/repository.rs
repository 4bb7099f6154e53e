//! Single entry point the screens use for recipe data.
//!
//! Remote answers come back as `Result<_, RepositoryError>` with every
//! failure mode (transport, empty result, malformed payload) normalized into
//! one error carrying a human-readable message. Favorites mutations pass
//! straight through to the favorites capability; the store's feed reports
//! the outcome.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{decode_envelope, Envelope, MealDbApi, MealsResponse};
use crate::capabilities::Capabilities;
use crate::event::Event;
use crate::model::{MappingError, Recipe, RecipeDetails, RecipeDetailsResponse, RecipeId, RecipeResponse};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Connection failure, timeout or non-2xx status.
    Transport,
    /// The service answered but had nothing for the query.
    EmptyResult,
    /// Malformed payload, or a request that could not be built.
    Unexpected,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RepositoryError {
    pub kind: FailureKind,
    /// Shown to the user; never empty.
    pub message: String,
    /// Underlying cause, for logs only.
    pub detail: Option<String>,
}

impl RepositoryError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "Error occurred".to_string()
        } else {
            message
        };
        Self {
            kind,
            message,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn empty_result(message: impl Into<String>) -> Self {
        Self::new(FailureKind::EmptyResult, message)
    }

    fn unexpected_response(detail: impl Into<String>) -> Self {
        Self::new(
            FailureKind::Unexpected,
            "Received an unexpected response from the recipe service",
        )
        .with_detail(detail)
    }

    fn status(status: u16) -> Self {
        let message = if status >= 500 {
            "The recipe service is unavailable"
        } else {
            "The recipe service rejected the request"
        };
        Self::new(FailureKind::Transport, message).with_detail(format!("HTTP {status}"))
    }
}

impl From<MappingError> for RepositoryError {
    fn from(e: MappingError) -> Self {
        Self::new(FailureKind::Unexpected, "Received an incomplete recipe").with_detail(e.to_string())
    }
}

/// A request URL that could not be built never reaches the network.
impl From<url::ParseError> for RepositoryError {
    fn from(e: url::ParseError) -> Self {
        Self::new(FailureKind::Unexpected, "Could not build the recipe request").with_detail(e.to_string())
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(e: serde_json::Error) -> Self {
        Self::unexpected_response(e.to_string())
    }
}

/// Facade over the remote client and the favorites capability, borrowed for
/// one `update` call. Remote answers arrive later as response events tagged
/// with `generation`.
pub struct RecipeRepository<'a> {
    api: &'a MealDbApi,
    caps: &'a Capabilities,
}

impl<'a> RecipeRepository<'a> {
    pub fn new(api: &'a MealDbApi, caps: &'a Capabilities) -> Self {
        Self { api, caps }
    }

    pub fn search(&self, query: &str, generation: u64) -> Result<(), RepositoryError> {
        self.api.search(&self.caps.http, query, move |result| Event::SearchResponse {
            generation,
            result: Box::new(result),
        })?;
        Ok(())
    }

    pub fn get_details(&self, id: &RecipeId, generation: u64) -> Result<(), RepositoryError> {
        self.api.lookup(&self.caps.http, id, move |result| Event::DetailsResponse {
            generation,
            result: Box::new(result),
        })?;
        Ok(())
    }

    pub fn insert(&self, recipe: Recipe) {
        debug!(recipe_id = %recipe.id, "requesting favorite insert");
        self.caps.favorites.insert(recipe);
    }

    pub fn delete(&self, recipe: Recipe) {
        debug!(recipe_id = %recipe.id, "requesting favorite delete");
        self.caps.favorites.delete(recipe);
    }
}

/// Recipes matching `query`, in server order. An empty list is a valid
/// answer; a missing or null `meals` is not.
pub fn search_result(response: MealsResponse, query: &str) -> Result<Vec<Recipe>, RepositoryError> {
    let result = body_of(response).and_then(|body| recipes_from_body(&body, query));
    if let Err(e) = &result {
        warn!(kind = ?e.kind, detail = ?e.detail, "Recipe search failed: {}", e);
    }
    result
}

/// The first recipe of the lookup result set.
pub fn details_result(response: MealsResponse) -> Result<RecipeDetails, RepositoryError> {
    let result = body_of(response).and_then(|body| details_from_body(&body));
    if let Err(e) = &result {
        warn!(kind = ?e.kind, detail = ?e.detail, "Recipe lookup failed: {}", e);
    }
    result
}

fn body_of(response: MealsResponse) -> Result<Vec<u8>, RepositoryError> {
    let mut response = response.map_err(|e| {
        RepositoryError::new(FailureKind::Transport, "Unable to reach the recipe service")
            .with_detail(e.to_string())
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(RepositoryError::status(u16::from(status)));
    }
    Ok(response.take_body().unwrap_or_default())
}

pub(crate) fn recipes_from_body(body: &[u8], query: &str) -> Result<Vec<Recipe>, RepositoryError> {
    let envelope: Envelope<RecipeResponse> = decode_envelope(body)?;
    let meals = envelope
        .and_then(|envelope| envelope.meals)
        .ok_or_else(|| RepositoryError::empty_result(format!("No recipes found for \"{query}\"")))?;

    let recipes = meals
        .into_iter()
        .map(Recipe::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = recipes.len(), "search completed");
    Ok(recipes)
}

pub(crate) fn details_from_body(body: &[u8]) -> Result<RecipeDetails, RepositoryError> {
    let envelope: Envelope<RecipeDetailsResponse> = decode_envelope(body)?;
    let first = envelope
        .and_then(|envelope| envelope.meals)
        .and_then(|meals| meals.into_iter().next())
        .ok_or_else(|| RepositoryError::empty_result("Recipe not found"))?;

    Ok(RecipeDetails::try_from(first)?)
}

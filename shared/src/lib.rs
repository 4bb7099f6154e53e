#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod api;
pub mod app;
pub mod capabilities;
pub mod config;
pub mod event;
pub mod favorites;
pub mod favorites_store;
pub mod host;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod repository;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::favorites_store::StoreError;
use crate::model::VideoError;
use crate::repository::FailureKind;

pub use app::{App, Model, Screen, ViewModel};
pub use capabilities::{Capabilities, Effect};
pub use config::RecipeConfig;
pub use event::{DetailsEvent, Event, FavoritesEvent, RecipeListEvent};
pub use favorites::{FavoritesViewState, SortOrder};
pub use host::RecipeCore;
pub use model::{Ingredient, Recipe, RecipeDetails, RecipeId, VideoReference};
pub use pipeline::{DetailFetchPipeline, FetchPipeline, SearchPipeline};
pub use progress::ProgressState;
pub use repository::{RecipeRepository, RepositoryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Validation,
    NotFound,
    Storage,
    Deserialization,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Storage => "STORAGE_ERROR",
            Self::Deserialization => "DESERIALIZATION_ERROR",
        }
    }

    /// Whether offering the user a "try again" makes sense.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Storage)
    }
}

#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[error("[{}] {message}", .kind.code())]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub internal_message: Option<String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            internal_message: None,
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Network => {
                "Unable to connect. Please check your internet connection and try again.".into()
            }
            ErrorKind::Validation | ErrorKind::NotFound => self.message.clone(),
            ErrorKind::Storage => "Unable to update your favorites. Please try again.".into(),
            ErrorKind::Deserialization => {
                "The recipe service sent data we couldn't read. Please try again later.".into()
            }
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        let kind = match e.kind {
            FailureKind::Transport => ErrorKind::Network,
            FailureKind::EmptyResult => ErrorKind::NotFound,
            FailureKind::Unexpected => ErrorKind::Deserialization,
        };
        let error = Self::new(kind, e.message);
        match e.detail {
            Some(detail) => error.with_internal(detail),
            None => error,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        Self::new(ErrorKind::Storage, "Favorites storage failed").with_internal(e.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        Self::new(ErrorKind::Validation, e.to_string())
    }
}

impl From<VideoError> for AppError {
    fn from(e: VideoError) -> Self {
        Self::new(ErrorKind::Validation, "This recipe has no playable video").with_internal(e.to_string())
    }
}

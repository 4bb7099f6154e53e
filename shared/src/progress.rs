use serde::{Deserialize, Serialize};

/// Progress of one asynchronous operation as seen by a screen.
///
/// Starts `Idle`; every new invocation moves it to `Loading`, and each
/// invocation ends in exactly one of `Success` or `Error`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum ProgressState<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> Default for ProgressState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> ProgressState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Error(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for ProgressState<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(e) => Self::Error(e.to_string()),
        }
    }
}

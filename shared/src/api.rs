//! Client for the TheMealDB lookup service.
//!
//! Two read-only queries: search by name and lookup by id, issued through
//! the HTTP capability. The client only builds requests and decodes
//! envelopes; mapping to domain types and failure normalization belong to
//! the repository.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::capabilities::Http;
use crate::config::{ConfigError, RecipeConfig, DEFAULT_BASE_URL};
use crate::model::{MealsEnvelope, RecipeId};

pub const SEARCH_PATH: &str = "api/json/v1/1/search.php";
pub const LOOKUP_PATH: &str = "api/json/v1/1/lookup.php";

/// What the HTTP capability hands back for one query.
pub type MealsResponse = crux_http::Result<crux_http::Response<Vec<u8>>>;

/// `None` means the body was empty or a literal `null`.
pub type Envelope<T> = Option<MealsEnvelope<T>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MealDbApi {
    base_url: String,
}

impl Default for MealDbApi {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl MealDbApi {
    pub fn new(config: &RecipeConfig) -> Result<Self, ConfigError> {
        let base_url = config.parsed_base_url()?;
        Ok(Self {
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn search_url(&self, name: &str) -> Result<Url, url::ParseError> {
        self.endpoint(SEARCH_PATH, "s", name)
    }

    pub fn lookup_url(&self, id: &RecipeId) -> Result<Url, url::ParseError> {
        self.endpoint(LOOKUP_PATH, "i", id.as_str())
    }

    fn endpoint(&self, path: &str, param: &str, value: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.base_url)?.join(path)?;
        url.query_pairs_mut().append_pair(param, value);
        Ok(url)
    }

    pub fn search<Ev, F>(&self, http: &Http<Ev>, name: &str, make_event: F) -> Result<(), url::ParseError>
    where
        Ev: Send + 'static,
        F: FnOnce(MealsResponse) -> Ev + Send + 'static,
    {
        let url = self.search_url(name)?;
        debug!(%url, "searching recipes");
        http.get(url.as_str()).send(make_event);
        Ok(())
    }

    pub fn lookup<Ev, F>(&self, http: &Http<Ev>, id: &RecipeId, make_event: F) -> Result<(), url::ParseError>
    where
        Ev: Send + 'static,
        F: FnOnce(MealsResponse) -> Ev + Send + 'static,
    {
        let url = self.lookup_url(id)?;
        debug!(%url, "looking up recipe");
        http.get(url.as_str()).send(make_event);
        Ok(())
    }
}

/// Decodes a `{ "meals": ... }` body. Whitespace-only and `null` bodies
/// carry no envelope.
pub fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<Envelope<T>, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
}

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const MAX_INGREDIENTS: usize = 20;

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

typed_id!(RecipeId);

/// A recipe as listed by search and as persisted in favorites.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Recipe {
    pub id: RecipeId,
    pub area: String,
    pub name: String,
    pub thumbnail_url: String,
    pub category: String,
    /// Comma-joined, as served by the API.
    pub tags: String,
    pub video_url: String,
    pub instructions: String,
}

impl Recipe {
    pub fn tag_list(&self) -> Vec<&str> {
        split_tags(&self.tags)
    }

    pub fn video(&self) -> Option<VideoReference> {
        VideoReference::parse(&self.video_url).ok()
    }

    /// Length used by the "fewest instructions" projection, in UTF-16 code
    /// units, so "😀" counts 2.
    pub fn instructions_len(&self) -> usize {
        self.instructions.encode_utf16().count()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Ingredient {
    pub name: String,
    pub measure: String,
}

/// Full lookup result. Every `Recipe` field is present, so `to_recipe`
/// loses nothing `Recipe` can hold.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RecipeDetails {
    pub id: RecipeId,
    pub area: String,
    pub name: String,
    pub thumbnail_url: String,
    pub category: String,
    pub tags: String,
    pub video_url: String,
    pub instructions: String,
    pub source_url: String,
    pub ingredients: Vec<Ingredient>,
}

impl RecipeDetails {
    pub fn to_recipe(&self) -> Recipe {
        Recipe {
            id: self.id.clone(),
            area: self.area.clone(),
            name: self.name.clone(),
            thumbnail_url: self.thumbnail_url.clone(),
            category: self.category.clone(),
            tags: self.tags.clone(),
            video_url: self.video_url.clone(),
            instructions: self.instructions.clone(),
        }
    }

    pub fn tag_list(&self) -> Vec<&str> {
        split_tags(&self.tags)
    }

    pub fn video(&self) -> Option<VideoReference> {
        VideoReference::parse(&self.video_url).ok()
    }
}

impl From<&RecipeDetails> for Recipe {
    fn from(details: &RecipeDetails) -> Self {
        details.to_recipe()
    }
}

fn split_tags(tags: &str) -> Vec<&str> {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

// --- Wire format ---

/// `{ "meals": [...] | null }`
#[derive(Deserialize, Debug, Clone)]
pub struct MealsEnvelope<T> {
    #[serde(default = "Option::default")]
    pub meals: Option<Vec<T>>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("recipe payload is missing required field `{field}`")]
pub struct MappingError {
    pub field: &'static str,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RecipeResponse {
    #[serde(rename = "idMeal")]
    pub id_meal: Option<String>,
    #[serde(rename = "strArea")]
    pub str_area: Option<String>,
    #[serde(rename = "strMeal")]
    pub str_meal: Option<String>,
    #[serde(rename = "strMealThumb")]
    pub str_meal_thumb: Option<String>,
    #[serde(rename = "strCategory")]
    pub str_category: Option<String>,
    #[serde(rename = "strTags")]
    pub str_tags: Option<String>,
    #[serde(rename = "strYoutube")]
    pub str_youtube: Option<String>,
    #[serde(rename = "strInstructions")]
    pub str_instructions: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RecipeDetailsResponse {
    #[serde(flatten)]
    pub recipe: RecipeResponse,
    #[serde(rename = "strSource")]
    pub str_source: Option<String>,
    /// `strIngredientN` / `strMeasureN` and anything else the API adds.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, MappingError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(MappingError { field })
}

impl TryFrom<RecipeResponse> for Recipe {
    type Error = MappingError;

    fn try_from(response: RecipeResponse) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RecipeId(required(response.id_meal, "idMeal")?),
            name: required(response.str_meal, "strMeal")?,
            area: response.str_area.unwrap_or_default(),
            thumbnail_url: response.str_meal_thumb.unwrap_or_default(),
            category: response.str_category.unwrap_or_default(),
            tags: response.str_tags.unwrap_or_default(),
            video_url: response.str_youtube.unwrap_or_default(),
            instructions: response.str_instructions.unwrap_or_default(),
        })
    }
}

impl TryFrom<RecipeDetailsResponse> for RecipeDetails {
    type Error = MappingError;

    fn try_from(response: RecipeDetailsResponse) -> Result<Self, Self::Error> {
        let ingredients = collect_ingredients(&response.extra);
        let recipe = Recipe::try_from(response.recipe)?;

        Ok(Self {
            id: recipe.id,
            area: recipe.area,
            name: recipe.name,
            thumbnail_url: recipe.thumbnail_url,
            category: recipe.category,
            tags: recipe.tags,
            video_url: recipe.video_url,
            instructions: recipe.instructions,
            source_url: response.str_source.unwrap_or_default(),
            ingredients,
        })
    }
}

fn collect_ingredients(extra: &HashMap<String, serde_json::Value>) -> Vec<Ingredient> {
    let text = |key: String| {
        extra
            .get(&key)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    };

    (1..=MAX_INGREDIENTS)
        .filter_map(|n| {
            let name = text(format!("strIngredient{n}"));
            if name.is_empty() {
                return None;
            }
            Some(Ingredient {
                name,
                measure: text(format!("strMeasure{n}")),
            })
        })
        .collect()
}

// --- Media hand-off ---

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VideoError {
    #[error("invalid video URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported video host: {0}")]
    UnsupportedHost(String),

    #[error("no video id in '{0}'")]
    MissingVideoId(String),
}

/// A recipe video the media player can open.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct VideoReference {
    url: String,
    video_id: String,
}

impl VideoReference {
    const VIDEO_ID_LENGTH: usize = 11;

    pub fn parse(url: &str) -> Result<Self, VideoError> {
        let parsed = Url::parse(url.trim()).map_err(|e| VideoError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.scheme() != "https" && parsed.scheme() != "http" {
            return Err(VideoError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let host = parsed.host_str().unwrap_or_default().to_lowercase();
        let bare_host = host.trim_start_matches("www.").trim_start_matches("m.");

        let candidate = match bare_host {
            "youtube.com" | "youtube-nocookie.com" => {
                let mut segments = parsed.path_segments().into_iter().flatten();
                match segments.next() {
                    Some("watch") => parsed
                        .query_pairs()
                        .find(|(k, _)| k == "v")
                        .map(|(_, v)| v.into_owned()),
                    Some("embed" | "shorts" | "v") => segments.next().map(str::to_string),
                    _ => None,
                }
            }
            "youtu.be" => parsed
                .path_segments()
                .and_then(|mut s| s.next())
                .map(str::to_string),
            other => return Err(VideoError::UnsupportedHost(other.to_string())),
        };

        let video_id = candidate
            .filter(|id| Self::is_valid_id(id))
            .ok_or_else(|| VideoError::MissingVideoId(url.to_string()))?;

        Ok(Self {
            url: url.trim().to_string(),
            video_id,
        })
    }

    fn is_valid_id(id: &str) -> bool {
        id.len() == Self::VIDEO_ID_LENGTH
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }
}

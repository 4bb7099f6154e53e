use serde::{Deserialize, Serialize};

use crate::api::MealsResponse;
use crate::config::RecipeConfig;
use crate::model::{Recipe, RecipeDetails, RecipeId};

#[derive(Serialize, Deserialize)]
pub enum Event {
    // Shell
    Configure(RecipeConfig),

    // Screens
    RecipeList(RecipeListEvent),
    Details(DetailsEvent),
    Favorites(FavoritesEvent),

    // Favorites store feed
    FavoritesUpdated(Vec<Recipe>),

    // Internal
    #[serde(skip)]
    SearchResponse {
        generation: u64,
        result: Box<MealsResponse>,
    },
    #[serde(skip)]
    DetailsResponse {
        generation: u64,
        result: Box<MealsResponse>,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Configure(_) => "configure",
            Self::RecipeList(event) => event.name(),
            Self::Details(event) => event.name(),
            Self::Favorites(event) => event.name(),
            Self::FavoritesUpdated(_) => "favorites_updated",
            Self::SearchResponse { .. } => "search_response",
            Self::DetailsResponse { .. } => "details_response",
        }
    }
}

// --- Search screen ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum RecipeListEvent {
    SearchRecipe { query: String },
    GoToRecipeDetails { id: RecipeId },
    FavouriteScreen,
}

impl RecipeListEvent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SearchRecipe { .. } => "search_recipe",
            Self::GoToRecipeDetails { .. } => "go_to_recipe_details",
            Self::FavouriteScreen => "favourite_screen",
        }
    }
}

// --- Details screen ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum DetailsEvent {
    FetchRecipeDetails { id: RecipeId },
    InsertRecipe(RecipeDetails),
    DeleteRecipe(RecipeDetails),
    GoToRecipeListScreen,
    GoToMediaPlayer { video_url: String },
}

impl DetailsEvent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::FetchRecipeDetails { .. } => "fetch_recipe_details",
            Self::InsertRecipe(_) => "insert_recipe",
            Self::DeleteRecipe(_) => "delete_recipe",
            Self::GoToRecipeListScreen => "go_to_recipe_list_screen",
            Self::GoToMediaPlayer { .. } => "go_to_media_player",
        }
    }
}

// --- Favorites screen ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum FavoritesEvent {
    AlphabeticalSort,
    LessIngredientsSort,
    ResetSort,
    ShowDetails { id: RecipeId },
    DeleteRecipe(Recipe),
    GoToDetails { id: RecipeId },
}

impl FavoritesEvent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AlphabeticalSort => "alphabetical_sort",
            Self::LessIngredientsSort => "less_ingredients_sort",
            Self::ResetSort => "reset_sort",
            Self::ShowDetails { .. } => "show_details",
            Self::DeleteRecipe(_) => "delete_recipe",
            Self::GoToDetails { .. } => "go_to_details",
        }
    }
}

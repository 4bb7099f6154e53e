//! The Crux app: search, details and favorites screens over one model.
//!
//! Remote calls go out through the HTTP capability and come back as
//! `SearchResponse` / `DetailsResponse`, tagged with the pipeline generation
//! they belong to. Favorites writes go out through the favorites capability;
//! the store answers by republishing the collection as `FavoritesUpdated`.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::MealDbApi;
use crate::capabilities::Capabilities;
use crate::event::{DetailsEvent, Event, FavoritesEvent, RecipeListEvent};
use crate::favorites::{FavoritesViewState, SortOrder};
use crate::model::{Recipe, RecipeDetails, RecipeId, VideoReference};
use crate::pipeline::{DetailFetchPipeline, SearchPipeline};
use crate::progress::ProgressState;
use crate::repository::{self, RecipeRepository, RepositoryError};
use crate::AppError;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    RecipeList,
    RecipeDetails {
        id: RecipeId,
    },
    Favorites,
    MediaPlayer(VideoReference),
}

#[derive(Default)]
pub struct Model {
    pub api: MealDbApi,
    pub screen: Screen,
    /// Query of the newest search.
    pub query: String,
    pub search: SearchPipeline,
    pub details: DetailFetchPipeline,
    pub favorites: FavoritesViewState,
    /// Message for a failure that has no screen state of its own.
    pub notice: Option<String>,
}

impl Model {
    pub fn is_favorite(&self, id: &RecipeId) -> bool {
        self.favorites.original.iter().any(|r| &r.id == id)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewModel {
    pub screen: Screen,
    pub search: ProgressState<Vec<Recipe>>,
    pub details: ProgressState<RecipeDetails>,
    pub details_is_favorite: bool,
    pub favorites: Vec<Recipe>,
    pub favorites_loaded: bool,
    pub sort: SortOrder,
    pub notice: Option<String>,
}

#[derive(Default)]
pub struct App;

impl App {
    fn search(query: String, model: &mut Model, caps: &Capabilities) {
        let generation = model.search.start();
        model.query = query;
        if let Err(e) = RecipeRepository::new(&model.api, caps).search(&model.query, generation) {
            warn!(kind = ?e.kind, "Recipe search not sent: {}", e);
            model.search.complete(generation, Err::<Vec<Recipe>, _>(e));
        }
    }

    fn fetch_details(id: &RecipeId, model: &mut Model, caps: &Capabilities) {
        let generation = model.details.start();
        if let Err(e) = RecipeRepository::new(&model.api, caps).get_details(id, generation) {
            warn!(kind = ?e.kind, "Recipe lookup not sent: {}", e);
            model.details.complete(generation, Err::<RecipeDetails, _>(e));
        }
    }

    fn open_details(id: RecipeId, model: &mut Model, caps: &Capabilities) {
        Self::fetch_details(&id, model, caps);
        model.screen = Screen::RecipeDetails { id };
    }

    fn on_recipe_list(event: RecipeListEvent, model: &mut Model, caps: &Capabilities) {
        match event {
            RecipeListEvent::SearchRecipe { query } => Self::search(query, model, caps),
            RecipeListEvent::GoToRecipeDetails { id } => Self::open_details(id, model, caps),
            RecipeListEvent::FavouriteScreen => model.screen = Screen::Favorites,
        }
    }

    fn on_details(event: DetailsEvent, model: &mut Model, caps: &Capabilities) {
        match event {
            DetailsEvent::FetchRecipeDetails { id } => Self::fetch_details(&id, model, caps),
            DetailsEvent::InsertRecipe(details) => {
                RecipeRepository::new(&model.api, caps).insert(details.to_recipe());
            }
            DetailsEvent::DeleteRecipe(details) => {
                RecipeRepository::new(&model.api, caps).delete(details.to_recipe());
            }
            DetailsEvent::GoToRecipeListScreen => model.screen = Screen::RecipeList,
            DetailsEvent::GoToMediaPlayer { video_url } => match VideoReference::parse(&video_url) {
                Ok(video) => {
                    info!(video_id = video.video_id(), "Opening media player");
                    model.notice = None;
                    model.screen = Screen::MediaPlayer(video);
                }
                Err(e) => {
                    warn!("Recipe video rejected: {}", e);
                    model.notice = Some(AppError::from(e).user_facing_message());
                }
            },
        }
    }

    fn on_favorites(event: FavoritesEvent, model: &mut Model, caps: &Capabilities) {
        match event {
            FavoritesEvent::AlphabeticalSort => model.favorites.sort_alphabetical(),
            FavoritesEvent::LessIngredientsSort => model.favorites.sort_by_instruction_length(),
            FavoritesEvent::ResetSort => model.favorites.reset_sort(),
            // The list changes when the store republishes, not here.
            FavoritesEvent::DeleteRecipe(recipe) => RecipeRepository::new(&model.api, caps).delete(recipe),
            FavoritesEvent::ShowDetails { id } | FavoritesEvent::GoToDetails { id } => {
                Self::open_details(id, model, caps);
            }
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(event = event.name(), "update");

        match event {
            Event::Configure(config) => match MealDbApi::new(&config) {
                Ok(api) => {
                    info!(base_url = api.base_url(), "Recipe service configured");
                    model.api = api;
                }
                Err(e) => {
                    warn!("Ignoring recipe service config: {}", e);
                    model.notice = Some(AppError::from(e).user_facing_message());
                }
            },
            Event::RecipeList(event) => Self::on_recipe_list(event, model, caps),
            Event::Details(event) => Self::on_details(event, model, caps),
            Event::Favorites(event) => Self::on_favorites(event, model, caps),
            Event::FavoritesUpdated(recipes) => {
                debug!(count = recipes.len(), "favorites updated");
                model.favorites.on_store_update(recipes);
            }
            Event::SearchResponse { generation, result } => {
                let outcome = repository::search_result(*result, &model.query);
                if !model.search.complete(generation, outcome) {
                    return;
                }
            }
            Event::DetailsResponse { generation, result } => {
                let outcome: Result<RecipeDetails, RepositoryError> = repository::details_result(*result);
                if !model.details.complete(generation, outcome) {
                    return;
                }
            }
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        let details = model.details.state().clone();
        let details_is_favorite = details.data().is_some_and(|d| model.is_favorite(&d.id));

        ViewModel {
            screen: model.screen.clone(),
            search: model.search.state().clone(),
            details,
            details_is_favorite,
            favorites: model.favorites.displayed.clone(),
            favorites_loaded: model.favorites.loaded,
            sort: model.favorites.sort,
            notice: model.notice.clone(),
        }
    }
}

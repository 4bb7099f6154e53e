mod common;

use common::{http_urls, meal_json, meals, ok, renders};
use crux_core::testing::AppTester;
use recipe_shared::capabilities::FavoritesOperation;
use recipe_shared::{
    App, DetailsEvent, Effect, Event, Model, ProgressState, RecipeId, RecipeListEvent, Screen,
};

#[test]
fn lookup_renders_loading_then_terminal() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    // Empty result set
    let update = app.update(
        Event::Details(DetailsEvent::FetchRecipeDetails { id: RecipeId::new("0") }),
        &mut model,
    );
    assert!(renders(&update.effects));
    assert_eq!(app.view(&model).details, ProgressState::Loading);

    app.update(
        Event::DetailsResponse {
            generation: model.details.generation(),
            result: ok(r#"{"meals": []}"#),
        },
        &mut model,
    );
    assert!(app.view(&model).details.error().is_some());

    // One meal
    app.update(
        Event::Details(DetailsEvent::FetchRecipeDetails { id: RecipeId::new("52771") }),
        &mut model,
    );
    assert!(app.view(&model).details.is_loading());

    app.update(
        Event::DetailsResponse {
            generation: model.details.generation(),
            result: ok(meals(&[meal_json("52771", "Spicy Arrabiata Penne", "Boil.")])),
        },
        &mut model,
    );
    let view = app.view(&model);
    let details = view.details.data().unwrap();
    assert_eq!(details.id.as_str(), "52771");
    assert_eq!(details.source_url, "https://example.com/52771");
    assert_eq!(details.ingredients.len(), 1);
}

#[test]
fn search_to_details_to_favorite_to_video() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    // 1. Search
    let update = app.update(
        Event::RecipeList(RecipeListEvent::SearchRecipe { query: "pasta".into() }),
        &mut model,
    );
    assert_eq!(
        http_urls(&update.effects),
        vec!["https://www.themealdb.com/api/json/v1/1/search.php?s=pasta"]
    );
    app.update(
        Event::SearchResponse {
            generation: model.search.generation(),
            result: ok(meals(&[
                meal_json("1", "Carbonara", "Whisk eggs."),
                meal_json("2", "Arrabiata", "Boil."),
            ])),
        },
        &mut model,
    );
    let results = app.view(&model).search.data().cloned().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].name, "Carbonara");

    // 2. Details
    let id = results[1].id.clone();
    let update = app.update(
        Event::RecipeList(RecipeListEvent::GoToRecipeDetails { id: id.clone() }),
        &mut model,
    );
    assert_eq!(model.screen, Screen::RecipeDetails { id: id.clone() });
    assert_eq!(
        http_urls(&update.effects),
        vec!["https://www.themealdb.com/api/json/v1/1/lookup.php?i=2"]
    );
    app.update(
        Event::DetailsResponse {
            generation: model.details.generation(),
            result: ok(meals(&[meal_json("2", "Arrabiata", "Boil.")])),
        },
        &mut model,
    );
    let view = app.view(&model);
    let recipe = view.details.data().cloned().unwrap();
    assert_eq!(recipe.name, "Arrabiata");
    assert!(!view.details_is_favorite);

    // 3. Favorite it; the store answers through the feed
    let update = app.update(Event::Details(DetailsEvent::InsertRecipe(recipe.clone())), &mut model);
    let writes: Vec<_> = update
        .effects
        .iter()
        .filter_map(|e| match e {
            Effect::Favorites(request) => Some(request.operation.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(writes, vec![FavoritesOperation::Insert(recipe.to_recipe())]);

    app.update(Event::FavoritesUpdated(vec![recipe.to_recipe()]), &mut model);
    assert!(app.view(&model).details_is_favorite);

    // 4. Play the video
    app.update(
        Event::Details(DetailsEvent::GoToMediaPlayer { video_url: recipe.video_url.clone() }),
        &mut model,
    );
    match app.view(&model).screen {
        Screen::MediaPlayer(video) => assert_eq!(video.video_id(), "1IszT_guI08"),
        other => panic!("unexpected screen: {other:?}"),
    }
}

#[test]
fn malformed_lookup_renders_error() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(
        Event::Details(DetailsEvent::FetchRecipeDetails { id: RecipeId::new("1") }),
        &mut model,
    );
    app.update(
        Event::DetailsResponse {
            generation: model.details.generation(),
            result: ok("<html>busy</html>"),
        },
        &mut model,
    );

    assert_eq!(
        app.view(&model).details.error(),
        Some("Received an unexpected response from the recipe service")
    );
}

#![allow(dead_code)]

use crux_http::testing::ResponseBuilder;
use recipe_shared::api::MealsResponse;
use recipe_shared::Effect;

/// A 200 response carrying `body`, as the HTTP capability delivers it.
pub fn ok(body: impl Into<String>) -> Box<MealsResponse> {
    Box::new(Ok(ResponseBuilder::ok().body(body.into().into_bytes()).build()))
}

pub fn http_urls(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Http(request) => Some(request.operation.url.clone()),
            _ => None,
        })
        .collect()
}

pub fn renders(effects: &[Effect]) -> bool {
    effects.iter().any(|e| matches!(e, Effect::Render(_)))
}

pub fn meal_json(id: &str, name: &str, instructions: &str) -> String {
    format!(
        r#"{{
            "idMeal": "{id}",
            "strMeal": "{name}",
            "strArea": "Italian",
            "strCategory": "Pasta",
            "strMealThumb": "https://www.themealdb.com/images/media/meals/{id}.jpg",
            "strTags": "Pasta",
            "strYoutube": "https://www.youtube.com/watch?v=1IszT_guI08",
            "strInstructions": "{instructions}",
            "strIngredient1": "penne rigate",
            "strMeasure1": "1 pound",
            "strSource": "https://example.com/{id}"
        }}"#
    )
}

pub fn meals(items: &[String]) -> String {
    format!(r#"{{"meals": [{}]}}"#, items.join(","))
}

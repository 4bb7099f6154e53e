//! Effects the core asks its host to perform.
//!
//! HTTP and rendering are the stock Crux capabilities. Favorites writes go
//! through `Favorites`, which the native host answers from the SQLite-backed
//! `FavoritesStore`.

mod favorites;

pub use crux_core::render::Render;
pub use crux_http::Http;

pub use self::favorites::{Favorites, FavoritesOperation};

#[allow(unused_imports)]
use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
    pub favorites: Favorites<Event>,
}

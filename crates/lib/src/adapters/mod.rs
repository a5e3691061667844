//! Provider adapters: one client per external capability, each behind a trait so the
//! dispatcher can be built with test doubles.
//!
//! Every call returns [`AdapterResult`]; no adapter retries.

mod error;
mod http;
mod music;
mod recipe;
mod tracking;
mod weather;

pub use error::{AdapterResult, ApiError, ApiErrorKind};
pub use http::{http_client, DEFAULT_REQUEST_TIMEOUT};
pub use music::{
    Album, Artist, MediaResults, MediaType, MusicAdapter, Playlist, SpotifyClient, Track,
};
pub use recipe::{Recipe, RecipeAdapter, SpoonacularClient};
pub use tracking::{BinderByteClient, TrackingAdapter, TrackingHistory, TrackingInfo};
pub use weather::{OpenWeatherClient, WeatherAdapter, WeatherReport};

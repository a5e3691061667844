//! Counting test doubles for the provider adapters.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::adapters::{
    AdapterResult, ApiError, ApiErrorKind, MediaResults, MediaType, MusicAdapter, Playlist,
    Recipe, RecipeAdapter, TrackingAdapter, TrackingInfo, WeatherAdapter, WeatherReport,
};

/// Adapter double returning a fixed result and counting calls.
pub struct Fake<T> {
    configured: bool,
    result: AdapterResult<T>,
    calls: AtomicUsize,
}

impl<T: Clone> Fake<T> {
    pub fn ok(value: T) -> Self {
        Self {
            configured: true,
            result: Ok(value),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn err(kind: ApiErrorKind) -> Self {
        Self {
            configured: true,
            result: Err(ApiError::new(kind, "fake provider failure")),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            result: Err(ApiError::not_configured()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next(&self) -> AdapterResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

#[async_trait]
impl WeatherAdapter for Fake<WeatherReport> {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn lookup(&self, _city: &str) -> AdapterResult<WeatherReport> {
        self.next()
    }
}

/// `None` plays the "no search match" case; `random` turns it into NotFound.
#[async_trait]
impl RecipeAdapter for Fake<Option<Recipe>> {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn random(&self) -> AdapterResult<Recipe> {
        self.next()?
            .ok_or_else(|| ApiError::new(ApiErrorKind::NotFound, "no recipe"))
    }

    async fn search(&self, _query: &str) -> AdapterResult<Option<Recipe>> {
        self.next()
    }
}

#[async_trait]
impl TrackingAdapter for Fake<TrackingInfo> {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn lookup(
        &self,
        _courier_code: &str,
        _tracking_number: &str,
    ) -> AdapterResult<TrackingInfo> {
        self.next()
    }
}

/// Music double: playlists and media results are scripted separately.
pub struct FakeMusic {
    pub configured: bool,
    pub playlists: AdapterResult<Vec<Playlist>>,
    pub media: AdapterResult<MediaResults>,
    pub calls: AtomicUsize,
}

impl FakeMusic {
    pub fn new(
        playlists: AdapterResult<Vec<Playlist>>,
        media: AdapterResult<MediaResults>,
    ) -> Self {
        Self {
            configured: true,
            playlists,
            media,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            playlists: Err(ApiError::not_configured()),
            media: Err(ApiError::not_configured()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MusicAdapter for FakeMusic {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn search_playlists(&self, _query: &str) -> AdapterResult<Vec<Playlist>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.playlists.clone()
    }

    async fn search(&self, _query: &str, _types: &[MediaType]) -> AdapterResult<MediaResults> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.media.clone()
    }
}

pub fn jakarta(description: &str) -> WeatherReport {
    WeatherReport {
        name: "Jakarta".to_string(),
        temp_c: 30.0,
        description: description.to_string(),
        humidity: 70,
        wind_speed: 2.5,
    }
}

/// Local endpoint that accepts connections and never answers. Returns its base URL and the
/// number of connections accepted so far.
pub async fn silent_endpoint() -> (String, Arc<AtomicUsize>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            held.push(socket);
        }
    });
    (format!("http://{}", addr), accepted)
}

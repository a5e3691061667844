//! Spotify Web API client: playlist search and track/album/artist search.
//!
//! Uses the client-credentials flow. The access token is fetched once in [`SpotifyClient::connect`]
//! and only read afterwards; when that fetch fails the client stays not-ready for the process
//! lifetime and every call reports `NotConfigured`.

use async_trait::async_trait;
use serde::Deserialize;

use std::time::Duration;

use crate::adapters::error::{AdapterResult, ApiError};
use crate::adapters::http::http_client;

const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com";
const DEFAULT_ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";
const SEARCH_LIMIT: &str = "3";

#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    pub name: String,
    pub owner: Option<String>,
    pub url: Option<String>,
    pub track_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub name: String,
    pub artists: Vec<String>,
    pub album: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Album {
    pub name: String,
    pub artists: Vec<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Artist {
    pub name: String,
    pub url: Option<String>,
}

/// Result of a multi-type search; a list is empty when that type was not requested or had no hits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaResults {
    pub tracks: Vec<Track>,
    pub albums: Vec<Album>,
    pub artists: Vec<Artist>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Track,
    Album,
    Artist,
}

impl MediaType {
    fn as_str(self) -> &'static str {
        match self {
            MediaType::Track => "track",
            MediaType::Album => "album",
            MediaType::Artist => "artist",
        }
    }
}

#[async_trait]
pub trait MusicAdapter: Send + Sync {
    /// False when credentials are absent or the start-up token refresh failed.
    fn is_configured(&self) -> bool;
    async fn search_playlists(&self, query: &str) -> AdapterResult<Vec<Playlist>>;
    async fn search(&self, query: &str, types: &[MediaType]) -> AdapterResult<MediaResults>;
}

#[derive(Clone)]
pub struct SpotifyClient {
    api_base_url: String,
    access_token: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    playlists: Option<Page<RawPlaylist>>,
    #[serde(default)]
    tracks: Option<Page<RawTrack>>,
    #[serde(default)]
    albums: Option<Page<RawAlbum>>,
    #[serde(default)]
    artists: Option<Page<RawArtist>>,
}

/// Spotify may put `null` entries in `items`.
#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<Option<T>>,
}

impl<T> Page<T> {
    fn into_items(page: Option<Self>) -> impl Iterator<Item = T> {
        page.map(|p| p.items).unwrap_or_default().into_iter().flatten()
    }
}

#[derive(Debug, Default, Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawPlaylist {
    name: String,
    #[serde(default)]
    owner: Option<RawOwner>,
    #[serde(default)]
    external_urls: ExternalUrls,
    #[serde(default)]
    tracks: Option<RawTotal>,
}

#[derive(Debug, Deserialize)]
struct RawOwner {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTotal {
    total: u32,
}

#[derive(Debug, Deserialize)]
struct RawTrack {
    name: String,
    #[serde(default)]
    artists: Vec<Named>,
    #[serde(default)]
    album: Option<Named>,
    #[serde(default)]
    external_urls: ExternalUrls,
}

#[derive(Debug, Deserialize)]
struct RawAlbum {
    name: String,
    #[serde(default)]
    artists: Vec<Named>,
    #[serde(default)]
    external_urls: ExternalUrls,
}

#[derive(Debug, Deserialize)]
struct RawArtist {
    name: String,
    #[serde(default)]
    external_urls: ExternalUrls,
}

fn names(list: Vec<Named>) -> Vec<String> {
    list.into_iter().map(|n| n.name).collect()
}

impl SpotifyClient {
    /// Build the client and fetch the client-credentials token once.
    /// `credentials` is (client_id, client_secret).
    /// None or a failed fetch yields a not-ready client.
    /// `timeout` bounds the token fetch and every later search.
    pub async fn connect(
        credentials: Option<(String, String)>,
        api_base_url: Option<String>,
        accounts_base_url: Option<String>,
        timeout: Duration,
    ) -> Self {
        let client = http_client(timeout);
        let api_base_url = api_base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let accounts_base_url = accounts_base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_ACCOUNTS_BASE_URL.to_string());
        let access_token = match credentials {
            Some((id, secret)) => {
                match fetch_token(&client, &accounts_base_url, &id, &secret).await {
                    Ok(token) => {
                        log::info!("spotify: access token acquired");
                        Some(token)
                    }
                    Err(e) => {
                        log::warn!("spotify: token refresh failed, music search disabled: {}", e);
                        None
                    }
                }
            }
            None => {
                log::info!("spotify: client credentials not set, music search disabled");
                None
            }
        };
        Self {
            api_base_url,
            access_token,
            client,
        }
    }

    async fn search_raw(&self, query: &str, types: &str) -> AdapterResult<SearchResponse> {
        let token = self
            .access_token
            .as_deref()
            .ok_or_else(ApiError::not_configured)?;
        let url = format!("{}/v1/search", self.api_base_url);
        let res = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("q", query), ("type", types), ("limit", SEARCH_LIMIT)])
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, body));
        }
        Ok(res.json().await?)
    }
}

/// POST /api/token with grant_type=client_credentials and HTTP basic auth.
async fn fetch_token(
    client: &reqwest::Client,
    accounts_base_url: &str,
    client_id: &str,
    client_secret: &str,
) -> AdapterResult<String> {
    let url = format!("{}/api/token", accounts_base_url);
    let res = client
        .post(&url)
        .basic_auth(client_id, Some(client_secret))
        .header(
            reqwest::header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body("grant_type=client_credentials")
        .send()
        .await?;
    if !res.status().is_success() {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        return Err(ApiError::from_status(status, body));
    }
    let data: TokenResponse = res.json().await?;
    Ok(data.access_token)
}

#[async_trait]
impl MusicAdapter for SpotifyClient {
    fn is_configured(&self) -> bool {
        self.access_token.is_some()
    }

    async fn search_playlists(&self, query: &str) -> AdapterResult<Vec<Playlist>> {
        let data = self.search_raw(query, "playlist").await?;
        Ok(Page::into_items(data.playlists)
            .map(|p| Playlist {
                name: p.name,
                owner: p.owner.and_then(|o| o.display_name),
                url: p.external_urls.spotify,
                track_count: p.tracks.map(|t| t.total),
            })
            .collect())
    }

    async fn search(&self, query: &str, types: &[MediaType]) -> AdapterResult<MediaResults> {
        let types = types
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let data = self.search_raw(query, &types).await?;
        Ok(MediaResults {
            tracks: Page::into_items(data.tracks)
                .map(|t| Track {
                    name: t.name,
                    artists: names(t.artists),
                    album: t.album.map(|a| a.name),
                    url: t.external_urls.spotify,
                })
                .collect(),
            albums: Page::into_items(data.albums)
                .map(|a| Album {
                    name: a.name,
                    artists: names(a.artists),
                    url: a.external_urls.spotify,
                })
                .collect(),
            artists: Page::into_items(data.artists)
                .map(|a| Artist {
                    name: a.name,
                    url: a.external_urls.spotify,
                })
                .collect(),
        })
    }
}

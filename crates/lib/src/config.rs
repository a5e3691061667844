//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.linebot/config.json`) and environment.
//! Every credential can be supplied through the environment; env wins over the file.
//! A missing credential disables only the feature that needs it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gateway server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// LINE Messaging API credentials.
    #[serde(default)]
    pub line: LineConfig,

    /// Language-model backend and fallback model list.
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub weather: ProviderConfig,

    #[serde(default)]
    pub recipe: ProviderConfig,

    #[serde(default)]
    pub music: MusicConfig,

    #[serde(default)]
    pub tracking: ProviderConfig,
}

/// Gateway bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for the webhook HTTP server (default 15152).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,

    /// Seconds before any outbound call (provider, model, LINE reply) is abandoned (default 10).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_gateway_port() -> u16 {
    15152
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// LINE channel credentials. Overridden by LINE_CHANNEL_ACCESS_TOKEN / LINE_CHANNEL_SECRET.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineConfig {
    pub channel_access_token: Option<String>,
    /// Shared secret used to verify `x-line-signature`.
    pub channel_secret: Option<String>,
    /// Messaging API base (default https://api.line.me). Tests point this at a mock server.
    pub api_base_url: Option<String>,
}

/// One entry in the ordered model fallback list. Lower priority is tried first;
/// equal priorities keep their configured order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCandidate {
    pub id: String,
    #[serde(default)]
    pub priority: i32,
}

/// Language-model settings. `token` is overridden by GITHUB_TOKEN.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    pub token: Option<String>,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_models")]
    pub models: Vec<ModelCandidate>,
}

fn default_llm_endpoint() -> String {
    "https://models.github.ai/inference".to_string()
}

fn default_system_prompt() -> String {
    concat!(
        "selalu balas dengan bahasa gaul anak muda indonesia dan singkat dan padat ",
        "dan tidak menggunakan kata-kata yang tidak perlu"
    )
    .to_string()
}

fn default_temperature() -> f32 {
    0.8
}

fn default_top_p() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_models() -> Vec<ModelCandidate> {
    [
        "openai/gpt-4.1",
        "openai/gpt-3.5-turbo",
        "meta/Llama-4-Scout-17B-16E-Instruct",
    ]
    .iter()
    .enumerate()
    .map(|(i, id)| ModelCandidate {
        id: id.to_string(),
        priority: i as i32,
    })
    .collect()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            token: None,
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
            models: default_models(),
        }
    }
}

/// API-key provider (weather, recipe, tracking).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    /// Override the provider base URL (tests, proxies).
    pub base_url: Option<String>,
}

/// Spotify client-credentials pair. Overridden by SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_base_url: Option<String>,
    pub accounts_base_url: Option<String>,
}

/// Read an env var, trimmed; empty counts as unset.
fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

/// Env value when set, otherwise the trimmed, non-empty config value.
fn resolve(env_name: &str, configured: Option<&String>) -> Option<String> {
    env_non_empty(env_name).or_else(|| {
        configured
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

pub fn resolve_line_access_token(config: &Config) -> Option<String> {
    resolve(
        "LINE_CHANNEL_ACCESS_TOKEN",
        config.line.channel_access_token.as_ref(),
    )
}

pub fn resolve_line_channel_secret(config: &Config) -> Option<String> {
    resolve("LINE_CHANNEL_SECRET", config.line.channel_secret.as_ref())
}

/// Resolve the language-model token: env GITHUB_TOKEN overrides config.
pub fn resolve_llm_token(config: &Config) -> Option<String> {
    resolve("GITHUB_TOKEN", config.llm.token.as_ref())
}

pub fn resolve_weather_key(config: &Config) -> Option<String> {
    resolve("OPENWEATHER_API_KEY", config.weather.api_key.as_ref())
}

pub fn resolve_recipe_key(config: &Config) -> Option<String> {
    resolve("SPOONACULAR_API_KEY", config.recipe.api_key.as_ref())
}

/// Both halves of the Spotify pair are required; otherwise None.
pub fn resolve_music_credentials(config: &Config) -> Option<(String, String)> {
    let id = resolve("SPOTIFY_CLIENT_ID", config.music.client_id.as_ref())?;
    let secret = resolve("SPOTIFY_CLIENT_SECRET", config.music.client_secret.as_ref())?;
    Some((id, secret))
}

pub fn resolve_tracking_key(config: &Config) -> Option<String> {
    resolve("BINDERBYTE_API_KEY", config.tracking.api_key.as_ref())
}

/// Outbound request timeout. Zero is treated as the default.
pub fn request_timeout(config: &Config) -> Duration {
    match config.gateway.request_timeout_secs {
        0 => Duration::from_secs(default_request_timeout_secs()),
        secs => Duration::from_secs(secs),
    }
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("LINEBOT_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".linebot").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, LINEBOT_CONFIG_PATH, or the default.
/// Missing file => default config.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

//! OpenWeatherMap current-weather client (https://api.openweathermap.org by default).

use async_trait::async_trait;
use serde::Deserialize;

use std::time::Duration;

use crate::adapters::error::{AdapterResult, ApiError};
use crate::adapters::http::{http_client, DEFAULT_REQUEST_TIMEOUT};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Current conditions for one city.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    /// City name as the provider spells it.
    pub name: String,
    pub temp_c: f64,
    /// Free-text description in the provider's language (lang=id).
    pub description: String,
    pub humidity: u32,
    pub wind_speed: f64,
}

#[async_trait]
pub trait WeatherAdapter: Send + Sync {
    /// False when the API key is absent; callers must not call `lookup` then.
    fn is_configured(&self) -> bool;
    async fn lookup(&self, city: &str) -> AdapterResult<WeatherReport>;
}

/// Client for the OpenWeatherMap `/data/2.5/weather` endpoint.
#[derive(Clone)]
pub struct OpenWeatherClient {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            api_key,
            base_url,
            client: http_client(DEFAULT_REQUEST_TIMEOUT),
        }
    }

    /// Replace the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    #[serde(default)]
    name: String,
    main: MainBlock,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
    #[serde(default)]
    wind: Option<WindBlock>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    #[serde(default)]
    humidity: u32,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct WindBlock {
    #[serde(default)]
    speed: f64,
}

#[async_trait]
impl WeatherAdapter for OpenWeatherClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// GET /data/2.5/weather?q={city}&units=metric&lang=id
    async fn lookup(&self, city: &str) -> AdapterResult<WeatherReport> {
        let key = self.api_key.as_deref().ok_or_else(ApiError::not_configured)?;
        let url = format!("{}/data/2.5/weather", self.base_url);
        let res = self
            .client
            .get(&url)
            .query(&[("q", city), ("units", "metric"), ("lang", "id"), ("appid", key)])
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, body));
        }
        let data: CurrentWeather = res.json().await?;
        Ok(WeatherReport {
            name: data.name,
            temp_c: data.main.temp,
            description: data
                .weather
                .into_iter()
                .next()
                .map(|w| w.description)
                .unwrap_or_default(),
            humidity: data.main.humidity,
            wind_speed: data.wind.map(|w| w.speed).unwrap_or_default(),
        })
    }
}

//! Spoonacular recipe client: random recipe and search by keyword.

use async_trait::async_trait;
use serde::Deserialize;

use std::time::Duration;

use crate::adapters::error::{AdapterResult, ApiError, ApiErrorKind};
use crate::adapters::http::{http_client, DEFAULT_REQUEST_TIMEOUT};

const DEFAULT_BASE_URL: &str = "https://api.spoonacular.com";

/// One recipe with the fields the reply template needs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub title: String,
    #[serde(default)]
    pub dish_types: Vec<String>,
    #[serde(default)]
    pub ready_in_minutes: Option<u32>,
    /// HTML summary as returned by the provider.
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub source_url: Option<String>,
}

#[async_trait]
pub trait RecipeAdapter: Send + Sync {
    fn is_configured(&self) -> bool;
    async fn random(&self) -> AdapterResult<Recipe>;
    /// First recipe matching `query`, or None when the provider has no match.
    async fn search(&self, query: &str) -> AdapterResult<Option<Recipe>>;
}

#[derive(Clone)]
pub struct SpoonacularClient {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RandomResponse {
    #[serde(default)]
    recipes: Vec<Recipe>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Recipe>,
}

impl SpoonacularClient {
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

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> AdapterResult<T> {
        let key = self.api_key.as_deref().ok_or_else(ApiError::not_configured)?;
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .client
            .get(&url)
            .query(query)
            .query(&[("apiKey", key)])
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            // 402 is the daily quota; treat it like a rejected key.
            if status == reqwest::StatusCode::PAYMENT_REQUIRED {
                return Err(ApiError::new(ApiErrorKind::Unauthorized, body));
            }
            return Err(ApiError::from_status(status, body));
        }
        Ok(res.json().await?)
    }
}

#[async_trait]
impl RecipeAdapter for SpoonacularClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// GET /recipes/random?number=1
    async fn random(&self) -> AdapterResult<Recipe> {
        let data: RandomResponse = self.get("/recipes/random", &[("number", "1")]).await?;
        data.recipes
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::new(ApiErrorKind::Unexpected, "random returned no recipes"))
    }

    /// GET /recipes/complexSearch?query=..&number=1&addRecipeInformation=true
    async fn search(&self, query: &str) -> AdapterResult<Option<Recipe>> {
        let data: SearchResponse = self
            .get(
                "/recipes/complexSearch",
                &[
                    ("query", query),
                    ("number", "1"),
                    ("addRecipeInformation", "true"),
                ],
            )
            .await?;
        Ok(data.results.into_iter().next())
    }
}

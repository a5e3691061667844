//! Per-message orchestration: normalize, classify, run the intent handler or the model
//! fallback chain, and always produce exactly one non-empty reply.

use std::sync::Arc;

use crate::adapters::{
    BinderByteClient, MusicAdapter, OpenWeatherClient, RecipeAdapter, SpoonacularClient,
    SpotifyClient, TrackingAdapter, WeatherAdapter,
};
use crate::channels::InboundMessage;
use crate::config::{self, Config};
use crate::intents::{self, Intent};
use crate::llm::{ChatCompletionsClient, FallbackChain, LanguageModelAdapter, SamplingParams};

/// Substituted when a path produced an empty reply.
pub const NOT_UNDERSTOOD_REPLY: &str = "Maaf, aku nggak ngerti maksudmu. Coba ulangi ya.";

/// Provider adapters the dispatcher routes to. Built once at start-up.
pub struct Adapters {
    pub weather: Arc<dyn WeatherAdapter>,
    pub recipe: Arc<dyn RecipeAdapter>,
    pub music: Arc<dyn MusicAdapter>,
    pub tracking: Arc<dyn TrackingAdapter>,
}

impl Adapters {
    /// Real provider clients from config; the music client fetches its token here.
    pub async fn from_config(config: &Config) -> Self {
        let timeout = config::request_timeout(config);
        Self {
            weather: Arc::new(
                OpenWeatherClient::new(
                    config::resolve_weather_key(config),
                    config.weather.base_url.clone(),
                )
                .with_timeout(timeout),
            ),
            recipe: Arc::new(
                SpoonacularClient::new(
                    config::resolve_recipe_key(config),
                    config.recipe.base_url.clone(),
                )
                .with_timeout(timeout),
            ),
            music: Arc::new(
                SpotifyClient::connect(
                    config::resolve_music_credentials(config),
                    config.music.api_base_url.clone(),
                    config.music.accounts_base_url.clone(),
                    timeout,
                )
                .await,
            ),
            tracking: Arc::new(
                BinderByteClient::new(
                    config::resolve_tracking_key(config),
                    config.tracking.base_url.clone(),
                )
                .with_timeout(timeout),
            ),
        }
    }
}

pub struct Dispatcher {
    adapters: Adapters,
    fallback: FallbackChain,
}

impl Dispatcher {
    pub fn new(adapters: Adapters, fallback: FallbackChain) -> Self {
        Self { adapters, fallback }
    }

    /// Build every adapter and the model fallback chain from config.
    pub async fn from_config(config: &Config) -> Self {
        let adapters = Adapters::from_config(config).await;
        let token = config::resolve_llm_token(config);
        if token.is_none() {
            log::warn!("GITHUB_TOKEN not set; conversational replies disabled");
        }
        let backend: Arc<dyn LanguageModelAdapter> = Arc::new(
            ChatCompletionsClient::new(
                Some(config.llm.endpoint.clone()),
                token,
                SamplingParams {
                    temperature: config.llm.temperature,
                    top_p: config.llm.top_p,
                    max_tokens: config.llm.max_tokens,
                },
            )
            .with_timeout(config::request_timeout(config)),
        );
        let fallback = FallbackChain::new(
            backend,
            config.llm.models.clone(),
            config.llm.system_prompt.clone(),
        );
        log::info!("llm fallback order: {}", fallback.model_order().join(" -> "));
        Self::new(adapters, fallback)
    }

    pub async fn dispatch(&self, inbound: &InboundMessage) -> String {
        self.reply_to(&inbound.text).await
    }

    /// Reply for one message text. Never empty.
    pub async fn reply_to(&self, text: &str) -> String {
        let normalized = intents::normalize(text);
        let intent = intents::classify(&normalized);
        log::info!("dispatch: intent {}", intent.name());
        let reply = match intent {
            Intent::Weather { city } => {
                intents::weather::handle(self.adapters.weather.as_ref(), &city).await
            }
            Intent::RandomRecipe => {
                intents::recipe::handle_random(self.adapters.recipe.as_ref()).await
            }
            Intent::RecipeSearch { query } => {
                intents::recipe::handle_search(self.adapters.recipe.as_ref(), &query).await
            }
            Intent::PlaylistSearch { query } => {
                intents::music::handle_playlists(self.adapters.music.as_ref(), &query).await
            }
            Intent::MediaSearch { query } => {
                intents::music::handle_media(self.adapters.music.as_ref(), &query).await
            }
            Intent::TrackingLookup {
                courier_code,
                tracking_number,
            } => {
                intents::tracking::handle(
                    self.adapters.tracking.as_ref(),
                    &courier_code,
                    &tracking_number,
                )
                .await
            }
            Intent::TrackingInvalidFormat => intents::tracking::INVALID_FORMAT_REPLY.to_string(),
            Intent::Conversational => self.fallback.run(text.trim()).await,
        };
        if reply.trim().is_empty() {
            log::warn!("dispatch: empty reply, substituting fallback text");
            return NOT_UNDERSTOOD_REPLY.to_string();
        }
        reply
    }
}

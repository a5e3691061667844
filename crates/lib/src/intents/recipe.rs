//! Recipe intents: random recipe and recipe search.

use regex::Regex;
use std::sync::OnceLock;

use crate::adapters::{ApiErrorKind, Recipe, RecipeAdapter};

const FEATURE: &str = "resep";
const MISSING_QUERY_REPLY: &str = "Mau cari resep apa? Contoh: resep nasi goreng";
const SUMMARY_MAX_CHARS: usize = 250;
const ELLIPSIS: &str = "...";

fn html_tag() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("html tag pattern is valid"))
}

/// Strip HTML tags, collapse whitespace, and cut to at most 250 characters.
/// A cut summary ends with "..." (counted in the limit).
pub fn summarize(summary_html: &str) -> String {
    let text = html_tag().replace_all(summary_html, "");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= SUMMARY_MAX_CHARS {
        return text;
    }
    let keep = SUMMARY_MAX_CHARS - ELLIPSIS.len();
    let cut: String = text.chars().take(keep).collect();
    format!("{}{}", cut.trim_end(), ELLIPSIS)
}

/// Title, categories, ready time, summary, then source link when present.
pub fn format_recipe(recipe: &Recipe) -> String {
    let categories = if recipe.dish_types.is_empty() {
        "-".to_string()
    } else {
        recipe.dish_types.join(", ")
    };
    let ready = recipe
        .ready_in_minutes
        .map(|m| format!("{} menit", m))
        .unwrap_or_else(|| "-".to_string());
    let mut out = format!(
        "🍳 {}\nKategori: {}\nWaktu siap: {}",
        recipe.title, categories, ready
    );
    let summary = summarize(&recipe.summary);
    if !summary.is_empty() {
        out.push_str("\n\n");
        out.push_str(&summary);
    }
    if let Some(url) = recipe.source_url.as_deref().filter(|u| !u.is_empty()) {
        out.push_str("\n\nSumber: ");
        out.push_str(url);
    }
    out
}

fn failure_reply(kind: ApiErrorKind) -> String {
    super::apology(FEATURE, kind)
}

pub async fn handle_random(adapter: &dyn RecipeAdapter) -> String {
    if !adapter.is_configured() {
        return super::not_configured(FEATURE);
    }
    match adapter.random().await {
        Ok(recipe) => format_recipe(&recipe),
        Err(e) => {
            log::warn!("random recipe failed: {}", e);
            failure_reply(e.kind)
        }
    }
}

pub async fn handle_search(adapter: &dyn RecipeAdapter, query: &str) -> String {
    if !adapter.is_configured() {
        return super::not_configured(FEATURE);
    }
    if query.is_empty() {
        return MISSING_QUERY_REPLY.to_string();
    }
    match adapter.search(query).await {
        Ok(Some(recipe)) => format_recipe(&recipe),
        Ok(None) => format!("Maaf, resep \"{}\" nggak ketemu. Coba kata kunci lain ya.", query),
        Err(e) => {
            log::warn!("recipe search for {} failed: {}", query, e);
            failure_reply(e.kind)
        }
    }
}

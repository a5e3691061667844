//! Ordered matcher table. The first matcher that returns an intent wins; order is fixed:
//! weather, random recipe, recipe search, playlist search, media search, tracking lookup,
//! tracking invalid format. Anything else is conversational.

use regex::Regex;
use std::sync::OnceLock;

use super::Intent;

type Matcher = fn(&str) -> Option<Intent>;

const MATCHERS: &[(&str, Matcher)] = &[
    ("weather", match_weather),
    ("random-recipe", match_random_recipe),
    ("recipe-search", match_recipe_search),
    ("playlist-search", match_playlist_search),
    ("media-search", match_media_search),
    ("tracking-lookup", match_tracking_lookup),
    ("tracking-invalid-format", match_tracking_invalid),
];

const TRACKING_PREFIX: &str = "cek resi";

fn tracking_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^cek resi\s+(\S+)\s+(\S+)$").expect("tracking pattern is valid")
    })
}

/// Lower-case and trim once, before any matcher runs.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Classify normalized text. Pure: the same input always yields the same intent.
pub fn classify(normalized: &str) -> Intent {
    MATCHERS
        .iter()
        .find_map(|(name, matcher)| {
            let intent = matcher(normalized)?;
            log::debug!("intent matcher {} claimed message", name);
            Some(intent)
        })
        .unwrap_or(Intent::Conversational)
}

/// Remainder after `keyword` when text is exactly the keyword or the keyword followed by
/// whitespace. The remainder is trimmed and may be empty.
fn keyword_argument<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(keyword)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

fn match_weather(text: &str) -> Option<Intent> {
    keyword_argument(text, "cuaca").map(|city| Intent::Weather {
        city: city.to_string(),
    })
}

/// Plain prefix: anything starting with "resep acak" asks for a random recipe.
fn match_random_recipe(text: &str) -> Option<Intent> {
    text.starts_with("resep acak").then_some(Intent::RandomRecipe)
}

fn match_recipe_search(text: &str) -> Option<Intent> {
    keyword_argument(text, "resep").map(|query| Intent::RecipeSearch {
        query: query.to_string(),
    })
}

fn match_playlist_search(text: &str) -> Option<Intent> {
    keyword_argument(text, "playlist").map(|query| Intent::PlaylistSearch {
        query: query.to_string(),
    })
}

fn match_media_search(text: &str) -> Option<Intent> {
    keyword_argument(text, "musik").map(|query| Intent::MediaSearch {
        query: query.to_string(),
    })
}

fn match_tracking_lookup(text: &str) -> Option<Intent> {
    let caps = tracking_pattern().captures(text)?;
    Some(Intent::TrackingLookup {
        courier_code: caps[1].to_string(),
        tracking_number: caps[2].to_string(),
    })
}

fn match_tracking_invalid(text: &str) -> Option<Intent> {
    text.starts_with(TRACKING_PREFIX)
        .then_some(Intent::TrackingInvalidFormat)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_raw(raw: &str) -> Intent {
        classify(&normalize(raw))
    }

    #[test]
    fn weather_takes_trimmed_city() {
        assert_eq!(
            classify_raw("  Cuaca   Jakarta Selatan "),
            Intent::Weather {
                city: "jakarta selatan".to_string()
            }
        );
    }

    #[test]
    fn bare_weather_keyword_has_empty_city() {
        assert_eq!(
            classify_raw("cuaca"),
            Intent::Weather {
                city: String::new()
            }
        );
        assert_eq!(
            classify_raw("cuaca   "),
            Intent::Weather {
                city: String::new()
            }
        );
    }

    #[test]
    fn argument_keywords_end_at_word_boundary() {
        assert_eq!(classify_raw("cuacanya gimana"), Intent::Conversational);
        assert_eq!(classify_raw("resepnya apa"), Intent::Conversational);
        assert_eq!(classify_raw("playlists"), Intent::Conversational);
    }

    #[test]
    fn random_recipe_is_a_plain_prefix() {
        assert_eq!(classify_raw("resep acakan"), Intent::RandomRecipe);
        assert_eq!(classify_raw("resep acak2"), Intent::RandomRecipe);
    }

    #[test]
    fn random_recipe_wins_over_recipe_search() {
        assert_eq!(classify_raw("Resep Acak"), Intent::RandomRecipe);
        assert_eq!(classify_raw("resep acak dong"), Intent::RandomRecipe);
        assert_eq!(
            classify_raw("resep rendang"),
            Intent::RecipeSearch {
                query: "rendang".to_string()
            }
        );
    }

    #[test]
    fn music_prefixes() {
        assert_eq!(
            classify_raw("playlist lofi"),
            Intent::PlaylistSearch {
                query: "lofi".to_string()
            }
        );
        assert_eq!(
            classify_raw("musik dewa 19"),
            Intent::MediaSearch {
                query: "dewa 19".to_string()
            }
        );
    }

    #[test]
    fn tracking_with_two_tokens() {
        assert_eq!(
            classify_raw("cek resi jne 123"),
            Intent::TrackingLookup {
                courier_code: "jne".to_string(),
                tracking_number: "123".to_string()
            }
        );
        assert_eq!(
            classify_raw("CEK RESI  sicepat   ABC123"),
            Intent::TrackingLookup {
                courier_code: "sicepat".to_string(),
                tracking_number: "abc123".to_string()
            }
        );
    }

    #[test]
    fn tracking_wrong_shape_is_invalid_format_not_conversational() {
        assert_eq!(classify_raw("cek resi"), Intent::TrackingInvalidFormat);
        assert_eq!(classify_raw("cek resi jne"), Intent::TrackingInvalidFormat);
        assert_eq!(
            classify_raw("cek resi jne 123 456"),
            Intent::TrackingInvalidFormat
        );
    }

    #[test]
    fn anything_else_is_conversational() {
        assert_eq!(classify_raw("halo bot, apa kabar?"), Intent::Conversational);
        assert_eq!(classify_raw(""), Intent::Conversational);
    }

    #[test]
    fn classification_is_idempotent() {
        for raw in ["cuaca bandung", "cek resi", "resep acak", "hai"] {
            let text = normalize(raw);
            assert_eq!(classify(&text), classify(&text));
        }
    }
}

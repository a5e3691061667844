//! Weather intent: condition classifier and reply formatting.

use crate::adapters::{ApiErrorKind, WeatherAdapter, WeatherReport};

const FEATURE: &str = "cuaca";
const MISSING_CITY_REPLY: &str = "Sebutin nama kotanya dulu ya, contoh: cuaca jakarta";

/// Emoji and canonical Indonesian phrase for a weather description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub emoji: &'static str,
    pub phrase: &'static str,
}

struct Bucket {
    keywords: &'static [&'static str],
    emoji: &'static str,
    phrase: &'static str,
}

/// Checked top to bottom; the first bucket with a keyword contained in the description wins.
/// Keywords cover the provider's Indonesian (lang=id) and English vocabularies.
const BUCKETS: &[Bucket] = &[
    Bucket {
        keywords: &["badai", "petir", "guntur", "thunder", "storm"],
        emoji: "⛈️",
        phrase: "badai petir",
    },
    Bucket {
        keywords: &["salju", "snow", "sleet"],
        emoji: "❄️",
        phrase: "bersalju",
    },
    Bucket {
        keywords: &[
            "lebat",
            "deras",
            "heavy intensity rain",
            "heavy rain",
            "extreme rain",
            "torrential",
        ],
        emoji: "🌧️",
        phrase: "hujan lebat",
    },
    Bucket {
        keywords: &["hujan", "gerimis", "rain", "drizzle", "shower"],
        emoji: "🌦️",
        phrase: "hujan ringan",
    },
    Bucket {
        keywords: &[
            "kabut", "asap", "debu", "fog", "mist", "haze", "smoke", "dust",
        ],
        emoji: "🌫️",
        phrase: "berkabut",
    },
    Bucket {
        keywords: &[
            "mendung",
            "awan pecah",
            "awan tebal",
            "overcast",
            "broken clouds",
        ],
        emoji: "☁️",
        phrase: "mendung",
    },
    Bucket {
        keywords: &["berawan", "awan", "cloud"],
        emoji: "⛅",
        phrase: "berawan",
    },
    Bucket {
        keywords: &["cerah", "clear", "sunny"],
        emoji: "☀️",
        phrase: "cerah",
    },
];

const UNKNOWN: Condition = Condition {
    emoji: "🌡️",
    phrase: "kondisi tidak diketahui",
};

/// Classify a free-text description. Unrecognized text maps to the unknown bucket.
pub fn classify_condition(description: &str) -> Condition {
    let description = description.to_lowercase();
    BUCKETS
        .iter()
        .find(|b| b.keywords.iter().any(|k| description.contains(k)))
        .map(|b| Condition {
            emoji: b.emoji,
            phrase: b.phrase,
        })
        .unwrap_or(UNKNOWN)
}

/// `Di {city} {emoji} {phrase}. Suhu {temp}°C.` with the temperature rounded to whole degrees.
pub fn format_report(report: &WeatherReport, requested_city: &str) -> String {
    let condition = classify_condition(&report.description);
    let city = if report.name.trim().is_empty() {
        requested_city
    } else {
        report.name.as_str()
    };
    format!(
        "Di {} {} {}. Suhu {}°C.",
        city,
        condition.emoji,
        condition.phrase,
        report.temp_c.round() as i64
    )
}

pub async fn handle(adapter: &dyn WeatherAdapter, city: &str) -> String {
    if !adapter.is_configured() {
        return super::not_configured(FEATURE);
    }
    if city.is_empty() {
        return MISSING_CITY_REPLY.to_string();
    }
    match adapter.lookup(city).await {
        Ok(report) => format_report(&report, city),
        Err(e) => {
            log::warn!("weather lookup for {} failed: {}", city, e);
            match e.kind {
                ApiErrorKind::NotFound => {
                    format!("Maaf, kota \"{}\" nggak ketemu. Cek lagi ejaannya ya.", city)
                }
                kind => super::apology(FEATURE, kind),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{jakarta, Fake};

    #[test]
    fn heavy_rain_bucket() {
        let c = classify_condition("hujan lebat");
        assert_eq!(c.emoji, "🌧️");
        assert_eq!(c.phrase, "hujan lebat");
    }

    #[test]
    fn unrecognized_description_is_unknown() {
        let c = classify_condition("xyz-unrecognized");
        assert_eq!(c.emoji, "🌡️");
        assert_eq!(c.phrase, "kondisi tidak diketahui");
        assert_eq!(classify_condition(""), UNKNOWN);
    }

    #[test]
    fn provider_vocabulary_lands_in_expected_buckets() {
        assert_eq!(classify_condition("badai petir dengan hujan lebat").phrase, "badai petir");
        assert_eq!(classify_condition("awan mendung").phrase, "mendung");
        assert_eq!(classify_condition("sedikit berawan").phrase, "berawan");
        assert_eq!(classify_condition("Light Rain").phrase, "hujan ringan");
        assert_eq!(classify_condition("hujan sedang").phrase, "hujan ringan");
        assert_eq!(classify_condition("langit cerah").phrase, "cerah");
        assert_eq!(classify_condition("mist").phrase, "berkabut");
        assert_eq!(classify_condition("heavy snow").phrase, "bersalju");
        assert_eq!(classify_condition("scattered clouds").phrase, "berawan");
        assert_eq!(classify_condition("overcast clouds").phrase, "mendung");
    }

    #[tokio::test]
    async fn success_reply_template() {
        let adapter = Fake::ok(jakarta("cerah"));
        assert_eq!(
            handle(&adapter, "jakarta").await,
            "Di Jakarta ☀️ cerah. Suhu 30°C."
        );
        assert_eq!(adapter.calls(), 1);
    }

    #[tokio::test]
    async fn empty_city_asks_without_calling() {
        let adapter = Fake::ok(jakarta("cerah"));
        assert_eq!(handle(&adapter, "").await, MISSING_CITY_REPLY);
        assert_eq!(adapter.calls(), 0);
    }

    #[tokio::test]
    async fn unconfigured_adapter_is_never_called() {
        let adapter: Fake<WeatherReport> = Fake::unconfigured();
        assert_eq!(handle(&adapter, "jakarta").await, super::super::not_configured(FEATURE));
        assert_eq!(adapter.calls(), 0);
    }

    #[tokio::test]
    async fn errors_map_to_distinct_replies() {
        let failing = |kind| Fake::<WeatherReport>::err(kind);
        let not_found = handle(&failing(ApiErrorKind::NotFound), "atlantis").await;
        let unauthorized = handle(&failing(ApiErrorKind::Unauthorized), "x").await;
        let network = handle(&failing(ApiErrorKind::Network), "x").await;
        assert!(not_found.contains("atlantis"));
        assert_ne!(unauthorized, network);
        assert!(!network.contains("fake provider failure"));
    }

    #[test]
    fn blank_provider_name_falls_back_to_requested_city() {
        let mut report = jakarta("clear sky");
        report.name = String::new();
        report.temp_c = 27.6;
        assert_eq!(format_report(&report, "depok"), "Di depok ☀️ cerah. Suhu 28°C.");
    }
}

//! Intent classification and per-intent handlers.
//!
//! [`classify`] runs the matcher table over normalized text; the dispatcher then hands the
//! parsed [`Intent`] to the matching handler module. Handlers turn adapter results into one
//! reply string and never propagate adapter errors.

mod matcher;
pub mod music;
pub mod recipe;
pub mod tracking;
pub mod weather;

pub use matcher::{classify, normalize};

use crate::adapters::ApiErrorKind;

/// Classified purpose of one inbound message with its parsed arguments.
/// Arguments come from normalized (lower-cased, trimmed) text; an empty argument is kept
/// so the handler can ask for it instead of calling the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Weather { city: String },
    RandomRecipe,
    RecipeSearch { query: String },
    PlaylistSearch { query: String },
    MediaSearch { query: String },
    TrackingLookup {
        courier_code: String,
        tracking_number: String,
    },
    /// Starts with "cek resi" but is not exactly `cek resi <courier> <number>`.
    TrackingInvalidFormat,
    Conversational,
}

impl Intent {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Weather { .. } => "weather",
            Intent::RandomRecipe => "random-recipe",
            Intent::RecipeSearch { .. } => "recipe-search",
            Intent::PlaylistSearch { .. } => "playlist-search",
            Intent::MediaSearch { .. } => "media-search",
            Intent::TrackingLookup { .. } => "tracking-lookup",
            Intent::TrackingInvalidFormat => "tracking-invalid-format",
            Intent::Conversational => "conversational",
        }
    }
}

/// Apology for a failed provider call, one sentence per error kind.
/// `feature` names the capability in the sentence (e.g. "cuaca").
/// Handlers that can say something more specific for NotFound do so themselves.
pub(crate) fn apology(feature: &str, kind: ApiErrorKind) -> String {
    match kind {
        ApiErrorKind::NotConfigured => not_configured(feature),
        ApiErrorKind::Unauthorized => format!(
            "Maaf, kunci API layanan {} ditolak. Silakan hubungi admin.",
            feature
        ),
        ApiErrorKind::NotFound => format!("Maaf, data {} yang kamu cari tidak ditemukan.", feature),
        ApiErrorKind::Network => format!(
            "Maaf, layanan {} sedang tidak bisa dihubungi. Coba lagi nanti ya.",
            feature
        ),
        ApiErrorKind::Unexpected => format!(
            "Maaf, terjadi gangguan teknis pada layanan {}. Coba lagi nanti ya.",
            feature
        ),
    }
}

/// Reply when the feature's credential is absent or its adapter is not ready.
pub(crate) fn not_configured(feature: &str) -> String {
    format!("Maaf, fitur {} belum dikonfigurasi. Silakan hubungi admin.", feature)
}

//! Music intents: playlist search and track/album/artist search.

use crate::adapters::{ApiErrorKind, MediaResults, MediaType, MusicAdapter, Playlist};

const FEATURE: &str = "musik";
const MAX_ENTRIES: usize = 3;
const MISSING_PLAYLIST_QUERY_REPLY: &str = "Mau playlist apa? Contoh: playlist lofi";
const MISSING_MEDIA_QUERY_REPLY: &str = "Mau cari lagu apa? Contoh: musik dewa 19";

/// Title line, up to three numbered playlists, then a link to the top playlist.
pub fn format_playlists(query: &str, playlists: &[Playlist]) -> String {
    let mut out = format!("🎧 Playlist \"{}\":", query);
    for (i, p) in playlists.iter().take(MAX_ENTRIES).enumerate() {
        out.push_str(&format!("\n{}. {}", i + 1, p.name));
        if let Some(owner) = p.owner.as_deref() {
            out.push_str(&format!(" oleh {}", owner));
        }
        if let Some(n) = p.track_count {
            out.push_str(&format!(" ({} lagu)", n));
        }
    }
    if let Some(url) = playlists.iter().take(MAX_ENTRIES).find_map(|p| p.url.as_deref()) {
        out.push_str("\n🔗 ");
        out.push_str(url);
    }
    out
}

/// Title line, top track/album/artist (whichever exist), then a link to the first of them.
pub fn format_media(query: &str, results: &MediaResults) -> String {
    let mut out = format!("🎵 Hasil pencarian \"{}\":", query);
    let track = results.tracks.first();
    let album = results.albums.first();
    let artist = results.artists.first();
    if let Some(t) = track {
        out.push_str(&format!("\nLagu: {}", t.name));
        if !t.artists.is_empty() {
            out.push_str(&format!(" - {}", t.artists.join(", ")));
        }
    }
    if let Some(a) = album {
        out.push_str(&format!("\nAlbum: {}", a.name));
        if !a.artists.is_empty() {
            out.push_str(&format!(" - {}", a.artists.join(", ")));
        }
    }
    if let Some(a) = artist {
        out.push_str(&format!("\nArtis: {}", a.name));
    }
    let link = track
        .and_then(|t| t.url.as_deref())
        .or_else(|| album.and_then(|a| a.url.as_deref()))
        .or_else(|| artist.and_then(|a| a.url.as_deref()));
    if let Some(url) = link {
        out.push_str("\n🔗 ");
        out.push_str(url);
    }
    out
}

fn is_empty(results: &MediaResults) -> bool {
    results.tracks.is_empty() && results.albums.is_empty() && results.artists.is_empty()
}

fn not_found_reply(query: &str) -> String {
    format!("Maaf, \"{}\" nggak ketemu di Spotify.", query)
}

fn failure_reply(query: &str, kind: ApiErrorKind) -> String {
    match kind {
        ApiErrorKind::NotFound => not_found_reply(query),
        kind => super::apology(FEATURE, kind),
    }
}

pub async fn handle_playlists(adapter: &dyn MusicAdapter, query: &str) -> String {
    if !adapter.is_configured() {
        return super::not_configured(FEATURE);
    }
    if query.is_empty() {
        return MISSING_PLAYLIST_QUERY_REPLY.to_string();
    }
    match adapter.search_playlists(query).await {
        Ok(playlists) if playlists.is_empty() => not_found_reply(query),
        Ok(playlists) => format_playlists(query, &playlists),
        Err(e) => {
            log::warn!("playlist search for {} failed: {}", query, e);
            failure_reply(query, e.kind)
        }
    }
}

pub async fn handle_media(adapter: &dyn MusicAdapter, query: &str) -> String {
    if !adapter.is_configured() {
        return super::not_configured(FEATURE);
    }
    if query.is_empty() {
        return MISSING_MEDIA_QUERY_REPLY.to_string();
    }
    let types = [MediaType::Track, MediaType::Album, MediaType::Artist];
    match adapter.search(query, &types).await {
        Ok(results) if is_empty(&results) => not_found_reply(query),
        Ok(results) => format_media(query, &results),
        Err(e) => {
            log::warn!("media search for {} failed: {}", query, e);
            failure_reply(query, e.kind)
        }
    }
}

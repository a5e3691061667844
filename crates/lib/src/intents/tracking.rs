//! Package-tracking intent ("cek resi <courier> <number>").

use chrono::{DateTime, FixedOffset, NaiveDateTime};

use crate::adapters::{ApiErrorKind, TrackingAdapter, TrackingInfo};

const FEATURE: &str = "cek resi";
const MAX_HISTORY: usize = 5;

/// Reply for text that starts with "cek resi" but has the wrong shape.
pub const INVALID_FORMAT_REPLY: &str =
    "Format salah. Pakai: cek resi <kode_kurir> <nomor_resi>\nContoh: cek resi jne 1234567890";

/// WIB, UTC+7.
const LOCAL_OFFSET_SECS: i32 = 7 * 3600;

/// Render a provider timestamp in WIB as `DD-MM-YYYY HH:MM`. Naive timestamps are taken as
/// already local; RFC 3339 ones are converted. Anything else is returned unchanged.
pub fn local_timestamp(raw: &str) -> String {
    let raw = raw.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return naive.format("%d-%m-%Y %H:%M").to_string();
        }
    }
    if let (Ok(parsed), Some(offset)) = (
        DateTime::parse_from_rfc3339(raw),
        FixedOffset::east_opt(LOCAL_OFFSET_SECS),
    ) {
        return parsed
            .with_timezone(&offset)
            .format("%d-%m-%Y %H:%M")
            .to_string();
    }
    raw.to_string()
}

/// Shipment status: top-level status first, then the newest history entry's status,
/// then the newest history entry's message.
pub fn effective_status(info: &TrackingInfo) -> Option<&str> {
    let newest = info.histories.first();
    info.status
        .as_deref()
        .or_else(|| newest.and_then(|h| h.status.as_deref()))
        .or_else(|| newest.map(|h| h.message.as_str()))
        .filter(|s| !s.trim().is_empty())
}

/// Status, courier, last status, update time, then at most five history lines (newest first).
pub fn format_tracking(info: &TrackingInfo) -> String {
    let newest = info.histories.first();
    let status = effective_status(info).unwrap_or("-");
    let courier = match info.service.as_deref() {
        Some(service) => format!("{} ({})", info.courier, service),
        None => info.courier.clone(),
    };
    let last_status = newest.map(|h| h.message.as_str()).unwrap_or("-");
    let updated = info
        .last_updated
        .as_deref()
        .or_else(|| newest.map(|h| h.date.as_str()))
        .map(local_timestamp)
        .unwrap_or_else(|| "-".to_string());

    let mut out = format!(
        "📦 Status: {}\n🚚 Kurir: {} | Resi: {}\n📍 Status terakhir: {}\n🕒 Update: {}",
        status, courier, info.awb, last_status, updated
    );
    if !info.histories.is_empty() {
        out.push_str("\n\nRiwayat:");
        for h in info.histories.iter().take(MAX_HISTORY) {
            out.push_str(&format!("\n• [{}] {}", local_timestamp(&h.date), h.message));
        }
        if info.histories.len() > MAX_HISTORY {
            out.push_str("\n(dan riwayat lainnya)");
        }
    }
    out
}

fn failure_reply(tracking_number: &str, kind: ApiErrorKind) -> String {
    match kind {
        ApiErrorKind::NotFound => format!(
            "Maaf, resi {} nggak ketemu. Cek lagi kode kurir dan nomornya ya.",
            tracking_number
        ),
        kind => super::apology(FEATURE, kind),
    }
}

/// Tracking numbers are sent upper-cased; matching lower-cased the whole message.
pub async fn handle(
    adapter: &dyn TrackingAdapter,
    courier_code: &str,
    tracking_number: &str,
) -> String {
    if !adapter.is_configured() {
        return super::not_configured(FEATURE);
    }
    if courier_code.is_empty() || tracking_number.is_empty() {
        return INVALID_FORMAT_REPLY.to_string();
    }
    let tracking_number = tracking_number.to_uppercase();
    match adapter.lookup(courier_code, &tracking_number).await {
        Ok(info) => format_tracking(&info),
        Err(e) => {
            log::warn!(
                "tracking lookup {} {} failed: {}",
                courier_code,
                tracking_number,
                e
            );
            failure_reply(&tracking_number, e.kind)
        }
    }
}

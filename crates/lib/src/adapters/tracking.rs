//! BinderByte package-tracking client (`/v1/track`).

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use std::time::Duration;

use crate::adapters::error::{AdapterResult, ApiError, ApiErrorKind};
use crate::adapters::http::{http_client, DEFAULT_REQUEST_TIMEOUT};

const DEFAULT_BASE_URL: &str = "https://api.binderbyte.com";

/// One history entry; the provider returns these newest-first.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingHistory {
    /// Provider timestamp, usually `YYYY-MM-DD HH:MM:SS` in WIB.
    pub date: String,
    pub message: String,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackingInfo {
    pub awb: String,
    /// Courier display name (e.g. "JNE"), falling back to the requested code.
    pub courier: String,
    pub service: Option<String>,
    /// Top-level shipment status, when the provider supplies one.
    pub status: Option<String>,
    pub last_updated: Option<String>,
    pub histories: Vec<TrackingHistory>,
}

#[async_trait]
pub trait TrackingAdapter: Send + Sync {
    fn is_configured(&self) -> bool;
    async fn lookup(
        &self,
        courier_code: &str,
        tracking_number: &str,
    ) -> AdapterResult<TrackingInfo>;
}

#[derive(Clone)]
pub struct BinderByteClient {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TrackResponse {
    #[serde(default)]
    status: Option<u16>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<TrackData>,
}

#[derive(Debug, Deserialize)]
struct TrackData {
    #[serde(default)]
    summary: Option<Summary>,
    #[serde(default)]
    history: Vec<RawHistory>,
}

#[derive(Debug, Deserialize)]
struct Summary {
    #[serde(default)]
    awb: Option<String>,
    #[serde(default)]
    courier: Option<String>,
    #[serde(default)]
    service: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawHistory {
    #[serde(default)]
    date: String,
    #[serde(default)]
    desc: String,
    #[serde(default)]
    status: Option<String>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// BinderByte also reports failures in the body `status`; classify those like HTTP statuses.
fn classify(code: u16, message: Option<String>) -> ApiError {
    let message = message.unwrap_or_default();
    match StatusCode::from_u16(code) {
        Ok(StatusCode::BAD_REQUEST) => ApiError::new(ApiErrorKind::NotFound, message),
        Ok(status) => ApiError::from_status(status, message),
        Err(_) => ApiError::new(ApiErrorKind::Unexpected, message),
    }
}

impl BinderByteClient {
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

#[async_trait]
impl TrackingAdapter for BinderByteClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// GET /v1/track?api_key=..&courier=..&awb=..
    async fn lookup(
        &self,
        courier_code: &str,
        tracking_number: &str,
    ) -> AdapterResult<TrackingInfo> {
        let key = self.api_key.as_deref().ok_or_else(ApiError::not_configured)?;
        let url = format!("{}/v1/track", self.base_url);
        let res = self
            .client
            .get(&url)
            .query(&[
                ("api_key", key),
                ("courier", courier_code),
                ("awb", tracking_number),
            ])
            .send()
            .await?;
        let http_status = res.status();
        let body = res.text().await?;
        let parsed: Option<TrackResponse> = serde_json::from_str(&body).ok();
        if !http_status.is_success() {
            return Err(match parsed {
                Some(r) => classify(http_status.as_u16(), r.message),
                None => classify(http_status.as_u16(), Some(body)),
            });
        }
        let parsed = parsed.ok_or_else(|| {
            ApiError::new(ApiErrorKind::Unexpected, "tracking response is not valid JSON")
        })?;
        if let Some(code) = parsed.status.filter(|c| *c != 200) {
            return Err(classify(code, parsed.message));
        }
        let data = parsed
            .data
            .ok_or_else(|| {
                ApiError::new(ApiErrorKind::Unexpected, "tracking response has no data")
            })?;
        let summary = data.summary;
        let (awb, courier, service, status, last_updated) = match summary {
            Some(s) => (
                non_empty(s.awb),
                non_empty(s.courier),
                non_empty(s.service),
                non_empty(s.status),
                non_empty(s.date),
            ),
            None => (None, None, None, None, None),
        };
        Ok(TrackingInfo {
            awb: awb.unwrap_or_else(|| tracking_number.to_string()),
            courier: courier.unwrap_or_else(|| courier_code.to_uppercase()),
            service,
            status,
            last_updated,
            histories: data
                .history
                .into_iter()
                .map(|h| TrackingHistory {
                    date: h.date,
                    message: h.desc,
                    status: non_empty(h.status),
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn lookup_maps_summary_and_history() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/track")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("courier".into(), "jne".into()),
                Matcher::UrlEncoded("awb".into(), "123".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"status":200,"message":"Successfully tracked package","data":{
                    "summary":{"awb":"123","courier":"JNE","service":"REG",
                               "status":"DELIVERED","date":"2024-03-02 20:03:00"},
                    "history":[
                        {"date":"2024-03-02 20:03:00","desc":"DELIVERED TO [BUDI]","location":""},
                        {"date":"2024-03-01 08:00:00","desc":"WITH DELIVERY COURIER","location":""}
                    ]}}"#,
            )
            .create_async()
            .await;

        let client = BinderByteClient::new(Some("k".to_string()), Some(server.url()));
        let info = client.lookup("jne", "123").await.unwrap();
        assert_eq!(info.courier, "JNE");
        assert_eq!(info.status.as_deref(), Some("DELIVERED"));
        assert_eq!(info.histories.len(), 2);
        assert_eq!(info.histories[0].message, "DELIVERED TO [BUDI]");
    }

    #[tokio::test]
    async fn invalid_awb_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/track")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"status":400,"message":"Invalid AWB"}"#)
            .create_async()
            .await;

        let client = BinderByteClient::new(Some("k".to_string()), Some(server.url()));
        let err = client.lookup("jne", "000").await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::NotFound);
        assert_eq!(err.message.as_deref(), Some("Invalid AWB"));
    }

    #[tokio::test]
    async fn bad_key_in_body_status_is_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/track")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status":401,"message":"Invalid API key"}"#)
            .create_async()
            .await;

        let client = BinderByteClient::new(Some("bad".to_string()), Some(server.url()));
        let err = client.lookup("jne", "123").await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Unauthorized);
    }
}

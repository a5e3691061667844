//! Integration test: serve the gateway on a local listener and drive the LINE webhook over HTTP.
//! The LINE reply API is a local mock server. Gateway state is built directly, so credentials in
//! the environment (LINE_CHANNEL_SECRET, SPOTIFY_CLIENT_ID, ...) do not change the outcome and
//! no provider is contacted. The server task is left running when each test ends.

use base64::Engine;
use hmac::{Hmac, Mac};
use linebot::adapters::{
    BinderByteClient, OpenWeatherClient, SpoonacularClient, SpotifyClient,
    DEFAULT_REQUEST_TIMEOUT,
};
use linebot::channels::LineChannel;
use linebot::config::Config;
use linebot::dispatcher::{Adapters, Dispatcher};
use linebot::gateway::{self, GatewayState};
use linebot::intents::tracking::INVALID_FORMAT_REPLY;
use linebot::llm::{ChatCompletionsClient, FallbackChain, SamplingParams};
use mockito::Matcher;
use sha2::Sha256;
use std::sync::Arc;
use std::time::Duration;

const SECRET: &str = "test-channel-secret";

fn sign(body: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).expect("hmac key");
    mac.update(body.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

fn text_event_body(reply_token: &str, text: &str) -> String {
    serde_json::json!({
        "destination": "U0",
        "events": [{
            "type": "message",
            "replyToken": reply_token,
            "message": { "type": "text", "id": "1", "text": text }
        }]
    })
    .to_string()
}

/// Dispatcher whose adapters and model backend have no credentials: every intent answers
/// without a network call.
async fn offline_dispatcher() -> Dispatcher {
    let adapters = Adapters {
        weather: Arc::new(OpenWeatherClient::new(None, None)),
        recipe: Arc::new(SpoonacularClient::new(None, None)),
        music: Arc::new(SpotifyClient::connect(None, None, None, DEFAULT_REQUEST_TIMEOUT).await),
        tracking: Arc::new(BinderByteClient::new(None, None)),
    };
    let params = SamplingParams {
        temperature: 0.8,
        top_p: 0.1,
        max_tokens: 64,
    };
    let llm = Arc::new(ChatCompletionsClient::new(None, None, params));
    Dispatcher::new(adapters, FallbackChain::new(llm, Vec::new(), "sys"))
}

/// Serve the gateway on a free port and wait until GET / answers. Returns the base URL.
async fn start_gateway(line_api: String) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind free port");
    let port = listener.local_addr().expect("local_addr").port();
    let mut config = Config::default();
    config.gateway.port = port;
    let state = GatewayState {
        config: Arc::new(config),
        channel_secret: Some(SECRET.to_string()),
        dispatcher: Arc::new(offline_dispatcher().await),
        channel: Arc::new(LineChannel::new(Some("line-token".to_string()), Some(line_api))),
    };

    tokio::spawn(async move {
        let _ = gateway::serve(listener, state).await;
    });

    let base = format!("http://127.0.0.1:{}", port);
    let client = reqwest::Client::new();
    for _ in 0..100 {
        if let Ok(resp) = client.get(format!("{}/", base)).send().await {
            if resp.status().is_success() {
                let json: serde_json::Value = resp.json().await.expect("parse JSON");
                assert_eq!(json.get("runtime").and_then(|v| v.as_str()), Some("running"));
                assert_eq!(json.get("port").and_then(|v| v.as_u64()), Some(port as u64));
                return base;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("gateway on port {} did not become healthy within 5s", port);
}

#[tokio::test]
async fn webhook_rejects_wrong_method_and_bad_signature() {
    let line = mockito::Server::new_async().await;
    let base = start_gateway(line.url()).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/webhook", base))
        .send()
        .await
        .expect("GET /webhook");
    assert_eq!(resp.status().as_u16(), 405);

    let body = text_event_body("r1", "halo");
    let resp = client
        .post(format!("{}/webhook", base))
        .header("x-line-signature", "bm90LWEtc2lnbmF0dXJl")
        .body(body.clone())
        .send()
        .await
        .expect("POST bad signature");
    assert_eq!(resp.status().as_u16(), 400);
    assert_eq!(resp.text().await.unwrap(), "Invalid signature.");

    let resp = client
        .post(format!("{}/webhook", base))
        .body(body)
        .send()
        .await
        .expect("POST without signature");
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn malformed_body_with_valid_signature_is_server_error() {
    let line = mockito::Server::new_async().await;
    let base = start_gateway(line.url()).await;

    let body = r#"{"destination":"U0"}"#;
    let resp = reqwest::Client::new()
        .post(format!("{}/webhook", base))
        .header("x-line-signature", sign(body))
        .body(body)
        .send()
        .await
        .expect("POST malformed");
    assert_eq!(resp.status().as_u16(), 500);
    assert!(resp.text().await.unwrap().starts_with("Internal Server Error"));
}

#[tokio::test]
async fn bare_tracking_command_gets_format_help_reply() {
    let mut line = mockito::Server::new_async().await;
    let reply = line
        .mock("POST", "/v2/bot/message/reply")
        .match_header("authorization", "Bearer line-token")
        .match_body(Matcher::Json(serde_json::json!({
            "replyToken": "reply-1",
            "messages": [{ "type": "text", "text": INVALID_FORMAT_REPLY }]
        })))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;
    let base = start_gateway(line.url()).await;

    let body = text_event_body("reply-1", "Cek Resi");
    let resp = reqwest::Client::new()
        .post(format!("{}/webhook", base))
        .header("x-line-signature", sign(&body))
        .body(body)
        .send()
        .await
        .expect("POST webhook");
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
    reply.assert_async().await;
}

#[tokio::test]
async fn failed_delivery_still_acknowledges() {
    let mut line = mockito::Server::new_async().await;
    line.mock("POST", "/v2/bot/message/reply")
        .with_status(400)
        .with_body(r#"{"message":"Invalid reply token"}"#)
        .create_async()
        .await;
    let base = start_gateway(line.url()).await;

    let body = text_event_body("expired", "cek resi");
    let resp = reqwest::Client::new()
        .post(format!("{}/webhook", base))
        .header("x-line-signature", sign(&body))
        .body(body)
        .send()
        .await
        .expect("POST webhook");
    assert_eq!(resp.status().as_u16(), 200);
}

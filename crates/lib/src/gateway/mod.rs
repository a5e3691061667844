//! Gateway: HTTP server receiving LINE webhooks.
//!
//! Single port serves a health probe and `POST /webhook`. Each request is handled to completion
//! (dispatch and reply for every text message) before the response is returned.

mod server;

pub use server::{router, run_gateway, serve, GatewayState};

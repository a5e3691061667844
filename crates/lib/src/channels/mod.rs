//! Messaging channel (LINE).
//!
//! Webhook payload parsing and signature checks for inbound events, and the reply call used to
//! deliver exactly one answer per inbound text message.

mod inbound;
mod line;

pub use inbound::InboundMessage;
pub use line::{
    verify_signature, ChannelError, EventMessage, LineChannel, ReplyChannel, WebhookBody,
    WebhookEvent,
};

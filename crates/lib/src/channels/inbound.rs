//! Inbound message from LINE: delivered to the dispatcher, then answered once via its reply token.

/// One text message extracted from a webhook event. Consumed once; not retained after the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Single-use token for the reply API.
    pub reply_token: String,
    pub text: String,
}

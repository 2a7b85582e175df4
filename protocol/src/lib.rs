use thiserror::Error;

pub mod client;
pub mod server;

pub use client::ClientEvent;
pub use server::{ServerEvent, decode_server_event};

use serde::{Deserialize, Serialize};

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid event format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Unknown event: {0}")]
    UnknownEvent(String),
}

/// What a message body carries, as tagged on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
}

impl ContentKind {
    pub fn is_image(self) -> bool {
        matches!(self, ContentKind::Image)
    }
}

/// The message shape shared by outbound sends and inbound deliveries.
///
/// `message` is the literal text for `ContentKind::Text` and a data URL for
/// `ContentKind::Image`. The timestamp is stamped by the server, so it is
/// absent on outbound sends and present (RFC 3339) on inbound deliveries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub username: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

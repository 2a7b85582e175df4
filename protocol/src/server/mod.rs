mod tests;

use crate::{MessagePayload, ProtocolError};
use anyhow::Result;
use serde_json::Value;

/// Events the server pushes over the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// One freshly delivered chat message (text or image).
    NewMessage(MessagePayload),

    /// History replay on join, ordered oldest first.
    LoadMessages(Vec<MessagePayload>),

    /// Server-originated notice (user joined/left and the like).
    SystemMessage(String),
}

/// Parse a complete websocket text frame into a server event.
///
/// Frames are JSON envelopes of the form `{"event": NAME, "data": PAYLOAD}`.
pub fn decode_server_event(frame: &str) -> Result<ServerEvent> {
    let value: Value = serde_json::from_str(frame)
        .map_err(|e| ProtocolError::InvalidFormat(e.to_string()))?;

    let event = value
        .get("event")
        .and_then(Value::as_str)
        .ok_or_else(|| ProtocolError::MissingField("event".to_string()))?;

    let data = value.get("data").cloned().unwrap_or(Value::Null);

    match event {
        "new_message" => parse_new_message(data),
        "load_messages" => parse_load_messages(data),
        "system_message" => parse_system_message(data),
        other => Err(ProtocolError::UnknownEvent(other.to_string()).into()),
    }
}

fn parse_new_message(data: Value) -> Result<ServerEvent> {
    let payload: MessagePayload = serde_json::from_value(data)
        .map_err(|e| ProtocolError::InvalidFormat(format!("new_message payload: {}", e)))?;

    Ok(ServerEvent::NewMessage(payload))
}

fn parse_load_messages(data: Value) -> Result<ServerEvent> {
    // Order matters: the JSON array order is the display order.
    let payloads: Vec<MessagePayload> = serde_json::from_value(data)
        .map_err(|e| ProtocolError::InvalidFormat(format!("load_messages payload: {}", e)))?;

    Ok(ServerEvent::LoadMessages(payloads))
}

fn parse_system_message(data: Value) -> Result<ServerEvent> {
    let text = data
        .as_str()
        .ok_or_else(|| ProtocolError::InvalidFormat("system_message must be a string".to_string()))?;

    Ok(ServerEvent::SystemMessage(text.to_string()))
}

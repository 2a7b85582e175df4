use serde_json::json;

use crate::MessagePayload;

/// Events that clients emit to the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Binds the connection to a username, sent once per established socket.
    RegisterUser { username: String },

    /// A chat message (text or image data URL).
    Message(MessagePayload),
}

impl ClientEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::RegisterUser { .. } => "register_user",
            Self::Message(_) => "message",
        }
    }

    /// Serialize to the wire envelope: `{"event": NAME, "data": PAYLOAD}`
    pub fn to_wire(&self) -> String {
        let data = match self {
            Self::RegisterUser { username } => json!({ "username": username }),
            Self::Message(payload) => {
                // Outbound payloads never carry a timestamp; the server stamps them.
                json!(payload)
            }
        };

        json!({ "event": self.name(), "data": data }).to_string()
    }
}

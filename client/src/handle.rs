use anyhow::{Result, anyhow};
use tokio::sync::mpsc;

use parlor_protocol::{ClientEvent, ContentKind, MessagePayload};

use crate::session::Session;

/// Cloneable handle for sending events over the channel.
///
/// This can be passed to handlers and cloned freely. Outbound messages are
/// stamped with the session username; the server adds the timestamp.
#[derive(Clone)]
pub struct ChatHandle {
    tx: mpsc::UnboundedSender<ClientEvent>,
    session: Session,
}

impl ChatHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<ClientEvent>, session: Session) -> Self {
        Self { tx, session }
    }

    pub fn send_event(&self, event: ClientEvent) -> Result<()> {
        self.tx.send(event).map_err(|_| anyhow!("Channel closed"))
    }

    fn send_message(&self, content: String, kind: ContentKind) -> Result<()> {
        let username = self
            .session
            .username()
            .ok_or_else(|| anyhow!("Not logged in"))?;

        self.send_event(ClientEvent::Message(MessagePayload {
            username,
            message: content,
            kind,
            timestamp: None,
        }))
    }

    /// Send a text message. Callers are expected to have screened empty
    /// input already (see [`crate::Composer`]).
    pub fn send_text(&self, text: &str) -> Result<()> {
        self.send_message(text.to_string(), ContentKind::Text)
    }

    /// Send an image as a data URL (see [`crate::load_image`]).
    pub fn send_image(&self, data_url: &str) -> Result<()> {
        self.send_message(data_url.to_string(), ContentKind::Image)
    }

    pub fn username(&self) -> Option<String> {
        self.session.username()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logged_in_handle() -> (ChatHandle, mpsc::UnboundedReceiver<ClientEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session::new();
        session.finish_login("ash".to_string());
        (ChatHandle::new(tx, session), rx)
    }

    #[test]
    fn test_send_text_stamps_session_username() {
        let (handle, mut rx) = logged_in_handle();
        handle.send_text("hello").unwrap();

        match rx.try_recv().unwrap() {
            ClientEvent::Message(payload) => {
                assert_eq!(payload.username, "ash");
                assert_eq!(payload.message, "hello");
                assert_eq!(payload.kind, ContentKind::Text);
                assert_eq!(payload.timestamp, None);
            }
            other => panic!("expected Message, got {:?}", other),
        }
    }

    #[test]
    fn test_send_image_carries_data_url() {
        let (handle, mut rx) = logged_in_handle();
        handle.send_image("data:image/png;base64,AAAA").unwrap();

        match rx.try_recv().unwrap() {
            ClientEvent::Message(payload) => {
                assert_eq!(payload.kind, ContentKind::Image);
                assert_eq!(payload.message, "data:image/png;base64,AAAA");
            }
            other => panic!("expected Message, got {:?}", other),
        }
    }

    #[test]
    fn test_send_on_dead_channel_errors() {
        let (handle, rx) = logged_in_handle();
        drop(rx);

        assert!(handle.send_text("hello").is_err());
    }
}

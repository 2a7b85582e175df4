use anyhow::Result;
use tokio::sync::mpsc;

use parlor_protocol::ServerEvent;

use crate::connection::ChannelEvent;
use crate::handler::ChatHandler;
use crate::session::Session;
use crate::view::ChatMessage;

/// Receives channel events and dispatches them to a handler.
pub struct Receiver {
    incoming: mpsc::Receiver<Result<ChannelEvent>>,
    session: Session,
}

impl Receiver {
    pub(crate) fn new(incoming: mpsc::Receiver<Result<ChannelEvent>>, session: Session) -> Self {
        Self { incoming, session }
    }

    /// Run the dispatch loop until the channel closes for good.
    ///
    /// Events reach the handler in arrival order. Session channel state is
    /// updated before the corresponding callback fires, so a handler that
    /// checks `is_connected()` sees the post-transition view.
    pub async fn run<H: ChatHandler>(&mut self, handler: &mut H) -> Result<()> {
        while let Some(item) = self.incoming.recv().await {
            match item {
                Ok(event) => self.dispatch(handler, event).await,
                Err(e) => {
                    self.session.channel_down();
                    handler.on_connect_error(&e.to_string()).await;
                    break;
                }
            }
        }
        Ok(())
    }

    async fn dispatch<H: ChatHandler>(&mut self, handler: &mut H, event: ChannelEvent) {
        match event {
            ChannelEvent::Connected => {
                self.session.channel_up();
                handler.on_connected().await;
            }
            ChannelEvent::Disconnected => {
                self.session.channel_down();
                handler.on_disconnected().await;
            }
            ChannelEvent::Event(event) => self.dispatch_server_event(handler, event).await,
        }
    }

    async fn dispatch_server_event<H: ChatHandler>(&self, handler: &mut H, event: ServerEvent) {
        let username = self.session.username().unwrap_or_default();

        match event {
            ServerEvent::NewMessage(payload) => {
                handler
                    .on_message(&ChatMessage::from_payload(payload, &username))
                    .await;
            }
            ServerEvent::LoadMessages(payloads) => {
                let messages: Vec<ChatMessage> = payloads
                    .into_iter()
                    .map(|payload| ChatMessage::from_payload(payload, &username))
                    .collect();
                handler.on_history(&messages).await;
            }
            ServerEvent::SystemMessage(notice) => {
                handler.on_system_notice(&notice).await;
            }
        }
    }
}

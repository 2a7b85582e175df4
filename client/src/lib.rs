mod attachment;
mod connection;
mod handle;
mod handler;
mod receiver;
mod session;
mod view;

use anyhow::{Result, anyhow};
use tokio::sync::mpsc;

pub use parlor_protocol::{ClientEvent, ContentKind, MessagePayload, ServerEvent};

pub use attachment::{AttachmentError, MAX_IMAGE_BYTES, image_mime, load_image};
pub use connection::{ChannelEvent, Connection, ReconnectPolicy};
pub use handle::ChatHandle;
pub use handler::ChatHandler;
pub use receiver::Receiver;
pub use session::{Credentials, LoginError, Session, SessionState, login};
pub use view::{ChatMessage, Composer, MessageBody, Timeline, TimelineEntry};

/// Default endpoints for a locally hosted parlor server.
pub const DEFAULT_LOGIN_URL: &str = "http://localhost:5000/login";
pub const DEFAULT_SERVER_URL: &str = "ws://localhost:5000/ws";

/// Entry point for opening the chat channel after login.
pub struct Client;

impl Client {
    /// Open the channel for a logged-in session, with the default reconnect policy.
    ///
    /// Returns a cloneable send handle and the receiver that drives a
    /// [`ChatHandler`]. The session must have completed [`Session::login`]
    /// first; there is at most one live channel per session.
    pub async fn connect(server_url: &str, session: &Session) -> Result<(ChatHandle, Receiver)> {
        Self::connect_with_policy(server_url, session, ReconnectPolicy::default()).await
    }

    pub async fn connect_with_policy(
        server_url: &str,
        session: &Session,
        policy: ReconnectPolicy,
    ) -> Result<(ChatHandle, Receiver)> {
        let username = session
            .username()
            .ok_or_else(|| anyhow!("Cannot connect: not logged in"))?;

        let connection = Connection::connect(server_url, &username, policy).await?;

        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let (incoming_tx, incoming_rx) = mpsc::channel(64);

        tokio::spawn(pump(connection, outgoing_rx, incoming_tx));

        Ok((
            ChatHandle::new(outgoing_tx, session.clone()),
            Receiver::new(incoming_rx, session.clone()),
        ))
    }
}

/// Owns the socket: drains outbound events into the sink and forwards
/// inbound channel events to the receiver.
async fn pump(
    mut connection: Connection,
    mut outgoing: mpsc::UnboundedReceiver<ClientEvent>,
    incoming: mpsc::Sender<Result<ChannelEvent>>,
) {
    loop {
        tokio::select! {
            event = outgoing.recv() => match event {
                Some(event) => {
                    if let Err(e) = connection.send_event(&event).await {
                        tracing::error!(error = %e, "Failed to send event");
                    }
                }
                // All handles dropped; nothing left to send.
                None => break,
            },
            inbound = connection.recv() => {
                let terminal = inbound.is_err();
                if incoming.send(inbound).await.is_err() || terminal {
                    break;
                }
            }
        }
    }
}

use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use parlor_protocol::{ClientEvent, ServerEvent, decode_server_event};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What the channel reports to the receiver loop.
#[derive(Debug)]
pub enum ChannelEvent {
    /// Socket established (or re-established) and the username registered.
    Connected,
    /// Socket dropped; a reconnect attempt follows on the next recv.
    Disconnected,
    Event(ServerEvent),
}

pub struct ReconnectPolicy {
    pub max_attempts: Option<usize>,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Some(5),
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl ReconnectPolicy {
    fn next_delay(&self, delay: Duration) -> Duration {
        Duration::from_secs_f64(delay.as_secs_f64() * self.backoff_multiplier)
            .min(self.max_delay)
    }
}

/// One live websocket channel per session.
///
/// The username rides along as connection-time auth metadata (a query
/// parameter on the URL) and is additionally registered with an explicit
/// event on every established socket, so a reconnect resumes the same
/// logical session rather than creating a second one.
pub struct Connection {
    ws: WsStream,
    url: String,
    username: String,
    policy: ReconnectPolicy,
    announce: bool,
    down: bool,
}

impl Connection {
    pub async fn connect(server_url: &str, username: &str, policy: ReconnectPolicy) -> Result<Self> {
        let url = format!("{}?username={}", server_url, username);
        let ws = Self::establish(&url)
            .await
            .with_context(|| format!("Failed to connect to {}", server_url))?;

        let mut connection = Self {
            ws,
            url,
            username: username.to_string(),
            policy,
            announce: true,
            down: false,
        };
        connection.register().await?;

        Ok(connection)
    }

    async fn establish(url: &str) -> Result<WsStream> {
        let (ws, _response) = connect_async(url)
            .await
            .context("WebSocket handshake failed")?;
        Ok(ws)
    }

    /// Bind this socket to the session username.
    async fn register(&mut self) -> Result<()> {
        let event = ClientEvent::RegisterUser {
            username: self.username.clone(),
        };
        self.send_event(&event).await
    }

    pub async fn send_event(&mut self, event: &ClientEvent) -> Result<()> {
        self.ws
            .send(Message::Text(event.to_wire()))
            .await
            .context("Failed to send event")
    }

    /// Receive the next channel event.
    ///
    /// Emits `Connected` once per established socket and `Disconnected` when
    /// the socket drops; the recv after a `Disconnected` runs the reconnect
    /// policy and either comes back with `Connected` or fails for good.
    /// Undecodable frames are logged and skipped rather than killing the
    /// channel.
    pub async fn recv(&mut self) -> Result<ChannelEvent> {
        if self.announce {
            self.announce = false;
            return Ok(ChannelEvent::Connected);
        }

        if self.down {
            self.down = false;
            self.reconnect()
                .await
                .context("Connection lost and reconnection failed")?;
            return Ok(ChannelEvent::Connected);
        }

        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => match decode_server_event(&text) {
                    Ok(event) => return Ok(ChannelEvent::Event(event)),
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping undecodable frame");
                    }
                },
                Some(Ok(Message::Ping(data))) => {
                    self.ws
                        .send(Message::Pong(data))
                        .await
                        .context("Failed to send pong")?;
                }
                Some(Ok(Message::Close(_))) | None => {
                    self.down = true;
                    return Ok(ChannelEvent::Disconnected);
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    tracing::error!(error = %e, "WebSocket error");
                    self.down = true;
                    return Ok(ChannelEvent::Disconnected);
                }
            }
        }
    }

    async fn reconnect(&mut self) -> Result<()> {
        let mut delay = self.policy.initial_delay;
        let mut attempt = 1;

        loop {
            if let Some(max) = self.policy.max_attempts
                && attempt > max
            {
                anyhow::bail!("Failed to reconnect after {} attempts to {}", max, self.url);
            }

            tokio::time::sleep(delay).await;

            match Self::establish(&self.url).await {
                Ok(ws) => {
                    self.ws = ws;
                    self.register().await?;
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt,
                        max_attempts = ?self.policy.max_attempts,
                        error = %e,
                        "Reconnection attempt failed"
                    );
                    attempt += 1;
                    delay = self.policy.next_delay(delay);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconnect_delay_backs_off_and_caps() {
        let policy = ReconnectPolicy::default();
        let mut delay = policy.initial_delay;

        delay = policy.next_delay(delay);
        assert_eq!(delay, Duration::from_secs(2));
        delay = policy.next_delay(delay);
        assert_eq!(delay, Duration::from_secs(4));

        for _ in 0..10 {
            delay = policy.next_delay(delay);
        }
        assert_eq!(delay, policy.max_delay);
    }
}

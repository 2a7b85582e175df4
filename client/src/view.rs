use chrono::{DateTime, Local};

use parlor_protocol::{ContentKind, MessagePayload};

/// What a rendered message shows: literal text, or an image by its source
/// (a data URL forwarded verbatim from the payload).
#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    Text(String),
    Image(String),
}

/// A message as the view renders it. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub sender: String,
    pub body: MessageBody,
    pub timestamp: Option<String>,
    pub is_self: bool,
}

impl ChatMessage {
    /// Build the render model from a wire payload.
    ///
    /// `is_self` is derived here by comparing the sender to the session
    /// username; the wire payload carries no such flag and would not be
    /// trusted for it if it did.
    pub fn from_payload(payload: MessagePayload, session_username: &str) -> Self {
        let is_self = payload.username == session_username;
        let body = match payload.kind {
            ContentKind::Text => MessageBody::Text(payload.message),
            ContentKind::Image => MessageBody::Image(payload.message),
        };

        Self {
            sender: payload.username,
            body,
            timestamp: payload.timestamp,
            is_self,
        }
    }

    /// The sender line: literally "You" for own messages, the sender
    /// verbatim otherwise. Same template either way.
    pub fn sender_label(&self) -> &str {
        if self.is_self { "You" } else { &self.sender }
    }

    /// The raw content string: message text, or the image source.
    pub fn content(&self) -> &str {
        match &self.body {
            MessageBody::Text(text) | MessageBody::Image(text) => text,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self.body, MessageBody::Image(_))
    }

    /// Hour:minute display label, e.g. "10:30".
    ///
    /// Formatted in the timestamp's own offset; an unparseable timestamp
    /// falls back to the raw string, a missing one to the current time.
    pub fn time_label(&self) -> String {
        match &self.timestamp {
            Some(timestamp) => DateTime::parse_from_rfc3339(timestamp)
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_else(|_| timestamp.clone()),
            None => Local::now().format("%H:%M").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEntry {
    Message(ChatMessage),
    /// Locally rendered informational line, visually distinct from messages.
    Notice(String),
}

/// The ordered message list plus its scroll position.
///
/// Every push appends and snaps the scroll to the end, the way the message
/// pane follows the newest entry; a frontend that scrolled back re-sticks
/// on the next push.
#[derive(Debug, Default)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
    scroll: usize,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_message(&mut self, message: ChatMessage) {
        self.entries.push(TimelineEntry::Message(message));
        self.scroll_to_end();
    }

    pub fn push_notice(&mut self, notice: impl Into<String>) {
        self.entries.push(TimelineEntry::Notice(notice.into()));
        self.scroll_to_end();
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the entry the view is anchored on.
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn scroll_to_end(&mut self) {
        self.scroll = self.entries.len().saturating_sub(1);
    }

    pub fn scroll_back(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }
}

/// The outbound text input buffer.
#[derive(Debug, Default)]
pub struct Composer {
    buffer: String,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    /// Take the trimmed input for sending.
    ///
    /// Empty or whitespace-only input is a no-op: nothing is returned and
    /// the buffer is left untouched. Otherwise the buffer is cleared.
    pub fn submit(&mut self) -> Option<String> {
        let trimmed = self.buffer.trim();
        if trimmed.is_empty() {
            return None;
        }

        let text = trimmed.to_string();
        self.buffer.clear();
        Some(text)
    }
}

use std::future::Future;

use crate::view::ChatMessage;

/// Trait for handling inbound channel events.
///
/// Implement this to drive a frontend. All methods have default no-op
/// implementations, so you only need the events you care about. Events are
/// dispatched in arrival order; nothing is reordered or buffered.
///
/// # Example
///
/// ```ignore
/// struct Printer;
///
/// impl ChatHandler for Printer {
///     async fn on_message(&mut self, message: &ChatMessage) {
///         println!("{}: {:?}", message.sender_label(), message.body);
///     }
/// }
/// ```
pub trait ChatHandler: Send {
    /// Called when the channel comes up, after the username is registered.
    fn on_connected(&mut self) -> impl Future<Output = ()> + Send {
        async {}
    }

    /// Called when the channel drops.
    fn on_disconnected(&mut self) -> impl Future<Output = ()> + Send {
        async {}
    }

    /// Called when the channel cannot be (re-)established; the receiver
    /// loop ends after this.
    fn on_connect_error(&mut self, detail: &str) -> impl Future<Output = ()> + Send {
        let _ = detail;
        async {}
    }

    /// Called for each freshly delivered message, text or image.
    fn on_message(&mut self, message: &ChatMessage) -> impl Future<Output = ()> + Send {
        let _ = message;
        async {}
    }

    /// Called once with the history replay, oldest first.
    fn on_history(&mut self, messages: &[ChatMessage]) -> impl Future<Output = ()> + Send {
        let _ = messages;
        async {}
    }

    /// Called for server-originated notices (joins, leaves, and the like).
    fn on_system_notice(&mut self, notice: &str) -> impl Future<Output = ()> + Send {
        let _ = notice;
        async {}
    }
}

use super::models::AskEvent;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Producer side of an ask stream.
///
/// Sends never fail: once the client has gone away they are dropped.
/// `close` consumes the sink, so the channel is closed exactly once and
/// nothing can be sent afterwards.
pub struct EventSink {
    tx: UnboundedSender<AskEvent>,
}

impl EventSink {
    pub fn channel() -> (Self, UnboundedReceiver<AskEvent>) {
        let (tx, rx) = mpsc::unbounded();
        (Self { tx }, rx)
    }

    /// Queue `event` for the client. Returns false if the client disconnected.
    pub fn send(&self, event: AskEvent) -> bool {
        match self.tx.unbounded_send(event) {
            Ok(()) => true,
            Err(_) => {
                tracing::trace!("Client disconnected, dropping ask event");
                false
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        !self.tx.is_closed()
    }

    pub fn close(self) {
        self.tx.close_channel();
    }
}

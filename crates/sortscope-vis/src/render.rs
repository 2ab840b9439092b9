//! Renderer that fans frames out to WebSocket clients.

use sortscope_engine::{Frame, Renderer};
use tokio::sync::broadcast;

/// Publishes each frame on a broadcast channel.
///
/// Slow subscribers lag and lose the oldest frames instead of holding up
/// the run.
#[derive(Debug, Clone)]
pub struct BroadcastRenderer {
    tx: broadcast::Sender<Frame>,
}

impl BroadcastRenderer {
    /// Create a renderer buffering up to `capacity` frames per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Handle for creating new subscriptions.
    pub fn sender(&self) -> broadcast::Sender<Frame> {
        self.tx.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Frame> {
        self.tx.subscribe()
    }
}

impl Renderer for BroadcastRenderer {
    fn render(&self, frame: &Frame) {
        // No subscribers is fine; nobody is watching.
        let _ = self.tx.send(frame.clone());
    }
}

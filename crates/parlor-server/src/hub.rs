//! The client hub: per-player outbound channels.
//!
//! Each connection's writer task drains an unbounded mpsc receiver; the
//! hub holds the matching senders. Sends are synchronous and never block,
//! which is what allows fan-out to happen while the core lock is held.

use std::collections::HashMap;

use parlor_protocol::{PlayerId, ServerMessage};
use tokio::sync::mpsc;

/// Sender half of one client's outbound queue.
pub type ClientSender = mpsc::UnboundedSender<ServerMessage>;

/// Maps connected players to their outbound queues.
pub struct ClientHub {
    clients: HashMap<PlayerId, ClientSender>,
}

impl ClientHub {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    /// Registers a connection's sender, replacing any previous one for
    /// the same identity (the newest transport wins).
    pub fn register(&mut self, id: PlayerId, sender: ClientSender) {
        self.clients.insert(id, sender);
    }

    pub fn unregister(&mut self, id: PlayerId) {
        self.clients.remove(&id);
    }

    pub fn is_connected(&self, id: PlayerId) -> bool {
        self.clients.contains_key(&id)
    }

    /// Queues a message for one player. Silently dropped if they have no
    /// live connection; every message is either re-derivable from the
    /// next `STATE_SYNC` or, like signaling, explicitly best-effort.
    pub fn send_to(&self, id: PlayerId, msg: ServerMessage) {
        if let Some(sender) = self.clients.get(&id) {
            let _ = sender.send(msg);
        }
    }

    /// Queues a message for several players, optionally skipping one.
    pub fn send_many(
        &self,
        ids: &[PlayerId],
        exclude: Option<PlayerId>,
        msg: &ServerMessage,
    ) {
        for id in ids {
            if Some(*id) == exclude {
                continue;
            }
            self.send_to(*id, msg.clone());
        }
    }

    pub fn connected_count(&self) -> usize {
        self.clients.len()
    }
}

impl Default for ClientHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_protocol::RoomMode;

    fn msg() -> ServerMessage {
        ServerMessage::SwitchMode {
            mode: RoomMode::Game,
        }
    }

    #[test]
    fn test_send_to_registered_client_delivers() {
        let mut hub = ClientHub::new();
        let id = PlayerId::generate();
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.register(id, tx);

        hub.send_to(id, msg());
        assert_eq!(rx.try_recv().unwrap(), msg());
    }

    #[test]
    fn test_send_to_unknown_client_is_silent() {
        let hub = ClientHub::new();
        hub.send_to(PlayerId::generate(), msg());
    }

    #[test]
    fn test_send_many_respects_exclusion() {
        let mut hub = ClientHub::new();
        let a = PlayerId::generate();
        let b = PlayerId::generate();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        hub.register(a, tx_a);
        hub.register(b, tx_b);

        hub.send_many(&[a, b], Some(a), &msg());

        assert!(rx_a.try_recv().is_err());
        assert_eq!(rx_b.try_recv().unwrap(), msg());
    }

    #[test]
    fn test_unregister_stops_delivery() {
        let mut hub = ClientHub::new();
        let id = PlayerId::generate();
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.register(id, tx);
        hub.unregister(id);

        hub.send_to(id, msg());
        assert!(rx.try_recv().is_err());
        assert!(!hub.is_connected(id));
    }
}

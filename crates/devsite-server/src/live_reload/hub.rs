//! Reload hub.
//!
//! Owns the set of connected live reload clients and broadcasts reload
//! messages to them. Register, unregister and broadcast all go through one
//! async mutex, so a broadcast never observes a half-updated client set.

use std::collections::BTreeMap;
use std::fmt;

use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitSink;
use futures::{Sink, SinkExt};
use tokio::sync::Mutex;

/// Write half of an upgraded live reload WebSocket.
pub(crate) type WsSink = SplitSink<WebSocket, Message>;

/// Identity of a registered client, unique for the lifetime of a hub.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct ClientId(u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Client set guarded by the hub lock.
struct Clients<S> {
    next_id: u64,
    /// Keyed by monotonically increasing ids, so iteration follows registration order.
    members: BTreeMap<ClientId, S>,
}

/// Broadcast hub for live reload clients.
///
/// Generic over the client sink so the broadcast logic can be exercised
/// without real sockets; the server uses the default [`WsSink`].
pub(crate) struct ReloadHub<S = WsSink> {
    clients: Mutex<Clients<S>>,
}

impl<S> ReloadHub<S> {
    /// Create an empty hub.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            clients: Mutex::new(Clients {
                next_id: 0,
                members: BTreeMap::new(),
            }),
        }
    }

    /// Number of currently registered clients.
    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.clients.lock().await.members.len()
    }

    /// Ids of currently registered clients, in broadcast order.
    #[cfg(test)]
    pub(crate) async fn client_ids(&self) -> Vec<ClientId> {
        self.clients.lock().await.members.keys().copied().collect()
    }
}

impl<S> Default for ReloadHub<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ReloadHub<S>
where
    S: Sink<Message> + Unpin,
    S::Error: fmt::Display,
{
    /// Add a connection to the client set.
    ///
    /// The connection receives every broadcast issued after this returns.
    pub(crate) async fn register(&self, sink: S) -> ClientId {
        let mut clients = self.clients.lock().await;
        let id = ClientId(clients.next_id);
        clients.next_id += 1;
        clients.members.insert(id, sink);
        tracing::debug!(client = %id, clients = clients.members.len(), "Live reload client registered");
        id
    }

    /// Remove a connection from the client set.
    ///
    /// Returns `false` if the client was not registered (for example because a
    /// failed broadcast already dropped it).
    pub(crate) async fn unregister(&self, id: ClientId) -> bool {
        let mut clients = self.clients.lock().await;
        let removed = clients.members.remove(&id).is_some();
        if removed {
            tracing::debug!(client = %id, clients = clients.members.len(), "Live reload client unregistered");
        }
        removed
    }

    /// Send `message` to every registered client.
    ///
    /// The lock is held for the whole broadcast. A client whose send fails is
    /// closed and removed; the remaining clients still get the message.
    /// Returns the number of clients the message was delivered to.
    pub(crate) async fn broadcast(&self, message: &str) -> usize {
        let mut clients = self.clients.lock().await;
        let mut delivered = 0;
        let mut failed = Vec::new();

        for (id, sink) in &mut clients.members {
            match sink.send(Message::Text(message.into())).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(client = %id, error = %e, "Failed to send live reload message, dropping client");
                    failed.push(*id);
                }
            }
        }

        for id in failed {
            if let Some(mut sink) = clients.members.remove(&id) {
                let _ = sink.close().await;
            }
        }

        delivered
    }

    /// Close and remove every registered client.
    pub(crate) async fn close_all(&self) {
        let mut clients = self.clients.lock().await;
        let members = std::mem::take(&mut clients.members);
        let count = members.len();

        for (_, mut sink) in members {
            let _ = sink.close().await;
        }

        if count > 0 {
            tracing::info!(clients = count, "Closed live reload connections");
        }
    }
}

//! Bridge from file changes to reload broadcasts.

use std::fmt;
use std::sync::Arc;

use axum::extract::ws::Message;
use futures::Sink;

use super::RELOAD_MESSAGE;
use super::detector::ChangeStream;
use super::hub::ReloadHub;

/// Broadcast a reload for every change event until the stream ends.
///
/// Every event triggers exactly one broadcast, with no filtering. The next
/// event is taken only after the previous broadcast completed.
pub(crate) async fn run<S>(mut changes: ChangeStream, hub: Arc<ReloadHub<S>>)
where
    S: Sink<Message> + Unpin,
    S::Error: fmt::Display,
{
    while let Some(event) = changes.recv().await {
        tracing::info!(path = %event.path.display(), kind = ?event.kind, "File changed");
        let delivered = hub.broadcast(RELOAD_MESSAGE).await;
        tracing::debug!(clients = delivered, "Reload broadcast sent");
    }
    tracing::debug!("Change stream closed, live reload bridge stopped");
}

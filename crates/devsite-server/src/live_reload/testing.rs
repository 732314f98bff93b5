//! In-memory client sinks for live reload tests.

use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use axum::extract::ws::Message;
use futures::Sink;

/// Observes what a fake client received and lets tests break its connection.
#[derive(Clone, Default)]
pub(crate) struct Probe {
    received: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
    broken: Arc<AtomicBool>,
}

impl Probe {
    /// Create a sink reporting into this probe.
    pub(crate) fn sink(&self) -> ProbeSink {
        ProbeSink(self.clone())
    }

    /// Text messages received so far.
    pub(crate) fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    /// Whether the hub closed the sink.
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Make every subsequent send fail.
    pub(crate) fn break_connection(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }
}

/// Sink half of a [`Probe`].
pub(crate) struct ProbeSink(Probe);

impl Sink<Message> for ProbeSink {
    type Error = io::Error;

    fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        if self.0.broken.load(Ordering::SeqCst) {
            Poll::Ready(Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "client went away",
            )))
        } else {
            Poll::Ready(Ok(()))
        }
    }

    fn start_send(self: Pin<&mut Self>, item: Message) -> Result<(), Self::Error> {
        if let Message::Text(text) = item {
            self.0.received.lock().unwrap().push(text.as_str().to_owned());
        }
        Ok(())
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.0.closed.store(true, Ordering::SeqCst);
        Poll::Ready(Ok(()))
    }
}

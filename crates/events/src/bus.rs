//! Event publishing abstraction (mechanics only).
//!
//! Sinks are fire-and-forget from the publisher's point of view:
//!
//! - **Single attempt**: `publish` is called once; there is no retry.
//! - **No backpressure**: implementations must not block the caller waiting
//!   for acknowledgement.
//! - **No ordering guarantees** between concurrent publishers.
//!
//! A failed publish is reported to the caller, which decides whether it
//! matters. Audit emission logs and drops it.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use thiserror::Error;

use crate::EventEnvelope;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// Internal lock poisoning.
    #[error("event sink lock poisoned")]
    Poisoned,

    /// Broker or transport rejected the message.
    #[error("event sink transport failed: {0}")]
    Transport(String),
}

/// Destination for events addressed by topic (a broker exchange, a log, an
/// in-process bus).
///
/// Requires `Send + Sync`: one sink is shared by every request.
pub trait EventSink<M>: Send + Sync {
    fn publish(&self, topic: &str, message: M) -> Result<(), PublishError>;
}

impl<M, S> EventSink<M> for Arc<S>
where
    S: EventSink<M> + ?Sized,
{
    fn publish(&self, topic: &str, message: M) -> Result<(), PublishError> {
        (**self).publish(topic, message)
    }
}

/// A subscription to an in-process event stream.
///
/// Each subscription receives its own copy of every envelope published after
/// it was created. Intended for a single consuming thread.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<EventEnvelope<M>>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<EventEnvelope<M>>) -> Self {
        Self { receiver }
    }

    /// Block until the next envelope is available.
    pub fn recv(&self) -> Result<EventEnvelope<M>, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an envelope without blocking.
    pub fn try_recv(&self) -> Result<EventEnvelope<M>, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for an envelope.
    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> Result<EventEnvelope<M>, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

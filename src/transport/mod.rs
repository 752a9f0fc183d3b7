//! Publish transports
//!
//! The router hands every serialized graph to a `Transport`. Delivery,
//! acknowledgement and reconnection are the transport's business.

pub mod mqtt;

pub use mqtt::{MqttSettings, MqttTransport};

use async_trait::async_trait;
use std::sync::Mutex;
use thiserror::Error;

/// Errors raised while publishing.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not connected to broker")]
    NotConnected,

    #[error("broker refused connection (return code {0})")]
    Refused(u8),

    #[error("protocol error: {0}")]
    Protocol(String),
}

/// A fire-and-forget publish primitive.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Publish `payload` on `topic`.
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), TransportError>;
}

/// A published message as seen by `MemoryTransport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub payload: String,
}

/// Keeps published messages in memory. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    published: Mutex<Vec<Published>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages published so far, oldest first.
    pub fn published(&self) -> Vec<Published> {
        match self.published.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn count(&self) -> usize {
        match self.published.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Remove and return everything published so far.
    pub fn drain(&self) -> Vec<Published> {
        match self.published.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), TransportError> {
        let message = Published {
            topic: topic.to_string(),
            payload: payload.to_string(),
        };
        match self.published.lock() {
            Ok(mut guard) => guard.push(message),
            Err(poisoned) => poisoned.into_inner().push(message),
        }
        Ok(())
    }
}

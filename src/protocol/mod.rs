// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Publish/subscribe transport used by the control loop.
//!
//! The control loop only needs three primitives from its transport:
//! subscribing to a topic, publishing a payload, and a stream of inbound
//! messages. [`Transport`] captures the first two; implementations hand out
//! the inbound stream as an `mpsc` receiver when they are created.
//!
//! # Implementations
//!
//! - [`MqttTransport`]: a `rumqttc` connection to a real broker
//! - [`MemoryTransport`]: an in-process transport that records publishes
//!
//! # Delivery
//!
//! Publishing returns a [`Delivery`] that resolves once the broker has
//! acknowledged the message. Callers that do not care simply drop it.

mod memory;
mod mqtt;
mod topic_router;

pub use memory::{MemoryTransport, PublishedMessage};
pub use mqtt::{MqttTransport, MqttTransportBuilder};
pub use topic_router::{Route, TopicRouter};

use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::error::ProtocolError;

/// A message received on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// The full topic the message arrived on.
    pub topic: String,
    /// The payload decoded as UTF-8.
    pub payload: String,
}

impl InboundMessage {
    /// Creates a new inbound message.
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Trait for transports that can carry accessory traffic.
///
/// Neither operation waits for the broker or for room in a request queue:
/// callers publish while holding the accessory state, so a full queue must
/// be reported as an error. Subscription acknowledgments are not tracked and
/// publish acknowledgments are reported through the returned [`Delivery`].
pub trait Transport: Send + Sync + 'static {
    /// Subscribes to a topic.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request cannot be enqueued.
    fn subscribe(&self, topic: &str) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Publishes a payload to a topic.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request cannot be enqueued.
    fn publish(
        &self,
        topic: &str,
        payload: &str,
    ) -> impl Future<Output = Result<Delivery, ProtocolError>> + Send;
}

/// Sending half of a [`Delivery`], held by the transport.
#[derive(Debug)]
pub struct DeliverySender(oneshot::Sender<Result<(), ProtocolError>>);

impl DeliverySender {
    /// Resolves the delivery.
    ///
    /// The result is discarded if nobody is waiting for it.
    pub fn complete(self, result: Result<(), ProtocolError>) {
        let _ = self.0.send(result);
    }
}

/// Outcome of a publish, resolved when the broker acknowledges it.
#[derive(Debug)]
#[must_use = "dropping a Delivery means the acknowledgment is not awaited"]
pub struct Delivery {
    rx: oneshot::Receiver<Result<(), ProtocolError>>,
}

impl Delivery {
    /// Creates a pending delivery and the sender that resolves it.
    pub fn channel() -> (DeliverySender, Self) {
        let (tx, rx) = oneshot::channel();
        (DeliverySender(tx), Self { rx })
    }

    /// Creates a delivery that is already resolved.
    pub fn resolved(result: Result<(), ProtocolError>) -> Self {
        let (sender, delivery) = Self::channel();
        sender.complete(result);
        delivery
    }

    /// Waits until the broker acknowledged the message.
    ///
    /// # Errors
    ///
    /// Returns the transport's failure, or `ProtocolError::ChannelClosed`
    /// if the transport stopped tracking the message.
    pub async fn confirmed(self) -> Result<(), ProtocolError> {
        self.rx.await.map_err(|_| {
            ProtocolError::ChannelClosed("delivery tracker dropped".to_string())
        })?
    }

    /// Waits for the acknowledgment for at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::DeliveryFailed` when the timeout elapses,
    /// otherwise the same errors as [`Delivery::confirmed`].
    pub async fn confirmed_within(self, timeout: Duration) -> Result<(), ProtocolError> {
        tokio::time::timeout(timeout, self.confirmed())
            .await
            .map_err(|_| {
                ProtocolError::DeliveryFailed(format!(
                    "not acknowledged within {} ms",
                    timeout.as_millis()
                ))
            })?
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process transport.
//!
//! [`MemoryTransport`] records every publish and subscription instead of
//! talking to a broker, and lets the caller inject inbound messages. It is
//! what the control loop tests run against, and it can also drive an
//! accessory without a broker at all.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::{Delivery, InboundMessage, Transport};
use crate::error::ProtocolError;

/// A message published through a [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    /// Topic the message was published to.
    pub topic: String,
    /// Published payload.
    pub payload: String,
}

/// A transport that keeps all traffic in memory.
///
/// # Examples
///
/// ```
/// use mqtt_humidifier::protocol::{MemoryTransport, Transport};
///
/// # async fn example() -> mqtt_humidifier::Result<()> {
/// let (transport, mut inbound) = MemoryTransport::new();
///
/// let delivery = transport.publish("sonoff/humidifier/cmnd/POWER", "ON").await?;
/// delivery.confirmed().await?;
/// assert_eq!(transport.published_on("sonoff/humidifier/cmnd/POWER"), ["ON"]);
///
/// transport.inject("home/humidity/value", "42");
/// assert_eq!(inbound.recv().await.unwrap().payload, "42");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    inner: Arc<MemoryInner>,
}

#[derive(Debug)]
struct MemoryInner {
    published: Mutex<Vec<PublishedMessage>>,
    subscriptions: Mutex<Vec<String>>,
    inbound_tx: mpsc::UnboundedSender<InboundMessage>,
    reject_publish: AtomicBool,
    fail_delivery: AtomicBool,
}

impl MemoryTransport {
    /// Creates a transport and the receiver of injected inbound messages.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<InboundMessage>) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let inner = MemoryInner {
            published: Mutex::new(Vec::new()),
            subscriptions: Mutex::new(Vec::new()),
            inbound_tx,
            reject_publish: AtomicBool::new(false),
            fail_delivery: AtomicBool::new(false),
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            inbound_rx,
        )
    }

    /// Delivers a message as if it arrived from the broker.
    ///
    /// The message is dropped if the inbound receiver is gone.
    pub fn inject(&self, topic: &str, payload: &str) {
        if self
            .inner
            .inbound_tx
            .send(InboundMessage::new(topic, payload))
            .is_err()
        {
            tracing::debug!(topic = %topic, "Inbound receiver dropped, message discarded");
        }
    }

    /// Returns every message published so far, oldest first.
    #[must_use]
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.inner.published.lock().clone()
    }

    /// Returns the payloads published to one topic, oldest first.
    #[must_use]
    pub fn published_on(&self, topic: &str) -> Vec<String> {
        self.inner
            .published
            .lock()
            .iter()
            .filter(|m| m.topic == topic)
            .map(|m| m.payload.clone())
            .collect()
    }

    /// Forgets all recorded publishes.
    pub fn clear_published(&self) {
        self.inner.published.lock().clear();
    }

    /// Returns the subscribed topics in subscription order.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<String> {
        self.inner.subscriptions.lock().clone()
    }

    /// Makes subsequent publishes fail before anything is recorded.
    pub fn set_reject_publish(&self, reject: bool) {
        self.inner.reject_publish.store(reject, Ordering::Release);
    }

    /// Makes subsequent publishes be recorded but never acknowledged.
    ///
    /// Their [`Delivery`] resolves with `ProtocolError::DeliveryFailed`.
    pub fn set_fail_delivery(&self, fail: bool) {
        self.inner.fail_delivery.store(fail, Ordering::Release);
    }
}

impl Transport for MemoryTransport {
    async fn subscribe(&self, topic: &str) -> Result<(), ProtocolError> {
        let mut subscriptions = self.inner.subscriptions.lock();
        if !subscriptions.iter().any(|t| t == topic) {
            subscriptions.push(topic.to_string());
        }
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: &str) -> Result<Delivery, ProtocolError> {
        if self.inner.reject_publish.load(Ordering::Acquire) {
            return Err(ProtocolError::ConnectionFailed(
                "memory transport rejects publishes".to_string(),
            ));
        }

        self.inner.published.lock().push(PublishedMessage {
            topic: topic.to_string(),
            payload: payload.to_string(),
        });

        if self.inner.fail_delivery.load(Ordering::Acquire) {
            Ok(Delivery::resolved(Err(ProtocolError::DeliveryFailed(
                format!("{topic} was not acknowledged"),
            ))))
        } else {
            Ok(Delivery::resolved(Ok(())))
        }
    }
}

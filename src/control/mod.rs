// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Threshold-driven power control.
//!
//! ```text
//! humidity topic ──► Controller ──► policy ──► power command topic
//!                        ▲                           │
//! power topic ───────────┘◄──── actuator report ◄────┘
//! ```
//!
//! The controller never assumes a command took effect: the confirmed power
//! state changes only when the actuator reports it on the power topic.

mod controller;
mod policy;

pub use controller::{Controller, REFRESH_PAYLOAD};
pub use policy::candidate_power;

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::Error;
use crate::protocol::{InboundMessage, Transport};

/// Feeds inbound messages to a controller until the channel closes.
///
/// Errors are logged and processing continues with the next message.
pub async fn run<T: Transport>(
    controller: Arc<Controller<T>>,
    mut inbound: mpsc::UnboundedReceiver<InboundMessage>,
) {
    tracing::info!(accessory = %controller.name(), "Control loop started");

    while let Some(message) = inbound.recv().await {
        tracing::debug!(
            accessory = %controller.name(),
            topic = %message.topic,
            payload = %message.payload,
            "Inbound message"
        );

        match controller.handle_message(&message).await {
            Ok(()) => {}
            Err(Error::Parse(e)) => tracing::warn!(
                accessory = %controller.name(),
                topic = %message.topic,
                payload = %message.payload,
                error = %e,
                "Ignoring unparseable humidity reading"
            ),
            Err(e) => tracing::error!(
                accessory = %controller.name(),
                topic = %message.topic,
                error = %e,
                "Failed to handle message"
            ),
        }
    }

    tracing::info!(accessory = %controller.name(), "Inbound channel closed, control loop stopped");
}

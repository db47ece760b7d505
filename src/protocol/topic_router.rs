// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inbound topic routing for an accessory.
//!
//! Each accessory listens on exactly two topics:
//!
//! ```text
//! sonoff/humidifier/value/POWER  → ON        → Route::Power
//! home/humidity/value            → 42.5      → Route::Humidity
//! anything/else                  → ...       → None (reported as unknown)
//! ```
//!
//! Topics are matched exactly; MQTT wildcards are not interpreted.

/// The handler an inbound message is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Reported actuator power.
    Power,
    /// Humidity reading.
    Humidity,
}

/// Maps inbound topics to their handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRouter {
    power_topic: String,
    humidity_topic: String,
}

impl TopicRouter {
    /// Creates a router for the given power and humidity topics.
    #[must_use]
    pub fn new(power_topic: impl Into<String>, humidity_topic: impl Into<String>) -> Self {
        Self {
            power_topic: power_topic.into(),
            humidity_topic: humidity_topic.into(),
        }
    }

    /// Returns the route for a topic, or `None` if the accessory does not
    /// handle it.
    #[must_use]
    pub fn route(&self, topic: &str) -> Option<Route> {
        if topic == self.power_topic {
            Some(Route::Power)
        } else if topic == self.humidity_topic {
            Some(Route::Humidity)
        } else {
            tracing::trace!(topic = %topic, "No route for topic");
            None
        }
    }

    /// Returns the topics that must be subscribed for routing to work.
    #[must_use]
    pub fn topics(&self) -> [&str; 2] {
        [&self.power_topic, &self.humidity_topic]
    }

    /// Returns the reported-power topic.
    #[must_use]
    pub fn power_topic(&self) -> &str {
        &self.power_topic
    }

    /// Returns the humidity topic.
    #[must_use]
    pub fn humidity_topic(&self) -> &str {
        &self.humidity_topic
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `mqtt_humidifier` - Threshold control of MQTT humidifiers and dehumidifiers.
//!
//! This library bridges a switchable humidifier or dehumidifier (typically a
//! Tasmota/Sonoff plug) and a humidity sensor, both speaking MQTT, to an
//! accessory platform. It switches the actuator on and off as the humidity
//! crosses two thresholds, and exposes the result as accessory
//! characteristics.
//!
//! # Behavior
//!
//! - **Humidifier**: ON below the humidifier threshold, OFF above the
//!   dehumidifier threshold
//! - **Dehumidifier**: ON above the dehumidifier threshold, OFF below the
//!   humidifier threshold
//! - Between the thresholds (or exactly on one) nothing is sent
//! - The reported mode follows the power state the actuator *confirms*,
//!   never the command that was sent
//!
//! # Quick Start
//!
//! ```no_run
//! use mqtt_humidifier::accessory::Accessory;
//! use mqtt_humidifier::config::AccessoryConfig;
//! use mqtt_humidifier::protocol::MqttTransport;
//! use mqtt_humidifier::subscription::Subscribable;
//!
//! #[tokio::main]
//! async fn main() -> mqtt_humidifier::Result<()> {
//!     let config = AccessoryConfig::dehumidifier("mqtt://192.168.1.50:1883");
//!     let (transport, inbound) = MqttTransport::builder()
//!         .broker_url("mqtt://192.168.1.50:1883")?
//!         .build()
//!         .await?;
//!
//!     let accessory = Accessory::new(transport, &config)?;
//!     accessory.on_mode_state_changed(|mode| println!("Mode: {mode:?}"));
//!
//!     let tasks = accessory.start(inbound).await?;
//!     tasks.control.await.ok();
//!     Ok(())
//! }
//! ```
//!
//! # Testing without a broker
//!
//! [`protocol::MemoryTransport`] records publishes and accepts injected
//! messages, so the control loop can be driven entirely in-process:
//!
//! ```
//! use mqtt_humidifier::config::AccessoryConfig;
//! use mqtt_humidifier::control::Controller;
//! use mqtt_humidifier::protocol::{InboundMessage, MemoryTransport};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> mqtt_humidifier::Result<()> {
//! let (transport, _inbound) = MemoryTransport::new();
//! let config = AccessoryConfig::humidifier("mqtt://localhost");
//! let controller = Controller::new(transport.clone(), &config)?;
//!
//! controller
//!     .handle_message(&InboundMessage::new("home/humidity/value", "40"))
//!     .await?;
//! assert_eq!(transport.published_on("sonoff/humidifier/value/cmnd/POWER"), ["ON"]);
//! # Ok(())
//! # }
//! ```

pub mod accessory;
pub mod config;
pub mod control;
pub mod error;
pub mod protocol;
pub mod scheduler;
pub mod state;
pub mod subscription;
pub mod telemetry;
pub mod types;

pub use accessory::{
    Accessory, AccessoryTasks, Active, CurrentHumidifierDehumidifierState,
    TargetHumidifierDehumidifierState,
};
pub use config::{AccessoryConfig, BridgeConfig, LoggingConfig};
pub use control::Controller;
pub use error::{ConfigError, Error, ParseError, ProtocolError, Result, ValueError};
pub use protocol::{Delivery, InboundMessage, MemoryTransport, MqttTransport, Transport};
pub use state::{DeviceState, StateChange};
pub use subscription::{CallbackRegistry, Subscribable, SubscriptionId};
pub use types::{CurrentModeState, DeviceKind, PowerState, Thresholds};

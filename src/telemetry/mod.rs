// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parsing of sensor payloads received over MQTT.
//!
//! Humidity sensors and their bridges publish readings in one of two shapes:
//!
//! - a bare number such as `42.5`
//! - a JSON object such as `{"temperature": 21.3, "humidity": 42.5}`
//!
//! [`HumidityFormat`] selects which one an accessory expects.

mod humidity_parser;

pub use humidity_parser::{DEFAULT_HUMIDITY_FIELD, HumidityFormat};

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Humidity thresholds bounding the hysteresis band.

use crate::error::ValueError;

/// Lowest valid relative humidity.
pub const HUMIDITY_MIN: f32 = 0.0;

/// Highest valid relative humidity.
pub const HUMIDITY_MAX: f32 = 100.0;

/// The pair of thresholds that bound the hysteresis band.
///
/// Both values are relative humidity percentages in `0..=100` and the
/// humidifier threshold is always strictly below the dehumidifier threshold.
///
/// # Examples
///
/// ```
/// use mqtt_humidifier::types::Thresholds;
///
/// let t = Thresholds::default();
/// assert_eq!(t.humidifier(), 45.0);
/// assert_eq!(t.dehumidifier(), 60.0);
///
/// let narrowed = t.with_humidifier(50.0).unwrap();
/// assert_eq!(narrowed.humidifier(), 50.0);
///
/// assert!(t.with_humidifier(70.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    humidifier: f32,
    dehumidifier: f32,
}

impl Thresholds {
    /// Default humidifier threshold.
    pub const DEFAULT_HUMIDIFIER: f32 = 45.0;

    /// Default dehumidifier threshold.
    pub const DEFAULT_DEHUMIDIFIER: f32 = 60.0;

    /// Creates a validated pair of thresholds.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::HumidityOutOfRange` if either value is outside
    /// `0..=100`, or `ValueError::InvertedThresholds` if `humidifier` is not
    /// strictly below `dehumidifier`.
    pub fn new(humidifier: f32, dehumidifier: f32) -> Result<Self, ValueError> {
        check_range(humidifier)?;
        check_range(dehumidifier)?;
        if humidifier >= dehumidifier {
            return Err(ValueError::InvertedThresholds {
                humidifier,
                dehumidifier,
            });
        }
        Ok(Self {
            humidifier,
            dehumidifier,
        })
    }

    /// Returns the humidifier threshold.
    #[must_use]
    pub const fn humidifier(&self) -> f32 {
        self.humidifier
    }

    /// Returns the dehumidifier threshold.
    #[must_use]
    pub const fn dehumidifier(&self) -> f32 {
        self.dehumidifier
    }

    /// Returns a copy with a new humidifier threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting pair is invalid.
    pub fn with_humidifier(&self, value: f32) -> Result<Self, ValueError> {
        Self::new(value, self.dehumidifier)
    }

    /// Returns a copy with a new dehumidifier threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting pair is invalid.
    pub fn with_dehumidifier(&self, value: f32) -> Result<Self, ValueError> {
        Self::new(self.humidifier, value)
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            humidifier: Self::DEFAULT_HUMIDIFIER,
            dehumidifier: Self::DEFAULT_DEHUMIDIFIER,
        }
    }
}

fn check_range(value: f32) -> Result<(), ValueError> {
    if (HUMIDITY_MIN..=HUMIDITY_MAX).contains(&value) {
        Ok(())
    } else {
        Err(ValueError::HumidityOutOfRange(value))
    }
}

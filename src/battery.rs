//! Battery charge model
//!
//! Conversion formulas based upon https://github.com/dbrgn/pinetime-rtic/blob/master/pinetime-rtic/src/battery.rs
//! and https://wiki.pine64.org/wiki/PineTime.

use crate::Error;

/// Snapshot of the battery as reported by the battery service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryChargeState {
    /// Remaining capacity (0-100)
    pub charge_percent: u8,
    /// Battery is being charged
    pub is_charging: bool,
    /// External power is connected
    pub is_plugged: bool,
}

impl BatteryChargeState {
    pub const fn new(charge_percent: u8, is_charging: bool, is_plugged: bool) -> Self {
        Self {
            charge_percent,
            is_charging,
            is_plugged,
        }
    }

    /// Whether the marine should show its charging pose
    pub fn on_power(&self) -> bool {
        self.is_charging || self.is_plugged
    }
}

/// Convert an ADC measurement into a battery voltage in millivolts.
pub fn millivolts_from_adc(raw_measurement: i16) -> Result<u16, Error> {
    match raw_measurement {
        0..=4095 => {
            // keep as 32 bit for multiplication
            let adc_val = raw_measurement as u32;
            // multiply the ADC value by 2 * 1000 for mV and divide by (2 ^ 12 / 3.3V reference)
            Ok((adc_val * 2000 / 1241) as u16)
        }
        _ => Err(Error::InvalidMeasurement(raw_measurement)),
    }
}

/// Estimate the battery capacity in percent from its voltage.
///
/// Uses fixed data points and linear interpolation in between.
pub fn percent_from_millivolts(voltage: u16) -> u8 {
    (match voltage {
        0..=3449 => 0,
        3450..=3699 => (voltage - 3450) / 5,
        3700..=4199 => 50 + (voltage - 3700) / 10,
        _ => 100,
    }) as u8
}

//! Battery sensing
//!
//! Implementation based upon https://github.com/dbrgn/pinetime-rtic/blob/master/pinetime-rtic/src/battery.rs
//! and https://wiki.pine64.org/wiki/PineTime.

use doom_marine::{
    battery::{millivolts_from_adc, percent_from_millivolts},
    BatteryChargeState, Error,
};
use embassy_nrf::{
    gpio::{AnyPin, Input},
    saadc::Saadc,
};

/// Battery API
pub struct Battery {
    /// ADC instance for battery voltage measurement (P0.31)
    adc: Saadc<'static, 1>,
    /// Charge indication pin (P0.12): high = battery, low = charging
    charge_indication: Input<'static, AnyPin>,
    /// Power presence pin (P0.19): low = external power connected
    power_presence: Input<'static, AnyPin>,
}

impl Battery {
    /// Configure battery sensing on boot
    pub fn init(
        adc: Saadc<'static, 1>,
        charge_indication: Input<'static, AnyPin>,
        power_presence: Input<'static, AnyPin>,
    ) -> Self {
        Self {
            adc,
            charge_indication,
            power_presence,
        }
    }

    pub fn is_charging(&self) -> bool {
        self.charge_indication.is_low()
    }

    pub fn is_plugged(&self) -> bool {
        self.power_presence.is_low()
    }

    /// Battery voltage in millivolts
    pub async fn millivolts(&mut self) -> Result<u16, Error> {
        let mut buf = [0; 1];
        self.adc.sample(&mut buf).await;
        millivolts_from_adc(buf[0])
    }

    /// Sample the hardware into a charge state
    pub async fn state(&mut self) -> Result<BatteryChargeState, Error> {
        let voltage = self.millivolts().await?;
        Ok(BatteryChargeState::new(
            percent_from_millivolts(voltage),
            self.is_charging(),
            self.is_plugged(),
        ))
    }
}

//! Backlight control
//!
//! Implementation based upon https://github.com/dbrgn/pinetime-rtic/blob/master/pinetime-rtic/src/backlight.rs
//! and https://wiki.pine64.org/wiki/PineTime.

use embassy_nrf::gpio::{AnyPin, Output};

/// Highest brightness level
pub const MAX_BRIGHTNESS: u8 = 7;

/// Control the backlight.
///
/// There are three active-low backlight pins, each connected to a FET that
/// toggles backlight power through a resistor.
///
/// - Low: 2.2 kΩ
/// - Mid: 100 Ω
/// - High: 30 Ω
///
/// Through combinations of these pins, 7 brightness levels (+ off) can be
/// configured.
pub struct Backlight {
    low: Output<'static, AnyPin>,
    mid: Output<'static, AnyPin>,
    high: Output<'static, AnyPin>,
    brightness: u8,
}

impl Backlight {
    /// Initialize the backlight with the specified level (0–7).
    pub fn init(
        low: Output<'static, AnyPin>,
        mid: Output<'static, AnyPin>,
        high: Output<'static, AnyPin>,
        brightness: u8,
    ) -> Self {
        let mut backlight = Self {
            low,
            mid,
            high,
            brightness,
        };
        backlight.set(brightness);
        backlight
    }

    /// Set the brightness level, clamped to [`MAX_BRIGHTNESS`]. 0 turns the
    /// backlight off.
    pub fn set(&mut self, brightness: u8) {
        let brightness = brightness.min(MAX_BRIGHTNESS);
        defmt::debug!("Setting backlight brightness to {}", brightness);

        for (pin, bit) in [
            (&mut self.low, 0x01),
            (&mut self.mid, 0x02),
            (&mut self.high, 0x04),
        ] {
            if brightness & bit > 0 {
                pin.set_low();
            } else {
                pin.set_high();
            }
        }
        self.brightness = brightness;
    }

    /// Current brightness level (0–7)
    pub fn brightness(&self) -> u8 {
        self.brightness
    }
}

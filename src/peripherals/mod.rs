//! PineTime board support used by the firmware

pub mod backlight;
pub mod battery;
pub mod config;
pub mod display;

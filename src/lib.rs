//! Doom marine watchface
//!
//! An animated marine whose pose follows the battery charge, framed by two
//! rounded panels showing the time and the date. The face only talks to the
//! outside world through the traits in [`system::services`], so it runs the
//! same on the PineTime firmware and in host tests.

#![cfg_attr(not(test), no_std)]

pub(crate) mod fmt;

pub mod assets;
pub mod battery;
pub mod config;
pub mod error;
pub mod system;
pub mod ui;

pub use battery::BatteryChargeState;
pub use error::Error;

//! Watchface errors

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Requested sprite cell lies outside the sheet
    #[error("sprite ({x}, {y}) outside of sheet (max {max_x}, {max_y})")]
    SpriteOutOfRange { x: u32, y: u32, max_x: u32, max_y: u32 },
    /// Stored pose is not one of the three animation columns
    #[error("invalid pose index {0}")]
    InvalidPose(u8),
    /// A bundled bitmap does not have the expected dimensions
    #[error("resource is {width}x{height}, expected {expected_width}x{expected_height}")]
    ResourceSize {
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
    /// Text does not fit into the panel buffer
    #[error("text exceeds panel capacity of {0} bytes")]
    TextTooLong(usize),
    /// Text could not be formatted into its buffer
    #[error("formatting failed")]
    Format,
    /// ADC sample outside of the 12 bit range
    #[error("invalid ADC measurement {0}")]
    InvalidMeasurement(i16),
}

impl From<core::fmt::Error> for Error {
    fn from(_: core::fmt::Error) -> Self {
        Error::Format
    }
}

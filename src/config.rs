//! Compile-time watchface configuration

use core::time::Duration;

use embedded_graphics::{
    geometry::{Point, Size},
    pixelcolor::BinaryColor,
    primitives::Rectangle,
};

/// Face canvas width in pixels
pub const FACE_W: u32 = 144;
/// Face canvas height in pixels
pub const FACE_H: u32 = 168;

/// Sprite sheet dimensions
pub const SPRITES_W: u32 = 261;
pub const SPRITES_H: u32 = 540;

/// Size of a single sprite cell
pub const SPRITE_CELL: Size = Size::new(77, 100);
/// Blank space between two neighbouring cells
pub const SPRITE_GUTTER: Size = Size::new(9, 7);

/// Charging sprite dimensions
pub const CHARGING_W: u32 = 77;
pub const CHARGING_H: u32 = 100;

/// Delay between two animation steps
pub const ANIMATION_INTERVAL: Duration = Duration::from_millis(2000);

/// Color the window is cleared with before the layers are drawn
pub const WINDOW_BACKGROUND: BinaryColor = BinaryColor::On;

/// Marine layer, covers the whole face
pub const MARINE_BOUNDS: Rectangle = Rectangle::new(Point::zero(), Size::new(FACE_W, FACE_H));
/// Time panel at the bottom edge
pub const TIME_BOUNDS: Rectangle = Rectangle::new(Point::new(0, 140), Size::new(FACE_W, 28));
/// Date panel at the top edge
pub const DATE_BOUNDS: Rectangle = Rectangle::new(Point::zero(), Size::new(FACE_W, 28));
/// Corner radius of both panels
pub const PANEL_CORNER_RADIUS: u32 = 8;

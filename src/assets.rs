//! Bundled bitmaps and fonts
//!
//! Bitmaps are raw 1 bit images, rows padded to whole bytes, most significant
//! bit first. A set bit is a lit pixel.

use embedded_graphics::{geometry::OriginDimensions, mono_font::MonoFont};
use profont::PROFONT_18_POINT;

use crate::{
    config::{CHARGING_H, CHARGING_W, SPRITES_H, SPRITES_W, SPRITE_CELL, SPRITE_GUTTER},
    fmt::info,
    ui::{
        marine::MarineSprites,
        sprite::{Bitmap, SpriteSheet},
    },
    Error,
};

pub const SPRITES_BLACK: &[u8] = include_bytes!("../assets/doom_marine_sprites_black.raw");
pub const SPRITES_WHITE: &[u8] = include_bytes!("../assets/doom_marine_sprites_white.raw");
pub const CHARGING_BLACK: &[u8] = include_bytes!("../assets/doom_marine_charging_black.raw");
pub const CHARGING_WHITE: &[u8] = include_bytes!("../assets/doom_marine_charging_white.raw");

/// Font of the time and date panels
pub static CUSTOM_FONT: &MonoFont<'static> = &PROFONT_18_POINT;

/// Everything the window needs while it is loaded
pub struct Resources<'a> {
    pub sprites: MarineSprites<'a>,
    pub font: &'a MonoFont<'a>,
}

impl Resources<'static> {
    /// Load the bitmaps compiled into the firmware
    pub fn bundled() -> Result<Self, Error> {
        let resources = Self {
            sprites: MarineSprites {
                sheet_black: load_sheet(SPRITES_BLACK)?,
                sheet_white: load_sheet(SPRITES_WHITE)?,
                charging_black: load_bitmap(CHARGING_BLACK, CHARGING_W, CHARGING_H)?,
                charging_white: load_bitmap(CHARGING_WHITE, CHARGING_W, CHARGING_H)?,
            },
            font: CUSTOM_FONT,
        };
        info!("Loaded bundled resources");
        Ok(resources)
    }
}

/// Wrap raw bitmap data, checking it has the expected size
pub fn load_bitmap(data: &[u8], width: u32, height: u32) -> Result<Bitmap<'_>, Error> {
    let bitmap = Bitmap::new(data, width);
    let size = bitmap.size();
    let bytes_per_row = width.div_ceil(8) as usize;

    if size.height != height || data.len() != bytes_per_row * height as usize {
        return Err(Error::ResourceSize {
            width: size.width,
            height: size.height,
            expected_width: width,
            expected_height: height,
        });
    }
    Ok(bitmap)
}

fn load_sheet(data: &[u8]) -> Result<SpriteSheet<'_>, Error> {
    SpriteSheet::new(load_bitmap(data, SPRITES_W, SPRITES_H)?, SPRITE_CELL, SPRITE_GUTTER)
}

//! UI definitions module

use embedded_graphics::{draw_target::DrawTarget, pixelcolor::BinaryColor};

use crate::system::services::WatchEvent;

pub mod framebuffer;
pub mod marine;
pub mod rounded_text;
pub mod sprite;
pub mod watchface;

pub trait WatchFace {
    /// Update watchface state with a host event
    fn handle(&mut self, event: WatchEvent);

    /// Render pending changes, returning whether anything was drawn
    fn draw<D>(&mut self, target: &mut D) -> Result<bool, D::Error>
    where
        D: DrawTarget<Color = BinaryColor>;
}

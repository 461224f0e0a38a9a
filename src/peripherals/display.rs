//! Display control

use display_interface_spi::SPIInterface;
use doom_marine::{
    config::{FACE_H, FACE_W},
    ui::framebuffer::{colors, FrameBuffer},
};
use embassy_nrf::{
    gpio::{AnyPin, Output},
    peripherals::SPI2,
    spim::Spim,
};
use embassy_time::Delay;
use embedded_graphics::{pixelcolor::Rgb565, prelude::*};
use mipidsi::{models::ST7789, Builder, Orientation};

const LCD_W: u16 = 240;
const LCD_H: u16 = 240;

/// Top left corner of the face, centered on the panel
const FACE_X: u16 = (LCD_W - FACE_W as u16) / 2;
const FACE_Y: u16 = (LCD_H - FACE_H as u16) / 2;

type Lcd = mipidsi::Display<
    SPIInterface<Spim<'static, SPI2>, Output<'static, AnyPin>, Output<'static, AnyPin>>,
    ST7789,
    Output<'static, AnyPin>,
>;

/// ST7789 panel showing the 1 bit face
pub struct Display {
    lcd: Lcd,
}

impl Display {
    /// Initialize the panel and clear it. `None` if the controller does not
    /// respond.
    pub fn init(
        spim: Spim<'static, SPI2>,
        cs: Output<'static, AnyPin>,
        dc: Output<'static, AnyPin>,
        rst: Output<'static, AnyPin>,
    ) -> Option<Self> {
        let lcd = Builder::st7789(SPIInterface::new(spim, dc, cs))
            .with_display_size(LCD_W, LCD_H)
            .with_orientation(Orientation::Portrait(false))
            .init(&mut Delay, Some(rst))
            .ok()?;

        let mut display = Self { lcd };
        display.clear().ok()?;
        Some(display)
    }

    /// Clear the whole panel, including the border around the face
    pub fn clear(&mut self) -> Result<(), mipidsi::Error> {
        self.lcd.clear(Rgb565::BLACK)
    }

    /// Copy a rendered face to the panel
    pub fn flush(&mut self, frame: &FrameBuffer) -> Result<(), mipidsi::Error> {
        self.lcd.set_pixels(
            FACE_X,
            FACE_Y,
            FACE_X + FACE_W as u16 - 1,
            FACE_Y + FACE_H as u16 - 1,
            colors(frame).map(Rgb565::from),
        )
    }
}

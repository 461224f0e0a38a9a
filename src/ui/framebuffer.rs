//! In-memory 1 bit frame the layers are drawn into

use embedded_graphics::{
    framebuffer::{buffer_size, Framebuffer},
    geometry::Point,
    image::GetPixel,
    pixelcolor::{
        raw::{BigEndian, RawU1},
        BinaryColor,
    },
};

use crate::config::{FACE_H, FACE_W};

const WIDTH: usize = FACE_W as usize;
const HEIGHT: usize = FACE_H as usize;

/// Face sized frame buffer, rows packed MSB first
pub type FrameBuffer = Framebuffer<
    BinaryColor,
    RawU1,
    BigEndian,
    WIDTH,
    HEIGHT,
    { buffer_size::<BinaryColor>(WIDTH, HEIGHT) },
>;

/// All pixels in row-major order, for streaming to a display
pub fn colors(frame: &FrameBuffer) -> impl Iterator<Item = BinaryColor> + '_ {
    (0..HEIGHT as i32)
        .flat_map(|y| (0..WIDTH as i32).map(move |x| Point::new(x, y)))
        .map(|p| frame.pixel(p).unwrap_or(BinaryColor::Off))
}

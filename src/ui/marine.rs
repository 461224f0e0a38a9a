//! Marine layer: battery driven sprite animation
//!
//! The marine is drawn in two passes. The white mask is OR-ed onto the frame,
//! then the black line art is cleared out of it, which gives the sprite a
//! light body with dark outlines on any background.

use embedded_graphics::{
    draw_target::{DrawTarget, DrawTargetExt},
    geometry::{Dimensions, OriginDimensions, Point, Size},
    image::{Image, ImageDrawable, ImageDrawableExt, SubImage},
    pixelcolor::BinaryColor,
    primitives::Rectangle,
    Drawable, Pixel,
};

use super::sprite::{AnimationState, Bitmap, Frame, SpriteSheet};
use crate::{
    fmt::{debug, error},
    BatteryChargeState, Error,
};

/// How source pixels are combined with the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompositingMode {
    /// Copy every source pixel
    Assign,
    /// Lit source pixels light the destination
    Or,
    /// Lit source pixels darken the destination
    Clear,
}

/// Bitmap drawing with a selectable compositing mode
pub trait Compositor {
    type Error;

    fn set_compositing_mode(&mut self, mode: CompositingMode);

    /// Draw `image` with its top left corner at the top left of `area`,
    /// clipped to `area`
    fn draw_bitmap_in_rect<I>(&mut self, image: &I, area: Rectangle) -> Result<(), Self::Error>
    where
        I: ImageDrawable<Color = BinaryColor>;
}

/// [`Compositor`] drawing into any binary draw target
pub struct GraphicsContext<'d, D> {
    target: &'d mut D,
    mode: CompositingMode,
}

impl<'d, D> GraphicsContext<'d, D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    pub fn new(target: &'d mut D) -> Self {
        Self {
            target,
            mode: CompositingMode::Assign,
        }
    }
}

impl<D> Compositor for GraphicsContext<'_, D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    type Error = D::Error;

    fn set_compositing_mode(&mut self, mode: CompositingMode) {
        self.mode = mode;
    }

    fn draw_bitmap_in_rect<I>(&mut self, image: &I, area: Rectangle) -> Result<(), Self::Error>
    where
        I: ImageDrawable<Color = BinaryColor>,
    {
        let mut blend = Blend {
            target: &mut *self.target,
            mode: self.mode,
        };
        Image::new(image, area.top_left).draw(&mut blend.clipped(&area))
    }
}

/// Draw target adapter applying a compositing mode
struct Blend<'a, D> {
    target: &'a mut D,
    mode: CompositingMode,
}

impl<D> Dimensions for Blend<'_, D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    fn bounding_box(&self) -> Rectangle {
        self.target.bounding_box()
    }
}

impl<D> DrawTarget for Blend<'_, D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    type Color = BinaryColor;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let mode = self.mode;
        self.target
            .draw_iter(pixels.into_iter().filter_map(move |Pixel(point, color)| {
                match (mode, color) {
                    (CompositingMode::Assign, _) => Some(Pixel(point, color)),
                    (_, BinaryColor::Off) => None,
                    (CompositingMode::Or, BinaryColor::On) => Some(Pixel(point, BinaryColor::On)),
                    (CompositingMode::Clear, BinaryColor::On) => {
                        Some(Pixel(point, BinaryColor::Off))
                    }
                }
            }))
    }
}

/// Bitmaps used by the marine layer
pub struct MarineSprites<'a> {
    pub sheet_black: SpriteSheet<'a>,
    pub sheet_white: SpriteSheet<'a>,
    pub charging_black: Bitmap<'a>,
    pub charging_white: Bitmap<'a>,
}

/// Pair of sprite views for one frame, white mask first
type SpritePair<'s, 'a> = (SubImage<'s, Bitmap<'a>>, SubImage<'s, Bitmap<'a>>);

impl<'a> MarineSprites<'a> {
    /// Highest battery row both sheets provide
    pub fn max_row(&self) -> u32 {
        self.sheet_black.max_row().min(self.sheet_white.max_row())
    }

    fn pair(&self, frame: Frame) -> Result<SpritePair<'_, 'a>, Error> {
        match frame {
            Frame::Idle { column, row } => Ok((
                self.sheet_white.sprite(column, row)?,
                self.sheet_black.sprite(column, row)?,
            )),
            Frame::Charging => Ok((
                self.charging_white
                    .sub_image(&self.charging_white.bounding_box()),
                self.charging_black
                    .sub_image(&self.charging_black.bounding_box()),
            )),
        }
    }
}

/// Place a `size` sized box in the middle of `bounds`
fn centered(size: Size, bounds: Rectangle) -> Rectangle {
    let offset = Point::new(
        (bounds.size.width as i32 - size.width as i32) / 2,
        (bounds.size.height as i32 - size.height as i32) / 2,
    );
    Rectangle::new(bounds.top_left + offset, size)
}

/// The marine layer and its animation state
pub struct MarineLayer {
    bounds: Rectangle,
    anim: AnimationState,
    last_frame: Option<Frame>,
    dirty: bool,
}

impl MarineLayer {
    pub fn new(bounds: Rectangle, battery: BatteryChargeState) -> Self {
        Self {
            bounds,
            anim: AnimationState::new(battery),
            last_frame: None,
            dirty: true,
        }
    }

    pub fn state(&self) -> &AnimationState {
        &self.anim
    }

    /// Frame shown by the last successful draw
    pub fn last_frame(&self) -> Option<Frame> {
        self.last_frame
    }

    /// Replace the cached battery state. The pose only changes on the next draw.
    pub fn set_battery(&mut self, battery: BatteryChargeState) {
        self.anim.set_battery(battery);
    }

    pub fn restore(&mut self, anim: AnimationState) {
        self.anim = anim;
    }

    /// Request a new animation step on the next draw
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Draw the layer.
    ///
    /// A dirty layer advances the animation. A clean one, or one whose step
    /// fails, shows the previous frame again.
    pub fn draw<C>(&mut self, sprites: &MarineSprites<'_>, ctx: &mut C) -> Result<(), C::Error>
    where
        C: Compositor,
    {
        let selected = if self.dirty {
            self.dirty = false;
            Some(self.anim.next_frame(sprites.max_row()))
        } else {
            self.last_frame.map(Ok)
        };
        let Some(selected) = selected else {
            return Ok(());
        };

        let found = match selected.and_then(|frame| Ok((frame, sprites.pair(frame)?))) {
            Ok(found) => Some(found),
            Err(err) => {
                error!("Skipping marine frame: {}", err);
                self.last_frame
                    .and_then(|frame| sprites.pair(frame).ok().map(|pair| (frame, pair)))
            }
        };
        let Some((frame, (white, black))) = found else {
            return Ok(());
        };
        debug!("Drawing marine frame {:?}", frame);

        ctx.set_compositing_mode(CompositingMode::Or);
        ctx.draw_bitmap_in_rect(&white, centered(white.size(), self.bounds))?;

        ctx.set_compositing_mode(CompositingMode::Clear);
        ctx.draw_bitmap_in_rect(&black, centered(black.size(), self.bounds))?;

        self.last_frame = Some(frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use embedded_graphics::{image::GetPixel, prelude::*};

    use super::*;
    use crate::{assets::Resources, config::MARINE_BOUNDS, ui::framebuffer::FrameBuffer};

    /// Records compositing mode and area of every bitmap draw
    #[derive(Default)]
    struct Recorder {
        mode: Option<CompositingMode>,
        calls: Vec<(CompositingMode, Rectangle)>,
    }

    impl Compositor for Recorder {
        type Error = Infallible;

        fn set_compositing_mode(&mut self, mode: CompositingMode) {
            self.mode = Some(mode);
        }

        fn draw_bitmap_in_rect<I>(&mut self, _image: &I, area: Rectangle) -> Result<(), Infallible>
        where
            I: ImageDrawable<Color = BinaryColor>,
        {
            self.calls.push((self.mode.unwrap(), area));
            Ok(())
        }
    }

    fn discharging(percent: u8) -> BatteryChargeState {
        BatteryChargeState::new(percent, false, false)
    }

    const SPRITE_AREA: Rectangle = Rectangle::new(Point::new(33, 34), Size::new(77, 100));

    #[test]
    fn white_pass_before_black_pass() {
        let resources = Resources::bundled().unwrap();
        let mut layer = MarineLayer::new(MARINE_BOUNDS, discharging(75));
        let mut recorder = Recorder::default();

        layer.draw(&resources.sprites, &mut recorder).unwrap();

        assert_eq!(
            recorder.calls,
            [
                (CompositingMode::Or, SPRITE_AREA),
                (CompositingMode::Clear, SPRITE_AREA)
            ]
        );
    }

    #[test]
    fn dirty_draw_advances_pose() {
        let resources = Resources::bundled().unwrap();
        let mut layer = MarineLayer::new(MARINE_BOUNDS, discharging(75));
        layer.restore(AnimationState::with_poses(2, 1, discharging(75)));

        layer.draw(&resources.sprites, &mut Recorder::default()).unwrap();

        assert_eq!(layer.last_frame(), Some(Frame::Idle { column: 1, row: 1 }));
        assert_eq!(layer.state().current_x(), 1);
        assert_eq!(layer.state().previous_x(), 2);
        assert!(!layer.is_dirty());
    }

    #[test]
    fn clean_redraw_repeats_frame() {
        let resources = Resources::bundled().unwrap();
        let mut layer = MarineLayer::new(MARINE_BOUNDS, discharging(30));
        let mut recorder = Recorder::default();

        layer.draw(&resources.sprites, &mut recorder).unwrap();
        let state = *layer.state();
        let frame = layer.last_frame();
        layer.draw(&resources.sprites, &mut recorder).unwrap();

        assert_eq!(*layer.state(), state);
        assert_eq!(layer.last_frame(), frame);
        assert_eq!(recorder.calls.len(), 4);
    }

    #[test]
    fn charging_sprite_while_plugged() {
        let resources = Resources::bundled().unwrap();
        let plugged = BatteryChargeState::new(60, false, true);
        let mut layer = MarineLayer::new(MARINE_BOUNDS, plugged);
        let before = *layer.state();
        let mut recorder = Recorder::default();

        for _ in 0..3 {
            layer.mark_dirty();
            layer.draw(&resources.sprites, &mut recorder).unwrap();
        }

        assert_eq!(layer.last_frame(), Some(Frame::Charging));
        assert_eq!(*layer.state(), before);
        assert_eq!(recorder.calls.len(), 6);
    }

    #[test]
    fn failed_step_keeps_previous_frame() {
        let resources = Resources::bundled().unwrap();
        let mut layer = MarineLayer::new(MARINE_BOUNDS, discharging(100));
        let mut recorder = Recorder::default();
        layer.draw(&resources.sprites, &mut recorder).unwrap();
        let shown = layer.last_frame();

        layer.restore(AnimationState::with_poses(1, 9, discharging(100)));
        layer.mark_dirty();
        layer.draw(&resources.sprites, &mut recorder).unwrap();

        assert_eq!(layer.last_frame(), shown);
        assert_eq!(layer.state().current_x(), 1);
        assert_eq!(layer.state().previous_x(), 9);
        assert_eq!(recorder.calls.len(), 4);
    }

    #[test]
    fn failed_first_step_draws_nothing() {
        let resources = Resources::bundled().unwrap();
        let mut layer = MarineLayer::new(MARINE_BOUNDS, discharging(100));
        layer.restore(AnimationState::with_poses(5, 1, discharging(100)));
        let mut recorder = Recorder::default();

        layer.draw(&resources.sprites, &mut recorder).unwrap();

        assert!(recorder.calls.is_empty());
        assert_eq!(layer.last_frame(), None);
    }

    #[test]
    fn lookup_failure_skips_frame() {
        static WHITE: [u8; 1] = [0xf0];
        static BLACK: [u8; 1] = [0x30];

        let bundled = Resources::bundled().unwrap();
        // A sheet with a single cell cannot serve the idle cycle
        let single = SpriteSheet::new(
            Bitmap::new(crate::assets::CHARGING_BLACK, 77),
            Size::new(77, 100),
            Size::new(9, 7),
        )
        .unwrap();
        let sprites = MarineSprites {
            sheet_black: single,
            sheet_white: bundled.sprites.sheet_white,
            charging_black: Bitmap::new(&BLACK, 8),
            charging_white: Bitmap::new(&WHITE, 8),
        };

        let mut layer = MarineLayer::new(MARINE_BOUNDS, discharging(100));
        layer.restore(AnimationState::with_poses(0, 1, discharging(100)));
        let mut recorder = Recorder::default();
        layer.draw(&sprites, &mut recorder).unwrap();

        assert!(recorder.calls.is_empty());
        assert_eq!(layer.last_frame(), None);
        assert_eq!(layer.state().current_x(), 1);
    }

    #[test]
    fn outline_survives_compositing() {
        static WHITE: [u8; 1] = [0xf0];
        static BLACK: [u8; 1] = [0x30];

        let bundled = Resources::bundled().unwrap();
        let sprites = MarineSprites {
            charging_black: Bitmap::new(&BLACK, 8),
            charging_white: Bitmap::new(&WHITE, 8),
            ..bundled.sprites
        };

        for background in [BinaryColor::Off, BinaryColor::On] {
            let mut frame = FrameBuffer::new();
            frame.clear(background).unwrap();

            let mut layer = MarineLayer::new(MARINE_BOUNDS, BatteryChargeState::new(10, true, false));
            layer
                .draw(&sprites, &mut GraphicsContext::new(&mut frame))
                .unwrap();

            // An 8x1 sprite centered in 144x168 starts at (68, 83)
            let row: Vec<_> = (66..78).map(|x| frame.pixel(Point::new(x, 83)).unwrap()).collect();
            let b = background;
            use BinaryColor::{Off, On};
            assert_eq!(row, [b, b, On, On, Off, Off, b, b, b, b, b, b]);
        }
    }

    #[test]
    fn assign_copies_unlit_pixels() {
        static IMAGE: [u8; 1] = [0x0f];
        let mut frame = FrameBuffer::new();
        frame.clear(BinaryColor::On).unwrap();

        let mut ctx = GraphicsContext::new(&mut frame);
        let area = Rectangle::new(Point::new(8, 8), Size::new(8, 1));
        ctx.draw_bitmap_in_rect(&Bitmap::new(&IMAGE, 8), area).unwrap();

        assert_eq!(frame.pixel(Point::new(8, 8)), Some(BinaryColor::Off));
        assert_eq!(frame.pixel(Point::new(12, 8)), Some(BinaryColor::On));
        assert_eq!(frame.pixel(Point::new(16, 8)), Some(BinaryColor::On));
    }

    #[test]
    fn drawing_is_clipped_to_area() {
        static IMAGE: [u8; 1] = [0xff];
        let mut frame = FrameBuffer::new();

        let mut ctx = GraphicsContext::new(&mut frame);
        ctx.set_compositing_mode(CompositingMode::Or);
        let area = Rectangle::new(Point::new(0, 0), Size::new(4, 1));
        ctx.draw_bitmap_in_rect(&Bitmap::new(&IMAGE, 8), area).unwrap();

        assert_eq!(frame.pixel(Point::new(3, 0)), Some(BinaryColor::On));
        assert_eq!(frame.pixel(Point::new(4, 0)), Some(BinaryColor::Off));
    }
}

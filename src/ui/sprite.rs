//! Sprite sheet slicing and marine pose selection

use embedded_graphics::{
    geometry::{Point, Size},
    image::{ImageDrawableExt, ImageRaw, SubImage},
    pixelcolor::BinaryColor,
    prelude::OriginDimensions,
    primitives::Rectangle,
};

use crate::{BatteryChargeState, Error};

/// Monochrome bitmap, one bit per pixel
pub type Bitmap<'a> = ImageRaw<'a, BinaryColor>;

/// Grid of equally sized sprites separated by a fixed gutter
#[derive(Debug, Clone, Copy)]
pub struct SpriteSheet<'a> {
    image: Bitmap<'a>,
    cell: Size,
    gutter: Size,
    max_column: u32,
    max_row: u32,
}

impl<'a> SpriteSheet<'a> {
    /// Wrap a bitmap holding a grid of `cell` sized sprites.
    ///
    /// Fails if the bitmap cannot hold a single cell.
    pub fn new(image: Bitmap<'a>, cell: Size, gutter: Size) -> Result<Self, Error> {
        let size = image.size();
        let too_small = || Error::ResourceSize {
            width: size.width,
            height: size.height,
            expected_width: cell.width,
            expected_height: cell.height,
        };

        // The last cell is not followed by a gutter
        let columns = (size.width + gutter.width) / (cell.width + gutter.width);
        let rows = (size.height + gutter.height) / (cell.height + gutter.height);

        Ok(Self {
            image,
            cell,
            gutter,
            max_column: columns.checked_sub(1).ok_or_else(too_small)?,
            max_row: rows.checked_sub(1).ok_or_else(too_small)?,
        })
    }

    /// Highest valid column index
    pub fn max_column(&self) -> u32 {
        self.max_column
    }

    /// Highest valid row index
    pub fn max_row(&self) -> u32 {
        self.max_row
    }

    /// Area of the sheet covered by the sprite at (`x`, `y`)
    pub fn cell_bounds(&self, x: u32, y: u32) -> Result<Rectangle, Error> {
        if x > self.max_column || y > self.max_row {
            return Err(Error::SpriteOutOfRange {
                x,
                y,
                max_x: self.max_column,
                max_y: self.max_row,
            });
        }

        let top_left = Point::new(
            ((self.cell.width + self.gutter.width) * x) as i32,
            ((self.cell.height + self.gutter.height) * y) as i32,
        );
        Ok(Rectangle::new(top_left, self.cell))
    }

    /// Borrow the sprite at (`x`, `y`).
    ///
    /// The returned view lives no longer than the sheet; nothing is allocated
    /// when the lookup fails.
    pub fn sprite(&self, x: u32, y: u32) -> Result<SubImage<'_, Bitmap<'a>>, Error> {
        let area = self.cell_bounds(x, y)?;
        Ok(self.image.sub_image(&area))
    }
}

/// Horizontal pose of the idle animation, matching the sheet columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pose {
    Left = 0,
    Middle = 1,
    Right = 2,
}

impl TryFrom<u8> for Pose {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Pose::Left),
            1 => Ok(Pose::Middle),
            2 => Ok(Pose::Right),
            _ => Err(Error::InvalidPose(value)),
        }
    }
}

/// Sprite to show for the next frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Frame {
    /// Cell of the idle animation sheet
    Idle { column: u32, row: u32 },
    /// Static charging sprite
    Charging,
}

/// Sheet row for a given charge: 0 for a full battery, one row down per 20%.
pub fn charge_row(charge_percent: u8, max_row: u32) -> u32 {
    let percent = u32::from(charge_percent.min(100));
    (5 - percent.div_ceil(20)).min(max_row)
}

/// Animation state of the marine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationState {
    current_x: u8,
    previous_x: u8,
    battery: BatteryChargeState,
}

impl AnimationState {
    /// Start in the middle pose
    pub fn new(battery: BatteryChargeState) -> Self {
        Self::with_poses(Pose::Middle as u8, Pose::Middle as u8, battery)
    }

    /// Restore a state from raw column indices
    pub fn with_poses(current_x: u8, previous_x: u8, battery: BatteryChargeState) -> Self {
        Self {
            current_x,
            previous_x,
            battery,
        }
    }

    pub fn current_x(&self) -> u8 {
        self.current_x
    }

    pub fn previous_x(&self) -> u8 {
        self.previous_x
    }

    pub fn battery(&self) -> &BatteryChargeState {
        &self.battery
    }

    pub fn set_battery(&mut self, battery: BatteryChargeState) {
        self.battery = battery;
    }

    /// Advance the idle cycle and return the new (column, row).
    ///
    /// The middle pose alternates sides so the same side never shows twice in
    /// a row. On an invalid pose nothing is changed.
    pub fn next_pose(&mut self, max_row: u32) -> Result<(u32, u32), Error> {
        let next = match Pose::try_from(self.current_x)? {
            Pose::Left | Pose::Right => Pose::Middle,
            Pose::Middle => match Pose::try_from(self.previous_x)? {
                Pose::Right => Pose::Left,
                Pose::Left => Pose::Right,
                Pose::Middle => Pose::Left,
            },
        };

        self.previous_x = self.current_x;
        self.current_x = next as u8;

        Ok((
            u32::from(self.current_x),
            charge_row(self.battery.charge_percent, max_row),
        ))
    }

    /// Select the next frame, leaving the pose untouched while on power.
    pub fn next_frame(&mut self, max_row: u32) -> Result<Frame, Error> {
        if self.battery.on_power() {
            return Ok(Frame::Charging);
        }

        let (column, row) = self.next_pose(max_row)?;
        Ok(Frame::Idle { column, row })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::{SPRITES_W, SPRITE_CELL, SPRITE_GUTTER};

    // 261 px wide rows take 33 bytes
    static BLANK_SHEET: [u8; 33 * 540] = [0; 33 * 540];

    fn sheet() -> SpriteSheet<'static> {
        SpriteSheet::new(Bitmap::new(&BLANK_SHEET, SPRITES_W), SPRITE_CELL, SPRITE_GUTTER).unwrap()
    }

    fn discharging(percent: u8) -> BatteryChargeState {
        BatteryChargeState::new(percent, false, false)
    }

    #[test]
    fn sheet_limits() {
        let sheet = sheet();
        assert_eq!(sheet.max_column(), 2);
        assert_eq!(sheet.max_row(), 4);
    }

    #[test]
    fn cell_positions_include_gutter() {
        let sheet = sheet();
        assert_eq!(
            sheet.cell_bounds(0, 0),
            Ok(Rectangle::new(Point::zero(), Size::new(77, 100)))
        );
        assert_eq!(
            sheet.cell_bounds(2, 4),
            Ok(Rectangle::new(Point::new(172, 428), Size::new(77, 100)))
        );

        let sprite = sheet.sprite(1, 3).unwrap();
        assert_eq!(sprite.size(), Size::new(77, 100));
    }

    #[test]
    fn lookup_outside_sheet_fails() {
        let sheet = sheet();
        let expected = Error::SpriteOutOfRange {
            x: 3,
            y: 0,
            max_x: 2,
            max_y: 4,
        };
        assert_eq!(sheet.cell_bounds(3, 0), Err(expected));
        assert!(matches!(sheet.sprite(3, 0), Err(e) if e == expected));
        assert!(sheet.sprite(0, 5).is_err());
    }

    #[test]
    fn sheet_smaller_than_cell_is_rejected() {
        static TINY: [u8; 4] = [0; 4];
        let result = SpriteSheet::new(Bitmap::new(&TINY, 8), SPRITE_CELL, SPRITE_GUTTER);
        assert!(matches!(result, Err(Error::ResourceSize { .. })));
    }

    #[test]
    fn idle_cycle_table() {
        let cases = [
            // (current, previous) -> next
            ((2, 0), 1),
            ((2, 1), 1),
            ((2, 2), 1),
            ((0, 0), 1),
            ((0, 1), 1),
            ((0, 2), 1),
            ((1, 2), 0),
            ((1, 0), 2),
            ((1, 1), 0),
        ];

        for ((current, previous), next) in cases {
            let mut state = AnimationState::with_poses(current, previous, discharging(50));
            let (x, _) = state.next_pose(4).unwrap();
            assert_eq!(x, next, "from ({current}, {previous})");
            assert_eq!(state.current_x(), next as u8);
            assert_eq!(state.previous_x(), current);
        }
    }

    #[test]
    fn walk_alternates_sides() {
        let mut state = AnimationState::new(discharging(100));
        let poses: Vec<u32> = (0..8).map(|_| state.next_pose(4).unwrap().0).collect();
        assert_eq!(poses, [0, 1, 2, 1, 0, 1, 2, 1]);
    }

    #[test]
    fn invalid_pose_is_a_noop() {
        let mut state = AnimationState::with_poses(1, 7, discharging(50));
        assert_eq!(state.next_pose(4), Err(Error::InvalidPose(7)));
        assert_eq!(state, AnimationState::with_poses(1, 7, discharging(50)));

        let mut state = AnimationState::with_poses(3, 1, discharging(50));
        assert_eq!(state.next_frame(4), Err(Error::InvalidPose(3)));
        assert_eq!(state.current_x(), 3);
        assert_eq!(state.previous_x(), 1);
    }

    #[test]
    fn charge_to_row() {
        assert_eq!(charge_row(100, 4), 0);
        assert_eq!(charge_row(81, 4), 0);
        assert_eq!(charge_row(80, 4), 1);
        assert_eq!(charge_row(61, 4), 1);
        assert_eq!(charge_row(60, 4), 2);
        assert_eq!(charge_row(41, 4), 2);
        assert_eq!(charge_row(40, 4), 3);
        assert_eq!(charge_row(21, 4), 3);
        assert_eq!(charge_row(20, 4), 4);
        assert_eq!(charge_row(1, 4), 4);
        assert_eq!(charge_row(0, 4), 4);
        assert_eq!(charge_row(0, 9), 5);
        assert_eq!(charge_row(255, 4), 0);
    }

    #[test]
    fn discharging_at_75_percent() {
        let mut state = AnimationState::with_poses(2, 1, discharging(75));
        assert_eq!(state.next_frame(4), Ok(Frame::Idle { column: 1, row: 1 }));
        assert_eq!(state.previous_x(), 2);
        assert_eq!(state.current_x(), 1);
    }

    #[test]
    fn pose_frozen_on_power() {
        for battery in [
            BatteryChargeState::new(40, true, false),
            BatteryChargeState::new(40, false, true),
            BatteryChargeState::new(100, true, true),
        ] {
            let mut state = AnimationState::with_poses(2, 1, battery);
            for _ in 0..5 {
                assert_eq!(state.next_frame(4), Ok(Frame::Charging));
            }
            assert_eq!(state, AnimationState::with_poses(2, 1, battery));
        }
    }
}

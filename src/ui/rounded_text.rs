//! Text panel with selectively rounded corners

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::Size,
    mono_font::{ascii::FONT_9X18, MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    primitives::{CornerRadii, Primitive, PrimitiveStyle, Rectangle, RoundedRectangle},
    Drawable,
};
use embedded_text::{
    alignment::{HorizontalAlignment, VerticalAlignment},
    style::{HeightMode, TextBoxStyleBuilder, VerticalOverdraw},
    TextBox,
};
use enumset::{enum_set, EnumSet, EnumSetType};
use heapless::{String, Vec};

use crate::Error;

/// Maximum length of the panel text in bytes
pub const TEXT_CAPACITY: usize = 32;

/// Rows laid out by the ellipsis modes
const MAX_ROWS: usize = 8;

const ELLIPSIS: &str = "...";

/// Laid out text: the rows, line breaks and a trailing ellipsis
type Layout = String<{ TEXT_CAPACITY + MAX_ROWS + ELLIPSIS.len() }>;

#[derive(Debug, EnumSetType)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

pub const CORNERS_NONE: EnumSet<Corner> = enum_set!();
pub const CORNERS_TOP: EnumSet<Corner> = enum_set!(Corner::TopLeft | Corner::TopRight);
pub const CORNERS_BOTTOM: EnumSet<Corner> = enum_set!(Corner::BottomLeft | Corner::BottomRight);
pub const CORNERS_ALL: EnumSet<Corner> =
    enum_set!(Corner::TopLeft | Corner::TopRight | Corner::BottomLeft | Corner::BottomRight);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlignment {
    Left,
    Center,
    Right,
}

impl From<TextAlignment> for HorizontalAlignment {
    fn from(alignment: TextAlignment) -> Self {
        match alignment {
            TextAlignment::Left => HorizontalAlignment::Left,
            TextAlignment::Center => HorizontalAlignment::Center,
            TextAlignment::Right => HorizontalAlignment::Right,
        }
    }
}

/// What happens to text that does not fit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    /// Wrap at word boundaries, the last row may be clipped
    WordWrap,
    /// Wrap at word boundaries, end the last full row with an ellipsis
    TrailingEllipsis,
    /// Like `TrailingEllipsis` with line breaks read as spaces
    Fill,
}

/// Look of a panel
#[derive(Clone)]
pub struct PanelStyle<'a> {
    pub corner_radius: u32,
    pub corner_mask: EnumSet<Corner>,
    pub background_color: BinaryColor,
    pub text_color: BinaryColor,
    pub alignment: TextAlignment,
    pub overflow: Overflow,
    pub font: &'a MonoFont<'a>,
    pub text: Option<String<TEXT_CAPACITY>>,
}

impl<'a> PanelStyle<'a> {
    fn corner_radii(&self) -> CornerRadii {
        let radius = Size::new(self.corner_radius, self.corner_radius);
        let corner = |c: Corner| {
            if self.corner_mask.contains(c) {
                radius
            } else {
                Size::zero()
            }
        };

        CornerRadii {
            top_left: corner(Corner::TopLeft),
            top_right: corner(Corner::TopRight),
            bottom_right: corner(Corner::BottomRight),
            bottom_left: corner(Corner::BottomLeft),
        }
    }
}

/// Rounded rectangle with a line of text on top
pub struct RoundedTextPanel<'a> {
    bounds: Rectangle,
    style: PanelStyle<'a>,
    dirty: bool,
}

impl<'a> RoundedTextPanel<'a> {
    /// Create a panel with white text centered on black
    pub fn new(bounds: Rectangle, corner_radius: u32, corner_mask: EnumSet<Corner>) -> Self {
        Self {
            bounds,
            style: PanelStyle {
                corner_radius,
                corner_mask,
                background_color: BinaryColor::Off,
                text_color: BinaryColor::On,
                alignment: TextAlignment::Center,
                overflow: Overflow::TrailingEllipsis,
                font: &FONT_9X18,
                text: None,
            },
            dirty: true,
        }
    }

    pub fn style(&self) -> &PanelStyle<'a> {
        &self.style
    }

    pub fn text(&self) -> Option<&str> {
        self.style.text.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Replace the text. Text longer than [`TEXT_CAPACITY`] is rejected and
    /// the old text kept.
    pub fn set_text(&mut self, text: &str) -> Result<(), Error> {
        let mut buf = String::new();
        buf.push_str(text)
            .map_err(|_| Error::TextTooLong(TEXT_CAPACITY))?;
        self.style.text = Some(buf);
        self.dirty = true;
        Ok(())
    }

    pub fn clear_text(&mut self) {
        self.style.text = None;
        self.dirty = true;
    }

    pub fn set_font(&mut self, font: &'a MonoFont<'a>) {
        self.style.font = font;
        self.dirty = true;
    }

    pub fn set_alignment(&mut self, alignment: TextAlignment) {
        self.style.alignment = alignment;
        self.dirty = true;
    }

    pub fn set_overflow(&mut self, overflow: Overflow) {
        self.style.overflow = overflow;
        self.dirty = true;
    }

    pub fn set_background_color(&mut self, color: BinaryColor) {
        self.style.background_color = color;
        self.dirty = true;
    }

    pub fn set_text_color(&mut self, color: BinaryColor) {
        self.style.text_color = color;
        self.dirty = true;
    }

    pub fn set_corner_radius(&mut self, radius: u32) {
        self.style.corner_radius = radius;
        self.dirty = true;
    }

    pub fn set_corner_mask(&mut self, mask: EnumSet<Corner>) {
        self.style.corner_mask = mask;
        self.dirty = true;
    }

    /// Number of text rows that fit fully into the panel, at least one
    fn rows(&self) -> usize {
        let line_height = self.style.font.character_size.height.max(1);
        (self.bounds.size.height / line_height).clamp(1, MAX_ROWS as u32) as usize
    }

    /// Fill the panel and draw its text
    pub fn draw<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let style = &self.style;

        RoundedRectangle::new(self.bounds, style.corner_radii())
            .into_styled(PrimitiveStyle::with_fill(style.background_color))
            .draw(target)?;

        if let Some(text) = style.text.as_deref() {
            let character_style = MonoTextStyle::new(style.font, style.text_color);
            let textbox_style = TextBoxStyleBuilder::new()
                .height_mode(HeightMode::Exact(VerticalOverdraw::Hidden))
                .alignment(style.alignment.into())
                .vertical_alignment(VerticalAlignment::Top)
                .build();

            let laid_out;
            let text = match style.overflow {
                Overflow::WordWrap => text,
                Overflow::TrailingEllipsis | Overflow::Fill => {
                    let per_line = chars_per_line(style.font, self.bounds.size.width);
                    let fill = style.overflow == Overflow::Fill;
                    laid_out = layout(text, per_line, self.rows(), fill);
                    laid_out.as_str()
                }
            };

            TextBox::with_textbox_style(text, self.bounds, character_style, textbox_style)
                .draw(target)?;
        }

        self.dirty = false;
        Ok(())
    }
}

/// Number of glyphs of a monospaced font that fit into `width`
fn chars_per_line(font: &MonoFont<'_>, width: u32) -> usize {
    let advance = font.character_size.width + font.character_spacing;
    ((width + font.character_spacing) / advance.max(1)) as usize
}

/// Greedy word wrapper over a fixed number of rows
struct Wrapper {
    per_line: usize,
    rows: usize,
    lines: Vec<String<TEXT_CAPACITY>, MAX_ROWS>,
    line: String<TEXT_CAPACITY>,
    truncated: bool,
}

impl Wrapper {
    fn new(per_line: usize, rows: usize) -> Self {
        Self {
            per_line,
            rows: rows.clamp(1, MAX_ROWS),
            lines: Vec::new(),
            line: String::new(),
            truncated: false,
        }
    }

    /// Start a new row, `false` once all rows are taken
    fn new_row(&mut self) -> bool {
        if self.lines.len() + 1 >= self.rows {
            self.truncated = true;
            return false;
        }
        let _ = self.lines.push(core::mem::take(&mut self.line));
        true
    }

    /// Append a word, breaking it when it is wider than a row
    fn push_word(&mut self, word: &str) -> bool {
        let used = self.line.chars().count();
        let len = word.chars().count();

        if used > 0 {
            if used + 1 + len <= self.per_line {
                let _ = self.line.push(' ');
                let _ = self.line.push_str(word);
                return true;
            }
            if !self.new_row() {
                return false;
            }
        }

        for c in word.chars() {
            if self.line.chars().count() == self.per_line && !self.new_row() {
                return false;
            }
            let _ = self.line.push(c);
        }
        true
    }

    fn finish(self) -> Layout {
        let mut out = Layout::new();
        for line in &self.lines {
            let _ = out.push_str(line);
            let _ = out.push('\n');
        }
        if self.truncated {
            let _ = out.push_str(&with_ellipsis(&self.line, self.per_line));
        } else {
            let _ = out.push_str(&self.line);
        }
        out
    }
}

/// Wrap `text` into at most `rows` rows of `per_line` glyphs, ending the last
/// row with an ellipsis when text is left over. `fill` reads line breaks as
/// spaces.
fn layout(text: &str, per_line: usize, rows: usize, fill: bool) -> Layout {
    if per_line == 0 {
        return Layout::new();
    }

    let mut wrapper = Wrapper::new(per_line, rows);
    'text: for (i, paragraph) in text.split('\n').enumerate() {
        if i > 0 && !fill && !wrapper.new_row() {
            break;
        }
        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            if !wrapper.push_word(word) {
                break 'text;
            }
        }
    }
    wrapper.finish()
}

/// Cut `line` so that it ends with an ellipsis within `max_chars`
fn with_ellipsis(line: &str, max_chars: usize) -> String<{ TEXT_CAPACITY + ELLIPSIS.len() }> {
    let mut out = String::new();
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    for c in line.chars().take(keep) {
        let _ = out.push(c);
    }
    let _ = out.push_str(&ELLIPSIS[..max_chars.min(ELLIPSIS.len())]);
    out
}

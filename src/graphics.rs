//! Graphics support via embedded-graphics
//!
//! This module provides [`GraphicsCanvas`], a [`Canvas`] over any
//! embedded-graphics [`DrawTarget`] with [`Rgb565`] colours. It keeps the
//! drawing state the command set expects (palette, cursor, text settings,
//! rotation, inversion) and renders primitives with embedded-graphics.
//!
//! ## Features
//!
//! - Rotation: logical coordinates are mapped to the native panel
//! - Inversion: drawn colours are complemented
//! - Clipping: fills are cut to the panel before they reach the target
//! - Text: 6x10 mono font, scaled per axis, optional wrapping
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_graphics::mock_display::MockDisplay;
//! use embedded_graphics::pixelcolor::Rgb565;
//! use serial_tft::{Canvas, GraphicsCanvas, Ink, Rotation};
//!
//! let mut display: MockDisplay<Rgb565> = MockDisplay::new();
//! display.set_allow_overdraw(true);
//!
//! let mut canvas = GraphicsCanvas::new(display);
//! canvas.set_rotation(Rotation::Rotate180);
//! canvas.set_fg_color(255, 0, 0);
//! canvas.fill_circle(32, 32, 10, Ink::Foreground);
//! canvas.print("Hello");
//! ```

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyleBuilder, ascii::FONT_6X10},
    primitives::{
        Circle, Line, Primitive, PrimitiveStyle, PrimitiveStyleBuilder, RoundedRectangle,
        StrokeAlignment, Triangle,
    },
    text::{Baseline, Text},
};
use embedded_graphics_core::{
    Drawable, Pixel,
    draw_target::DrawTarget,
    geometry::{Dimensions, OriginDimensions, Point, Size},
    pixelcolor::{IntoStorage, Rgb565, raw::RawU16},
    primitives::{PointsIter, Rectangle},
};

use crate::canvas::{Canvas, TextBounds};
use crate::color::{Ink, Palette, rgb565};
use crate::config::Rotation;
use crate::rotation::{apply_rotation, rotated_size};

/// Font used by `print`, `drawChar` and `getTextBounds`
pub const FONT: MonoFont<'static> = FONT_6X10;

fn color(raw: u16) -> Rgb565 {
    Rgb565::from(RawU16::new(raw))
}

fn complement(color: Rgb565) -> Rgb565 {
    Rgb565::from(RawU16::new(!color.into_storage()))
}

/// Normalize a rectangle given by a corner and signed extents
fn rect(x: i16, y: i16, w: i16, h: i16) -> Option<Rectangle> {
    if w == 0 || h == 0 {
        return None;
    }
    let (mut x, mut y, mut w, mut h) = (i32::from(x), i32::from(y), i32::from(w), i32::from(h));
    if w < 0 {
        x += w + 1;
        w = -w;
    }
    if h < 0 {
        y += h + 1;
        h = -h;
    }
    Some(Rectangle::new(
        Point::new(x, y),
        Size::new(w as u32, h as u32),
    ))
}

fn point(x: i16, y: i16) -> Point {
    Point::new(x.into(), y.into())
}

fn stroke(color: Rgb565) -> PrimitiveStyle<Rgb565> {
    PrimitiveStyleBuilder::new()
        .stroke_color(color)
        .stroke_width(1)
        .stroke_alignment(StrokeAlignment::Inside)
        .build()
}

/// Walk `text` from `start`, calling `place` with the position of each glyph
///
/// `\n` starts a new line and `\r` is skipped. With `wrap_width` set, a glyph
/// that would cross it moves to the next line first. Returns the final cursor.
fn layout(
    text: &str,
    start: Point,
    cell: Size,
    wrap_width: Option<i32>,
    mut place: impl FnMut(char, Point),
) -> Point {
    let (cell_w, cell_h) = (cell.width as i32, cell.height as i32);
    let mut cursor = start;
    for c in text.chars() {
        match c {
            '\n' => {
                cursor.x = 0;
                cursor.y += cell_h;
            }
            '\r' => {}
            _ => {
                if wrap_width.is_some_and(|limit| cursor.x + cell_w > limit) {
                    cursor.x = 0;
                    cursor.y += cell_h;
                }
                place(c, cursor);
                cursor.x += cell_w;
            }
        }
    }
    cursor
}

/// Logical view of the panel: clips, rotates and optionally inverts
struct Oriented<'a, D> {
    target: &'a mut D,
    native: Size,
    rotation: Rotation,
    inverted: bool,
}

impl<D> OriginDimensions for Oriented<'_, D> {
    fn size(&self) -> Size {
        let (w, h) = rotated_size(self.native.width, self.native.height, self.rotation);
        Size::new(w, h)
    }
}

impl<D: DrawTarget<Color = Rgb565>> DrawTarget for Oriented<'_, D> {
    type Color = Rgb565;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let logical = self.size();
        let Size { width, height } = self.native;
        let rotation = self.rotation;
        let inverted = self.inverted;

        let visible = pixels.into_iter().filter(move |&Pixel(p, _)| {
            p.x >= 0 && p.y >= 0 && (p.x as u32) < logical.width && (p.y as u32) < logical.height
        });
        self.target.draw_iter(visible.map(move |Pixel(p, c)| {
            let (x, y) = apply_rotation(p.x, p.y, width, height, rotation);
            Pixel(Point::new(x, y), if inverted { complement(c) } else { c })
        }))
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        let visible = area.intersection(&self.bounding_box());
        if visible.is_zero_sized() {
            return Ok(());
        }
        // colours run row by row; stop after the last visible row
        let rows = (visible.top_left.y - area.top_left.y) as usize + visible.size.height as usize;
        let pixels = area
            .points()
            .zip(colors)
            .take(rows * area.size.width as usize)
            .filter(move |&(p, _)| visible.contains(p))
            .map(|(p, c)| Pixel(p, c));
        self.draw_iter(pixels)
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let visible = area.intersection(&self.bounding_box());
        if visible.is_zero_sized() {
            return Ok(());
        }
        let Size { width, height } = self.native;
        let far = visible.top_left + visible.size - Point::new(1, 1);
        let (x0, y0) = apply_rotation(visible.top_left.x, visible.top_left.y, width, height, self.rotation);
        let (x1, y1) = apply_rotation(far.x, far.y, width, height, self.rotation);
        let native = Rectangle::with_corners(Point::new(x0, y0), Point::new(x1, y1));
        let color = if self.inverted { complement(color) } else { color };
        self.target.fill_solid(&native, color)
    }
}

/// Places one glyph at `origin`, each font pixel becoming an `sx` x `sy` block
struct Scaled<'a, T> {
    target: &'a mut T,
    origin: Point,
    sx: u32,
    sy: u32,
}

impl<T> OriginDimensions for Scaled<'_, T> {
    fn size(&self) -> Size {
        FONT.character_size
    }
}

impl<T: DrawTarget<Color = Rgb565>> DrawTarget for Scaled<'_, T> {
    type Color = Rgb565;
    type Error = T::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            let block = self.scale(&Rectangle::new(p, Size::new(1, 1)));
            self.target.fill_solid(&block, c)?;
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let cell = area.intersection(&self.bounding_box());
        if cell.is_zero_sized() {
            return Ok(());
        }
        let block = self.scale(&cell);
        self.target.fill_solid(&block, color)
    }
}

impl<T> Scaled<'_, T> {
    fn scale(&self, area: &Rectangle) -> Rectangle {
        let at = self.origin
            + Point::new(area.top_left.x * self.sx as i32, area.top_left.y * self.sy as i32);
        Rectangle::new(at, Size::new(area.size.width * self.sx, area.size.height * self.sy))
    }
}

/// [`Canvas`] over an embedded-graphics draw target
///
/// The target's bounding box is the native panel. Drawing errors of the
/// target are logged and otherwise ignored.
///
/// ## Type Parameters
///
/// * `D` - Draw target with [`Rgb565`] colours
pub struct GraphicsCanvas<D> {
    target: D,
    native: Size,
    palette: Palette,
    rotation: Rotation,
    inverted: bool,
    cursor: Point,
    text_scale: (u32, u32),
    text_color: u16,
    wrap: bool,
}

impl<D> GraphicsCanvas<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    /// Wrap `target`, in native orientation with default drawing state
    ///
    /// Nothing is drawn; call [`Canvas::reset`] to clear the panel.
    pub fn new(target: D) -> Self {
        let native = target.bounding_box().size;
        let palette = Palette::default();
        Self {
            target,
            native,
            palette,
            rotation: Rotation::Rotate0,
            inverted: false,
            cursor: Point::zero(),
            text_scale: (1, 1),
            text_color: palette.fg,
            wrap: true,
        }
    }

    /// The wrapped draw target
    pub fn target(&self) -> &D {
        &self.target
    }

    /// The wrapped draw target, mutably
    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    /// Release the draw target
    pub fn release(self) -> D {
        self.target
    }

    /// Logical size under the current rotation
    pub fn size(&self) -> Size {
        let (w, h) = rotated_size(self.native.width, self.native.height, self.rotation);
        Size::new(w, h)
    }

    fn oriented(&mut self) -> Oriented<'_, D> {
        Oriented {
            target: &mut self.target,
            native: self.native,
            rotation: self.rotation,
            inverted: self.inverted,
        }
    }

    fn ink(&self, ink: Ink) -> Rgb565 {
        color(self.palette.resolve(ink))
    }

    fn draw<T: Drawable<Color = Rgb565>>(&mut self, item: &T) {
        if item.draw(&mut self.oriented()).is_err() {
            log::warn!("draw target rejected a primitive");
        }
    }

    fn cell(&self) -> Size {
        let (sx, sy) = self.text_scale;
        Size::new(FONT.character_size.width * sx, FONT.character_size.height * sy)
    }

    fn wrap_width(&self) -> Option<i32> {
        self.wrap.then(|| self.size().width as i32)
    }

    fn glyph(&mut self, c: char, at: Point, fg: Rgb565, bg: Option<Rgb565>, scale: (u32, u32)) {
        let mut style = MonoTextStyleBuilder::new().font(&FONT).text_color(fg);
        if let Some(bg) = bg {
            style = style.background_color(bg);
        }
        let mut buf = [0u8; 4];
        let text = Text::with_baseline(c.encode_utf8(&mut buf), Point::zero(), style.build(), Baseline::Top);

        let mut oriented = self.oriented();
        let mut scaled = Scaled {
            target: &mut oriented,
            origin: at,
            sx: scale.0,
            sy: scale.1,
        };
        if text.draw(&mut scaled).is_err() {
            log::warn!("draw target rejected glyph {:?}", c);
        }
    }
}

impl<D> Canvas for GraphicsCanvas<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    fn reset(&mut self) {
        self.palette = Palette::default();
        self.clear();
        self.cursor = Point::zero();
        self.text_color = self.palette.fg;
        self.wrap = true;
        self.text_scale = (1, 1);
    }

    fn clear(&mut self) {
        self.fill_screen(Ink::Background);
    }

    fn print(&mut self, text: &str) {
        let cell = self.cell();
        let wrap = self.wrap_width();
        let fg = color(self.text_color);
        let scale = self.text_scale;
        let start = self.cursor;
        let end = layout(text, start, cell, wrap, |c, at| {
            self.glyph(c, at, fg, None, scale);
        });
        self.cursor = end;
    }

    fn set_cursor(&mut self, x: i16, y: i16) {
        self.cursor = point(x, y);
    }

    fn set_fg_color(&mut self, r: u8, g: u8, b: u8) {
        self.palette.fg = rgb565(r, g, b);
    }

    fn set_bg_color(&mut self, r: u8, g: u8, b: u8) {
        self.palette.bg = rgb565(r, g, b);
    }

    fn draw_pixel(&mut self, x: i16, y: i16, ink: Ink) {
        let pixel = Pixel(point(x, y), self.ink(ink));
        self.draw(&pixel);
    }

    fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    fn invert(&mut self, inverted: bool) {
        self.inverted = inverted;
    }

    fn draw_fast_vline(&mut self, x: i16, y: i16, h: i16, ink: Ink) {
        self.fill_rect(x, y, 1, h, ink);
    }

    fn draw_fast_hline(&mut self, x: i16, y: i16, w: i16, ink: Ink) {
        self.fill_rect(x, y, w, 1, ink);
    }

    fn fill_screen(&mut self, ink: Ink) {
        let color = self.ink(ink);
        if self.oriented().clear(color).is_err() {
            log::warn!("draw target rejected fill");
        }
    }

    fn draw_line(&mut self, x0: i16, y0: i16, x1: i16, y1: i16, ink: Ink) {
        let line = Line::new(point(x0, y0), point(x1, y1))
            .into_styled(PrimitiveStyle::with_stroke(self.ink(ink), 1));
        self.draw(&line);
    }

    fn draw_rect(&mut self, x: i16, y: i16, w: i16, h: i16, ink: Ink) {
        if let Some(area) = rect(x, y, w, h) {
            let styled = area.into_styled(stroke(self.ink(ink)));
            self.draw(&styled);
        }
    }

    fn fill_rect(&mut self, x: i16, y: i16, w: i16, h: i16, ink: Ink) {
        if let Some(area) = rect(x, y, w, h) {
            let styled = area.into_styled(PrimitiveStyle::with_fill(self.ink(ink)));
            self.draw(&styled);
        }
    }

    fn draw_circle(&mut self, x: i16, y: i16, r: i16, ink: Ink) {
        if r < 0 {
            return;
        }
        let circle = Circle::with_center(point(x, y), 2 * r as u32 + 1)
            .into_styled(stroke(self.ink(ink)));
        self.draw(&circle);
    }

    fn fill_circle(&mut self, x: i16, y: i16, r: i16, ink: Ink) {
        if r < 0 {
            return;
        }
        let circle = Circle::with_center(point(x, y), 2 * r as u32 + 1)
            .into_styled(PrimitiveStyle::with_fill(self.ink(ink)));
        self.draw(&circle);
    }

    fn draw_triangle(&mut self, x0: i16, y0: i16, x1: i16, y1: i16, x2: i16, y2: i16, ink: Ink) {
        let triangle = Triangle::new(point(x0, y0), point(x1, y1), point(x2, y2))
            .into_styled(PrimitiveStyle::with_stroke(self.ink(ink), 1));
        self.draw(&triangle);
    }

    fn fill_triangle(&mut self, x0: i16, y0: i16, x1: i16, y1: i16, x2: i16, y2: i16, ink: Ink) {
        let triangle = Triangle::new(point(x0, y0), point(x1, y1), point(x2, y2))
            .into_styled(PrimitiveStyle::with_fill(self.ink(ink)));
        self.draw(&triangle);
    }

    fn draw_round_rect(&mut self, x: i16, y: i16, w: i16, h: i16, r: i16, ink: Ink) {
        if let Some(area) = rect(x, y, w, h) {
            let styled = rounded(area, r).into_styled(stroke(self.ink(ink)));
            self.draw(&styled);
        }
    }

    fn fill_round_rect(&mut self, x: i16, y: i16, w: i16, h: i16, r: i16, ink: Ink) {
        if let Some(area) = rect(x, y, w, h) {
            let styled = rounded(area, r).into_styled(PrimitiveStyle::with_fill(self.ink(ink)));
            self.draw(&styled);
        }
    }

    fn draw_char(&mut self, x: i16, y: i16, code: u8, fg: Ink, bg: Ink, size: u8) {
        let fg_color = self.ink(fg);
        // same ink on both sides draws the glyph without background
        let bg_color = (fg != bg).then(|| self.ink(bg));
        let size = u32::from(size.max(1));
        self.glyph(char::from(code), point(x, y), fg_color, bg_color, (size, size));
    }

    fn set_text_size(&mut self, sx: u8, sy: u8) {
        self.text_scale = (u32::from(sx.max(1)), u32::from(sy.max(1)));
    }

    fn set_text_color(&mut self, ink: Ink) {
        self.text_color = self.palette.resolve(ink);
    }

    fn set_text_wrap(&mut self, wrap: bool) {
        self.wrap = wrap;
    }

    fn text_bounds(&mut self, text: &str, x: i16, y: i16) -> TextBounds {
        let cell = self.cell();
        let mut min = Point::new(i32::MAX, i32::MAX);
        let mut max = Point::new(i32::MIN, i32::MIN);
        layout(text, point(x, y), cell, self.wrap_width(), |_, at| {
            min = min.component_min(at);
            max = max.component_max(at + cell - Point::new(1, 1));
        });

        if max.x < min.x {
            return TextBounds { x, y, w: 0, h: 0 };
        }
        TextBounds {
            x: min.x as i16,
            y: min.y as i16,
            w: (max.x - min.x + 1) as u16,
            h: (max.y - min.y + 1) as u16,
        }
    }

    fn rotation(&self) -> Rotation {
        self.rotation
    }

    fn cursor(&self) -> (i16, i16) {
        (self.cursor.x as i16, self.cursor.y as i16)
    }
}

/// Rounded rectangle with the corner radius capped at half the short side
fn rounded(area: Rectangle, r: i16) -> RoundedRectangle {
    let cap = area.size.width.min(area.size.height) / 2;
    let r = u32::try_from(r).unwrap_or(0).min(cap);
    RoundedRectangle::with_equal_corners(area, Size::new(r, r))
}

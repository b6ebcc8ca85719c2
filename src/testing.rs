//! Hand-written collaborators shared by the unit tests

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, ErrorKind, InputPin};

use crate::canvas::{Canvas, TextBounds};
use crate::color::Ink;
use crate::config::Rotation;
use crate::wait::Clock;

#[derive(Debug)]
pub struct MockPinError;

impl digital::Error for MockPinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Input pin whose level is shared between clones
#[derive(Clone, Debug, Default)]
pub struct MockPin {
    high: Rc<Cell<bool>>,
    fail: Rc<Cell<bool>>,
}

impl MockPin {
    pub fn new(high: bool) -> Self {
        let pin = Self::default();
        pin.set_level(high);
        pin
    }

    pub fn set_level(&self, high: bool) {
        self.high.set(high);
    }

    pub fn fail(&self, fail: bool) {
        self.fail.set(fail);
    }
}

impl digital::ErrorType for MockPin {
    type Error = MockPinError;
}

impl InputPin for MockPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        if self.fail.get() {
            return Err(MockPinError);
        }
        Ok(self.high.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// Millisecond clock shared between clones
#[derive(Clone, Debug, Default)]
pub struct MockClock {
    now: Rc<Cell<u32>>,
}

impl MockClock {
    pub fn at(ms: u32) -> Self {
        let clock = Self::default();
        clock.now.set(ms);
        clock
    }

    pub fn get(&self) -> u32 {
        self.now.get()
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Clock for MockClock {
    fn now_ms(&mut self) -> u32 {
        self.now.get()
    }
}

type Event = Box<dyn FnMut()>;

/// Delay that advances a [`MockClock`] and fires scheduled events
pub struct MockDelay {
    clock: MockClock,
    pending_ns: u32,
    schedule: Vec<(u32, Option<Event>)>,
    pub slept_ms: u32,
}

impl MockDelay {
    pub fn new(clock: MockClock) -> Self {
        Self {
            clock,
            pending_ns: 0,
            schedule: Vec::new(),
            slept_ms: 0,
        }
    }

    /// Run `event` once the clock reaches `ms`
    pub fn at(&mut self, ms: u32, event: impl FnMut() + 'static) {
        self.schedule.push((ms, Some(Box::new(event))));
    }

    fn advance(&mut self, ms: u32) {
        self.clock.advance(ms);
        self.slept_ms += ms;
        let now = self.clock.get();
        for (when, event) in &mut self.schedule {
            if *when <= now {
                if let Some(mut event) = event.take() {
                    event();
                }
            }
        }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.pending_ns += ns;
        let ms = self.pending_ns / 1_000_000;
        self.pending_ns %= 1_000_000;
        self.advance(ms);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(ms);
    }
}

#[derive(Debug, Default)]
struct SerialState {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

/// Serial port whose input and output are shared between clones
#[derive(Clone, Debug, Default)]
pub struct MockSerial {
    state: Rc<RefCell<SerialState>>,
}

impl MockSerial {
    pub fn feed(&self, bytes: &[u8]) {
        self.state.borrow_mut().input.extend(bytes);
    }

    pub fn output(&self) -> alloc::string::String {
        alloc::string::String::from_utf8_lossy(&self.state.borrow().output).into_owned()
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().input.len()
    }
}

impl embedded_io::ErrorType for MockSerial {
    type Error = Infallible;
}

impl embedded_io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut state = self.state.borrow_mut();
        let mut n = 0;
        while n < buf.len() {
            match state.input.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}

impl embedded_io::ReadReady for MockSerial {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.state.borrow().input.is_empty())
    }
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.state.borrow_mut().output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// One recorded canvas call
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Reset,
    Clear,
    Print(alloc::string::String),
    SetCursor(i16, i16),
    SetFgColor(u8, u8, u8),
    SetBgColor(u8, u8, u8),
    DrawPixel(i16, i16, Ink),
    SetRotation(Rotation),
    Invert(bool),
    DrawFastVLine(i16, i16, i16, Ink),
    DrawFastHLine(i16, i16, i16, Ink),
    FillScreen(Ink),
    DrawLine(i16, i16, i16, i16, Ink),
    DrawRect(i16, i16, i16, i16, Ink),
    FillRect(i16, i16, i16, i16, Ink),
    DrawCircle(i16, i16, i16, Ink),
    FillCircle(i16, i16, i16, Ink),
    DrawTriangle(i16, i16, i16, i16, i16, i16, Ink),
    FillTriangle(i16, i16, i16, i16, i16, i16, Ink),
    DrawRoundRect(i16, i16, i16, i16, i16, Ink),
    FillRoundRect(i16, i16, i16, i16, i16, Ink),
    DrawChar(i16, i16, u8, Ink, Ink, u8),
    SetTextSize(u8, u8),
    SetTextColor(Ink),
    SetTextWrap(bool),
}

/// Canvas that records every mutating call
///
/// Printing advances the cursor by six pixels per byte; text bounds are
/// six by eight pixels per byte.
#[derive(Debug, Default)]
pub struct MockCanvas {
    pub calls: Vec<Call>,
    rotation: Rotation,
    cursor: (i16, i16),
}

impl Canvas for MockCanvas {
    fn reset(&mut self) {
        self.cursor = (0, 0);
        self.calls.push(Call::Reset);
    }

    fn clear(&mut self) {
        self.calls.push(Call::Clear);
    }

    fn print(&mut self, text: &str) {
        self.cursor.0 += 6 * text.len() as i16;
        self.calls.push(Call::Print(text.into()));
    }

    fn set_cursor(&mut self, x: i16, y: i16) {
        self.cursor = (x, y);
        self.calls.push(Call::SetCursor(x, y));
    }

    fn set_fg_color(&mut self, r: u8, g: u8, b: u8) {
        self.calls.push(Call::SetFgColor(r, g, b));
    }

    fn set_bg_color(&mut self, r: u8, g: u8, b: u8) {
        self.calls.push(Call::SetBgColor(r, g, b));
    }

    fn draw_pixel(&mut self, x: i16, y: i16, ink: Ink) {
        self.calls.push(Call::DrawPixel(x, y, ink));
    }

    fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
        self.calls.push(Call::SetRotation(rotation));
    }

    fn invert(&mut self, inverted: bool) {
        self.calls.push(Call::Invert(inverted));
    }

    fn draw_fast_vline(&mut self, x: i16, y: i16, h: i16, ink: Ink) {
        self.calls.push(Call::DrawFastVLine(x, y, h, ink));
    }

    fn draw_fast_hline(&mut self, x: i16, y: i16, w: i16, ink: Ink) {
        self.calls.push(Call::DrawFastHLine(x, y, w, ink));
    }

    fn fill_screen(&mut self, ink: Ink) {
        self.calls.push(Call::FillScreen(ink));
    }

    fn draw_line(&mut self, x0: i16, y0: i16, x1: i16, y1: i16, ink: Ink) {
        self.calls.push(Call::DrawLine(x0, y0, x1, y1, ink));
    }

    fn draw_rect(&mut self, x: i16, y: i16, w: i16, h: i16, ink: Ink) {
        self.calls.push(Call::DrawRect(x, y, w, h, ink));
    }

    fn fill_rect(&mut self, x: i16, y: i16, w: i16, h: i16, ink: Ink) {
        self.calls.push(Call::FillRect(x, y, w, h, ink));
    }

    fn draw_circle(&mut self, x: i16, y: i16, r: i16, ink: Ink) {
        self.calls.push(Call::DrawCircle(x, y, r, ink));
    }

    fn fill_circle(&mut self, x: i16, y: i16, r: i16, ink: Ink) {
        self.calls.push(Call::FillCircle(x, y, r, ink));
    }

    fn draw_triangle(&mut self, x0: i16, y0: i16, x1: i16, y1: i16, x2: i16, y2: i16, ink: Ink) {
        self.calls.push(Call::DrawTriangle(x0, y0, x1, y1, x2, y2, ink));
    }

    fn fill_triangle(&mut self, x0: i16, y0: i16, x1: i16, y1: i16, x2: i16, y2: i16, ink: Ink) {
        self.calls.push(Call::FillTriangle(x0, y0, x1, y1, x2, y2, ink));
    }

    fn draw_round_rect(&mut self, x: i16, y: i16, w: i16, h: i16, r: i16, ink: Ink) {
        self.calls.push(Call::DrawRoundRect(x, y, w, h, r, ink));
    }

    fn fill_round_rect(&mut self, x: i16, y: i16, w: i16, h: i16, r: i16, ink: Ink) {
        self.calls.push(Call::FillRoundRect(x, y, w, h, r, ink));
    }

    fn draw_char(&mut self, x: i16, y: i16, code: u8, fg: Ink, bg: Ink, size: u8) {
        self.calls.push(Call::DrawChar(x, y, code, fg, bg, size));
    }

    fn set_text_size(&mut self, sx: u8, sy: u8) {
        self.calls.push(Call::SetTextSize(sx, sy));
    }

    fn set_text_color(&mut self, ink: Ink) {
        self.calls.push(Call::SetTextColor(ink));
    }

    fn set_text_wrap(&mut self, wrap: bool) {
        self.calls.push(Call::SetTextWrap(wrap));
    }

    fn text_bounds(&mut self, text: &str, x: i16, y: i16) -> TextBounds {
        TextBounds {
            x,
            y,
            w: 6 * text.len() as u16,
            h: 8,
        }
    }

    fn rotation(&self) -> Rotation {
        self.rotation
    }

    fn cursor(&self) -> (i16, i16) {
        self.cursor
    }
}

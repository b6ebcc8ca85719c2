//! Command server
//!
//! [`Controller`] owns every piece of device state: the display canvas, the
//! transaction queue, the buttons and the serial port. It turns command lines
//! into effects and answers each line with exactly one response.
//!
//! ## Lifecycle
//!
//! 1. [`Controller::new`] with a [`Config`], the canvas, the three button pins,
//!    a clock, a delay and the serial port
//! 2. [`Controller::begin`] once at boot
//! 3. [`Controller::run`], or [`Controller::poll`] from an existing main loop
//!
//! ## Memory
//!
//! Queued drawing commands are stored inline, each with room for a full
//! `print` line, so the default queue of [`QUEUE_CAPACITY`] actions takes
//! about 180 KiB. Place the controller in a `static` (for example with
//! `static_cell`) instead of on a task stack, or pick a smaller queue with
//! the last type parameter.
//!
//! ## Example
//!
//! ```rust,no_run
//! use serial_tft::{Builder, Controller, Dimensions, Rotation};
//! use static_cell::StaticCell;
//! # use core::convert::Infallible;
//! # use embedded_hal::delay::DelayNs;
//! # use embedded_hal::digital::InputPin;
//! # use serial_tft::{Canvas, Clock, Ink, TextBounds};
//! # struct Tft;
//! # impl Canvas for Tft {
//! #     fn reset(&mut self) {}
//! #     fn clear(&mut self) {}
//! #     fn print(&mut self, _: &str) {}
//! #     fn set_cursor(&mut self, _: i16, _: i16) {}
//! #     fn set_fg_color(&mut self, _: u8, _: u8, _: u8) {}
//! #     fn set_bg_color(&mut self, _: u8, _: u8, _: u8) {}
//! #     fn draw_pixel(&mut self, _: i16, _: i16, _: Ink) {}
//! #     fn set_rotation(&mut self, _: Rotation) {}
//! #     fn invert(&mut self, _: bool) {}
//! #     fn draw_fast_vline(&mut self, _: i16, _: i16, _: i16, _: Ink) {}
//! #     fn draw_fast_hline(&mut self, _: i16, _: i16, _: i16, _: Ink) {}
//! #     fn fill_screen(&mut self, _: Ink) {}
//! #     fn draw_line(&mut self, _: i16, _: i16, _: i16, _: i16, _: Ink) {}
//! #     fn draw_rect(&mut self, _: i16, _: i16, _: i16, _: i16, _: Ink) {}
//! #     fn fill_rect(&mut self, _: i16, _: i16, _: i16, _: i16, _: Ink) {}
//! #     fn draw_circle(&mut self, _: i16, _: i16, _: i16, _: Ink) {}
//! #     fn fill_circle(&mut self, _: i16, _: i16, _: i16, _: Ink) {}
//! #     fn draw_triangle(&mut self, _: i16, _: i16, _: i16, _: i16, _: i16, _: i16, _: Ink) {}
//! #     fn fill_triangle(&mut self, _: i16, _: i16, _: i16, _: i16, _: i16, _: i16, _: Ink) {}
//! #     fn draw_round_rect(&mut self, _: i16, _: i16, _: i16, _: i16, _: i16, _: Ink) {}
//! #     fn fill_round_rect(&mut self, _: i16, _: i16, _: i16, _: i16, _: i16, _: Ink) {}
//! #     fn draw_char(&mut self, _: i16, _: i16, _: u8, _: Ink, _: Ink, _: u8) {}
//! #     fn set_text_size(&mut self, _: u8, _: u8) {}
//! #     fn set_text_color(&mut self, _: Ink) {}
//! #     fn set_text_wrap(&mut self, _: bool) {}
//! #     fn text_bounds(&mut self, _: &str, x: i16, y: i16) -> TextBounds {
//! #         TextBounds { x, y, w: 0, h: 0 }
//! #     }
//! #     fn rotation(&self) -> Rotation { Rotation::Rotate0 }
//! #     fn cursor(&self) -> (i16, i16) { (0, 0) }
//! # }
//! # struct Pin;
//! # impl embedded_hal::digital::ErrorType for Pin { type Error = Infallible; }
//! # impl InputPin for Pin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! # }
//! # struct Millis;
//! # impl Clock for Millis { fn now_ms(&mut self) -> u32 { 0 } }
//! # struct Delay;
//! # impl DelayNs for Delay { fn delay_ns(&mut self, _ns: u32) {} }
//! # struct Uart;
//! # impl embedded_io::ErrorType for Uart { type Error = Infallible; }
//! # impl embedded_io::Read for Uart {
//! #     fn read(&mut self, _: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl embedded_io::ReadReady for Uart {
//! #     fn read_ready(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! # }
//! # impl embedded_io::Write for Uart {
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! let dims = match Dimensions::new(240, 135) {
//!     Ok(dims) => dims,
//!     Err(_) => return,
//! };
//! let config = match Builder::new().dimensions(dims).rotation(Rotation::Rotate270).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! static CONTROLLER: StaticCell<Controller<Tft, Pin, Millis, Delay, Uart>> = StaticCell::new();
//! let controller = CONTROLLER
//!     .init_with(|| Controller::new(config, Tft, [Pin, Pin, Pin], Millis, Delay, Uart));
//! controller.begin();
//! if let Err(err) = controller.run() {
//!     let _ = err;
//! }
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;
use embedded_io::{Read, ReadReady, Write};
use heapless::Vec;

use crate::action::{Action, MAX_ARGS, Opcode};
use crate::args::{Args, split};
use crate::button::{Buttons, Edge};
use crate::canvas::Canvas;
use crate::command::{CommandTable, Handler};
use crate::config::Config;
use crate::error::{CommandError, ServeError};
use crate::escape::unescape;
use crate::response::{LINE_ENDING, Response};
use crate::transaction::{QUEUE_CAPACITY, Transaction};
use crate::wait::{Clock, Session};

/// Longest accepted command line in bytes, terminator excluded
pub const LINE_CAPACITY: usize = 128;

type HandlerResult = core::result::Result<Response, CommandError>;
type ServeResult<T, E> = core::result::Result<T, ServeError<E>>;

/// Serial command server for one display and three buttons
///
/// ## Type Parameters
///
/// * `V` - Display, implementing [`Canvas`]
/// * `P` - Button input pin
/// * `C` - Millisecond [`Clock`]
/// * `D` - Delay provider
/// * `S` - Serial port
/// * `N` - Transaction queue capacity
pub struct Controller<V, P, C, D, S, const N: usize = QUEUE_CAPACITY> {
    config: Config,
    canvas: V,
    transaction: Transaction<N>,
    buttons: Buttons<P>,
    clock: C,
    delay: D,
    serial: S,
    report_levels: bool,
    commands: CommandTable<Self>,
    line: Vec<u8, LINE_CAPACITY>,
    line_overflow: bool,
}

impl<V, P, C, D, S, const N: usize> Controller<V, P, C, D, S, N>
where
    V: Canvas,
    P: InputPin,
    C: Clock,
    D: DelayNs,
    S: Read + ReadReady + Write,
{
    /// Create a controller
    ///
    /// `pins` are the inputs of buttons A, B and C, in that order.
    pub fn new(config: Config, canvas: V, pins: [P; 3], clock: C, delay: D, serial: S) -> Self {
        let buttons = Buttons::new(pins, &config);
        let commands = Self::command_table();
        log::info!(
            "controller ready: {}x{}, {} commands, queue of {}",
            config.dimensions.width,
            config.dimensions.height,
            commands.len(),
            N
        );
        Self {
            config,
            canvas,
            transaction: Transaction::new(),
            buttons,
            clock,
            delay,
            serial,
            report_levels: false,
            commands,
            line: Vec::new(),
            line_overflow: false,
        }
    }

    fn command_table() -> CommandTable<Self> {
        use crate::command::*;

        CommandTable::new(&[
            (AUTO_DISPLAY, Handler::Run(Self::auto_display)),
            (AUTO_READ_BUTTONS, Handler::Run(Self::auto_read_buttons)),
            (DISPLAY, Handler::Run(Self::display)),
            (RESET, Handler::Run(Self::reset)),
            (PRINT, Handler::Run(Self::print)),
            (CLEAR_DISPLAY, Handler::Queue(Opcode::Clear)),
            (CLEAR, Handler::Queue(Opcode::Clear)),
            (HOME, Handler::Queue(Opcode::Home)),
            (SET_TEXT_SIZE, Handler::Run(Self::set_text_size)),
            (SET_CURSOR, Handler::Queue(Opcode::SetCursor)),
            (SET_TEXT_COLOR, Handler::Queue(Opcode::SetTextColor)),
            (SET_TEXT_WRAP, Handler::Queue(Opcode::SetTextWrap)),
            (DRAW_CHAR, Handler::Queue(Opcode::DrawChar)),
            (SET_FG_COLOR, Handler::Queue(Opcode::SetFgColor)),
            (SET_BG_COLOR, Handler::Queue(Opcode::SetBgColor)),
            (SET_ROTATION, Handler::Queue(Opcode::SetRotation)),
            (INVERT_DISPLAY, Handler::Run(Self::invert_display)),
            (DRAW_PIXEL, Handler::Queue(Opcode::DrawPixel)),
            (DRAW_FAST_VLINE, Handler::Queue(Opcode::DrawFastVLine)),
            (DRAW_FAST_HLINE, Handler::Queue(Opcode::DrawFastHLine)),
            (FILL_SCREEN, Handler::Queue(Opcode::FillScreen)),
            (DRAW_LINE, Handler::Queue(Opcode::DrawLine)),
            (DRAW_RECT, Handler::Queue(Opcode::DrawRect)),
            (FILL_RECT, Handler::Queue(Opcode::FillRect)),
            (DRAW_CIRCLE, Handler::Queue(Opcode::DrawCircle)),
            (FILL_CIRCLE, Handler::Queue(Opcode::FillCircle)),
            (DRAW_TRIANGLE, Handler::Queue(Opcode::DrawTriangle)),
            (FILL_TRIANGLE, Handler::Queue(Opcode::FillTriangle)),
            (DRAW_ROUND_RECT, Handler::Queue(Opcode::DrawRoundRect)),
            (FILL_ROUND_RECT, Handler::Queue(Opcode::FillRoundRect)),
            (WIDTH, Handler::Run(Self::width)),
            (HEIGHT, Handler::Run(Self::height)),
            (GET_ROTATION, Handler::Run(Self::get_rotation)),
            (GET_CURSOR_X, Handler::Run(Self::get_cursor_x)),
            (GET_CURSOR_Y, Handler::Run(Self::get_cursor_y)),
            (GET_TEXT_BOUNDS, Handler::Run(Self::get_text_bounds)),
            (READ_BUTTONS, Handler::Run(Self::read_buttons)),
            (WAIT_BUTTON, Handler::Run(Self::wait_button)),
            (WATCH_BUTTONS, Handler::Run(Self::watch_buttons)),
            (MONITOR_BUTTONS, Handler::Run(Self::monitor_buttons)),
        ])
    }

    /// Bring the display to its default state and discard button edges
    ///
    /// Inverted inputs read as a transition on their first sample; flushing
    /// here keeps that out of the first `waitButton`.
    pub fn begin(&mut self) {
        self.reset_canvas();
        let now = self.clock.now_ms();
        self.buttons.flush(now);
    }

    /// Interpret one command line
    ///
    /// `line` holds the raw text without its terminator. Escapes are resolved
    /// in place.
    pub fn interpret(&mut self, line: &mut [u8]) -> Response {
        let len = unescape(line);
        let bytes = &line[..len];
        let text = core::str::from_utf8(bytes).unwrap_or_else(|e| {
            log::warn!("invalid UTF-8 at byte {}, line truncated", e.valid_up_to());
            core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default()
        });
        log::debug!("< {}", text);

        let (keyword, rest) = split(text);
        let Some(handler) = self.commands.lookup(keyword) else {
            return Response::Error(CommandError::UnknownCommand);
        };

        let mut args = Args::new(rest);
        let result = match handler {
            Handler::Queue(opcode) => self.queue(opcode, &mut args),
            Handler::Run(run) => run(self, &mut args),
        };
        result.unwrap_or_else(Response::Error)
    }

    /// Read every available byte, answering each completed line
    ///
    /// Returns whether at least one line was handled. Carriage returns are
    /// ignored. Bytes beyond [`LINE_CAPACITY`] are dropped until the next
    /// newline.
    pub fn poll(&mut self) -> ServeResult<bool, S::Error> {
        let mut handled = false;
        let mut byte = [0u8; 1];

        while self.serial.read_ready().map_err(ServeError::Transport)? {
            if self.serial.read(&mut byte).map_err(ServeError::Transport)? == 0 {
                break;
            }
            match byte[0] {
                b'\r' => {}
                b'\n' => {
                    self.complete_line()?;
                    handled = true;
                }
                b => self.push_byte(b),
            }
        }
        Ok(handled)
    }

    /// Serve forever, sleeping one tick whenever the port is idle
    pub fn run(&mut self) -> ServeResult<core::convert::Infallible, S::Error> {
        loop {
            if !self.poll()? {
                self.delay.delay_ms(self.config.tick_ms);
            }
        }
    }

    fn push_byte(&mut self, byte: u8) {
        if self.line.push(byte).is_err() && !self.line_overflow {
            log::warn!("line longer than {} bytes, truncating", LINE_CAPACITY);
            self.line_overflow = true;
        }
    }

    fn complete_line(&mut self) -> ServeResult<(), S::Error> {
        let mut line = core::mem::take(&mut self.line);
        self.line_overflow = false;

        let response = self.interpret(&mut line);

        line.clear();
        self.line = line;
        self.respond(&response)
    }

    fn respond(&mut self, response: &Response) -> ServeResult<(), S::Error> {
        let text = response.encode();
        log::debug!("> {}", text);
        self.serial
            .write_all(text.as_bytes())
            .and_then(|()| self.serial.write_all(LINE_ENDING.as_bytes()))
            .and_then(|()| self.serial.flush())
            .map_err(ServeError::Transport)
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The display
    pub fn canvas(&self) -> &V {
        &self.canvas
    }

    /// The display, mutably
    pub fn canvas_mut(&mut self) -> &mut V {
        &mut self.canvas
    }

    /// Pending drawing commands
    pub fn transaction(&self) -> &Transaction<N> {
        &self.transaction
    }

    fn ok(&mut self) -> Response {
        if self.report_levels {
            let now = self.clock.now_ms();
            Response::OkLevels(self.buttons.levels(now))
        } else {
            Response::Ok
        }
    }

    fn reset_canvas(&mut self) {
        self.canvas.reset();
        self.canvas.set_rotation(self.config.rotation);
    }

    fn session(&mut self) -> (Session<'_, C, D, S>, &mut Buttons<P>) {
        let session = Session::new(
            &mut self.clock,
            &mut self.delay,
            &mut self.serial,
            self.config.tick_ms,
        );
        (session, &mut self.buttons)
    }

    fn queue(&mut self, opcode: Opcode, args: &mut Args<'_>) -> HandlerResult {
        let arity = opcode.arity();
        let mut values = [0i32; MAX_ARGS];
        for value in &mut values[..arity] {
            *value = args.int()?;
        }
        args.finish()?;
        self.add(opcode, &values[..arity]);
        Ok(self.ok())
    }

    fn add(&mut self, opcode: Opcode, values: &[i32]) {
        match Action::new(opcode, values) {
            Some(action) => self.transaction.add(action, &mut self.canvas),
            None => log::warn!("{:?} rejected {} args", opcode, values.len()),
        }
    }

    fn auto_display(&mut self, args: &mut Args<'_>) -> HandlerResult {
        let on = args.flag()?;
        args.finish()?;
        self.transaction.enable(!on);
        Ok(self.ok())
    }

    fn auto_read_buttons(&mut self, args: &mut Args<'_>) -> HandlerResult {
        let on = args.flag()?;
        args.finish()?;
        self.report_levels = on;
        Ok(self.ok())
    }

    fn display(&mut self, args: &mut Args<'_>) -> HandlerResult {
        args.finish()?;
        self.transaction.commit(&mut self.canvas);
        Ok(self.ok())
    }

    fn reset(&mut self, args: &mut Args<'_>) -> HandlerResult {
        args.finish()?;
        self.reset_canvas();
        self.transaction.clear();
        log::info!("display reset");
        Ok(self.ok())
    }

    fn print(&mut self, args: &mut Args<'_>) -> HandlerResult {
        let text = args.text()?;
        self.transaction.add(Action::print(text), &mut self.canvas);
        Ok(self.ok())
    }

    fn set_text_size(&mut self, args: &mut Args<'_>) -> HandlerResult {
        let sx = args.int()?;
        let sy = args.int_or(-1);
        args.finish()?;
        self.add(Opcode::SetTextSize, &[sx, sy]);
        Ok(self.ok())
    }

    fn invert_display(&mut self, args: &mut Args<'_>) -> HandlerResult {
        let inverted = args.bool_or(true);
        args.finish()?;
        self.add(Opcode::Invert, &[i32::from(inverted)]);
        Ok(self.ok())
    }

    fn width(&mut self, args: &mut Args<'_>) -> HandlerResult {
        args.finish()?;
        Ok(Response::Number(self.config.dimensions.width.into()))
    }

    fn height(&mut self, args: &mut Args<'_>) -> HandlerResult {
        args.finish()?;
        Ok(Response::Number(self.config.dimensions.height.into()))
    }

    fn get_rotation(&mut self, args: &mut Args<'_>) -> HandlerResult {
        args.finish()?;
        self.transaction.commit(&mut self.canvas);
        Ok(Response::Number(self.canvas.rotation().index().into()))
    }

    fn get_cursor_x(&mut self, args: &mut Args<'_>) -> HandlerResult {
        args.finish()?;
        self.transaction.commit(&mut self.canvas);
        Ok(Response::Number(self.canvas.cursor().0.into()))
    }

    fn get_cursor_y(&mut self, args: &mut Args<'_>) -> HandlerResult {
        args.finish()?;
        self.transaction.commit(&mut self.canvas);
        Ok(Response::Number(self.canvas.cursor().1.into()))
    }

    fn get_text_bounds(&mut self, args: &mut Args<'_>) -> HandlerResult {
        let x = args.int()?;
        let y = args.int()?;
        let text = args.text()?;
        self.transaction.commit(&mut self.canvas);
        let bounds = self.canvas.text_bounds(text, x as i16, y as i16);
        Ok(Response::Bounds(bounds))
    }

    fn read_buttons(&mut self, args: &mut Args<'_>) -> HandlerResult {
        args.finish()?;
        let now = self.clock.now_ms();
        Ok(Response::Levels(self.buttons.levels(now)))
    }

    fn wait_button(&mut self, args: &mut Args<'_>) -> HandlerResult {
        let timeout = millis(args.int()?);
        let edge = if args.flag()? { Edge::Up } else { Edge::Down };
        args.finish()?;
        let (mut session, buttons) = self.session();
        Ok(Response::Button(session.wait_for_edge(buttons, timeout, edge)))
    }

    fn watch_buttons(&mut self, args: &mut Args<'_>) -> HandlerResult {
        let duration = millis(args.int_or(0));
        let interval = args.int_or(-1);
        args.finish()?;
        let interval = self.interval(interval);
        let (mut session, buttons) = self.session();
        if let Err(e) = session.watch(buttons, duration, interval) {
            log::warn!("watchButtons stopped: {:?}", e);
        }
        Ok(Response::Silent)
    }

    fn monitor_buttons(&mut self, args: &mut Args<'_>) -> HandlerResult {
        let duration = millis(args.int()?);
        let interval = args.int_or(-1);
        args.finish()?;
        let interval = self.interval(interval);
        let (mut session, buttons) = self.session();
        if let Err(e) = session.monitor(buttons, duration, interval) {
            log::warn!("monitorButtons stopped: {:?}", e);
        }
        Ok(self.ok())
    }

    /// Sampling interval argument, with a negative value meaning the default
    fn interval(&self, value: i32) -> u32 {
        if value < 0 {
            self.config.sample_interval_ms
        } else {
            millis(value)
        }
    }
}

/// Duration argument in milliseconds; negative values count as zero
fn millis(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

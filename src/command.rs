//! Command keywords and the keyword → handler table
//!
//! Every line starts with one of the keywords defined here. Keywords are
//! matched ASCII case-insensitively, so `DRAWPIXEL`, `drawpixel` and
//! `drawPixel` name the same command.
//!
//! ## Handler kinds
//!
//! - [`Handler::Queue`]: a drawing command whose arguments are exactly the
//!   opcode's integers. It becomes an [`Action`](crate::action::Action) and
//!   goes through the transaction queue.
//! - [`Handler::Run`]: anything with its own argument shape (text, optional
//!   arguments, queries, control, blocking input protocols).
//!
//! ## Example
//!
//! ```
//! use serial_tft::action::Opcode;
//! use serial_tft::command::{self, CommandTable, Handler};
//!
//! struct Device;
//!
//! let table: CommandTable<Device> =
//!     CommandTable::new(&[(command::DRAW_PIXEL, Handler::Queue(Opcode::DrawPixel))]);
//!
//! assert!(table.lookup("DRAWPIXEL").is_some());
//! assert!(table.lookup("drawPixels").is_none());
//! ```

use heapless::{FnvIndexMap, String};

use crate::action::Opcode;
use crate::args::Args;
use crate::error::CommandError;
use crate::response::Response;

// Control commands

/// `autoDisplay <bool>`: 1 applies drawing immediately, 0 batches it
pub const AUTO_DISPLAY: &str = "autoDisplay";

/// `autoReadButtons <bool>`: append the pressed buttons to every `OK`
pub const AUTO_READ_BUTTONS: &str = "autoReadButtons";

/// `display`: apply every pending drawing command
pub const DISPLAY: &str = "display";

/// `reset`: restore the display defaults and drop pending commands
pub const RESET: &str = "reset";

// Text commands

/// `print <text>`: render text at the cursor
pub const PRINT: &str = "print";

/// `clearDisplay`: fill with the background colour
pub const CLEAR_DISPLAY: &str = "clearDisplay";

/// `clear`: alias of `clearDisplay`
pub const CLEAR: &str = "clear";

/// `home`: move the cursor to 0,0
pub const HOME: &str = "home";

/// `setTextSize sx [sy]`
pub const SET_TEXT_SIZE: &str = "setTextSize";

/// `setCursor x y`
pub const SET_CURSOR: &str = "setCursor";

/// `setTextColor c`
pub const SET_TEXT_COLOR: &str = "setTextColor";

/// `setTextWrap w`
pub const SET_TEXT_WRAP: &str = "setTextWrap";

/// `drawChar x y code fg bg size`
pub const DRAW_CHAR: &str = "drawChar";

// Colour and orientation

/// `setFgColor r g b`
pub const SET_FG_COLOR: &str = "setFgColor";

/// `setBgColor r g b`
pub const SET_BG_COLOR: &str = "setBgColor";

/// `setRotation m`: only the two low bits count
pub const SET_ROTATION: &str = "setRotation";

/// `invertDisplay [bool]`: defaults to inverting
pub const INVERT_DISPLAY: &str = "invertDisplay";

// Drawing primitives

/// `drawPixel x y color`
pub const DRAW_PIXEL: &str = "drawPixel";

/// `drawFastVLine x y h color`
pub const DRAW_FAST_VLINE: &str = "drawFastVLine";

/// `drawFastHLine x y w color`
pub const DRAW_FAST_HLINE: &str = "drawFastHLine";

/// `fillScreen color`
pub const FILL_SCREEN: &str = "fillScreen";

/// `drawLine x0 y0 x1 y1 color`
pub const DRAW_LINE: &str = "drawLine";

/// `drawRect x y w h color`
pub const DRAW_RECT: &str = "drawRect";

/// `fillRect x y w h color`
pub const FILL_RECT: &str = "fillRect";

/// `drawCircle x y r color`
pub const DRAW_CIRCLE: &str = "drawCircle";

/// `fillCircle x y r color`
pub const FILL_CIRCLE: &str = "fillCircle";

/// `drawTriangle x0 y0 x1 y1 x2 y2 color`
pub const DRAW_TRIANGLE: &str = "drawTriangle";

/// `fillTriangle x0 y0 x1 y1 x2 y2 color`
pub const FILL_TRIANGLE: &str = "fillTriangle";

/// `drawRoundRect x y w h r color`
pub const DRAW_ROUND_RECT: &str = "drawRoundRect";

/// `fillRoundRect x y w h r color`
pub const FILL_ROUND_RECT: &str = "fillRoundRect";

// Queries

/// `width`: configured width
pub const WIDTH: &str = "width";

/// `height`: configured height
pub const HEIGHT: &str = "height";

/// `getRotation`
pub const GET_ROTATION: &str = "getRotation";

/// `getCursorX`
pub const GET_CURSOR_X: &str = "getCursorX";

/// `getCursorY`
pub const GET_CURSOR_Y: &str = "getCursorY";

/// `getTextBounds x y <text>`
pub const GET_TEXT_BOUNDS: &str = "getTextBounds";

// Buttons

/// `readButtons`: pressed buttons or `NONE`
pub const READ_BUTTONS: &str = "readButtons";

/// `waitButton during upFlag`: first button to go down (or up)
pub const WAIT_BUTTON: &str = "waitButton";

/// `watchButtons [during] [interval]`: stream pressed buttons
pub const WATCH_BUTTONS: &str = "watchButtons";

/// `monitorButtons during [interval]`: stream button edges and levels
pub const MONITOR_BUTTONS: &str = "monitorButtons";

/// Longest keyword the table accepts
pub const KEYWORD_CAPACITY: usize = 24;

/// Number of slots in the table
pub const TABLE_CAPACITY: usize = 64;

/// Case-folded keyword
pub type Keyword = String<KEYWORD_CAPACITY>;

/// Custom handler over the device state `T`
pub type RunFn<T> = fn(&mut T, &mut Args<'_>) -> Result<Response, CommandError>;

/// What a keyword does
pub enum Handler<T> {
    /// Read the opcode's integers and hand the action to the queue
    Queue(Opcode),
    /// Run a custom handler
    Run(RunFn<T>),
}

impl<T> Clone for Handler<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handler<T> {}

impl<T> core::fmt::Debug for Handler<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Queue(opcode) => f.debug_tuple("Queue").field(opcode).finish(),
            Self::Run(_) => f.write_str("Run"),
        }
    }
}

/// Lowercase `keyword` into a table key
///
/// Returns `None` when the keyword is longer than [`KEYWORD_CAPACITY`].
pub fn fold(keyword: &str) -> Option<Keyword> {
    let mut key = Keyword::new();
    for ch in keyword.chars() {
        key.push(ch.to_ascii_lowercase()).ok()?;
    }
    Some(key)
}

/// Keyword → handler map, built once
pub struct CommandTable<T> {
    handlers: FnvIndexMap<Keyword, Handler<T>, TABLE_CAPACITY>,
}

impl<T> CommandTable<T> {
    /// Build the table from `(keyword, handler)` pairs
    ///
    /// Entries that do not fit (too long, table full) are skipped with a
    /// warning. A repeated keyword replaces the earlier entry.
    pub fn new(entries: &[(&str, Handler<T>)]) -> Self {
        let mut handlers = FnvIndexMap::new();
        for &(keyword, handler) in entries {
            let inserted = fold(keyword).map(|key| handlers.insert(key, handler));
            if !matches!(inserted, Some(Ok(_))) {
                log::warn!("command {} not registered", keyword);
            }
        }
        Self { handlers }
    }

    /// Handler registered for `keyword`, ignoring ASCII case
    pub fn lookup(&self, keyword: &str) -> Option<Handler<T>> {
        self.handlers.get(&fold(keyword)?).copied()
    }

    /// Number of registered keywords
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no keyword is registered
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

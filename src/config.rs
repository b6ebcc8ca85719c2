//! Controller configuration types and builder

pub use crate::error::BuilderError;
use crate::button::Polarity;

/// Default polling tick of the blocking input protocols, in milliseconds
pub const DEFAULT_TICK_MS: u32 = 10;
/// Default debounce window of the input channels, in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u32 = 100;
/// Default sampling interval of `watchButtons` / `monitorButtons`, in milliseconds
pub const DEFAULT_SAMPLE_INTERVAL_MS: u32 = 100;

/// Display dimensions as reported to the host
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
}

impl Dimensions {
    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if either side is zero.
    pub fn new(width: u16, height: u16) -> Result<Self, BuilderError> {
        if width == 0 || height == 0 {
            return Err(BuilderError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }
}

/// Display rotation relative to native orientation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    /// No rotation
    #[default]
    Rotate0,
    /// Rotate 90 degrees clockwise
    Rotate90,
    /// Rotate 180 degrees
    Rotate180,
    /// Rotate 270 degrees clockwise
    Rotate270,
}

impl Rotation {
    /// Rotation for a `setRotation` argument; only the two low bits count
    pub const fn from_index(index: i32) -> Self {
        match index & 3 {
            0 => Self::Rotate0,
            1 => Self::Rotate90,
            2 => Self::Rotate180,
            _ => Self::Rotate270,
        }
    }

    /// Index reported by `getRotation`
    pub const fn index(self) -> u8 {
        match self {
            Self::Rotate0 => 0,
            Self::Rotate90 => 1,
            Self::Rotate180 => 2,
            Self::Rotate270 => 3,
        }
    }

    /// Whether width and height are swapped relative to the native panel
    pub const fn is_transposed(self) -> bool {
        matches!(self, Self::Rotate90 | Self::Rotate270)
    }
}

/// Controller configuration
///
/// Use [`Builder`] to create a Config.
#[derive(Clone, Debug)]
pub struct Config {
    /// Dimensions reported by `width` / `height`
    pub dimensions: Dimensions,
    /// Rotation restored by `reset`
    pub rotation: Rotation,
    /// Polling tick of the blocking input protocols
    pub tick_ms: u32,
    /// Debounce window of the input channels
    pub debounce_ms: u32,
    /// Polarity of channels A, B and C
    pub polarities: [Polarity; 3],
    /// Default interval for `watchButtons` and `monitorButtons`
    pub sample_interval_ms: u32,
}

/// Builder for constructing controller configuration
///
/// # Example
///
/// ```
/// use serial_tft::{Builder, Dimensions, Rotation};
///
/// let dims = match Dimensions::new(240, 135) {
///     Ok(dims) => dims,
///     Err(_) => return,
/// };
/// let config = match Builder::new().dimensions(dims).rotation(Rotation::Rotate270).build() {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// assert_eq!(config.tick_ms, 10);
/// ```
#[must_use]
pub struct Builder {
    dimensions: Option<Dimensions>,
    rotation: Rotation,
    tick_ms: u32,
    debounce_ms: u32,
    polarities: [Polarity; 3],
    sample_interval_ms: u32,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            dimensions: None,
            rotation: Rotation::Rotate0,
            tick_ms: DEFAULT_TICK_MS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            // A is pulled up, B and C are pulled down on the reference board
            polarities: [Polarity::Normal, Polarity::Inverted, Polarity::Inverted],
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set display dimensions (required)
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions = Some(dims);
        self
    }

    /// Set the rotation restored by `reset`
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the polling tick of the blocking input protocols
    pub fn tick_ms(mut self, value: u32) -> Self {
        self.tick_ms = value;
        self
    }

    /// Set the debounce window of the input channels
    pub fn debounce_ms(mut self, value: u32) -> Self {
        self.debounce_ms = value;
        self
    }

    /// Set the polarity of channels A, B and C
    pub fn polarities(mut self, value: [Polarity; 3]) -> Self {
        self.polarities = value;
        self
    }

    /// Set the default interval of `watchButtons` and `monitorButtons`
    pub fn sample_interval_ms(mut self, value: u32) -> Self {
        self.sample_interval_ms = value;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingDimensions` if dimensions were not set and
    /// `BuilderError::InvalidTick` if the tick is zero.
    pub fn build(self) -> Result<Config, BuilderError> {
        if self.tick_ms == 0 {
            return Err(BuilderError::InvalidTick);
        }
        Ok(Config {
            dimensions: self.dimensions.ok_or(BuilderError::MissingDimensions)?,
            rotation: self.rotation,
            tick_ms: self.tick_ms,
            debounce_ms: self.debounce_ms,
            polarities: self.polarities,
            sample_interval_ms: self.sample_interval_ms,
        })
    }
}

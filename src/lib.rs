pub mod buffer;
pub mod display;
pub mod error;
pub mod filter;
pub mod loader;
pub mod pipeline;

pub use buffer::{Channel, ChannelOrder, PixelBuffer};
pub use display::{DisplayBackend, DisplaySurface, KeyCode, NativeDisplay};
pub use error::{Error, Result};
pub use pipeline::{Pipeline, Stage};

pub const IMAGE_PATH: &str = "image.png";
pub const WINDOW_TITLE: &str = "image";
/// Timeout value for `wait_for_key` that blocks until a key arrives.
pub const WAIT_FOREVER: u64 = 0;

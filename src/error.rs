use thiserror::Error;

use crate::buffer::ChannelOrder;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to decode image {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("expected a buffer with 3 channels, found {channels}")]
    InvalidShape { channels: usize },

    #[error("raw data holds {actual} bytes, shape requires {expected}")]
    DataLength { expected: usize, actual: usize },

    #[error("buffer is tagged {actual} but was declared as {declared}")]
    OrderMismatch {
        declared: ChannelOrder,
        actual: ChannelOrder,
    },

    #[error("display error: {0}")]
    Display(String),

    #[error("pipeline has already run")]
    AlreadyRun,
}

pub type Result<T> = std::result::Result<T, Error>;

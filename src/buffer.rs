use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

/// Which color each axis-2 index of a 3-channel pixel holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Bgr,
    Rgb,
}

impl ChannelOrder {
    pub const fn channels(self) -> [Channel; 3] {
        match self {
            ChannelOrder::Bgr => [Channel::Blue, Channel::Green, Channel::Red],
            ChannelOrder::Rgb => [Channel::Red, Channel::Green, Channel::Blue],
        }
    }

    pub fn index_of(self, channel: Channel) -> usize {
        match self.channels().iter().position(|c| *c == channel) {
            Some(index) => index,
            None => unreachable!("every order names all three channels"),
        }
    }
}

impl fmt::Display for ChannelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelOrder::Bgr => f.write_str("BGR"),
            ChannelOrder::Rgb => f.write_str("RGB"),
        }
    }
}

/// Decoded raster of shape (height, width, channels), row-major and
/// interleaved.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    height: usize,
    width: usize,
    channels: usize,
    order: ChannelOrder,
    data: Vec<u8>,
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("height", &self.height)
            .field("width", &self.width)
            .field("channels", &self.channels)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

impl PixelBuffer {
    pub fn from_raw(
        height: usize,
        width: usize,
        channels: usize,
        order: ChannelOrder,
        data: Vec<u8>,
    ) -> Result<Self> {
        let expected = height
            .checked_mul(width)
            .and_then(|n| n.checked_mul(channels))
            .ok_or(Error::DataLength {
                expected: usize::MAX,
                actual: data.len(),
            })?;
        if data.len() != expected {
            return Err(Error::DataLength {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            height,
            width,
            channels,
            order,
            data,
        })
    }

    /// Builds a 3-channel buffer from rows of pixel triples.
    pub fn from_pixels(order: ChannelOrder, rows: &[Vec<[u8; 3]>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let data: Vec<u8> = rows.iter().flatten().flatten().copied().collect();
        if rows.iter().any(|row| row.len() != width) {
            return Err(Error::DataLength {
                expected: height.saturating_mul(width).saturating_mul(3),
                actual: data.len(),
            });
        }
        Self::from_raw(height, width, 3, order, data)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.channels)
    }

    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Channel values of the pixel at row `y`, column `x`.
    pub fn pixel(&self, y: usize, x: usize) -> Option<&[u8]> {
        if y >= self.height || x >= self.width {
            return None;
        }
        let start = (y * self.width + x) * self.channels;
        self.data.get(start..start + self.channels)
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub(crate) fn set_order(&mut self, order: ChannelOrder) {
        self.order = order;
    }
}

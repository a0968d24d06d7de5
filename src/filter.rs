use crate::buffer::{ChannelOrder, PixelBuffer};
use crate::error::{Error, Result};

pub const CHANNELS: usize = 3;

/// Reorders the color channels of every pixel from `from` to `to`.
///
/// The buffer is consumed and its storage reused for the result. Shape is
/// preserved; only the values along the channel axis move.
pub fn convert_channel_order(
    mut buf: PixelBuffer,
    from: ChannelOrder,
    to: ChannelOrder,
) -> Result<PixelBuffer> {
    if buf.channels() != CHANNELS {
        return Err(Error::InvalidShape {
            channels: buf.channels(),
        });
    }
    if buf.order() != from {
        return Err(Error::OrderMismatch {
            declared: from,
            actual: buf.order(),
        });
    }
    if from == to {
        return Ok(buf);
    }

    let permutation = permutation(from, to);
    for pixel in buf.data_mut().chunks_exact_mut(CHANNELS) {
        let source = [pixel[0], pixel[1], pixel[2]];
        for (target, index) in pixel.iter_mut().zip(permutation) {
            *target = source[index];
        }
    }
    buf.set_order(to);

    log::debug!(
        "converted {}x{} buffer from {} to {}",
        buf.width(),
        buf.height(),
        from,
        to
    );
    Ok(buf)
}

/// For each output index, the input index holding the same color.
fn permutation(from: ChannelOrder, to: ChannelOrder) -> [usize; CHANNELS] {
    to.channels().map(|channel| from.index_of(channel))
}

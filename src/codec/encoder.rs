// src/codec/encoder.rs

//! Encode direction: interleaved 8-bit image in, framed stream out.

use super::entropy::{EntropyCoder, RawCoder};
use super::frame::{FrameHead, HEAD_SIZE};
use super::settings::Settings;
use super::tiles::{TileGrid, TileJob};
use crate::utils::error::{CodecError, Result};
use crate::utils::log::{debug, warn};

/// Encodes an interleaved image with the uncompressed [`RawCoder`].
pub fn encode(
    image: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    settings: &Settings,
) -> Result<Vec<u8>> {
    encode_with(image, width, height, channels, settings, &RawCoder)
}

/// Encodes an interleaved image, `width * height * channels` bytes, and
/// compresses every tile with `coder`.
pub fn encode_with(
    image: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    settings: &Settings,
    coder: &dyn EntropyCoder,
) -> Result<Vec<u8>> {
    settings.validate(channels)?;

    let head = FrameHead {
        wavelet: settings.wavelet,
        edge_policy: settings.edge_policy,
        channels,
        width,
        height,
        tile_size: settings.tile_size,
    };
    let mut out = Vec::with_capacity(HEAD_SIZE + image.len());
    head.write(&mut out)?;

    let expected = head.image_len()?;
    if image.len() != expected {
        return Err(CodecError::InvalidArg(format!(
            "image holds {} bytes, {}x{}x{} needs {}",
            image.len(),
            width,
            height,
            channels,
            expected
        )));
    }

    let grid = TileGrid::new(width, height, settings.tile_size, settings.edge_policy);
    let tiles = grid.encoded_tiles();
    debug!(
        "Encoding {}x{}x{} frame: {} of {} tiles, {:?}, {:?}, tile size {}, {:?}",
        width,
        height,
        channels,
        tiles.len(),
        grid.cols() * grid.rows(),
        settings.wavelet,
        settings.schedule,
        settings.tile_size,
        settings.edge_policy
    );

    if tiles.is_empty() {
        warn!(
            "No {}x{} tile fits the {}x{} image, the frame carries no pixels",
            settings.tile_size, settings.tile_size, width, height
        );
    }

    let job = TileJob {
        wavelet: settings.wavelet,
        schedule: settings.schedule,
        image_w: width,
        channels,
        coder,
    };
    job.encode_tiles(image, settings.channel_loss(channels), &tiles, &mut out)?;

    debug!("Encoded frame: {} bytes", out.len());
    Ok(out)
}

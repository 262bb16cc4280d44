// src/codec/decoder.rs

//! Decode direction: framed stream in, interleaved 8-bit image out.

use super::entropy::{EntropyCoder, RawCoder};
use super::frame::{FrameHead, HEAD_SIZE};
use super::tiles::{TileGrid, TileJob};
use crate::dwt::{Schedule, Wavelet};
use crate::utils::error::Result;
use crate::utils::log::debug;

/// A reconstructed image, `width * height * channels` interleaved bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: Vec<u8>,
}

impl DecodedImage {
    /// The interleaved samples of pixel `(x, y)`, `None` outside the image.
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y * self.width + x) * self.channels;
        self.data.get(start..start + self.channels)
    }
}

/// Decodes a stream written by [`encode`](super::encode).
pub fn decode(input: &[u8]) -> Result<DecodedImage> {
    decode_with(input, &RawCoder)
}

/// Decodes a stream whose tiles were compressed with `coder`.
///
/// Pixels of tiles left out by the edge policy come back as zero.
pub fn decode_with(input: &[u8], coder: &dyn EntropyCoder) -> Result<DecodedImage> {
    let head = FrameHead::read(input)?;
    let grid = TileGrid::new(head.width, head.height, head.tile_size, head.edge_policy);
    debug!(
        "Decoding {}x{}x{} frame: {} tiles, {:?}, tile size {}, {:?}",
        head.width,
        head.height,
        head.channels,
        grid.encoded_count(),
        head.wavelet,
        head.tile_size,
        head.edge_policy
    );

    let job = TileJob {
        wavelet: head.wavelet,
        // The schedule only matters when lifting, the steps travel in the lift heads
        schedule: Schedule::default(),
        image_w: head.width,
        channels: head.channels,
        coder,
    };
    let data = job.decode_tiles(&input[HEAD_SIZE..], &grid, head.image_len()?)?;

    Ok(DecodedImage {
        width: head.width,
        height: head.height,
        channels: head.channels,
        data,
    })
}

/// Reads only the frame header: `(width, height, channels, wavelet)`.
pub fn probe(input: &[u8]) -> Result<(usize, usize, usize, Wavelet)> {
    let head = FrameHead::read(input)?;
    Ok((head.width, head.height, head.channels, head.wavelet))
}

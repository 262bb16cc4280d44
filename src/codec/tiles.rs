// src/codec/tiles.rs

//! Tile grid and the per tile encode/decode work.
//!
//! An image is cut into `tile_size × tile_size` tiles scanned row-major.
//! Each encoded tile is stored as one record:
//!
//! ```text
//! u32 LE  block size
//! [u8]    entropy coded coefficient run
//! ```
//!
//! Records follow the frame header in scan order. Tiles the edge policy
//! leaves out have no record, both sides derive the same list from the
//! frame header.

use super::entropy::EntropyCoder;
use super::format::{interleaved_to_tile, tile_to_interleaved};
use super::settings::EdgePolicy;
use crate::dwt::{tile_total_length, ChannelLoss, Pyramid, Schedule, Wavelet};
use crate::utils::error::{CodecError, Result};
use crate::utils::log::debug;
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

/// Size of the block size field in front of each tile record.
pub const BLOCK_HEAD_SIZE: usize = 4;

/// Pixel rectangle of one tile. `index` is the tile's position in the
/// row-major scan of the full grid, skipped tiles included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub index: usize,
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

/// How an image of a given size is cut into tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tile_w: usize,
    tile_h: usize,
    policy: EdgePolicy,
}

impl TileGrid {
    /// A `tile_size` of 0 makes the whole image a single tile.
    pub fn new(width: usize, height: usize, tile_size: usize, policy: EdgePolicy) -> Self {
        let (tile_w, tile_h) = if tile_size == 0 {
            (width.max(1), height.max(1))
        } else {
            (tile_size, tile_size)
        };
        Self {
            width,
            height,
            tile_w,
            tile_h,
            policy,
        }
    }

    pub fn cols(&self) -> usize {
        self.width.div_ceil(self.tile_w)
    }

    pub fn rows(&self) -> usize {
        self.height.div_ceil(self.tile_h)
    }

    /// Every tile of the grid, clipped to the image.
    pub fn rects(&self) -> impl Iterator<Item = TileRect> + '_ {
        let cols = self.cols();
        (0..self.cols().saturating_mul(self.rows())).map(move |index| {
            let x = (index % cols) * self.tile_w;
            let y = (index / cols) * self.tile_h;
            TileRect {
                index,
                x,
                y,
                w: self.tile_w.min(self.width - x),
                h: self.tile_h.min(self.height - y),
            }
        })
    }

    pub fn is_partial(&self, rect: &TileRect) -> bool {
        rect.w != self.tile_w || rect.h != self.tile_h
    }

    /// Tiles that get a record in the stream, in scan order.
    ///
    /// Under [`EdgePolicy::Skip`] a tile reaching past the right or bottom
    /// edge is left out and its pixels decode as zero.
    pub fn encoded_rects(&self) -> impl Iterator<Item = TileRect> + '_ {
        self.rects().filter(|rect| {
            let keep = self.policy == EdgePolicy::Partial || !self.is_partial(rect);
            if !keep {
                debug!(
                    "Skipping partial tile {} at ({}, {}), {}x{} of {}x{}",
                    rect.index, rect.x, rect.y, rect.w, rect.h, self.tile_w, self.tile_h
                );
            }
            keep
        })
    }

    pub fn encoded_tiles(&self) -> Vec<TileRect> {
        self.encoded_rects().collect()
    }

    /// Number of tiles [`TileGrid::encoded_rects`] yields, computed without
    /// walking the grid. Saturates on grids too large to address.
    pub fn encoded_count(&self) -> usize {
        match self.policy {
            EdgePolicy::Partial => self.cols().saturating_mul(self.rows()),
            EdgePolicy::Skip => (self.width / self.tile_w).saturating_mul(self.height / self.tile_h),
        }
    }
}

/// What every tile of one frame shares.
#[derive(Clone, Copy)]
pub struct TileJob<'a> {
    pub wavelet: Wavelet,
    pub schedule: Schedule,
    pub image_w: usize,
    pub channels: usize,
    pub coder: &'a dyn EntropyCoder,
}

impl TileJob<'_> {
    fn pyramid(&self) -> Pyramid {
        Pyramid::new(self.wavelet, self.schedule)
    }

    fn encode_tile(
        &self,
        pyramid: &mut Pyramid,
        image: &[u8],
        loss: &[ChannelLoss],
        rect: &TileRect,
    ) -> Result<Vec<u8>> {
        let planes = pyramid.load(rect.w, rect.h, self.channels);
        interleaved_to_tile(image, self.image_w, self.channels, rect, planes);

        let mut coefficients = vec![0i16; pyramid.output_len()];
        pyramid.lift(rect.index, loss, &mut coefficients)?;

        let mut blob = Vec::new();
        self.coder
            .encode(&coefficients, &mut blob)
            .map_err(|e| CodecError::corrupt(rect.index, e.to_string()))?;
        Ok(blob)
    }

    fn decode_tile(&self, pyramid: &mut Pyramid, rect: &TileRect, blob: &[u8]) -> Result<()> {
        let mut coefficients = vec![0i16; tile_total_length(rect.w, rect.h) * self.channels];
        self.coder
            .decode(blob, &mut coefficients)
            .map_err(|e| CodecError::corrupt(rect.index, e.to_string()))?;
        pyramid.unlift(rect.index, rect.w, rect.h, self.channels, &coefficients)
    }

    /// Encodes every tile of `tiles` and appends their records to `out`.
    pub fn encode_tiles(
        &self,
        image: &[u8],
        loss: &[ChannelLoss],
        tiles: &[TileRect],
        out: &mut Vec<u8>,
    ) -> Result<()> {
        #[cfg(feature = "rayon")]
        let blobs = {
            use rayon::prelude::*;
            tiles
                .par_iter()
                .map_init(|| self.pyramid(), |pyramid, rect| self.encode_tile(pyramid, image, loss, rect))
                .collect::<Result<Vec<_>>>()?
        };

        #[cfg(not(feature = "rayon"))]
        let blobs = {
            let mut pyramid = self.pyramid();
            tiles
                .iter()
                .map(|rect| self.encode_tile(&mut pyramid, image, loss, rect))
                .collect::<Result<Vec<_>>>()?
        };

        for (rect, blob) in tiles.iter().zip(&blobs) {
            let size = u32::try_from(blob.len()).map_err(|_| {
                CodecError::corrupt(rect.index, format!("{} byte block does not fit in 32 bits", blob.len()))
            })?;
            out.write_u32::<LittleEndian>(size)?;
            out.extend_from_slice(blob);
        }
        Ok(())
    }

    /// Decodes the tile records in `body` into a zeroed interleaved image
    /// of `image_len` bytes.
    ///
    /// Every record is located before the image is allocated, so a
    /// truncated stream fails without doing the work.
    pub fn decode_tiles(&self, body: &[u8], grid: &TileGrid, image_len: usize) -> Result<Vec<u8>> {
        let blocks = split_blocks(body, grid)?;
        let mut image = vec![0u8; image_len];

        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            let decoded = blocks
                .par_iter()
                .map_init(
                    || self.pyramid(),
                    |pyramid, (rect, blob)| -> Result<Vec<Vec<i16>>> {
                        self.decode_tile(pyramid, rect, blob)?;
                        Ok((0..self.channels).map(|ch| pyramid.plane(ch).to_vec()).collect::<Vec<_>>())
                    },
                )
                .collect::<Result<Vec<_>>>()?;

            for ((rect, _), planes) in blocks.iter().zip(&decoded) {
                tile_to_interleaved(planes, self.image_w, self.channels, rect, &mut image);
            }
        }

        #[cfg(not(feature = "rayon"))]
        {
            let mut pyramid = self.pyramid();
            for (rect, blob) in &blocks {
                self.decode_tile(&mut pyramid, rect, blob)?;
                let planes: Vec<&[i16]> = (0..self.channels).map(|ch| pyramid.plane(ch)).collect();
                tile_to_interleaved(&planes, self.image_w, self.channels, rect, &mut image);
            }
        }

        Ok(image)
    }
}

/// Splits the stream body into one blob per encoded tile of `grid`.
///
/// The header alone decides how many records there are, so the body is
/// checked against that count before the grid is walked.
fn split_blocks<'a>(body: &'a [u8], grid: &TileGrid) -> Result<Vec<(TileRect, &'a [u8])>> {
    let count = grid.encoded_count();
    let needed = count.saturating_mul(BLOCK_HEAD_SIZE);
    if body.len() < needed {
        return Err(CodecError::Truncated {
            needed,
            available: body.len(),
        });
    }

    let mut blocks = Vec::with_capacity(count);
    let mut rest = body;

    for rect in grid.encoded_rects().take(count) {
        if rest.len() < BLOCK_HEAD_SIZE {
            return Err(CodecError::Truncated {
                needed: BLOCK_HEAD_SIZE,
                available: rest.len(),
            });
        }
        let size = LittleEndian::read_u32(rest) as usize;
        rest = &rest[BLOCK_HEAD_SIZE..];

        if rest.len() < size {
            return Err(CodecError::Truncated {
                needed: size,
                available: rest.len(),
            });
        }
        let (blob, tail) = rest.split_at(size);
        blocks.push((rect, blob));
        rest = tail;
    }

    if !rest.is_empty() {
        return Err(CodecError::InvalidArg(format!(
            "{} bytes left after the last tile",
            rest.len()
        )));
    }
    Ok(blocks)
}

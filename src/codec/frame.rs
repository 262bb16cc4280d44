// src/codec/frame.rs

//! Fixed size frame header at the start of every encoded stream.
//!
//! ```text
//! offset  size  field
//!      0     4  magic "TWV1"
//!      4     1  format version
//!      5     1  wavelet id
//!      6     1  edge policy id
//!      7     1  channels
//!      8     4  width       (u32 LE)
//!     12     4  height      (u32 LE)
//!     16     4  tile size   (u32 LE, 0 = whole image)
//! ```

use super::settings::{EdgePolicy, MAX_CHANNELS};
use crate::dwt::Wavelet;
use crate::utils::error::{CodecError, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

pub const MAGIC: [u8; 4] = *b"TWV1";
pub const VERSION: u8 = 1;
pub const HEAD_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHead {
    pub wavelet: Wavelet,
    pub edge_policy: EdgePolicy,
    pub channels: usize,
    pub width: usize,
    pub height: usize,
    pub tile_size: usize,
}

impl FrameHead {
    /// Bytes of the interleaved 8-bit image this frame describes.
    pub fn image_len(&self) -> Result<usize> {
        self.width
            .checked_mul(self.height)
            .and_then(|n| n.checked_mul(self.channels))
            .ok_or_else(|| {
                CodecError::InvalidHeader(format!(
                    "{}x{}x{} image does not fit in memory",
                    self.width, self.height, self.channels
                ))
            })
    }

    fn check(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CodecError::InvalidHeader(format!(
                "empty image {}x{}",
                self.width, self.height
            )));
        }
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(CodecError::InvalidHeader(format!(
                "{} channels, expected 1 to {}",
                self.channels, MAX_CHANNELS
            )));
        }
        self.image_len()?;
        Ok(())
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.check()?;
        let as_u32 = |value: usize, name: &str| {
            u32::try_from(value)
                .map_err(|_| CodecError::InvalidArg(format!("{} {} does not fit in 32 bits", name, value)))
        };

        writer.write_all(&MAGIC)?;
        writer.write_u8(VERSION)?;
        writer.write_u8(self.wavelet.id())?;
        writer.write_u8(self.edge_policy.id())?;
        writer.write_u8(self.channels as u8)?;
        writer.write_u32::<LittleEndian>(as_u32(self.width, "width")?)?;
        writer.write_u32::<LittleEndian>(as_u32(self.height, "height")?)?;
        writer.write_u32::<LittleEndian>(as_u32(self.tile_size, "tile size")?)?;
        Ok(())
    }

    /// Parses the header at the start of `input`.
    pub fn read(input: &[u8]) -> Result<Self> {
        if input.len() < HEAD_SIZE {
            return Err(CodecError::Truncated {
                needed: HEAD_SIZE,
                available: input.len(),
            });
        }

        let mut reader = &input[..HEAD_SIZE];
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(CodecError::BadMagic(magic));
        }

        let version = reader.read_u8()?;
        if version != VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }

        let wavelet = Wavelet::from_id(reader.read_u8()?)?;
        let edge_policy = EdgePolicy::from_id(reader.read_u8()?)?;
        let channels = reader.read_u8()? as usize;
        let width = reader.read_u32::<LittleEndian>()? as usize;
        let height = reader.read_u32::<LittleEndian>()? as usize;
        let tile_size = reader.read_u32::<LittleEndian>()? as usize;

        let head = FrameHead {
            wavelet,
            edge_policy,
            channels,
            width,
            height,
            tile_size,
        };
        head.check()?;
        Ok(head)
    }
}

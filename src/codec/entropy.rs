// src/codec/entropy.rs

use crate::utils::error::{CodecError, Result};
use byteorder::{ByteOrder, LittleEndian};

/// Compresses the coefficient run of one tile.
///
/// The tile driver calls `encode` once per tile and stores the blob
/// behind a `u32` size; on decode it hands the same blob back along with
/// an output slice already sized to the tile's coefficient count.
/// Implementations must be usable from several threads at once.
pub trait EntropyCoder: Send + Sync {
    /// Appends the compressed form of `coefficients` to `out`.
    fn encode(&self, coefficients: &[i16], out: &mut Vec<u8>) -> Result<()>;

    /// Fills `coefficients` from `blob`. Every slot must be written.
    fn decode(&self, blob: &[u8], coefficients: &mut [i16]) -> Result<()>;
}

/// Stores coefficients as little-endian 16-bit integers, uncompressed.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCoder;

impl EntropyCoder for RawCoder {
    fn encode(&self, coefficients: &[i16], out: &mut Vec<u8>) -> Result<()> {
        let start = out.len();
        out.resize(start + coefficients.len() * 2, 0);
        LittleEndian::write_i16_into(coefficients, &mut out[start..]);
        Ok(())
    }

    fn decode(&self, blob: &[u8], coefficients: &mut [i16]) -> Result<()> {
        let needed = coefficients.len() * 2;
        if blob.len() < needed {
            return Err(CodecError::Truncated {
                needed,
                available: blob.len(),
            });
        }
        if blob.len() > needed {
            return Err(CodecError::InvalidArg(format!(
                "{} trailing bytes after {} coefficients",
                blob.len() - needed,
                coefficients.len()
            )));
        }
        LittleEndian::read_i16_into(blob, coefficients);
        Ok(())
    }
}

//! A tile based, multiresolution wavelet image codec core.
//!
//! Images are cut into square tiles; every tile goes through a pyramid of
//! integer lifting steps (Haar, CDF 5/3 or 97DD) that split it into a
//! lowpass and three quantized highpass subbands per level. The result is
//! one linear run of 16-bit coefficients per tile, handed to a pluggable
//! entropy coder.
//!
//! # Quick Start
//!
//! ```
//! use tilewave::{decode, encode, Settings, Wavelet};
//!
//! let (width, height, channels) = (64, 48, 3);
//! let image: Vec<u8> = (0..width * height * channels).map(|i| (i % 251) as u8).collect();
//!
//! let settings = Settings::new().with_wavelet(Wavelet::Cdf53).with_tile_size(16);
//! let stream = encode(&image, width, height, channels, &settings)?;
//!
//! let decoded = decode(&stream)?;
//! assert_eq!(decoded.data, image);
//! # Ok::<(), tilewave::CodecError>(())
//! ```
//!
//! # Features
//!
//! - **Lossless by default**: step 1, gate 0 reconstructs every pixel exactly
//! - **Per channel loss**: quantization step and noise gate per channel, decayed
//!   across levels by a geometric or power law schedule
//! - **Edge tiles**: skipped (zero on decode) or encoded at their clipped size
//! - **Optional parallelism**: Enable `rayon` feature to transform tiles in parallel

// Core modules
pub mod codec;
pub mod dwt;
pub mod utils;

// Entry points
pub use codec::{decode, decode_with, encode, encode_with, probe, DecodedImage};

// Configuration
pub use codec::{EdgePolicy, EntropyCoder, RawCoder, Settings};
pub use dwt::{ChannelLoss, Schedule, Wavelet};

// Error types
pub use utils::error::{CodecError, Result};

// Constants
pub const TILEWAVE_VERSION: &str = "0.1.0";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(TILEWAVE_VERSION, "0.1.0");
    }

    #[test]
    fn test_whole_image_tile() -> Result<()> {
        let (w, h) = (23, 11);
        let image: Vec<u8> = (0..w * h).map(|i| ((i * 37) % 256) as u8).collect();
        let settings = Settings::new().with_tile_size(0).with_wavelet(Wavelet::Dd97);

        let stream = encode(&image, w, h, 1, &settings)?;
        let decoded = decode(&stream)?;

        assert_eq!((decoded.width, decoded.height, decoded.channels), (w, h, 1));
        assert_eq!(decoded.data, image);
        Ok(())
    }

    #[test]
    fn test_probe_reads_header_only() -> Result<()> {
        let image = vec![7u8; 8 * 8 * 2];
        let stream = encode(&image, 8, 8, 2, &Settings::new().with_wavelet(Wavelet::Haar))?;
        assert_eq!(probe(&stream[..20])?, (8, 8, 2, Wavelet::Haar));
        Ok(())
    }

    #[test]
    fn test_rejects_wrong_image_length() {
        let result = encode(&[0u8; 10], 4, 4, 1, &Settings::default());
        assert!(matches!(result, Err(CodecError::InvalidArg(_))));
    }
}

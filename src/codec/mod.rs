// src/codec/mod.rs

//! Framing around the wavelet core: settings, frame header, tile grid,
//! entropy coder seam and the public encode/decode entry points.
//!
//! ## Module Map
//!
//! - `settings` - encoder configuration and edge tile policy
//! - `frame` - fixed size stream header
//! - `entropy` - [`EntropyCoder`] trait and the uncompressed [`RawCoder`]
//! - `format` - interleaved 8-bit image to planar tile and back
//! - `tiles` - tile grid, tile records, per tile transform work
//! - `encoder` / `decoder` - entry points

pub mod decoder;
pub mod encoder;
pub mod entropy;
pub mod format;
pub mod frame;
pub mod settings;
pub mod tiles;

pub use decoder::{decode, decode_with, probe, DecodedImage};
pub use encoder::{encode, encode_with};
pub use entropy::{EntropyCoder, RawCoder};
pub use frame::FrameHead;
pub use settings::{EdgePolicy, Settings, MAX_CHANNELS};
pub use tiles::{TileGrid, TileRect};

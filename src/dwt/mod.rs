// src/dwt/mod.rs

//! Tile based, multiresolution wavelet lifting.
//!
//! ## Module Map
//!
//! - `kernel` - 1D lift/unlift for the Haar, CDF 5/3 and 97DD wavelets, noise gate and quantization
//! - `geometry` - level shrinking, buffer sizes, pitched gather/scatter helpers
//! - `quant` - per level, per channel step and gate schedules
//! - `lift2d` - one 2D reduction step over two work buffers and a line buffer
//! - `pyramid` - every level of a tile, serialized to one linear run

pub mod geometry;
pub mod kernel;
pub mod lift2d;
pub mod pyramid;
pub mod quant;

pub use geometry::{tile_total_length, total_lifts, LiftLevel};
pub use kernel::Wavelet;
pub use pyramid::Pyramid;
pub use quant::{ChannelLoss, Schedule, StepParams};

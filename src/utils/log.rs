// src/utils/log.rs

//! Logging goes through the `log` facade; the library never installs a
//! logger, that is left to the application.
//!
//! Per-level tracing is only emitted for the first tile of a frame, every
//! other tile runs the exact same geometry and would only repeat it.

pub use log::{debug, trace, warn};

/// Whether per-level details of `tile_no` should be traced.
#[inline]
pub fn traced_tile(tile_no: usize) -> bool {
    tile_no == 0 && log::log_enabled!(log::Level::Trace)
}

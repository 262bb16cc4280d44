// src/codec/format.rs

//! Moves tile rectangles between an interleaved 8-bit image and the
//! planar 16-bit planes the pyramid works on. No colour conversion
//! happens here; channels go through as they are.

use super::tiles::TileRect;

/// Gathers `rect` of an interleaved image `image_w` pixels wide into
/// `planes`, one plane per channel with row pitch `rect.w`.
pub fn interleaved_to_tile(
    image: &[u8],
    image_w: usize,
    channels: usize,
    rect: &TileRect,
    planes: &mut [Vec<i16>],
) {
    debug_assert!(planes.len() >= channels, "one plane per channel");

    for row in 0..rect.h {
        let start = ((rect.y + row) * image_w + rect.x) * channels;
        let src = &image[start..start + rect.w * channels];
        for (col, pixel) in src.chunks_exact(channels).enumerate() {
            for (plane, &value) in planes.iter_mut().zip(pixel) {
                plane[row * rect.w + col] = i16::from(value);
            }
        }
    }
}

/// Scatters reconstructed planes of `rect` back into an interleaved image
/// `image_w` pixels wide, clamping samples to `0..=255`.
pub fn tile_to_interleaved<P: AsRef<[i16]>>(
    planes: &[P],
    image_w: usize,
    channels: usize,
    rect: &TileRect,
    image: &mut [u8],
) {
    debug_assert!(planes.len() >= channels, "one plane per channel");

    for row in 0..rect.h {
        let start = ((rect.y + row) * image_w + rect.x) * channels;
        let dst = &mut image[start..start + rect.w * channels];
        for (col, pixel) in dst.chunks_exact_mut(channels).enumerate() {
            for (value, plane) in pixel.iter_mut().zip(planes) {
                *value = plane.as_ref()[row * rect.w + col].clamp(0, 255) as u8;
            }
        }
    }
}

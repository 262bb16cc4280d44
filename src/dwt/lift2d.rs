// src/dwt/lift2d.rs

//! One 2D resolution reduction step and its inverse.
//!
//! The forward step lifts every row of plane buffer A into scratch buffer
//! B, then every column of B back into A. Columns are never transposed as
//! a whole: each one is gathered into the auxiliary line buffer, lifted
//! there and scattered back. Afterwards A holds four quadrants with row
//! pitch `2 * target_w`:
//!
//! ```text
//! +----+----+
//! | LP | B  |
//! +----+----+
//! | C  | D  |
//! +----+----+
//! ```

use super::geometry::LiftLevel;
use super::kernel::{dequantize, Wavelet};
use super::quant::StepParams;

/// Forward 2D lift of one level.
///
/// * `a` - plane buffer, holds the level input at `level.in_pitch()` and
///   receives the four quadrants.
/// * `b` - scratch buffer, at least `work_w * work_h` long.
/// * `aux` - auxiliary line buffer, two halves of at least
///   `max(work_w, work_h)` each.
///
/// The previous content of `a` (outside the input region) and of `b` is
/// destroyed.
pub fn lift_2d(
    wavelet: Wavelet,
    level: &LiftLevel,
    step: StepParams,
    a: &mut [i16],
    b: &mut [i16],
    aux: &mut [i16],
) {
    let work_w = level.work_w();
    let work_h = level.work_h();
    let pitch = level.in_pitch();
    let (line, lifted) = aux.split_at_mut(aux.len() / 2);

    debug_assert!(line.len() >= work_w.max(work_h), "auxiliary line too short");
    debug_assert!(b.len() >= work_w * work_h, "scratch buffer too short");
    debug_assert!(a.len() >= work_w * work_h, "plane buffer too short");

    // Rows, A to B
    for row in 0..level.current_h {
        let src = &a[row * pitch..row * pitch + level.current_w];
        line[..level.current_w].copy_from_slice(src);
        if level.fake_last_col() {
            line[work_w - 1] = src[level.current_w - 1];
        }

        let dst = &mut b[row * work_w..(row + 1) * work_w];
        wavelet.lift(step.q, step.g, &line[..work_w], dst);
    }

    if level.fake_last_row() {
        let last = (level.current_h - 1) * work_w;
        b.copy_within(last..last + work_w, last + work_w);
    }

    // Columns, B to A
    for col in 0..work_w {
        for (i, value) in line[..work_h].iter_mut().enumerate() {
            *value = b[col + i * work_w];
        }

        wavelet.lift(step.q, step.g, &line[..work_h], &mut lifted[..work_h]);

        for (i, &value) in lifted[..work_h].iter().enumerate() {
            a[col + i * work_w] = value;
        }
    }
}

/// Inverse of [`lift_2d`].
///
/// `a` must hold the four quadrants at pitch `work_w` with the highpass
/// samples still quantized by `q`. The reconstructed level input is
/// written back to `a` at `level.in_pitch()`; synthesized samples of odd
/// dimensions are dropped.
pub fn unlift_2d(
    wavelet: Wavelet,
    level: &LiftLevel,
    q: i16,
    a: &mut [i16],
    b: &mut [i16],
    aux: &mut [i16],
) {
    let work_w = level.work_w();
    let work_h = level.work_h();
    let pitch = level.in_pitch();
    let (line, unlifted) = aux.split_at_mut(aux.len() / 2);

    debug_assert!(line.len() >= work_w.max(work_h), "auxiliary line too short");
    debug_assert!(b.len() >= work_w * work_h, "scratch buffer too short");

    // Columns, A to B
    for col in 0..work_w {
        for (i, value) in line[..work_h].iter_mut().enumerate() {
            *value = a[col + i * work_w];
        }
        dequantize(q, &mut line[level.target_h..work_h]);

        wavelet.unlift(&line[..work_h], &mut unlifted[..work_h]);

        for (i, &value) in unlifted[..work_h].iter().enumerate() {
            b[col + i * work_w] = value;
        }
    }

    // Rows, B to A
    for row in 0..level.current_h {
        line[..work_w].copy_from_slice(&b[row * work_w..(row + 1) * work_w]);
        dequantize(q, &mut line[level.target_w..work_w]);

        wavelet.unlift(&line[..work_w], &mut unlifted[..work_w]);

        a[row * pitch..row * pitch + level.current_w]
            .copy_from_slice(&unlifted[..level.current_w]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dwt::geometry::{lift_levels, line_capacity, plane_capacity};

    fn buffers(w: usize, h: usize) -> (Vec<i16>, Vec<i16>, Vec<i16>) {
        let mut a = vec![0i16; plane_capacity(w, h)];
        for (i, value) in a[..w * h].iter_mut().enumerate() {
            *value = ((i * 29 + (i / w) * 7) % 201) as i16 - 100;
        }
        let b = vec![0i16; plane_capacity(w, h)];
        let aux = vec![0i16; line_capacity(w, h) * 2];
        (a, b, aux)
    }

    #[test]
    fn test_first_level_roundtrip_all_parities() {
        for wavelet in [Wavelet::Haar, Wavelet::Cdf53, Wavelet::Dd97] {
            for (w, h) in [(8, 8), (5, 5), (6, 9), (11, 4), (3, 3), (17, 12)] {
                let (mut a, mut b, mut aux) = buffers(w, h);
                let original = a[..w * h].to_vec();
                let level = lift_levels(w, h).next().unwrap();

                lift_2d(wavelet, &level, StepParams::LOSSLESS, &mut a, &mut b, &mut aux);
                unlift_2d(wavelet, &level, 1, &mut a, &mut b, &mut aux);

                assert_eq!(&a[..w * h], &original[..], "{:?} {}x{}", wavelet, w, h);
            }
        }
    }

    #[test]
    fn test_flat_tile_has_empty_highpasses() {
        let (w, h) = (8, 6);
        let mut a = vec![42i16; plane_capacity(w, h)];
        let mut b = vec![0i16; plane_capacity(w, h)];
        let mut aux = vec![0i16; line_capacity(w, h) * 2];
        let level = lift_levels(w, h).next().unwrap();

        lift_2d(Wavelet::Cdf53, &level, StepParams::LOSSLESS, &mut a, &mut b, &mut aux);

        let work_w = level.work_w();
        for row in 0..level.work_h() {
            for col in 0..work_w {
                let value = a[row * work_w + col];
                if row < level.target_h && col < level.target_w {
                    assert_eq!(value, 42, "lowpass at {},{}", row, col);
                } else {
                    assert_eq!(value, 0, "highpass at {},{}", row, col);
                }
            }
        }
    }

    #[test]
    fn test_odd_tile_replicates_last_row_and_column() {
        // A 3x3 tile lifts like the 4x4 tile repeating its last row and column
        let small = [1i16, 5, 9, 2, 6, 10, 3, 7, 11];
        let padded = [1i16, 5, 9, 9, 2, 6, 10, 10, 3, 7, 11, 11, 3, 7, 11, 11];

        let mut a = vec![0i16; 16];
        a[..9].copy_from_slice(&small);
        let mut b = vec![0i16; 16];
        let mut aux = vec![0i16; 8];
        let level = lift_levels(3, 3).next().unwrap();
        lift_2d(Wavelet::Cdf53, &level, StepParams::LOSSLESS, &mut a, &mut b, &mut aux);

        let mut a4 = padded.to_vec();
        let mut b4 = vec![0i16; 16];
        let mut aux4 = vec![0i16; 8];
        let level4 = lift_levels(4, 4).next().unwrap();
        lift_2d(Wavelet::Cdf53, &level4, StepParams::LOSSLESS, &mut a4, &mut b4, &mut aux4);

        assert_eq!(a, a4);
    }
}

// src/dwt/geometry.rs

//! Pyramid geometry: how a tile shrinks level after level, how much room
//! the work buffers need, and the gather/scatter helpers that move a
//! pitched 2D region to and from a flat run.

/// A level is only lifted while both current dimensions are above this.
pub const TERMINAL_SIZE: usize = 2;

/// Halves a dimension, rounding up.
#[inline]
pub fn divide_plus_one(x: usize) -> usize {
    x.div_ceil(2)
}

/// One resolution reduction step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiftLevel {
    pub index: usize,
    pub current_w: usize,
    pub current_h: usize,
    pub target_w: usize,
    pub target_h: usize,
}

impl LiftLevel {
    /// An odd width is padded with a replicated last column.
    pub fn fake_last_col(&self) -> bool {
        self.target_w * 2 != self.current_w
    }

    /// An odd height is padded with a replicated last row.
    pub fn fake_last_row(&self) -> bool {
        self.target_h * 2 != self.current_h
    }

    /// Row pitch of the level's input inside plane buffer A.
    ///
    /// The first level reads the compact tile, deeper levels read the
    /// lowpass quadrant left behind by the previous level, whose rows are
    /// `2 * target_w` (of that level) apart.
    pub fn in_pitch(&self) -> usize {
        if self.index == 0 {
            self.current_w
        } else {
            self.current_w * 2
        }
    }

    /// Padded width, also the row pitch of the lifted quadrants.
    pub fn work_w(&self) -> usize {
        self.target_w * 2
    }

    pub fn work_h(&self) -> usize {
        self.target_h * 2
    }

    /// Samples in each of the four quadrants.
    pub fn quadrant_len(&self) -> usize {
        self.target_w * self.target_h
    }

    /// Offset of the B (HL) quadrant, top right.
    pub fn b_offset(&self) -> usize {
        self.target_w
    }

    /// Offset of the C (LH) quadrant, bottom left.
    pub fn c_offset(&self) -> usize {
        self.target_h * self.work_w()
    }

    /// Offset of the D (HH) quadrant, bottom right.
    pub fn d_offset(&self) -> usize {
        self.target_h * self.work_w() + self.target_w
    }
}

/// Iterator over the lift levels of a tile, finest first.
#[derive(Debug, Clone)]
pub struct Levels {
    index: usize,
    current_w: usize,
    current_h: usize,
}

impl Iterator for Levels {
    type Item = LiftLevel;

    fn next(&mut self) -> Option<LiftLevel> {
        if self.current_w <= TERMINAL_SIZE || self.current_h <= TERMINAL_SIZE {
            return None;
        }

        let level = LiftLevel {
            index: self.index,
            current_w: self.current_w,
            current_h: self.current_h,
            target_w: divide_plus_one(self.current_w),
            target_h: divide_plus_one(self.current_h),
        };

        self.index += 1;
        self.current_w = level.target_w;
        self.current_h = level.target_h;
        Some(level)
    }
}

pub fn lift_levels(tile_w: usize, tile_h: usize) -> Levels {
    Levels {
        index: 0,
        current_w: tile_w,
        current_h: tile_h,
    }
}

/// Number of lift levels of a tile. Encoder and decoder both derive the
/// quantization schedule from it.
pub fn total_lifts(tile_w: usize, tile_h: usize) -> usize {
    lift_levels(tile_w, tile_h).count()
}

/// Where the final lowpass lives once every level ran:
/// `(width, height, pitch)` inside plane buffer A.
pub fn lowpass_geometry(tile_w: usize, tile_h: usize) -> (usize, usize, usize) {
    match lift_levels(tile_w, tile_h).last() {
        Some(level) => (level.target_w, level.target_h, level.work_w()),
        None => (tile_w, tile_h, tile_w),
    }
}

/// Serialized length of one channel of a tile: every level contributes
/// one lift head and three highpass quadrants, plus the final lowpass.
pub fn tile_total_length(tile_w: usize, tile_h: usize) -> usize {
    let highpasses: usize = lift_levels(tile_w, tile_h)
        .map(|level| level.quadrant_len() * 3 + 1)
        .sum();
    let (lp_w, lp_h, _) = lowpass_geometry(tile_w, tile_h);
    highpasses + lp_w * lp_h
}

/// Length of plane buffer A (and of the scratch buffer B): the tile
/// padded to even dimensions, which is what the first level writes.
pub fn plane_capacity(tile_w: usize, tile_h: usize) -> usize {
    (divide_plus_one(tile_w) * 2) * (divide_plus_one(tile_h) * 2)
}

/// Length of one half of the auxiliary line buffer, enough for the
/// longest padded row or column.
pub fn line_capacity(tile_w: usize, tile_h: usize) -> usize {
    divide_plus_one(tile_w.max(tile_h)) * 2
}

/// Gathers a `w × h` region with row pitch `pitch` into a row-major run.
pub fn to_linear_rows(w: usize, h: usize, pitch: usize, input: &[i16], out: &mut [i16]) {
    for (row, dst) in out.chunks_exact_mut(w).take(h).enumerate() {
        let start = row * pitch;
        dst.copy_from_slice(&input[start..start + w]);
    }
}

/// Gathers a `w × h` region with row pitch `pitch` into a column-major run.
pub fn to_linear_cols(w: usize, h: usize, pitch: usize, input: &[i16], out: &mut [i16]) {
    for (col, dst) in out.chunks_exact_mut(h).take(w).enumerate() {
        for (row, value) in dst.iter_mut().enumerate() {
            *value = input[col + row * pitch];
        }
    }
}

/// Scatters a row-major run back into a region with row pitch `pitch`.
pub fn from_linear_rows(w: usize, h: usize, pitch: usize, input: &[i16], out: &mut [i16]) {
    for (row, src) in input.chunks_exact(w).take(h).enumerate() {
        let start = row * pitch;
        out[start..start + w].copy_from_slice(src);
    }
}

/// Scatters a column-major run back into a region with row pitch `pitch`.
pub fn from_linear_cols(w: usize, h: usize, pitch: usize, input: &[i16], out: &mut [i16]) {
    for (col, src) in input.chunks_exact(h).take(w).enumerate() {
        for (row, &value) in src.iter().enumerate() {
            out[col + row * pitch] = value;
        }
    }
}

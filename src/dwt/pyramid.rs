// src/dwt/pyramid.rs

//! Drives the 2D lift stage over every level of a tile and lays the
//! subbands out as one linear run of coefficients.
//!
//! Layout of one tile, front to back (what the decoder reads):
//!
//! ```text
//! LP[0] LP[1] .. LP[C-1]                      coarsest lowpass, row-major
//! for each level, coarsest to finest:
//!     for each channel 0..C:
//!         q  C  B  D                          lift head + highpasses, column-major
//! ```
//!
//! The encoder produces it back to front: it walks levels finest first and
//! channels in reverse order, moving a cursor from the end of the output
//! toward its start.

use super::geometry::{
    from_linear_cols, from_linear_rows, lift_levels, line_capacity, lowpass_geometry,
    plane_capacity, tile_total_length, to_linear_cols, to_linear_rows, LiftLevel,
};
use super::kernel::Wavelet;
use super::lift2d::{lift_2d, unlift_2d};
use super::quant::{ChannelLoss, Schedule};
use crate::utils::error::{CodecError, Result};
use crate::utils::log::{trace, traced_tile};

/// Work buffers of one tile transform, reused from tile to tile.
///
/// Each channel owns a plane buffer (A); all channels share one scratch
/// buffer (B) and one auxiliary line buffer. Channel planes hold the tile
/// with row pitch `tile_w` before lifting and after unlifting.
#[derive(Debug, Clone)]
pub struct Pyramid {
    wavelet: Wavelet,
    schedule: Schedule,
    tile_w: usize,
    tile_h: usize,
    channels: usize,
    planes: Vec<Vec<i16>>,
    scratch: Vec<i16>,
    aux: Vec<i16>,
    levels: Vec<LiftLevel>,
}

impl Pyramid {
    pub fn new(wavelet: Wavelet, schedule: Schedule) -> Self {
        Self {
            wavelet,
            schedule,
            tile_w: 0,
            tile_h: 0,
            channels: 0,
            planes: Vec::new(),
            scratch: Vec::new(),
            aux: Vec::new(),
            levels: Vec::new(),
        }
    }

    pub fn wavelet(&self) -> Wavelet {
        self.wavelet
    }

    /// Sizes (and zeroes) the work buffers for a `tile_w × tile_h` tile.
    fn prepare(&mut self, tile_w: usize, tile_h: usize, channels: usize) {
        let plane_len = plane_capacity(tile_w, tile_h);

        if self.planes.len() < channels {
            self.planes.resize_with(channels, Vec::new);
        }
        for plane in &mut self.planes[..channels] {
            plane.clear();
            plane.resize(plane_len, 0);
        }

        self.scratch.clear();
        self.scratch.resize(plane_len, 0);
        self.aux.clear();
        self.aux.resize(line_capacity(tile_w, tile_h) * 2, 0);

        self.levels.clear();
        self.levels.extend(lift_levels(tile_w, tile_h));

        self.tile_w = tile_w;
        self.tile_h = tile_h;
        self.channels = channels;
    }

    /// Prepares the workspace for a new tile and hands out its channel
    /// planes. The caller fills the first `tile_w * tile_h` samples of
    /// each, row-major with pitch `tile_w`, then calls [`Pyramid::lift`].
    pub fn load(&mut self, tile_w: usize, tile_h: usize, channels: usize) -> &mut [Vec<i16>] {
        self.prepare(tile_w, tile_h, channels);
        &mut self.planes[..channels]
    }

    /// Channel plane of the current tile, `tile_w * tile_h` samples.
    pub fn plane(&self, ch: usize) -> &[i16] {
        &self.planes[ch][..self.tile_w * self.tile_h]
    }

    /// Length of the linear run [`Pyramid::lift`] writes for the loaded tile.
    pub fn output_len(&self) -> usize {
        tile_total_length(self.tile_w, self.tile_h) * self.channels
    }

    /// Forward transform of the loaded tile into `out`.
    ///
    /// `loss` gives the base step and gate of every channel. `out` must be
    /// exactly [`Pyramid::output_len`] long. Channel planes are consumed.
    pub fn lift(&mut self, tile_no: usize, loss: &[ChannelLoss], out: &mut [i16]) -> Result<()> {
        if loss.len() != self.channels {
            return Err(CodecError::InvalidArg(format!(
                "{} channel loss entries for a {} channel tile",
                loss.len(),
                self.channels
            )));
        }
        if out.len() != self.output_len() {
            return Err(CodecError::InvalidArg(format!(
                "tile output holds {} coefficients, {} needed",
                out.len(),
                self.output_len()
            )));
        }

        let total = self.levels.len();
        let mut cursor = out.len();

        for level in &self.levels {
            if traced_tile(tile_no) {
                trace!(
                    "lift {}: {}x{} -> {}x{} (fake col {}, fake row {})",
                    level.index,
                    level.current_w,
                    level.current_h,
                    level.target_w,
                    level.target_h,
                    level.fake_last_col(),
                    level.fake_last_row()
                );
            }

            let quad = level.quadrant_len();
            let (tw, th, pitch) = (level.target_w, level.target_h, level.work_w());

            // Reverse channel order, the decoder reads them forward
            for ch in (0..self.channels).rev() {
                let step = self.schedule.step(loss[ch], level.index, total);
                let plane = &mut self.planes[ch];

                lift_2d(self.wavelet, level, step, plane, &mut self.scratch, &mut self.aux);

                cursor -= quad * 3;
                let (c, rest) = out[cursor..cursor + quad * 3].split_at_mut(quad);
                let (b, d) = rest.split_at_mut(quad);
                to_linear_cols(tw, th, pitch, &plane[level.c_offset()..], c);
                to_linear_cols(tw, th, pitch, &plane[level.b_offset()..], b);
                to_linear_cols(tw, th, pitch, &plane[level.d_offset()..], d);

                cursor -= 1;
                out[cursor] = step.q;

                if traced_tile(tile_no) {
                    trace!("lift {} ch {}: q {}, g {:.2}, head at {}", level.index, ch, step.q, step.g, cursor);
                }
            }
        }

        let (lp_w, lp_h, lp_pitch) = lowpass_geometry(self.tile_w, self.tile_h);
        for ch in (0..self.channels).rev() {
            cursor -= lp_w * lp_h;
            to_linear_rows(lp_w, lp_h, lp_pitch, &self.planes[ch], &mut out[cursor..cursor + lp_w * lp_h]);
        }

        debug_assert_eq!(cursor, 0, "output cursor must land on the start of the tile");
        Ok(())
    }

    /// Inverse transform: rebuilds the channel planes of a
    /// `tile_w × tile_h` tile out of the linear run `input`.
    ///
    /// Read back the result with [`Pyramid::plane`].
    pub fn unlift(
        &mut self,
        tile_no: usize,
        tile_w: usize,
        tile_h: usize,
        channels: usize,
        input: &[i16],
    ) -> Result<()> {
        self.prepare(tile_w, tile_h, channels);

        if input.len() != self.output_len() {
            return Err(CodecError::corrupt(
                tile_no,
                format!("{} coefficients, {} expected", input.len(), self.output_len()),
            ));
        }

        let (lp_w, lp_h, lp_pitch) = lowpass_geometry(tile_w, tile_h);
        let mut cursor = 0;
        for plane in &mut self.planes[..channels] {
            from_linear_rows(lp_w, lp_h, lp_pitch, &input[cursor..cursor + lp_w * lp_h], plane);
            cursor += lp_w * lp_h;
        }

        for level in self.levels.iter().rev() {
            let quad = level.quadrant_len();
            let (tw, th, pitch) = (level.target_w, level.target_h, level.work_w());

            for ch in 0..channels {
                let q = input[cursor];
                cursor += 1;
                if q < 1 {
                    return Err(CodecError::corrupt(
                        tile_no,
                        format!("lift head {} of level {} channel {} is below 1", q, level.index, ch),
                    ));
                }

                let plane = &mut self.planes[ch];
                let (c, rest) = input[cursor..cursor + quad * 3].split_at(quad);
                let (b, d) = rest.split_at(quad);
                from_linear_cols(tw, th, pitch, c, &mut plane[level.c_offset()..]);
                from_linear_cols(tw, th, pitch, b, &mut plane[level.b_offset()..]);
                from_linear_cols(tw, th, pitch, d, &mut plane[level.d_offset()..]);
                cursor += quad * 3;

                unlift_2d(self.wavelet, level, q, plane, &mut self.scratch, &mut self.aux);
            }
        }

        debug_assert_eq!(cursor, input.len(), "input cursor must land on the end of the tile");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(pyramid: &mut Pyramid, w: usize, h: usize, channels: usize) -> Vec<Vec<i16>> {
        let planes = pyramid.load(w, h, channels);
        for (ch, plane) in planes.iter_mut().enumerate() {
            for (i, value) in plane[..w * h].iter_mut().enumerate() {
                let (x, y) = (i % w, i / w);
                *value = ((x * 13 + y * 7 + ch * 50) % 256) as i16 - 128 + ((x * y) % 5) as i16;
            }
        }
        planes.iter().map(|p| p[..w * h].to_vec()).collect()
    }

    fn roundtrip(wavelet: Wavelet, w: usize, h: usize, channels: usize) -> (Vec<Vec<i16>>, Vec<Vec<i16>>) {
        let mut pyramid = Pyramid::new(wavelet, Schedule::PowerLaw);
        let original = fill(&mut pyramid, w, h, channels);
        let loss = vec![ChannelLoss::LOSSLESS; channels];
        let mut coefficients = vec![0i16; pyramid.output_len()];
        pyramid.lift(0, &loss, &mut coefficients).unwrap();

        let mut decoder = Pyramid::new(wavelet, Schedule::PowerLaw);
        decoder.unlift(0, w, h, channels, &coefficients).unwrap();
        let back = (0..channels).map(|ch| decoder.plane(ch).to_vec()).collect();
        (original, back)
    }

    #[test]
    fn test_lossless_roundtrip_all_wavelets_and_sizes() {
        for wavelet in [Wavelet::Haar, Wavelet::Cdf53, Wavelet::Dd97] {
            for (w, h) in [(1, 1), (2, 9), (3, 3), (4, 4), (5, 5), (7, 13), (16, 16), (31, 17), (64, 40)] {
                let (original, back) = roundtrip(wavelet, w, h, 3);
                assert_eq!(original, back, "{:?} {}x{}", wavelet, w, h);
            }
        }
    }

    #[test]
    fn test_lift_fills_closed_form_length() {
        // Ceil-halving each dimension while both exceed two: every level
        // stores a head plus three quadrants, the coarsest lowpass follows
        fn expected_len(mut w: usize, mut h: usize, channels: usize) -> usize {
            let mut len = 0;
            while w > 2 && h > 2 {
                w = w.div_ceil(2);
                h = h.div_ceil(2);
                len += 1 + 3 * w * h;
            }
            (len + w * h) * channels
        }
        assert_eq!(expected_len(8, 8, 1), 49 + 13 + 4);
        assert_eq!(expected_len(5, 5, 3), (28 + 13 + 4) * 3);

        let mut pyramid = Pyramid::new(Wavelet::Cdf53, Schedule::PowerLaw);
        for (w, h, channels) in [(8, 8, 1), (5, 5, 3), (33, 20, 4), (2, 2, 2), (17, 3, 1)] {
            fill(&mut pyramid, w, h, channels);
            let len = expected_len(w, h, channels);
            assert_eq!(pyramid.output_len(), len, "{}x{}x{}", w, h, channels);

            // The write cursor must sweep the whole run and nothing past it
            let mut out = vec![i16::MIN; len];
            let loss = vec![ChannelLoss::LOSSLESS; channels];
            pyramid.lift(0, &loss, &mut out).unwrap();
            assert!(out.iter().all(|&v| v != i16::MIN), "{}x{}x{} left a gap", w, h, channels);

            let mut short = vec![0i16; len - 1];
            assert!(pyramid.lift(0, &loss, &mut short).is_err());
        }
    }

    #[test]
    fn test_rejects_wrong_output_length() {
        let mut pyramid = Pyramid::new(Wavelet::Cdf53, Schedule::PowerLaw);
        pyramid.load(8, 8, 1);
        let mut out = vec![0i16; 10];
        let result = pyramid.lift(0, &[ChannelLoss::LOSSLESS], &mut out);
        assert!(matches!(result, Err(CodecError::InvalidArg(_))));
    }

    #[test]
    fn test_heads_follow_reverse_channel_processing() {
        // 8x8, two levels. Distinct steps per channel make heads identifiable.
        let (w, h, channels) = (8, 8, 3);
        let mut pyramid = Pyramid::new(Wavelet::Cdf53, Schedule::Geometric);
        fill(&mut pyramid, w, h, channels);
        let loss = [ChannelLoss::new(4.0, 0.0), ChannelLoss::new(8.0, 0.0), ChannelLoss::new(16.0, 0.0)];
        let mut out = vec![0i16; pyramid.output_len()];
        pyramid.lift(0, &loss, &mut out).unwrap();

        // Finest level block sits at the end: channel 2 was written first,
        // right at the end, then channel 1 and channel 0 in front of it.
        let block = 3 * 16 + 1;
        let end = out.len();
        assert_eq!(out[end - block], 16);
        assert_eq!(out[end - 2 * block], 8);
        assert_eq!(out[end - 3 * block], 4);

        // Coarsest level, halved steps, right after the three 2x2 lowpasses
        let coarse = 3 * 4;
        let coarse_block = 3 * 4 + 1;
        assert_eq!(out[coarse], 2);
        assert_eq!(out[coarse + coarse_block], 4);
        assert_eq!(out[coarse + 2 * coarse_block], 8);
    }

    #[test]
    fn test_rejects_zero_lift_head() {
        let (w, h) = (8, 8);
        let mut pyramid = Pyramid::new(Wavelet::Cdf53, Schedule::PowerLaw);
        fill(&mut pyramid, w, h, 1);
        let mut out = vec![0i16; pyramid.output_len()];
        pyramid.lift(0, &[ChannelLoss::LOSSLESS], &mut out).unwrap();

        // First head follows the 2x2 lowpass
        assert_eq!(out[4], 1);
        out[4] = 0;
        let result = Pyramid::new(Wavelet::Cdf53, Schedule::PowerLaw).unlift(7, w, h, 1, &out);
        assert!(matches!(result, Err(CodecError::CorruptTile { tile: 7, .. })));
    }

    #[test]
    fn test_rejects_short_input() {
        let mut pyramid = Pyramid::new(Wavelet::Haar, Schedule::PowerLaw);
        let result = pyramid.unlift(3, 16, 16, 2, &[1i16; 20]);
        assert!(matches!(result, Err(CodecError::CorruptTile { tile: 3, .. })));
    }

    #[test]
    fn test_quantized_tile_stays_close() {
        let (w, h) = (32, 32);
        let mut pyramid = Pyramid::new(Wavelet::Cdf53, Schedule::PowerLaw);
        let planes = pyramid.load(w, h, 1);
        for (i, value) in planes[0][..w * h].iter_mut().enumerate() {
            *value = ((i % w) * 4 + (i / w) * 2) as i16;
        }
        let original = planes[0][..w * h].to_vec();

        let mut out = vec![0i16; pyramid.output_len()];
        pyramid.lift(0, &[ChannelLoss::new(4.0, 1.0)], &mut out).unwrap();
        pyramid.unlift(0, w, h, 1, &out).unwrap();

        let max_error = original
            .iter()
            .zip(pyramid.plane(0))
            .map(|(a, b)| (a - b).abs())
            .max()
            .unwrap_or(0);
        assert!(max_error < 32, "max error {}", max_error);
    }
}

// src/dwt/kernel.rs

//! One-dimensional lifting kernels.
//!
//! A forward lift reads `2 * len` samples, even and odd positions
//! interleaved, and writes `len` lowpass samples followed by `len`
//! highpass samples. The highpass half is then degraded (noise gate and
//! quantization) in the same call.
//!
//! All sample arithmetic is done on `i32` and truncated back to `i16`,
//! divisions truncate toward zero. Both directions wrap identically, so
//! the inverse is exact whenever the degrade step is the identity.

use crate::utils::error::{CodecError, Result};

/// Shortest sequence (in even samples) the four tap predictor runs on,
/// anything shorter is predicted with the two tap CDF 5/3 rule.
pub const DD97_MIN_LEN: usize = 4;

/// Wavelet kernel used by a codec instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wavelet {
    /// Two sample Haar, in predict/update form.
    Haar,
    /// Cohen-Daubechies-Feauveau 5/3 biorthogonal.
    #[default]
    Cdf53,
    /// Four tap 9/7-like predictor ("97DD") with the 5/3 update.
    Dd97,
}

impl Wavelet {
    /// Identifier stored in the frame header.
    pub fn id(self) -> u8 {
        match self {
            Wavelet::Haar => 1,
            Wavelet::Cdf53 => 2,
            Wavelet::Dd97 => 3,
        }
    }

    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            1 => Ok(Wavelet::Haar),
            2 => Ok(Wavelet::Cdf53),
            3 => Ok(Wavelet::Dd97),
            other => Err(CodecError::UnknownWavelet(other)),
        }
    }

    /// Forward lift of `input` (`2 * len` interleaved samples) into
    /// `output` (`len` lowpass then `len` degraded highpass samples).
    ///
    /// `q` is the quantization step, `g` the noise gate threshold.
    pub fn lift(self, q: i16, g: f32, input: &[i16], output: &mut [i16]) {
        let len = input.len() / 2;
        debug_assert_eq!(input.len(), len * 2, "lift input must have even length");
        debug_assert!(output.len() >= len * 2);

        let (lp, hp) = output[..len * 2].split_at_mut(len);

        match self {
            Wavelet::Haar => {
                for i in 0..len {
                    let even = i32::from(input[i * 2]);
                    let odd = i32::from(input[i * 2 + 1]);
                    hp[i] = (odd - even) as i16;
                    lp[i] = (even + i32::from(hp[i]) / 2) as i16;
                }
            }
            Wavelet::Cdf53 | Wavelet::Dd97 => {
                for i in 0..len {
                    let prediction = self.predict(len, i, |k| i32::from(input[k * 2]));
                    hp[i] = (i32::from(input[i * 2 + 1]) - prediction) as i16;
                }
                for i in 0..len {
                    lp[i] = (i32::from(input[i * 2]) + update(hp, i)) as i16;
                }
            }
        }

        degrade(q, g, hp);
    }

    /// Inverse of [`Wavelet::lift`]: `input` holds `len` lowpass samples
    /// followed by `len` highpass samples already multiplied back by their
    /// quantization step, `output` receives `2 * len` interleaved samples.
    pub fn unlift(self, input: &[i16], output: &mut [i16]) {
        let len = input.len() / 2;
        debug_assert_eq!(input.len(), len * 2, "unlift input must have even length");
        debug_assert!(output.len() >= len * 2);

        let (lp, hp) = input.split_at(len);

        match self {
            Wavelet::Haar => {
                for i in 0..len {
                    let even = (i32::from(lp[i]) - i32::from(hp[i]) / 2) as i16;
                    output[i * 2] = even;
                    output[i * 2 + 1] = (i32::from(hp[i]) + i32::from(even)) as i16;
                }
            }
            Wavelet::Cdf53 | Wavelet::Dd97 => {
                for i in 0..len {
                    output[i * 2] = (i32::from(lp[i]) - update(hp, i)) as i16;
                }
                for i in 0..len {
                    let prediction = self.predict(len, i, |k| i32::from(output[k * 2]));
                    output[i * 2 + 1] = (i32::from(hp[i]) + prediction) as i16;
                }
            }
        }
    }

    /// Prediction of odd sample `i` out of the even samples around it.
    fn predict(self, len: usize, i: usize, even: impl Fn(usize) -> i32) -> i32 {
        match self {
            Wavelet::Dd97 if len >= DD97_MIN_LEN => {
                let e0 = even(i);
                let e_l1 = if i >= 1 { even(i - 1) } else { e0 };
                let e_p1 = if i + 2 <= len { even(i + 1) } else { e0 };
                let e_p2 = if i + 4 <= len { even(i + 2) } else { e_p1 };
                (-(e_l1 + e_p2) + 9 * (e0 + e_p1)) / 16
            }
            _ => {
                let e0 = even(i);
                // Fake last value, the final two odds replicate their own even
                let e_p1 = if i + 2 < len { even(i + 1) } else { e0 };
                (e0 + e_p1) / 2
            }
        }
    }
}

/// Update term added to even sample `i`.
#[inline]
fn update(hp: &[i16], i: usize) -> i32 {
    let d0 = i32::from(hp[i]);
    let d_l1 = if i > 0 { i32::from(hp[i - 1]) } else { d0 }; // Fake first value
    (d0 + d_l1) / 4
}

/// Noise gate then quantize a highpass run.
///
/// A sample strictly inside `(-g, g)` becomes zero, everything is then
/// divided by `q` with truncation.
pub fn degrade(q: i16, g: f32, hp: &mut [i16]) {
    let q = q.max(1);
    if q == 1 && g <= 0.0 {
        return;
    }

    let qf = f32::from(q);
    for value in hp.iter_mut() {
        let scaled = f32::from(*value) / qf;
        if scaled > -g / qf && scaled < g / qf {
            *value = 0;
        }
        *value /= q;
    }
}

/// Multiplies a highpass run back by its quantization step.
///
/// Whatever the gate zeroed or the division truncated stays lost.
pub fn dequantize(q: i16, hp: &mut [i16]) {
    if q <= 1 {
        return;
    }
    for value in hp.iter_mut() {
        *value = value.wrapping_mul(q);
    }
}

// src/dwt/quant.rs

//! Per level, per channel quantization step and noise gate.
//!
//! Users pick a base step and gate per channel; a [`Schedule`] turns them
//! into the values used at each lift level. Level 0 (finest detail) gets
//! the full base values, deeper levels get progressively gentler ones.

/// Base loss parameters of one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelLoss {
    /// Base quantization step, values below 1 act as 1.
    pub quantization: f32,
    /// Base noise gate threshold, negative values act as 0.
    pub noise_gate: f32,
}

impl ChannelLoss {
    pub const LOSSLESS: ChannelLoss = ChannelLoss {
        quantization: 1.0,
        noise_gate: 0.0,
    };

    pub fn new(quantization: f32, noise_gate: f32) -> Self {
        Self {
            quantization,
            noise_gate,
        }
    }
}

impl Default for ChannelLoss {
    fn default() -> Self {
        Self::LOSSLESS
    }
}

/// Step and gate handed to the kernel for one (level, channel) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepParams {
    /// Quantization step, always `>= 1`. Also written as the lift head.
    pub q: i16,
    /// Noise gate threshold, always `>= 0`.
    pub g: f32,
}

impl StepParams {
    pub const LOSSLESS: StepParams = StepParams { q: 1, g: 0.0 };
}

/// How base values decay across lift levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Schedule {
    /// Step and gate halve at every level (mk1).
    Geometric,
    /// Power law from the base value at level 0 down to 1 at the last
    /// level (mk3).
    #[default]
    PowerLaw,
}

impl Schedule {
    /// Step and gate for `level` of a tile with `total_levels` lifts.
    ///
    /// Both schedules use their own gate; the result is clamped to
    /// `q >= 1`, `g >= 0` and `q` truncated to an integer.
    pub fn step(self, loss: ChannelLoss, level: usize, total_levels: usize) -> StepParams {
        let user_q = loss.quantization.max(1.0);
        let user_g = loss.noise_gate.max(0.0);

        let (q, g) = match self {
            Schedule::Geometric => {
                let divisor = 2f32.powi(level as i32);
                (user_q / divisor, user_g / divisor)
            }
            Schedule::PowerLaw => {
                let exponent = power_law_exponent(level, total_levels);
                (user_q.powf(exponent), (user_g + 1.0).powf(exponent) - 1.0)
            }
        };

        StepParams {
            q: q.clamp(1.0, f32::from(i16::MAX)) as i16,
            g: g.max(0.0),
        }
    }
}

/// `1 - level / (total_levels - 1)`; a single level tile keeps its base values.
fn power_law_exponent(level: usize, total_levels: usize) -> f32 {
    if total_levels <= 1 {
        return 1.0;
    }
    1.0 - level as f32 / (total_levels - 1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEDULES: [Schedule; 2] = [Schedule::Geometric, Schedule::PowerLaw];

    #[test]
    fn test_outputs_are_clamped() {
        for schedule in SCHEDULES {
            for user_q in [0.0f32, 0.5, 1.0, 3.0, 40.0] {
                for user_g in [-100.0f32, -1.0, -0.1] {
                    for total in 1..8 {
                        for level in 0..total {
                            let step = schedule.step(ChannelLoss::new(user_q, user_g), level, total);
                            assert!(step.q >= 1, "{:?} q {} level {}", schedule, user_q, level);
                            assert!(step.g >= 0.0, "{:?} g {} level {}", schedule, user_g, level);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_power_law_endpoints() {
        let loss = ChannelLoss::new(17.0, 8.0);
        let first = Schedule::PowerLaw.step(loss, 0, 5);
        let last = Schedule::PowerLaw.step(loss, 4, 5);
        assert_eq!(first.q, 17);
        assert!((first.g - 8.0).abs() < 1e-4);
        assert_eq!(last.q, 1);
        assert!(last.g.abs() < 1e-4);

        // Halfway: 17^0.5 truncated, and 9^0.5 - 1
        let middle = Schedule::PowerLaw.step(loss, 2, 5);
        assert_eq!(middle.q, 4);
        assert!((middle.g - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_geometric_halves_step_and_gate() {
        let loss = ChannelLoss::new(20.0, 12.0);
        let steps: Vec<_> = (0..4).map(|level| Schedule::Geometric.step(loss, level, 4)).collect();
        assert_eq!(steps.iter().map(|s| s.q).collect::<Vec<_>>(), vec![20, 10, 5, 2]);
        // The gate follows its own schedule, not the power law one
        assert_eq!(steps.iter().map(|s| s.g).collect::<Vec<_>>(), vec![12.0, 6.0, 3.0, 1.5]);
    }

    #[test]
    fn test_single_level_tile_keeps_base_values() {
        let step = Schedule::PowerLaw.step(ChannelLoss::new(6.5, 2.0), 0, 1);
        assert_eq!(step.q, 6);
        assert_eq!(step.g, 2.0);
    }

    #[test]
    fn test_huge_step_saturates() {
        let step = Schedule::Geometric.step(ChannelLoss::new(1.0e9, 0.0), 0, 3);
        assert_eq!(step.q, i16::MAX);
    }

    #[test]
    fn test_lossless_stays_lossless() {
        for schedule in SCHEDULES {
            for level in 0..6 {
                assert_eq!(schedule.step(ChannelLoss::LOSSLESS, level, 6), StepParams::LOSSLESS);
            }
        }
    }
}

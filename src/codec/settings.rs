// src/codec/settings.rs

use crate::dwt::{ChannelLoss, Schedule, Wavelet};
use crate::utils::error::{CodecError, Result};

/// Most channels a frame can carry (gray, gray + alpha, RGB, RGBA).
pub const MAX_CHANNELS: usize = 4;

/// Default side of a square tile, in pixels.
pub const DEFAULT_TILE_SIZE: usize = 512;

/// What happens to tiles that stick out of the image on the right or
/// bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgePolicy {
    /// Partial tiles are not encoded; their pixels decode as zero.
    #[default]
    Skip,
    /// Partial tiles are encoded clipped to the image, as smaller tiles.
    Partial,
}

impl EdgePolicy {
    /// Identifier stored in the frame header.
    pub fn id(self) -> u8 {
        match self {
            EdgePolicy::Skip => 0,
            EdgePolicy::Partial => 1,
        }
    }

    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            0 => Ok(EdgePolicy::Skip),
            1 => Ok(EdgePolicy::Partial),
            other => Err(CodecError::UnknownEdgePolicy(other)),
        }
    }
}

/// Encoder configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub wavelet: Wavelet,
    pub schedule: Schedule,
    /// Side of a square tile; 0 encodes the whole image as a single tile.
    pub tile_size: usize,
    pub edge_policy: EdgePolicy,
    /// Base loss per channel, indexed by channel.
    pub loss: [ChannelLoss; MAX_CHANNELS],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wavelet: Wavelet::default(),
            schedule: Schedule::default(),
            tile_size: DEFAULT_TILE_SIZE,
            edge_policy: EdgePolicy::default(),
            loss: [ChannelLoss::LOSSLESS; MAX_CHANNELS],
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wavelet(mut self, wavelet: Wavelet) -> Self {
        self.wavelet = wavelet;
        self
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_tile_size(mut self, tile_size: usize) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_edge_policy(mut self, edge_policy: EdgePolicy) -> Self {
        self.edge_policy = edge_policy;
        self
    }

    /// Sets the base quantization step and noise gate of one channel.
    /// Channels past [`MAX_CHANNELS`] are ignored.
    pub fn with_channel_loss(mut self, ch: usize, quantization: f32, noise_gate: f32) -> Self {
        if let Some(loss) = self.loss.get_mut(ch) {
            *loss = ChannelLoss::new(quantization, noise_gate);
        }
        self
    }

    /// Same base step and gate on every channel.
    pub fn with_uniform_loss(mut self, quantization: f32, noise_gate: f32) -> Self {
        self.loss = [ChannelLoss::new(quantization, noise_gate); MAX_CHANNELS];
        self
    }

    /// Scales the loss of every channel but the first one, which usually
    /// carries luma while the others carry chroma.
    pub fn with_chroma_loss(mut self, factor: f32) -> Self {
        for loss in &mut self.loss[1..] {
            loss.quantization *= factor;
            loss.noise_gate *= factor;
        }
        self
    }

    /// Loss of the first `channels` channels.
    pub fn channel_loss(&self, channels: usize) -> &[ChannelLoss] {
        &self.loss[..channels.min(MAX_CHANNELS)]
    }

    /// Checks the settings can encode a `channels` channel image.
    ///
    /// Out of range step and gate values are not errors, the schedule
    /// clamps them; only non-finite ones are rejected.
    pub fn validate(&self, channels: usize) -> Result<()> {
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(CodecError::InvalidArg(format!(
                "{} channels, expected 1 to {}",
                channels, MAX_CHANNELS
            )));
        }
        if u32::try_from(self.tile_size).is_err() {
            return Err(CodecError::InvalidArg(format!("tile size {} too large", self.tile_size)));
        }
        for (ch, loss) in self.channel_loss(channels).iter().enumerate() {
            if !loss.quantization.is_finite() || !loss.noise_gate.is_finite() {
                return Err(CodecError::InvalidArg(format!(
                    "channel {} loss is not finite ({:?})",
                    ch, loss
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_lossless() {
        let settings = Settings::default();
        assert_eq!(settings.wavelet, Wavelet::Cdf53);
        assert_eq!(settings.schedule, Schedule::PowerLaw);
        assert_eq!(settings.edge_policy, EdgePolicy::Skip);
        assert_eq!(settings.tile_size, DEFAULT_TILE_SIZE);
        assert!(settings.loss.iter().all(|l| *l == ChannelLoss::LOSSLESS));
    }

    #[test]
    fn test_builder_and_chroma_loss() {
        let settings = Settings::new()
            .with_wavelet(Wavelet::Dd97)
            .with_tile_size(64)
            .with_uniform_loss(4.0, 2.0)
            .with_chroma_loss(2.0)
            .with_channel_loss(9, 1.0, 1.0);

        assert_eq!(settings.wavelet, Wavelet::Dd97);
        assert_eq!(settings.tile_size, 64);
        assert_eq!(settings.loss[0], ChannelLoss::new(4.0, 2.0));
        assert_eq!(settings.loss[1], ChannelLoss::new(8.0, 4.0));
        assert_eq!(settings.loss[3], ChannelLoss::new(8.0, 4.0));
        assert_eq!(settings.channel_loss(3).len(), 3);
    }

    #[test]
    fn test_validate() {
        let settings = Settings::default();
        assert!(settings.validate(3).is_ok());
        assert!(matches!(settings.validate(0), Err(CodecError::InvalidArg(_))));
        assert!(matches!(settings.validate(5), Err(CodecError::InvalidArg(_))));

        // Clamped by the schedule, not rejected
        assert!(settings.clone().with_uniform_loss(-3.0, -1.0).validate(1).is_ok());

        let broken = settings.with_channel_loss(1, f32::NAN, 0.0);
        assert!(broken.validate(1).is_ok());
        assert!(matches!(broken.validate(2), Err(CodecError::InvalidArg(_))));
    }

    #[test]
    fn test_edge_policy_ids() {
        for policy in [EdgePolicy::Skip, EdgePolicy::Partial] {
            assert_eq!(EdgePolicy::from_id(policy.id()).ok(), Some(policy));
        }
        assert!(matches!(EdgePolicy::from_id(7), Err(CodecError::UnknownEdgePolicy(7))));
    }
}

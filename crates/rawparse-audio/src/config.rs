use bytes::Bytes;
use rawparse_frame::{ConfigError, FrameTransform, UnitFormat, UnitsPerSecond};
use serde::Serialize;

use crate::channel::{
    self, check_valid_positions, positions_from_mask, reorder_map, to_valid_order, ChannelPosition,
    MAX_CHANNELS,
};
use crate::format::{AudioParseFormat, PcmFormat};

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_NUM_CHANNELS: u32 = 2;

/// One interpretation of a raw audio byte stream.
///
/// When `ready` is set, `bpf`, `num_channels` and the position list are
/// consistent with each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioConfig {
    pub(crate) ready: bool,
    pub(crate) format: AudioParseFormat,
    pub(crate) pcm_format: PcmFormat,
    pub(crate) bpf: usize,
    pub(crate) sample_rate: u32,
    pub(crate) num_channels: u32,
    pub(crate) interleaved: bool,
    pub(crate) channel_positions: Vec<ChannelPosition>,
    pub(crate) needs_reordering: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) reordered_positions: Vec<ChannelPosition>,
}

impl Default for AudioConfig {
    /// S16LE stereo at 44.1 kHz, interleaved, ready.
    fn default() -> Self {
        let mut config = Self {
            ready: true,
            format: AudioParseFormat::Pcm,
            pcm_format: PcmFormat::default(),
            bpf: 0,
            sample_rate: DEFAULT_SAMPLE_RATE,
            num_channels: DEFAULT_NUM_CHANNELS,
            interleaved: true,
            channel_positions: vec![ChannelPosition::FrontLeft, ChannelPosition::FrontRight],
            needs_reordering: false,
            reordered_positions: Vec::new(),
        };
        config.update_bpf();
        config
    }
}

impl AudioConfig {
    /// The defaults, but waiting for caps.
    pub fn unready() -> Self {
        Self {
            ready: false,
            ..Self::default()
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn format(&self) -> AudioParseFormat {
        self.format
    }

    pub fn pcm_format(&self) -> PcmFormat {
        self.pcm_format
    }

    /// Bytes per frame: one sample for every channel.
    pub fn bpf(&self) -> usize {
        self.bpf
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn num_channels(&self) -> u32 {
        self.num_channels
    }

    pub fn interleaved(&self) -> bool {
        self.interleaved
    }

    pub fn channel_positions(&self) -> &[ChannelPosition] {
        &self.channel_positions
    }

    pub fn needs_reordering(&self) -> bool {
        self.needs_reordering
    }

    /// Canonical order of the positions; empty unless reordering.
    pub fn reordered_positions(&self) -> &[ChannelPosition] {
        &self.reordered_positions
    }

    /// Positions as they appear downstream.
    pub fn output_positions(&self) -> &[ChannelPosition] {
        if self.needs_reordering {
            &self.reordered_positions
        } else {
            &self.channel_positions
        }
    }

    /// Bytes per sample.
    pub fn sample_size(&self) -> usize {
        match self.format {
            AudioParseFormat::Pcm => self.pcm_format.sample_size(),
            AudioParseFormat::Alaw | AudioParseFormat::Mulaw => 1,
        }
    }

    /// Set the channel count.
    ///
    /// With `derive_positions` the positions come from `mask`, or from the
    /// fallback mask if `mask` is 0. Without it the position list is only
    /// resized to `count` entries of `None` for the caller to fill.
    /// Reordering is switched off. On error nothing changes.
    pub fn set_channels(
        &mut self,
        count: u32,
        mask: u64,
        derive_positions: bool,
    ) -> Result<(), ConfigError> {
        if count == 0 {
            return Err(ConfigError::InvalidProperty {
                name: "num-channels",
                reason: "must be at least 1".to_string(),
            });
        }
        if count > MAX_CHANNELS {
            return Err(ConfigError::TooManyChannels {
                count,
                max: MAX_CHANNELS,
            });
        }

        let positions = if derive_positions {
            let mask = if mask == 0 {
                channel::fallback_mask(count)
            } else {
                mask
            };
            positions_from_mask(count, mask)?
        } else {
            vec![ChannelPosition::None; count as usize]
        };

        self.num_channels = count;
        self.channel_positions = positions;
        self.needs_reordering = false;
        self.reordered_positions.clear();
        Ok(())
    }

    /// Recompute whether the positions need reordering into canonical
    /// order. On error nothing changes.
    pub fn update_reordering_flag(&mut self) -> Result<(), ConfigError> {
        if check_valid_positions(&self.channel_positions, true) {
            self.needs_reordering = false;
            self.reordered_positions.clear();
            return Ok(());
        }

        let reordered = to_valid_order(&self.channel_positions)?;
        self.needs_reordering = true;
        self.reordered_positions = reordered;
        Ok(())
    }

    /// Recompute bytes per frame from format and channel count.
    pub fn update_bpf(&mut self) {
        self.bpf = self.sample_size() * self.num_channels as usize;
    }

    /// Replace the positions with an explicit list, or with the default
    /// layout for the current count if `positions` is `None`.
    ///
    /// An explicit list also sets the channel count. On error nothing
    /// changes.
    pub fn set_channel_positions(
        &mut self,
        positions: Option<&[ChannelPosition]>,
    ) -> Result<(), ConfigError> {
        let mut next = self.clone();
        match positions {
            Some([]) => return Err(ConfigError::EmptyChannelPositions),
            Some(positions) => {
                let count = u32::try_from(positions.len()).unwrap_or(u32::MAX);
                next.set_channels(count, 0, false)?;
                next.channel_positions = positions.to_vec();
                next.update_reordering_flag()?;
            }
            None => next.set_channels(next.num_channels, 0, true)?,
        }
        next.update_bpf();
        *self = next;
        Ok(())
    }

    /// Memory alignment of one sample.
    ///
    /// PCM sample widths round up to whole bytes and then to a power of
    /// two, so 24-bit samples align to 4. Companded formats align to 1.
    pub fn alignment(&self) -> usize {
        match self.format {
            AudioParseFormat::Pcm => {
                let bytes = self.pcm_format.width().div_ceil(8) as usize;
                bytes.next_power_of_two()
            }
            AudioParseFormat::Alaw | AudioParseFormat::Mulaw => 1,
        }
    }

    /// Channel permutation to apply to each batch.
    ///
    /// Only interleaved PCM is reordered.
    pub fn transform(&self) -> FrameTransform {
        if self.format != AudioParseFormat::Pcm || !self.needs_reordering || !self.interleaved {
            return FrameTransform::Identity;
        }
        match reorder_map(&self.channel_positions, &self.reordered_positions) {
            Some(map) => FrameTransform::channel_permute(self.sample_size(), map),
            None => FrameTransform::Identity,
        }
    }

    /// Move samples into canonical channel order.
    pub fn apply_reorder(&self, frames: Bytes) -> Bytes {
        self.transform().apply(frames)
    }

    pub fn units_per_second(&self, format: UnitFormat) -> UnitsPerSecond {
        let rate = u64::from(self.sample_rate);
        match format {
            UnitFormat::Bytes => rate
                .checked_mul(self.bpf as u64)
                .map_or(UnitsPerSecond::new(0, 1), |bytes| UnitsPerSecond::new(bytes, 1)),
            _ => UnitsPerSecond::new(rate, 1),
        }
    }
}

use rawparse_caps::Caps;
use rawparse_frame::{
    ConfigError, ConfigKind, FrameTransform, RawParser, UnitFormat, UnitsPerSecond,
};
use tracing::debug;

use crate::caps::{caps_to_config, config_to_caps};
use crate::channel::ChannelPosition;
use crate::config::AudioConfig;
use crate::format::{AudioParseFormat, PcmFormat};

/// Audio half of the raw parser: a properties record, a negotiated record
/// and the selector between them.
///
/// The `set_*` methods change the properties record only and report whether
/// anything changed. Wrap the parser in [`crate::AudioParse`] to get the
/// locking and caps invalidation around them.
#[derive(Debug, Clone)]
pub struct AudioParser {
    properties: AudioConfig,
    negotiated: AudioConfig,
    current: ConfigKind,
}

impl Default for AudioParser {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioParser {
    pub fn new() -> Self {
        Self {
            properties: AudioConfig::default(),
            negotiated: AudioConfig::unready(),
            current: ConfigKind::Properties,
        }
    }

    /// Borrow a record.
    pub fn config(&self, which: ConfigKind) -> &AudioConfig {
        match which.resolve(self.current) {
            ConfigKind::Negotiated => &self.negotiated,
            _ => &self.properties,
        }
    }

    fn config_mut(&mut self, which: ConfigKind) -> &mut AudioConfig {
        match which.resolve(self.current) {
            ConfigKind::Negotiated => &mut self.negotiated,
            _ => &mut self.properties,
        }
    }

    pub fn set_format(&mut self, format: AudioParseFormat) -> bool {
        if self.properties.format == format {
            return false;
        }
        self.properties.format = format;
        self.properties.update_bpf();
        true
    }

    pub fn set_pcm_format(&mut self, pcm_format: PcmFormat) -> bool {
        if self.properties.pcm_format == pcm_format {
            return false;
        }
        self.properties.pcm_format = pcm_format;
        self.properties.update_bpf();
        true
    }

    pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<bool, ConfigError> {
        if sample_rate == 0 {
            return Err(ConfigError::InvalidProperty {
                name: "sample-rate",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.properties.sample_rate == sample_rate {
            return Ok(false);
        }
        self.properties.sample_rate = sample_rate;
        Ok(true)
    }

    /// Change the channel count, resetting positions to the default layout.
    pub fn set_num_channels(&mut self, channels: u32) -> Result<bool, ConfigError> {
        if self.properties.num_channels == channels {
            return Ok(false);
        }
        self.properties.set_channels(channels, 0, true)?;
        self.properties.update_bpf();
        Ok(true)
    }

    pub fn set_interleaved(&mut self, interleaved: bool) -> bool {
        if self.properties.interleaved == interleaved {
            return false;
        }
        self.properties.interleaved = interleaved;
        true
    }

    /// Set explicit positions, or restore the default layout with `None`.
    pub fn set_channel_positions(
        &mut self,
        positions: Option<&[ChannelPosition]>,
    ) -> Result<bool, ConfigError> {
        let before = self.properties.clone();
        self.properties.set_channel_positions(positions)?;
        Ok(self.properties != before)
    }
}

impl RawParser for AudioParser {
    fn set_current_config(&mut self, which: ConfigKind) {
        assert!(
            which != ConfigKind::Current,
            "ConfigKind::Current is an alias and cannot be selected"
        );
        self.current = which;
    }

    fn current_config(&self) -> ConfigKind {
        self.current
    }

    fn set_config_from_caps(&mut self, which: ConfigKind, caps: &Caps) -> Result<(), ConfigError> {
        let config = caps_to_config(caps)?;
        debug!(
            record = %which.resolve(self.current),
            format = %config.format(),
            rate = config.sample_rate(),
            channels = config.num_channels(),
            bpf = config.bpf(),
            "audio config updated from caps"
        );
        *self.config_mut(which) = config;
        Ok(())
    }

    fn caps_from_config(&self, which: ConfigKind) -> Result<Caps, ConfigError> {
        config_to_caps(self.config(which))
    }

    fn config_frame_size(&self, which: ConfigKind) -> usize {
        self.config(which).bpf()
    }

    fn is_config_ready(&self, which: ConfigKind) -> bool {
        self.config(which).is_ready()
    }

    fn transform(&self, which: ConfigKind) -> FrameTransform {
        self.config(which).transform()
    }

    fn units_per_second(&self, format: UnitFormat, which: ConfigKind) -> UnitsPerSecond {
        self.config(which).units_per_second(format)
    }

    fn alignment(&self, which: ConfigKind) -> usize {
        self.config(which).alignment()
    }

    fn reset_negotiated(&mut self) {
        self.negotiated.ready = false;
    }
}

#[cfg(test)]
mod tests {
    use rawparse_caps::FieldValue;

    use super::*;

    #[test]
    fn starts_on_properties() {
        let parser = AudioParser::new();
        assert_eq!(parser.current_config(), ConfigKind::Properties);
        assert!(parser.is_config_ready(ConfigKind::Properties));
        assert!(!parser.is_config_ready(ConfigKind::Negotiated));
        assert_eq!(parser.config_frame_size(ConfigKind::Current), 4);
    }

    #[test]
    fn setters_report_changes() {
        let mut parser = AudioParser::new();
        assert!(!parser.set_pcm_format(PcmFormat::S16LE));
        assert!(parser.set_pcm_format(PcmFormat::S32BE));
        assert_eq!(parser.config_frame_size(ConfigKind::Properties), 8);

        assert!(!parser.set_sample_rate(44_100).unwrap());
        assert!(parser.set_sample_rate(8_000).unwrap());
        assert!(parser.set_sample_rate(0).is_err());

        assert!(parser.set_num_channels(6).unwrap());
        assert_eq!(parser.config_frame_size(ConfigKind::Properties), 24);
        assert!(parser.set_num_channels(0).is_err());
        assert!(parser.set_num_channels(65).is_err());
        assert_eq!(parser.config(ConfigKind::Properties).num_channels(), 6);

        assert!(parser.set_format(AudioParseFormat::Alaw));
        assert_eq!(parser.config_frame_size(ConfigKind::Properties), 6);
        assert!(!parser.set_interleaved(true));
    }

    #[test]
    fn caps_fill_the_requested_record() {
        let mut parser = AudioParser::new();
        let caps: Caps = "audio/x-alaw, rate=8000, channels=1".parse().unwrap();
        parser
            .set_config_from_caps(ConfigKind::Negotiated, &caps)
            .unwrap();
        assert!(parser.is_config_ready(ConfigKind::Negotiated));
        assert_eq!(parser.config_frame_size(ConfigKind::Negotiated), 1);
        assert_eq!(parser.config_frame_size(ConfigKind::Properties), 4);

        parser.set_current_config(ConfigKind::Negotiated);
        let expected = caps.with("channel-mask", FieldValue::Bitmask(0));
        assert_eq!(parser.caps_from_config(ConfigKind::Current).unwrap(), expected);

        parser.reset_negotiated();
        assert!(!parser.is_config_ready(ConfigKind::Current));
    }

    #[test]
    fn failed_caps_keep_the_record() {
        let mut parser = AudioParser::new();
        let before = parser.config(ConfigKind::Properties).clone();
        let caps: Caps = "audio/x-raw, format=S16LE".parse().unwrap();
        assert!(parser
            .set_config_from_caps(ConfigKind::Properties, &caps)
            .is_err());
        assert_eq!(parser.config(ConfigKind::Properties), &before);
    }

    #[test]
    #[should_panic(expected = "alias")]
    fn selecting_current_alias_panics() {
        AudioParser::new().set_current_config(ConfigKind::Current);
    }
}

//! Conversion between [`AudioConfig`] and audio caps.

use rawparse_caps::{media, Caps, FieldValue};
use rawparse_frame::ConfigError;

use crate::channel::{positions_from_mask, positions_to_mask, ChannelPosition, MAX_CHANNELS};
use crate::config::AudioConfig;
use crate::format::{AudioParseFormat, PcmFormat};

const LAYOUT_INTERLEAVED: &str = "interleaved";
const LAYOUT_NON_INTERLEAVED: &str = "non-interleaved";

/// Build a ready record from caps.
///
/// Unaligned raw caps are read as aligned raw caps.
pub fn caps_to_config(caps: &Caps) -> Result<AudioConfig, ConfigError> {
    match media::aligned(caps.media_type()) {
        media::AUDIO_RAW => raw_caps_to_config(caps),
        media::AUDIO_ALAW => companded_caps_to_config(caps, AudioParseFormat::Alaw),
        media::AUDIO_MULAW => companded_caps_to_config(caps, AudioParseFormat::Mulaw),
        other => Err(ConfigError::UnsupportedMediaType(other.to_string())),
    }
}

fn raw_caps_to_config(caps: &Caps) -> Result<AudioConfig, ConfigError> {
    let name = caps.media_type();

    let format_name = require_str(caps, "format")?;
    let pcm_format = PcmFormat::from_name(format_name).ok_or_else(|| ConfigError::InvalidField {
        field: "format",
        reason: format!("unknown sample format '{format_name}'"),
    })?;
    let sample_rate = positive_int(caps, "rate")?;
    let channels = positive_int(caps, "channels")?;
    if channels > MAX_CHANNELS {
        return Err(ConfigError::TooManyChannels {
            count: channels,
            max: MAX_CHANNELS,
        });
    }

    let interleaved = match require_str(caps, "layout")? {
        LAYOUT_INTERLEAVED => true,
        LAYOUT_NON_INTERLEAVED => false,
        other => {
            return Err(ConfigError::InvalidField {
                field: "layout",
                reason: format!("unknown layout '{other}'"),
            })
        }
    };

    let positions = match channel_mask(caps)? {
        Some(0) if channels == 1 => vec![ChannelPosition::Mono],
        Some(0) => vec![ChannelPosition::None; channels as usize],
        Some(mask) => positions_from_mask(channels, mask)?,
        None if channels <= 2 => positions_from_mask(channels, 0)?,
        None => {
            return Err(ConfigError::MissingField {
                media_type: name.to_string(),
                field: "channel-mask",
            })
        }
    };

    let mut config = AudioConfig::unready();
    config.format = AudioParseFormat::Pcm;
    config.pcm_format = pcm_format;
    config.sample_rate = sample_rate;
    config.interleaved = interleaved;
    config.num_channels = channels;
    config.channel_positions = positions;
    config.needs_reordering = false;
    config.reordered_positions.clear();
    config.update_bpf();
    config.ready = true;
    Ok(config)
}

fn companded_caps_to_config(
    caps: &Caps,
    format: AudioParseFormat,
) -> Result<AudioConfig, ConfigError> {
    let sample_rate = positive_int(caps, "rate")?;
    let channels = positive_int(caps, "channels")?;

    let mut config = AudioConfig::unready();
    config.format = format;
    config.sample_rate = sample_rate;
    config.set_channels(channels, channel_mask(caps)?.unwrap_or(0), true)?;
    config.update_bpf();
    config.ready = true;
    Ok(config)
}

/// Describe a record as caps.
///
/// PCM always becomes `audio/x-raw`. The downstream positions are the
/// reordered ones when reordering is active.
pub fn config_to_caps(config: &AudioConfig) -> Result<Caps, ConfigError> {
    if config.bpf() == 0 {
        return Err(ConfigError::NotPopulated);
    }

    let positions = config.output_positions();
    let rate = to_int("rate", config.sample_rate())?;
    let channels = to_int("channels", config.num_channels())?;

    let caps = match config.format() {
        AudioParseFormat::Pcm => {
            let layout = if config.interleaved() {
                LAYOUT_INTERLEAVED
            } else {
                LAYOUT_NON_INTERLEAVED
            };
            let mut caps = Caps::new(media::AUDIO_RAW)
                .with("format", config.pcm_format().name())
                .with("layout", layout)
                .with("rate", rate)
                .with("channels", channels);
            if positions != [ChannelPosition::Mono] {
                caps.set("channel-mask", FieldValue::Bitmask(positions_to_mask(positions)?));
            }
            caps
        }
        AudioParseFormat::Alaw | AudioParseFormat::Mulaw => {
            let media_type = if config.format() == AudioParseFormat::Alaw {
                media::AUDIO_ALAW
            } else {
                media::AUDIO_MULAW
            };
            Caps::new(media_type)
                .with("rate", rate)
                .with("channels", channels)
                .with("channel-mask", FieldValue::Bitmask(positions_to_mask(positions)?))
        }
    };
    Ok(caps)
}

fn require_str<'a>(caps: &'a Caps, field: &'static str) -> Result<&'a str, ConfigError> {
    match caps.get(field) {
        Some(FieldValue::String(value)) => Ok(value),
        Some(other) => Err(ConfigError::InvalidField {
            field,
            reason: format!("expected a string, got {other}"),
        }),
        None => Err(missing(caps, field)),
    }
}

fn positive_int(caps: &Caps, field: &'static str) -> Result<u32, ConfigError> {
    match caps.get(field) {
        Some(FieldValue::Int(value)) if *value > 0 => Ok(*value as u32),
        Some(other) => Err(ConfigError::InvalidField {
            field,
            reason: format!("expected a positive int, got {other}"),
        }),
        None => Err(missing(caps, field)),
    }
}

fn channel_mask(caps: &Caps) -> Result<Option<u64>, ConfigError> {
    if !caps.has_field("channel-mask") {
        return Ok(None);
    }
    caps.get_bitmask("channel-mask")
        .map(Some)
        .ok_or_else(|| ConfigError::InvalidField {
            field: "channel-mask",
            reason: "expected a bitmask".to_string(),
        })
}

fn to_int(field: &'static str, value: u32) -> Result<i32, ConfigError> {
    i32::try_from(value).map_err(|_| ConfigError::InvalidField {
        field,
        reason: format!("{value} does not fit in an int"),
    })
}

fn missing(caps: &Caps, field: &'static str) -> ConfigError {
    ConfigError::MissingField {
        media_type: caps.media_type().to_string(),
        field,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelPosition as Pos;

    fn raw(text: &str) -> Caps {
        text.parse().unwrap()
    }

    #[test]
    fn parses_raw_stereo() {
        let config = caps_to_config(&raw(
            "audio/x-raw, format=S16LE, rate=48000, channels=2, layout=interleaved",
        ))
        .unwrap();
        assert!(config.is_ready());
        assert_eq!(config.sample_rate(), 48_000);
        assert_eq!(config.bpf(), 4);
        assert_eq!(config.channel_positions(), &[Pos::FrontLeft, Pos::FrontRight]);
    }

    #[test]
    fn unaligned_raw_reads_as_raw() {
        let config = caps_to_config(&raw(
            "audio/x-unaligned-raw, format=S24BE, rate=96000, channels=1, layout=interleaved",
        ))
        .unwrap();
        assert_eq!(config.pcm_format(), PcmFormat::S24BE);
        assert_eq!(config.bpf(), 3);
        assert_eq!(config.channel_positions(), &[Pos::Mono]);
        assert!(config_to_caps(&config)
            .unwrap()
            .has_name(media::AUDIO_RAW));
    }

    #[test]
    fn raw_multichannel_requires_mask() {
        let err = caps_to_config(&raw(
            "audio/x-raw, format=S16LE, rate=48000, channels=6, layout=interleaved",
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField {
                field: "channel-mask",
                ..
            }
        ));
    }

    #[test]
    fn raw_zero_mask_is_unpositioned() {
        let config = caps_to_config(&raw(
            "audio/x-raw, format=U8, rate=8000, channels=2, layout=non-interleaved, \
             channel-mask=(bitmask)0x0",
        ))
        .unwrap();
        assert!(!config.interleaved());
        assert_eq!(config.channel_positions(), &[Pos::None, Pos::None]);
    }

    #[test]
    fn raw_missing_fields_fail() {
        for text in [
            "audio/x-raw, rate=48000, channels=2, layout=interleaved",
            "audio/x-raw, format=S16LE, channels=2, layout=interleaved",
            "audio/x-raw, format=S16LE, rate=48000, layout=interleaved",
            "audio/x-raw, format=S16LE, rate=48000, channels=2",
        ] {
            assert!(
                matches!(caps_to_config(&raw(text)), Err(ConfigError::MissingField { .. })),
                "{text}"
            );
        }
        assert!(matches!(
            caps_to_config(&raw(
                "audio/x-raw, format=S16LE, rate=0, channels=2, layout=interleaved"
            )),
            Err(ConfigError::InvalidField { field: "rate", .. })
        ));
        assert!(matches!(
            caps_to_config(&raw(
                "audio/x-raw, format=S12LE, rate=8000, channels=2, layout=interleaved"
            )),
            Err(ConfigError::InvalidField { field: "format", .. })
        ));
    }

    #[test]
    fn companded_uses_fallback_mask() {
        let config = caps_to_config(&raw("audio/x-mulaw, rate=8000, channels=3")).unwrap();
        assert_eq!(config.format(), AudioParseFormat::Mulaw);
        assert_eq!(config.bpf(), 3);
        assert_eq!(
            config.channel_positions(),
            &[Pos::FrontLeft, Pos::FrontRight, Pos::Lfe1]
        );

        let caps = config_to_caps(&config).unwrap();
        assert!(caps.has_name(media::AUDIO_MULAW));
        assert_eq!(caps.get_bitmask("channel-mask"), Some(0xb));
    }

    #[test]
    fn companded_bad_mask_fails() {
        assert!(matches!(
            caps_to_config(&raw("audio/x-alaw, rate=8000, channels=2, channel-mask=(bitmask)0x7")),
            Err(ConfigError::InvalidChannelMask { .. })
        ));
    }

    #[test]
    fn other_media_types_are_unsupported() {
        assert_eq!(
            caps_to_config(&raw("audio/mpeg, rate=44100")).unwrap_err(),
            ConfigError::UnsupportedMediaType("audio/mpeg".to_string())
        );
    }

    #[test]
    fn mono_raw_omits_mask() {
        let mut config = AudioConfig::default();
        config.set_channels(1, 0, true).unwrap();
        config.update_bpf();
        let caps = config_to_caps(&config).unwrap();
        assert!(!caps.has_field("channel-mask"));
        assert_eq!(caps.get_str("layout"), Some("interleaved"));
    }

    #[test]
    fn encode_writes_reordered_positions() {
        let mut config = AudioConfig::default();
        config
            .set_channel_positions(Some(&[Pos::FrontRight, Pos::FrontLeft, Pos::FrontCenter]))
            .unwrap();
        let caps = config_to_caps(&config).unwrap();
        assert_eq!(caps.get_bitmask("channel-mask"), Some(0x7));
        assert_eq!(caps.get_int("channels"), Some(3));
    }

    #[test]
    fn unpopulated_record_cannot_encode() {
        let mut config = AudioConfig::default();
        config.bpf = 0;
        assert_eq!(config_to_caps(&config), Err(ConfigError::NotPopulated));
    }

    #[test]
    fn records_roundtrip_through_caps() {
        let mut records = Vec::new();

        for (format, channels, interleaved) in [
            (PcmFormat::S16LE, 2, true),
            (PcmFormat::F32BE, 1, true),
            (PcmFormat::S24_32LE, 6, false),
            (PcmFormat::U8, 8, true),
            (PcmFormat::S20LE, 12, true),
        ] {
            let mut config = AudioConfig::default();
            config.pcm_format = format;
            config.interleaved = interleaved;
            config.set_channels(channels, 0, true).unwrap();
            config.update_bpf();
            records.push(config);
        }
        for (format, channels) in [
            (AudioParseFormat::Alaw, 1),
            (AudioParseFormat::Mulaw, 5),
            (AudioParseFormat::Alaw, 10),
        ] {
            let mut config = AudioConfig::default();
            config.format = format;
            config.set_channels(channels, 0, true).unwrap();
            config.update_bpf();
            records.push(config);
        }

        for config in records {
            let caps = config_to_caps(&config).unwrap();
            let back = caps_to_config(&caps).unwrap();
            assert_eq!(back.format(), config.format(), "{caps}");
            if config.format() == AudioParseFormat::Pcm {
                assert_eq!(back.pcm_format(), config.pcm_format(), "{caps}");
                assert_eq!(back.interleaved(), config.interleaved(), "{caps}");
            }
            assert_eq!(back.sample_rate(), config.sample_rate(), "{caps}");
            assert_eq!(back.num_channels(), config.num_channels(), "{caps}");
            assert_eq!(back.bpf(), config.bpf(), "{caps}");
            assert_eq!(back.channel_positions(), config.channel_positions(), "{caps}");

            let text = caps.to_string();
            assert_eq!(caps_to_config(&text.parse().unwrap()).unwrap(), back);
        }
    }
}

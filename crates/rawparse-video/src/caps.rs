//! Conversion between [`VideoConfig`] and video caps.

use rawparse_caps::{media, Caps, FieldValue, Fraction};
use rawparse_frame::ConfigError;

use crate::config::{VideoConfig, DEFAULT_PIXEL_ASPECT_RATIO};
use crate::format::VideoFormat;

const PROGRESSIVE: &str = "progressive";
const INTERLEAVED: &str = "interleaved";
const TOP_FIELD_FIRST: &str = "top-field-first";
const BOTTOM_FIELD_FIRST: &str = "bottom-field-first";

/// Build a ready record from caps.
///
/// Frames from caps are packed back to back; a missing framerate means a
/// variable rate (0/1).
pub fn caps_to_config(caps: &Caps) -> Result<VideoConfig, ConfigError> {
    if media::aligned(caps.media_type()) != media::VIDEO_RAW {
        return Err(ConfigError::UnsupportedMediaType(
            caps.media_type().to_string(),
        ));
    }

    let format_name = match caps.get("format") {
        Some(FieldValue::String(name)) => name.as_str(),
        Some(other) => {
            return Err(ConfigError::InvalidField {
                field: "format",
                reason: format!("expected a string, got {other}"),
            })
        }
        None => return Err(missing(caps, "format")),
    };
    let format = VideoFormat::from_name(format_name).ok_or_else(|| ConfigError::InvalidField {
        field: "format",
        reason: format!("unknown pixel format '{format_name}'"),
    })?;

    let width = positive_int(caps, "width")?;
    let height = positive_int(caps, "height")?;
    let framerate = fraction(caps, "framerate", Fraction::new(0, 1), false)?;
    let pixel_aspect_ratio = fraction(caps, "pixel-aspect-ratio", DEFAULT_PIXEL_ASPECT_RATIO, true)?;

    let interlaced = match caps.get_str("interlace-mode") {
        None | Some(PROGRESSIVE) => false,
        Some(INTERLEAVED) => true,
        Some(other) => {
            return Err(ConfigError::InvalidField {
                field: "interlace-mode",
                reason: format!("unsupported mode '{other}'"),
            })
        }
    };
    let top_field_first = interlaced && caps.get_str("field-order") == Some(TOP_FIELD_FIRST);

    let mut config = VideoConfig::unready();
    config.set_dimensions(width, height, format)?;
    config.framerate = framerate;
    config.pixel_aspect_ratio = pixel_aspect_ratio;
    config.interlaced = interlaced;
    config.top_field_first = top_field_first;
    config.frame_stride = 0;
    config.ready = true;
    Ok(config)
}

/// Describe a record as `video/x-raw` caps.
pub fn config_to_caps(config: &VideoConfig) -> Result<Caps, ConfigError> {
    if config.image_size() == 0 {
        return Err(ConfigError::NotPopulated);
    }

    let mut caps = Caps::new(media::VIDEO_RAW)
        .with("format", config.format().name())
        .with("width", to_int("width", config.width())?)
        .with("height", to_int("height", config.height())?)
        .with("framerate", config.framerate())
        .with("pixel-aspect-ratio", config.pixel_aspect_ratio());

    if config.interlaced() {
        caps.set("interlace-mode", INTERLEAVED);
        let order = if config.top_field_first() {
            TOP_FIELD_FIRST
        } else {
            BOTTOM_FIELD_FIRST
        };
        caps.set("field-order", order);
    } else {
        caps.set("interlace-mode", PROGRESSIVE);
    }
    Ok(caps)
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

fn fraction(
    caps: &Caps,
    field: &'static str,
    default: Fraction,
    require_positive: bool,
) -> Result<Fraction, ConfigError> {
    let Some(value) = caps.get(field) else {
        return Ok(default);
    };
    match value {
        FieldValue::Fraction(f)
            if f.denom > 0 && f.numer >= 0 && (!require_positive || f.numer > 0) =>
        {
            Ok(*f)
        }
        other => Err(ConfigError::InvalidField {
            field,
            reason: format!("expected a non-negative fraction, got {other}"),
        }),
    }
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

    fn parse(text: &str) -> Caps {
        text.parse().unwrap()
    }

    #[test]
    fn parses_minimal_caps() {
        let config = caps_to_config(&parse("video/x-raw, format=RGB, width=4, height=2")).unwrap();
        assert!(config.is_ready());
        assert_eq!(config.format(), VideoFormat::RGB);
        assert_eq!(config.image_size(), 24);
        assert_eq!(config.framerate(), Fraction::new(0, 1));
        assert_eq!(config.pixel_aspect_ratio(), Fraction::new(1, 1));
        assert!(!config.interlaced());
    }

    #[test]
    fn parses_interlaced_caps() {
        let config = caps_to_config(&parse(
            "video/x-unaligned-raw, format=I420, width=720, height=576, framerate=25/1, \
             pixel-aspect-ratio=16/15, interlace-mode=interleaved, field-order=top-field-first",
        ))
        .unwrap();
        assert!(config.interlaced());
        assert!(config.top_field_first());
        assert_eq!(config.pixel_aspect_ratio(), Fraction::new(16, 15));
    }

    #[test]
    fn rejects_bad_caps() {
        assert!(matches!(
            caps_to_config(&parse("video/x-h264, width=4, height=4")),
            Err(ConfigError::UnsupportedMediaType(_))
        ));
        assert!(matches!(
            caps_to_config(&parse("video/x-raw, width=4, height=4")),
            Err(ConfigError::MissingField { field: "format", .. })
        ));
        assert!(matches!(
            caps_to_config(&parse("video/x-raw, format=RGB, width=4")),
            Err(ConfigError::MissingField { field: "height", .. })
        ));
        assert!(matches!(
            caps_to_config(&parse("video/x-raw, format=V210, width=4, height=4")),
            Err(ConfigError::InvalidField { field: "format", .. })
        ));
        assert!(matches!(
            caps_to_config(&parse("video/x-raw, format=RGB, width=4, height=4, framerate=25/0")),
            Err(ConfigError::InvalidField { field: "framerate", .. })
        ));
        assert!(matches!(
            caps_to_config(&parse(
                "video/x-raw, format=RGB, width=4, height=4, interlace-mode=alternate"
            )),
            Err(ConfigError::InvalidField { field: "interlace-mode", .. })
        ));
    }

    #[test]
    fn records_roundtrip_through_caps() {
        let mut progressive = VideoConfig::default();
        progressive.framerate = Fraction::new(30_000, 1001);

        let mut interlaced = VideoConfig::default();
        interlaced.set_dimensions(720, 480, VideoFormat::UYVY).unwrap();
        interlaced.interlaced = true;
        interlaced.top_field_first = false;
        interlaced.pixel_aspect_ratio = Fraction::new(10, 11);

        let mut tff = interlaced.clone();
        tff.top_field_first = true;

        for config in [progressive, interlaced, tff] {
            let caps = config_to_caps(&config).unwrap();
            let back = caps_to_config(&caps).unwrap();
            assert_eq!(back, config, "{caps}");
            let reparsed = caps_to_config(&caps.to_string().parse().unwrap()).unwrap();
            assert_eq!(reparsed, config);
        }
    }

    #[test]
    fn caps_ignore_frame_stride() {
        let mut config = VideoConfig::default();
        config.frame_stride = 200_000;
        let back = caps_to_config(&config_to_caps(&config).unwrap()).unwrap();
        assert_eq!(back.frame_stride(), 0);
        assert_eq!(back.effective_stride(), 115_200);
    }
}

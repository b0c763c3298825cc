use std::num::NonZeroUsize;

use rawparse_caps::{Caps, Fraction};
use rawparse_frame::{ConfigError, ConfigKind, RawParser, UnitFormat, UnitsPerSecond};
use tracing::debug;

use crate::caps::{caps_to_config, config_to_caps};
use crate::config::VideoConfig;
use crate::format::VideoFormat;

/// Video half of the raw parser.
///
/// Every batch carries exactly one frame. Padding between frames (a frame
/// stride above the image size) is skipped.
#[derive(Debug, Clone)]
pub struct VideoParser {
    properties: VideoConfig,
    negotiated: VideoConfig,
    current: ConfigKind,
}

impl Default for VideoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoParser {
    pub fn new() -> Self {
        Self {
            properties: VideoConfig::default(),
            negotiated: VideoConfig::unready(),
            current: ConfigKind::Properties,
        }
    }

    pub fn config(&self, which: ConfigKind) -> &VideoConfig {
        match which.resolve(self.current) {
            ConfigKind::Negotiated => &self.negotiated,
            _ => &self.properties,
        }
    }

    fn config_mut(&mut self, which: ConfigKind) -> &mut VideoConfig {
        match which.resolve(self.current) {
            ConfigKind::Negotiated => &mut self.negotiated,
            _ => &mut self.properties,
        }
    }

    pub fn set_width(&mut self, width: u32) -> Result<bool, ConfigError> {
        if self.properties.width == width {
            return Ok(false);
        }
        let (height, format) = (self.properties.height, self.properties.format);
        self.properties.set_dimensions(width, height, format)?;
        Ok(true)
    }

    pub fn set_height(&mut self, height: u32) -> Result<bool, ConfigError> {
        if self.properties.height == height {
            return Ok(false);
        }
        let (width, format) = (self.properties.width, self.properties.format);
        self.properties.set_dimensions(width, height, format)?;
        Ok(true)
    }

    pub fn set_format(&mut self, format: VideoFormat) -> bool {
        if self.properties.format == format {
            return false;
        }
        self.properties.format = format;
        self.properties.update_layout();
        true
    }

    /// Frames per second; 0/1 means variable and disables timestamps.
    pub fn set_framerate(&mut self, framerate: Fraction) -> Result<bool, ConfigError> {
        if framerate.denom <= 0 || framerate.numer < 0 {
            return Err(ConfigError::InvalidProperty {
                name: "framerate",
                reason: format!("{framerate} is not a non-negative rate"),
            });
        }
        if self.properties.framerate == framerate {
            return Ok(false);
        }
        self.properties.framerate = framerate;
        Ok(true)
    }

    pub fn set_pixel_aspect_ratio(&mut self, par: Fraction) -> Result<bool, ConfigError> {
        if !par.is_positive() {
            return Err(ConfigError::InvalidProperty {
                name: "pixel-aspect-ratio",
                reason: format!("{par} is not positive"),
            });
        }
        if self.properties.pixel_aspect_ratio == par {
            return Ok(false);
        }
        self.properties.pixel_aspect_ratio = par;
        Ok(true)
    }

    pub fn set_interlaced(&mut self, interlaced: bool) -> bool {
        if self.properties.interlaced == interlaced {
            return false;
        }
        self.properties.interlaced = interlaced;
        true
    }

    pub fn set_top_field_first(&mut self, top_field_first: bool) -> bool {
        if self.properties.top_field_first == top_field_first {
            return false;
        }
        self.properties.top_field_first = top_field_first;
        true
    }

    /// Distance between frame starts in bytes; 0 packs frames back to back.
    pub fn set_frame_stride(&mut self, frame_stride: usize) -> bool {
        if self.properties.frame_stride == frame_stride {
            return false;
        }
        self.properties.frame_stride = frame_stride;
        true
    }
}

impl RawParser for VideoParser {
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
            width = config.width(),
            height = config.height(),
            framerate = %config.framerate(),
            "video config updated from caps"
        );
        *self.config_mut(which) = config;
        Ok(())
    }

    fn caps_from_config(&self, which: ConfigKind) -> Result<Caps, ConfigError> {
        config_to_caps(self.config(which))
    }

    fn config_frame_size(&self, which: ConfigKind) -> usize {
        self.config(which).effective_stride()
    }

    fn max_frames_per_buffer(&self, _which: ConfigKind) -> Option<NonZeroUsize> {
        NonZeroUsize::new(1)
    }

    fn is_config_ready(&self, which: ConfigKind) -> bool {
        self.config(which).is_ready()
    }

    fn units_per_second(&self, format: UnitFormat, which: ConfigKind) -> UnitsPerSecond {
        self.config(which).units_per_second(format)
    }

    fn overhead_size(&self, which: ConfigKind) -> usize {
        self.config(which).overhead()
    }

    fn alignment(&self, which: ConfigKind) -> usize {
        self.config(which).alignment()
    }

    fn reset_negotiated(&mut self) {
        self.negotiated.ready = false;
    }
}

use std::ops::Deref;

use rawparse_caps::Fraction;
use rawparse_frame::{ConfigError, ConfigKind, RawParse};

use crate::config::VideoConfig;
use crate::format::VideoFormat;
use crate::parser::VideoParser;

/// Raw video parse element: one frame per batch.
pub struct VideoParse {
    inner: RawParse<VideoParser>,
}

impl Default for VideoParse {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for VideoParse {
    type Target = RawParse<VideoParser>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl VideoParse {
    pub fn new() -> Self {
        Self {
            inner: RawParse::new(VideoParser::new()),
        }
    }

    pub fn set_width(&self, width: u32) -> Result<bool, ConfigError> {
        self.inner.update_properties(|p| p.set_width(width))
    }

    pub fn set_height(&self, height: u32) -> Result<bool, ConfigError> {
        self.inner.update_properties(|p| p.set_height(height))
    }

    pub fn set_format(&self, format: VideoFormat) -> Result<bool, ConfigError> {
        self.inner.update_properties(|p| Ok(p.set_format(format)))
    }

    pub fn set_framerate(&self, framerate: Fraction) -> Result<bool, ConfigError> {
        self.inner.update_properties(|p| p.set_framerate(framerate))
    }

    pub fn set_pixel_aspect_ratio(&self, par: Fraction) -> Result<bool, ConfigError> {
        self.inner
            .update_properties(|p| p.set_pixel_aspect_ratio(par))
    }

    pub fn set_interlaced(&self, interlaced: bool) -> Result<bool, ConfigError> {
        self.inner
            .update_properties(|p| Ok(p.set_interlaced(interlaced)))
    }

    pub fn set_top_field_first(&self, top_field_first: bool) -> Result<bool, ConfigError> {
        self.inner
            .update_properties(|p| Ok(p.set_top_field_first(top_field_first)))
    }

    pub fn set_frame_stride(&self, frame_stride: usize) -> Result<bool, ConfigError> {
        self.inner
            .update_properties(|p| Ok(p.set_frame_stride(frame_stride)))
    }

    /// Snapshot of a record.
    pub fn config(&self, which: ConfigKind) -> VideoConfig {
        self.inner.with_parser(|p| p.config(which).clone())
    }
}

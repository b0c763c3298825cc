use rawparse_caps::Fraction;
use rawparse_frame::{ConfigError, UnitFormat, UnitsPerSecond};
use serde::Serialize;

use crate::format::{PlaneLayout, VideoFormat};

pub const DEFAULT_WIDTH: u32 = 320;
pub const DEFAULT_HEIGHT: u32 = 240;
pub const DEFAULT_FRAMERATE: Fraction = Fraction::new(25, 1);
pub const DEFAULT_PIXEL_ASPECT_RATIO: Fraction = Fraction::new(1, 1);

/// One interpretation of a raw video byte stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoConfig {
    pub(crate) ready: bool,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) format: VideoFormat,
    pub(crate) pixel_aspect_ratio: Fraction,
    pub(crate) framerate: Fraction,
    pub(crate) interlaced: bool,
    pub(crate) top_field_first: bool,
    /// Distance between frame starts; 0 or anything below the image size
    /// means frames are packed back to back.
    pub(crate) frame_stride: usize,
    pub(crate) layout: PlaneLayout,
}

impl Default for VideoConfig {
    /// 320x240 I420 at 25 fps, ready.
    fn default() -> Self {
        let format = VideoFormat::default();
        Self {
            ready: true,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            format,
            pixel_aspect_ratio: DEFAULT_PIXEL_ASPECT_RATIO,
            framerate: DEFAULT_FRAMERATE,
            interlaced: false,
            top_field_first: false,
            frame_stride: 0,
            layout: format.layout(DEFAULT_WIDTH as usize, DEFAULT_HEIGHT as usize),
        }
    }
}

impl VideoConfig {
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

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> VideoFormat {
        self.format
    }

    pub fn pixel_aspect_ratio(&self) -> Fraction {
        self.pixel_aspect_ratio
    }

    pub fn framerate(&self) -> Fraction {
        self.framerate
    }

    pub fn interlaced(&self) -> bool {
        self.interlaced
    }

    pub fn top_field_first(&self) -> bool {
        self.top_field_first
    }

    /// The configured stride, 0 if derived.
    pub fn frame_stride(&self) -> usize {
        self.frame_stride
    }

    pub fn plane_strides(&self) -> &[usize] {
        &self.layout.strides
    }

    pub fn plane_offsets(&self) -> &[usize] {
        &self.layout.offsets
    }

    /// Bytes of one image without padding.
    pub fn image_size(&self) -> usize {
        self.layout.size
    }

    /// Bytes consumed per frame, padding included.
    pub fn effective_stride(&self) -> usize {
        self.frame_stride.max(self.image_size())
    }

    /// Padding bytes skipped after each image.
    pub fn overhead(&self) -> usize {
        self.effective_stride() - self.image_size()
    }

    /// Change width, height and format together, recomputing the plane
    /// layout.
    pub fn set_dimensions(
        &mut self,
        width: u32,
        height: u32,
        format: VideoFormat,
    ) -> Result<(), ConfigError> {
        for (name, value) in [("width", width), ("height", height)] {
            if value == 0 {
                return Err(ConfigError::InvalidProperty {
                    name,
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        self.width = width;
        self.height = height;
        self.format = format;
        self.update_layout();
        Ok(())
    }

    pub(crate) fn update_layout(&mut self) {
        self.layout = self.format.layout(self.width as usize, self.height as usize);
    }

    /// Memory alignment of one component: 1 for 8-bit formats.
    pub fn alignment(&self) -> usize {
        self.format.component_bytes()
    }

    pub fn units_per_second(&self, format: UnitFormat) -> UnitsPerSecond {
        let numer = u64::try_from(self.framerate.numer).unwrap_or(0);
        let denom = u64::try_from(self.framerate.denom).unwrap_or(0);
        match format {
            // A byte rate past u64 is reported as undefined.
            UnitFormat::Bytes => match numer.checked_mul(self.image_size() as u64) {
                Some(bytes) => UnitsPerSecond::new(bytes, denom),
                None => UnitsPerSecond::new(0, 1),
            },
            _ => UnitsPerSecond::new(numer, denom),
        }
    }
}

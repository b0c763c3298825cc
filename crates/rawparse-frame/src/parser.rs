use std::num::NonZeroUsize;

use rawparse_caps::Caps;

use crate::config::{ConfigKind, UnitFormat, UnitsPerSecond};
use crate::error::ConfigError;
use crate::transform::FrameTransform;

/// Media-specific half of a raw parser.
///
/// Implementors hold two configuration records, one filled from properties
/// and one from negotiated caps, and a selector naming the current one.
/// Every method taking a [`ConfigKind`] must resolve
/// [`ConfigKind::Current`] to the selected record.
///
/// The engine in [`crate::RawParse`] serializes all calls behind one lock,
/// so implementations need no synchronization of their own.
pub trait RawParser: Send {
    /// Select the current record.
    ///
    /// # Panics
    ///
    /// Panics if `which` is [`ConfigKind::Current`].
    fn set_current_config(&mut self, which: ConfigKind);

    /// The selected record, never [`ConfigKind::Current`].
    fn current_config(&self) -> ConfigKind;

    /// Fill a record from caps. On error the record is left unchanged.
    fn set_config_from_caps(&mut self, which: ConfigKind, caps: &Caps) -> Result<(), ConfigError>;

    /// Describe a record as caps.
    fn caps_from_config(&self, which: ConfigKind) -> Result<Caps, ConfigError>;

    /// Input bytes per frame, including any padding.
    fn config_frame_size(&self, which: ConfigKind) -> usize;

    /// Cap on frames per emitted batch; `None` means unbounded.
    fn max_frames_per_buffer(&self, _which: ConfigKind) -> Option<NonZeroUsize> {
        None
    }

    /// Whether the record describes a usable stream.
    fn is_config_ready(&self, which: ConfigKind) -> bool;

    /// Payload rewrite to apply to each batch.
    fn transform(&self, _which: ConfigKind) -> FrameTransform {
        FrameTransform::Identity
    }

    fn is_unit_format_supported(&self, format: UnitFormat) -> bool {
        matches!(format, UnitFormat::Bytes | UnitFormat::Default)
    }

    /// Units per second of `format` for a record.
    fn units_per_second(&self, format: UnitFormat, which: ConfigKind) -> UnitsPerSecond;

    /// Trailing padding bytes per frame.
    fn overhead_size(&self, _which: ConfigKind) -> usize {
        0
    }

    /// Memory alignment the record's samples need.
    fn alignment(&self, which: ConfigKind) -> usize;

    /// Forget the negotiated record when the stream stops.
    fn reset_negotiated(&mut self);
}

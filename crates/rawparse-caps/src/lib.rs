//! Capability descriptors for raw audio and video streams.
//!
//! A descriptor ("caps") names a media type and carries typed fields:
//!
//! ```text
//! audio/x-raw, format=(string)S16LE, rate=(int)44100, channels=(int)2
//! ```
//!
//! This is the lowest layer of rawparse. Parsers convert their configuration
//! records to and from [`Caps`]; everything above negotiates in these terms.

pub mod caps;
pub mod error;
pub mod media;
pub mod value;

pub use caps::{Caps, Field};
pub use error::{CapsError, Result};
pub use media::{
    AUDIO_ALAW, AUDIO_MULAW, AUDIO_RAW, AUDIO_UNALIGNED_RAW, VIDEO_RAW, VIDEO_UNALIGNED_RAW,
};
pub use value::{FieldValue, Fraction};

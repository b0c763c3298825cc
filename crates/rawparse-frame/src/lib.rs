//! Frame segmentation engine for raw media byte streams.
//!
//! Raw audio and video carry no framing of their own: frame boundaries are
//! implied by a configuration (sample format, channel count, image size).
//! This crate owns the generic half of a raw parser:
//! - Two configuration records (from properties and from negotiated caps)
//!   behind one lock, with a selector naming the current one
//! - Slicing an accumulating buffer into the maximal run of complete frames
//!   and keeping the leftover bytes for the next call
//! - Timestamping emitted batches and announcing downstream caps
//!
//! Media-specific behavior plugs in through the [`RawParser`] trait.

pub mod codec;
pub mod config;
pub mod error;
pub mod parse;
pub mod parser;
pub mod reader;
pub mod transform;

#[cfg(feature = "async")]
pub mod async_codec;

pub use codec::{split_frames, FrameBatch, FrameLayout, ParseEvent, Segment};
pub use config::{ConfigKind, UnitFormat, UnitsPerSecond};
pub use error::{ConfigError, FrameError, Result};
pub use parse::RawParse;
pub use parser::RawParser;
pub use reader::{FrameReader, ReaderConfig};
pub use transform::FrameTransform;

#[cfg(feature = "async")]
pub use async_codec::RawParseCodec;

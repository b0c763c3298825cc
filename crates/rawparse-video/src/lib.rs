//! Raw video parsing.
//!
//! [`VideoParse`] cuts a raw video byte stream into single frames. Plane
//! strides and offsets are the default ones for the pixel format; a frame
//! stride larger than the image skips the padding between frames.

pub mod caps;
pub mod config;
pub mod error;
pub mod format;
pub mod parse;
pub mod parser;

pub use caps::{caps_to_config, config_to_caps};
pub use config::VideoConfig;
pub use error::UnknownFormat;
pub use format::{PlaneLayout, VideoFormat};
pub use parse::VideoParse;
pub use parser::VideoParser;

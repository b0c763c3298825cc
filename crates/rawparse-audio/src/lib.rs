//! Raw audio parsing: PCM, A-law and mu-law.
//!
//! [`AudioParse`] slices a raw audio byte stream into whole sample frames.
//! Its layout comes either from properties or from negotiated caps; when
//! the configured channel positions are out of canonical order, samples are
//! reordered on the way out.
//!
//! ```no_run
//! use rawparse_audio::{AudioParse, PcmFormat};
//! use rawparse_frame::ParseEvent;
//!
//! let parse = AudioParse::new();
//! parse.set_pcm_format(PcmFormat::S24LE)?;
//! parse.set_sample_rate(48_000)?;
//!
//! for event in parse.push(&[0u8; 4096])? {
//!     if let ParseEvent::Frames(batch) = event {
//!         println!("{} frames at {:?}", batch.num_frames, batch.pts);
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod caps;
pub mod channel;
pub mod config;
pub mod error;
pub mod format;
pub mod parse;
pub mod parser;

pub use caps::{caps_to_config, config_to_caps};
pub use channel::{ChannelPosition, MAX_CHANNELS};
pub use config::AudioConfig;
pub use error::UnknownName;
pub use format::{AudioParseFormat, PcmFormat};
pub use parse::AudioParse;
pub use parser::AudioParser;

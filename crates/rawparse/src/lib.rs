//! Frame segmentation for raw audio and video byte streams.
//!
//! rawparse turns an unframed stream of PCM samples or video images into
//! batches of whole frames, each with a timestamp, and describes the output
//! with a capability descriptor.
//!
//! # Crate Structure
//!
//! - [`caps`]: Capability descriptors and their text form
//! - [`frame`]: The generic segmentation engine, parser trait and readers
//! - [`audio`]: PCM, A-law and mu-law parsing (behind `audio` feature)
//! - [`video`]: Raw video parsing (behind `video` feature)

/// Re-export descriptor types.
pub mod caps {
    pub use rawparse_caps::*;
}

/// Re-export engine types.
pub mod frame {
    pub use rawparse_frame::*;
}

/// Re-export audio types (requires `audio` feature).
#[cfg(feature = "audio")]
pub mod audio {
    pub use rawparse_audio::*;
}

/// Re-export video types (requires `video` feature).
#[cfg(feature = "video")]
pub mod video {
    pub use rawparse_video::*;
}

//! Well-known media type names.
//!
//! The `x-unaligned-raw` variants describe the same sample layout as their
//! `x-raw` counterparts without any alignment guarantee on buffer boundaries.

/// Raw, aligned PCM audio.
pub const AUDIO_RAW: &str = "audio/x-raw";

/// Raw PCM audio whose buffers may split samples.
pub const AUDIO_UNALIGNED_RAW: &str = "audio/x-unaligned-raw";

/// G.711 A-law companded audio.
pub const AUDIO_ALAW: &str = "audio/x-alaw";

/// G.711 mu-law companded audio.
pub const AUDIO_MULAW: &str = "audio/x-mulaw";

/// Raw, aligned video frames.
pub const VIDEO_RAW: &str = "video/x-raw";

/// Raw video whose buffers may split frames.
pub const VIDEO_UNALIGNED_RAW: &str = "video/x-unaligned-raw";

/// Returns true if the media type names one of the audio kinds above.
pub fn is_audio(media_type: &str) -> bool {
    matches!(
        media_type,
        AUDIO_RAW | AUDIO_UNALIGNED_RAW | AUDIO_ALAW | AUDIO_MULAW
    )
}

/// Returns true if the media type names one of the video kinds above.
pub fn is_video(media_type: &str) -> bool {
    matches!(media_type, VIDEO_RAW | VIDEO_UNALIGNED_RAW)
}

/// Maps an unaligned media type onto the aligned type a parser produces.
pub fn aligned(media_type: &str) -> &str {
    match media_type {
        AUDIO_UNALIGNED_RAW => AUDIO_RAW,
        VIDEO_UNALIGNED_RAW => VIDEO_RAW,
        other => other,
    }
}

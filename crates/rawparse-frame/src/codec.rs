use std::num::NonZeroUsize;
use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use rawparse_caps::Caps;

/// How the current configuration lays frames out in the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    /// Bytes per frame in the input, padding included.
    pub frame_size: usize,
    /// Trailing padding bytes per frame that are dropped from the output.
    pub overhead: usize,
    /// Upper bound on frames per emitted batch.
    pub max_frames: Option<NonZeroUsize>,
}

impl FrameLayout {
    /// A layout with no padding and no batch limit.
    pub fn new(frame_size: usize) -> Self {
        Self {
            frame_size,
            overhead: 0,
            max_frames: None,
        }
    }

    /// Payload bytes carried by one frame.
    pub fn payload_size(&self) -> usize {
        self.frame_size.saturating_sub(self.overhead)
    }

    /// Whole frames available in `len` bytes, capped by `max_frames`.
    pub fn count_frames(&self, len: usize) -> usize {
        if self.frame_size == 0 {
            return 0;
        }
        let frames = len / self.frame_size;
        match self.max_frames {
            Some(max) => frames.min(max.get()),
            None => frames,
        }
    }
}

/// A run of whole frames cut from the front of an input buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Frame payloads with per-frame padding removed.
    pub payload: Bytes,
    pub num_frames: usize,
    /// Input bytes removed from the buffer, padding included.
    pub consumed: usize,
}

/// A batch of frames ready to be handed downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBatch {
    pub payload: Bytes,
    pub num_frames: usize,
    /// Frame index of the first frame since stream start.
    pub offset: u64,
    /// Presentation time of the first frame, if the rate is known.
    pub pts: Option<Duration>,
    /// Time covered by the batch, if the rate is known.
    pub duration: Option<Duration>,
}

/// Output of the segmentation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent {
    /// New downstream caps; always precedes the next batch.
    Caps(Caps),
    /// A batch of whole frames.
    Frames(FrameBatch),
}

/// Cut the maximal run of whole frames from the front of `src`.
///
/// Returns `None` if `src` does not hold a complete frame yet; leftover
/// bytes stay in `src` for the next call. A layout with a zero frame size
/// never yields frames.
pub fn split_frames(src: &mut BytesMut, layout: &FrameLayout) -> Option<Segment> {
    let num_frames = layout.count_frames(src.len());
    if num_frames == 0 {
        return None;
    }

    let consumed = num_frames * layout.frame_size;
    let mut chunk = src.split_to(consumed);
    let payload_size = layout.payload_size();

    let payload = if layout.overhead == 0 {
        chunk.freeze()
    } else if num_frames == 1 {
        chunk.truncate(payload_size);
        chunk.freeze()
    } else {
        let mut out = BytesMut::with_capacity(num_frames * payload_size);
        for frame in chunk.chunks_exact(layout.frame_size) {
            out.put_slice(&frame[..payload_size]);
        }
        out.freeze()
    };

    Some(Segment {
        payload,
        num_frames,
        consumed,
    })
}

use std::sync::Arc;

use bytes::{Bytes, BytesMut};

/// Per-batch payload rewrite applied after segmentation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FrameTransform {
    /// Pass the payload through untouched.
    #[default]
    Identity,
    /// Move interleaved channel samples: input slot `i` lands in output
    /// slot `map[i]` of every frame.
    ChannelPermute {
        sample_size: usize,
        map: Arc<[usize]>,
    },
}

impl FrameTransform {
    /// Build a channel permutation, collapsing identity maps to
    /// [`FrameTransform::Identity`].
    pub fn channel_permute(sample_size: usize, map: Vec<usize>) -> Self {
        if sample_size == 0 || map.iter().enumerate().all(|(i, &to)| i == to) {
            return FrameTransform::Identity;
        }
        FrameTransform::ChannelPermute {
            sample_size,
            map: map.into(),
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, FrameTransform::Identity)
    }

    /// The transform that undoes this one.
    pub fn inverse(&self) -> Self {
        match self {
            FrameTransform::Identity => FrameTransform::Identity,
            FrameTransform::ChannelPermute { sample_size, map } => {
                let mut inverse = vec![0; map.len()];
                for (from, &to) in map.iter().enumerate() {
                    inverse[to] = from;
                }
                FrameTransform::ChannelPermute {
                    sample_size: *sample_size,
                    map: inverse.into(),
                }
            }
        }
    }

    /// Rewrite a payload of whole frames.
    ///
    /// A trailing partial frame, which segmentation never produces, is
    /// copied through unchanged.
    pub fn apply(&self, payload: Bytes) -> Bytes {
        match self {
            FrameTransform::Identity => payload,
            FrameTransform::ChannelPermute { sample_size, map } => {
                let sample_size = *sample_size;
                let frame_size = sample_size * map.len();
                let mut out = BytesMut::zeroed(payload.len());

                let whole = payload.len() - payload.len() % frame_size;
                for (src, dst) in payload[..whole]
                    .chunks_exact(frame_size)
                    .zip(out[..whole].chunks_exact_mut(frame_size))
                {
                    for (from, &to) in map.iter().enumerate() {
                        let src_at = from * sample_size;
                        let dst_at = to * sample_size;
                        dst[dst_at..dst_at + sample_size]
                            .copy_from_slice(&src[src_at..src_at + sample_size]);
                    }
                }
                out[whole..].copy_from_slice(&payload[whole..]);
                out.freeze()
            }
        }
    }
}

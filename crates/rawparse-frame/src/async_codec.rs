use std::sync::Arc;

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::warn;

use crate::codec::ParseEvent;
use crate::error::FrameError;
use crate::parse::RawParse;
use crate::parser::RawParser;

/// `tokio_util` decoder over a shared [`RawParse`].
///
/// Use with `FramedRead` to segment any `AsyncRead`. The parse element
/// stays reachable through the `Arc` for property changes and caps events.
pub struct RawParseCodec<P> {
    parse: Arc<RawParse<P>>,
}

impl<P: RawParser> RawParseCodec<P> {
    pub fn new(parse: Arc<RawParse<P>>) -> Self {
        Self { parse }
    }

    pub fn parse(&self) -> &Arc<RawParse<P>> {
        &self.parse
    }
}

impl<P> Clone for RawParseCodec<P> {
    fn clone(&self) -> Self {
        Self {
            parse: Arc::clone(&self.parse),
        }
    }
}

impl<P: RawParser> Decoder for RawParseCodec<P> {
    type Item = ParseEvent;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let event = self.parse.decode(src)?;
        if event.is_none() {
            src.reserve(self.parse.min_frame_size());
        }
        Ok(event)
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(event) = self.decode(buf)? {
            return Ok(Some(event));
        }
        if !buf.is_empty() {
            warn!(
                leftover = buf.len(),
                "end of stream inside a frame, dropping trailing bytes"
            );
            buf.clear();
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;
    use tokio_util::codec::FramedRead;

    use super::*;
    use crate::parse::tests::TestParser;

    #[tokio::test]
    async fn framed_read_yields_caps_and_frames() {
        let parse = Arc::new(RawParse::new(TestParser::new(4, 100)));
        let input: &[u8] = &[9u8; 18];
        let mut framed = FramedRead::new(input, RawParseCodec::new(Arc::clone(&parse)));

        let mut caps = 0;
        let mut frames = 0;
        while let Some(event) = framed.next().await {
            match event.unwrap() {
                ParseEvent::Caps(_) => caps += 1,
                ParseEvent::Frames(batch) => frames += batch.num_frames,
            }
        }

        assert_eq!(caps, 1);
        assert_eq!(frames, 4);
        assert!(parse.src_caps().is_some());
    }
}

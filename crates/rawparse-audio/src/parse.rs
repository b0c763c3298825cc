use std::ops::Deref;

use rawparse_frame::{ConfigError, ConfigKind, RawParse};

use crate::channel::ChannelPosition;
use crate::config::AudioConfig;
use crate::format::{AudioParseFormat, PcmFormat};
use crate::parser::AudioParser;

/// Raw audio parse element.
///
/// Dereferences to the generic [`RawParse`] engine for negotiation and
/// segmentation; adds the audio properties on top. Getters read the
/// properties record.
pub struct AudioParse {
    inner: RawParse<AudioParser>,
}

impl Default for AudioParse {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for AudioParse {
    type Target = RawParse<AudioParser>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl AudioParse {
    pub fn new() -> Self {
        Self {
            inner: RawParse::new(AudioParser::new()),
        }
    }

    pub fn set_format(&self, format: AudioParseFormat) -> Result<bool, ConfigError> {
        self.inner.update_properties(|p| Ok(p.set_format(format)))
    }

    pub fn set_pcm_format(&self, pcm_format: PcmFormat) -> Result<bool, ConfigError> {
        self.inner
            .update_properties(|p| Ok(p.set_pcm_format(pcm_format)))
    }

    pub fn set_sample_rate(&self, sample_rate: u32) -> Result<bool, ConfigError> {
        self.inner
            .update_properties(|p| p.set_sample_rate(sample_rate))
    }

    pub fn set_num_channels(&self, channels: u32) -> Result<bool, ConfigError> {
        self.inner.update_properties(|p| p.set_num_channels(channels))
    }

    pub fn set_interleaved(&self, interleaved: bool) -> Result<bool, ConfigError> {
        self.inner
            .update_properties(|p| Ok(p.set_interleaved(interleaved)))
    }

    /// Explicit positions in stream order; `None` restores the default
    /// layout for the current channel count.
    pub fn set_channel_positions(
        &self,
        positions: Option<&[ChannelPosition]>,
    ) -> Result<bool, ConfigError> {
        self.inner
            .update_properties(|p| p.set_channel_positions(positions))
    }

    pub fn format(&self) -> AudioParseFormat {
        self.properties().format()
    }

    pub fn pcm_format(&self) -> PcmFormat {
        self.properties().pcm_format()
    }

    pub fn sample_rate(&self) -> u32 {
        self.properties().sample_rate()
    }

    pub fn num_channels(&self) -> u32 {
        self.properties().num_channels()
    }

    pub fn interleaved(&self) -> bool {
        self.properties().interleaved()
    }

    pub fn channel_positions(&self) -> Vec<ChannelPosition> {
        self.properties().channel_positions().to_vec()
    }

    /// Snapshot of a record.
    pub fn config(&self, which: ConfigKind) -> AudioConfig {
        self.inner.with_parser(|p| p.config(which).clone())
    }

    fn properties(&self) -> AudioConfig {
        self.config(ConfigKind::Properties)
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use rawparse_caps::Caps;
    use rawparse_frame::{FrameError, ParseEvent, UnitFormat};

    use super::*;
    use crate::channel::ChannelPosition as Pos;

    fn batches(events: Vec<ParseEvent>) -> Vec<rawparse_frame::FrameBatch> {
        events
            .into_iter()
            .filter_map(|event| match event {
                ParseEvent::Frames(batch) => Some(batch),
                ParseEvent::Caps(_) => None,
            })
            .collect()
    }

    #[test]
    fn segments_default_stereo() {
        let parse = AudioParse::new();
        assert_eq!(parse.min_frame_size(), 4);

        let batch = &batches(parse.push(&[0u8; 411]).unwrap())[0];
        assert_eq!(batch.num_frames, 102);
        assert_eq!(batch.payload.len(), 408);
        assert_eq!(parse.pending_len(), 3);

        let batch = &batches(parse.push(&[0u8; 1]).unwrap())[0];
        assert_eq!(batch.num_frames, 1);
        assert_eq!(parse.pending_len(), 0);
    }

    #[test]
    fn announces_property_caps_first() {
        let parse = AudioParse::new();
        parse.set_sample_rate(48_000).unwrap();
        let events = parse.push(&[0u8; 8]).unwrap();
        match &events[0] {
            ParseEvent::Caps(caps) => {
                assert_eq!(caps.get_int("rate"), Some(48_000));
                assert_eq!(caps.get_str("format"), Some("S16LE"));
                assert_eq!(caps.get_bitmask("channel-mask"), Some(0x3));
            }
            other => panic!("expected caps, got {other:?}"),
        }
    }

    #[test]
    fn same_value_does_not_invalidate() {
        let parse = AudioParse::new();
        parse.push(&[]).unwrap();
        assert!(parse.src_caps().is_some());

        assert!(!parse.set_num_channels(2).unwrap());
        assert!(parse.src_caps().is_some());

        assert!(parse.set_num_channels(6).unwrap());
        assert!(parse.src_caps().is_none());
        assert_eq!(parse.min_frame_size(), 12);
    }

    #[test]
    fn property_changes_ignored_while_negotiated() {
        let parse = AudioParse::new();
        parse.set_prefer_negotiated(true);
        let caps: Caps = "audio/x-raw, format=U8, rate=8000, channels=1, layout=interleaved"
            .parse()
            .unwrap();
        parse.set_sink_caps(&caps).unwrap();
        parse.push(&[]).unwrap();

        assert!(parse.set_num_channels(4).unwrap());
        assert!(parse.src_caps().is_some());
        assert_eq!(parse.min_frame_size(), 1);
        assert_eq!(parse.num_channels(), 4);
    }

    #[test]
    fn reorders_interleaved_samples() {
        let parse = AudioParse::new();
        parse.set_pcm_format(PcmFormat::U8).unwrap();
        parse
            .set_channel_positions(Some(&[Pos::FrontRight, Pos::FrontLeft]))
            .unwrap();

        let events = parse.push(b"RLrl").unwrap();
        match &events[0] {
            ParseEvent::Caps(caps) => assert_eq!(caps.get_bitmask("channel-mask"), Some(0x3)),
            other => panic!("expected caps, got {other:?}"),
        }
        assert_eq!(batches(events)[0].payload.as_ref(), b"LRlr");
    }

    #[test]
    fn empty_positions_rejected() {
        let parse = AudioParse::new();
        assert_eq!(
            parse.set_channel_positions(Some(&[])),
            Err(ConfigError::EmptyChannelPositions)
        );
        assert_eq!(parse.channel_positions(), vec![Pos::FrontLeft, Pos::FrontRight]);
    }

    #[test]
    fn timestamps_at_sample_rate() {
        let parse = AudioParse::new();
        parse.set_sample_rate(1000).unwrap();
        parse.push(&[]).unwrap();

        let mut buf = BytesMut::from(&[0u8; 40][..]);
        let Some(ParseEvent::Frames(batch)) = parse.decode(&mut buf).unwrap() else {
            panic!("expected frames");
        };
        assert_eq!(batch.num_frames, 10);
        assert_eq!(batch.duration, Some(std::time::Duration::from_millis(10)));
        assert_eq!(parse.convert(UnitFormat::Bytes, 4000, UnitFormat::Time), Some(1_000_000_000));
    }

    #[test]
    fn restart_requires_new_caps() {
        let parse = AudioParse::new();
        parse.set_prefer_negotiated(true);
        let caps: Caps = "audio/x-mulaw, rate=8000, channels=2".parse().unwrap();
        parse.set_sink_caps(&caps).unwrap();
        assert_eq!(batches(parse.push(&[0u8; 4]).unwrap())[0].num_frames, 2);

        parse.stream_start();
        assert!(matches!(parse.push(&[0u8; 4]), Err(FrameError::NotConfigured)));

        parse.set_sink_caps(&caps).unwrap();
        let batch = &batches(parse.push(&[0u8; 4]).unwrap())[0];
        assert_eq!(batch.offset, 0);
        assert_eq!(parse.alignment(), 1);
    }
}

use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::BytesMut;
use rawparse_caps::Caps;
use tracing::{debug, error, trace};

use crate::codec::{split_frames, FrameBatch, FrameLayout, ParseEvent};
use crate::config::{ConfigKind, UnitFormat, UnitsPerSecond};
use crate::error::{ConfigError, FrameError, Result};
use crate::parser::RawParser;

struct ParseState<P> {
    parser: P,
    prefer_negotiated: bool,
    /// Last announced downstream caps; `None` means a new announcement is due.
    src_caps: Option<Caps>,
    min_frame_size: usize,
    /// Frames emitted since the last restart.
    position: u64,
}

impl<P: RawParser> ParseState<P> {
    fn invalidate_src_caps(&mut self) {
        self.src_caps = None;
    }

    fn refresh_min_frame_size(&mut self) {
        if self.parser.is_config_ready(ConfigKind::Current) {
            self.min_frame_size = self.parser.config_frame_size(ConfigKind::Current).max(1);
        }
    }

    fn select(&mut self) {
        let target = if self.prefer_negotiated && self.parser.is_config_ready(ConfigKind::Negotiated)
        {
            ConfigKind::Negotiated
        } else {
            ConfigKind::Properties
        };
        self.parser.set_current_config(target);
    }
}

/// The generic raw parse element: configuration manager plus segmentation
/// engine around a media-specific [`RawParser`].
///
/// All state sits behind one mutex, so a `RawParse` can be shared between
/// a control thread and the streaming thread through `Arc`.
pub struct RawParse<P> {
    state: Mutex<ParseState<P>>,
    pending: Mutex<BytesMut>,
}

impl<P: RawParser> RawParse<P> {
    /// Wrap a parser. The properties record starts out current.
    pub fn new(mut parser: P) -> Self {
        parser.set_current_config(ConfigKind::Properties);
        let mut state = ParseState {
            parser,
            prefer_negotiated: false,
            src_caps: None,
            min_frame_size: 1,
            position: 0,
        };
        state.refresh_min_frame_size();
        Self {
            state: Mutex::new(state),
            pending: Mutex::new(BytesMut::new()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ParseState<P>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pending(&self) -> MutexGuard<'_, BytesMut> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a read-only query against the parser under the lock.
    pub fn with_parser<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        f(&self.state().parser)
    }

    /// Mutate the properties record under the lock.
    ///
    /// `f` returns whether anything changed. A change while the properties
    /// record is current invalidates the announced caps and refreshes the
    /// minimum frame size.
    pub fn update_properties(
        &self,
        f: impl FnOnce(&mut P) -> std::result::Result<bool, ConfigError>,
    ) -> std::result::Result<bool, ConfigError> {
        let mut state = self.state();
        let changed = f(&mut state.parser)?;
        if changed && state.parser.current_config() == ConfigKind::Properties {
            debug!("properties changed, downstream caps will be re-announced");
            state.invalidate_src_caps();
            state.refresh_min_frame_size();
        }
        Ok(changed)
    }

    /// Select the current record.
    ///
    /// # Panics
    ///
    /// Panics if `which` is [`ConfigKind::Current`].
    pub fn set_current(&self, which: ConfigKind) {
        assert!(
            which != ConfigKind::Current,
            "ConfigKind::Current is an alias and cannot be selected"
        );
        let mut state = self.state();
        state.parser.set_current_config(which);
        state.invalidate_src_caps();
        state.refresh_min_frame_size();
    }

    pub fn current_selector(&self) -> ConfigKind {
        self.state().parser.current_config()
    }

    pub fn is_config_ready(&self, which: ConfigKind) -> bool {
        self.state().parser.is_config_ready(which)
    }

    pub fn config_frame_size(&self, which: ConfigKind) -> usize {
        self.state().parser.config_frame_size(which)
    }

    /// Fill a record from caps without touching the selection.
    pub fn update_from_caps(
        &self,
        which: ConfigKind,
        caps: &Caps,
    ) -> std::result::Result<(), ConfigError> {
        let mut state = self.state();
        state.parser.set_config_from_caps(which, caps)?;
        if which.resolve(state.parser.current_config()) == state.parser.current_config() {
            state.invalidate_src_caps();
            state.refresh_min_frame_size();
        }
        Ok(())
    }

    pub fn caps_from_config(&self, which: ConfigKind) -> std::result::Result<Caps, ConfigError> {
        self.state().parser.caps_from_config(which)
    }

    /// Whether negotiated caps take precedence over properties.
    pub fn prefers_negotiated(&self) -> bool {
        self.state().prefer_negotiated
    }

    /// Switch between negotiated caps and properties.
    pub fn set_prefer_negotiated(&self, prefer: bool) {
        let mut state = self.state();
        if state.prefer_negotiated == prefer {
            return;
        }
        state.prefer_negotiated = prefer;
        state.select();
        debug!(prefer, current = %state.parser.current_config(), "caps source changed");
        state.invalidate_src_caps();
        state.refresh_min_frame_size();
    }

    /// Accept caps from upstream.
    ///
    /// Ignored while properties are preferred. Otherwise the negotiated
    /// record is replaced and made current; on error it keeps its old value.
    pub fn set_sink_caps(&self, caps: &Caps) -> std::result::Result<(), ConfigError> {
        let mut state = self.state();
        if !state.prefer_negotiated {
            debug!(%caps, "ignoring sink caps, properties are in use");
            return Ok(());
        }

        if let Err(err) = state.parser.set_config_from_caps(ConfigKind::Negotiated, caps) {
            error!(%caps, %err, "rejected sink caps");
            return Err(err);
        }
        debug!(%caps, "accepted sink caps");
        state.select();
        state.invalidate_src_caps();
        state.refresh_min_frame_size();
        Ok(())
    }

    /// Caps most recently announced downstream.
    pub fn src_caps(&self) -> Option<Caps> {
        self.state().src_caps.clone()
    }

    /// Force a new caps announcement before the next batch.
    pub fn invalidate_src_caps(&self) {
        self.state().invalidate_src_caps();
    }

    /// Smallest input that can produce output.
    pub fn min_frame_size(&self) -> usize {
        self.state().min_frame_size
    }

    pub fn max_frames_per_buffer(&self) -> Option<std::num::NonZeroUsize> {
        self.state().parser.max_frames_per_buffer(ConfigKind::Current)
    }

    pub fn overhead_size(&self) -> usize {
        self.state().parser.overhead_size(ConfigKind::Current)
    }

    pub fn alignment(&self) -> usize {
        self.state().parser.alignment(ConfigKind::Current)
    }

    pub fn is_unit_supported(&self, format: UnitFormat) -> bool {
        self.state().parser.is_unit_format_supported(format)
    }

    pub fn units_per_second(&self, format: UnitFormat) -> UnitsPerSecond {
        self.state()
            .parser
            .units_per_second(format, ConfigKind::Current)
    }

    /// Convert a stream position between units of the current record.
    ///
    /// Goes through nanoseconds; `None` if either side is unsupported or
    /// the rate is undefined.
    pub fn convert(&self, src: UnitFormat, value: u64, dst: UnitFormat) -> Option<u64> {
        if src == dst {
            return Some(value);
        }
        let state = self.state();
        let rate_of = |format: UnitFormat| -> Option<UnitsPerSecond> {
            if !state.parser.is_unit_format_supported(format) {
                return None;
            }
            let rate = state.parser.units_per_second(format, ConfigKind::Current);
            rate.is_defined().then_some(rate)
        };

        let nanos = match src {
            UnitFormat::Time => value as u128,
            UnitFormat::Percent => return None,
            format => rate_of(format)?.units_to_nanos(value)?,
        };
        match dst {
            UnitFormat::Time => u64::try_from(nanos).ok(),
            UnitFormat::Percent => None,
            format => rate_of(format)?.nanos_to_units(nanos),
        }
    }

    /// Restart the stream: forget negotiated caps, leftover bytes and the
    /// timestamp counter.
    pub fn stream_start(&self) {
        self.pending().clear();

        let mut state = self.state();
        state.parser.reset_negotiated();
        state.position = 0;
        state.invalidate_src_caps();
        state.refresh_min_frame_size();
        debug!(current = %state.parser.current_config(), "stream restarted");
    }

    /// Alias for [`RawParse::stream_start`].
    pub fn reset(&self) {
        self.stream_start();
    }

    /// Decode the next event from a caller-owned buffer.
    ///
    /// Returns caps first after every (re)configuration, then batches of
    /// whole frames. `Ok(None)` means more input is needed; leftover bytes
    /// stay in `src`.
    ///
    /// # Panics
    ///
    /// Panics if the current record is ready but has a zero frame size.
    pub fn decode(&self, src: &mut BytesMut) -> Result<Option<ParseEvent>> {
        let mut state = self.state();
        let which = ConfigKind::Current;
        if !state.parser.is_config_ready(which) {
            return Err(FrameError::NotConfigured);
        }

        let frame_size = state.parser.config_frame_size(which);
        assert!(frame_size > 0, "ready configuration has a zero frame size");

        if state.src_caps.is_none() {
            let caps = state.parser.caps_from_config(which)?;
            debug!(%caps, "announcing downstream caps");
            state.src_caps = Some(caps.clone());
            return Ok(Some(ParseEvent::Caps(caps)));
        }

        let layout = FrameLayout {
            frame_size,
            overhead: state.parser.overhead_size(which),
            max_frames: state.parser.max_frames_per_buffer(which),
        };
        let Some(segment) = split_frames(src, &layout) else {
            return Ok(None);
        };

        let payload = state.parser.transform(which).apply(segment.payload);
        let rate = state.parser.units_per_second(UnitFormat::Default, which);
        let offset = state.position;
        let end = offset + segment.num_frames as u64;
        let pts = rate.units_to_duration(offset);
        let duration = rate
            .units_to_duration(end)
            .zip(pts)
            .map(|(end, start)| end - start);
        state.position = end;

        trace!(
            frames = segment.num_frames,
            consumed = segment.consumed,
            leftover = src.len(),
            offset,
            "emitting batch"
        );
        Ok(Some(ParseEvent::Frames(FrameBatch {
            payload,
            num_frames: segment.num_frames,
            offset,
            pts,
            duration,
        })))
    }

    /// Append a chunk to the internal buffer and drain every event it
    /// completes.
    ///
    /// A call that fails leaves the internal buffer as it found it. If the
    /// configuration breaks after some batches were already cut, those
    /// batches are returned and the error surfaces on the next call.
    pub fn push(&self, chunk: &[u8]) -> Result<Vec<ParseEvent>> {
        let mut pending = self.pending();
        if !self.is_config_ready(ConfigKind::Current) {
            return Err(FrameError::NotConfigured);
        }

        let before = pending.len();
        pending.extend_from_slice(chunk);
        let mut events = Vec::new();
        loop {
            match self.decode(&mut pending) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => return Ok(events),
                Err(err) if events.is_empty() => {
                    pending.truncate(before);
                    return Err(err);
                }
                Err(err) => {
                    debug!(%err, emitted = events.len(), "stopping early, error deferred");
                    return Ok(events);
                }
            }
        }
    }

    /// Bytes buffered by [`RawParse::push`] that do not form a frame yet.
    pub fn pending_len(&self) -> usize {
        self.pending().len()
    }

    /// Drop buffered leftover bytes at end of stream, returning how many
    /// were discarded.
    pub fn finish(&self) -> usize {
        let mut pending = self.pending();
        let dropped = pending.len();
        pending.clear();
        dropped
    }
}

use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tracing::warn;

use crate::codec::ParseEvent;
use crate::error::{FrameError, Result};
use crate::parse::RawParse;
use crate::parser::RawParser;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Default size of each read from the underlying stream.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Configuration for [`FrameReader`].
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Bytes requested per read call; the stream may return fewer.
    pub chunk_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Pulls arbitrary chunks from any `Read` stream and yields parse events.
///
/// Handles partial reads internally; callers only see caps and batches of
/// whole frames.
pub struct FrameReader<'a, T, P> {
    inner: T,
    parse: &'a RawParse<P>,
    buf: BytesMut,
    scratch: Vec<u8>,
    config: ReaderConfig,
    eof: bool,
    dropped: usize,
}

impl<'a, T: Read, P: RawParser> FrameReader<'a, T, P> {
    /// Create a new reader with default configuration.
    pub fn new(inner: T, parse: &'a RawParse<P>) -> Self {
        Self::with_config(inner, parse, ReaderConfig::default())
    }

    /// Create a new reader with explicit configuration.
    pub fn with_config(inner: T, parse: &'a RawParse<P>, config: ReaderConfig) -> Self {
        Self {
            inner,
            parse,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            scratch: Vec::new(),
            config,
            eof: false,
            dropped: 0,
        }
    }

    /// Read the next event (blocking).
    ///
    /// Returns `Ok(None)` at end of stream. Trailing bytes that do not
    /// form a whole frame are dropped with a warning.
    pub fn read_event(&mut self) -> Result<Option<ParseEvent>> {
        loop {
            if let Some(event) = self.parse.decode(&mut self.buf)? {
                return Ok(Some(event));
            }
            if self.eof {
                return Ok(None);
            }

            // Allocated once, on the first read.
            let chunk_size = self.config.chunk_size.max(1);
            if self.scratch.len() != chunk_size {
                self.scratch.resize(chunk_size, 0);
            }
            let read = match self.inner.read(&mut self.scratch) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                self.eof = true;
                if !self.buf.is_empty() {
                    warn!(
                        leftover = self.buf.len(),
                        "end of stream inside a frame, dropping trailing bytes"
                    );
                    self.dropped += self.buf.len();
                    self.buf.clear();
                }
                return Ok(None);
            }

            self.buf.extend_from_slice(&self.scratch[..read]);
        }
    }

    /// Trailing bytes dropped at end of stream.
    pub fn dropped_bytes(&self) -> usize {
        self.dropped
    }

    /// Bytes buffered but not yet emitted.
    pub fn buffered_bytes(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current reader configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}

impl<T: Read, P: RawParser> Iterator for FrameReader<'_, T, P> {
    type Item = Result<ParseEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_event().transpose()
    }
}

use rawparse_caps::CapsError;

/// Errors raised while converting or mutating a configuration record.
///
/// None of these leave a record partially updated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The descriptor names a media type this parser cannot handle.
    #[error("unsupported media type '{0}'")]
    UnsupportedMediaType(String),

    /// A mandatory descriptor field is absent.
    #[error("missing field '{field}' in {media_type} descriptor")]
    MissingField {
        media_type: String,
        field: &'static str,
    },

    /// A descriptor field is present but unusable.
    #[error("invalid value for field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// The channel mask does not map onto the channel count.
    #[error("channel mask {mask:#x} does not describe {channels} channels")]
    InvalidChannelMask { mask: u64, channels: u32 },

    /// Unknown, duplicate or mixed channel positions.
    #[error("invalid channel positions: {0}")]
    InvalidChannelPositions(String),

    /// An explicit channel position list was given with no entries.
    #[error("channel position list is empty")]
    EmptyChannelPositions,

    /// More channels than a position mask can describe.
    #[error("too many channels ({count}, max {max})")]
    TooManyChannels { count: u32, max: u32 },

    /// The record has no valid frame size yet.
    #[error("configuration is not fully populated")]
    NotPopulated,

    /// A property setter was given an out-of-range value.
    #[error("invalid value for property '{name}': {reason}")]
    InvalidProperty { name: &'static str, reason: String },

    /// The descriptor text could not be parsed.
    #[error("descriptor error: {0}")]
    Caps(#[from] CapsError),
}

/// Errors that can occur while segmenting a stream.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The current configuration is not ready; no input was consumed.
    #[error("parser is not configured")]
    NotConfigured,

    /// The current configuration could not be turned into output caps.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An I/O error occurred while reading input.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;

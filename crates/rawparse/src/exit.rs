use std::fmt;
use std::io;

use rawparse_caps::CapsError;
use rawparse_frame::{ConfigError, FrameError};

// Exit codes follow the sysexits-style scheme used across 3leaps tools.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => FAILURE,
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn caps_error(context: &str, err: CapsError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

/// Property errors come from flags; everything else from a descriptor.
pub fn config_error(context: &str, err: ConfigError) -> CliError {
    let code = match err {
        ConfigError::InvalidProperty { .. }
        | ConfigError::EmptyChannelPositions
        | ConfigError::TooManyChannels { .. } => USAGE,
        _ => DATA_INVALID,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::Config(source) => config_error(context, source),
        FrameError::NotConfigured => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

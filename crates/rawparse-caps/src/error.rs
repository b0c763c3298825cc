/// Errors that can occur while building or parsing capability descriptors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapsError {
    /// The descriptor text holds no media type.
    #[error("empty capability descriptor")]
    Empty,

    /// The media type is not of the form `kind/subtype`.
    #[error("invalid media type '{0}'")]
    InvalidMediaType(String),

    /// A field is not of the form `name=value`.
    #[error("malformed field '{0}'")]
    MalformedField(String),

    /// A field carries a type annotation this crate does not know.
    #[error("unknown type '{ty}' for field '{field}'")]
    UnknownType { field: String, ty: String },

    /// A field value could not be parsed as its annotated type.
    #[error("invalid value '{value}' for field '{field}'")]
    InvalidValue { field: String, value: String },

    /// A quoted string is missing its closing quote.
    #[error("unterminated string in field '{0}'")]
    UnterminatedString(String),
}

pub type Result<T> = std::result::Result<T, CapsError>;

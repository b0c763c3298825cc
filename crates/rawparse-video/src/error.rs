/// A pixel format name that is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown video format '{0}'")]
pub struct UnknownFormat(pub String);

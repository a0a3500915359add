use thiserror::Error;

/// Top-level error type for the engine surface.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Definition error: {0}")]
    Parse(#[from] ParseError),

    #[error("Transform rejected: {0}")]
    Transform(#[from] TransformError),

    #[error("Invalid or released handle: {0}")]
    InvalidHandle(u64),
}

/// Failure while parsing or resolving a projection definition string.
///
/// No projection object exists after any of these; a definition either
/// resolves completely or not at all.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed token {0:?}: parameters take the form +key or +key=value")]
    Token(String),

    #[error("Unknown projection {0:?}")]
    UnknownProjection(String),

    #[error("Missing parameter: {0}")]
    Missing(&'static str),

    #[error("Invalid parameter {0}")]
    InvalidParameter(String),
}

/// Whole-call rejection of a batch transform.
///
/// These are raised before any coordinate is read or written, so the
/// caller's buffer is untouched.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("dimension {0} out of range 1..=100")]
    BadDimension(usize),

    #[error("stride {stride} shorter than dimension {dimension}")]
    BadStride { stride: usize, dimension: usize },

    #[error("buffer of {len} values too short for offset {offset} plus {needed} tuple values")]
    BufferOverrun { needed: usize, offset: usize, len: usize },

    #[error("geocentric coordinates require dimension >= 3")]
    GeocentricDimension,
}

/// Per-tuple failure inside a batch transform.
///
/// A faulting tuple is overwritten with the infinity sentinel and the
/// batch keeps going; the first fault of a batch is also recorded in the
/// owning handle's error slot.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainFault {
    #[error("latitude or longitude exceeded limits")]
    LimitsExceeded,

    #[error("point outside of projection domain")]
    OutsideDomain,
}

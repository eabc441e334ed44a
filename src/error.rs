use thiserror::Error;

/// Top-level error type for the planscope engine.
#[derive(Debug, Error)]
pub enum PlanscopeError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to geometric computations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("need at least 3 points, found {found}")]
    InsufficientPoints { found: usize },

    #[error("insufficient geometry: {0}")]
    InsufficientGeometry(String),

    #[error("zero-length segment at ({x}, {y})")]
    ZeroLengthSegment { x: f64, y: f64 },

    #[error("non-finite coordinate")]
    NonFinite,
}

/// Errors raised while reading drawing input.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("drawing must be a JSON array of objects")]
    NotAnArray,

    #[error("object {index} is malformed: {reason}")]
    MalformedObject { index: usize, reason: String },
}

/// Errors raised by a rule check. Converted to inconclusive results by the
/// registry, never propagated past it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("context value `{key}` is not a {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    #[error("context value `{key}` = {value} is not a valid measurement")]
    InvalidValue { key: String, value: f64 },

    #[error("rule has no threshold for `{0}`")]
    MissingThreshold(String),
}

/// Errors related to engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Convenience type alias for results using [`PlanscopeError`].
pub type Result<T> = std::result::Result<T, PlanscopeError>;

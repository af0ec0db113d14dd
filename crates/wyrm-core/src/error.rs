use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Outcome of trying to switch the head driver onto the orientation sensor.
/// Every variant leaves the previous driver mode in place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrientationError {
    #[error("motion sensor access was denied")]
    Denied,

    #[error("motion sensor request failed: {0}")]
    Failed(String),

    #[error("a motion sensor request is already pending")]
    AlreadyPending,

    #[error("motion sensors are not used by this profile")]
    Unavailable,
}

use std::fmt::{Display, Formatter};

/// Error type for loading and validating loop configuration.
///
/// Scheduling itself never fails; only the configuration surface does.
#[derive(Debug)]
pub enum LoopError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    InvalidSettings(String),
}

impl Display for LoopError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {}", err),
            Self::Parse(err) => write!(f, "settings parse error: {}", err),
            Self::InvalidSettings(err) => write!(f, "invalid settings: {}", err),
        }
    }
}

impl std::error::Error for LoopError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::InvalidSettings(_) => None,
        }
    }
}

impl From<std::io::Error> for LoopError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for LoopError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

use std::fmt;

/// Errors raised at the crate's API boundaries.
///
/// Simulation steps themselves never fail; only construction of tones,
/// geometry and configuration is validated.
#[derive(Debug)]
pub enum ArcadeError {
    InvalidTone { field: &'static str, value: f64 },
    InvalidChannels { channels: u16 },
    InvalidGeometry { width: f32, height: f32 },
    InvalidGrid { width: u32, height: u32 },
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ArcadeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTone { field, value } => {
                write!(f, "invalid tone parameter: {field} = {value}")
            }
            Self::InvalidChannels { channels } => {
                write!(f, "invalid channel count: {channels} (need at least 1)")
            }
            Self::InvalidGeometry { width, height } => {
                write!(f, "invalid rectangle size: {width}x{height}")
            }
            Self::InvalidGrid { width, height } => {
                write!(f, "invalid grid size: {width}x{height}")
            }
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl std::error::Error for ArcadeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ArcadeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ArcadeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

pub type Result<T> = std::result::Result<T, ArcadeError>;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DrillError>;

#[derive(Debug, Error)]
pub enum DrillError {
    #[error("invalid {name} ({value}): {reason}")]
    InvalidArgument {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    #[error("cannot {action} while in {state} state")]
    InvalidState {
        action: &'static str,
        state: crate::practice::GameState,
    },

    #[error("the current question has already been answered")]
    AlreadyAnswered,

    #[error("unknown target label: {0}")]
    UnknownTarget(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DrillError {
    pub(crate) fn invalid(name: &'static str, value: impl ToString, reason: &'static str) -> Self {
        DrillError::InvalidArgument {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

use thiserror::Error;

/// Errors surfaced by a persistence gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to encode or decode stored data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("persistence unavailable: {0}")]
    Unavailable(String),
}

/// Form problems caught before anything is sent to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("workout name is required")]
    MissingName,

    #[error("estimated duration is required")]
    MissingDuration,
}

#[derive(Debug, Error)]
pub enum GymError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("please log in first")]
    NotLoggedIn,

    #[error("no workout in progress")]
    NoActiveSession,

    #[error("exercise catalog unavailable: {0}")]
    Catalog(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T, E = GymError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_user_facing() {
        let err: GymError = ValidationError::MissingName.into();
        assert_eq!(err.to_string(), "workout name is required");
    }

    #[test]
    fn not_found_names_the_kind() {
        let err = GatewayError::NotFound {
            kind: "template",
            id: "abc".into(),
        };
        assert_eq!(err.to_string(), "template not found: abc");
    }
}

use thiserror::Error;

/// Kind of persisted entity an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Application,
    Server,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Application => f.write_str("application"),
            Self::Server => f.write_str("server"),
        }
    }
}

/// Shutdown manager error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid field '{field}': {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Invalid format: {0}")]
    Format(String),

    #[error("Upload refused: {0}")]
    PayloadTooLarge(String),

    #[error("Not found: {entity} {id}")]
    NotFound { entity: EntityKind, id: i64 },

    #[error("Database error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Row {row}: {source} (batch rolled back, no rows persisted)")]
    BatchAborted {
        row: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn missing(field: &'static str) -> Self {
        Self::validation(field, "required field is missing")
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    pub fn application_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: EntityKind::Application,
            id,
        }
    }

    /// Attributes an error to a 1-based row of a batch
    pub fn at_row(self, row: usize) -> Self {
        match self {
            already @ Self::BatchAborted { .. } => already,
            other => Self::BatchAborted {
                row,
                source: Box::new(other),
            },
        }
    }

    /// The underlying error with any batch attribution removed
    pub fn root(&self) -> &Error {
        match self {
            Self::BatchAborted { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_attribution_is_applied_once() {
        let error = Error::missing("owner").at_row(4).at_row(9);
        match &error {
            Error::BatchAborted { row, .. } => assert_eq!(*row, 4),
            other => panic!("expected batch error, got {other:?}"),
        }
        assert!(matches!(
            error.root(),
            Error::Validation { field: "owner", .. }
        ));
    }

    #[test]
    fn batch_message_confirms_rollback() {
        let message = Error::format("app_id 'abc' is not an integer")
            .at_row(2)
            .to_string();
        assert!(message.starts_with("Row 2: Invalid format"));
        assert!(message.contains("rolled back"));
    }

    #[test]
    fn not_found_names_the_entity() {
        assert_eq!(
            Error::application_not_found(42).to_string(),
            "Not found: application 42"
        );
    }
}

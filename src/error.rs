use thiserror::Error;
use tonic::Status;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid id format: {0}")]
    InvalidIdentifier(String),
    #[error("not found")]
    NotFound,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("document store error: {0}")]
    DocumentStore(#[from] mongodb::error::Error),
    #[error("persistence error: {0}")]
    Persistence(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl From<AppError> for Status {
    fn from(err: AppError) -> Self {
        match err {
            AppError::InvalidIdentifier(id) => {
                tracing::debug!(id = %id, "Invalid identifier");
                Self::invalid_argument(format!("invalid id format: {id}"))
            }
            AppError::NotFound => {
                tracing::debug!("User not found");
                Self::not_found("user not found")
            }
            AppError::MissingField(field) => {
                tracing::debug!(field, "Missing required field");
                Self::invalid_argument(format!("{field} is required"))
            }
            AppError::Conflict(msg) => {
                tracing::debug!(message = %msg, "Conflict");
                Self::already_exists(msg)
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                Self::internal(format!("database error: {e}"))
            }
            AppError::DocumentStore(e) => {
                tracing::error!(error = %e, "Document store error");
                Self::internal(format!("document store error: {e}"))
            }
            AppError::Persistence(msg) => {
                tracing::error!(message = %msg, "Persistence error");
                Self::internal(format!("persistence error: {msg}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn test_client_errors_map_to_client_codes() {
        let status = Status::from(AppError::InvalidIdentifier("nope".into()));
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "invalid id format: nope");

        let status = Status::from(AppError::MissingField("email"));
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "email is required");

        let status = Status::from(AppError::NotFound);
        assert_eq!(status.code(), Code::NotFound);
        assert_eq!(status.message(), "user not found");
    }

    #[test]
    fn test_store_errors_map_to_server_codes() {
        let status = Status::from(AppError::Conflict("username already exists".into()));
        assert_eq!(status.code(), Code::AlreadyExists);

        let status = Status::from(AppError::Persistence("connection reset".into()));
        assert_eq!(status.code(), Code::Internal);
        assert!(status.message().contains("connection reset"));

        let status = Status::from(AppError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(status.code(), Code::Internal);
    }
}

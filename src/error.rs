//! Error types for ToolShare server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes returned in every error body.
/// Clients discriminate failures by this code, never by message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchData = 4,
    Duplicate = 5,
    BadValue = 6,
    OwnItemRequest = 7,
    AlreadyRequested = 8,
    AlreadyBorrowed = 9,
    ItemCheckedOut = 10,
    RequestNotPending = 11,
    RequestNotApproved = 12,
    AlreadyReturned = 13,
    ItemHasActiveRequests = 14,
    UploadTooLarge = 15,
    UnsupportedFileType = 16,
}

/// Lifecycle violations of the borrow-request state machine.
///
/// Each variant carries its own [`ErrorCode`] so that every rule the server
/// enforces is distinguishable on the wire.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LendingViolation {
    #[error("You cannot request your own item")]
    OwnItemRequest,

    #[error("You already have a pending request for this item")]
    AlreadyRequested,

    #[error("You currently have this item checked out")]
    AlreadyBorrowed,

    #[error("Item is currently checked out")]
    ItemCheckedOut,

    #[error("Request is no longer pending")]
    RequestNotPending,

    #[error("Request is not an active checkout")]
    RequestNotApproved,

    #[error("Item has already been returned")]
    AlreadyReturned,

    #[error("Item has active requests")]
    ItemHasActiveRequests,
}

impl LendingViolation {
    fn code(&self) -> ErrorCode {
        match self {
            LendingViolation::OwnItemRequest => ErrorCode::OwnItemRequest,
            LendingViolation::AlreadyRequested => ErrorCode::AlreadyRequested,
            LendingViolation::AlreadyBorrowed => ErrorCode::AlreadyBorrowed,
            LendingViolation::ItemCheckedOut => ErrorCode::ItemCheckedOut,
            LendingViolation::RequestNotPending => ErrorCode::RequestNotPending,
            LendingViolation::RequestNotApproved => ErrorCode::RequestNotApproved,
            LendingViolation::AlreadyReturned => ErrorCode::AlreadyReturned,
            LendingViolation::ItemHasActiveRequests => ErrorCode::ItemHasActiveRequests,
        }
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Lending(#[from] LendingViolation),

    #[error("Upload exceeds the maximum size of {0} bytes")]
    UploadTooLarge(usize),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchData, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone())
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
            AppError::Lending(violation) => {
                (StatusCode::CONFLICT, violation.code(), violation.to_string())
            }
            AppError::UploadTooLarge(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::UploadTooLarge, self.to_string())
            }
            AppError::UnsupportedFileType(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::UnsupportedFileType, self.to_string())
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lending_violations_have_distinct_codes() {
        let violations = [
            LendingViolation::OwnItemRequest,
            LendingViolation::AlreadyRequested,
            LendingViolation::AlreadyBorrowed,
            LendingViolation::ItemCheckedOut,
            LendingViolation::RequestNotPending,
            LendingViolation::RequestNotApproved,
            LendingViolation::AlreadyReturned,
            LendingViolation::ItemHasActiveRequests,
        ];
        let mut codes: Vec<u32> = violations.iter().map(|v| v.code() as u32).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), violations.len());
    }

    #[test]
    fn pending_and_approved_duplicates_are_distinguishable() {
        assert_ne!(
            LendingViolation::AlreadyRequested.code(),
            LendingViolation::AlreadyBorrowed.code()
        );
    }
}

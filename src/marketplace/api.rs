//! Uniform response envelope for the marketplace operation surface.
//!
//! Transports serialize every operation result as
//! `{success, data | error{code, message}}`. The wire code for a failure
//! depends on both the error class and the operation that produced it:
//! access and not-found classes map uniformly, everything else maps to the
//! operation's failure code.

use super::services::{ErrorClass, MarketplaceError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire error codes returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Authentication required.
    Unauthorized,
    /// Insufficient permissions.
    Forbidden,
    /// The addressed task does not exist.
    TaskNotFound,
    /// An application operation failed.
    ApplicationFailed,
    /// Task creation failed.
    CreateFailed,
    /// Task publication or cancellation failed.
    PublishFailed,
    /// A read operation failed.
    FetchFailed,
    /// Work submission failed.
    SubmissionFailed,
    /// Submission review failed.
    ReviewFailed,
}

impl ErrorCode {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::TaskNotFound => "TASK_NOT_FOUND",
            Self::ApplicationFailed => "APPLICATION_FAILED",
            Self::CreateFailed => "CREATE_FAILED",
            Self::PublishFailed => "PUBLISH_FAILED",
            Self::FetchFailed => "FETCH_FAILED",
            Self::SubmissionFailed => "SUBMISSION_FAILED",
            Self::ReviewFailed => "REVIEW_FAILED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical operation a failure is reported for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Creating a task.
    CreateTask,
    /// Publishing or cancelling a task.
    PublishTask,
    /// Listing or fetching tasks, applications, or submissions.
    Fetch,
    /// Applying to a task or deciding an application.
    Apply,
    /// Submitting work.
    SubmitWork,
    /// Reviewing a submission.
    ReviewSubmission,
}

impl Operation {
    /// Returns the fallback failure code for this operation.
    #[must_use]
    pub const fn failure_code(self) -> ErrorCode {
        match self {
            Self::CreateTask => ErrorCode::CreateFailed,
            Self::PublishTask => ErrorCode::PublishFailed,
            Self::Fetch => ErrorCode::FetchFailed,
            Self::Apply => ErrorCode::ApplicationFailed,
            Self::SubmitWork => ErrorCode::SubmissionFailed,
            Self::ReviewSubmission => ErrorCode::ReviewFailed,
        }
    }
}

/// Wire error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

impl ErrorBody {
    /// Maps a service error to its wire representation for `operation`.
    #[must_use]
    pub fn from_error(operation: Operation, error: &MarketplaceError) -> Self {
        let code = match error.class() {
            ErrorClass::AuthenticationRequired => ErrorCode::Unauthorized,
            ErrorClass::AuthorizationDenied => ErrorCode::Forbidden,
            ErrorClass::EntityNotFound => match error {
                MarketplaceError::TaskNotFound(_) => ErrorCode::TaskNotFound,
                _ => operation.failure_code(),
            },
            ErrorClass::PreconditionFailed
            | ErrorClass::ValidationFailed
            | ErrorClass::StorageTimeout
            | ErrorClass::StorageFailure => operation.failure_code(),
        };
        Self {
            code,
            message: error.to_string(),
        }
    }
}

/// Uniform response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Payload, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error body, present on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T> ApiResponse<T> {
    /// Wraps a successful payload.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Wraps a failure for `operation`.
    #[must_use]
    pub fn failure(operation: Operation, error: &MarketplaceError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody::from_error(operation, error)),
        }
    }
}

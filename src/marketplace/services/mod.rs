//! Application services for the task marketplace.
//!
//! Services orchestrate domain aggregates over the repository port. Every
//! persistence call is bounded by the configured [`StoragePolicy`] timeout,
//! and every failure is classified into exactly one [`ErrorClass`].

mod applications;
mod review;
mod task_lifecycle;

pub use applications::{ApplicationService, ApplyRequest};
pub use review::{SubmissionReviewService, SubmitWorkRequest};
pub use task_lifecycle::{CreateTaskRequest, TaskLifecycleService};

use crate::marketplace::domain::{
    AccessError, ApplicationId, ApplicationStatus, DomainError, StudentId, TaskId, TaskStatus,
};
use crate::marketplace::ports::{RepositoryError, RepositoryResult};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Result type for marketplace service operations.
pub type MarketplaceResult<T> = Result<T, MarketplaceError>;

/// Bounds applied to persistence gateway calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoragePolicy {
    call_timeout: Duration,
}

impl StoragePolicy {
    /// Default bound on a single persistence call.
    pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a policy with the given per-call timeout.
    #[must_use]
    pub const fn new(call_timeout: Duration) -> Self {
        Self { call_timeout }
    }

    /// Returns the per-call timeout.
    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        self.call_timeout
    }
}

impl Default for StoragePolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CALL_TIMEOUT)
    }
}

/// Classification of a service failure, one class per error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// No credentials were presented.
    AuthenticationRequired,
    /// The caller's claims do not permit the operation.
    AuthorizationDenied,
    /// The addressed entity does not exist.
    EntityNotFound,
    /// The entity exists but is not in a state permitting the operation.
    PreconditionFailed,
    /// A field constraint was violated.
    ValidationFailed,
    /// A persistence call exceeded its bound.
    StorageTimeout,
    /// The persistence gateway failed.
    StorageFailure,
}

/// Service-level errors for marketplace operations.
#[derive(Debug, Error)]
pub enum MarketplaceError {
    /// Domain validation or transition guard failed.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Access predicate failed.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The application was not found.
    #[error("application not found: {0}")]
    ApplicationNotFound(ApplicationId),

    /// No submission exists for the task.
    #[error("no submission recorded for task {0}")]
    SubmissionNotFound(TaskId),

    /// The task is not accepting applications.
    #[error("task {task_id} is not open for applications (status {status})")]
    TaskNotOpen {
        /// Task that was applied to.
        task_id: TaskId,
        /// Status the task currently holds.
        status: TaskStatus,
    },

    /// The student already applied to the task.
    #[error("student {student_id} already applied to task {task_id}")]
    DuplicateApplication {
        /// Task the duplicate targets.
        task_id: TaskId,
        /// Student who already applied.
        student_id: StudentId,
    },

    /// Another application for the task is already accepted.
    #[error("task {0} already has an accepted application")]
    AcceptedApplicationExists(TaskId),

    /// The task already carries a submission.
    #[error("task {0} already has a submission")]
    SubmissionExists(TaskId),

    /// The caller does not hold the accepted application for the task.
    #[error("student {student_id} does not hold the accepted application for task {task_id}")]
    MissingAcceptedApplication {
        /// Task work was submitted for.
        task_id: TaskId,
        /// Student who attempted the submission.
        student_id: StudentId,
    },

    /// The task changed concurrently between read and write.
    #[error("task {task_id} changed concurrently (expected {expected}, found {actual})")]
    TaskStateChanged {
        /// Task whose write was rejected.
        task_id: TaskId,
        /// Status the service read.
        expected: TaskStatus,
        /// Status the store held at write time.
        actual: TaskStatus,
    },

    /// The application changed concurrently between read and write.
    #[error(
        "application {application_id} changed concurrently (expected {expected}, found {actual})"
    )]
    ApplicationStateChanged {
        /// Application whose write was rejected.
        application_id: ApplicationId,
        /// Status the service read.
        expected: ApplicationStatus,
        /// Status the store held at write time.
        actual: ApplicationStatus,
    },

    /// A persistence call exceeded the configured bound.
    #[error("storage timed out during {operation}")]
    StorageTimeout {
        /// Port method that timed out.
        operation: &'static str,
    },

    /// The persistence gateway failed.
    #[error(transparent)]
    Storage(RepositoryError),
}

impl MarketplaceError {
    /// Classifies this error into the failure taxonomy.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Domain(err) => {
                if err.is_transition() {
                    ErrorClass::PreconditionFailed
                } else {
                    ErrorClass::ValidationFailed
                }
            }
            Self::Access(err) => {
                if err.is_authentication() {
                    ErrorClass::AuthenticationRequired
                } else {
                    ErrorClass::AuthorizationDenied
                }
            }
            Self::TaskNotFound(_)
            | Self::ApplicationNotFound(_)
            | Self::SubmissionNotFound(_) => ErrorClass::EntityNotFound,
            Self::TaskNotOpen { .. }
            | Self::DuplicateApplication { .. }
            | Self::AcceptedApplicationExists(_)
            | Self::SubmissionExists(_)
            | Self::MissingAcceptedApplication { .. }
            | Self::TaskStateChanged { .. }
            | Self::ApplicationStateChanged { .. } => ErrorClass::PreconditionFailed,
            Self::StorageTimeout { .. } => ErrorClass::StorageTimeout,
            Self::Storage(_) => ErrorClass::StorageFailure,
        }
    }
}

impl From<RepositoryError> for MarketplaceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::TaskNotFound(task_id) => Self::TaskNotFound(task_id),
            RepositoryError::ApplicationNotFound(id) => Self::ApplicationNotFound(id),
            RepositoryError::SubmissionNotFound(task_id) => Self::SubmissionNotFound(task_id),
            RepositoryError::DuplicateApplication {
                task_id,
                student_id,
            } => Self::DuplicateApplication {
                task_id,
                student_id,
            },
            RepositoryError::AcceptedApplicationExists(task_id) => {
                Self::AcceptedApplicationExists(task_id)
            }
            RepositoryError::DuplicateSubmission(task_id) => Self::SubmissionExists(task_id),
            RepositoryError::TaskStatusConflict {
                task_id,
                expected,
                actual,
            } => Self::TaskStateChanged {
                task_id,
                expected,
                actual,
            },
            RepositoryError::ApplicationStatusConflict {
                application_id,
                expected,
                actual,
            } => Self::ApplicationStateChanged {
                application_id,
                expected,
                actual,
            },
            other @ (RepositoryError::DuplicateTask(_) | RepositoryError::Persistence(_)) => {
                Self::Storage(other)
            }
        }
    }
}

/// Awaits a repository call under the policy's timeout.
pub(crate) async fn with_storage_timeout<T>(
    policy: StoragePolicy,
    operation: &'static str,
    call: impl Future<Output = RepositoryResult<T>> + Send,
) -> MarketplaceResult<T> {
    match tokio::time::timeout(policy.call_timeout(), call).await {
        Ok(result) => result.map_err(MarketplaceError::from),
        Err(_) => Err(MarketplaceError::StorageTimeout { operation }),
    }
}

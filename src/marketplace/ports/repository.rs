//! Repository port for marketplace persistence.
//!
//! The repository is the only shared mutable resource in the system, so it
//! is also the only transaction boundary: every method is one atomic unit
//! against the store. Status-carrying updates take the status the caller
//! read, and the store only applies the write when the persisted status
//! still matches; a mismatch is reported as a conflict rather than applied.

use crate::marketplace::domain::{
    ApplicationId, ApplicationStatus, OrganizationId, PageRequest, StudentId, Task,
    TaskApplication, TaskFilter, TaskId, TaskPage, TaskStatus, TaskSubmission,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Marketplace persistence contract.
///
/// Implementations must make each method atomic: concurrent callers may
/// interleave between calls but never observe a half-applied call.
#[async_trait]
pub trait MarketplaceRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store_task(&self, task: &Task) -> RepositoryResult<()>;

    /// Persists changes to an existing task, guarded by the status the
    /// caller read.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::TaskNotFound`] when the task does not
    /// exist, or [`RepositoryError::TaskStatusConflict`] when the persisted
    /// status no longer equals `expected`.
    async fn update_task(&self, task: &Task, expected: TaskStatus) -> RepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_task_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>>;

    /// Returns one page of open tasks matching `filter`, newest publication
    /// first.
    async fn list_open_tasks(
        &self,
        filter: &TaskFilter,
        page: &PageRequest,
    ) -> RepositoryResult<TaskPage>;

    /// Returns all tasks posted by `organization_id`, newest first.
    async fn list_tasks_for_organization(
        &self,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Vec<Task>>;

    /// Stores a new application.
    ///
    /// The unique (task, student) pair is enforced here, atomically with
    /// the insert; callers must not rely on a prior existence check.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::DuplicateApplication`] when the student
    /// already applied to the task.
    async fn store_application(&self, application: &TaskApplication) -> RepositoryResult<()>;

    /// Finds an application by identifier.
    ///
    /// Returns `None` when the application does not exist.
    async fn find_application_by_id(
        &self,
        id: ApplicationId,
    ) -> RepositoryResult<Option<TaskApplication>>;

    /// Finds the application a student lodged for a task, if any.
    async fn find_application_for_student(
        &self,
        task_id: TaskId,
        student_id: StudentId,
    ) -> RepositoryResult<Option<TaskApplication>>;

    /// Returns all applications for a task, newest first.
    async fn list_applications_for_task(
        &self,
        task_id: TaskId,
    ) -> RepositoryResult<Vec<TaskApplication>>;

    /// Returns all applications lodged by a student, newest first.
    async fn list_applications_for_student(
        &self,
        student_id: StudentId,
    ) -> RepositoryResult<Vec<TaskApplication>>;

    /// Persists a decided application (rejection or withdrawal), guarded by
    /// the status the caller read.
    ///
    /// Acceptance must go through [`Self::record_acceptance`] so the task
    /// transition is part of the same atomic unit.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::ApplicationNotFound`] or
    /// [`RepositoryError::ApplicationStatusConflict`].
    async fn update_application(
        &self,
        application: &TaskApplication,
        expected: ApplicationStatus,
    ) -> RepositoryResult<()>;

    /// Persists an acceptance decision: the application becomes accepted
    /// and its parent task moves to in-progress, atomically.
    ///
    /// The write only applies while the persisted application is still
    /// pending, the persisted task still open, and no other application for
    /// the task is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::ApplicationNotFound`],
    /// [`RepositoryError::TaskNotFound`],
    /// [`RepositoryError::AcceptedApplicationExists`],
    /// [`RepositoryError::ApplicationStatusConflict`], or
    /// [`RepositoryError::TaskStatusConflict`].
    async fn record_acceptance(
        &self,
        application: &TaskApplication,
        task: &Task,
    ) -> RepositoryResult<()>;

    /// Persists a work submission and its task's move to submitted,
    /// atomically.
    ///
    /// The write only applies while the persisted task is still in
    /// progress and carries no submission yet.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::TaskNotFound`],
    /// [`RepositoryError::DuplicateSubmission`], or
    /// [`RepositoryError::TaskStatusConflict`].
    async fn record_submission(
        &self,
        submission: &TaskSubmission,
        task: &Task,
    ) -> RepositoryResult<()>;

    /// Finds the submission for a task, if one was recorded.
    async fn find_submission_for_task(
        &self,
        task_id: TaskId,
    ) -> RepositoryResult<Option<TaskSubmission>>;

    /// Persists a submission approval and its task's completion,
    /// atomically.
    ///
    /// The write only applies while the persisted task is still submitted.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::TaskNotFound`],
    /// [`RepositoryError::SubmissionNotFound`], or
    /// [`RepositoryError::TaskStatusConflict`].
    async fn record_approval(
        &self,
        submission: &TaskSubmission,
        task: &Task,
    ) -> RepositoryResult<()>;
}

/// Errors returned by marketplace repository implementations.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The application was not found.
    #[error("application not found: {0}")]
    ApplicationNotFound(ApplicationId),

    /// No submission exists for the task.
    #[error("no submission recorded for task {0}")]
    SubmissionNotFound(TaskId),

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
    DuplicateSubmission(TaskId),

    /// The persisted task status no longer matches the caller's read.
    #[error("task {task_id} status is {actual}, expected {expected}")]
    TaskStatusConflict {
        /// Task whose write was rejected.
        task_id: TaskId,
        /// Status the caller read.
        expected: TaskStatus,
        /// Status the store currently holds.
        actual: TaskStatus,
    },

    /// The persisted application status no longer matches the caller's
    /// read.
    #[error("application {application_id} status is {actual}, expected {expected}")]
    ApplicationStatusConflict {
        /// Application whose write was rejected.
        application_id: ApplicationId,
        /// Status the caller read.
        expected: ApplicationStatus,
        /// Status the store currently holds.
        actual: ApplicationStatus,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<diesel::result::Error> for RepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        // Constraint violations that adapters can attribute to a specific
        // record are mapped before reaching this blanket conversion; the
        // rest surface as persistence failures.
        Self::persistence(err)
    }
}

//! Error types for marketplace domain validation and state transitions.

use super::application::ApplicationStatus;
use super::ids::{ApplicationId, SubmissionId, TaskId};
use super::task::TaskStatus;
use thiserror::Error;

/// Errors returned while constructing domain values or mutating aggregates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    /// The task title is outside the permitted character range.
    #[error("task title must be {min}-{max} characters, got {actual}")]
    TitleLength {
        /// Minimum permitted character count.
        min: usize,
        /// Maximum permitted character count.
        max: usize,
        /// Actual character count after trimming.
        actual: usize,
    },

    /// The task description is outside the permitted character range.
    #[error("task description must be {min}-{max} characters, got {actual}")]
    DescriptionLength {
        /// Minimum permitted character count.
        min: usize,
        /// Maximum permitted character count.
        max: usize,
        /// Actual character count after trimming.
        actual: usize,
    },

    /// The task category is empty after trimming.
    #[error("task category must not be empty")]
    EmptyCategory,

    /// A task must name at least one required skill.
    #[error("task must list at least one required skill")]
    NoSkillsRequired,

    /// A task names more skills than the permitted maximum.
    #[error("task lists {actual} skills, exceeds limit of {max}")]
    TooManySkills {
        /// Maximum permitted skill count.
        max: usize,
        /// Actual skill count.
        actual: usize,
    },

    /// A listed skill is empty after trimming.
    #[error("required skills must not be empty")]
    EmptySkill,

    /// The compensation amount is zero, negative, or above the cap.
    #[error("compensation of {0} minor units is outside the permitted range")]
    CompensationOutOfRange(i64),

    /// The task deadline is not in the future.
    #[error("task deadline {0} is not in the future")]
    DeadlineNotInFuture(chrono::DateTime<chrono::Utc>),

    /// The requirements text is outside the permitted character range.
    #[error("requirements must be {min}-{max} characters, got {actual}")]
    RequirementsLength {
        /// Minimum permitted character count.
        min: usize,
        /// Maximum permitted character count.
        max: usize,
        /// Actual character count after trimming.
        actual: usize,
    },

    /// The deliverables text is outside the permitted character range.
    #[error("deliverables must be {min}-{max} characters, got {actual}")]
    DeliverablesLength {
        /// Minimum permitted character count.
        min: usize,
        /// Maximum permitted character count.
        max: usize,
        /// Actual character count after trimming.
        actual: usize,
    },

    /// The maximum applicant count must be positive.
    #[error("maximum applicant count must be positive")]
    MaxApplicantsZero,

    /// The cover letter is outside the permitted character range.
    #[error("cover letter must be {min}-{max} characters, got {actual}")]
    CoverLetterLength {
        /// Minimum permitted character count.
        min: usize,
        /// Maximum permitted character count.
        max: usize,
        /// Actual character count after trimming.
        actual: usize,
    },

    /// The proposed timeline exceeds the permitted length.
    #[error("proposed timeline must be at most {max} characters, got {actual}")]
    TimelineTooLong {
        /// Maximum permitted character count.
        max: usize,
        /// Actual character count after trimming.
        actual: usize,
    },

    /// The submission description is outside the permitted character range.
    #[error("submission description must be {min}-{max} characters, got {actual}")]
    WorkDescriptionLength {
        /// Minimum permitted character count.
        min: usize,
        /// Maximum permitted character count.
        max: usize,
        /// Actual character count after trimming.
        actual: usize,
    },

    /// A submission must carry at least one artifact link.
    #[error("submission must include at least one artifact link")]
    NoArtifacts,

    /// A submission carries more artifact links than permitted.
    #[error("submission includes {actual} artifact links, exceeds limit of {max}")]
    TooManyArtifacts {
        /// Maximum permitted artifact count.
        max: usize,
        /// Actual artifact count.
        actual: usize,
    },

    /// An artifact link is not an absolute http(s) URL.
    #[error("invalid artifact link: {0}")]
    InvalidArtifactUrl(String),

    /// The review notes exceed the permitted length.
    #[error("review notes must be at most {max} characters, got {actual}")]
    ReviewNotesTooLong {
        /// Maximum permitted character count.
        max: usize,
        /// Actual character count after trimming.
        actual: usize,
    },

    /// A page number or page size of zero was requested.
    #[error("page number and page size must be positive")]
    ZeroPageBound,

    /// The requested task status transition is not permitted.
    #[error("task {task_id} cannot transition from {from} to {to}")]
    InvalidTaskTransition {
        /// Task whose transition was rejected.
        task_id: TaskId,
        /// Status the task currently holds.
        from: TaskStatus,
        /// Status the caller attempted to reach.
        to: TaskStatus,
    },

    /// The requested application status transition is not permitted.
    #[error("application {application_id} cannot transition from {from} to {to}")]
    InvalidApplicationTransition {
        /// Application whose transition was rejected.
        application_id: ApplicationId,
        /// Status the application currently holds.
        from: ApplicationStatus,
        /// Status the caller attempted to reach.
        to: ApplicationStatus,
    },

    /// The submission has already been approved.
    #[error("submission {0} is already approved")]
    SubmissionAlreadyApproved(SubmissionId),
}

impl DomainError {
    /// Returns `true` when the error rejects a lifecycle state transition
    /// rather than a field constraint.
    #[must_use]
    pub const fn is_transition(&self) -> bool {
        matches!(
            self,
            Self::InvalidTaskTransition { .. }
                | Self::InvalidApplicationTransition { .. }
                | Self::SubmissionAlreadyApproved(_)
        )
    }
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing application statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown application status: {0}")]
pub struct ParseApplicationStatusError(pub String);

/// Error returned while parsing compensation kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown compensation kind: {0}")]
pub struct ParseCompensationKindError(pub String);

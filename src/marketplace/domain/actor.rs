//! Session claims and access predicates.
//!
//! A [`Session`] is built per request by the authentication layer (an
//! external collaborator) and injected into every service call. Services
//! evaluate explicit typed predicates against it instead of comparing role
//! strings.

use super::ids::{ApplicationId, OrganizationId, StudentId, TaskId};
use thiserror::Error;

/// Authenticated principal attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// An organization account, identified by its profile.
    Organization(OrganizationId),
    /// A student account, identified by its profile.
    Student(StudentId),
}

/// Per-request session context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    /// No credentials were presented.
    Anonymous,
    /// Credentials resolved to a typed actor claim.
    Authenticated(Actor),
}

impl Session {
    /// Creates an organization session.
    #[must_use]
    pub const fn organization(id: OrganizationId) -> Self {
        Self::Authenticated(Actor::Organization(id))
    }

    /// Creates a student session.
    #[must_use]
    pub const fn student(id: StudentId) -> Self {
        Self::Authenticated(Actor::Student(id))
    }

    /// Returns the actor claim when the session is authenticated.
    #[must_use]
    pub const fn actor(&self) -> Option<&Actor> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(actor) => Some(actor),
        }
    }

    /// Requires an organization claim.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::AuthenticationRequired`] for anonymous
    /// sessions and [`AccessError::OrganizationRequired`] for student
    /// sessions.
    pub const fn require_organization(&self) -> Result<OrganizationId, AccessError> {
        match self {
            Self::Anonymous => Err(AccessError::AuthenticationRequired),
            Self::Authenticated(Actor::Organization(id)) => Ok(*id),
            Self::Authenticated(Actor::Student(_)) => Err(AccessError::OrganizationRequired),
        }
    }

    /// Requires a student claim.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::AuthenticationRequired`] for anonymous
    /// sessions and [`AccessError::StudentRequired`] for organization
    /// sessions.
    pub const fn require_student(&self) -> Result<StudentId, AccessError> {
        match self {
            Self::Anonymous => Err(AccessError::AuthenticationRequired),
            Self::Authenticated(Actor::Student(id)) => Ok(*id),
            Self::Authenticated(Actor::Organization(_)) => Err(AccessError::StudentRequired),
        }
    }
}

/// Access control failures.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AccessError {
    /// No credentials were presented.
    #[error("authentication required")]
    AuthenticationRequired,

    /// The operation requires an organization account.
    #[error("operation requires an organization account")]
    OrganizationRequired,

    /// The operation requires a student account.
    #[error("operation requires a student account")]
    StudentRequired,

    /// The caller does not own the task.
    #[error("caller does not own task {0}")]
    NotTaskOwner(TaskId),

    /// The caller is not the applicant of the application.
    #[error("caller is not the applicant of application {0}")]
    NotApplicant(ApplicationId),

    /// The caller may not view the submission for this task.
    #[error("caller may not view the submission for task {0}")]
    SubmissionAccessDenied(TaskId),
}

impl AccessError {
    /// Returns `true` when the failure is missing authentication rather
    /// than an insufficient claim.
    #[must_use]
    pub const fn is_authentication(&self) -> bool {
        matches!(self, Self::AuthenticationRequired)
    }
}

//! Task application aggregate and its status state machine.

use super::error::{DomainError, ParseApplicationStatusError};
use super::fields::{CoverLetter, ProposedTimeline};
use super::ids::{ApplicationId, StudentId, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Application lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Awaiting a decision by the task owner.
    Pending,
    /// Accepted; the applicant performs the task.
    Accepted,
    /// Declined by the task owner.
    Rejected,
    /// Withdrawn by the applicant.
    Withdrawn,
}

impl ApplicationStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
        }
    }

    /// Returns `true` when no further transition is permitted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns `true` when a transition from `self` to `target` is
    /// permitted. Only pending applications may be decided.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (
                Self::Pending,
                Self::Accepted | Self::Rejected | Self::Withdrawn
            )
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ApplicationStatus {
    type Error = ParseApplicationStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "withdrawn" => Ok(Self::Withdrawn),
            _ => Err(ParseApplicationStatusError(value.to_owned())),
        }
    }
}

/// Task application aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskApplication {
    id: ApplicationId,
    task_id: TaskId,
    student_id: StudentId,
    cover_letter: CoverLetter,
    proposed_timeline: Option<ProposedTimeline>,
    status: ApplicationStatus,
    applied_at: DateTime<Utc>,
    reviewed_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedApplicationData {
    /// Persisted application identifier.
    pub id: ApplicationId,
    /// Persisted task reference.
    pub task_id: TaskId,
    /// Persisted applicant reference.
    pub student_id: StudentId,
    /// Persisted cover letter.
    pub cover_letter: CoverLetter,
    /// Persisted proposed timeline, if any.
    pub proposed_timeline: Option<ProposedTimeline>,
    /// Persisted lifecycle status.
    pub status: ApplicationStatus,
    /// Persisted application timestamp.
    pub applied_at: DateTime<Utc>,
    /// Persisted decision timestamp, if decided.
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl TaskApplication {
    /// Creates a new pending application.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        student_id: StudentId,
        cover_letter: CoverLetter,
        proposed_timeline: Option<ProposedTimeline>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: ApplicationId::new(),
            task_id,
            student_id,
            cover_letter,
            proposed_timeline,
            status: ApplicationStatus::Pending,
            applied_at: clock.utc(),
            reviewed_at: None,
        }
    }

    /// Reconstructs an application from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedApplicationData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            student_id: data.student_id,
            cover_letter: data.cover_letter,
            proposed_timeline: data.proposed_timeline,
            status: data.status,
            applied_at: data.applied_at,
            reviewed_at: data.reviewed_at,
        }
    }

    /// Returns the application identifier.
    #[must_use]
    pub const fn id(&self) -> ApplicationId {
        self.id
    }

    /// Returns the task this application targets.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the applicant.
    #[must_use]
    pub const fn student_id(&self) -> StudentId {
        self.student_id
    }

    /// Returns the cover letter.
    #[must_use]
    pub const fn cover_letter(&self) -> &CoverLetter {
        &self.cover_letter
    }

    /// Returns the proposed timeline, if any.
    #[must_use]
    pub const fn proposed_timeline(&self) -> Option<&ProposedTimeline> {
        self.proposed_timeline.as_ref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ApplicationStatus {
        self.status
    }

    /// Returns the application timestamp.
    #[must_use]
    pub const fn applied_at(&self) -> DateTime<Utc> {
        self.applied_at
    }

    /// Returns the decision timestamp, if decided.
    #[must_use]
    pub const fn reviewed_at(&self) -> Option<DateTime<Utc>> {
        self.reviewed_at
    }

    /// Returns `true` when `student_id` submitted this application.
    #[must_use]
    pub fn is_applicant(&self, student_id: StudentId) -> bool {
        self.student_id == student_id
    }

    /// Accepts the application.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidApplicationTransition`] unless the
    /// application is pending.
    pub fn accept(&mut self, clock: &impl Clock) -> Result<(), DomainError> {
        self.decide(ApplicationStatus::Accepted, clock)
    }

    /// Rejects the application.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidApplicationTransition`] unless the
    /// application is pending.
    pub fn reject(&mut self, clock: &impl Clock) -> Result<(), DomainError> {
        self.decide(ApplicationStatus::Rejected, clock)
    }

    /// Withdraws the application.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidApplicationTransition`] unless the
    /// application is pending.
    pub fn withdraw(&mut self, clock: &impl Clock) -> Result<(), DomainError> {
        self.decide(ApplicationStatus::Withdrawn, clock)
    }

    /// Applies a guarded decision, stamping the review time.
    fn decide(
        &mut self,
        target: ApplicationStatus,
        clock: &impl Clock,
    ) -> Result<(), DomainError> {
        if !self.status.can_transition_to(target) {
            return Err(DomainError::InvalidApplicationTransition {
                application_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.reviewed_at = Some(clock.utc());
        Ok(())
    }
}

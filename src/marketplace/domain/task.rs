//! Task aggregate root and the task status state machine.

use super::compensation::Compensation;
use super::error::{DomainError, ParseTaskStatusError};
use super::fields::{Category, Deliverables, Requirements, SkillSet, TaskDescription, TaskTitle};
use super::ids::{OrganizationId, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task has been created but is not yet visible to students.
    Draft,
    /// Task is published and accepting applications.
    Open,
    /// An application has been accepted and work is underway.
    InProgress,
    /// Work has been submitted and awaits review.
    Submitted,
    /// The submission has been approved.
    Completed,
    /// The task was withdrawn before completion.
    Cancelled,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Submitted => "submitted",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` when no further transition is permitted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns `true` when a transition from `self` to `target` is
    /// permitted.
    ///
    /// Status only ever advances along draft → open → `in_progress` →
    /// submitted → completed; cancellation is reachable until work has been
    /// submitted.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Draft, Self::Open)
                | (Self::Open, Self::InProgress)
                | (Self::InProgress, Self::Submitted)
                | (Self::Submitted, Self::Completed)
                | (Self::Draft | Self::Open | Self::InProgress, Self::Cancelled)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "draft" => Ok(Self::Draft),
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "submitted" => Ok(Self::Submitted),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Validated maximum applicant count for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaxApplicants(u32);

impl MaxApplicants {
    /// Creates a validated applicant cap.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MaxApplicantsZero`] when the value is zero.
    pub const fn new(value: u32) -> Result<Self, DomainError> {
        if value == 0 {
            return Err(DomainError::MaxApplicantsZero);
        }
        Ok(Self(value))
    }

    /// Returns the underlying count.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

/// Validated field bundle for a new task posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPosting {
    /// Task title.
    pub title: TaskTitle,
    /// Task description.
    pub description: TaskDescription,
    /// Task category.
    pub category: Category,
    /// Skills the task requires.
    pub skills_required: SkillSet,
    /// Offered compensation.
    pub compensation: Compensation,
    /// Deadline for completing the work.
    pub deadline: DateTime<Utc>,
    /// Free-form estimated duration, if provided.
    pub estimated_duration: Option<String>,
    /// What the applicant must bring.
    pub requirements: Requirements,
    /// What the applicant must deliver.
    pub deliverables: Deliverables,
    /// Optional cap on applicant count.
    pub max_applicants: Option<MaxApplicants>,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    organization_id: OrganizationId,
    title: TaskTitle,
    description: TaskDescription,
    category: Category,
    skills_required: SkillSet,
    compensation: Compensation,
    deadline: DateTime<Utc>,
    estimated_duration: Option<String>,
    requirements: Requirements,
    deliverables: Deliverables,
    max_applicants: Option<MaxApplicants>,
    status: TaskStatus,
    published_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owning organization.
    pub organization_id: OrganizationId,
    /// Persisted posting fields.
    pub posting: TaskPosting,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted publication timestamp, if published.
    pub published_at: Option<DateTime<Utc>>,
    /// Persisted completion timestamp, if completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new draft task from a validated posting.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::DeadlineNotInFuture`] when the posting
    /// deadline is not strictly after the current time.
    pub fn post(
        organization_id: OrganizationId,
        posting: TaskPosting,
        clock: &impl Clock,
    ) -> Result<Self, DomainError> {
        let timestamp = clock.utc();
        if posting.deadline <= timestamp {
            return Err(DomainError::DeadlineNotInFuture(posting.deadline));
        }

        Ok(Self {
            id: TaskId::new(),
            organization_id,
            title: posting.title,
            description: posting.description,
            category: posting.category,
            skills_required: posting.skills_required,
            compensation: posting.compensation,
            deadline: posting.deadline,
            estimated_duration: posting.estimated_duration,
            requirements: posting.requirements,
            deliverables: posting.deliverables,
            max_applicants: posting.max_applicants,
            status: TaskStatus::Draft,
            published_at: None,
            completed_at: None,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            organization_id: data.organization_id,
            title: data.posting.title,
            description: data.posting.description,
            category: data.posting.category,
            skills_required: data.posting.skills_required,
            compensation: data.posting.compensation,
            deadline: data.posting.deadline,
            estimated_duration: data.posting.estimated_duration,
            requirements: data.posting.requirements,
            deliverables: data.posting.deliverables,
            max_applicants: data.posting.max_applicants,
            status: data.status,
            published_at: data.published_at,
            completed_at: data.completed_at,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning organization.
    #[must_use]
    pub const fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns the task title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the task description.
    #[must_use]
    pub const fn description(&self) -> &TaskDescription {
        &self.description
    }

    /// Returns the task category.
    #[must_use]
    pub const fn category(&self) -> &Category {
        &self.category
    }

    /// Returns the required skills.
    #[must_use]
    pub const fn skills_required(&self) -> &SkillSet {
        &self.skills_required
    }

    /// Returns the offered compensation.
    #[must_use]
    pub const fn compensation(&self) -> Compensation {
        self.compensation
    }

    /// Returns the completion deadline.
    #[must_use]
    pub const fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Returns the estimated duration, if provided.
    #[must_use]
    pub fn estimated_duration(&self) -> Option<&str> {
        self.estimated_duration.as_deref()
    }

    /// Returns the posting requirements.
    #[must_use]
    pub const fn requirements(&self) -> &Requirements {
        &self.requirements
    }

    /// Returns the posting deliverables.
    #[must_use]
    pub const fn deliverables(&self) -> &Deliverables {
        &self.deliverables
    }

    /// Returns the applicant cap, if any.
    #[must_use]
    pub const fn max_applicants(&self) -> Option<MaxApplicants> {
        self.max_applicants
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the publication timestamp, if published.
    #[must_use]
    pub const fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    /// Returns the completion timestamp, if completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` when `organization_id` owns this task.
    #[must_use]
    pub fn is_owned_by(&self, organization_id: OrganizationId) -> bool {
        self.organization_id == organization_id
    }

    /// Publishes the task, making it visible to students.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTaskTransition`] unless the task is in
    /// [`TaskStatus::Draft`].
    pub fn publish(&mut self, clock: &impl Clock) -> Result<(), DomainError> {
        self.transition(TaskStatus::Open, clock)?;
        self.published_at = Some(self.updated_at);
        Ok(())
    }

    /// Marks the task as underway after an application was accepted.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTaskTransition`] unless the task is in
    /// [`TaskStatus::Open`].
    pub fn start(&mut self, clock: &impl Clock) -> Result<(), DomainError> {
        self.transition(TaskStatus::InProgress, clock)
    }

    /// Marks the task as awaiting review after work was submitted.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTaskTransition`] unless the task is in
    /// [`TaskStatus::InProgress`].
    pub fn mark_submitted(&mut self, clock: &impl Clock) -> Result<(), DomainError> {
        self.transition(TaskStatus::Submitted, clock)
    }

    /// Completes the task after its submission was approved.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTaskTransition`] unless the task is in
    /// [`TaskStatus::Submitted`].
    pub fn complete(&mut self, clock: &impl Clock) -> Result<(), DomainError> {
        self.transition(TaskStatus::Completed, clock)?;
        self.completed_at = Some(self.updated_at);
        Ok(())
    }

    /// Cancels the task.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTaskTransition`] once work has been
    /// submitted or the task is terminal.
    pub fn cancel(&mut self, clock: &impl Clock) -> Result<(), DomainError> {
        self.transition(TaskStatus::Cancelled, clock)
    }

    /// Applies a guarded status transition, leaving the aggregate untouched
    /// on rejection.
    fn transition(&mut self, target: TaskStatus, clock: &impl Clock) -> Result<(), DomainError> {
        if !self.status.can_transition_to(target) {
            return Err(DomainError::InvalidTaskTransition {
                task_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.touch(clock);
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

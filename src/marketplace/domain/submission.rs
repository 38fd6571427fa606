//! Task submission aggregate.
//!
//! A task has at most one submission; approval finalizes the task.

use super::error::DomainError;
use super::fields::{ReviewNotes, WorkDescription};
use super::ids::{StudentId, SubmissionId, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Validated link to a submitted work artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactUrl(String);

impl ArtifactUrl {
    /// Creates a validated artifact link.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidArtifactUrl`] unless the value parses
    /// as an absolute http(s) URL.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        let parsed =
            Url::parse(trimmed).map_err(|_| DomainError::InvalidArtifactUrl(raw.clone()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(DomainError::InvalidArtifactUrl(raw));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the link as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ArtifactUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ArtifactUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated list of artifact links for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactList(Vec<ArtifactUrl>);

impl ArtifactList {
    /// Maximum number of artifact links per submission.
    pub const MAX_ARTIFACTS: usize = 10;

    /// Creates a validated artifact list.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NoArtifacts`] or
    /// [`DomainError::TooManyArtifacts`].
    pub fn new(urls: Vec<ArtifactUrl>) -> Result<Self, DomainError> {
        if urls.is_empty() {
            return Err(DomainError::NoArtifacts);
        }
        if urls.len() > Self::MAX_ARTIFACTS {
            return Err(DomainError::TooManyArtifacts {
                max: Self::MAX_ARTIFACTS,
                actual: urls.len(),
            });
        }
        Ok(Self(urls))
    }

    /// Returns the links as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[ArtifactUrl] {
        &self.0
    }
}

/// Task submission aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSubmission {
    id: SubmissionId,
    task_id: TaskId,
    student_id: StudentId,
    description: WorkDescription,
    artifacts: ArtifactList,
    approved: bool,
    review_notes: Option<ReviewNotes>,
    submitted_at: DateTime<Utc>,
    reviewed_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSubmissionData {
    /// Persisted submission identifier.
    pub id: SubmissionId,
    /// Persisted task reference.
    pub task_id: TaskId,
    /// Persisted submitting student.
    pub student_id: StudentId,
    /// Persisted work description.
    pub description: WorkDescription,
    /// Persisted artifact links.
    pub artifacts: ArtifactList,
    /// Persisted approval flag.
    pub approved: bool,
    /// Persisted review notes, if any.
    pub review_notes: Option<ReviewNotes>,
    /// Persisted submission timestamp.
    pub submitted_at: DateTime<Utc>,
    /// Persisted review timestamp, if reviewed.
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl TaskSubmission {
    /// Creates a new unreviewed submission.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        student_id: StudentId,
        description: WorkDescription,
        artifacts: ArtifactList,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: SubmissionId::new(),
            task_id,
            student_id,
            description,
            artifacts,
            approved: false,
            review_notes: None,
            submitted_at: clock.utc(),
            reviewed_at: None,
        }
    }

    /// Reconstructs a submission from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedSubmissionData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            student_id: data.student_id,
            description: data.description,
            artifacts: data.artifacts,
            approved: data.approved,
            review_notes: data.review_notes,
            submitted_at: data.submitted_at,
            reviewed_at: data.reviewed_at,
        }
    }

    /// Returns the submission identifier.
    #[must_use]
    pub const fn id(&self) -> SubmissionId {
        self.id
    }

    /// Returns the task this submission belongs to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the submitting student.
    #[must_use]
    pub const fn student_id(&self) -> StudentId {
        self.student_id
    }

    /// Returns the work description.
    #[must_use]
    pub const fn description(&self) -> &WorkDescription {
        &self.description
    }

    /// Returns the artifact links.
    #[must_use]
    pub const fn artifacts(&self) -> &ArtifactList {
        &self.artifacts
    }

    /// Returns `true` when the submission has been approved.
    #[must_use]
    pub const fn is_approved(&self) -> bool {
        self.approved
    }

    /// Returns the review notes, if any.
    #[must_use]
    pub const fn review_notes(&self) -> Option<&ReviewNotes> {
        self.review_notes.as_ref()
    }

    /// Returns the submission timestamp.
    #[must_use]
    pub const fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Returns the review timestamp, if reviewed.
    #[must_use]
    pub const fn reviewed_at(&self) -> Option<DateTime<Utc>> {
        self.reviewed_at
    }

    /// Approves the submission, stamping the review time.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::SubmissionAlreadyApproved`] when called a
    /// second time.
    pub fn approve(
        &mut self,
        notes: Option<ReviewNotes>,
        clock: &impl Clock,
    ) -> Result<(), DomainError> {
        if self.approved {
            return Err(DomainError::SubmissionAlreadyApproved(self.id));
        }
        self.approved = true;
        self.review_notes = notes;
        self.reviewed_at = Some(clock.utc());
        Ok(())
    }
}

//! Diesel row models for marketplace persistence.

use super::schema::{task_applications, task_submissions, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning organization.
    pub organization_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Task category.
    pub category: String,
    /// Required skills JSON payload.
    pub skills_required: Value,
    /// Compensation amount in minor units.
    pub compensation_minor_units: i64,
    /// Compensation kind.
    pub compensation_kind: String,
    /// Completion deadline.
    pub deadline: DateTime<Utc>,
    /// Free-form estimated duration.
    pub estimated_duration: Option<String>,
    /// Posting requirements.
    pub requirements: String,
    /// Posting deliverables.
    pub deliverables: String,
    /// Optional applicant cap.
    pub max_applicants: Option<i32>,
    /// Lifecycle status.
    pub status: String,
    /// Publication timestamp.
    pub published_at: Option<DateTime<Utc>>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning organization.
    pub organization_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Task category.
    pub category: String,
    /// Required skills JSON payload.
    pub skills_required: Value,
    /// Compensation amount in minor units.
    pub compensation_minor_units: i64,
    /// Compensation kind.
    pub compensation_kind: String,
    /// Completion deadline.
    pub deadline: DateTime<Utc>,
    /// Free-form estimated duration.
    pub estimated_duration: Option<String>,
    /// Posting requirements.
    pub requirements: String,
    /// Posting deliverables.
    pub deliverables: String,
    /// Optional applicant cap.
    pub max_applicants: Option<i32>,
    /// Lifecycle status.
    pub status: String,
    /// Publication timestamp.
    pub published_at: Option<DateTime<Utc>>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for application records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ApplicationRow {
    /// Application identifier.
    pub id: uuid::Uuid,
    /// Target task.
    pub task_id: uuid::Uuid,
    /// Applying student.
    pub student_id: uuid::Uuid,
    /// Cover letter.
    pub cover_letter: String,
    /// Optional proposed timeline.
    pub proposed_timeline: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Application timestamp.
    pub applied_at: DateTime<Utc>,
    /// Decision timestamp.
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Insert model for application records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_applications)]
pub struct NewApplicationRow {
    /// Application identifier.
    pub id: uuid::Uuid,
    /// Target task.
    pub task_id: uuid::Uuid,
    /// Applying student.
    pub student_id: uuid::Uuid,
    /// Cover letter.
    pub cover_letter: String,
    /// Optional proposed timeline.
    pub proposed_timeline: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Application timestamp.
    pub applied_at: DateTime<Utc>,
    /// Decision timestamp.
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Query result row for submission records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_submissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SubmissionRow {
    /// Submission identifier.
    pub id: uuid::Uuid,
    /// Target task.
    pub task_id: uuid::Uuid,
    /// Submitting student.
    pub student_id: uuid::Uuid,
    /// Work description.
    pub description: String,
    /// Artifact links JSON payload.
    pub artifact_urls: Value,
    /// Approval flag.
    pub is_approved: bool,
    /// Optional review notes.
    pub review_notes: Option<String>,
    /// Submission timestamp.
    pub submitted_at: DateTime<Utc>,
    /// Review timestamp.
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Insert model for submission records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_submissions)]
pub struct NewSubmissionRow {
    /// Submission identifier.
    pub id: uuid::Uuid,
    /// Target task.
    pub task_id: uuid::Uuid,
    /// Submitting student.
    pub student_id: uuid::Uuid,
    /// Work description.
    pub description: String,
    /// Artifact links JSON payload.
    pub artifact_urls: Value,
    /// Approval flag.
    pub is_approved: bool,
    /// Optional review notes.
    pub review_notes: Option<String>,
    /// Submission timestamp.
    pub submitted_at: DateTime<Utc>,
    /// Review timestamp.
    pub reviewed_at: Option<DateTime<Utc>>,
}

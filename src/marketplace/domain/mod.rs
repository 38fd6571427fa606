//! Domain model for the task marketplace.
//!
//! The domain models task postings, student applications, work submissions,
//! and the session claims gating each operation, while keeping all
//! infrastructure concerns outside of the domain boundary.

mod actor;
mod application;
mod compensation;
mod error;
mod fields;
mod ids;
mod listing;
mod submission;
mod task;

pub use actor::{AccessError, Actor, Session};
pub use application::{
    ApplicationStatus, PersistedApplicationData, TaskApplication,
};
pub use compensation::{Compensation, CompensationAmount, CompensationKind};
pub use error::{
    DomainError, ParseApplicationStatusError, ParseCompensationKindError, ParseTaskStatusError,
};
pub use fields::{
    Category, CoverLetter, Deliverables, ProposedTimeline, Requirements, ReviewNotes, SkillSet,
    TaskDescription, TaskTitle, WorkDescription,
};
pub use ids::{ApplicationId, OrganizationId, StudentId, SubmissionId, TaskId};
pub use listing::{PageInfo, PageRequest, TaskFilter, TaskPage};
pub use submission::{ArtifactList, ArtifactUrl, PersistedSubmissionData, TaskSubmission};
pub use task::{MaxApplicants, PersistedTaskData, Task, TaskPosting, TaskStatus};

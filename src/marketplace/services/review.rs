//! Service layer for work submission and review.

use super::{with_storage_timeout, MarketplaceError, MarketplaceResult, StoragePolicy};
use crate::marketplace::domain::{
    AccessError, Actor, ApplicationStatus, ArtifactList, ArtifactUrl, ReviewNotes, Session, Task,
    TaskId, TaskSubmission, WorkDescription,
};
use crate::marketplace::ports::MarketplaceRepository;
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// Request payload for submitting work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitWorkRequest {
    description: String,
    artifact_urls: Vec<String>,
}

impl SubmitWorkRequest {
    /// Creates a request with the delivered description and artifact
    /// links.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        artifact_urls: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            description: description.into(),
            artifact_urls: artifact_urls.into_iter().collect(),
        }
    }
}

/// Submission and review orchestration service.
#[derive(Clone)]
pub struct SubmissionReviewService<R, C>
where
    R: MarketplaceRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    policy: StoragePolicy,
}

impl<R, C> SubmissionReviewService<R, C>
where
    R: MarketplaceRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new submission review service with the default storage
    /// policy.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            policy: StoragePolicy::default(),
        }
    }

    /// Overrides the storage policy.
    #[must_use]
    pub const fn with_storage_policy(mut self, policy: StoragePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Records the single submission for a task and moves the task to
    /// submitted, as one atomic persistence operation.
    ///
    /// Only the student holding the accepted application for an
    /// in-progress task may submit.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when the session carries no student
    /// claim, a field fails validation, the task is missing or not in
    /// progress, the caller does not hold the accepted application, a
    /// submission already exists, or persistence fails.
    pub async fn submit_work(
        &self,
        session: &Session,
        task_id: TaskId,
        request: SubmitWorkRequest,
    ) -> MarketplaceResult<TaskSubmission> {
        let student_id = session.require_student()?;
        let description = WorkDescription::new(request.description)?;
        let mut urls = Vec::with_capacity(request.artifact_urls.len());
        for raw in request.artifact_urls {
            urls.push(ArtifactUrl::new(raw)?);
        }
        let artifacts = ArtifactList::new(urls)?;

        let mut task = self.load_task(task_id).await?;
        let application = with_storage_timeout(
            self.policy,
            "find_application_for_student",
            self.repository
                .find_application_for_student(task_id, student_id),
        )
        .await?;
        let holds_acceptance = application
            .is_some_and(|found| found.status() == ApplicationStatus::Accepted);
        if !holds_acceptance {
            return Err(MarketplaceError::MissingAcceptedApplication {
                task_id,
                student_id,
            });
        }

        task.mark_submitted(&*self.clock)?;
        let submission =
            TaskSubmission::new(task_id, student_id, description, artifacts, &*self.clock);
        with_storage_timeout(
            self.policy,
            "record_submission",
            self.repository.record_submission(&submission, &task),
        )
        .await?;
        info!(submission_id = %submission.id(), %task_id, "work submitted");
        Ok(submission)
    }

    /// Approves the submission for a task and completes the task, as one
    /// atomic persistence operation.
    ///
    /// A second call fails the submitted-state guard, so completion is
    /// never stamped twice.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when the task or submission is
    /// missing, the caller does not own the task, the notes fail
    /// validation, the task is not submitted, or persistence fails.
    pub async fn approve_submission(
        &self,
        session: &Session,
        task_id: TaskId,
        notes: Option<String>,
    ) -> MarketplaceResult<Task> {
        let organization_id = session.require_organization()?;
        let mut task = self.load_task(task_id).await?;
        if !task.is_owned_by(organization_id) {
            return Err(AccessError::NotTaskOwner(task_id).into());
        }

        let mut submission = self.load_submission(task_id).await?;
        let review_notes = notes.map(ReviewNotes::new).transpose()?;
        submission.approve(review_notes, &*self.clock)?;
        task.complete(&*self.clock)?;
        with_storage_timeout(
            self.policy,
            "record_approval",
            self.repository.record_approval(&submission, &task),
        )
        .await?;
        info!(%task_id, submission_id = %submission.id(), "submission approved, task completed");
        Ok(task)
    }

    /// Retrieves the submission for a task.
    ///
    /// Visible to the task's owning organization and to the submitting
    /// student only.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when the task or submission is
    /// missing, the caller may not view it, or persistence lookup fails.
    pub async fn find_submission(
        &self,
        session: &Session,
        task_id: TaskId,
    ) -> MarketplaceResult<TaskSubmission> {
        let task = self.load_task(task_id).await?;
        let submission = self.load_submission(task_id).await?;

        let allowed = match session.actor() {
            Some(Actor::Organization(organization_id)) => task.is_owned_by(*organization_id),
            Some(Actor::Student(student_id)) => submission.student_id() == *student_id,
            None => return Err(AccessError::AuthenticationRequired.into()),
        };
        if !allowed {
            return Err(AccessError::SubmissionAccessDenied(task_id).into());
        }
        Ok(submission)
    }

    async fn load_task(&self, task_id: TaskId) -> MarketplaceResult<Task> {
        with_storage_timeout(
            self.policy,
            "find_task_by_id",
            self.repository.find_task_by_id(task_id),
        )
        .await?
        .ok_or(MarketplaceError::TaskNotFound(task_id))
    }

    async fn load_submission(&self, task_id: TaskId) -> MarketplaceResult<TaskSubmission> {
        with_storage_timeout(
            self.policy,
            "find_submission_for_task",
            self.repository.find_submission_for_task(task_id),
        )
        .await?
        .ok_or(MarketplaceError::SubmissionNotFound(task_id))
    }
}

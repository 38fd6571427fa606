//! Service layer for the application lifecycle.

use super::{with_storage_timeout, MarketplaceError, MarketplaceResult, StoragePolicy};
use crate::marketplace::domain::{
    AccessError, ApplicationId, ApplicationStatus, CoverLetter, ProposedTimeline, Session, Task,
    TaskApplication, TaskId, TaskStatus,
};
use crate::marketplace::ports::MarketplaceRepository;
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// Request payload for applying to a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyRequest {
    cover_letter: String,
    proposed_timeline: Option<String>,
}

impl ApplyRequest {
    /// Creates a request with the mandatory cover letter.
    #[must_use]
    pub fn new(cover_letter: impl Into<String>) -> Self {
        Self {
            cover_letter: cover_letter.into(),
            proposed_timeline: None,
        }
    }

    /// Sets the proposed timeline.
    #[must_use]
    pub fn with_proposed_timeline(mut self, timeline: impl Into<String>) -> Self {
        self.proposed_timeline = Some(timeline.into());
        self
    }
}

/// Application lifecycle orchestration service.
#[derive(Clone)]
pub struct ApplicationService<R, C>
where
    R: MarketplaceRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    policy: StoragePolicy,
}

impl<R, C> ApplicationService<R, C>
where
    R: MarketplaceRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new application service with the default storage policy.
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

    /// Lodges an application for an open task.
    ///
    /// The unique (task, student) pair is enforced by the store atomically
    /// with the insert; there is no separate existence pre-check to race
    /// against.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when the session carries no student
    /// claim, the cover letter or timeline fails validation, the task is
    /// missing or not open, the student already applied, or persistence
    /// fails.
    pub async fn apply(
        &self,
        session: &Session,
        task_id: TaskId,
        request: ApplyRequest,
    ) -> MarketplaceResult<TaskApplication> {
        let student_id = session.require_student()?;
        let cover_letter = CoverLetter::new(request.cover_letter)?;
        let proposed_timeline = request
            .proposed_timeline
            .map(ProposedTimeline::new)
            .transpose()?;

        let task = self.load_task(task_id).await?;
        if task.status() != TaskStatus::Open {
            return Err(MarketplaceError::TaskNotOpen {
                task_id,
                status: task.status(),
            });
        }

        let application = TaskApplication::new(
            task_id,
            student_id,
            cover_letter,
            proposed_timeline,
            &*self.clock,
        );
        with_storage_timeout(
            self.policy,
            "store_application",
            self.repository.store_application(&application),
        )
        .await?;
        info!(application_id = %application.id(), %task_id, %student_id, "application lodged");
        Ok(application)
    }

    /// Accepts an application and moves its task to in-progress, as one
    /// atomic persistence operation.
    ///
    /// Sibling pending applications are left untouched; a second
    /// acceptance for the same task fails.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when the application or task is
    /// missing, the caller does not own the task, either record left the
    /// expected status, another application is already accepted, or
    /// persistence fails.
    pub async fn accept_application(
        &self,
        session: &Session,
        application_id: ApplicationId,
    ) -> MarketplaceResult<TaskApplication> {
        let organization_id = session.require_organization()?;
        let mut application = self.load_application(application_id).await?;
        let mut task = self.load_task(application.task_id()).await?;
        if !task.is_owned_by(organization_id) {
            return Err(AccessError::NotTaskOwner(task.id()).into());
        }

        application.accept(&*self.clock)?;
        task.start(&*self.clock)?;
        with_storage_timeout(
            self.policy,
            "record_acceptance",
            self.repository.record_acceptance(&application, &task),
        )
        .await?;
        info!(
            application_id = %application.id(),
            task_id = %task.id(),
            "application accepted, task in progress"
        );
        Ok(application)
    }

    /// Rejects a pending application. No task-state effect.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when the application or task is
    /// missing, the caller does not own the task, the application is not
    /// pending, or persistence fails.
    pub async fn reject_application(
        &self,
        session: &Session,
        application_id: ApplicationId,
    ) -> MarketplaceResult<TaskApplication> {
        let organization_id = session.require_organization()?;
        let mut application = self.load_application(application_id).await?;
        let task = self.load_task(application.task_id()).await?;
        if !task.is_owned_by(organization_id) {
            return Err(AccessError::NotTaskOwner(task.id()).into());
        }

        application.reject(&*self.clock)?;
        with_storage_timeout(
            self.policy,
            "update_application",
            self.repository
                .update_application(&application, ApplicationStatus::Pending),
        )
        .await?;
        info!(application_id = %application.id(), "application rejected");
        Ok(application)
    }

    /// Withdraws the caller's own pending application. No task-state
    /// effect.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when the application is missing, the
    /// caller is not its applicant, it is not pending, or persistence
    /// fails.
    pub async fn withdraw_application(
        &self,
        session: &Session,
        application_id: ApplicationId,
    ) -> MarketplaceResult<TaskApplication> {
        let student_id = session.require_student()?;
        let mut application = self.load_application(application_id).await?;
        if !application.is_applicant(student_id) {
            return Err(AccessError::NotApplicant(application_id).into());
        }

        application.withdraw(&*self.clock)?;
        with_storage_timeout(
            self.policy,
            "update_application",
            self.repository
                .update_application(&application, ApplicationStatus::Pending),
        )
        .await?;
        info!(application_id = %application.id(), "application withdrawn");
        Ok(application)
    }

    /// Returns the calling student's applications, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when the session carries no student
    /// claim or persistence lookup fails.
    pub async fn list_student_applications(
        &self,
        session: &Session,
    ) -> MarketplaceResult<Vec<TaskApplication>> {
        let student_id = session.require_student()?;
        with_storage_timeout(
            self.policy,
            "list_applications_for_student",
            self.repository.list_applications_for_student(student_id),
        )
        .await
    }

    /// Returns the applications for one of the caller's tasks, newest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when the task is missing, the caller
    /// does not own it, or persistence lookup fails.
    pub async fn list_task_applications(
        &self,
        session: &Session,
        task_id: TaskId,
    ) -> MarketplaceResult<Vec<TaskApplication>> {
        let organization_id = session.require_organization()?;
        let task = self.load_task(task_id).await?;
        if !task.is_owned_by(organization_id) {
            return Err(AccessError::NotTaskOwner(task_id).into());
        }

        with_storage_timeout(
            self.policy,
            "list_applications_for_task",
            self.repository.list_applications_for_task(task_id),
        )
        .await
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

    async fn load_application(
        &self,
        application_id: ApplicationId,
    ) -> MarketplaceResult<TaskApplication> {
        with_storage_timeout(
            self.policy,
            "find_application_by_id",
            self.repository.find_application_by_id(application_id),
        )
        .await?
        .ok_or(MarketplaceError::ApplicationNotFound(application_id))
    }
}

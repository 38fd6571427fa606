//! Service layer for task posting and publication.

use super::{with_storage_timeout, MarketplaceError, MarketplaceResult, StoragePolicy};
use crate::marketplace::domain::{
    AccessError, Category, Compensation, CompensationAmount, CompensationKind, Deliverables,
    DomainError, MaxApplicants, PageRequest, Requirements, Session, SkillSet, Task,
    TaskDescription, TaskFilter, TaskId, TaskPage, TaskPosting, TaskTitle,
};
use crate::marketplace::ports::MarketplaceRepository;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// Request payload for posting a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: String,
    category: String,
    skills_required: Vec<String>,
    compensation_minor_units: i64,
    compensation_kind: CompensationKind,
    deadline: DateTime<Utc>,
    requirements: String,
    deliverables: String,
    estimated_duration: Option<String>,
    max_applicants: Option<u32>,
}

impl CreateTaskRequest {
    /// Creates a request with the mandatory posting fields.
    #[expect(
        clippy::too_many_arguments,
        reason = "posting bundles all mandatory fields for a single domain aggregate"
    )]
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        skills_required: impl IntoIterator<Item = String>,
        compensation_minor_units: i64,
        compensation_kind: CompensationKind,
        deadline: DateTime<Utc>,
        requirements: impl Into<String>,
        deliverables: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: category.into(),
            skills_required: skills_required.into_iter().collect(),
            compensation_minor_units,
            compensation_kind,
            deadline,
            requirements: requirements.into(),
            deliverables: deliverables.into(),
            estimated_duration: None,
            max_applicants: None,
        }
    }

    /// Sets the free-form estimated duration.
    #[must_use]
    pub fn with_estimated_duration(mut self, duration: impl Into<String>) -> Self {
        self.estimated_duration = Some(duration.into());
        self
    }

    /// Sets the applicant cap.
    #[must_use]
    pub const fn with_max_applicants(mut self, cap: u32) -> Self {
        self.max_applicants = Some(cap);
        self
    }

    /// Validates every field and assembles the posting bundle.
    fn into_posting(self) -> Result<TaskPosting, DomainError> {
        let amount = CompensationAmount::new(self.compensation_minor_units)?;
        let max_applicants = self.max_applicants.map(MaxApplicants::new).transpose()?;

        Ok(TaskPosting {
            title: TaskTitle::new(self.title)?,
            description: TaskDescription::new(self.description)?,
            category: Category::new(self.category)?,
            skills_required: SkillSet::new(self.skills_required)?,
            compensation: Compensation::new(amount, self.compensation_kind),
            deadline: self.deadline,
            estimated_duration: self.estimated_duration,
            requirements: Requirements::new(self.requirements)?,
            deliverables: Deliverables::new(self.deliverables)?,
            max_applicants,
        })
    }
}

/// Task posting and publication orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<R, C>
where
    R: MarketplaceRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    policy: StoragePolicy,
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: MarketplaceRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service with the default storage
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

    /// Posts a new draft task for the calling organization.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when the session carries no
    /// organization claim, a field constraint fails, or persistence fails.
    pub async fn create_task(
        &self,
        session: &Session,
        request: CreateTaskRequest,
    ) -> MarketplaceResult<Task> {
        let organization_id = session.require_organization()?;
        let posting = request.into_posting()?;
        let task = Task::post(organization_id, posting, &*self.clock)?;
        with_storage_timeout(self.policy, "store_task", self.repository.store_task(&task))
            .await?;
        info!(task_id = %task.id(), %organization_id, "task created");
        Ok(task)
    }

    /// Publishes a draft task, making it visible to students.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when the task does not exist, the
    /// caller does not own it, it is not in draft, or persistence fails.
    pub async fn publish_task(
        &self,
        session: &Session,
        task_id: TaskId,
    ) -> MarketplaceResult<Task> {
        let organization_id = session.require_organization()?;
        let mut task = self.load_task(task_id).await?;
        if !task.is_owned_by(organization_id) {
            return Err(AccessError::NotTaskOwner(task_id).into());
        }

        let previous = task.status();
        task.publish(&*self.clock)?;
        with_storage_timeout(
            self.policy,
            "update_task",
            self.repository.update_task(&task, previous),
        )
        .await?;
        info!(task_id = %task.id(), status = %task.status(), "task published");
        Ok(task)
    }

    /// Cancels a task that has not yet received a submission.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when the task does not exist, the
    /// caller does not own it, the status forbids cancellation, or
    /// persistence fails.
    pub async fn cancel_task(
        &self,
        session: &Session,
        task_id: TaskId,
    ) -> MarketplaceResult<Task> {
        let organization_id = session.require_organization()?;
        let mut task = self.load_task(task_id).await?;
        if !task.is_owned_by(organization_id) {
            return Err(AccessError::NotTaskOwner(task_id).into());
        }

        let previous = task.status();
        task.cancel(&*self.clock)?;
        with_storage_timeout(
            self.policy,
            "update_task",
            self.repository.update_task(&task, previous),
        )
        .await?;
        info!(task_id = %task.id(), "task cancelled");
        Ok(task)
    }

    /// Retrieves a task by identifier. Public.
    ///
    /// Returns `Ok(None)` when no task has the given ID.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when persistence lookup fails.
    pub async fn find_task(&self, task_id: TaskId) -> MarketplaceResult<Option<Task>> {
        with_storage_timeout(
            self.policy,
            "find_task_by_id",
            self.repository.find_task_by_id(task_id),
        )
        .await
    }

    /// Returns one page of open tasks matching `filter`. Public.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when persistence lookup fails.
    pub async fn list_open_tasks(
        &self,
        filter: &TaskFilter,
        page: &PageRequest,
    ) -> MarketplaceResult<TaskPage> {
        with_storage_timeout(
            self.policy,
            "list_open_tasks",
            self.repository.list_open_tasks(filter, page),
        )
        .await
    }

    /// Returns the calling organization's tasks, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`MarketplaceError`] when the session carries no
    /// organization claim or persistence lookup fails.
    pub async fn list_organization_tasks(
        &self,
        session: &Session,
    ) -> MarketplaceResult<Vec<Task>> {
        let organization_id = session.require_organization()?;
        with_storage_timeout(
            self.policy,
            "list_tasks_for_organization",
            self.repository.list_tasks_for_organization(organization_id),
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
}

//! In-memory marketplace repository.
//!
//! Every operation takes the single state lock for its whole duration, so
//! each port method is trivially atomic. Used by tests and by embedders
//! that do not need durable storage.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::marketplace::domain::{
    ApplicationId, ApplicationStatus, OrganizationId, PageInfo, PageRequest, StudentId, Task,
    TaskApplication, TaskFilter, TaskId, TaskPage, TaskStatus, TaskSubmission,
};
use crate::marketplace::ports::{MarketplaceRepository, RepositoryError, RepositoryResult};

/// Thread-safe in-memory marketplace repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMarketplaceRepository {
    state: Arc<RwLock<InMemoryMarketplaceState>>,
}

#[derive(Debug, Default)]
struct InMemoryMarketplaceState {
    tasks: HashMap<TaskId, Task>,
    applications: HashMap<ApplicationId, TaskApplication>,
    pair_index: HashMap<(TaskId, StudentId), ApplicationId>,
    accepted_index: HashMap<TaskId, ApplicationId>,
    submissions: HashMap<TaskId, TaskSubmission>,
}

impl InMemoryMarketplaceRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn check_task_status(
    stored: &Task,
    expected: TaskStatus,
) -> RepositoryResult<()> {
    if stored.status() != expected {
        return Err(RepositoryError::TaskStatusConflict {
            task_id: stored.id(),
            expected,
            actual: stored.status(),
        });
    }
    Ok(())
}

fn check_application_status(
    stored: &TaskApplication,
    expected: ApplicationStatus,
) -> RepositoryResult<()> {
    if stored.status() != expected {
        return Err(RepositoryError::ApplicationStatusConflict {
            application_id: stored.id(),
            expected,
            actual: stored.status(),
        });
    }
    Ok(())
}

#[async_trait]
impl MarketplaceRepository for InMemoryMarketplaceRepository {
    async fn store_task(&self, task: &Task) -> RepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.tasks.contains_key(&task.id()) {
            return Err(RepositoryError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update_task(&self, task: &Task, expected: TaskStatus) -> RepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let stored = state
            .tasks
            .get(&task.id())
            .ok_or(RepositoryError::TaskNotFound(task.id()))?;
        check_task_status(stored, expected)?;
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_task_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list_open_tasks(
        &self,
        filter: &TaskFilter,
        page: &PageRequest,
    ) -> RepositoryResult<TaskPage> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut matching: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.status() == TaskStatus::Open && filter.matches(task))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.published_at().cmp(&a.published_at()));

        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let per_page = usize::try_from(page.per_page()).unwrap_or(usize::MAX);
        let tasks: Vec<Task> = matching.into_iter().skip(offset).take(per_page).collect();

        Ok(TaskPage {
            tasks,
            page_info: PageInfo::compute(page, total),
        })
    }

    async fn list_tasks_for_organization(
        &self,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.is_owned_by(organization_id))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(tasks)
    }

    async fn store_application(&self, application: &TaskApplication) -> RepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let pair = (application.task_id(), application.student_id());
        if state.pair_index.contains_key(&pair) {
            return Err(RepositoryError::DuplicateApplication {
                task_id: application.task_id(),
                student_id: application.student_id(),
            });
        }
        state.pair_index.insert(pair, application.id());
        state
            .applications
            .insert(application.id(), application.clone());
        Ok(())
    }

    async fn find_application_by_id(
        &self,
        id: ApplicationId,
    ) -> RepositoryResult<Option<TaskApplication>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.applications.get(&id).cloned())
    }

    async fn find_application_for_student(
        &self,
        task_id: TaskId,
        student_id: StudentId,
    ) -> RepositoryResult<Option<TaskApplication>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let application = state
            .pair_index
            .get(&(task_id, student_id))
            .and_then(|id| state.applications.get(id))
            .cloned();
        Ok(application)
    }

    async fn list_applications_for_task(
        &self,
        task_id: TaskId,
    ) -> RepositoryResult<Vec<TaskApplication>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut applications: Vec<TaskApplication> = state
            .applications
            .values()
            .filter(|application| application.task_id() == task_id)
            .cloned()
            .collect();
        applications.sort_by(|a, b| b.applied_at().cmp(&a.applied_at()));
        Ok(applications)
    }

    async fn list_applications_for_student(
        &self,
        student_id: StudentId,
    ) -> RepositoryResult<Vec<TaskApplication>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut applications: Vec<TaskApplication> = state
            .applications
            .values()
            .filter(|application| application.student_id() == student_id)
            .cloned()
            .collect();
        applications.sort_by(|a, b| b.applied_at().cmp(&a.applied_at()));
        Ok(applications)
    }

    async fn update_application(
        &self,
        application: &TaskApplication,
        expected: ApplicationStatus,
    ) -> RepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let stored = state
            .applications
            .get(&application.id())
            .ok_or(RepositoryError::ApplicationNotFound(application.id()))?;
        check_application_status(stored, expected)?;
        state
            .applications
            .insert(application.id(), application.clone());
        Ok(())
    }

    async fn record_acceptance(
        &self,
        application: &TaskApplication,
        task: &Task,
    ) -> RepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let stored_application = state
            .applications
            .get(&application.id())
            .ok_or(RepositoryError::ApplicationNotFound(application.id()))?;
        let stored_task = state
            .tasks
            .get(&task.id())
            .ok_or(RepositoryError::TaskNotFound(task.id()))?;

        if state.accepted_index.contains_key(&task.id()) {
            return Err(RepositoryError::AcceptedApplicationExists(task.id()));
        }
        check_application_status(stored_application, ApplicationStatus::Pending)?;
        check_task_status(stored_task, TaskStatus::Open)?;

        state.accepted_index.insert(task.id(), application.id());
        state
            .applications
            .insert(application.id(), application.clone());
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn record_submission(
        &self,
        submission: &TaskSubmission,
        task: &Task,
    ) -> RepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let stored_task = state
            .tasks
            .get(&task.id())
            .ok_or(RepositoryError::TaskNotFound(task.id()))?;
        if state.submissions.contains_key(&task.id()) {
            return Err(RepositoryError::DuplicateSubmission(task.id()));
        }
        check_task_status(stored_task, TaskStatus::InProgress)?;

        state.submissions.insert(task.id(), submission.clone());
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_submission_for_task(
        &self,
        task_id: TaskId,
    ) -> RepositoryResult<Option<TaskSubmission>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.submissions.get(&task_id).cloned())
    }

    async fn record_approval(
        &self,
        submission: &TaskSubmission,
        task: &Task,
    ) -> RepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let stored_task = state
            .tasks
            .get(&task.id())
            .ok_or(RepositoryError::TaskNotFound(task.id()))?;
        if !state.submissions.contains_key(&task.id()) {
            return Err(RepositoryError::SubmissionNotFound(task.id()));
        }
        check_task_status(stored_task, TaskStatus::Submitted)?;

        state.submissions.insert(task.id(), submission.clone());
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }
}

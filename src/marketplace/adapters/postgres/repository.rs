//! `PostgreSQL` repository implementation for marketplace persistence.
//!
//! Combined lifecycle writes run inside a transaction, and every
//! status-carrying update is guarded by a status predicate in the `WHERE`
//! clause, so a concurrent transition makes the statement match zero rows
//! instead of overwriting newer state. Uniqueness invariants are enforced
//! by unique indexes; semantic pre-checks only improve error reporting in
//! the TOCTOU window.

use super::models::{
    ApplicationRow, NewApplicationRow, NewSubmissionRow, NewTaskRow, SubmissionRow, TaskRow,
};
use super::schema::{task_applications, task_submissions, tasks};
use crate::marketplace::domain::{
    ApplicationId, ApplicationStatus, ArtifactList, ArtifactUrl, Category, Compensation,
    CompensationAmount, CompensationKind, CoverLetter, Deliverables, MaxApplicants, PageInfo,
    PageRequest, PersistedApplicationData, PersistedSubmissionData, PersistedTaskData,
    OrganizationId, ProposedTimeline, Requirements, ReviewNotes, SkillSet, StudentId,
    SubmissionId, Task, TaskApplication, TaskDescription, TaskFilter, TaskId, TaskPage,
    TaskPosting, TaskStatus, TaskSubmission, TaskTitle, WorkDescription,
};
use crate::marketplace::ports::{MarketplaceRepository, RepositoryError, RepositoryResult};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by marketplace adapters.
pub type MarketplacePgPool = Pool<ConnectionManager<PgConnection>>;

/// Unique index over the (task, student) application pair.
const APPLICATION_PAIR_CONSTRAINT: &str = "idx_task_applications_pair_unique";
/// Partial unique index allowing one accepted application per task.
const SINGLE_ACCEPTED_CONSTRAINT: &str = "idx_task_applications_single_accepted";
/// Unique index allowing one submission per task.
const SUBMISSION_TASK_CONSTRAINT: &str = "idx_task_submissions_task_unique";

/// `PostgreSQL`-backed marketplace repository.
#[derive(Debug, Clone)]
pub struct PostgresMarketplaceRepository {
    pool: MarketplacePgPool,
}

impl PostgresMarketplaceRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: MarketplacePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> RepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(RepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(RepositoryError::persistence)?
    }
}

#[async_trait]
impl MarketplaceRepository for PostgresMarketplaceRepository {
    async fn store_task(&self, task: &Task) -> RepositoryResult<()> {
        let task_id = task.id();
        let new_row = task_to_new_row(task)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        RepositoryError::DuplicateTask(task_id)
                    }
                    other => RepositoryError::from(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_task(&self, task: &Task, expected: TaskStatus) -> RepositoryResult<()> {
        let owned_task = task.clone();
        self.run_blocking(move |connection| {
            apply_task_update(connection, &owned_task, expected)
        })
        .await
    }

    async fn find_task_by_id(&self, id: TaskId) -> RepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(RepositoryError::from)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_open_tasks(
        &self,
        filter: &TaskFilter,
        page: &PageRequest,
    ) -> RepositoryResult<TaskPage> {
        let owned_filter = filter.clone();
        let owned_page = *page;
        self.run_blocking(move |connection| {
            let rows = load_open_task_rows(connection, &owned_filter)?;
            let mut matching = Vec::with_capacity(rows.len());
            for row in rows {
                let task = row_to_task(row)?;
                // Skills live in a JSONB payload, so overlap is applied
                // after the typed filters.
                if owned_filter.skills().is_empty()
                    || task.skills_required().overlaps(owned_filter.skills())
                {
                    matching.push(task);
                }
            }

            let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
            let offset = usize::try_from(owned_page.offset()).unwrap_or(usize::MAX);
            let per_page = usize::try_from(owned_page.per_page()).unwrap_or(usize::MAX);
            let page_tasks: Vec<Task> =
                matching.into_iter().skip(offset).take(per_page).collect();

            Ok(TaskPage {
                tasks: page_tasks,
                page_info: PageInfo::compute(&owned_page, total),
            })
        })
        .await
    }

    async fn list_tasks_for_organization(
        &self,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::organization_id.eq(organization_id.into_inner()))
                .order(tasks::created_at.desc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(RepositoryError::from)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn store_application(&self, application: &TaskApplication) -> RepositoryResult<()> {
        let task_id = application.task_id();
        let student_id = application.student_id();
        let new_row = application_to_new_row(application);

        self.run_blocking(move |connection| {
            diesel::insert_into(task_applications::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_constraint(info.as_ref(), APPLICATION_PAIR_CONSTRAINT) =>
                    {
                        RepositoryError::DuplicateApplication {
                            task_id,
                            student_id,
                        }
                    }
                    other => RepositoryError::from(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_application_by_id(
        &self,
        id: ApplicationId,
    ) -> RepositoryResult<Option<TaskApplication>> {
        self.run_blocking(move |connection| {
            let row = task_applications::table
                .filter(task_applications::id.eq(id.into_inner()))
                .select(ApplicationRow::as_select())
                .first::<ApplicationRow>(connection)
                .optional()
                .map_err(RepositoryError::from)?;
            row.map(row_to_application).transpose()
        })
        .await
    }

    async fn find_application_for_student(
        &self,
        task_id: TaskId,
        student_id: StudentId,
    ) -> RepositoryResult<Option<TaskApplication>> {
        self.run_blocking(move |connection| {
            let row = task_applications::table
                .filter(task_applications::task_id.eq(task_id.into_inner()))
                .filter(task_applications::student_id.eq(student_id.into_inner()))
                .select(ApplicationRow::as_select())
                .first::<ApplicationRow>(connection)
                .optional()
                .map_err(RepositoryError::from)?;
            row.map(row_to_application).transpose()
        })
        .await
    }

    async fn list_applications_for_task(
        &self,
        task_id: TaskId,
    ) -> RepositoryResult<Vec<TaskApplication>> {
        self.run_blocking(move |connection| {
            let rows = task_applications::table
                .filter(task_applications::task_id.eq(task_id.into_inner()))
                .order(task_applications::applied_at.desc())
                .select(ApplicationRow::as_select())
                .load::<ApplicationRow>(connection)
                .map_err(RepositoryError::from)?;
            rows.into_iter().map(row_to_application).collect()
        })
        .await
    }

    async fn list_applications_for_student(
        &self,
        student_id: StudentId,
    ) -> RepositoryResult<Vec<TaskApplication>> {
        self.run_blocking(move |connection| {
            let rows = task_applications::table
                .filter(task_applications::student_id.eq(student_id.into_inner()))
                .order(task_applications::applied_at.desc())
                .select(ApplicationRow::as_select())
                .load::<ApplicationRow>(connection)
                .map_err(RepositoryError::from)?;
            rows.into_iter().map(row_to_application).collect()
        })
        .await
    }

    async fn update_application(
        &self,
        application: &TaskApplication,
        expected: ApplicationStatus,
    ) -> RepositoryResult<()> {
        let owned_application = application.clone();
        self.run_blocking(move |connection| {
            let updated = update_application_row(connection, &owned_application, expected)
                .map_err(RepositoryError::from)?;
            if updated == 0 {
                return Err(application_update_conflict(
                    connection,
                    owned_application.id(),
                    expected,
                ));
            }
            Ok(())
        })
        .await
    }

    async fn record_acceptance(
        &self,
        application: &TaskApplication,
        task: &Task,
    ) -> RepositoryResult<()> {
        let owned_application = application.clone();
        let owned_task = task.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, RepositoryError, _>(|tx_conn| {
                // Pre-check for a clean error; the partial unique index
                // still enforces single acceptance in the TOCTOU window.
                let accepted: i64 = task_applications::table
                    .filter(task_applications::task_id.eq(owned_task.id().into_inner()))
                    .filter(task_applications::status.eq(ApplicationStatus::Accepted.as_str()))
                    .count()
                    .get_result(tx_conn)?;
                if accepted > 0 {
                    return Err(RepositoryError::AcceptedApplicationExists(owned_task.id()));
                }

                let updated =
                    update_application_row(tx_conn, &owned_application, ApplicationStatus::Pending)
                        .map_err(|err| match err {
                            DieselError::DatabaseError(
                                DatabaseErrorKind::UniqueViolation,
                                ref info,
                            ) if is_constraint(info.as_ref(), SINGLE_ACCEPTED_CONSTRAINT) => {
                                RepositoryError::AcceptedApplicationExists(owned_task.id())
                            }
                            other => RepositoryError::from(other),
                        })?;
                if updated == 0 {
                    return Err(application_update_conflict(
                        tx_conn,
                        owned_application.id(),
                        ApplicationStatus::Pending,
                    ));
                }

                apply_task_update(tx_conn, &owned_task, TaskStatus::Open)
            })
        })
        .await
    }

    async fn record_submission(
        &self,
        submission: &TaskSubmission,
        task: &Task,
    ) -> RepositoryResult<()> {
        let new_row = submission_to_new_row(submission)?;
        let owned_task = task.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, RepositoryError, _>(|tx_conn| {
                diesel::insert_into(task_submissions::table)
                    .values(&new_row)
                    .execute(tx_conn)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                            if is_constraint(info.as_ref(), SUBMISSION_TASK_CONSTRAINT) =>
                        {
                            RepositoryError::DuplicateSubmission(owned_task.id())
                        }
                        other => RepositoryError::from(other),
                    })?;

                apply_task_update(tx_conn, &owned_task, TaskStatus::InProgress)
            })
        })
        .await
    }

    async fn find_submission_for_task(
        &self,
        task_id: TaskId,
    ) -> RepositoryResult<Option<TaskSubmission>> {
        self.run_blocking(move |connection| {
            let row = task_submissions::table
                .filter(task_submissions::task_id.eq(task_id.into_inner()))
                .select(SubmissionRow::as_select())
                .first::<SubmissionRow>(connection)
                .optional()
                .map_err(RepositoryError::from)?;
            row.map(row_to_submission).transpose()
        })
        .await
    }

    async fn record_approval(
        &self,
        submission: &TaskSubmission,
        task: &Task,
    ) -> RepositoryResult<()> {
        let owned_submission = submission.clone();
        let owned_task = task.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, RepositoryError, _>(|tx_conn| {
                let updated = diesel::update(
                    task_submissions::table
                        .filter(task_submissions::task_id.eq(owned_task.id().into_inner())),
                )
                .set((
                    task_submissions::is_approved.eq(owned_submission.is_approved()),
                    task_submissions::review_notes.eq(owned_submission
                        .review_notes()
                        .map(|notes| notes.as_str().to_owned())),
                    task_submissions::reviewed_at.eq(owned_submission.reviewed_at()),
                ))
                .execute(tx_conn)?;
                if updated == 0 {
                    return Err(RepositoryError::SubmissionNotFound(owned_task.id()));
                }

                apply_task_update(tx_conn, &owned_task, TaskStatus::Submitted)
            })
        })
        .await
    }
}

/// Applies a status-guarded task update, reporting a conflict when the
/// guard matches zero rows.
fn apply_task_update(
    connection: &mut PgConnection,
    task: &Task,
    expected: TaskStatus,
) -> RepositoryResult<()> {
    let updated = diesel::update(
        tasks::table
            .filter(tasks::id.eq(task.id().into_inner()))
            .filter(tasks::status.eq(expected.as_str())),
    )
    .set((
        tasks::status.eq(task.status().as_str()),
        tasks::published_at.eq(task.published_at()),
        tasks::completed_at.eq(task.completed_at()),
        tasks::updated_at.eq(task.updated_at()),
    ))
    .execute(connection)
    .map_err(RepositoryError::from)?;

    if updated == 0 {
        return Err(task_update_conflict(connection, task.id(), expected));
    }
    Ok(())
}

/// Runs the status-guarded application update statement.
fn update_application_row(
    connection: &mut PgConnection,
    application: &TaskApplication,
    expected: ApplicationStatus,
) -> Result<usize, DieselError> {
    diesel::update(
        task_applications::table
            .filter(task_applications::id.eq(application.id().into_inner()))
            .filter(task_applications::status.eq(expected.as_str())),
    )
    .set((
        task_applications::status.eq(application.status().as_str()),
        task_applications::reviewed_at.eq(application.reviewed_at()),
    ))
    .execute(connection)
}

/// Distinguishes a missing task from a concurrent status change.
fn task_update_conflict(
    connection: &mut PgConnection,
    task_id: TaskId,
    expected: TaskStatus,
) -> RepositoryError {
    let current = tasks::table
        .filter(tasks::id.eq(task_id.into_inner()))
        .select(tasks::status)
        .first::<String>(connection)
        .optional();
    match current {
        Ok(Some(raw)) => TaskStatus::try_from(raw.as_str()).map_or_else(
            RepositoryError::persistence,
            |actual| RepositoryError::TaskStatusConflict {
                task_id,
                expected,
                actual,
            },
        ),
        Ok(None) => RepositoryError::TaskNotFound(task_id),
        Err(err) => RepositoryError::persistence(err),
    }
}

/// Distinguishes a missing application from a concurrent status change.
fn application_update_conflict(
    connection: &mut PgConnection,
    application_id: ApplicationId,
    expected: ApplicationStatus,
) -> RepositoryError {
    let current = task_applications::table
        .filter(task_applications::id.eq(application_id.into_inner()))
        .select(task_applications::status)
        .first::<String>(connection)
        .optional();
    match current {
        Ok(Some(raw)) => ApplicationStatus::try_from(raw.as_str()).map_or_else(
            RepositoryError::persistence,
            |actual| RepositoryError::ApplicationStatusConflict {
                application_id,
                expected,
                actual,
            },
        ),
        Ok(None) => RepositoryError::ApplicationNotFound(application_id),
        Err(err) => RepositoryError::persistence(err),
    }
}

/// Loads open-task rows with the filter criteria the query language can
/// express (category, compensation range, search), newest publication
/// first.
fn load_open_task_rows(
    connection: &mut PgConnection,
    filter: &TaskFilter,
) -> RepositoryResult<Vec<TaskRow>> {
    let mut query = tasks::table.into_boxed();
    query = query.filter(tasks::status.eq(TaskStatus::Open.as_str()));

    if let Some(category) = filter.category() {
        query = query.filter(tasks::category.eq(category.as_str().to_owned()));
    }
    if let Some(min) = filter.min_compensation() {
        query = query.filter(tasks::compensation_minor_units.ge(min.minor_units()));
    }
    if let Some(max) = filter.max_compensation() {
        query = query.filter(tasks::compensation_minor_units.le(max.minor_units()));
    }
    if let Some(text) = filter.search() {
        let pattern = format!("%{}%", escape_like(text));
        query = query.filter(
            tasks::title
                .ilike(pattern.clone())
                .or(tasks::description.ilike(pattern)),
        );
    }

    query
        .order(tasks::published_at.desc())
        .select(TaskRow::as_select())
        .load::<TaskRow>(connection)
        .map_err(RepositoryError::from)
}

/// Escapes `LIKE` metacharacters in user-supplied search text.
fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn is_constraint(info: &dyn DatabaseErrorInformation, name: &str) -> bool {
    info.constraint_name().is_some_and(|found| found == name)
}

fn task_to_new_row(task: &Task) -> RepositoryResult<NewTaskRow> {
    let skills =
        serde_json::to_value(task.skills_required()).map_err(RepositoryError::persistence)?;
    let max_applicants = task
        .max_applicants()
        .map(|cap| i32::try_from(cap.value()))
        .transpose()
        .map_err(RepositoryError::persistence)?;

    Ok(NewTaskRow {
        id: task.id().into_inner(),
        organization_id: task.organization_id().into_inner(),
        title: task.title().as_str().to_owned(),
        description: task.description().as_str().to_owned(),
        category: task.category().as_str().to_owned(),
        skills_required: skills,
        compensation_minor_units: task.compensation().amount().minor_units(),
        compensation_kind: task.compensation().kind().as_str().to_owned(),
        deadline: task.deadline(),
        estimated_duration: task.estimated_duration().map(str::to_owned),
        requirements: task.requirements().as_str().to_owned(),
        deliverables: task.deliverables().as_str().to_owned(),
        max_applicants,
        status: task.status().as_str().to_owned(),
        published_at: task.published_at(),
        completed_at: task.completed_at(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn row_to_task(row: TaskRow) -> RepositoryResult<Task> {
    let skills: Vec<String> =
        serde_json::from_value(row.skills_required).map_err(RepositoryError::persistence)?;
    let amount = CompensationAmount::new(row.compensation_minor_units)
        .map_err(RepositoryError::persistence)?;
    let kind = CompensationKind::try_from(row.compensation_kind.as_str())
        .map_err(RepositoryError::persistence)?;
    let max_applicants = row
        .max_applicants
        .map(|value| {
            u32::try_from(value)
                .map_err(RepositoryError::persistence)
                .and_then(|cap| MaxApplicants::new(cap).map_err(RepositoryError::persistence))
        })
        .transpose()?;

    let posting = TaskPosting {
        title: TaskTitle::new(row.title).map_err(RepositoryError::persistence)?,
        description: TaskDescription::new(row.description).map_err(RepositoryError::persistence)?,
        category: Category::new(row.category).map_err(RepositoryError::persistence)?,
        skills_required: SkillSet::new(skills).map_err(RepositoryError::persistence)?,
        compensation: Compensation::new(amount, kind),
        deadline: row.deadline,
        estimated_duration: row.estimated_duration,
        requirements: Requirements::new(row.requirements).map_err(RepositoryError::persistence)?,
        deliverables: Deliverables::new(row.deliverables).map_err(RepositoryError::persistence)?,
        max_applicants,
    };
    let status =
        TaskStatus::try_from(row.status.as_str()).map_err(RepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        organization_id: OrganizationId::from_uuid(row.organization_id),
        posting,
        status,
        published_at: row.published_at,
        completed_at: row.completed_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn application_to_new_row(application: &TaskApplication) -> NewApplicationRow {
    NewApplicationRow {
        id: application.id().into_inner(),
        task_id: application.task_id().into_inner(),
        student_id: application.student_id().into_inner(),
        cover_letter: application.cover_letter().as_str().to_owned(),
        proposed_timeline: application
            .proposed_timeline()
            .map(|timeline| timeline.as_str().to_owned()),
        status: application.status().as_str().to_owned(),
        applied_at: application.applied_at(),
        reviewed_at: application.reviewed_at(),
    }
}

fn row_to_application(row: ApplicationRow) -> RepositoryResult<TaskApplication> {
    let status = ApplicationStatus::try_from(row.status.as_str())
        .map_err(RepositoryError::persistence)?;
    let proposed_timeline = row
        .proposed_timeline
        .map(|timeline| ProposedTimeline::new(timeline).map_err(RepositoryError::persistence))
        .transpose()?;

    Ok(TaskApplication::from_persisted(PersistedApplicationData {
        id: ApplicationId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        student_id: StudentId::from_uuid(row.student_id),
        cover_letter: CoverLetter::new(row.cover_letter).map_err(RepositoryError::persistence)?,
        proposed_timeline,
        status,
        applied_at: row.applied_at,
        reviewed_at: row.reviewed_at,
    }))
}

fn submission_to_new_row(submission: &TaskSubmission) -> RepositoryResult<NewSubmissionRow> {
    let artifacts =
        serde_json::to_value(submission.artifacts()).map_err(RepositoryError::persistence)?;

    Ok(NewSubmissionRow {
        id: submission.id().into_inner(),
        task_id: submission.task_id().into_inner(),
        student_id: submission.student_id().into_inner(),
        description: submission.description().as_str().to_owned(),
        artifact_urls: artifacts,
        is_approved: submission.is_approved(),
        review_notes: submission
            .review_notes()
            .map(|notes| notes.as_str().to_owned()),
        submitted_at: submission.submitted_at(),
        reviewed_at: submission.reviewed_at(),
    })
}

fn row_to_submission(row: SubmissionRow) -> RepositoryResult<TaskSubmission> {
    let raw_urls: Vec<String> =
        serde_json::from_value(row.artifact_urls).map_err(RepositoryError::persistence)?;
    let mut urls = Vec::with_capacity(raw_urls.len());
    for raw in raw_urls {
        urls.push(ArtifactUrl::new(raw).map_err(RepositoryError::persistence)?);
    }
    let artifacts = ArtifactList::new(urls).map_err(RepositoryError::persistence)?;
    let review_notes = row
        .review_notes
        .map(|notes| ReviewNotes::new(notes).map_err(RepositoryError::persistence))
        .transpose()?;

    Ok(TaskSubmission::from_persisted(PersistedSubmissionData {
        id: SubmissionId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        student_id: StudentId::from_uuid(row.student_id),
        description: WorkDescription::new(row.description)
            .map_err(RepositoryError::persistence)?,
        artifacts,
        approved: row.is_approved,
        review_notes,
        submitted_at: row.submitted_at,
        reviewed_at: row.reviewed_at,
    }))
}

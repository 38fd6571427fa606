//! Shared fixtures and builders for marketplace tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use mockable::DefaultClock;

use crate::marketplace::adapters::memory::InMemoryMarketplaceRepository;
use crate::marketplace::domain::{
    CompensationKind, OrganizationId, Session, StudentId, Task, TaskApplication, TaskSubmission,
};
use crate::marketplace::services::{
    ApplicationService, ApplyRequest, CreateTaskRequest, SubmissionReviewService,
    SubmitWorkRequest, TaskLifecycleService,
};

/// Valid posting title.
pub const TITLE: &str = "Design a campus outreach flyer";
/// Valid posting description.
pub const DESCRIPTION: &str = "Design a two-page outreach flyer presenting our tutoring \
     programme to first-year students, including print-ready assets.";
/// Valid posting requirements.
pub const REQUIREMENTS: &str = "Portfolio with at least two print designs.";
/// Valid posting deliverables.
pub const DELIVERABLES: &str = "Print-ready PDF plus editable source files.";
/// Valid application cover letter.
pub const COVER_LETTER: &str = "I have designed flyers and posters for three student societies \
     over the past two years and can share a portfolio of print-ready work that matches the \
     brief closely.";
/// Valid submission description.
pub const WORK_DESCRIPTION: &str = "Final flyer design with print-ready PDF and the editable \
     source files, exported per the brief.";
/// Valid submission artifact link.
pub const ARTIFACT_URL: &str = "https://files.example.org/flyer-final.pdf";

/// Returns a deadline comfortably in the future.
pub fn future_deadline() -> DateTime<Utc> {
    Utc::now() + Duration::days(30)
}

/// Returns a fully valid posting request.
pub fn valid_create_request() -> CreateTaskRequest {
    CreateTaskRequest::new(
        TITLE,
        DESCRIPTION,
        "design",
        vec!["graphic-design".to_owned(), "print".to_owned()],
        150_00,
        CompensationKind::Stipend,
        future_deadline(),
        REQUIREMENTS,
        DELIVERABLES,
    )
}

type Repo = InMemoryMarketplaceRepository;

/// All three services wired over one shared in-memory repository.
pub struct TestHarness {
    /// Task posting and publication service.
    pub tasks: TaskLifecycleService<Repo, DefaultClock>,
    /// Application lifecycle service.
    pub applications: ApplicationService<Repo, DefaultClock>,
    /// Submission review service.
    pub reviews: SubmissionReviewService<Repo, DefaultClock>,
    /// Organization fixture.
    pub org: OrganizationId,
    /// Student fixture.
    pub student: StudentId,
}

impl TestHarness {
    /// Builds a harness over a fresh repository.
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryMarketplaceRepository::new());
        let clock = Arc::new(DefaultClock);
        Self {
            tasks: TaskLifecycleService::new(Arc::clone(&repository), Arc::clone(&clock)),
            applications: ApplicationService::new(Arc::clone(&repository), Arc::clone(&clock)),
            reviews: SubmissionReviewService::new(repository, clock),
            org: OrganizationId::new(),
            student: StudentId::new(),
        }
    }

    /// Session for the fixture organization.
    pub const fn org_session(&self) -> Session {
        Session::organization(self.org)
    }

    /// Session for the fixture student.
    pub const fn student_session(&self) -> Session {
        Session::student(self.student)
    }

    /// Creates and publishes a task owned by the fixture organization.
    pub async fn open_task(&self) -> Task {
        let created = self
            .tasks
            .create_task(&self.org_session(), valid_create_request())
            .await
            .expect("task creation should succeed");
        self.tasks
            .publish_task(&self.org_session(), created.id())
            .await
            .expect("task publication should succeed")
    }

    /// Runs the flow through acceptance: open task, fixture student
    /// applies, organization accepts.
    pub async fn accepted_application(&self) -> (Task, TaskApplication) {
        let task = self.open_task().await;
        let application = self
            .applications
            .apply(
                &self.student_session(),
                task.id(),
                ApplyRequest::new(COVER_LETTER),
            )
            .await
            .expect("application should succeed");
        let accepted = self
            .applications
            .accept_application(&self.org_session(), application.id())
            .await
            .expect("acceptance should succeed");
        let current = self
            .tasks
            .find_task(task.id())
            .await
            .expect("task lookup should succeed")
            .expect("task should exist");
        (current, accepted)
    }

    /// Runs the flow through submission.
    pub async fn submitted_work(&self) -> (Task, TaskSubmission) {
        let (task, _) = self.accepted_application().await;
        let submission = self
            .reviews
            .submit_work(
                &self.student_session(),
                task.id(),
                SubmitWorkRequest::new(WORK_DESCRIPTION, vec![ARTIFACT_URL.to_owned()]),
            )
            .await
            .expect("submission should succeed");
        let current = self
            .tasks
            .find_task(task.id())
            .await
            .expect("task lookup should succeed")
            .expect("task should exist");
        (current, submission)
    }
}

//! Shared helpers for in-memory integration tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use guildhall::marketplace::adapters::memory::InMemoryMarketplaceRepository;
use guildhall::marketplace::domain::{CompensationKind, OrganizationId, Session, StudentId};
use guildhall::marketplace::services::{
    ApplicationService, CreateTaskRequest, SubmissionReviewService, TaskLifecycleService,
};
use mockable::DefaultClock;
use rstest::fixture;

/// Valid application cover letter.
pub const COVER_LETTER: &str = "I have delivered comparable design work for several student \
     societies over the past two years and can share a portfolio of print-ready projects that \
     match this brief closely.";

/// Valid submission description.
pub const WORK_DESCRIPTION: &str = "Final deliverables with print-ready exports and editable \
     source files, prepared exactly per the posted brief.";

/// All three services wired over one shared in-memory repository.
pub struct Marketplace {
    /// Task posting and publication service.
    pub tasks: TaskLifecycleService<InMemoryMarketplaceRepository, DefaultClock>,
    /// Application lifecycle service.
    pub applications: ApplicationService<InMemoryMarketplaceRepository, DefaultClock>,
    /// Submission review service.
    pub reviews: SubmissionReviewService<InMemoryMarketplaceRepository, DefaultClock>,
    /// Organization fixture.
    pub org: OrganizationId,
    /// Student fixture.
    pub student: StudentId,
}

impl Marketplace {
    /// Session for the fixture organization.
    pub const fn org_session(&self) -> Session {
        Session::organization(self.org)
    }

    /// Session for the fixture student.
    pub const fn student_session(&self) -> Session {
        Session::student(self.student)
    }
}

/// Provides a marketplace over a fresh repository for each test.
#[fixture]
pub fn marketplace() -> Marketplace {
    let repository = Arc::new(InMemoryMarketplaceRepository::new());
    let clock = Arc::new(DefaultClock);
    Marketplace {
        tasks: TaskLifecycleService::new(Arc::clone(&repository), Arc::clone(&clock)),
        applications: ApplicationService::new(Arc::clone(&repository), Arc::clone(&clock)),
        reviews: SubmissionReviewService::new(repository, clock),
        org: OrganizationId::new(),
        student: StudentId::new(),
    }
}

/// Returns a deadline comfortably in the future.
pub fn future_deadline() -> DateTime<Utc> {
    Utc::now() + Duration::days(21)
}

/// Returns a fully valid posting request.
pub fn posting_request() -> CreateTaskRequest {
    CreateTaskRequest::new(
        "Translate onboarding guide",
        "Translate our twelve-page student onboarding guide into Spanish, keeping layout and \
         terminology consistent with the existing brand glossary.",
        "translation",
        vec!["spanish".to_owned(), "copy-editing".to_owned()],
        220_00,
        CompensationKind::Stipend,
        future_deadline(),
        "Native-level Spanish and prior translation samples.",
        "Translated document plus a short terminology list.",
    )
}

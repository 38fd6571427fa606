//! Service orchestration tests for work submission and review.

use super::helpers::{TestHarness, ARTIFACT_URL, COVER_LETTER, WORK_DESCRIPTION};
use crate::marketplace::domain::{OrganizationId, Session, StudentId, TaskStatus};
use crate::marketplace::services::{ApplyRequest, ErrorClass, MarketplaceError, SubmitWorkRequest};
use rstest::{fixture, rstest};

#[fixture]
fn harness() -> TestHarness {
    TestHarness::new()
}

fn valid_submission() -> SubmitWorkRequest {
    SubmitWorkRequest::new(WORK_DESCRIPTION, vec![ARTIFACT_URL.to_owned()])
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn accepted_applicant_can_submit_once(harness: TestHarness) {
    let (task, _) = harness.accepted_application().await;

    let submission = harness
        .reviews
        .submit_work(&harness.student_session(), task.id(), valid_submission())
        .await
        .expect("submission should succeed");
    assert!(!submission.is_approved());
    assert_eq!(submission.student_id(), harness.student);

    let current = harness
        .tasks
        .find_task(task.id())
        .await
        .expect("lookup should succeed")
        .expect("task should exist");
    assert_eq!(current.status(), TaskStatus::Submitted);

    let second = harness
        .reviews
        .submit_work(&harness.student_session(), task.id(), valid_submission())
        .await
        .expect_err("second submission should fail");
    assert_eq!(second.class(), ErrorClass::PreconditionFailed);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn submission_requires_the_accepted_application(harness: TestHarness) {
    let (task, _) = harness.accepted_application().await;

    let outsider = Session::student(StudentId::new());
    let err = harness
        .reviews
        .submit_work(&outsider, task.id(), valid_submission())
        .await
        .expect_err("outsider submission should fail");
    assert!(matches!(
        err,
        MarketplaceError::MissingAcceptedApplication { .. }
    ));
    assert_eq!(err.class(), ErrorClass::PreconditionFailed);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pending_applicant_cannot_submit(harness: TestHarness) {
    let task = harness.open_task().await;
    harness
        .applications
        .apply(
            &harness.student_session(),
            task.id(),
            ApplyRequest::new(COVER_LETTER),
        )
        .await
        .expect("application should succeed");

    let err = harness
        .reviews
        .submit_work(&harness.student_session(), task.id(), valid_submission())
        .await
        .expect_err("submission without acceptance should fail");
    assert!(matches!(
        err,
        MarketplaceError::MissingAcceptedApplication { .. }
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn approval_completes_the_task(harness: TestHarness) {
    let (task, _) = harness.submitted_work().await;

    let completed = harness
        .reviews
        .approve_submission(
            &harness.org_session(),
            task.id(),
            Some("Looks great.".to_owned()),
        )
        .await
        .expect("approval should succeed");
    assert_eq!(completed.status(), TaskStatus::Completed);
    assert!(completed.completed_at().is_some());

    let submission = harness
        .reviews
        .find_submission(&harness.org_session(), task.id())
        .await
        .expect("submission lookup should succeed");
    assert!(submission.is_approved());
    assert!(submission.reviewed_at().is_some());
    assert_eq!(
        submission.review_notes().map(|notes| notes.as_str()),
        Some("Looks great.")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_approval_fails_the_state_guard(harness: TestHarness) {
    let (task, _) = harness.submitted_work().await;
    let completed = harness
        .reviews
        .approve_submission(&harness.org_session(), task.id(), None)
        .await
        .expect("first approval should succeed");
    let completed_at = completed.completed_at();

    let err = harness
        .reviews
        .approve_submission(&harness.org_session(), task.id(), None)
        .await
        .expect_err("second approval should fail");
    assert_eq!(err.class(), ErrorClass::PreconditionFailed);

    // Completion was not re-stamped.
    let current = harness
        .tasks
        .find_task(task.id())
        .await
        .expect("lookup should succeed")
        .expect("task should exist");
    assert_eq!(current.completed_at(), completed_at);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn approval_requires_task_ownership(harness: TestHarness) {
    let (task, _) = harness.submitted_work().await;

    let err = harness
        .reviews
        .approve_submission(
            &Session::organization(OrganizationId::new()),
            task.id(),
            None,
        )
        .await
        .expect_err("foreign approval should fail");
    assert_eq!(err.class(), ErrorClass::AuthorizationDenied);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn approval_without_submission_is_rejected(harness: TestHarness) {
    let (task, _) = harness.accepted_application().await;

    let err = harness
        .reviews
        .approve_submission(&harness.org_session(), task.id(), None)
        .await
        .expect_err("approval without submission should fail");
    assert!(matches!(err, MarketplaceError::SubmissionNotFound(_)));
    assert_eq!(err.class(), ErrorClass::EntityNotFound);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn submission_visibility_is_owner_or_submitter(harness: TestHarness) {
    let (task, _) = harness.submitted_work().await;

    harness
        .reviews
        .find_submission(&harness.org_session(), task.id())
        .await
        .expect("owner lookup should succeed");
    harness
        .reviews
        .find_submission(&harness.student_session(), task.id())
        .await
        .expect("submitter lookup should succeed");

    let stranger = harness
        .reviews
        .find_submission(&Session::student(StudentId::new()), task.id())
        .await
        .expect_err("stranger lookup should fail");
    assert_eq!(stranger.class(), ErrorClass::AuthorizationDenied);

    let anonymous = harness
        .reviews
        .find_submission(&Session::Anonymous, task.id())
        .await
        .expect_err("anonymous lookup should fail");
    assert_eq!(anonymous.class(), ErrorClass::AuthenticationRequired);
}

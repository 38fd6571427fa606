//! Full lifecycle integration tests over the in-memory gateway.

use guildhall::marketplace::domain::{
    ApplicationStatus, OrganizationId, Session, StudentId, TaskStatus,
};
use guildhall::marketplace::services::{
    ApplyRequest, ErrorClass, MarketplaceError, SubmitWorkRequest,
};
use rstest::rstest;

use super::helpers::{
    marketplace, posting_request, Marketplace, COVER_LETTER, WORK_DESCRIPTION,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_lifecycle_walks_every_status_in_order(marketplace: Marketplace) {
    let created = marketplace
        .tasks
        .create_task(&marketplace.org_session(), posting_request())
        .await
        .expect("task creation should succeed");
    assert_eq!(created.status(), TaskStatus::Draft);

    let published = marketplace
        .tasks
        .publish_task(&marketplace.org_session(), created.id())
        .await
        .expect("publication should succeed");
    assert_eq!(published.status(), TaskStatus::Open);

    let application = marketplace
        .applications
        .apply(
            &marketplace.student_session(),
            created.id(),
            ApplyRequest::new(COVER_LETTER).with_proposed_timeline("Three weeks."),
        )
        .await
        .expect("application should succeed");
    assert_eq!(application.status(), ApplicationStatus::Pending);

    let accepted = marketplace
        .applications
        .accept_application(&marketplace.org_session(), application.id())
        .await
        .expect("acceptance should succeed");
    assert_eq!(accepted.status(), ApplicationStatus::Accepted);
    let in_progress = marketplace
        .tasks
        .find_task(created.id())
        .await
        .expect("lookup should succeed")
        .expect("task should exist");
    assert_eq!(in_progress.status(), TaskStatus::InProgress);

    let submission = marketplace
        .reviews
        .submit_work(
            &marketplace.student_session(),
            created.id(),
            SubmitWorkRequest::new(
                WORK_DESCRIPTION,
                vec!["https://files.example.org/translation.zip".to_owned()],
            ),
        )
        .await
        .expect("submission should succeed");
    assert!(!submission.is_approved());
    let submitted = marketplace
        .tasks
        .find_task(created.id())
        .await
        .expect("lookup should succeed")
        .expect("task should exist");
    assert_eq!(submitted.status(), TaskStatus::Submitted);

    let completed = marketplace
        .reviews
        .approve_submission(
            &marketplace.org_session(),
            created.id(),
            Some("Accurate and well formatted.".to_owned()),
        )
        .await
        .expect("approval should succeed");
    assert_eq!(completed.status(), TaskStatus::Completed);
    assert!(completed.completed_at().is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_application_leaves_the_first_untouched(marketplace: Marketplace) {
    let task = marketplace
        .tasks
        .create_task(&marketplace.org_session(), posting_request())
        .await
        .expect("task creation should succeed");
    marketplace
        .tasks
        .publish_task(&marketplace.org_session(), task.id())
        .await
        .expect("publication should succeed");

    let first = marketplace
        .applications
        .apply(
            &marketplace.student_session(),
            task.id(),
            ApplyRequest::new(COVER_LETTER),
        )
        .await
        .expect("first application should succeed");

    let err = marketplace
        .applications
        .apply(
            &marketplace.student_session(),
            task.id(),
            ApplyRequest::new(COVER_LETTER),
        )
        .await
        .expect_err("duplicate application should fail");
    assert!(matches!(err, MarketplaceError::DuplicateApplication { .. }));
    assert_eq!(err.class(), ErrorClass::PreconditionFailed);

    let mine = marketplace
        .applications
        .list_student_applications(&marketplace.student_session())
        .await
        .expect("listing should succeed");
    assert_eq!(mine, vec![first]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn foreign_organization_cannot_accept(marketplace: Marketplace) {
    let task = marketplace
        .tasks
        .create_task(&marketplace.org_session(), posting_request())
        .await
        .expect("task creation should succeed");
    marketplace
        .tasks
        .publish_task(&marketplace.org_session(), task.id())
        .await
        .expect("publication should succeed");
    let application = marketplace
        .applications
        .apply(
            &marketplace.student_session(),
            task.id(),
            ApplyRequest::new(COVER_LETTER),
        )
        .await
        .expect("application should succeed");

    let err = marketplace
        .applications
        .accept_application(
            &Session::organization(OrganizationId::new()),
            application.id(),
        )
        .await
        .expect_err("foreign acceptance should fail");
    assert_eq!(err.class(), ErrorClass::AuthorizationDenied);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unaccepted_student_cannot_submit(marketplace: Marketplace) {
    let task = marketplace
        .tasks
        .create_task(&marketplace.org_session(), posting_request())
        .await
        .expect("task creation should succeed");
    marketplace
        .tasks
        .publish_task(&marketplace.org_session(), task.id())
        .await
        .expect("publication should succeed");

    let outsider = Session::student(StudentId::new());
    let err = marketplace
        .reviews
        .submit_work(
            &outsider,
            task.id(),
            SubmitWorkRequest::new(
                WORK_DESCRIPTION,
                vec!["https://files.example.org/out.zip".to_owned()],
            ),
        )
        .await
        .expect_err("submission without acceptance should fail");
    assert!(matches!(
        err,
        MarketplaceError::MissingAcceptedApplication { .. }
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn approval_is_not_repeatable(marketplace: Marketplace) {
    let task = marketplace
        .tasks
        .create_task(&marketplace.org_session(), posting_request())
        .await
        .expect("task creation should succeed");
    marketplace
        .tasks
        .publish_task(&marketplace.org_session(), task.id())
        .await
        .expect("publication should succeed");
    let application = marketplace
        .applications
        .apply(
            &marketplace.student_session(),
            task.id(),
            ApplyRequest::new(COVER_LETTER),
        )
        .await
        .expect("application should succeed");
    marketplace
        .applications
        .accept_application(&marketplace.org_session(), application.id())
        .await
        .expect("acceptance should succeed");
    marketplace
        .reviews
        .submit_work(
            &marketplace.student_session(),
            task.id(),
            SubmitWorkRequest::new(
                WORK_DESCRIPTION,
                vec!["https://files.example.org/final.zip".to_owned()],
            ),
        )
        .await
        .expect("submission should succeed");

    marketplace
        .reviews
        .approve_submission(&marketplace.org_session(), task.id(), None)
        .await
        .expect("first approval should succeed");

    let err = marketplace
        .reviews
        .approve_submission(&marketplace.org_session(), task.id(), None)
        .await
        .expect_err("second approval should fail");
    assert_eq!(err.class(), ErrorClass::PreconditionFailed);
}

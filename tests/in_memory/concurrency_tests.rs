//! Racing lifecycle transitions against the atomic gateway.

use std::sync::Arc;

use guildhall::marketplace::domain::{ApplicationStatus, Session, StudentId, TaskStatus};
use guildhall::marketplace::services::{ApplyRequest, ErrorClass, SubmitWorkRequest};
use rstest::rstest;

use super::helpers::{marketplace, posting_request, Marketplace, COVER_LETTER, WORK_DESCRIPTION};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn racing_acceptances_decide_exactly_one_application(marketplace: Marketplace) {
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

    let mut application_ids = Vec::new();
    for _ in 0..4 {
        let applicant = Session::student(StudentId::new());
        let application = marketplace
            .applications
            .apply(&applicant, task.id(), ApplyRequest::new(COVER_LETTER))
            .await
            .expect("application should succeed");
        application_ids.push(application.id());
    }

    let org_session = marketplace.org_session();
    let applications = Arc::new(marketplace.applications);
    let mut handles = Vec::new();
    for application_id in application_ids {
        let service = Arc::clone(&applications);
        handles.push(tokio::spawn(async move {
            service.accept_application(&org_session, application_id).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        let outcome = handle.await.expect("acceptance task should not panic");
        match outcome {
            Ok(accepted) => {
                successes += 1;
                assert_eq!(accepted.status(), ApplicationStatus::Accepted);
            }
            Err(err) => assert_eq!(err.class(), ErrorClass::PreconditionFailed),
        }
    }
    assert_eq!(successes, 1, "exactly one acceptance must win the race");

    let current = marketplace
        .tasks
        .find_task(task.id())
        .await
        .expect("lookup should succeed")
        .expect("task should exist");
    assert_eq!(current.status(), TaskStatus::InProgress);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn racing_duplicate_applications_store_exactly_one(marketplace: Marketplace) {
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

    let student_session = marketplace.student_session();
    let applications = Arc::new(marketplace.applications);
    let mut handles = Vec::new();
    for _ in 0..4 {
        let service = Arc::clone(&applications);
        let task_id = task.id();
        handles.push(tokio::spawn(async move {
            service
                .apply(&student_session, task_id, ApplyRequest::new(COVER_LETTER))
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.expect("apply task should not panic").is_ok() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1, "the pair constraint must admit one application");

    let mine = applications
        .list_student_applications(&student_session)
        .await
        .expect("listing should succeed");
    assert_eq!(mine.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn racing_submissions_record_exactly_one(marketplace: Marketplace) {
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

    let student_session = marketplace.student_session();
    let reviews = Arc::new(marketplace.reviews);
    let mut handles = Vec::new();
    for n in 0..3 {
        let service = Arc::clone(&reviews);
        let task_id = task.id();
        handles.push(tokio::spawn(async move {
            service
                .submit_work(
                    &student_session,
                    task_id,
                    SubmitWorkRequest::new(
                        WORK_DESCRIPTION,
                        vec![format!("https://files.example.org/final-{n}.zip")],
                    ),
                )
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.expect("submit task should not panic").is_ok() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1, "the task accepts exactly one submission");

    let current = marketplace
        .tasks
        .find_task(task.id())
        .await
        .expect("lookup should succeed")
        .expect("task should exist");
    assert_eq!(current.status(), TaskStatus::Submitted);
}

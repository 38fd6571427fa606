//! Unit tests for domain value validation and aggregate transitions.

use super::helpers::{self, COVER_LETTER, DESCRIPTION, TITLE};
use crate::marketplace::domain::{
    ArtifactList, ArtifactUrl, Category, Compensation, CompensationAmount, CompensationKind,
    CoverLetter, Deliverables, DomainError, MaxApplicants, OrganizationId, PageInfo, PageRequest,
    ProposedTimeline, Requirements, ReviewNotes, SkillSet, StudentId, Task, TaskApplication,
    TaskDescription, TaskPosting, TaskStatus, TaskSubmission, TaskTitle, WorkDescription,
};
use chrono::{Duration, Utc};
use mockable::{Clock, DefaultClock};
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

fn valid_posting() -> TaskPosting {
    TaskPosting {
        title: TaskTitle::new(TITLE).expect("valid title"),
        description: TaskDescription::new(DESCRIPTION).expect("valid description"),
        category: Category::new("design").expect("valid category"),
        skills_required: SkillSet::new(vec!["print".to_owned()]).expect("valid skills"),
        compensation: Compensation::new(
            CompensationAmount::new(150_00).expect("valid amount"),
            CompensationKind::Stipend,
        ),
        deadline: helpers::future_deadline(),
        estimated_duration: None,
        requirements: Requirements::new(helpers::REQUIREMENTS).expect("valid requirements"),
        deliverables: Deliverables::new(helpers::DELIVERABLES).expect("valid deliverables"),
        max_applicants: None,
    }
}

fn draft_task(clock: &DefaultClock) -> Task {
    Task::post(OrganizationId::new(), valid_posting(), clock).expect("valid posting")
}

// ── Field validation ────────────────────────────────────────────────

#[rstest]
#[case("Too short")]
#[case("")]
fn task_title_rejects_out_of_range_values(#[case] raw: &str) {
    assert!(matches!(
        TaskTitle::new(raw),
        Err(DomainError::TitleLength { .. })
    ));
}

#[test]
fn task_title_trims_surrounding_whitespace() {
    let title = TaskTitle::new(format!("  {TITLE}  ")).expect("valid title");
    assert_eq!(title.as_str(), TITLE);
}

#[test]
fn task_description_rejects_short_values() {
    assert!(matches!(
        TaskDescription::new("Just a couple of words."),
        Err(DomainError::DescriptionLength { .. })
    ));
}

#[test]
fn category_rejects_blank_values() {
    assert_eq!(Category::new("   "), Err(DomainError::EmptyCategory));
}

#[test]
fn skill_set_rejects_empty_collection() {
    assert_eq!(
        SkillSet::new(Vec::new()),
        Err(DomainError::NoSkillsRequired)
    );
}

#[test]
fn skill_set_rejects_blank_entry() {
    assert_eq!(
        SkillSet::new(vec!["print".to_owned(), "  ".to_owned()]),
        Err(DomainError::EmptySkill)
    );
}

#[test]
fn skill_set_rejects_oversized_collection() {
    let skills: Vec<String> = (0..11).map(|n| format!("skill-{n}")).collect();
    assert!(matches!(
        SkillSet::new(skills),
        Err(DomainError::TooManySkills { actual: 11, .. })
    ));
}

#[test]
fn skill_overlap_matches_any_shared_entry() {
    let skills =
        SkillSet::new(vec!["print".to_owned(), "layout".to_owned()]).expect("valid skills");
    assert!(skills.overlaps(&["layout".to_owned(), "copywriting".to_owned()]));
    assert!(!skills.overlaps(&["copywriting".to_owned()]));
}

#[rstest]
#[case(0)]
#[case(-150_00)]
#[case(CompensationAmount::MAX_MINOR_UNITS + 1)]
fn compensation_amount_rejects_out_of_range_values(#[case] minor_units: i64) {
    assert_eq!(
        CompensationAmount::new(minor_units),
        Err(DomainError::CompensationOutOfRange(minor_units))
    );
}

#[test]
fn max_applicants_rejects_zero() {
    assert_eq!(MaxApplicants::new(0), Err(DomainError::MaxApplicantsZero));
}

#[test]
fn cover_letter_rejects_short_values() {
    assert!(matches!(
        CoverLetter::new("I am interested."),
        Err(DomainError::CoverLetterLength { .. })
    ));
}

#[test]
fn cover_letter_accepts_valid_values() {
    let letter = CoverLetter::new(COVER_LETTER).expect("valid cover letter");
    assert_eq!(letter.as_str(), COVER_LETTER.trim());
}

#[test]
fn proposed_timeline_rejects_oversized_values() {
    let raw = "x".repeat(501);
    assert!(matches!(
        ProposedTimeline::new(raw),
        Err(DomainError::TimelineTooLong { actual: 501, .. })
    ));
}

#[test]
fn work_description_rejects_short_values() {
    assert!(matches!(
        WorkDescription::new("Done, see link."),
        Err(DomainError::WorkDescriptionLength { .. })
    ));
}

#[test]
fn review_notes_rejects_oversized_values() {
    let raw = "x".repeat(1001);
    assert!(matches!(
        ReviewNotes::new(raw),
        Err(DomainError::ReviewNotesTooLong { actual: 1001, .. })
    ));
}

#[rstest]
#[case("ftp://files.example.org/final.zip")]
#[case("not a url")]
#[case("/relative/path.pdf")]
fn artifact_url_rejects_non_http_links(#[case] raw: &str) {
    assert!(matches!(
        ArtifactUrl::new(raw),
        Err(DomainError::InvalidArtifactUrl(_))
    ));
}

#[test]
fn artifact_list_bounds_are_enforced() {
    assert_eq!(ArtifactList::new(Vec::new()), Err(DomainError::NoArtifacts));

    let urls: Vec<ArtifactUrl> = (0..11)
        .map(|n| {
            ArtifactUrl::new(format!("https://files.example.org/{n}.pdf")).expect("valid url")
        })
        .collect();
    assert!(matches!(
        ArtifactList::new(urls),
        Err(DomainError::TooManyArtifacts { actual: 11, .. })
    ));
}

#[test]
fn page_request_rejects_zero_bounds() {
    assert_eq!(PageRequest::new(0, 20), Err(DomainError::ZeroPageBound));
    assert_eq!(PageRequest::new(1, 0), Err(DomainError::ZeroPageBound));
}

#[test]
fn page_info_rounds_page_count_up() {
    let request = PageRequest::new(2, 20).expect("valid page request");
    let info = PageInfo::compute(&request, 41);
    assert_eq!(info.total_pages, 3);
    assert_eq!(info.page, 2);

    let empty = PageInfo::compute(&request, 0);
    assert_eq!(empty.total_pages, 0);
}

// ── Task aggregate ──────────────────────────────────────────────────

#[rstest]
fn posting_with_past_deadline_is_rejected(clock: DefaultClock) {
    let mut posting = valid_posting();
    posting.deadline = Utc::now() - Duration::hours(1);
    let deadline = posting.deadline;
    let result = Task::post(OrganizationId::new(), posting, &clock);
    assert_eq!(result, Err(DomainError::DeadlineNotInFuture(deadline)));
}

#[rstest]
fn new_task_starts_in_draft_without_publication(clock: DefaultClock) {
    let task = draft_task(&clock);
    assert_eq!(task.status(), TaskStatus::Draft);
    assert!(task.published_at().is_none());
    assert!(task.completed_at().is_none());
}

#[rstest]
fn publish_stamps_publication_time(clock: DefaultClock) {
    let mut task = draft_task(&clock);
    task.publish(&clock).expect("publish should succeed");
    assert_eq!(task.status(), TaskStatus::Open);
    assert_eq!(task.published_at(), Some(task.updated_at()));
}

#[rstest]
fn full_forward_walk_stamps_completion(clock: DefaultClock) {
    let mut task = draft_task(&clock);
    task.publish(&clock).expect("publish should succeed");
    task.start(&clock).expect("start should succeed");
    task.mark_submitted(&clock).expect("submit should succeed");
    task.complete(&clock).expect("complete should succeed");
    assert_eq!(task.status(), TaskStatus::Completed);
    assert_eq!(task.completed_at(), Some(task.updated_at()));
}

#[rstest]
fn draft_task_cannot_complete_directly(clock: DefaultClock) {
    let mut task = draft_task(&clock);
    let task_id = task.id();
    let result = task.complete(&clock);
    assert_eq!(
        result,
        Err(DomainError::InvalidTaskTransition {
            task_id,
            from: TaskStatus::Draft,
            to: TaskStatus::Completed,
        })
    );
    assert_eq!(task.status(), TaskStatus::Draft);
}

#[rstest]
fn submitted_task_cannot_be_cancelled(clock: DefaultClock) {
    let mut task = draft_task(&clock);
    task.publish(&clock).expect("publish should succeed");
    task.start(&clock).expect("start should succeed");
    task.mark_submitted(&clock).expect("submit should succeed");

    let result = task.cancel(&clock);
    assert!(matches!(
        result,
        Err(DomainError::InvalidTaskTransition { .. })
    ));
    assert_eq!(task.status(), TaskStatus::Submitted);
}

// ── Application aggregate ───────────────────────────────────────────

fn pending_application(clock: &DefaultClock) -> TaskApplication {
    TaskApplication::new(
        crate::marketplace::domain::TaskId::new(),
        StudentId::new(),
        CoverLetter::new(COVER_LETTER).expect("valid cover letter"),
        None,
        clock,
    )
}

#[rstest]
fn accepting_stamps_review_time(clock: DefaultClock) {
    let mut application = pending_application(&clock);
    assert!(application.reviewed_at().is_none());

    application.accept(&clock).expect("accept should succeed");
    assert!(application.reviewed_at().is_some());
}

#[rstest]
fn decided_application_rejects_second_decision(clock: DefaultClock) {
    let mut application = pending_application(&clock);
    application.reject(&clock).expect("reject should succeed");

    let result = application.accept(&clock);
    assert!(matches!(
        result,
        Err(DomainError::InvalidApplicationTransition { .. })
    ));
}

#[rstest]
fn withdrawal_only_from_pending(clock: DefaultClock) {
    let mut application = pending_application(&clock);
    application.accept(&clock).expect("accept should succeed");

    let result = application.withdraw(&clock);
    assert!(matches!(
        result,
        Err(DomainError::InvalidApplicationTransition { .. })
    ));
}

// ── Submission aggregate ────────────────────────────────────────────

#[rstest]
fn submission_approval_is_single_shot(clock: DefaultClock) {
    let mut submission = TaskSubmission::new(
        crate::marketplace::domain::TaskId::new(),
        StudentId::new(),
        WorkDescription::new(helpers::WORK_DESCRIPTION).expect("valid description"),
        ArtifactList::new(vec![
            ArtifactUrl::new(helpers::ARTIFACT_URL).expect("valid url"),
        ])
        .expect("valid artifacts"),
        &clock,
    );
    let submission_id = submission.id();

    submission
        .approve(Some(ReviewNotes::new("Looks great.").expect("valid notes")), &clock)
        .expect("first approval should succeed");
    assert!(submission.is_approved());
    assert!(submission.reviewed_at().is_some());

    let second = submission.approve(None, &clock);
    assert_eq!(
        second,
        Err(DomainError::SubmissionAlreadyApproved(submission_id))
    );
}

#[rstest]
fn clock_timestamps_are_monotonic_for_aggregates(clock: DefaultClock) {
    let before = clock.utc();
    let task = draft_task(&clock);
    assert!(task.created_at() >= before);
    assert_eq!(task.created_at(), task.updated_at());
}

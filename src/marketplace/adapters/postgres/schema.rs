//! Diesel schema for marketplace persistence.

diesel::table! {
    /// Task postings.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning organization.
        organization_id -> Uuid,
        /// Task title.
        #[max_length = 200]
        title -> Varchar,
        /// Task description.
        description -> Text,
        /// Task category.
        #[max_length = 100]
        category -> Varchar,
        /// Required skills as a JSON array of strings.
        skills_required -> Jsonb,
        /// Compensation amount in minor currency units.
        compensation_minor_units -> BigInt,
        /// Compensation kind.
        #[max_length = 50]
        compensation_kind -> Varchar,
        /// Completion deadline.
        deadline -> Timestamptz,
        /// Free-form estimated duration.
        #[max_length = 255]
        estimated_duration -> Nullable<Varchar>,
        /// What the applicant must bring.
        requirements -> Text,
        /// What the applicant must deliver.
        deliverables -> Text,
        /// Optional applicant cap.
        max_applicants -> Nullable<Integer>,
        /// Task lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Publication timestamp.
        published_at -> Nullable<Timestamptz>,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Student applications, unique per (task, student).
    task_applications (id) {
        /// Application identifier.
        id -> Uuid,
        /// Target task.
        task_id -> Uuid,
        /// Applying student.
        student_id -> Uuid,
        /// Cover letter.
        cover_letter -> Text,
        /// Optional proposed timeline.
        proposed_timeline -> Nullable<Text>,
        /// Application lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Application timestamp.
        applied_at -> Timestamptz,
        /// Decision timestamp.
        reviewed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Work submissions, at most one per task.
    task_submissions (id) {
        /// Submission identifier.
        id -> Uuid,
        /// Target task.
        task_id -> Uuid,
        /// Submitting student.
        student_id -> Uuid,
        /// Work description.
        description -> Text,
        /// Artifact links as a JSON array of strings.
        artifact_urls -> Jsonb,
        /// Approval flag.
        is_approved -> Bool,
        /// Optional review notes.
        review_notes -> Nullable<Text>,
        /// Submission timestamp.
        submitted_at -> Timestamptz,
        /// Review timestamp.
        reviewed_at -> Nullable<Timestamptz>,
    }
}

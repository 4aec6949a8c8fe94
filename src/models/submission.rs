use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::submission::{
    NewSubmission as DomainNewSubmission, Submission as DomainSubmission,
};
use crate::domain::types::SubmissionStatus;
use crate::repository::errors::RepositoryError;

/// Diesel model representing the `temple_submissions` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::temple_submissions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Submission {
    pub id: i32,
    /// JSON document with the proposed temple fields.
    pub temple_data: String,
    pub status: String,
    pub submitted_by: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::temple_submissions)]
pub struct NewSubmission {
    pub temple_data: String,
    pub status: String,
    pub submitted_by: Option<String>,
}

impl TryFrom<Submission> for DomainSubmission {
    type Error = RepositoryError;

    fn try_from(submission: Submission) -> Result<Self, Self::Error> {
        Ok(Self {
            id: submission.id.try_into()?,
            temple_data: serde_json::from_str(&submission.temple_data)?,
            status: SubmissionStatus::try_from(submission.status)?,
            submitted_by: submission.submitted_by,
            created_at: submission.created_at,
        })
    }
}

impl TryFrom<&DomainNewSubmission> for NewSubmission {
    type Error = RepositoryError;

    fn try_from(submission: &DomainNewSubmission) -> Result<Self, Self::Error> {
        Ok(Self {
            temple_data: serde_json::to_string(&submission.temple_data)?,
            status: SubmissionStatus::Pending.as_str().to_string(),
            submitted_by: submission.submitted_by.clone(),
        })
    }
}

use std::collections::HashMap;

use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::domain::submission::{NewSubmission, Submission};
use crate::domain::temple::{NewTemple, Temple};
use crate::domain::types::{SubmissionId, SubmissionStatus};
use crate::models::submission::{NewSubmission as DbNewSubmission, Submission as DbSubmission};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::temple::{find_by_english_name, insert_temple};
use crate::repository::{DieselRepository, SubmissionListQuery, SubmissionReader, SubmissionWriter};

impl SubmissionReader for DieselRepository {
    fn list_submissions(
        &self,
        query: SubmissionListQuery,
    ) -> RepositoryResult<(usize, Vec<Submission>)> {
        use crate::schema::temple_submissions;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = temple_submissions::table.into_boxed::<diesel::sqlite::Sqlite>();

            if let Some(status) = query.status {
                items = items.filter(temple_submissions::status.eq(status.as_str()));
            }

            if let Some(user) = &query.submitted_by {
                items = items.filter(temple_submissions::submitted_by.eq(user.clone()));
            }

            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)?;
        let total = usize::try_from(total).unwrap_or_default();

        let mut items = query_builder();
        if let Some(pagination) = &query.pagination {
            items = items
                .offset(pagination.offset_i64())
                .limit(pagination.limit_i64());
        }

        let items = items
            .order((
                temple_submissions::created_at.desc(),
                temple_submissions::id.desc(),
            ))
            .load::<DbSubmission>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Submission>, _>>()?;

        Ok((total, items))
    }

    fn get_submission_by_id(&self, id: SubmissionId) -> RepositoryResult<Option<Submission>> {
        use crate::schema::temple_submissions;

        let mut conn = self.conn()?;

        let submission = temple_submissions::table
            .filter(temple_submissions::id.eq(id.get()))
            .first::<DbSubmission>(&mut conn)
            .optional()?;

        let submission = submission.map(TryInto::try_into).transpose()?;
        Ok(submission)
    }

    fn count_submissions_by_status(&self) -> RepositoryResult<HashMap<SubmissionStatus, usize>> {
        use crate::schema::temple_submissions;

        let mut conn = self.conn()?;

        let rows: Vec<(String, i64)> = temple_submissions::table
            .group_by(temple_submissions::status)
            .select((temple_submissions::status, diesel::dsl::count_star()))
            .load(&mut conn)?;

        let mut counts = SubmissionStatus::ALL
            .into_iter()
            .map(|status| (status, 0))
            .collect::<HashMap<_, _>>();
        for (status, count) in rows {
            let status = SubmissionStatus::try_from(status)?;
            counts.insert(status, count as usize);
        }

        Ok(counts)
    }
}

impl SubmissionWriter for DieselRepository {
    fn create_submission(&self, submission: &NewSubmission) -> RepositoryResult<Submission> {
        use crate::schema::temple_submissions;

        let mut conn = self.conn()?;
        let db_submission = DbNewSubmission::try_from(submission)?;

        let row = diesel::insert_into(temple_submissions::table)
            .values(&db_submission)
            .returning(DbSubmission::as_returning())
            .get_result(&mut conn)?;

        row.try_into()
    }

    fn publish_submission(
        &self,
        id: SubmissionId,
        temple: &NewTemple,
    ) -> RepositoryResult<Temple> {
        use crate::schema::temple_submissions;

        let mut conn = self.conn()?;

        // IMMEDIATE takes the write lock up front, so the name check below
        // sees every temple committed before this insert.
        let published = conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let updated = diesel::update(
                temple_submissions::table
                    .filter(temple_submissions::id.eq(id.get()))
                    .filter(temple_submissions::status.eq(SubmissionStatus::Pending.as_str())),
            )
            .set(temple_submissions::status.eq(SubmissionStatus::Approved.as_str()))
            .execute(conn)?;

            if updated == 0 {
                return Err(RepositoryError::Conflict(format!(
                    "submission {id} is no longer pending"
                )));
            }

            if let Some(existing) = find_by_english_name(conn, &temple.name.english)? {
                return Err(RepositoryError::DuplicateName {
                    existing_id: existing.id,
                    existing_name: existing.name.english,
                });
            }

            insert_temple(conn, temple)
        });

        match published {
            Err(RepositoryError::DatabaseError(
                err @ DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _),
            )) => match find_by_english_name(&mut conn, &temple.name.english)? {
                Some(existing) => Err(RepositoryError::DuplicateName {
                    existing_id: existing.id,
                    existing_name: existing.name.english,
                }),
                None => Err(RepositoryError::DatabaseError(err)),
            },
            other => other,
        }
    }

    fn set_submission_status(
        &self,
        id: SubmissionId,
        from: SubmissionStatus,
        to: SubmissionStatus,
    ) -> RepositoryResult<()> {
        use crate::schema::temple_submissions;

        let mut conn = self.conn()?;

        let updated = diesel::update(
            temple_submissions::table
                .filter(temple_submissions::id.eq(id.get()))
                .filter(temple_submissions::status.eq(from.as_str())),
        )
        .set(temple_submissions::status.eq(to.as_str()))
        .execute(&mut conn)?;

        if updated == 0 {
            return Err(RepositoryError::Conflict(format!(
                "submission {id} is not {from}"
            )));
        }
        Ok(())
    }
}

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::db::{DbConnection, DbPool};
use crate::domain::festival::{Festival, NewFestival};
use crate::domain::submission::{NewSubmission, Submission};
use crate::domain::temple::{NewTemple, Temple};
use crate::domain::types::{FestivalId, SubmissionId, SubmissionStatus, TempleId, TempleType};
use crate::pagination::Pagination;
use crate::repository::errors::RepositoryResult;

pub mod errors;
pub mod festival;
pub mod submission;
pub mod temple;

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Sort order of [`TempleListQuery`] results. Ties break on id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TempleOrder {
    /// Alphabetical by English name.
    #[default]
    Name,
    NewestFirst,
    /// Creation order, as the featured selector reads the catalog.
    OldestFirst,
}

/// Query parameters used when listing published temples.
#[derive(Debug, Clone, Default)]
pub struct TempleListQuery {
    /// Case-insensitive substring match on the English name.
    pub search: Option<String>,
    pub temple_type: Option<TempleType>,
    pub order: TempleOrder,
    pub pagination: Option<Pagination>,
}

impl TempleListQuery {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
    pub fn temple_type(mut self, temple_type: TempleType) -> Self {
        self.temple_type = Some(temple_type);
        self
    }
    pub fn newest_first(mut self) -> Self {
        self.order = TempleOrder::NewestFirst;
        self
    }
    pub fn oldest_first(mut self) -> Self {
        self.order = TempleOrder::OldestFirst;
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Query parameters for the moderation queue.
#[derive(Debug, Clone, Default)]
pub struct SubmissionListQuery {
    pub status: Option<SubmissionStatus>,
    pub submitted_by: Option<String>,
    pub pagination: Option<Pagination>,
}

impl SubmissionListQuery {
    pub fn status(mut self, status: SubmissionStatus) -> Self {
        self.status = Some(status);
        self
    }
    pub fn submitted_by(mut self, user: impl Into<String>) -> Self {
        self.submitted_by = Some(user.into());
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Read-only operations for published temples.
pub trait TempleReader {
    /// List temples (with their festivals) matching the query.
    fn list_temples(&self, query: TempleListQuery) -> RepositoryResult<(usize, Vec<Temple>)>;
    /// Retrieve a temple and its festivals by identifier.
    fn get_temple_by_id(&self, id: TempleId) -> RepositoryResult<Option<Temple>>;
    /// Case-insensitive lookup on the canonical English name, compared by
    /// [`crate::domain::temple::english_name_key`].
    fn find_temple_by_english_name(&self, name: &str) -> RepositoryResult<Option<Temple>>;
}

/// Write operations for published temples.
pub trait TempleWriter {
    fn create_temple(&self, temple: &NewTemple) -> RepositoryResult<Temple>;
    /// Insert many temples in one transaction.
    fn create_temples(&self, temples: &[NewTemple]) -> RepositoryResult<usize>;
    fn update_temple(&self, id: TempleId, temple: &NewTemple) -> RepositoryResult<usize>;
    /// Delete a temple; its festivals go with it.
    fn delete_temple(&self, id: TempleId) -> RepositoryResult<usize>;
    /// Set `is_open` on every listed temple.
    fn set_temples_open(&self, ids: &[TempleId], is_open: bool) -> RepositoryResult<usize>;
}

pub trait FestivalReader {
    /// Festivals ordered by date, optionally for one temple.
    fn list_festivals(&self, temple_id: Option<TempleId>) -> RepositoryResult<Vec<Festival>>;
    fn get_festival_by_id(&self, id: FestivalId) -> RepositoryResult<Option<Festival>>;
}

pub trait FestivalWriter {
    fn create_festival(&self, festival: &NewFestival) -> RepositoryResult<Festival>;
    fn update_festival(&self, id: FestivalId, festival: &NewFestival) -> RepositoryResult<usize>;
    fn delete_festival(&self, id: FestivalId) -> RepositoryResult<usize>;
    fn set_festival_active(&self, id: FestivalId, is_active: bool) -> RepositoryResult<usize>;
    fn set_festival_date(&self, id: FestivalId, date: NaiveDate) -> RepositoryResult<usize>;
}

/// Read-only operations for user submissions.
pub trait SubmissionReader {
    /// Newest first.
    fn list_submissions(
        &self,
        query: SubmissionListQuery,
    ) -> RepositoryResult<(usize, Vec<Submission>)>;
    fn get_submission_by_id(&self, id: SubmissionId) -> RepositoryResult<Option<Submission>>;
    /// Number of submissions in each status. Missing statuses count as zero.
    fn count_submissions_by_status(&self) -> RepositoryResult<HashMap<SubmissionStatus, usize>>;
}

/// Write operations for user submissions.
pub trait SubmissionWriter {
    /// Store a new `pending` submission.
    fn create_submission(&self, submission: &NewSubmission) -> RepositoryResult<Submission>;
    /// Insert `temple` and mark the submission approved atomically.
    ///
    /// Writes nothing and fails with [`errors::RepositoryError::Conflict`]
    /// when the submission is no longer pending, or with
    /// [`errors::RepositoryError::DuplicateName`] when a temple with the same
    /// English name was published first.
    fn publish_submission(&self, id: SubmissionId, temple: &NewTemple)
    -> RepositoryResult<Temple>;
    /// Move a submission from `from` to `to`, failing with
    /// [`errors::RepositoryError::Conflict`] when it is not in `from`.
    fn set_submission_status(
        &self,
        id: SubmissionId,
        from: SubmissionStatus,
        to: SubmissionStatus,
    ) -> RepositoryResult<()>;
}

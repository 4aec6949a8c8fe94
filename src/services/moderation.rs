//! Submission moderation: review, approve and reject.
//!
//! A submission is published only when its proposed data passes every check
//! in [`review_submission`]. Checks run in a fixed order and the first
//! failure is reported; a failed approval never touches the catalog and
//! leaves the submission pending.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::name_rules::{InvalidNameReason, check_name};
use crate::domain::submission::{Submission, SubmissionPayload};
use crate::domain::temple::{NewTemple, Temple};
use crate::domain::types::{RegionCode, SubmissionId, SubmissionStatus, TempleId};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::errors::RepositoryError;
use crate::repository::{SubmissionListQuery, SubmissionReader, SubmissionWriter, TempleReader};
use crate::services::{ServiceError, ServiceResult, require_admin};

/// Reasons a moderation action was refused.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModerationError {
    #[error("temple name is required")]
    EmptyName,
    #[error("\"{name}\" is not a valid temple name: {reason}")]
    InvalidName {
        name: String,
        reason: InvalidNameReason,
    },
    #[error("a temple named \"{existing_name}\" already exists (id {existing_id})")]
    DuplicateName {
        name: String,
        existing_id: TempleId,
        existing_name: String,
    },
    #[error("district and state are required")]
    MissingLocation,
    #[error("failed to publish temple: {0}")]
    PublishFailure(String),
    #[error("submission is already {from} and cannot become {to}")]
    InvalidTransition {
        from: SubmissionStatus,
        to: SubmissionStatus,
    },
    #[error("submission not found")]
    NotFound,
    #[error("unauthorized")]
    Unauthorized,
    #[error("internal error")]
    Internal,
}

impl ModerationError {
    /// Problems with the submitted data that a moderator can fix or reject.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyName
                | Self::InvalidName { .. }
                | Self::DuplicateName { .. }
                | Self::MissingLocation
        )
    }

    /// Transient failures where repeating the action may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PublishFailure(_))
    }

    /// Stable identifier for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyName => "empty_name",
            Self::InvalidName { .. } => "invalid_name",
            Self::DuplicateName { .. } => "duplicate_name",
            Self::MissingLocation => "missing_location",
            Self::PublishFailure(_) => "publish_failure",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::Internal => "internal",
        }
    }
}

impl From<ModerationError> for ServiceError {
    fn from(value: ModerationError) -> Self {
        match value {
            ModerationError::NotFound => ServiceError::NotFound,
            ModerationError::Unauthorized => ServiceError::Unauthorized,
            ModerationError::Internal => ServiceError::Internal,
            ModerationError::InvalidTransition { .. } => ServiceError::Conflict(value.to_string()),
            other => ServiceError::Form(other.to_string()),
        }
    }
}

/// Runs the publish checks without writing anything.
///
/// On success returns the temple that approval would insert.
pub fn review_submission<R>(
    payload: &SubmissionPayload,
    repo: &R,
) -> Result<NewTemple, ModerationError>
where
    R: TempleReader,
{
    let name = payload.english_name();
    if name.is_empty() {
        return Err(ModerationError::EmptyName);
    }

    if let Err(reason) = check_name(name) {
        return Err(ModerationError::InvalidName {
            name: name.to_string(),
            reason,
        });
    }

    match repo.find_temple_by_english_name(name) {
        Ok(Some(existing)) => {
            return Err(ModerationError::DuplicateName {
                name: name.to_string(),
                existing_id: existing.id,
                existing_name: existing.name.english,
            });
        }
        Ok(None) => {}
        Err(e) => {
            log::error!("Failed to check for duplicate temple name: {e}");
            return Err(ModerationError::Internal);
        }
    }

    let state_known = payload
        .state()
        .is_some_and(|s| RegionCode::try_from(s).is_ok());
    if payload.district().is_none() || !state_known {
        return Err(ModerationError::MissingLocation);
    }

    payload.clone().into_new_temple().map_err(|e| {
        log::error!("Submission passed review but failed conversion: {e}");
        ModerationError::MissingLocation
    })
}

fn load_submission<R>(id: SubmissionId, repo: &R) -> Result<Submission, ModerationError>
where
    R: SubmissionReader,
{
    match repo.get_submission_by_id(id) {
        Ok(Some(submission)) => Ok(submission),
        Ok(None) => Err(ModerationError::NotFound),
        Err(e) => {
            log::error!("Failed to load submission {id}: {e}");
            Err(ModerationError::Internal)
        }
    }
}

/// Reports the transition a lost race left behind.
fn concurrent_transition<R>(
    id: SubmissionId,
    to: SubmissionStatus,
    repo: &R,
) -> ModerationError
where
    R: SubmissionReader,
{
    match repo.get_submission_by_id(id) {
        Ok(Some(submission)) => ModerationError::InvalidTransition {
            from: submission.status,
            to,
        },
        Ok(None) => ModerationError::NotFound,
        Err(e) => {
            log::error!("Failed to reload submission {id} after a lost update: {e}");
            ModerationError::Internal
        }
    }
}

/// Publishes a pending submission as a new temple.
pub fn approve_submission<R>(
    id: SubmissionId,
    user: &AuthenticatedUser,
    repo: &R,
) -> Result<Temple, ModerationError>
where
    R: SubmissionReader + SubmissionWriter + TempleReader,
{
    require_admin(user).map_err(|_| ModerationError::Unauthorized)?;

    let submission = load_submission(id, repo)?;
    submission
        .status
        .transition(SubmissionStatus::Approved)
        .map_err(|e| ModerationError::InvalidTransition {
            from: e.from,
            to: e.to,
        })?;

    let new_temple = review_submission(&submission.temple_data, repo)?;

    match repo.publish_submission(id, &new_temple) {
        Ok(temple) => {
            log::info!(
                "Submission {id} approved by {} as temple {}",
                user.sub,
                temple.id
            );
            Ok(temple)
        }
        Err(RepositoryError::Conflict(message)) => {
            log::warn!("Submission {id} changed during approval: {message}");
            Err(concurrent_transition(id, SubmissionStatus::Approved, repo))
        }
        Err(RepositoryError::DuplicateName {
            existing_id,
            existing_name,
        }) => {
            log::warn!("Submission {id} lost its name to temple {existing_id} during approval");
            Err(ModerationError::DuplicateName {
                name: new_temple.name.english,
                existing_id,
                existing_name,
            })
        }
        Err(e) => {
            log::error!("Failed to publish submission {id}: {e}");
            Err(ModerationError::PublishFailure(e.to_string()))
        }
    }
}

/// Marks a pending submission as rejected. The catalog is not touched.
pub fn reject_submission<R>(
    id: SubmissionId,
    user: &AuthenticatedUser,
    repo: &R,
) -> Result<(), ModerationError>
where
    R: SubmissionReader + SubmissionWriter,
{
    require_admin(user).map_err(|_| ModerationError::Unauthorized)?;

    let submission = load_submission(id, repo)?;
    let target = submission
        .status
        .transition(SubmissionStatus::Rejected)
        .map_err(|e| ModerationError::InvalidTransition {
            from: e.from,
            to: e.to,
        })?;

    match repo.set_submission_status(id, SubmissionStatus::Pending, target) {
        Ok(()) => {
            log::info!("Submission {id} rejected by {}", user.sub);
            Ok(())
        }
        Err(RepositoryError::Conflict(message)) => {
            log::warn!("Submission {id} changed during rejection: {message}");
            Err(concurrent_transition(id, target, repo))
        }
        Err(e) => {
            log::error!("Failed to reject submission {id}: {e}");
            Err(ModerationError::Internal)
        }
    }
}

/// A submission with its review outcome, as shown in the moderation queue.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionView {
    pub id: i32,
    pub status: SubmissionStatus,
    pub submitted_by: Option<String>,
    pub created_at: chrono::NaiveDateTime,
    pub temple_data: SubmissionPayload,
    pub name: String,
    /// `None` when the submission could be approved as is.
    pub problem: Option<String>,
    pub problem_code: Option<&'static str>,
}

impl SubmissionView {
    fn new(submission: Submission, problem: Option<ModerationError>) -> Self {
        Self {
            id: submission.id.get(),
            status: submission.status,
            submitted_by: submission.submitted_by,
            created_at: submission.created_at,
            name: submission.temple_data.english_name().to_string(),
            temple_data: submission.temple_data,
            problem: problem.as_ref().map(ToString::to_string),
            problem_code: problem.as_ref().map(ModerationError::code),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionQueue {
    pub submissions: Paginated<SubmissionView>,
    pub counts: HashMap<SubmissionStatus, usize>,
    pub status: Option<SubmissionStatus>,
}

/// Moderation queue filtered by status, newest first.
///
/// Pending submissions carry their review outcome so the moderator can see
/// why approval would be refused.
pub fn show_submissions<R>(
    status: Option<SubmissionStatus>,
    page: usize,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<SubmissionQueue>
where
    R: SubmissionReader + TempleReader,
{
    require_admin(user)?;

    let mut query = SubmissionListQuery::default().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(status) = status {
        query = query.status(status);
    }

    let (total, submissions) = repo.list_submissions(query).map_err(|e| {
        log::error!("Failed to list submissions: {e}");
        ServiceError::Internal
    })?;

    let counts = repo.count_submissions_by_status().map_err(|e| {
        log::error!("Failed to count submissions: {e}");
        ServiceError::Internal
    })?;

    let views = submissions
        .into_iter()
        .map(|submission| {
            let problem = match submission.status {
                SubmissionStatus::Pending => {
                    review_submission(&submission.temple_data, repo).err()
                }
                _ => None,
            };
            SubmissionView::new(submission, problem)
        })
        .collect();

    Ok(SubmissionQueue {
        submissions: Paginated::new(views, page, total.div_ceil(DEFAULT_ITEMS_PER_PAGE)),
        counts,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::LocalizedText;
    use crate::repository::test::TestRepository;
    use crate::services::test_support::{admin, devotee, new_temple, payload, submission};

    fn first_id(repo: &TestRepository) -> SubmissionId {
        repo.submission_ids()[0]
    }

    #[test]
    fn approves_valid_submission() {
        let repo = TestRepository::new(
            vec![],
            vec![submission("Sri Example Temple", "Hyderabad", "TS")],
        );
        let id = first_id(&repo);

        let temple = approve_submission(id, &admin(), &repo).unwrap();

        assert_eq!(temple.name.english, "Sri Example Temple");
        assert_eq!(temple.district.as_str(), "Hyderabad");
        assert_eq!(temple.state, RegionCode::Telangana);
        assert!(temple.is_open);
        assert_eq!(repo.temple_count(), 1);
        let stored = repo.get_submission_by_id(id).unwrap().unwrap();
        assert_eq!(stored.status, SubmissionStatus::Approved);
    }

    #[test]
    fn second_approval_is_an_invalid_transition() {
        let repo = TestRepository::new(
            vec![],
            vec![submission("Sri Example Temple", "Hyderabad", "TS")],
        );
        let id = first_id(&repo);
        approve_submission(id, &admin(), &repo).unwrap();

        let err = approve_submission(id, &admin(), &repo).unwrap_err();
        assert_eq!(
            err,
            ModerationError::InvalidTransition {
                from: SubmissionStatus::Approved,
                to: SubmissionStatus::Approved,
            }
        );
        assert_eq!(repo.temple_count(), 1);
    }

    #[test]
    fn rejects_placeholder_names_and_keeps_pending() {
        let repo = TestRepository::new(vec![], vec![submission("test", "Hyderabad", "TS")]);
        let id = first_id(&repo);

        let err = approve_submission(id, &admin(), &repo).unwrap_err();
        assert_eq!(
            err,
            ModerationError::InvalidName {
                name: "test".into(),
                reason: InvalidNameReason::PlaceholderTest,
            }
        );
        assert!(err.is_validation());
        assert_eq!(repo.temple_count(), 0);
        let stored = repo.get_submission_by_id(id).unwrap().unwrap();
        assert_eq!(stored.status, SubmissionStatus::Pending);
    }

    #[test]
    fn detects_duplicates_case_insensitively() {
        let repo = TestRepository::new(
            vec![new_temple(
                "Chilkur Balaji Temple",
                "Ranga Reddy",
                RegionCode::Telangana,
            )],
            vec![submission("  chilkur BALAJI temple ", "Ranga Reddy", "TS")],
        );
        let existing = repo.temple_ids()[0];
        let id = first_id(&repo);

        let err = approve_submission(id, &admin(), &repo).unwrap_err();
        assert_eq!(
            err,
            ModerationError::DuplicateName {
                name: "chilkur BALAJI temple".into(),
                existing_id: existing,
                existing_name: "Chilkur Balaji Temple".into(),
            }
        );
        assert_eq!(repo.temple_count(), 1);
    }

    #[test]
    fn checks_run_in_order() {
        let blank = SubmissionPayload {
            name: Some(LocalizedText::english("")),
            ..Default::default()
        };
        let repo = TestRepository::default();
        assert_eq!(
            review_submission(&blank, &repo).unwrap_err(),
            ModerationError::EmptyName
        );

        // Invalid name wins over the missing location.
        let junk = payload("hello", "", "");
        assert!(matches!(
            review_submission(&junk, &repo).unwrap_err(),
            ModerationError::InvalidName { .. }
        ));

        let no_district = payload("Sri Example Temple", "  ", "TS");
        assert_eq!(
            review_submission(&no_district, &repo).unwrap_err(),
            ModerationError::MissingLocation
        );

        let unknown_state = payload("Sri Example Temple", "Hyderabad", "KA");
        assert_eq!(
            review_submission(&unknown_state, &repo).unwrap_err(),
            ModerationError::MissingLocation
        );
    }

    #[test]
    fn publish_failure_leaves_submission_pending() {
        let repo = TestRepository::new(
            vec![],
            vec![submission("Sri Example Temple", "Hyderabad", "TS")],
        )
        .failing_temple_insert();
        let id = first_id(&repo);

        let err = approve_submission(id, &admin(), &repo).unwrap_err();
        assert!(matches!(err, ModerationError::PublishFailure(_)));
        assert!(err.is_retryable());
        assert_eq!(repo.temple_count(), 0);
        let stored = repo.get_submission_by_id(id).unwrap().unwrap();
        assert_eq!(stored.status, SubmissionStatus::Pending);
    }

    #[test]
    fn reject_is_terminal() {
        let repo = TestRepository::new(
            vec![],
            vec![submission("Sri Example Temple", "Hyderabad", "TS")],
        );
        let id = first_id(&repo);

        reject_submission(id, &admin(), &repo).unwrap();
        assert_eq!(repo.temple_count(), 0);

        assert_eq!(
            reject_submission(id, &admin(), &repo).unwrap_err(),
            ModerationError::InvalidTransition {
                from: SubmissionStatus::Rejected,
                to: SubmissionStatus::Rejected,
            }
        );
        assert_eq!(
            approve_submission(id, &admin(), &repo).unwrap_err(),
            ModerationError::InvalidTransition {
                from: SubmissionStatus::Rejected,
                to: SubmissionStatus::Approved,
            }
        );
    }

    #[test]
    fn requires_admin_role() {
        let repo = TestRepository::new(
            vec![],
            vec![submission("Sri Example Temple", "Hyderabad", "TS")],
        );
        let id = first_id(&repo);
        assert_eq!(
            approve_submission(id, &devotee(), &repo).unwrap_err(),
            ModerationError::Unauthorized
        );
        assert_eq!(
            reject_submission(id, &devotee(), &repo).unwrap_err(),
            ModerationError::Unauthorized
        );
    }

    #[test]
    fn unknown_submission_is_not_found() {
        let repo = TestRepository::default();
        let id = SubmissionId::new(42).unwrap();
        assert_eq!(
            approve_submission(id, &admin(), &repo).unwrap_err(),
            ModerationError::NotFound
        );
    }

    #[test]
    fn queue_shows_review_problems_and_counts() {
        let repo = TestRepository::new(
            vec![],
            vec![
                submission("Sri Example Temple", "Hyderabad", "TS"),
                submission("temple123", "Hyderabad", "TS"),
            ],
        );
        let ids = repo.submission_ids();
        reject_submission(ids[0], &admin(), &repo).unwrap();

        let queue = show_submissions(None, 1, &admin(), &repo).unwrap();
        assert_eq!(queue.submissions.items.len(), 2);
        assert_eq!(queue.counts[&SubmissionStatus::Pending], 1);
        assert_eq!(queue.counts[&SubmissionStatus::Rejected], 1);
        assert_eq!(queue.counts[&SubmissionStatus::Approved], 0);

        let pending = show_submissions(Some(SubmissionStatus::Pending), 1, &admin(), &repo)
            .unwrap()
            .submissions
            .items;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].problem_code, Some("invalid_name"));
    }

    /// Delegates to [`TestRepository`] while another moderator acts between
    /// review and publish.
    struct Interleaved {
        inner: TestRepository,
        /// Name lookups miss, as if the competing temple committed after review.
        stale_name_lookup: bool,
        /// Status the submission is moved to right before publish.
        moved_to: Option<SubmissionStatus>,
        /// Submission reads after the first one fail.
        fail_reload: bool,
        reads: std::cell::Cell<usize>,
    }

    impl Interleaved {
        fn new(inner: TestRepository) -> Self {
            Self {
                inner,
                stale_name_lookup: false,
                moved_to: None,
                fail_reload: false,
                reads: std::cell::Cell::new(0),
            }
        }
    }

    impl TempleReader for Interleaved {
        fn list_temples(
            &self,
            query: crate::repository::TempleListQuery,
        ) -> crate::repository::errors::RepositoryResult<(usize, Vec<Temple>)> {
            self.inner.list_temples(query)
        }

        fn get_temple_by_id(
            &self,
            id: TempleId,
        ) -> crate::repository::errors::RepositoryResult<Option<Temple>> {
            self.inner.get_temple_by_id(id)
        }

        fn find_temple_by_english_name(
            &self,
            name: &str,
        ) -> crate::repository::errors::RepositoryResult<Option<Temple>> {
            if self.stale_name_lookup {
                Ok(None)
            } else {
                self.inner.find_temple_by_english_name(name)
            }
        }
    }

    impl SubmissionReader for Interleaved {
        fn list_submissions(
            &self,
            query: SubmissionListQuery,
        ) -> crate::repository::errors::RepositoryResult<(usize, Vec<Submission>)> {
            self.inner.list_submissions(query)
        }

        fn get_submission_by_id(
            &self,
            id: SubmissionId,
        ) -> crate::repository::errors::RepositoryResult<Option<Submission>> {
            let reads = self.reads.get();
            self.reads.set(reads + 1);
            if self.fail_reload && reads > 0 {
                return Err(RepositoryError::DatabaseError(
                    diesel::result::Error::BrokenTransactionManager,
                ));
            }
            self.inner.get_submission_by_id(id)
        }

        fn count_submissions_by_status(
            &self,
        ) -> crate::repository::errors::RepositoryResult<HashMap<SubmissionStatus, usize>> {
            self.inner.count_submissions_by_status()
        }
    }

    impl SubmissionWriter for Interleaved {
        fn create_submission(
            &self,
            submission: &crate::domain::submission::NewSubmission,
        ) -> crate::repository::errors::RepositoryResult<Submission> {
            self.inner.create_submission(submission)
        }

        fn publish_submission(
            &self,
            id: SubmissionId,
            temple: &NewTemple,
        ) -> crate::repository::errors::RepositoryResult<Temple> {
            if let Some(status) = self.moved_to {
                self.inner.force_status(id, status);
            }
            self.inner.publish_submission(id, temple)
        }

        fn set_submission_status(
            &self,
            id: SubmissionId,
            from: SubmissionStatus,
            to: SubmissionStatus,
        ) -> crate::repository::errors::RepositoryResult<()> {
            self.inner.set_submission_status(id, from, to)
        }
    }

    #[test]
    fn duplicate_published_after_review_is_refused() {
        let mut repo = Interleaved::new(TestRepository::new(
            vec![new_temple("Sri Śiva Temple", "Hyderabad", RegionCode::Telangana)],
            vec![submission("SRI ŚIVA TEMPLE", "Hyderabad", "TS")],
        ));
        repo.stale_name_lookup = true;
        let id = first_id(&repo.inner);
        let existing_id = repo.inner.temple_ids()[0];

        let err = approve_submission(id, &admin(), &repo).unwrap_err();

        assert_eq!(
            err,
            ModerationError::DuplicateName {
                name: "SRI ŚIVA TEMPLE".into(),
                existing_id,
                existing_name: "Sri Śiva Temple".into(),
            }
        );
        assert_eq!(repo.inner.temple_count(), 1);
        let stored = repo.inner.get_submission_by_id(id).unwrap().unwrap();
        assert_eq!(stored.status, SubmissionStatus::Pending);
    }

    #[test]
    fn lost_race_reports_the_status_found_on_reload() {
        let mut repo = Interleaved::new(TestRepository::new(
            vec![],
            vec![submission("Sri Example Temple", "Hyderabad", "TS")],
        ));
        repo.moved_to = Some(SubmissionStatus::Rejected);
        let id = first_id(&repo.inner);

        assert_eq!(
            approve_submission(id, &admin(), &repo).unwrap_err(),
            ModerationError::InvalidTransition {
                from: SubmissionStatus::Rejected,
                to: SubmissionStatus::Approved,
            }
        );
        assert_eq!(repo.inner.temple_count(), 0);
    }

    #[test]
    fn lost_race_with_failed_reload_is_internal() {
        let mut repo = Interleaved::new(TestRepository::new(
            vec![],
            vec![submission("Sri Example Temple", "Hyderabad", "TS")],
        ));
        repo.moved_to = Some(SubmissionStatus::Approved);
        repo.fail_reload = true;
        let id = first_id(&repo.inner);

        assert_eq!(
            approve_submission(id, &admin(), &repo).unwrap_err(),
            ModerationError::Internal
        );
        assert_eq!(repo.inner.temple_count(), 0);
    }
}

use crate::domain::auth::AuthenticatedUser;
use crate::domain::submission::{NewSubmission, Submission};
use crate::forms::submissions::SubmitTempleFormPayload;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{SubmissionListQuery, SubmissionReader, SubmissionWriter};
use crate::services::{ServiceError, ServiceResult};

/// Stores a user's proposed temple as a pending submission.
pub fn submit_temple<R>(
    payload: SubmitTempleFormPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<Submission>
where
    R: SubmissionWriter,
{
    let submission = NewSubmission {
        temple_data: payload.temple_data,
        submitted_by: Some(user.sub.clone()),
    };

    match repo.create_submission(&submission) {
        Ok(submission) => {
            log::info!(
                "User {} submitted temple \"{}\" as submission {}",
                user.sub,
                submission.temple_data.english_name(),
                submission.id
            );
            Ok(submission)
        }
        Err(e) => {
            log::error!("Failed to create submission: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// The signed-in user's own submissions, newest first.
pub fn show_my_submissions<R>(
    page: usize,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<Paginated<Submission>>
where
    R: SubmissionReader,
{
    let query = SubmissionListQuery::default()
        .submitted_by(user.sub.clone())
        .paginate(page, DEFAULT_ITEMS_PER_PAGE);

    match repo.list_submissions(query) {
        Ok((total, items)) => Ok(Paginated::new(
            items,
            page,
            total.div_ceil(DEFAULT_ITEMS_PER_PAGE),
        )),
        Err(e) => {
            log::error!("Failed to list submissions for {}: {e}", user.sub);
            Err(ServiceError::Internal)
        }
    }
}

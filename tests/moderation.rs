use temple_directory::domain::types::{RegionCode, SubmissionId, SubmissionStatus};
use temple_directory::repository::errors::RepositoryError;
use temple_directory::repository::{
    DieselRepository, SubmissionReader, SubmissionWriter, TempleListQuery, TempleReader,
    TempleWriter,
};
use temple_directory::services::moderation::{
    ModerationError, approve_submission, reject_submission, review_submission,
};

mod common;

fn catalog_size(repo: &DieselRepository) -> usize {
    repo.list_temples(TempleListQuery::default())
        .expect("list succeeds")
        .0
}

#[test]
fn approving_example_submission_publishes_temple() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let submission = repo
        .create_submission(&common::submission("Sri Example Temple", "Hyderabad", "TS"))
        .expect("should create submission");

    let temple = approve_submission(submission.id, &common::moderator(), &repo)
        .expect("approval succeeds");

    assert_eq!(temple.name.english, "Sri Example Temple");
    assert_eq!(temple.district.as_str(), "Hyderabad");
    assert_eq!(temple.state, RegionCode::Telangana);
    assert!(temple.is_open);
    assert_eq!(catalog_size(&repo), 1);

    let stored = repo
        .get_submission_by_id(submission.id)
        .expect("load succeeds")
        .expect("submission exists");
    assert_eq!(stored.status, SubmissionStatus::Approved);

    let again = approve_submission(submission.id, &common::moderator(), &repo);
    assert_eq!(
        again.unwrap_err(),
        ModerationError::InvalidTransition {
            from: SubmissionStatus::Approved,
            to: SubmissionStatus::Approved,
        }
    );
    assert_eq!(catalog_size(&repo), 1);
}

#[test]
fn failed_approval_leaves_catalog_and_submission_untouched() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    repo.create_temple(&common::new_temple(
        "Sri Example Temple",
        "Hyderabad",
        RegionCode::Telangana,
    ))
    .expect("should create temple");

    let duplicate = repo
        .create_submission(&common::submission("SRI EXAMPLE TEMPLE", "Hyderabad", "TS"))
        .expect("should create submission");
    let junk = repo
        .create_submission(&common::submission("temple123", "Hyderabad", "TS"))
        .expect("should create submission");

    assert!(matches!(
        approve_submission(duplicate.id, &common::moderator(), &repo),
        Err(ModerationError::DuplicateName { .. })
    ));
    assert!(matches!(
        approve_submission(junk.id, &common::moderator(), &repo),
        Err(ModerationError::InvalidName { .. })
    ));

    assert_eq!(catalog_size(&repo), 1);
    for id in [duplicate.id, junk.id] {
        let stored = repo
            .get_submission_by_id(id)
            .expect("load succeeds")
            .expect("submission exists");
        assert_eq!(stored.status, SubmissionStatus::Pending);
    }
}

#[test]
fn rejection_is_terminal() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let submission = repo
        .create_submission(&common::submission("Ramappa Temple", "Mulugu", "TS"))
        .expect("should create submission");

    reject_submission(submission.id, &common::moderator(), &repo).expect("rejection succeeds");
    assert_eq!(catalog_size(&repo), 0);

    assert_eq!(
        approve_submission(submission.id, &common::moderator(), &repo).unwrap_err(),
        ModerationError::InvalidTransition {
            from: SubmissionStatus::Rejected,
            to: SubmissionStatus::Approved,
        }
    );
    assert!(matches!(
        reject_submission(submission.id, &common::moderator(), &repo),
        Err(ModerationError::InvalidTransition { .. })
    ));
}

fn status_of(repo: &DieselRepository, id: SubmissionId) -> SubmissionStatus {
    repo.get_submission_by_id(id)
        .expect("load succeeds")
        .expect("submission exists")
        .status
}

#[test]
fn duplicate_check_folds_non_ascii_case() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let existing = repo
        .create_temple(&common::new_temple(
            "Sri Śiva Temple",
            "Hyderabad",
            RegionCode::Telangana,
        ))
        .expect("should create temple");
    let copy = repo
        .create_submission(&common::submission("SRI ŚIVA TEMPLE", "Hyderabad", "TS"))
        .expect("should create submission");

    assert_eq!(
        approve_submission(copy.id, &common::moderator(), &repo).unwrap_err(),
        ModerationError::DuplicateName {
            name: "SRI ŚIVA TEMPLE".into(),
            existing_id: existing.id,
            existing_name: "Sri Śiva Temple".into(),
        }
    );
    assert_eq!(catalog_size(&repo), 1);
    assert_eq!(status_of(&repo, copy.id), SubmissionStatus::Pending);
}

#[test]
fn temple_published_after_review_blocks_the_second_publish() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let first = repo
        .create_submission(&common::submission("Sri Example Temple", "Hyderabad", "TS"))
        .expect("should create submission");
    let second = repo
        .create_submission(&common::submission("sri example temple", "Hyderabad", "TS"))
        .expect("should create submission");

    // Both pass review before either is published.
    let first_temple = review_submission(&first.temple_data, &repo).expect("first passes review");
    let second_temple =
        review_submission(&second.temple_data, &repo).expect("second passes review");

    let published = repo
        .publish_submission(first.id, &first_temple)
        .expect("first publish succeeds");
    let err = repo
        .publish_submission(second.id, &second_temple)
        .expect_err("second publish is refused");

    match err {
        RepositoryError::DuplicateName {
            existing_id,
            existing_name,
        } => {
            assert_eq!(existing_id, published.id);
            assert_eq!(existing_name, "Sri Example Temple");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(catalog_size(&repo), 1);
    assert_eq!(status_of(&repo, first.id), SubmissionStatus::Approved);
    assert_eq!(status_of(&repo, second.id), SubmissionStatus::Pending);
}

#[test]
fn concurrent_approvals_of_one_name_publish_once() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let ids = ["Sri Example Temple", "SRI EXAMPLE TEMPLE"].map(|name| {
        repo.create_submission(&common::submission(name, "Hyderabad", "TS"))
            .expect("should create submission")
            .id
    });

    let results = std::thread::scope(|scope| {
        let handles = ids.map(|id| {
            let repo = repo.clone();
            scope.spawn(move || approve_submission(id, &common::moderator(), &repo))
        });
        handles.map(|handle| handle.join().expect("approval thread panicked"))
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .any(|r| matches!(r, Err(ModerationError::DuplicateName { .. })))
    );
    assert_eq!(catalog_size(&repo), 1);
}

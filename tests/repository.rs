use chrono::NaiveDate;
use temple_directory::domain::festival::NewFestival;
use temple_directory::domain::types::{LocalizedText, RegionCode, SubmissionStatus, TempleType};
use temple_directory::repository::errors::RepositoryError;
use temple_directory::repository::{
    DieselRepository, FestivalReader, FestivalWriter, SubmissionListQuery, SubmissionReader,
    SubmissionWriter, TempleListQuery, TempleReader, TempleWriter,
};

mod common;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn temple_round_trips_lists_and_features() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let mut temple = common::new_temple("Ramappa Temple", "Mulugu", RegionCode::Telangana);
    temple.features = vec!["UNESCO".into(), "Parking".into()];
    temple.timings.puja_timings = vec!["Abhishekam 6:30 AM".into()];
    temple.temple_type = TempleType::Hill;

    let created = repo.create_temple(&temple).expect("should create temple");
    let loaded = repo
        .get_temple_by_id(created.id)
        .expect("should load temple")
        .expect("temple exists");

    assert_eq!(loaded.name.english, "Ramappa Temple");
    assert_eq!(loaded.features, vec!["UNESCO", "Parking"]);
    assert_eq!(loaded.timings.puja_timings, vec!["Abhishekam 6:30 AM"]);
    assert_eq!(loaded.temple_type, TempleType::Hill);
    assert!(loaded.festivals.is_empty());
}

#[test]
fn english_name_lookup_ignores_case() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    repo.create_temple(&common::new_temple(
        "Sri Example Temple",
        "Hyderabad",
        RegionCode::Telangana,
    ))
    .expect("should create temple");

    let found = repo
        .find_temple_by_english_name("  sri EXAMPLE temple ")
        .expect("lookup succeeds");
    assert!(found.is_some());
    assert!(
        repo.find_temple_by_english_name("Other Temple")
            .expect("lookup succeeds")
            .is_none()
    );
}

#[test]
fn list_filters_by_type_and_search() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let mut hill = common::new_temple("Yadadri Temple", "Yadadri", RegionCode::Telangana);
    hill.temple_type = TempleType::Hill;
    let created = repo
        .create_temples(&[
            hill,
            common::new_temple("Srisailam Temple", "Nandyal", RegionCode::AndhraPradesh),
            common::new_temple("Ramappa Temple", "Mulugu", RegionCode::Telangana),
        ])
        .expect("should import temples");
    assert_eq!(created, 3);

    let (total, hills) = repo
        .list_temples(TempleListQuery::default().temple_type(TempleType::Hill))
        .expect("list succeeds");
    assert_eq!(total, 1);
    assert_eq!(hills[0].name.english, "Yadadri Temple");

    let (total, found) = repo
        .list_temples(TempleListQuery::default().search("SRISAILAM"))
        .expect("list succeeds");
    assert_eq!(total, 1);
    assert_eq!(found[0].state, RegionCode::AndhraPradesh);

    let (total, page) = repo
        .list_temples(TempleListQuery::default().paginate(2, 2))
        .expect("list succeeds");
    assert_eq!(total, 3);
    assert_eq!(page.len(), 1);
}

#[test]
fn deleting_temple_removes_its_festivals() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let temple = repo
        .create_temple(&common::new_temple(
            "Vemulawada Temple",
            "Rajanna Sircilla",
            RegionCode::Telangana,
        ))
        .expect("should create temple");

    let festival = repo
        .create_festival(&NewFestival {
            temple_id: temple.id,
            name: LocalizedText::new("Maha Shivaratri", "మహా శివరాత్రి"),
            description: LocalizedText::default(),
            date: date(2025, 2, 26),
            is_active: true,
        })
        .expect("should create festival");

    let loaded = repo
        .get_temple_by_id(temple.id)
        .expect("load succeeds")
        .expect("temple exists");
    assert_eq!(loaded.festivals.len(), 1);

    repo.set_festival_date(festival.id, date(2026, 2, 15))
        .expect("should move festival");
    assert_eq!(
        repo.get_festival_by_id(festival.id)
            .expect("load succeeds")
            .expect("festival exists")
            .date,
        date(2026, 2, 15)
    );

    assert_eq!(repo.delete_temple(temple.id).expect("delete succeeds"), 1);
    assert!(repo.list_festivals(None).expect("list succeeds").is_empty());
}

#[test]
fn publish_is_guarded_by_pending_status() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let submission = repo
        .create_submission(&common::submission("Sri Example Temple", "Hyderabad", "TS"))
        .expect("should create submission");
    assert_eq!(submission.status, SubmissionStatus::Pending);

    let temple = common::new_temple("Sri Example Temple", "Hyderabad", RegionCode::Telangana);
    repo.publish_submission(submission.id, &temple)
        .expect("first publish succeeds");

    let second = repo.publish_submission(submission.id, &temple);
    assert!(matches!(second, Err(RepositoryError::Conflict(_))));

    let (total, _) = repo
        .list_temples(TempleListQuery::default())
        .expect("list succeeds");
    assert_eq!(total, 1);

    let reject = repo.set_submission_status(
        submission.id,
        SubmissionStatus::Pending,
        SubmissionStatus::Rejected,
    );
    assert!(matches!(reject, Err(RepositoryError::Conflict(_))));
}

#[test]
fn counts_and_filters_submissions_by_status() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let first = repo
        .create_submission(&common::submission("Ramappa Temple", "Mulugu", "TS"))
        .expect("should create submission");
    repo.create_submission(&common::submission("Srisailam Temple", "Nandyal", "AP"))
        .expect("should create submission");
    repo.set_submission_status(
        first.id,
        SubmissionStatus::Pending,
        SubmissionStatus::Rejected,
    )
    .expect("should reject");

    let counts = repo.count_submissions_by_status().expect("count succeeds");
    assert_eq!(counts[&SubmissionStatus::Pending], 1);
    assert_eq!(counts[&SubmissionStatus::Rejected], 1);
    assert_eq!(counts[&SubmissionStatus::Approved], 0);

    let (total, pending) = repo
        .list_submissions(SubmissionListQuery::default().status(SubmissionStatus::Pending))
        .expect("list succeeds");
    assert_eq!(total, 1);
    assert_eq!(pending[0].temple_data.english_name(), "Srisailam Temple");

    let (mine, _) = repo
        .list_submissions(SubmissionListQuery::default().submitted_by("devotee-7"))
        .expect("list succeeds");
    assert_eq!(mine, 2);
}

#[test]
fn name_lookup_and_search_fold_non_ascii_case() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let created = repo
        .create_temple(&common::new_temple(
            "Sri Śiva Temple",
            "Hyderabad",
            RegionCode::Telangana,
        ))
        .expect("should create temple");

    let found = repo
        .find_temple_by_english_name("  SRI ŚIVA TEMPLE ")
        .expect("lookup succeeds")
        .expect("temple found");
    assert_eq!(found.id, created.id);

    let (total, _) = repo
        .list_temples(TempleListQuery::default().search("ŚIVA"))
        .expect("list succeeds");
    assert_eq!(total, 1);

    let copy = repo.create_temple(&common::new_temple(
        "sri śiva temple",
        "Warangal",
        RegionCode::Telangana,
    ));
    assert!(matches!(copy, Err(RepositoryError::DatabaseError(_))));
}

#[test]
fn lists_in_creation_order_and_tolerates_huge_pages() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    for name in ["Zeta Temple", "Alpha Temple", "Mid Temple"] {
        repo.create_temple(&common::new_temple(name, "Mulugu", RegionCode::Telangana))
            .expect("should create temple");
    }

    let (_, oldest) = repo
        .list_temples(TempleListQuery::default().oldest_first())
        .expect("list succeeds");
    let names = oldest
        .iter()
        .map(|t| t.name.english.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, ["Zeta Temple", "Alpha Temple", "Mid Temple"]);

    let (total, page) = repo
        .list_temples(TempleListQuery::default().paginate(usize::MAX, 20))
        .expect("list succeeds");
    assert_eq!(total, 3);
    assert!(page.is_empty());

    let (total, page) = repo
        .list_submissions(SubmissionListQuery::default().paginate(usize::MAX, 20))
        .expect("list succeeds");
    assert_eq!(total, 0);
    assert!(page.is_empty());
}

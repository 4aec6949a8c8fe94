//! Helpers for integration tests.

#![allow(dead_code)]

use diesel_migrations::MigrationHarness;
use tempfile::NamedTempFile;
use temple_directory::SERVICE_ADMIN_ROLE;
use temple_directory::db::{DbPool, MIGRATIONS, establish_connection_pool};
use temple_directory::domain::auth::AuthenticatedUser;
use temple_directory::domain::submission::{NewSubmission, SubmissionPayload};
use temple_directory::domain::temple::NewTemple;
use temple_directory::domain::types::{DistrictName, LocalizedText, RegionCode};

/// Temporary database used in integration tests.
pub struct TestDb {
    _tempfile: NamedTempFile,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let tempfile = NamedTempFile::new().expect("Failed to create temp file");
        let pool = establish_connection_pool(tempfile.path().to_str().unwrap())
            .expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Migrations failed");
        TestDb {
            _tempfile: tempfile,
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

pub fn moderator() -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "moderator-1".into(),
        email: "moderator@example.com".into(),
        name: "Moderator".into(),
        roles: vec![SERVICE_ADMIN_ROLE.into()],
        exp: 0,
    }
}

pub fn new_temple(name: &str, district: &str, state: RegionCode) -> NewTemple {
    NewTemple::new(
        LocalizedText::english(name),
        DistrictName::new(district).expect("valid district"),
        state,
    )
}

pub fn submission(name: &str, district: &str, state: &str) -> NewSubmission {
    NewSubmission {
        temple_data: SubmissionPayload {
            name: Some(LocalizedText::english(name)),
            district: Some(district.into()),
            state: Some(state.into()),
            ..Default::default()
        },
        submitted_by: Some("devotee-7".into()),
    }
}

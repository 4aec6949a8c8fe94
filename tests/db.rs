use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sql_types::Integer;

mod common;

#[derive(QueryableByName)]
struct Pragma {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

#[test]
fn creates_database_with_migrations() {
    let test_db = common::TestDb::new();
    let pool = test_db.pool();
    let mut conn = pool.get().expect("connection");
    conn.batch_execute("SELECT id FROM temples; SELECT id FROM festivals; SELECT id FROM temple_submissions;")
        .expect("all tables exist");
}

#[test]
fn pooled_connections_enforce_foreign_keys() {
    let test_db = common::TestDb::new();
    let mut conn = test_db.pool().get().expect("connection");
    let pragma = diesel::sql_query("PRAGMA foreign_keys")
        .get_result::<Pragma>(&mut conn)
        .expect("pragma readable");
    assert_eq!(pragma.foreign_keys, 1);
}

#[test]
fn running_migrations_twice_is_a_no_op() {
    let test_db = common::TestDb::new();
    temple_directory::db::run_migrations(&test_db.pool()).expect("second run succeeds");
}

//! Test scaffolding: in-memory databases, a seeded Rocket instance, and
//! a sync-to-async connection shim.
//!
//! Compiled into the library (not behind `cfg(test)`) so integration
//! tests under `tests/` can use it too.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rocket::figment::{
    util::map,
    value::{Map, Value},
};
use rocket::{Build, Rocket, fairing::AdHoc};
use rocket_sync_db_pools::diesel;

use super::db::{DbConn, run_pending_migrations, set_foreign_keys};
use crate::geo::Coord;
use crate::geocode::{FixedGeocoder, Geocoder};
use crate::models::{JobInput, LaborActivityInput, WorkerInput};
use crate::orm::job::{assign_worker, insert_job};
use crate::orm::labor_activity::insert_labor_activity;
use crate::orm::session::insert_session;
use crate::orm::trade::insert_trade;
use crate::orm::worker::insert_worker;

/// Fixed session tokens the seeded workers authenticate with.
pub const ADMIN_SESSION: &str = "admin-session";
pub const FOREMAN_SESSION: &str = "foreman-session";
pub const WORKER1_SESSION: &str = "worker1-session";
pub const WORKER2_SESSION: &str = "worker2-session";

/// Where the seeded job J-100 sits. Tests derive GPS readings from this.
pub const TEST_SITE: Coord = Coord {
    latitude: 40.0,
    longitude: -74.0,
};

/// Configures SQLite with performance-optimized settings for testing.
///
/// These settings make SQLite faster but less durable - only use for
/// testing.
fn set_sqlite_test_pragmas(conn: &mut diesel::SqliteConnection) {
    conn.batch_execute(
        r#"
        PRAGMA synchronous = OFF;
        PRAGMA journal_mode = OFF;
        "#,
    )
    .expect("Failed to set SQLite PRAGMAs");
}

fn set_sqlite_test_pragmas_fairing() -> AdHoc {
    AdHoc::on_ignite("Set SQLite Test Pragmas", |rocket| async {
        let conn = DbConn::get_one(&rocket)
            .await
            .expect("database connection for migration");
        conn.run(|c| {
            set_sqlite_test_pragmas(c);
        })
        .await;
        rocket
    })
}

/// Creates a Rocket fairing that seeds the standard test crew, jobs and
/// sessions every test relies on.
fn test_data_init_fairing() -> AdHoc {
    AdHoc::on_ignite("Test Data Initialization", |rocket| async {
        let conn = DbConn::get_one(&rocket)
            .await
            .expect("database connection for test data initialization");

        conn.run(|c| {
            if let Err(e) = create_test_data(c) {
                eprintln!("[test-data-init] ERROR: Failed to create test data: {:?}", e);
            }
        })
        .await;

        rocket
    })
}

/// Seeds a small, stable roster:
/// - an admin, a foreman, and two clock workers, each with a fixed
///   session token
/// - drywall and electrical trades with one activity each
/// - job J-100 at `TEST_SITE` with the workers assigned
/// - job J-200 with an address but no coordinates
pub fn create_test_data(conn: &mut SqliteConnection) -> Result<(), diesel::result::Error> {
    let admin = insert_worker(
        conn,
        WorkerInput {
            name: "Pat Admin".to_string(),
            email: "admin@example.com".to_string(),
            role: "admin".to_string(),
            uses_clock: Some(false),
            burden_rate: None,
        },
    )?;
    let foreman = insert_worker(
        conn,
        WorkerInput {
            name: "Sara Boss".to_string(),
            email: "foreman@example.com".to_string(),
            role: "foreman".to_string(),
            uses_clock: Some(false),
            burden_rate: None,
        },
    )?;
    let worker1 = insert_worker(
        conn,
        WorkerInput {
            name: "Mike Rodriguez".to_string(),
            email: "worker1@example.com".to_string(),
            role: "worker".to_string(),
            uses_clock: None,
            burden_rate: Some(52.5),
        },
    )?;
    let worker2 = insert_worker(
        conn,
        WorkerInput {
            name: "Tommy Wilson".to_string(),
            email: "worker2@example.com".to_string(),
            role: "worker".to_string(),
            uses_clock: None,
            burden_rate: Some(48.0),
        },
    )?;

    insert_session(conn, admin.id, Some(ADMIN_SESSION.to_string()), None)?;
    insert_session(conn, foreman.id, Some(FOREMAN_SESSION.to_string()), None)?;
    insert_session(conn, worker1.id, Some(WORKER1_SESSION.to_string()), None)?;
    insert_session(conn, worker2.id, Some(WORKER2_SESSION.to_string()), None)?;

    let drywall = insert_trade(conn, "drywall".to_string())?;
    let electrical = insert_trade(conn, "electrical".to_string())?;
    insert_labor_activity(
        conn,
        LaborActivityInput {
            name: "hang board".to_string(),
            trade_id: drywall.id,
        },
    )?;
    insert_labor_activity(
        conn,
        LaborActivityInput {
            name: "rough-in".to_string(),
            trade_id: electrical.id,
        },
    )?;

    let job = insert_job(
        conn,
        JobInput {
            code: "J-100".to_string(),
            description: "Riverside office buildout".to_string(),
            address: Some("123 River Rd".to_string()),
            latitude: Some(TEST_SITE.latitude),
            longitude: Some(TEST_SITE.longitude),
            foreman_id: Some(foreman.id),
            required_trades: None,
        },
        Some(TEST_SITE),
    )?;
    assign_worker(conn, job.id, worker1.id)?;
    assign_worker(conn, job.id, worker2.id)?;

    insert_job(
        conn,
        JobInput {
            code: "J-200".to_string(),
            description: "Harbor warehouse repairs".to_string(),
            address: Some("9 Pier Ln".to_string()),
            latitude: None,
            longitude: None,
            foreman_id: Some(foreman.id),
            required_trades: None,
        },
        None,
    )?;

    Ok(())
}

/// Creates and configures a Rocket instance for testing with an
/// in-memory SQLite database.
///
/// The returned Rocket instance will have:
/// - A unique in-memory SQLite database configured
/// - Foreign keys enabled and testing pragmas set
/// - All migrations run
/// - The standard test data seeded
/// - A fixed geocoder that resolves every address to `TEST_SITE`
/// - API routes mounted
///
/// The auto clock-out sweep is not attached; tests drive the sweep
/// directly.
pub fn test_rocket() -> Rocket<Build> {
    use uuid::Uuid;

    // Unique shared in-memory DB per test
    let unique_db_name = format!("file:test_db_{}?mode=memory&cache=shared", Uuid::new_v4());

    let db_config: Map<_, Value> = map! {
        "url" => unique_db_name.into(),
        "pool_size" => 5.into(),
        "timeout" => 5.into(),
    };
    let databases = map!["sqlite_db" => db_config];

    let figment = rocket::Config::figment().merge(("databases", databases));

    let rocket = rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(super::db::set_foreign_keys_fairing())
        .attach(set_sqlite_test_pragmas_fairing())
        .attach(super::db::run_migrations_fairing())
        .attach(test_data_init_fairing())
        .manage(Box::new(FixedGeocoder::at(
            TEST_SITE.latitude,
            TEST_SITE.longitude,
        )) as Box<dyn Geocoder>);

    crate::mount_api_routes(rocket)
}

/// Creates a synchronous in-memory SQLite database connection for unit
/// tests.
///
/// Runs all embedded migrations and enables foreign keys. Each call
/// returns a new, independent database.
pub fn setup_test_db() -> SqliteConnection {
    use diesel::Connection;

    let mut conn = SqliteConnection::establish(":memory:")
        .expect("Failed to create in-memory SQLite database");
    set_foreign_keys(&mut conn);
    run_pending_migrations(&mut conn);
    conn
}

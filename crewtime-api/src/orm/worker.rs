use chrono::Utc;
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{NewWorker, Trade, Worker, WorkerInput, WorkerTrade};

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Inserts a new worker. Role is stored as given; validation of the role
/// string happens at the API boundary.
pub fn insert_worker(
    conn: &mut SqliteConnection,
    input: WorkerInput,
) -> Result<Worker, diesel::result::Error> {
    use crate::schema::workers::dsl::*;

    let insertable = NewWorker {
        name: input.name,
        email: input.email.to_lowercase(),
        role: input.role,
        is_active: true,
        uses_clock: input.uses_clock.unwrap_or(true),
        burden_rate: input.burden_rate,
        created_at: Utc::now().naive_utc(),
    };

    diesel::insert_into(workers)
        .values(&insertable)
        .execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    workers.filter(id.eq(last_id as i32)).first::<Worker>(conn)
}

/// Gets a single worker by ID.
pub fn get_worker(
    conn: &mut SqliteConnection,
    worker_id: i32,
) -> Result<Option<Worker>, diesel::result::Error> {
    use crate::schema::workers::dsl::*;
    workers
        .filter(id.eq(worker_id))
        .first::<Worker>(conn)
        .optional()
}

/// Gets a single worker by email (case-insensitive).
pub fn get_worker_by_email(
    conn: &mut SqliteConnection,
    worker_email: &str,
) -> Result<Option<Worker>, diesel::result::Error> {
    use crate::schema::workers::dsl::*;
    workers
        .filter(email.eq(worker_email.to_lowercase()))
        .first::<Worker>(conn)
        .optional()
}

/// Returns all workers in ascending order by id.
pub fn list_all_workers(conn: &mut SqliteConnection) -> Result<Vec<Worker>, diesel::result::Error> {
    use crate::schema::workers::dsl::*;
    workers.order(id.asc()).load::<Worker>(conn)
}

/// Returns active workers only, for assignment pickers.
pub fn list_active_workers(
    conn: &mut SqliteConnection,
) -> Result<Vec<Worker>, diesel::result::Error> {
    use crate::schema::workers::dsl::*;
    workers
        .filter(is_active.eq(true))
        .order(id.asc())
        .load::<Worker>(conn)
}

/// Updates a worker's fields. All fields are optional - only provided
/// fields will be updated.
pub fn update_worker(
    conn: &mut SqliteConnection,
    worker_id: i32,
    new_name: Option<String>,
    new_email: Option<String>,
    new_role: Option<String>,
    new_uses_clock: Option<bool>,
    new_burden_rate: Option<Option<f64>>,
) -> Result<Worker, diesel::result::Error> {
    use crate::schema::workers::dsl::*;

    if let Some(name_val) = new_name {
        diesel::update(workers.filter(id.eq(worker_id)))
            .set(name.eq(name_val))
            .execute(conn)?;
    }

    if let Some(email_val) = new_email {
        diesel::update(workers.filter(id.eq(worker_id)))
            .set(email.eq(email_val.to_lowercase()))
            .execute(conn)?;
    }

    if let Some(role_val) = new_role {
        diesel::update(workers.filter(id.eq(worker_id)))
            .set(role.eq(role_val))
            .execute(conn)?;
    }

    if let Some(uses_clock_val) = new_uses_clock {
        diesel::update(workers.filter(id.eq(worker_id)))
            .set(uses_clock.eq(uses_clock_val))
            .execute(conn)?;
    }

    if let Some(rate_val) = new_burden_rate {
        diesel::update(workers.filter(id.eq(worker_id)))
            .set(burden_rate.eq(rate_val))
            .execute(conn)?;
    }

    workers.filter(id.eq(worker_id)).first::<Worker>(conn)
}

/// Deactivates a worker. Workers are never deleted: their time records
/// must stay referenceable forever.
pub fn deactivate_worker(
    conn: &mut SqliteConnection,
    worker_id: i32,
) -> Result<Worker, diesel::result::Error> {
    use crate::schema::workers::dsl::*;
    diesel::update(workers.filter(id.eq(worker_id)))
        .set(is_active.eq(false))
        .execute(conn)?;
    workers.filter(id.eq(worker_id)).first::<Worker>(conn)
}

/// Reactivates a previously deactivated worker.
pub fn activate_worker(
    conn: &mut SqliteConnection,
    worker_id: i32,
) -> Result<Worker, diesel::result::Error> {
    use crate::schema::workers::dsl::*;
    diesel::update(workers.filter(id.eq(worker_id)))
        .set(is_active.eq(true))
        .execute(conn)?;
    workers.filter(id.eq(worker_id)).first::<Worker>(conn)
}

/// Adds a trade qualification. Idempotent: re-adding is a no-op.
pub fn add_worker_trade(
    conn: &mut SqliteConnection,
    target_worker_id: i32,
    target_trade_id: i32,
) -> Result<(), diesel::result::Error> {
    use crate::schema::worker_trades::dsl::*;
    diesel::insert_or_ignore_into(worker_trades)
        .values(&WorkerTrade {
            worker_id: target_worker_id,
            trade_id: target_trade_id,
        })
        .execute(conn)?;
    Ok(())
}

/// Removes a trade qualification.
pub fn remove_worker_trade(
    conn: &mut SqliteConnection,
    target_worker_id: i32,
    target_trade_id: i32,
) -> Result<(), diesel::result::Error> {
    use crate::schema::worker_trades::dsl::*;
    diesel::delete(
        worker_trades
            .filter(worker_id.eq(target_worker_id))
            .filter(trade_id.eq(target_trade_id)),
    )
    .execute(conn)?;
    Ok(())
}

/// Lists a worker's trade qualifications.
pub fn get_worker_trades(
    conn: &mut SqliteConnection,
    target_worker_id: i32,
) -> Result<Vec<Trade>, diesel::result::Error> {
    use crate::schema::{trades, worker_trades};
    worker_trades::table
        .inner_join(trades::table)
        .filter(worker_trades::worker_id.eq(target_worker_id))
        .select(Trade::as_select())
        .order(trades::id.asc())
        .load::<Trade>(conn)
}

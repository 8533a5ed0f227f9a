use chrono::Utc;
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::geo::Coord;
use crate::models::{
    JOB_STATUS_ACTIVE, JOB_STATUS_INACTIVE, Job, JobInput, JobTrade, NewJob, NewJobWorker, Trade,
    Worker,
};

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Inserts a new job, with its required-trade links when given.
/// Coordinates come in already resolved; geocoding happens above this
/// layer.
pub fn insert_job(
    conn: &mut SqliteConnection,
    input: JobInput,
    coord: Option<Coord>,
) -> Result<Job, diesel::result::Error> {
    use crate::schema::jobs::dsl::*;

    let insertable = NewJob {
        code: input.code,
        description: input.description,
        address: input.address,
        latitude: coord.map(|c| c.latitude),
        longitude: coord.map(|c| c.longitude),
        status: JOB_STATUS_ACTIVE.to_string(),
        foreman_id: input.foreman_id,
        created_at: Utc::now().naive_utc(),
    };

    diesel::insert_into(jobs).values(&insertable).execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    let job = jobs.filter(id.eq(last_id as i32)).first::<Job>(conn)?;

    if let Some(trade_ids) = input.required_trades {
        set_required_trades(conn, job.id, &trade_ids)?;
    }

    Ok(job)
}

/// Gets a single job by ID.
pub fn get_job(
    conn: &mut SqliteConnection,
    job_id: i32,
) -> Result<Option<Job>, diesel::result::Error> {
    use crate::schema::jobs::dsl::*;
    jobs.filter(id.eq(job_id)).first::<Job>(conn).optional()
}

/// Gets a single job by its unique code.
pub fn get_job_by_code(
    conn: &mut SqliteConnection,
    job_code: &str,
) -> Result<Option<Job>, diesel::result::Error> {
    use crate::schema::jobs::dsl::*;
    jobs.filter(code.eq(job_code)).first::<Job>(conn).optional()
}

/// Returns all jobs in ascending order by id.
pub fn list_all_jobs(conn: &mut SqliteConnection) -> Result<Vec<Job>, diesel::result::Error> {
    use crate::schema::jobs::dsl::*;
    jobs.order(id.asc()).load::<Job>(conn)
}

/// Returns jobs with the given status, ordered by id.
pub fn list_jobs_by_status(
    conn: &mut SqliteConnection,
    target_status: &str,
) -> Result<Vec<Job>, diesel::result::Error> {
    use crate::schema::jobs::dsl::*;
    jobs.filter(status.eq(target_status))
        .order(id.asc())
        .load::<Job>(conn)
}

/// Updates a job's fields. All fields are optional - only provided
/// fields will be updated.
pub fn update_job(
    conn: &mut SqliteConnection,
    job_id: i32,
    new_description: Option<String>,
    new_address: Option<String>,
    new_coord: Option<Option<Coord>>,
    new_status: Option<String>,
    new_foreman_id: Option<Option<i32>>,
) -> Result<Job, diesel::result::Error> {
    use crate::schema::jobs::dsl::*;

    if let Some(desc_val) = new_description {
        diesel::update(jobs.filter(id.eq(job_id)))
            .set(description.eq(desc_val))
            .execute(conn)?;
    }

    if let Some(addr_val) = new_address {
        diesel::update(jobs.filter(id.eq(job_id)))
            .set(address.eq(addr_val))
            .execute(conn)?;
    }

    if let Some(coord_val) = new_coord {
        diesel::update(jobs.filter(id.eq(job_id)))
            .set((
                latitude.eq(coord_val.map(|c| c.latitude)),
                longitude.eq(coord_val.map(|c| c.longitude)),
            ))
            .execute(conn)?;
    }

    if let Some(status_val) = new_status {
        diesel::update(jobs.filter(id.eq(job_id)))
            .set(status.eq(status_val))
            .execute(conn)?;
    }

    if let Some(foreman_val) = new_foreman_id {
        diesel::update(jobs.filter(id.eq(job_id)))
            .set(foreman_id.eq(foreman_val))
            .execute(conn)?;
    }

    jobs.filter(id.eq(job_id)).first::<Job>(conn)
}

/// Marks a job inactive. Inactive jobs reject new time capture but keep
/// their history intact.
pub fn deactivate_job(
    conn: &mut SqliteConnection,
    job_id: i32,
) -> Result<Job, diesel::result::Error> {
    update_job(
        conn,
        job_id,
        None,
        None,
        None,
        Some(JOB_STATUS_INACTIVE.to_string()),
        None,
    )
}

/// Replaces the job's required-trade set wholesale.
pub fn set_required_trades(
    conn: &mut SqliteConnection,
    target_job_id: i32,
    trade_ids: &[i32],
) -> Result<(), diesel::result::Error> {
    use crate::schema::job_trades::dsl::*;

    diesel::delete(job_trades.filter(job_id.eq(target_job_id))).execute(conn)?;
    for &target_trade_id in trade_ids {
        diesel::insert_into(job_trades)
            .values(&JobTrade {
                job_id: target_job_id,
                trade_id: target_trade_id,
            })
            .execute(conn)?;
    }
    Ok(())
}

/// Lists the trades a job requires.
pub fn get_required_trades(
    conn: &mut SqliteConnection,
    target_job_id: i32,
) -> Result<Vec<Trade>, diesel::result::Error> {
    use crate::schema::{job_trades, trades};
    job_trades::table
        .inner_join(trades::table)
        .filter(job_trades::job_id.eq(target_job_id))
        .select(Trade::as_select())
        .order(trades::id.asc())
        .load::<Trade>(conn)
}

/// Assigns a worker to a job's crew. Idempotent.
pub fn assign_worker(
    conn: &mut SqliteConnection,
    target_job_id: i32,
    target_worker_id: i32,
) -> Result<(), diesel::result::Error> {
    use crate::schema::job_workers::dsl::*;
    diesel::insert_or_ignore_into(job_workers)
        .values(&NewJobWorker {
            job_id: target_job_id,
            worker_id: target_worker_id,
            assigned_at: Utc::now().naive_utc(),
        })
        .execute(conn)?;
    Ok(())
}

/// Removes a worker from a job's crew. Existing time records survive.
pub fn unassign_worker(
    conn: &mut SqliteConnection,
    target_job_id: i32,
    target_worker_id: i32,
) -> Result<(), diesel::result::Error> {
    use crate::schema::job_workers::dsl::*;
    diesel::delete(
        job_workers
            .filter(job_id.eq(target_job_id))
            .filter(worker_id.eq(target_worker_id)),
    )
    .execute(conn)?;
    Ok(())
}

/// Lists the crew assigned to a job.
pub fn get_job_workers(
    conn: &mut SqliteConnection,
    target_job_id: i32,
) -> Result<Vec<Worker>, diesel::result::Error> {
    use crate::schema::{job_workers, workers};
    job_workers::table
        .inner_join(workers::table)
        .filter(job_workers::job_id.eq(target_job_id))
        .select(Worker::as_select())
        .order(workers::id.asc())
        .load::<Worker>(conn)
}

/// Lists the active jobs a worker is assigned to, for the clock-in and
/// timesheet pickers.
pub fn get_jobs_for_worker(
    conn: &mut SqliteConnection,
    target_worker_id: i32,
) -> Result<Vec<Job>, diesel::result::Error> {
    use crate::schema::{job_workers, jobs};
    job_workers::table
        .inner_join(jobs::table)
        .filter(job_workers::worker_id.eq(target_worker_id))
        .filter(jobs::status.eq(JOB_STATUS_ACTIVE))
        .select(Job::as_select())
        .order(jobs::id.asc())
        .load::<Job>(conn)
}

/// True when the worker is on the job's crew.
pub fn is_worker_assigned(
    conn: &mut SqliteConnection,
    target_job_id: i32,
    target_worker_id: i32,
) -> Result<bool, diesel::result::Error> {
    use crate::schema::job_workers::dsl::*;
    use diesel::dsl::count_star;
    let n: i64 = job_workers
        .filter(job_id.eq(target_job_id))
        .filter(worker_id.eq(target_worker_id))
        .select(count_star())
        .first(conn)?;
    Ok(n > 0)
}

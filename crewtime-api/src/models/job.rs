use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable, QueryableByName, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::{job_trades, job_workers, jobs};

pub const JOB_STATUS_ACTIVE: &str = "active";
pub const JOB_STATUS_INACTIVE: &str = "inactive";

#[derive(
    Queryable, Selectable, Identifiable, QueryableByName, Debug, Clone, Serialize, Deserialize, TS,
)]
#[diesel(table_name = jobs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct Job {
    pub id: i32,
    pub code: String, // Will be unique
    pub description: String,
    pub address: Option<String>,
    /// Site coordinates, resolved once by the geocoding adapter and
    /// cached here. Null until geocoded; compliance for this job's
    /// sessions stays `unknown` while null.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: String, // active, inactive
    pub foreman_id: Option<i32>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = jobs)]
pub struct NewJob {
    pub code: String,
    pub description: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: String,
    pub foreman_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

// For API inputs and validation. Explicit coordinates win over the
// address; when only an address is given the geocoding adapter resolves
// it (failure leaves coordinates null).
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct JobInput {
    pub code: String,
    pub description: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub foreman_id: Option<i32>,
    pub required_trades: Option<Vec<i32>>,
}

/// Required-trade link for a job.
#[derive(Queryable, Insertable, Debug)]
#[diesel(table_name = job_trades)]
pub struct JobTrade {
    pub job_id: i32,
    pub trade_id: i32,
}

/// Assignment of a worker to a job.
#[derive(Queryable, Identifiable, Debug, Serialize, TS)]
#[diesel(table_name = job_workers)]
#[diesel(primary_key(job_id, worker_id))]
#[ts(export)]
pub struct JobWorker {
    pub job_id: i32,
    pub worker_id: i32,
    #[ts(type = "string")]
    pub assigned_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = job_workers)]
pub struct NewJobWorker {
    pub job_id: i32,
    pub worker_id: i32,
    pub assigned_at: NaiveDateTime,
}

use chrono::{NaiveDate, NaiveDateTime};
use diesel::{Associations, Identifiable, Insertable, Queryable, QueryableByName, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::time_entries;

/// One logical cell of worked time per (worker, job, activity, date).
/// Immutable once the owning week carries an approval lock.
#[derive(
    Queryable, Selectable, Identifiable, Associations, QueryableByName, Debug, Clone, Serialize,
    Deserialize, TS,
)]
#[diesel(belongs_to(crate::models::job::Job))]
#[diesel(belongs_to(crate::models::labor_activity::LaborActivity))]
#[diesel(table_name = time_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct TimeEntry {
    pub id: i32,
    pub worker_id: i32,
    pub job_id: i32,
    pub labor_activity_id: i32,
    #[ts(type = "string")]
    pub entry_date: NaiveDate,
    pub hours: f64,
    pub notes: Option<String>,
    pub approved: bool,
    pub approved_by: Option<i32>,
    #[ts(type = "string | null")]
    pub approved_at: Option<NaiveDateTime>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = time_entries)]
pub struct NewTimeEntry {
    pub worker_id: i32,
    pub job_id: i32,
    pub labor_activity_id: i32,
    pub entry_date: NaiveDate,
    pub hours: f64,
    pub notes: Option<String>,
    pub approved: bool,
    pub approved_by: Option<i32>,
    pub approved_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

// For API inputs and validation
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct TimeEntryInput {
    /// Omitted for self-entry; foremen and admins set it to act on a
    /// worker's behalf.
    pub worker_id: Option<i32>,
    pub job_id: i32,
    pub labor_activity_id: i32,
    #[ts(type = "string")]
    pub entry_date: NaiveDate,
    pub hours: f64,
    pub notes: Option<String>,
}

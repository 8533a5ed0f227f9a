use chrono::{NaiveDate, NaiveDateTime};
use diesel::{Associations, Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::weekly_approval_locks;

/// The immutability gate created by foreman sign-off on a
/// (worker, job, week-start) tuple. Append-only: rows are never updated,
/// and removal is an out-of-band administrative override.
#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(belongs_to(crate::models::job::Job))]
#[diesel(table_name = weekly_approval_locks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct WeeklyApprovalLock {
    pub id: i32,
    pub worker_id: i32,
    pub job_id: i32,
    /// The Monday anchoring the approved 7-day period.
    #[ts(type = "string")]
    pub week_start: NaiveDate,
    pub approved_by: i32,
    #[ts(type = "string")]
    pub approved_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = weekly_approval_locks)]
pub struct NewWeeklyApprovalLock {
    pub worker_id: i32,
    pub job_id: i32,
    pub week_start: NaiveDate,
    pub approved_by: i32,
    pub approved_at: NaiveDateTime,
}

// For API inputs and validation
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct ApprovalInput {
    pub worker_id: i32,
    pub job_id: i32,
    /// Any date inside the target week is accepted; it is normalized to
    /// that week's Monday.
    #[ts(type = "string")]
    pub week_start: NaiveDate,
}

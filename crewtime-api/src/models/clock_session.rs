use chrono::NaiveDateTime;
use diesel::{Associations, Identifiable, Insertable, Queryable, QueryableByName, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::clock_sessions;

/// A clock-in/out session. Closed (never deleted) on clock-out or by the
/// auto clock-out sweep. Distance fields are null, not zero, when no GPS
/// reading was available.
#[derive(
    Queryable, Selectable, Identifiable, Associations, QueryableByName, Debug, Clone, Serialize,
    Deserialize, TS,
)]
#[diesel(belongs_to(crate::models::job::Job))]
#[diesel(table_name = clock_sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct ClockSession {
    pub id: i32,
    pub worker_id: i32,
    pub job_id: i32,
    pub labor_activity_id: i32,
    #[ts(type = "string")]
    pub clock_in: NaiveDateTime,
    #[ts(type = "string | null")]
    pub clock_out: Option<NaiveDateTime>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub clock_in_latitude: Option<f64>,
    pub clock_in_longitude: Option<f64>,
    pub clock_in_accuracy: Option<f64>,
    pub clock_in_distance_mi: Option<f64>,
    pub clock_out_latitude: Option<f64>,
    pub clock_out_longitude: Option<f64>,
    pub clock_out_accuracy: Option<f64>,
    pub clock_out_distance_mi: Option<f64>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

impl ClockSession {
    /// Duration in hours, measured against `now` while the session is
    /// still open. Rounded to 2 decimal places like the hours column.
    pub fn duration_hours(&self, now: NaiveDateTime) -> f64 {
        let end = self.clock_out.unwrap_or(now);
        let secs = (end - self.clock_in).num_seconds() as f64;
        (secs / 3600.0 * 100.0).round() / 100.0
    }
}

#[derive(Insertable)]
#[diesel(table_name = clock_sessions)]
pub struct NewClockSession {
    pub worker_id: i32,
    pub job_id: i32,
    pub labor_activity_id: i32,
    pub clock_in: NaiveDateTime,
    pub notes: Option<String>,
    pub is_active: bool,
    pub clock_in_latitude: Option<f64>,
    pub clock_in_longitude: Option<f64>,
    pub clock_in_accuracy: Option<f64>,
    pub clock_in_distance_mi: Option<f64>,
    pub created_at: NaiveDateTime,
}

/// Optional GPS reading attached to a clock action. Absence is a valid,
/// first-class input: GPS is advisory and the action succeeds without it.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, TS)]
#[ts(export)]
pub struct GpsReading {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
}

// For API inputs and validation
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct ClockInRequest {
    pub job_id: i32,
    pub labor_activity_id: i32,
    pub notes: Option<String>,
    pub gps: Option<GpsReading>,
    pub device_id: Option<String>,
}

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct ClockOutRequest {
    pub gps: Option<GpsReading>,
    pub device_id: Option<String>,
}

use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::Serialize;
use ts_rs::TS;

use crate::schema::device_logs;

/// Append-only audit row captured at clock-in/out, for forensic review
/// only. Nothing enforces anything against it at write time.
#[derive(Queryable, Selectable, Identifiable, Debug, Serialize, TS)]
#[diesel(table_name = device_logs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct DeviceLog {
    pub id: i32,
    pub worker_id: Option<i32>,
    pub action: String, // 'IN' or 'OUT'
    pub device_id: Option<String>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[ts(type = "string")]
    pub ts: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = device_logs)]
pub struct NewDeviceLog {
    pub worker_id: Option<i32>,
    pub action: String,
    pub device_id: Option<String>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub ts: NaiveDateTime,
}

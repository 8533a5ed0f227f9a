use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::models::{DeviceLog, NewDeviceLog};

/// Appends one audit row. Never consulted at write time by anything
/// else; failures here must not fail the clock action that produced it.
pub fn insert_device_log(
    conn: &mut SqliteConnection,
    log: NewDeviceLog,
) -> Result<(), diesel::result::Error> {
    use crate::schema::device_logs::dsl::*;
    diesel::insert_into(device_logs).values(&log).execute(conn)?;
    Ok(())
}

/// A worker's audit trail, newest first.
pub fn list_device_logs_for_worker(
    conn: &mut SqliteConnection,
    target_worker_id: i32,
) -> Result<Vec<DeviceLog>, diesel::result::Error> {
    use crate::schema::device_logs::dsl::*;
    device_logs
        .filter(worker_id.eq(target_worker_id))
        .order(ts.desc())
        .load::<DeviceLog>(conn)
}

/// Audit rows in a time window, newest first.
pub fn list_device_logs_in_window(
    conn: &mut SqliteConnection,
    from: NaiveDateTime,
    to_exclusive: NaiveDateTime,
) -> Result<Vec<DeviceLog>, diesel::result::Error> {
    use crate::schema::device_logs::dsl::*;
    device_logs
        .filter(ts.ge(from))
        .filter(ts.lt(to_exclusive))
        .order(ts.desc())
        .load::<DeviceLog>(conn)
}

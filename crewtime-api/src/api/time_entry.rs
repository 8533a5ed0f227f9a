//! API endpoints for manual timesheet entry.
//!
//! Workers write their own entries; foremen and admins may act on any
//! worker's behalf via the `worker_id` field. Every write is gated on
//! the weekly approval lock.

use chrono::Utc;
use rocket::Route;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{ErrorResponse, db_error_response, error_response, forbidden, parse_date};
use crate::approval::{week_end_exclusive, week_start_for};
use crate::models::{TimeEntry, TimeEntryInput};
use crate::orm::DbConn;
use crate::orm::time_entry::{
    create_time_entry, delete_time_entry, get_time_entry, list_entries_for_worker,
    update_time_entry,
};
use crate::session_guards::AuthenticatedWorker;

/// Create Time Entry endpoint.
///
/// - **URL:** `/api/1/timesheet`
/// - **Method:** `POST`
/// - **Purpose:** Records one cell of worked hours
/// - **Authentication:** Required; `worker_id` other than your own
///   requires the foreman or admin role
#[post("/1/timesheet", data = "<input>")]
pub async fn create_entry(
    db: DbConn,
    input: Json<TimeEntryInput>,
    auth: AuthenticatedWorker,
) -> Result<status::Created<Json<TimeEntry>>, status::Custom<Json<ErrorResponse>>> {
    let input = input.into_inner();
    let target_worker_id = input.worker_id.unwrap_or(auth.worker.id);
    if !auth.can_act_for(target_worker_id) {
        return Err(forbidden("not allowed to enter time for another worker"));
    }

    db.run(move |conn| {
        create_time_entry(conn, target_worker_id, &input)
            .map(|e| status::Created::new("/").body(Json(e)))
            .map_err(error_response)
    })
    .await
}

/// List Time Entries endpoint.
///
/// - **URL:** `/api/1/timesheet?from=YYYY-MM-DD&to=YYYY-MM-DD&worker_id=`
/// - **Method:** `GET`
/// - **Purpose:** A worker's entries in a date range (`to` exclusive);
///   defaults to the current week
#[get("/1/timesheet?<from>&<to>&<worker_id>")]
pub async fn list_entries(
    db: DbConn,
    from: Option<String>,
    to: Option<String>,
    worker_id: Option<i32>,
    auth: AuthenticatedWorker,
) -> Result<Json<Vec<TimeEntry>>, status::Custom<Json<ErrorResponse>>> {
    let target_worker_id = worker_id.unwrap_or(auth.worker.id);
    if !auth.can_act_for(target_worker_id) {
        return Err(forbidden("not allowed to view another worker's timesheet"));
    }

    let today = Utc::now().date_naive();
    let from = match from {
        Some(raw) => parse_date(&raw)?,
        None => week_start_for(today),
    };
    let to = match to {
        Some(raw) => parse_date(&raw)?,
        None => week_end_exclusive(week_start_for(today)),
    };

    db.run(move |conn| {
        list_entries_for_worker(conn, target_worker_id, from, to)
            .map(Json)
            .map_err(db_error_response)
    })
    .await
}

/// Fields that may change on an existing entry.
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct TimeEntryUpdate {
    pub hours: Option<f64>,
    pub notes: Option<String>,
}

/// Update Time Entry endpoint. Blocked once the entry's week is
/// approval-locked.
#[put("/1/timesheet/<entry_id>", data = "<update>")]
pub async fn update_entry(
    db: DbConn,
    entry_id: i32,
    update: Json<TimeEntryUpdate>,
    auth: AuthenticatedWorker,
) -> Result<Json<TimeEntry>, status::Custom<Json<ErrorResponse>>> {
    let actor = auth;
    db.run(move |conn| {
        let entry = get_time_entry(conn, entry_id)
            .map_err(db_error_response)?
            .ok_or_else(|| {
                status::Custom(
                    Status::NotFound,
                    Json(ErrorResponse {
                        error: "time entry not found".to_string(),
                    }),
                )
            })?;
        if !actor.can_act_for(entry.worker_id) {
            return Err(forbidden("not allowed to edit another worker's entry"));
        }
        let update = update.into_inner();
        update_time_entry(conn, entry_id, update.hours, update.notes.map(Some))
            .map(Json)
            .map_err(error_response)
    })
    .await
}

/// Delete Time Entry endpoint. Blocked once the entry's week is
/// approval-locked.
#[delete("/1/timesheet/<entry_id>")]
pub async fn delete_entry(
    db: DbConn,
    entry_id: i32,
    auth: AuthenticatedWorker,
) -> Result<Status, status::Custom<Json<ErrorResponse>>> {
    let actor = auth;
    db.run(move |conn| {
        let entry = get_time_entry(conn, entry_id)
            .map_err(db_error_response)?
            .ok_or_else(|| {
                status::Custom(
                    Status::NotFound,
                    Json(ErrorResponse {
                        error: "time entry not found".to_string(),
                    }),
                )
            })?;
        if !actor.can_act_for(entry.worker_id) {
            return Err(forbidden("not allowed to delete another worker's entry"));
        }
        delete_time_entry(conn, entry_id)
            .map(|_| Status::NoContent)
            .map_err(error_response)
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![create_entry, list_entries, update_entry, delete_entry]
}

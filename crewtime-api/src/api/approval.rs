//! API endpoints for weekly approval: review, sign-off, and listing
//! locks. Unlocking is an out-of-band administrative override and lives
//! in the admin CLI, not here.

use rocket::Route;
use rocket::response::status;
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use super::{ErrorResponse, db_error_response, error_response, parse_date};
use crate::approval::{WeekSummary, summarize_week, week_start_for};
use crate::models::{ApprovalInput, TimeEntry, WeeklyApprovalLock};
use crate::orm::DbConn;
use crate::orm::time_entry::entries_for_week;
use crate::orm::weekly_approval::{approve_week, get_lock, list_all_locks, list_locks_for_job};
use crate::session_guards::ForemanWorker;

/// One worker-week under review: entries, daily totals, completeness,
/// and the existing lock if the week was already signed off.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct WeekReview {
    pub worker_id: i32,
    pub job_id: i32,
    pub summary: WeekSummary,
    pub entries: Vec<TimeEntry>,
    pub lock: Option<WeeklyApprovalLock>,
}

/// Week Review endpoint.
///
/// - **URL:** `/api/1/approvals/review?worker_id=&job_id=&date=YYYY-MM-DD`
/// - **Method:** `GET`
/// - **Purpose:** What the foreman sees before signing off a week.
///   `date` may be any day inside the target week.
/// - **Authentication:** Foreman or admin role required
#[get("/1/approvals/review?<worker_id>&<job_id>&<date>")]
pub async fn review_week(
    db: DbConn,
    worker_id: i32,
    job_id: i32,
    date: String,
    _foreman: ForemanWorker,
) -> Result<Json<WeekReview>, status::Custom<Json<ErrorResponse>>> {
    let monday = week_start_for(parse_date(&date)?);

    db.run(move |conn| {
        let entries =
            entries_for_week(conn, worker_id, job_id, monday).map_err(db_error_response)?;
        let lock = get_lock(conn, worker_id, job_id, monday).map_err(db_error_response)?;
        Ok(Json(WeekReview {
            worker_id,
            job_id,
            summary: summarize_week(monday, &entries),
            entries,
            lock,
        }))
    })
    .await
}

/// Approve Week endpoint.
///
/// - **URL:** `/api/1/approvals`
/// - **Method:** `POST`
/// - **Purpose:** Signs off a (worker, job, week), creating the lock
///   and stamping every entry in the window
/// - **Authentication:** Foreman or admin role required
///
/// Approving an empty or incomplete week is allowed; completeness is
/// advisory. Approving twice returns 400.
#[post("/1/approvals", data = "<input>")]
pub async fn approve_week_endpoint(
    db: DbConn,
    input: Json<ApprovalInput>,
    foreman: ForemanWorker,
) -> Result<status::Created<Json<WeeklyApprovalLock>>, status::Custom<Json<ErrorResponse>>> {
    let approver_id = foreman.worker.id;
    db.run(move |conn| {
        approve_week(conn, &input.into_inner(), approver_id)
            .map(|lock| status::Created::new("/").body(Json(lock)))
            .map_err(error_response)
    })
    .await
}

/// List Approval Locks endpoint. `job_id` narrows to one job.
#[get("/1/approvals?<job_id>")]
pub async fn list_locks(
    db: DbConn,
    job_id: Option<i32>,
    _foreman: ForemanWorker,
) -> Result<Json<Vec<WeeklyApprovalLock>>, status::Custom<Json<ErrorResponse>>> {
    db.run(move |conn| {
        let result = match job_id {
            Some(jid) => list_locks_for_job(conn, jid),
            None => list_all_locks(conn),
        };
        result.map(Json).map_err(db_error_response)
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![review_week, approve_week_endpoint, list_locks]
}

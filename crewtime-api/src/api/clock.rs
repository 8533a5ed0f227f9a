//! API endpoints for clock-in/out sessions.
//!
//! Each clock action also appends a device-log audit row (best effort:
//! a failed audit write never fails the clock action).

use chrono::Utc;
use rocket::Route;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};
use rocket::response::status;
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use super::{ErrorResponse, db_error_response, error_response};
use crate::models::{ClockInRequest, ClockOutRequest, ClockSession, NewDeviceLog, TimeEntry};
use crate::orm::DbConn;
use crate::orm::clock_session::{active_session, clock_in, clock_out};
use crate::orm::device_log::insert_device_log;
use crate::session_guards::AuthenticatedWorker;

/// Request metadata captured into the device log.
#[derive(Debug, Clone)]
pub struct ClientMeta {
    pub user_agent: Option<String>,
    pub ip: Option<String>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientMeta {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        Outcome::Success(ClientMeta {
            user_agent: request.headers().get_one("User-Agent").map(String::from),
            ip: request.client_ip().map(|ip| ip.to_string()),
        })
    }
}

fn log_clock_action(
    conn: &mut diesel::SqliteConnection,
    worker_id: i32,
    action: &str,
    device_id: Option<String>,
    meta: &ClientMeta,
    gps: Option<crate::models::GpsReading>,
) {
    let log = NewDeviceLog {
        worker_id: Some(worker_id),
        action: action.to_string(),
        device_id,
        user_agent: meta.user_agent.clone(),
        ip: meta.ip.clone(),
        latitude: gps.map(|g| g.latitude),
        longitude: gps.map(|g| g.longitude),
        ts: Utc::now().naive_utc(),
    };
    if let Err(e) = insert_device_log(conn, log) {
        eprintln!("Failed to write device log for worker {}: {:?}", worker_id, e);
    }
}

/// Clock In endpoint.
///
/// - **URL:** `/api/1/clock/in`
/// - **Method:** `POST`
/// - **Purpose:** Opens a clock session on a job
/// - **Authentication:** Required
///
/// GPS is optional and advisory. A second clock-in while a session is
/// open returns 409.
#[post("/1/clock/in", data = "<req>")]
pub async fn clock_in_endpoint(
    db: DbConn,
    req: Json<ClockInRequest>,
    auth: AuthenticatedWorker,
    meta: ClientMeta,
) -> Result<status::Created<Json<ClockSession>>, status::Custom<Json<ErrorResponse>>> {
    let worker_id = auth.worker.id;
    let req = req.into_inner();
    db.run(move |conn| {
        let session = clock_in(conn, worker_id, &req, Utc::now().naive_utc())
            .map_err(error_response)?;
        log_clock_action(conn, worker_id, "IN", req.device_id.clone(), &meta, req.gps);
        Ok(status::Created::new("/").body(Json(session)))
    })
    .await
}

/// The closed session plus the time entry it materialized. `time_entry`
/// is null when the week was already approval-locked.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct ClockOutResponse {
    pub session: ClockSession,
    pub time_entry: Option<TimeEntry>,
}

/// Clock Out endpoint.
///
/// - **URL:** `/api/1/clock/out`
/// - **Method:** `POST`
/// - **Purpose:** Closes the open session and materializes its hours
/// - **Authentication:** Required
#[post("/1/clock/out", data = "<req>")]
pub async fn clock_out_endpoint(
    db: DbConn,
    req: Json<ClockOutRequest>,
    auth: AuthenticatedWorker,
    meta: ClientMeta,
) -> Result<Json<ClockOutResponse>, status::Custom<Json<ErrorResponse>>> {
    let worker_id = auth.worker.id;
    let req = req.into_inner();
    db.run(move |conn| {
        let (session, time_entry) = clock_out(conn, worker_id, req.gps, Utc::now().naive_utc())
            .map_err(error_response)?;
        log_clock_action(conn, worker_id, "OUT", req.device_id.clone(), &meta, req.gps);
        Ok(Json(ClockOutResponse {
            session,
            time_entry,
        }))
    })
    .await
}

/// The open session with its running hour count.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct ActiveSessionResponse {
    pub session: ClockSession,
    pub hours_so_far: f64,
}

/// Active Session endpoint.
///
/// - **URL:** `/api/1/clock/active`
/// - **Method:** `GET`
/// - **Purpose:** The caller's open session, or 404 when not clocked in
#[get("/1/clock/active")]
pub async fn active_session_endpoint(
    db: DbConn,
    auth: AuthenticatedWorker,
) -> Result<Json<ActiveSessionResponse>, status::Custom<Json<ErrorResponse>>> {
    let worker_id = auth.worker.id;
    db.run(move |conn| match active_session(conn, worker_id) {
        Ok(Some(session)) => {
            let hours_so_far = session.duration_hours(Utc::now().naive_utc());
            Ok(Json(ActiveSessionResponse {
                session,
                hours_so_far,
            }))
        }
        Ok(None) => Err(status::Custom(
            Status::NotFound,
            Json(ErrorResponse {
                error: "not clocked in".to_string(),
            }),
        )),
        Err(e) => Err(db_error_response(e)),
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![clock_in_endpoint, clock_out_endpoint, active_session_endpoint]
}

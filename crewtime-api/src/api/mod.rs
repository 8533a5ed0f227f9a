//! HTTP surface, mounted under `/api`.
//!
//! Every module exposes a `routes()` function; `routes()` here chains
//! them all for mounting.

use rocket::Route;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::error::CoreError;

pub mod activity;
pub mod approval;
pub mod clock;
pub mod job;
pub mod report;
pub mod status_api;
pub mod time_entry;
pub mod worker;

/// Error response structure for API failures.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

/// Maps a domain error onto an HTTP status and JSON body. Database
/// detail is logged server-side, never echoed to the client.
pub(crate) fn error_response(e: CoreError) -> status::Custom<Json<ErrorResponse>> {
    let (code, message) = match &e {
        CoreError::Validation(_) => (Status::BadRequest, e.to_string()),
        CoreError::WeekLocked { .. } => (Status::Conflict, e.to_string()),
        CoreError::AlreadyClockedIn(_) => (Status::Conflict, e.to_string()),
        CoreError::NotFound(_) => (Status::NotFound, e.to_string()),
        CoreError::Db(inner) => {
            eprintln!("Database error: {:?}", inner);
            (Status::InternalServerError, "Database error".to_string())
        }
    };
    status::Custom(code, Json(ErrorResponse { error: message }))
}

pub(crate) fn db_error_response(e: diesel::result::Error) -> status::Custom<Json<ErrorResponse>> {
    error_response(CoreError::Db(e))
}

pub(crate) fn forbidden(message: &str) -> status::Custom<Json<ErrorResponse>> {
    status::Custom(
        Status::Forbidden,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Parses an ISO `YYYY-MM-DD` query parameter.
pub(crate) fn parse_date(
    raw: &str,
) -> Result<chrono::NaiveDate, status::Custom<Json<ErrorResponse>>> {
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        status::Custom(
            Status::BadRequest,
            Json(ErrorResponse {
                error: format!("invalid date '{raw}', expected YYYY-MM-DD"),
            }),
        )
    })
}

/// Returns all routes across the API modules.
pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(status_api::routes());
    routes.extend(worker::routes());
    routes.extend(activity::routes());
    routes.extend(job::routes());
    routes.extend(time_entry::routes());
    routes.extend(clock::routes());
    routes.extend(approval::routes());
    routes.extend(report::routes());
    routes
}

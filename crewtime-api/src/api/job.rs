//! API endpoints for managing jobs, crews and site coordinates.
//!
//! Job creation resolves an address to coordinates through the managed
//! geocoder when none are given explicitly. Geocoding failure is
//! logged, not fatal: the job saves with null coordinates.

use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{ErrorResponse, db_error_response, forbidden};
use crate::geo::Coord;
use crate::geocode::Geocoder;
use crate::models::{JOB_STATUS_ACTIVE, JOB_STATUS_INACTIVE, Job, JobInput, LaborActivity, Worker};
use crate::orm::DbConn;
use crate::orm::job::{
    assign_worker, deactivate_job, get_job, get_job_workers, get_jobs_for_worker, insert_job,
    list_all_jobs, set_required_trades, unassign_worker, update_job,
};
use crate::orm::labor_activity::list_activities_for_job;
use crate::session_guards::{AdminWorker, AuthenticatedWorker, ForemanWorker};

/// Resolves the coordinates for a job payload: explicit coordinates
/// win; otherwise the address is geocoded.
async fn resolve_coord(
    geocoder: &State<Box<dyn Geocoder>>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    address: Option<&str>,
) -> Option<Coord> {
    if let Some(coord) = Coord::from_parts(latitude, longitude) {
        return Some(coord);
    }
    let address = address?;
    match geocoder.geocode(address).await {
        Ok(found) => found,
        Err(e) => {
            eprintln!("Geocoding failed for '{}': {}", address, e);
            None
        }
    }
}

/// Create Job endpoint.
///
/// - **URL:** `/api/1/jobs`
/// - **Method:** `POST`
/// - **Authentication:** Admin role required
#[post("/1/jobs", data = "<input>")]
pub async fn create_job(
    db: DbConn,
    geocoder: &State<Box<dyn Geocoder>>,
    input: Json<JobInput>,
    _admin: AdminWorker,
) -> Result<status::Created<Json<Job>>, status::Custom<Json<ErrorResponse>>> {
    let input = input.into_inner();
    let coord = resolve_coord(
        geocoder,
        input.latitude,
        input.longitude,
        input.address.as_deref(),
    )
    .await;

    db.run(move |conn| {
        insert_job(conn, input, coord)
            .map(|j| status::Created::new("/").body(Json(j)))
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                ) => status::Custom(
                    Status::Conflict,
                    Json(ErrorResponse {
                        error: "a job with this code already exists".to_string(),
                    }),
                ),
                other => db_error_response(other),
            })
    })
    .await
}

/// List Jobs endpoint. Foremen and admins see every job; workers see
/// only the active jobs they are assigned to.
#[get("/1/jobs")]
pub async fn list_jobs(
    db: DbConn,
    auth: AuthenticatedWorker,
) -> Result<Json<Vec<Job>>, status::Custom<Json<ErrorResponse>>> {
    let worker = auth.worker;
    db.run(move |conn| {
        let result = if worker.is_foreman() || worker.is_admin() {
            list_all_jobs(conn)
        } else {
            get_jobs_for_worker(conn, worker.id)
        };
        result.map(Json).map_err(db_error_response)
    })
    .await
}

/// Get Job endpoint.
#[get("/1/jobs/<job_id>")]
pub async fn get_job_endpoint(
    db: DbConn,
    job_id: i32,
    _auth: AuthenticatedWorker,
) -> Result<Json<Job>, status::Custom<Json<ErrorResponse>>> {
    db.run(move |conn| match get_job(conn, job_id) {
        Ok(Some(j)) => Ok(Json(j)),
        Ok(None) => Err(status::Custom(
            Status::NotFound,
            Json(ErrorResponse {
                error: "job not found".to_string(),
            }),
        )),
        Err(e) => Err(db_error_response(e)),
    })
    .await
}

/// Fields an admin may change on a job. Absent fields are left
/// untouched. Supplying a new address without coordinates re-geocodes.
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct JobUpdate {
    pub description: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: Option<String>,
    pub foreman_id: Option<i32>,
    pub required_trades: Option<Vec<i32>>,
}

/// Update Job endpoint.
///
/// - **URL:** `/api/1/jobs/<job_id>`
/// - **Method:** `PUT`
/// - **Authentication:** Admin role required
#[put("/1/jobs/<job_id>", data = "<update>")]
pub async fn update_job_endpoint(
    db: DbConn,
    geocoder: &State<Box<dyn Geocoder>>,
    job_id: i32,
    update: Json<JobUpdate>,
    _admin: AdminWorker,
) -> Result<Json<Job>, status::Custom<Json<ErrorResponse>>> {
    let update = update.into_inner();

    if let Some(status_val) = &update.status {
        if status_val != JOB_STATUS_ACTIVE && status_val != JOB_STATUS_INACTIVE {
            return Err(status::Custom(
                Status::BadRequest,
                Json(ErrorResponse {
                    error: format!("unknown job status '{status_val}'"),
                }),
            ));
        }
    }

    // Re-resolve coordinates only when the caller touched location.
    let new_coord = if update.latitude.is_some()
        || update.longitude.is_some()
        || update.address.is_some()
    {
        Some(
            resolve_coord(
                geocoder,
                update.latitude,
                update.longitude,
                update.address.as_deref(),
            )
            .await,
        )
    } else {
        None
    };

    db.run(move |conn| {
        if get_job(conn, job_id).map_err(db_error_response)?.is_none() {
            return Err(status::Custom(
                Status::NotFound,
                Json(ErrorResponse {
                    error: "job not found".to_string(),
                }),
            ));
        }

        if let Some(trade_ids) = &update.required_trades {
            set_required_trades(conn, job_id, trade_ids).map_err(db_error_response)?;
        }

        update_job(
            conn,
            job_id,
            update.description,
            update.address,
            new_coord,
            update.status,
            update.foreman_id.map(Some),
        )
        .map(Json)
        .map_err(db_error_response)
    })
    .await
}

/// Deactivate Job endpoint. The job stops accepting time; history is
/// untouched.
#[delete("/1/jobs/<job_id>")]
pub async fn deactivate_job_endpoint(
    db: DbConn,
    job_id: i32,
    _admin: AdminWorker,
) -> Result<Json<Job>, status::Custom<Json<ErrorResponse>>> {
    db.run(move |conn| {
        if get_job(conn, job_id).map_err(db_error_response)?.is_none() {
            return Err(status::Custom(
                Status::NotFound,
                Json(ErrorResponse {
                    error: "job not found".to_string(),
                }),
            ));
        }
        deactivate_job(conn, job_id).map(Json).map_err(db_error_response)
    })
    .await
}

/// Assigns a worker to a job's crew.
#[post("/1/jobs/<job_id>/workers/<worker_id>")]
pub async fn assign_worker_endpoint(
    db: DbConn,
    job_id: i32,
    worker_id: i32,
    _foreman: ForemanWorker,
) -> Result<Status, status::Custom<Json<ErrorResponse>>> {
    db.run(move |conn| {
        if get_job(conn, job_id).map_err(db_error_response)?.is_none() {
            return Err(status::Custom(
                Status::NotFound,
                Json(ErrorResponse {
                    error: "job not found".to_string(),
                }),
            ));
        }
        assign_worker(conn, job_id, worker_id)
            .map(|_| Status::NoContent)
            .map_err(db_error_response)
    })
    .await
}

/// Removes a worker from a job's crew.
#[delete("/1/jobs/<job_id>/workers/<worker_id>")]
pub async fn unassign_worker_endpoint(
    db: DbConn,
    job_id: i32,
    worker_id: i32,
    _foreman: ForemanWorker,
) -> Result<Status, status::Custom<Json<ErrorResponse>>> {
    db.run(move |conn| {
        unassign_worker(conn, job_id, worker_id)
            .map(|_| Status::NoContent)
            .map_err(db_error_response)
    })
    .await
}

/// Lists the crew assigned to a job.
#[get("/1/jobs/<job_id>/workers")]
pub async fn list_job_workers(
    db: DbConn,
    job_id: i32,
    _foreman: ForemanWorker,
) -> Result<Json<Vec<Worker>>, status::Custom<Json<ErrorResponse>>> {
    db.run(move |conn| {
        get_job_workers(conn, job_id)
            .map(Json)
            .map_err(db_error_response)
    })
    .await
}

/// Lists the labor activities available on a job, filtered by its
/// required trades. Workers use this to fill the activity picker, so a
/// crew assignment is enough to read it.
#[get("/1/jobs/<job_id>/activities")]
pub async fn list_job_activities(
    db: DbConn,
    job_id: i32,
    auth: AuthenticatedWorker,
) -> Result<Json<Vec<LaborActivity>>, status::Custom<Json<ErrorResponse>>> {
    let worker = auth.worker;
    db.run(move |conn| {
        if get_job(conn, job_id).map_err(db_error_response)?.is_none() {
            return Err(status::Custom(
                Status::NotFound,
                Json(ErrorResponse {
                    error: "job not found".to_string(),
                }),
            ));
        }
        if worker.is_worker()
            && !crate::orm::job::is_worker_assigned(conn, job_id, worker.id)
                .map_err(db_error_response)?
        {
            return Err(forbidden("not assigned to this job"));
        }
        list_activities_for_job(conn, job_id)
            .map(Json)
            .map_err(db_error_response)
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![
        create_job,
        list_jobs,
        get_job_endpoint,
        update_job_endpoint,
        deactivate_job_endpoint,
        assign_worker_endpoint,
        unassign_worker_endpoint,
        list_job_workers,
        list_job_activities
    ]
}

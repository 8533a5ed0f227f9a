//! API endpoints for managing the worker roster.
//!
//! Creation and edits are admin-only. Workers are deactivated, never
//! deleted, so historical time records stay attached.

use rocket::Route;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{ErrorResponse, db_error_response, forbidden};
use crate::models::{ROLE_ADMIN, ROLE_FOREMAN, ROLE_WORKER, Trade, Worker, WorkerInput};
use crate::orm::DbConn;
use crate::orm::worker::{
    add_worker_trade, deactivate_worker, get_worker, get_worker_trades, insert_worker,
    list_all_workers, remove_worker_trade, update_worker,
};
use crate::session_guards::{AdminWorker, AuthenticatedWorker, ForemanWorker};

fn valid_role(role: &str) -> bool {
    matches!(role, ROLE_WORKER | ROLE_FOREMAN | ROLE_ADMIN)
}

/// Create Worker endpoint.
///
/// - **URL:** `/api/1/workers`
/// - **Method:** `POST`
/// - **Purpose:** Adds a worker to the roster
/// - **Authentication:** Admin role required
#[post("/1/workers", data = "<input>")]
pub async fn create_worker(
    db: DbConn,
    input: Json<WorkerInput>,
    _admin: AdminWorker,
) -> Result<status::Created<Json<Worker>>, status::Custom<Json<ErrorResponse>>> {
    if !valid_role(&input.role) {
        return Err(status::Custom(
            Status::BadRequest,
            Json(ErrorResponse {
                error: format!("unknown role '{}'", input.role),
            }),
        ));
    }

    db.run(move |conn| {
        insert_worker(conn, input.into_inner())
            .map(|w| status::Created::new("/").body(Json(w)))
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                ) => status::Custom(
                    Status::Conflict,
                    Json(ErrorResponse {
                        error: "a worker with this email already exists".to_string(),
                    }),
                ),
                other => db_error_response(other),
            })
    })
    .await
}

/// List Workers endpoint.
///
/// - **URL:** `/api/1/workers`
/// - **Method:** `GET`
/// - **Authentication:** Foreman or admin role required
#[get("/1/workers")]
pub async fn list_workers(
    db: DbConn,
    _foreman: ForemanWorker,
) -> Result<Json<Vec<Worker>>, status::Custom<Json<ErrorResponse>>> {
    db.run(|conn| list_all_workers(conn).map(Json).map_err(db_error_response))
        .await
}

/// Get Worker endpoint. Workers may fetch themselves; foremen and
/// admins may fetch anyone.
#[get("/1/workers/<worker_id>")]
pub async fn get_worker_endpoint(
    db: DbConn,
    worker_id: i32,
    auth: AuthenticatedWorker,
) -> Result<Json<Worker>, status::Custom<Json<ErrorResponse>>> {
    if !auth.can_act_for(worker_id) {
        return Err(forbidden("not allowed to view this worker"));
    }
    db.run(move |conn| match get_worker(conn, worker_id) {
        Ok(Some(w)) => Ok(Json(w)),
        Ok(None) => Err(status::Custom(
            Status::NotFound,
            Json(ErrorResponse {
                error: "worker not found".to_string(),
            }),
        )),
        Err(e) => Err(db_error_response(e)),
    })
    .await
}

/// Fields an admin may change on a worker. Absent fields are left
/// untouched.
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct WorkerUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub uses_clock: Option<bool>,
    pub burden_rate: Option<f64>,
}

/// Update Worker endpoint.
///
/// - **URL:** `/api/1/workers/<worker_id>`
/// - **Method:** `PUT`
/// - **Authentication:** Admin role required
#[put("/1/workers/<worker_id>", data = "<update>")]
pub async fn update_worker_endpoint(
    db: DbConn,
    worker_id: i32,
    update: Json<WorkerUpdate>,
    _admin: AdminWorker,
) -> Result<Json<Worker>, status::Custom<Json<ErrorResponse>>> {
    if let Some(role) = &update.role {
        if !valid_role(role) {
            return Err(status::Custom(
                Status::BadRequest,
                Json(ErrorResponse {
                    error: format!("unknown role '{role}'"),
                }),
            ));
        }
    }

    db.run(move |conn| {
        if get_worker(conn, worker_id).map_err(db_error_response)?.is_none() {
            return Err(status::Custom(
                Status::NotFound,
                Json(ErrorResponse {
                    error: "worker not found".to_string(),
                }),
            ));
        }
        let update = update.into_inner();
        update_worker(
            conn,
            worker_id,
            update.name,
            update.email,
            update.role,
            update.uses_clock,
            update.burden_rate.map(Some),
        )
        .map(Json)
        .map_err(db_error_response)
    })
    .await
}

/// Deactivate Worker endpoint. Cuts session access immediately; the
/// worker's history stays.
#[delete("/1/workers/<worker_id>")]
pub async fn deactivate_worker_endpoint(
    db: DbConn,
    worker_id: i32,
    _admin: AdminWorker,
) -> Result<Json<Worker>, status::Custom<Json<ErrorResponse>>> {
    db.run(move |conn| {
        if get_worker(conn, worker_id).map_err(db_error_response)?.is_none() {
            return Err(status::Custom(
                Status::NotFound,
                Json(ErrorResponse {
                    error: "worker not found".to_string(),
                }),
            ));
        }
        deactivate_worker(conn, worker_id)
            .map(Json)
            .map_err(db_error_response)
    })
    .await
}

/// Adds a trade qualification to a worker.
#[post("/1/workers/<worker_id>/trades/<trade_id>")]
pub async fn add_trade(
    db: DbConn,
    worker_id: i32,
    trade_id: i32,
    _admin: AdminWorker,
) -> Result<Status, status::Custom<Json<ErrorResponse>>> {
    db.run(move |conn| {
        add_worker_trade(conn, worker_id, trade_id)
            .map(|_| Status::NoContent)
            .map_err(db_error_response)
    })
    .await
}

/// Removes a trade qualification from a worker.
#[delete("/1/workers/<worker_id>/trades/<trade_id>")]
pub async fn remove_trade(
    db: DbConn,
    worker_id: i32,
    trade_id: i32,
    _admin: AdminWorker,
) -> Result<Status, status::Custom<Json<ErrorResponse>>> {
    db.run(move |conn| {
        remove_worker_trade(conn, worker_id, trade_id)
            .map(|_| Status::NoContent)
            .map_err(db_error_response)
    })
    .await
}

/// Lists a worker's trade qualifications.
#[get("/1/workers/<worker_id>/trades")]
pub async fn list_trades(
    db: DbConn,
    worker_id: i32,
    auth: AuthenticatedWorker,
) -> Result<Json<Vec<Trade>>, status::Custom<Json<ErrorResponse>>> {
    if !auth.can_act_for(worker_id) {
        return Err(forbidden("not allowed to view this worker"));
    }
    db.run(move |conn| {
        get_worker_trades(conn, worker_id)
            .map(Json)
            .map_err(db_error_response)
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![
        create_worker,
        list_workers,
        get_worker_endpoint,
        update_worker_endpoint,
        deactivate_worker_endpoint,
        add_trade,
        remove_trade,
        list_trades
    ]
}

//! API endpoints for the trade and labor-activity catalog.

use rocket::Route;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{ErrorResponse, db_error_response};
use crate::models::{LaborActivity, LaborActivityInput, Trade};
use crate::orm::DbConn;
use crate::orm::labor_activity::{
    deactivate_labor_activity, get_labor_activity, insert_labor_activity,
    list_activities_by_trade, list_all_labor_activities, rename_labor_activity,
};
use crate::orm::trade::{get_trade, insert_trade, list_all_trades};
use crate::session_guards::{AdminWorker, AuthenticatedWorker};

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct TradeInput {
    pub name: String,
}

/// Create Trade endpoint.
///
/// - **URL:** `/api/1/trades`
/// - **Method:** `POST`
/// - **Authentication:** Admin role required
#[post("/1/trades", data = "<input>")]
pub async fn create_trade(
    db: DbConn,
    input: Json<TradeInput>,
    _admin: AdminWorker,
) -> Result<status::Created<Json<Trade>>, status::Custom<Json<ErrorResponse>>> {
    db.run(move |conn| {
        insert_trade(conn, input.into_inner().name)
            .map(|t| status::Created::new("/").body(Json(t)))
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                ) => status::Custom(
                    Status::Conflict,
                    Json(ErrorResponse {
                        error: "a trade with this name already exists".to_string(),
                    }),
                ),
                other => db_error_response(other),
            })
    })
    .await
}

/// List Trades endpoint.
#[get("/1/trades")]
pub async fn list_trades(
    db: DbConn,
    _auth: AuthenticatedWorker,
) -> Result<Json<Vec<Trade>>, status::Custom<Json<ErrorResponse>>> {
    db.run(|conn| list_all_trades(conn).map(Json).map_err(db_error_response))
        .await
}

/// Create Labor Activity endpoint.
///
/// - **URL:** `/api/1/activities`
/// - **Method:** `POST`
/// - **Authentication:** Admin role required
#[post("/1/activities", data = "<input>")]
pub async fn create_activity(
    db: DbConn,
    input: Json<LaborActivityInput>,
    _admin: AdminWorker,
) -> Result<status::Created<Json<LaborActivity>>, status::Custom<Json<ErrorResponse>>> {
    db.run(move |conn| {
        let input = input.into_inner();
        if get_trade(conn, input.trade_id).map_err(db_error_response)?.is_none() {
            return Err(status::Custom(
                Status::NotFound,
                Json(ErrorResponse {
                    error: "trade not found".to_string(),
                }),
            ));
        }
        insert_labor_activity(conn, input)
            .map(|a| status::Created::new("/").body(Json(a)))
            .map_err(db_error_response)
    })
    .await
}

/// List Labor Activities endpoint. `trade_id` narrows to one trade's
/// active activities; without it, every activity is returned.
#[get("/1/activities?<trade_id>")]
pub async fn list_activities(
    db: DbConn,
    trade_id: Option<i32>,
    _auth: AuthenticatedWorker,
) -> Result<Json<Vec<LaborActivity>>, status::Custom<Json<ErrorResponse>>> {
    db.run(move |conn| {
        let result = match trade_id {
            Some(tid) => list_activities_by_trade(conn, tid),
            None => list_all_labor_activities(conn),
        };
        result.map(Json).map_err(db_error_response)
    })
    .await
}

#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct ActivityRename {
    pub name: String,
}

/// Rename Labor Activity endpoint.
#[put("/1/activities/<activity_id>", data = "<update>")]
pub async fn rename_activity(
    db: DbConn,
    activity_id: i32,
    update: Json<ActivityRename>,
    _admin: AdminWorker,
) -> Result<Json<LaborActivity>, status::Custom<Json<ErrorResponse>>> {
    db.run(move |conn| {
        if get_labor_activity(conn, activity_id)
            .map_err(db_error_response)?
            .is_none()
        {
            return Err(status::Custom(
                Status::NotFound,
                Json(ErrorResponse {
                    error: "labor activity not found".to_string(),
                }),
            ));
        }
        rename_labor_activity(conn, activity_id, update.into_inner().name)
            .map(Json)
            .map_err(db_error_response)
    })
    .await
}

/// Deactivate Labor Activity endpoint. Historical entries keep their
/// reference; the activity just leaves the pickers.
#[delete("/1/activities/<activity_id>")]
pub async fn deactivate_activity(
    db: DbConn,
    activity_id: i32,
    _admin: AdminWorker,
) -> Result<Json<LaborActivity>, status::Custom<Json<ErrorResponse>>> {
    db.run(move |conn| {
        if get_labor_activity(conn, activity_id)
            .map_err(db_error_response)?
            .is_none()
        {
            return Err(status::Custom(
                Status::NotFound,
                Json(ErrorResponse {
                    error: "labor activity not found".to_string(),
                }),
            ));
        }
        deactivate_labor_activity(conn, activity_id)
            .map(Json)
            .map_err(db_error_response)
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![
        create_trade,
        list_trades,
        create_activity,
        list_activities,
        rename_activity,
        deactivate_activity
    ]
}

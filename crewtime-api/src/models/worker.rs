use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable, QueryableByName, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::workers;

/// Role names stored in `workers.role`.
pub const ROLE_WORKER: &str = "worker";
pub const ROLE_FOREMAN: &str = "foreman";
pub const ROLE_ADMIN: &str = "admin";

#[derive(
    Queryable, Selectable, Identifiable, QueryableByName, Debug, Clone, Serialize, Deserialize, TS,
)]
#[diesel(table_name = workers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct Worker {
    pub id: i32,
    pub name: String,
    pub email: String, // Will be unique
    pub role: String,  // worker, foreman, admin
    pub is_active: bool,
    /// Advisory capture-method flag: clock-in/out vs manual entry. Not
    /// enforced at the data layer.
    pub uses_clock: bool,
    /// Fully-loaded hourly cost for job costing, distinct from pay rate.
    pub burden_rate: Option<f64>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

impl Worker {
    pub fn is_worker(&self) -> bool {
        self.role == ROLE_WORKER
    }

    pub fn is_foreman(&self) -> bool {
        self.role == ROLE_FOREMAN
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

#[derive(Insertable)]
#[diesel(table_name = workers)]
pub struct NewWorker {
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub uses_clock: bool,
    pub burden_rate: Option<f64>,
    pub created_at: NaiveDateTime,
}

// For API inputs and validation
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct WorkerInput {
    pub name: String,
    pub email: String,
    pub role: String,
    pub uses_clock: Option<bool>,
    pub burden_rate: Option<f64>,
}

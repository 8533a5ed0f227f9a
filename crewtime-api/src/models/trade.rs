use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::{trades, worker_trades};

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize, TS)]
#[diesel(table_name = trades)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct Trade {
    pub id: i32,
    pub name: String, // e.g. drywall, electrical, plumbing
    pub is_active: bool,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = trades)]
pub struct NewTrade {
    pub name: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

/// Qualification link between a worker and a trade.
#[derive(Queryable, Insertable, Debug)]
#[diesel(table_name = worker_trades)]
pub struct WorkerTrade {
    pub worker_id: i32,
    pub trade_id: i32,
}

use chrono::NaiveDateTime;
use diesel::{Associations, Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::labor_activities;

#[derive(
    Queryable, Selectable, Identifiable, Associations, Debug, Clone, Serialize, Deserialize, TS,
)]
#[diesel(belongs_to(crate::models::trade::Trade))]
#[diesel(table_name = labor_activities)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[ts(export)]
pub struct LaborActivity {
    pub id: i32,
    pub name: String,
    pub trade_id: i32,
    /// Disabled activities stay referenced by historical time records;
    /// they are never deleted.
    pub is_active: bool,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = labor_activities)]
pub struct NewLaborActivity {
    pub name: String,
    pub trade_id: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

// For API inputs and validation
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct LaborActivityInput {
    pub name: String,
    pub trade_id: i32,
}

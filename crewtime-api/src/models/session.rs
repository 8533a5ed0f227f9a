use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable, Selectable};

use crate::schema::sessions;

/// Login/logout live outside this service; the sessions table is the
/// interface it hands us. The request guard only ever reads these rows.
#[derive(Queryable, Identifiable, Selectable, Debug)]
#[diesel(table_name = sessions)]
pub struct Session {
    pub id: String, // Opaque session token (UUID or random)
    pub worker_id: i32,
    pub created_at: NaiveDateTime,
    pub expires_at: Option<NaiveDateTime>,
    pub revoked: bool,
}

#[derive(Insertable)]
#[diesel(table_name = sessions)]
pub struct NewSession {
    pub id: String,
    pub worker_id: i32,
    pub created_at: NaiveDateTime,
    pub expires_at: Option<NaiveDateTime>,
    pub revoked: bool,
}

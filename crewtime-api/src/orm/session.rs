use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::models::{NewSession, Session, Worker};

/// Issues a session token for a worker. Token issuance normally happens
/// in the external identity collaborator; this exists for the admin CLI
/// and test seeding.
pub fn insert_session(
    conn: &mut SqliteConnection,
    target_worker_id: i32,
    token: Option<String>,
    expires: Option<NaiveDateTime>,
) -> Result<Session, diesel::result::Error> {
    use crate::schema::sessions::dsl::*;

    let session_token = token.unwrap_or_else(|| Uuid::new_v4().to_string());
    diesel::insert_into(sessions)
        .values(&NewSession {
            id: session_token.clone(),
            worker_id: target_worker_id,
            created_at: Utc::now().naive_utc(),
            expires_at: expires,
            revoked: false,
        })
        .execute(conn)?;

    sessions.filter(id.eq(session_token)).first::<Session>(conn)
}

/// Resolves a token to its worker, enforcing revocation and expiry.
/// Inactive workers resolve to nothing: deactivation cuts access
/// immediately.
pub fn worker_for_token(
    conn: &mut SqliteConnection,
    token: &str,
    now: NaiveDateTime,
) -> Result<Option<Worker>, diesel::result::Error> {
    use crate::schema::{sessions, workers};

    let row = sessions::table
        .inner_join(workers::table)
        .filter(sessions::id.eq(token))
        .filter(sessions::revoked.eq(false))
        .select((Session::as_returning(), Worker::as_select()))
        .first::<(Session, Worker)>(conn)
        .optional()?;

    Ok(match row {
        Some((session, worker)) => {
            let expired = session.expires_at.map(|e| e <= now).unwrap_or(false);
            if expired || !worker.is_active {
                None
            } else {
                Some(worker)
            }
        }
        None => None,
    })
}

/// Revokes a token. Revoking an unknown token is a no-op.
pub fn revoke_session(
    conn: &mut SqliteConnection,
    token: &str,
) -> Result<(), diesel::result::Error> {
    use crate::schema::sessions::dsl::*;
    diesel::update(sessions.filter(id.eq(token)))
        .set(revoked.eq(true))
        .execute(conn)?;
    Ok(())
}

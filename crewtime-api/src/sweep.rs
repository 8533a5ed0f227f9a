//! Auto clock-out sweep.
//!
//! Workers forget to clock out. Every minute the sweep closes any
//! session open longer than the cap, backdating the clock-out to
//! exactly clock-in + cap so a forgotten session never inflates hours.

use chrono::{Duration, NaiveDateTime, Utc};
use rocket::fairing::AdHoc;
use std::time::Duration as StdDuration;

use crate::error::{CoreError, CoreResult};
use crate::orm::DbConn;
use crate::orm::clock_session::{close_session, open_sessions_before};
use diesel::SqliteConnection;

/// Maximum session length before the sweep steps in.
pub const MAX_SESSION_HOURS: i64 = 8;

/// Sweep cadence.
pub const SWEEP_PERIOD_SECS: u64 = 60;

/// Closes every session open longer than [`MAX_SESSION_HOURS`] as of
/// `now`, materializing capped time entries. Returns how many sessions
/// were closed.
///
/// Each session closes in its own transaction; one failure is logged
/// and the sweep moves on. A session another writer closed first counts
/// as already handled, so re-running the sweep over the same window is
/// a no-op.
pub fn close_stale_sessions(conn: &mut SqliteConnection, now: NaiveDateTime) -> CoreResult<usize> {
    let cutoff = now - Duration::hours(MAX_SESSION_HOURS);
    let stale = open_sessions_before(conn, cutoff)?;

    let mut closed = 0;
    for session in stale {
        let capped_out = session.clock_in + Duration::hours(MAX_SESSION_HOURS);
        match close_session(conn, session.id, capped_out, None) {
            Ok(_) => closed += 1,
            Err(CoreError::NotFound(_)) => {} // raced with a manual clock-out
            Err(e) => {
                warn!(
                    "sweep: failed to close session {} for worker {}: {}",
                    session.id, session.worker_id, e
                );
            }
        }
    }
    Ok(closed)
}

/// Creates a Rocket fairing that runs the sweep every
/// [`SWEEP_PERIOD_SECS`] seconds for the life of the server.
pub fn sweep_fairing() -> AdHoc {
    AdHoc::on_liftoff("Auto Clock-Out Sweep", |rocket| {
        Box::pin(async move {
            let Some(conn) = DbConn::get_one(rocket).await else {
                error!("sweep: no database connection available, sweep disabled");
                return;
            };

            rocket::tokio::spawn(async move {
                let mut ticker =
                    rocket::tokio::time::interval(StdDuration::from_secs(SWEEP_PERIOD_SECS));
                loop {
                    ticker.tick().await;
                    let result = conn
                        .run(|c| close_stale_sessions(c, Utc::now().naive_utc()))
                        .await;
                    match result {
                        Ok(0) => {}
                        Ok(n) => info!("sweep: auto clocked out {} stale session(s)", n),
                        Err(e) => warn!("sweep: pass failed: {}", e),
                    }
                }
            });
        })
    })
}

use chrono::{NaiveDateTime, Utc};
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::approval::week_start_for;
use crate::error::{CoreError, CoreResult};
use crate::geo::{Coord, distance_miles};
use crate::models::{
    ClockInRequest, ClockSession, GpsReading, JOB_STATUS_ACTIVE, Job, NewClockSession,
    NewTimeEntry, TimeEntry, Worker,
};
use crate::orm::weekly_approval::week_is_locked;

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

fn reading_coord(gps: Option<GpsReading>) -> Option<Coord> {
    gps.map(|g| Coord::new(g.latitude, g.longitude))
}

/// The worker's open session, if any. At most one can exist; the
/// partial unique index enforces it.
pub fn active_session(
    conn: &mut SqliteConnection,
    target_worker_id: i32,
) -> Result<Option<ClockSession>, diesel::result::Error> {
    use crate::schema::clock_sessions::dsl::*;
    clock_sessions
        .filter(worker_id.eq(target_worker_id))
        .filter(clock_out.is_null())
        .first::<ClockSession>(conn)
        .optional()
}

/// Opens a clock session for the worker.
///
/// GPS is advisory: a missing reading still clocks in, with null
/// distance. A concurrent second clock-in loses at the index and maps
/// to `AlreadyClockedIn` rather than surfacing a constraint error.
pub fn clock_in(
    conn: &mut SqliteConnection,
    target_worker_id: i32,
    req: &ClockInRequest,
    now: NaiveDateTime,
) -> CoreResult<ClockSession> {
    use crate::schema::clock_sessions::dsl::*;

    let job = crate::orm::job::get_job(conn, req.job_id)?.ok_or(CoreError::NotFound("job"))?;
    if job.status != JOB_STATUS_ACTIVE {
        return Err(CoreError::Validation(format!(
            "job {} is inactive and no longer accepts time",
            job.code
        )));
    }
    crate::orm::labor_activity::get_labor_activity(conn, req.labor_activity_id)?
        .ok_or(CoreError::NotFound("labor activity"))?;
    if !crate::orm::job::is_worker_assigned(conn, req.job_id, target_worker_id)? {
        return Err(CoreError::Validation(format!(
            "worker is not assigned to job {}",
            job.code
        )));
    }

    let today = now.date();
    if week_is_locked(conn, target_worker_id, req.job_id, today)? {
        return Err(CoreError::WeekLocked {
            worker_id: target_worker_id,
            job_id: req.job_id,
            week_start: week_start_for(today),
        });
    }

    let gps_coord = reading_coord(req.gps);
    let job_coord = Coord::from_parts(job.latitude, job.longitude);

    let insertable = NewClockSession {
        worker_id: target_worker_id,
        job_id: req.job_id,
        labor_activity_id: req.labor_activity_id,
        clock_in: now,
        notes: req.notes.clone(),
        is_active: true,
        clock_in_latitude: gps_coord.map(|c| c.latitude),
        clock_in_longitude: gps_coord.map(|c| c.longitude),
        clock_in_accuracy: req.gps.and_then(|g| g.accuracy),
        clock_in_distance_mi: distance_miles(gps_coord, job_coord),
        created_at: now,
    };

    diesel::insert_into(clock_sessions)
        .values(&insertable)
        .execute(conn)
        .map_err(|e| CoreError::from_clock_in_conflict(e, target_worker_id))?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    Ok(clock_sessions
        .filter(id.eq(last_id as i32))
        .first::<ClockSession>(conn)?)
}

/// Closes an open session and materializes its hours as a time entry.
///
/// Runs in one transaction and re-checks that the session is still open
/// inside it, so a concurrent close (worker racing the sweep) turns
/// into a no-op `NotFound` instead of a double write.
///
/// Sessions are closed even when the target week has since been
/// approval-locked; in that case no entry is materialized and `None` is
/// returned, leaving the locked week untouched.
pub fn close_session(
    conn: &mut SqliteConnection,
    session_id: i32,
    out_time: NaiveDateTime,
    gps: Option<GpsReading>,
) -> CoreResult<(ClockSession, Option<TimeEntry>)> {
    use crate::schema::{clock_sessions, time_entries};

    conn.transaction::<(ClockSession, Option<TimeEntry>), CoreError, _>(|conn| {
        let session = clock_sessions::table
            .filter(clock_sessions::id.eq(session_id))
            .filter(clock_sessions::clock_out.is_null())
            .filter(clock_sessions::is_active.eq(true))
            .first::<ClockSession>(conn)
            .optional()?
            .ok_or(CoreError::NotFound("active clock session"))?;

        let job = crate::orm::job::get_job(conn, session.job_id)?.ok_or(CoreError::NotFound("job"))?;
        let gps_coord = reading_coord(gps);
        let job_coord = Coord::from_parts(job.latitude, job.longitude);

        diesel::update(clock_sessions::table.filter(clock_sessions::id.eq(session_id)))
            .set((
                clock_sessions::clock_out.eq(Some(out_time)),
                clock_sessions::is_active.eq(false),
                clock_sessions::clock_out_latitude.eq(gps_coord.map(|c| c.latitude)),
                clock_sessions::clock_out_longitude.eq(gps_coord.map(|c| c.longitude)),
                clock_sessions::clock_out_accuracy.eq(gps.and_then(|g| g.accuracy)),
                clock_sessions::clock_out_distance_mi.eq(distance_miles(gps_coord, job_coord)),
            ))
            .execute(conn)?;

        let closed = clock_sessions::table
            .filter(clock_sessions::id.eq(session_id))
            .first::<ClockSession>(conn)?;

        let entry_date = session.clock_in.date();
        if week_is_locked(conn, session.worker_id, session.job_id, entry_date)? {
            return Ok((closed, None));
        }

        let hours = closed.duration_hours(out_time);
        if hours <= 0.0 {
            return Ok((closed, None));
        }

        // Hours from several sessions on the same day and activity
        // accumulate into one cell.
        let existing = time_entries::table
            .filter(time_entries::worker_id.eq(session.worker_id))
            .filter(time_entries::job_id.eq(session.job_id))
            .filter(time_entries::labor_activity_id.eq(session.labor_activity_id))
            .filter(time_entries::entry_date.eq(entry_date))
            .first::<TimeEntry>(conn)
            .optional()?;

        let entry = match existing {
            Some(e) => {
                let total = ((e.hours + hours) * 100.0).round() / 100.0;
                diesel::update(time_entries::table.filter(time_entries::id.eq(e.id)))
                    .set(time_entries::hours.eq(total.min(24.0)))
                    .execute(conn)?;
                time_entries::table
                    .filter(time_entries::id.eq(e.id))
                    .first::<TimeEntry>(conn)?
            }
            None => {
                diesel::insert_into(time_entries::table)
                    .values(&NewTimeEntry {
                        worker_id: session.worker_id,
                        job_id: session.job_id,
                        labor_activity_id: session.labor_activity_id,
                        entry_date,
                        hours,
                        notes: session.notes.clone(),
                        approved: false,
                        approved_by: None,
                        approved_at: None,
                        created_at: Utc::now().naive_utc(),
                    })
                    .execute(conn)?;
                let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
                    .get_result::<LastInsertRowId>(conn)?
                    .last_insert_rowid;
                time_entries::table
                    .filter(time_entries::id.eq(last_id as i32))
                    .first::<TimeEntry>(conn)?
            }
        };

        Ok((closed, Some(entry)))
    })
}

/// Clock-out entry point: resolves the worker's open session and closes
/// it.
pub fn clock_out(
    conn: &mut SqliteConnection,
    target_worker_id: i32,
    gps: Option<GpsReading>,
    now: NaiveDateTime,
) -> CoreResult<(ClockSession, Option<TimeEntry>)> {
    let session = active_session(conn, target_worker_id)?
        .ok_or(CoreError::NotFound("active clock session"))?;
    close_session(conn, session.id, now, gps)
}

/// Open sessions whose clock-in is at or before `cutoff`, oldest first.
/// The sweep's work list.
pub fn open_sessions_before(
    conn: &mut SqliteConnection,
    cutoff: NaiveDateTime,
) -> Result<Vec<ClockSession>, diesel::result::Error> {
    use crate::schema::clock_sessions::dsl::*;
    clock_sessions
        .filter(clock_out.is_null())
        .filter(is_active.eq(true))
        .filter(clock_in.le(cutoff))
        .order(clock_in.asc())
        .load::<ClockSession>(conn)
}

/// Sessions in a clock-in window joined to worker and job, newest
/// first, paginated. Feeds the GPS compliance report.
pub fn sessions_in_window(
    conn: &mut SqliteConnection,
    from: NaiveDateTime,
    to_exclusive: NaiveDateTime,
    limit: i64,
    offset: i64,
) -> Result<Vec<(ClockSession, Worker, Job)>, diesel::result::Error> {
    use crate::schema::{clock_sessions, jobs, workers};
    clock_sessions::table
        .inner_join(workers::table)
        .inner_join(jobs::table)
        .filter(clock_sessions::clock_in.ge(from))
        .filter(clock_sessions::clock_in.lt(to_exclusive))
        .order(clock_sessions::clock_in.desc())
        .limit(limit)
        .offset(offset)
        .select((
            ClockSession::as_select(),
            Worker::as_select(),
            Job::as_select(),
        ))
        .load::<(ClockSession, Worker, Job)>(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApprovalInput, JobInput, LaborActivityInput, WorkerInput};
    use crate::orm::job::{assign_worker, insert_job};
    use crate::orm::labor_activity::insert_labor_activity;
    use crate::orm::testing::setup_test_db;
    use crate::orm::trade::insert_trade;
    use crate::orm::weekly_approval::approve_week;
    use crate::orm::worker::insert_worker;
    use chrono::NaiveDate;

    struct Fixture {
        worker_id: i32,
        job_id: i32,
        activity_id: i32,
    }

    fn fixture(conn: &mut SqliteConnection) -> Fixture {
        let worker = insert_worker(
            conn,
            WorkerInput {
                name: "Mike Rodriguez".to_string(),
                email: "mike@example.com".to_string(),
                role: "worker".to_string(),
                uses_clock: None,
                burden_rate: None,
            },
        )
        .unwrap();
        let trade = insert_trade(conn, "drywall".to_string()).unwrap();
        let activity = insert_labor_activity(
            conn,
            LaborActivityInput {
                name: "hang board".to_string(),
                trade_id: trade.id,
            },
        )
        .unwrap();
        let job = insert_job(
            conn,
            JobInput {
                code: "J-100".to_string(),
                description: "buildout".to_string(),
                address: None,
                latitude: Some(40.0),
                longitude: Some(-74.0),
                foreman_id: None,
                required_trades: None,
            },
            Some(Coord::new(40.0, -74.0)),
        )
        .unwrap();
        assign_worker(conn, job.id, worker.id).unwrap();
        Fixture {
            worker_id: worker.id,
            job_id: job.id,
            activity_id: activity.id,
        }
    }

    fn t(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn clock_in_req(f: &Fixture, gps: Option<GpsReading>) -> ClockInRequest {
        ClockInRequest {
            job_id: f.job_id,
            labor_activity_id: f.activity_id,
            notes: None,
            gps,
            device_id: None,
        }
    }

    #[test]
    fn test_clock_in_records_distance() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        let gps = GpsReading {
            latitude: 40.0,
            longitude: -74.0,
            accuracy: Some(12.0),
        };
        let s = clock_in(&mut conn, f.worker_id, &clock_in_req(&f, Some(gps)), t(7, 0)).unwrap();
        assert!(s.is_active);
        assert!(s.clock_in_distance_mi.unwrap() < 0.01);
        assert_eq!(s.clock_in_accuracy, Some(12.0));
    }

    #[test]
    fn test_clock_in_without_gps_leaves_distance_null() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        let s = clock_in(&mut conn, f.worker_id, &clock_in_req(&f, None), t(7, 0)).unwrap();
        assert!(s.clock_in_distance_mi.is_none());
        assert!(s.clock_in_latitude.is_none());
    }

    #[test]
    fn test_second_clock_in_conflicts() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        clock_in(&mut conn, f.worker_id, &clock_in_req(&f, None), t(7, 0)).unwrap();
        let err =
            clock_in(&mut conn, f.worker_id, &clock_in_req(&f, None), t(7, 5)).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyClockedIn(w) if w == f.worker_id));
    }

    #[test]
    fn test_clock_out_materializes_entry() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        clock_in(&mut conn, f.worker_id, &clock_in_req(&f, None), t(7, 0)).unwrap();
        let (closed, entry) = clock_out(&mut conn, f.worker_id, None, t(15, 30)).unwrap();
        assert!(!closed.is_active);
        assert_eq!(closed.clock_out, Some(t(15, 30)));

        let entry = entry.unwrap();
        assert_eq!(entry.hours, 8.5);
        assert_eq!(entry.entry_date, t(7, 0).date());
        assert!(!entry.approved);

        // A new clock-in is allowed after closing.
        clock_in(&mut conn, f.worker_id, &clock_in_req(&f, None), t(16, 0)).unwrap();
    }

    #[test]
    fn test_clock_out_without_open_session() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        let err = clock_out(&mut conn, f.worker_id, None, t(15, 0)).unwrap_err();
        assert!(matches!(err, CoreError::NotFound("active clock session")));
    }

    #[test]
    fn test_same_day_sessions_accumulate_into_one_cell() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        clock_in(&mut conn, f.worker_id, &clock_in_req(&f, None), t(7, 0)).unwrap();
        clock_out(&mut conn, f.worker_id, None, t(11, 0)).unwrap();
        clock_in(&mut conn, f.worker_id, &clock_in_req(&f, None), t(12, 0)).unwrap();
        let (_, entry) = clock_out(&mut conn, f.worker_id, None, t(16, 30)).unwrap();
        assert_eq!(entry.unwrap().hours, 8.5);
    }

    #[test]
    fn test_clock_in_blocked_by_week_lock() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        let foreman = insert_worker(
            &mut conn,
            WorkerInput {
                name: "Sara Boss".to_string(),
                email: "sara@example.com".to_string(),
                role: "foreman".to_string(),
                uses_clock: Some(false),
                burden_rate: None,
            },
        )
        .unwrap();
        approve_week(
            &mut conn,
            &ApprovalInput {
                worker_id: f.worker_id,
                job_id: f.job_id,
                week_start: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            },
            foreman.id,
        )
        .unwrap();

        let err =
            clock_in(&mut conn, f.worker_id, &clock_in_req(&f, None), t(7, 0)).unwrap_err();
        assert!(matches!(err, CoreError::WeekLocked { .. }));
    }

    #[test]
    fn test_unassigned_worker_cannot_clock_in() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        let stranger = insert_worker(
            &mut conn,
            WorkerInput {
                name: "Tommy Wilson".to_string(),
                email: "tommy@example.com".to_string(),
                role: "worker".to_string(),
                uses_clock: None,
                burden_rate: None,
            },
        )
        .unwrap();
        let err =
            clock_in(&mut conn, stranger.id, &clock_in_req(&f, None), t(7, 0)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_close_already_closed_session_is_not_found() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        let s = clock_in(&mut conn, f.worker_id, &clock_in_req(&f, None), t(7, 0)).unwrap();
        close_session(&mut conn, s.id, t(15, 0), None).unwrap();
        let err = close_session(&mut conn, s.id, t(16, 0), None).unwrap_err();
        assert!(matches!(err, CoreError::NotFound("active clock session")));
    }
}

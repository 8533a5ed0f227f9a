use chrono::{NaiveDate, Utc};
use diesel::prelude::*;

use crate::approval::{week_end_exclusive, week_start_for};
use crate::error::{CoreError, CoreResult};
use crate::models::{ApprovalInput, NewWeeklyApprovalLock, WeeklyApprovalLock};

/// Gets the lock row for a (worker, job, week), if any. `any_date` may
/// be any date inside the week.
pub fn get_lock(
    conn: &mut SqliteConnection,
    target_worker_id: i32,
    target_job_id: i32,
    any_date: NaiveDate,
) -> Result<Option<WeeklyApprovalLock>, diesel::result::Error> {
    use crate::schema::weekly_approval_locks::dsl::*;
    let monday = week_start_for(any_date);
    weekly_approval_locks
        .filter(worker_id.eq(target_worker_id))
        .filter(job_id.eq(target_job_id))
        .filter(week_start.eq(monday))
        .first::<WeeklyApprovalLock>(conn)
        .optional()
}

/// True when the (worker, job, week-of-date) tuple carries a lock. This
/// is the gate every time-entry write and clock action consults.
pub fn week_is_locked(
    conn: &mut SqliteConnection,
    target_worker_id: i32,
    target_job_id: i32,
    any_date: NaiveDate,
) -> Result<bool, diesel::result::Error> {
    Ok(get_lock(conn, target_worker_id, target_job_id, any_date)?.is_some())
}

/// Approves a worker's week on a job: creates the lock and stamps every
/// time entry in the window, in one transaction.
///
/// An empty week approves fine; the lock then blocks backdated entry.
/// Approving an already-approved week is rejected.
pub fn approve_week(
    conn: &mut SqliteConnection,
    input: &ApprovalInput,
    approver_id: i32,
) -> CoreResult<WeeklyApprovalLock> {
    use crate::schema::{time_entries, weekly_approval_locks};

    let monday = week_start_for(input.week_start);
    let end = week_end_exclusive(monday);
    let now = Utc::now().naive_utc();

    conn.transaction::<WeeklyApprovalLock, CoreError, _>(|conn| {
        let existing = weekly_approval_locks::table
            .filter(weekly_approval_locks::worker_id.eq(input.worker_id))
            .filter(weekly_approval_locks::job_id.eq(input.job_id))
            .filter(weekly_approval_locks::week_start.eq(monday))
            .first::<WeeklyApprovalLock>(conn)
            .optional()?;
        if existing.is_some() {
            return Err(CoreError::Validation(format!(
                "week of {monday} is already approved"
            )));
        }

        diesel::insert_into(weekly_approval_locks::table)
            .values(&NewWeeklyApprovalLock {
                worker_id: input.worker_id,
                job_id: input.job_id,
                week_start: monday,
                approved_by: approver_id,
                approved_at: now,
            })
            .execute(conn)?;

        diesel::update(
            time_entries::table
                .filter(time_entries::worker_id.eq(input.worker_id))
                .filter(time_entries::job_id.eq(input.job_id))
                .filter(time_entries::entry_date.ge(monday))
                .filter(time_entries::entry_date.lt(end)),
        )
        .set((
            time_entries::approved.eq(true),
            time_entries::approved_by.eq(Some(approver_id)),
            time_entries::approved_at.eq(Some(now)),
        ))
        .execute(conn)?;

        let lock = weekly_approval_locks::table
            .filter(weekly_approval_locks::worker_id.eq(input.worker_id))
            .filter(weekly_approval_locks::job_id.eq(input.job_id))
            .filter(weekly_approval_locks::week_start.eq(monday))
            .first::<WeeklyApprovalLock>(conn)?;
        Ok(lock)
    })
}

/// Administrative override: removes the lock and clears the approval
/// stamps, reopening the week for edits. Returns false when there was
/// no lock to remove.
pub fn unlock_week(
    conn: &mut SqliteConnection,
    target_worker_id: i32,
    target_job_id: i32,
    any_date: NaiveDate,
) -> CoreResult<bool> {
    use crate::schema::{time_entries, weekly_approval_locks};

    let monday = week_start_for(any_date);
    let end = week_end_exclusive(monday);

    conn.transaction::<bool, CoreError, _>(|conn| {
        let removed = diesel::delete(
            weekly_approval_locks::table
                .filter(weekly_approval_locks::worker_id.eq(target_worker_id))
                .filter(weekly_approval_locks::job_id.eq(target_job_id))
                .filter(weekly_approval_locks::week_start.eq(monday)),
        )
        .execute(conn)?;
        if removed == 0 {
            return Ok(false);
        }

        diesel::update(
            time_entries::table
                .filter(time_entries::worker_id.eq(target_worker_id))
                .filter(time_entries::job_id.eq(target_job_id))
                .filter(time_entries::entry_date.ge(monday))
                .filter(time_entries::entry_date.lt(end)),
        )
        .set((
            time_entries::approved.eq(false),
            time_entries::approved_by.eq(None::<i32>),
            time_entries::approved_at.eq(None::<chrono::NaiveDateTime>),
        ))
        .execute(conn)?;

        Ok(true)
    })
}

/// Lists every lock on a job, newest week first.
pub fn list_locks_for_job(
    conn: &mut SqliteConnection,
    target_job_id: i32,
) -> Result<Vec<WeeklyApprovalLock>, diesel::result::Error> {
    use crate::schema::weekly_approval_locks::dsl::*;
    weekly_approval_locks
        .filter(job_id.eq(target_job_id))
        .order(week_start.desc())
        .load::<WeeklyApprovalLock>(conn)
}

/// Lists all locks, newest week first.
pub fn list_all_locks(
    conn: &mut SqliteConnection,
) -> Result<Vec<WeeklyApprovalLock>, diesel::result::Error> {
    use crate::schema::weekly_approval_locks::dsl::*;
    weekly_approval_locks
        .order(week_start.desc())
        .load::<WeeklyApprovalLock>(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobInput, TimeEntryInput, WorkerInput};
    use crate::orm::job::insert_job;
    use crate::orm::testing::setup_test_db;
    use crate::orm::time_entry::{create_time_entry, get_time_entry};
    use crate::orm::trade::insert_trade;
    use crate::orm::worker::insert_worker;
    use crate::orm::labor_activity::insert_labor_activity;
    use crate::models::LaborActivityInput;

    struct Fixture {
        worker_id: i32,
        foreman_id: i32,
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
        let foreman = insert_worker(
            conn,
            WorkerInput {
                name: "Sara Boss".to_string(),
                email: "sara@example.com".to_string(),
                role: "foreman".to_string(),
                uses_clock: Some(false),
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
                latitude: None,
                longitude: None,
                foreman_id: Some(foreman.id),
                required_trades: None,
            },
            None,
        )
        .unwrap();
        Fixture {
            worker_id: worker.id,
            foreman_id: foreman.id,
            job_id: job.id,
            activity_id: activity.id,
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn add_entry(conn: &mut SqliteConnection, f: &Fixture, date: NaiveDate, hours: f64) -> i32 {
        create_time_entry(
            conn,
            f.worker_id,
            &TimeEntryInput {
                worker_id: None,
                job_id: f.job_id,
                labor_activity_id: f.activity_id,
                entry_date: date,
                hours,
                notes: None,
            },
        )
        .unwrap()
        .id
    }

    #[test]
    fn test_approve_stamps_entries_and_creates_lock() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        let entry_id = add_entry(&mut conn, &f, monday(), 8.0);

        let input = ApprovalInput {
            worker_id: f.worker_id,
            job_id: f.job_id,
            // Wednesday: must normalize to the Monday.
            week_start: NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
        };
        let lock = approve_week(&mut conn, &input, f.foreman_id).unwrap();
        assert_eq!(lock.week_start, monday());
        assert_eq!(lock.approved_by, f.foreman_id);

        let entry = get_time_entry(&mut conn, entry_id).unwrap().unwrap();
        assert!(entry.approved);
        assert_eq!(entry.approved_by, Some(f.foreman_id));
        assert!(entry.approved_at.is_some());

        assert!(week_is_locked(&mut conn, f.worker_id, f.job_id, monday()).unwrap());
        // Adjacent week untouched.
        assert!(
            !week_is_locked(
                &mut conn,
                f.worker_id,
                f.job_id,
                NaiveDate::from_ymd_opt(2025, 6, 9).unwrap()
            )
            .unwrap()
        );
    }

    #[test]
    fn test_double_approval_rejected() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        let input = ApprovalInput {
            worker_id: f.worker_id,
            job_id: f.job_id,
            week_start: monday(),
        };
        approve_week(&mut conn, &input, f.foreman_id).unwrap();
        let err = approve_week(&mut conn, &input, f.foreman_id).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_empty_week_approves_and_blocks_backdating() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        let input = ApprovalInput {
            worker_id: f.worker_id,
            job_id: f.job_id,
            week_start: monday(),
        };
        approve_week(&mut conn, &input, f.foreman_id).unwrap();

        let err = create_time_entry(
            &mut conn,
            f.worker_id,
            &TimeEntryInput {
                worker_id: None,
                job_id: f.job_id,
                labor_activity_id: f.activity_id,
                entry_date: monday(),
                hours: 8.0,
                notes: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::WeekLocked { .. }));
    }

    #[test]
    fn test_unlock_reopens_week() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        let entry_id = add_entry(&mut conn, &f, monday(), 8.0);
        let input = ApprovalInput {
            worker_id: f.worker_id,
            job_id: f.job_id,
            week_start: monday(),
        };
        approve_week(&mut conn, &input, f.foreman_id).unwrap();

        assert!(unlock_week(&mut conn, f.worker_id, f.job_id, monday()).unwrap());
        assert!(!week_is_locked(&mut conn, f.worker_id, f.job_id, monday()).unwrap());
        let entry = get_time_entry(&mut conn, entry_id).unwrap().unwrap();
        assert!(!entry.approved);
        assert!(entry.approved_by.is_none());

        // Nothing left to unlock.
        assert!(!unlock_week(&mut conn, f.worker_id, f.job_id, monday()).unwrap());
    }

    #[test]
    fn test_lock_is_scoped_to_worker_and_job() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        let other = insert_worker(
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

        approve_week(
            &mut conn,
            &ApprovalInput {
                worker_id: f.worker_id,
                job_id: f.job_id,
                week_start: monday(),
            },
            f.foreman_id,
        )
        .unwrap();

        assert!(!week_is_locked(&mut conn, other.id, f.job_id, monday()).unwrap());
    }
}

use chrono::{NaiveDate, Utc};
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::approval::{week_end_exclusive, week_start_for};
use crate::error::{CoreError, CoreResult};
use crate::models::{JOB_STATUS_ACTIVE, NewTimeEntry, TimeEntry, TimeEntryInput};
use crate::orm::weekly_approval::week_is_locked;

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Validates an hours value for one entry. Zero is a legal value (a
/// recorded no-show day); only values outside [0, 24] are rejected.
pub fn validate_hours(hours: f64) -> CoreResult<()> {
    if !hours.is_finite() || hours < 0.0 || hours > 24.0 {
        return Err(CoreError::Validation(format!(
            "hours must be between 0 and 24, got {hours}"
        )));
    }
    Ok(())
}

/// Creates a manual time entry for `target_worker_id`.
///
/// Rejected when the job is missing or inactive, the activity is
/// missing, the hours are out of range, the week carries an approval
/// lock, or an entry for the same (worker, job, activity, date) cell
/// already exists.
pub fn create_time_entry(
    conn: &mut SqliteConnection,
    target_worker_id: i32,
    input: &TimeEntryInput,
) -> CoreResult<TimeEntry> {
    use crate::schema::time_entries::dsl::*;

    validate_hours(input.hours)?;

    let job = crate::orm::job::get_job(conn, input.job_id)?.ok_or(CoreError::NotFound("job"))?;
    if job.status != JOB_STATUS_ACTIVE {
        return Err(CoreError::Validation(format!(
            "job {} is inactive and no longer accepts time",
            job.code
        )));
    }
    crate::orm::labor_activity::get_labor_activity(conn, input.labor_activity_id)?
        .ok_or(CoreError::NotFound("labor activity"))?;

    if week_is_locked(conn, target_worker_id, input.job_id, input.entry_date)? {
        return Err(CoreError::WeekLocked {
            worker_id: target_worker_id,
            job_id: input.job_id,
            week_start: week_start_for(input.entry_date),
        });
    }

    let insertable = NewTimeEntry {
        worker_id: target_worker_id,
        job_id: input.job_id,
        labor_activity_id: input.labor_activity_id,
        entry_date: input.entry_date,
        hours: input.hours,
        notes: input.notes.clone(),
        approved: false,
        approved_by: None,
        approved_at: None,
        created_at: Utc::now().naive_utc(),
    };

    let inserted = diesel::insert_into(time_entries)
        .values(&insertable)
        .execute(conn);
    if let Err(diesel::result::Error::DatabaseError(
        diesel::result::DatabaseErrorKind::UniqueViolation,
        _,
    )) = inserted
    {
        return Err(CoreError::Validation(
            "an entry for this worker, job, activity and date already exists".to_string(),
        ));
    }
    inserted?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    Ok(time_entries
        .filter(id.eq(last_id as i32))
        .first::<TimeEntry>(conn)?)
}

/// Gets a single time entry by ID.
pub fn get_time_entry(
    conn: &mut SqliteConnection,
    entry_id: i32,
) -> Result<Option<TimeEntry>, diesel::result::Error> {
    use crate::schema::time_entries::dsl::*;
    time_entries
        .filter(id.eq(entry_id))
        .first::<TimeEntry>(conn)
        .optional()
}

/// Updates the hours and/or notes of an entry. Blocked once the entry's
/// week is locked.
pub fn update_time_entry(
    conn: &mut SqliteConnection,
    entry_id: i32,
    new_hours: Option<f64>,
    new_notes: Option<Option<String>>,
) -> CoreResult<TimeEntry> {
    use crate::schema::time_entries::dsl::*;

    let entry = get_time_entry(conn, entry_id)?.ok_or(CoreError::NotFound("time entry"))?;
    if week_is_locked(conn, entry.worker_id, entry.job_id, entry.entry_date)? {
        return Err(CoreError::WeekLocked {
            worker_id: entry.worker_id,
            job_id: entry.job_id,
            week_start: week_start_for(entry.entry_date),
        });
    }

    if let Some(hours_val) = new_hours {
        validate_hours(hours_val)?;
        diesel::update(time_entries.filter(id.eq(entry_id)))
            .set(hours.eq(hours_val))
            .execute(conn)?;
    }

    if let Some(notes_val) = new_notes {
        diesel::update(time_entries.filter(id.eq(entry_id)))
            .set(notes.eq(notes_val))
            .execute(conn)?;
    }

    Ok(time_entries
        .filter(id.eq(entry_id))
        .first::<TimeEntry>(conn)?)
}

/// Deletes an entry. Blocked once the entry's week is locked.
pub fn delete_time_entry(conn: &mut SqliteConnection, entry_id: i32) -> CoreResult<()> {
    use crate::schema::time_entries::dsl::*;

    let entry = get_time_entry(conn, entry_id)?.ok_or(CoreError::NotFound("time entry"))?;
    if week_is_locked(conn, entry.worker_id, entry.job_id, entry.entry_date)? {
        return Err(CoreError::WeekLocked {
            worker_id: entry.worker_id,
            job_id: entry.job_id,
            week_start: week_start_for(entry.entry_date),
        });
    }

    diesel::delete(time_entries.filter(id.eq(entry_id))).execute(conn)?;
    Ok(())
}

/// A worker's entries across all jobs in a date range, oldest first.
pub fn list_entries_for_worker(
    conn: &mut SqliteConnection,
    target_worker_id: i32,
    from: NaiveDate,
    to_exclusive: NaiveDate,
) -> Result<Vec<TimeEntry>, diesel::result::Error> {
    use crate::schema::time_entries::dsl::*;
    time_entries
        .filter(worker_id.eq(target_worker_id))
        .filter(entry_date.ge(from))
        .filter(entry_date.lt(to_exclusive))
        .order((entry_date.asc(), id.asc()))
        .load::<TimeEntry>(conn)
}

/// A worker's week of entries on one job, for the approval review
/// screen.
pub fn entries_for_week(
    conn: &mut SqliteConnection,
    target_worker_id: i32,
    target_job_id: i32,
    any_date: NaiveDate,
) -> Result<Vec<TimeEntry>, diesel::result::Error> {
    use crate::schema::time_entries::dsl::*;
    let monday = week_start_for(any_date);
    time_entries
        .filter(worker_id.eq(target_worker_id))
        .filter(job_id.eq(target_job_id))
        .filter(entry_date.ge(monday))
        .filter(entry_date.lt(week_end_exclusive(monday)))
        .order((entry_date.asc(), id.asc()))
        .load::<TimeEntry>(conn)
}

/// Window-wide hours total for the payroll header, computed in SQL so
/// the header never depends on which page of rows was requested.
pub fn sum_hours_in_range(
    conn: &mut SqliteConnection,
    from: NaiveDate,
    to_exclusive: NaiveDate,
) -> Result<f64, diesel::result::Error> {
    use crate::schema::time_entries::dsl::*;
    use diesel::dsl::sum;
    let total: Option<f64> = time_entries
        .filter(entry_date.ge(from))
        .filter(entry_date.lt(to_exclusive))
        .select(sum(hours))
        .first(conn)?;
    Ok(total.unwrap_or(0.0))
}

/// One page of distinct worker ids with entries in the range, ordered
/// by id. Payroll pagination is per worker, bounded in SQL.
pub fn paged_worker_ids_in_range(
    conn: &mut SqliteConnection,
    from: NaiveDate,
    to_exclusive: NaiveDate,
    limit: i64,
    offset: i64,
) -> Result<Vec<i32>, diesel::result::Error> {
    use crate::schema::time_entries::dsl::*;
    time_entries
        .filter(entry_date.ge(from))
        .filter(entry_date.lt(to_exclusive))
        .select(worker_id)
        .distinct()
        .order(worker_id.asc())
        .limit(limit)
        .offset(offset)
        .load::<i32>(conn)
}

/// The entries backing one page of payroll rows.
pub fn list_entries_for_workers_in_range(
    conn: &mut SqliteConnection,
    worker_ids: Vec<i32>,
    from: NaiveDate,
    to_exclusive: NaiveDate,
) -> Result<Vec<TimeEntry>, diesel::result::Error> {
    use crate::schema::time_entries::dsl::*;
    time_entries
        .filter(worker_id.eq_any(worker_ids))
        .filter(entry_date.ge(from))
        .filter(entry_date.lt(to_exclusive))
        .order((worker_id.asc(), entry_date.asc(), id.asc()))
        .load::<TimeEntry>(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobInput, LaborActivityInput, WorkerInput};
    use crate::orm::job::{deactivate_job, insert_job};
    use crate::orm::labor_activity::insert_labor_activity;
    use crate::orm::testing::setup_test_db;
    use crate::orm::trade::insert_trade;
    use crate::orm::worker::insert_worker;

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
                latitude: None,
                longitude: None,
                foreman_id: None,
                required_trades: None,
            },
            None,
        )
        .unwrap();
        Fixture {
            worker_id: worker.id,
            job_id: job.id,
            activity_id: activity.id,
        }
    }

    fn input(f: &Fixture, date: NaiveDate, hours: f64) -> TimeEntryInput {
        TimeEntryInput {
            worker_id: None,
            job_id: f.job_id,
            labor_activity_id: f.activity_id,
            entry_date: date,
            hours,
            notes: None,
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    #[test]
    fn test_create_and_fetch_entry() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        let entry =
            create_time_entry(&mut conn, f.worker_id, &input(&f, monday(), 7.5)).unwrap();
        assert_eq!(entry.hours, 7.5);
        assert!(!entry.approved);

        let fetched = get_time_entry(&mut conn, entry.id).unwrap().unwrap();
        assert_eq!(fetched.entry_date, monday());
    }

    #[test]
    fn test_hours_bounds() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        for bad in [-0.1, -1.0, 24.5, f64::NAN] {
            let err =
                create_time_entry(&mut conn, f.worker_id, &input(&f, monday(), bad)).unwrap_err();
            assert!(matches!(err, CoreError::Validation(_)), "hours {bad}");
        }
        // Both endpoints are allowed: 0 records a no-show day.
        let zero = create_time_entry(&mut conn, f.worker_id, &input(&f, monday(), 0.0)).unwrap();
        assert_eq!(zero.hours, 0.0);
        create_time_entry(
            &mut conn,
            f.worker_id,
            &input(&f, monday() + chrono::Duration::days(1), 24.0),
        )
        .unwrap();
    }

    #[test]
    fn test_duplicate_cell_rejected() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        create_time_entry(&mut conn, f.worker_id, &input(&f, monday(), 8.0)).unwrap();
        let err =
            create_time_entry(&mut conn, f.worker_id, &input(&f, monday(), 4.0)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_inactive_job_rejects_new_time() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        deactivate_job(&mut conn, f.job_id).unwrap();
        let err =
            create_time_entry(&mut conn, f.worker_id, &input(&f, monday(), 8.0)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_missing_references_are_not_found() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);

        let mut bad_job = input(&f, monday(), 8.0);
        bad_job.job_id = 9999;
        assert!(matches!(
            create_time_entry(&mut conn, f.worker_id, &bad_job).unwrap_err(),
            CoreError::NotFound("job")
        ));

        let mut bad_activity = input(&f, monday(), 8.0);
        bad_activity.labor_activity_id = 9999;
        assert!(matches!(
            create_time_entry(&mut conn, f.worker_id, &bad_activity).unwrap_err(),
            CoreError::NotFound("labor activity")
        ));
    }

    #[test]
    fn test_update_and_delete_respect_nothing_when_unlocked() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        let entry =
            create_time_entry(&mut conn, f.worker_id, &input(&f, monday(), 8.0)).unwrap();

        let updated = update_time_entry(
            &mut conn,
            entry.id,
            Some(6.0),
            Some(Some("left early".to_string())),
        )
        .unwrap();
        assert_eq!(updated.hours, 6.0);
        assert_eq!(updated.notes.as_deref(), Some("left early"));

        delete_time_entry(&mut conn, entry.id).unwrap();
        assert!(get_time_entry(&mut conn, entry.id).unwrap().is_none());
    }

    #[test]
    fn test_payroll_queries_are_bounded_in_sql() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        let second = insert_worker(
            &mut conn,
            WorkerInput {
                name: "Dana Lee".to_string(),
                email: "dana@example.com".to_string(),
                role: "worker".to_string(),
                uses_clock: None,
                burden_rate: None,
            },
        )
        .unwrap();

        create_time_entry(&mut conn, f.worker_id, &input(&f, monday(), 8.0)).unwrap();
        create_time_entry(
            &mut conn,
            f.worker_id,
            &input(&f, monday() + chrono::Duration::days(1), 4.0),
        )
        .unwrap();
        create_time_entry(&mut conn, second.id, &input(&f, monday(), 6.0)).unwrap();

        let from = monday();
        let to = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();

        // The total covers the whole window regardless of paging.
        assert_eq!(sum_hours_in_range(&mut conn, from, to).unwrap(), 18.0);

        // Distinct worker pages, one worker per page.
        let page1 = paged_worker_ids_in_range(&mut conn, from, to, 1, 0).unwrap();
        assert_eq!(page1, vec![f.worker_id]);
        let page2 = paged_worker_ids_in_range(&mut conn, from, to, 1, 1).unwrap();
        assert_eq!(page2, vec![second.id]);
        assert!(
            paged_worker_ids_in_range(&mut conn, from, to, 1, 2)
                .unwrap()
                .is_empty()
        );

        // Row loading only touches the page's workers.
        let rows = list_entries_for_workers_in_range(&mut conn, page1, from, to).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|e| e.worker_id == f.worker_id));
    }

    #[test]
    fn test_range_listing_bounds() {
        let mut conn = setup_test_db();
        let f = fixture(&mut conn);
        create_time_entry(&mut conn, f.worker_id, &input(&f, monday(), 8.0)).unwrap();
        create_time_entry(
            &mut conn,
            f.worker_id,
            &input(&f, NaiveDate::from_ymd_opt(2025, 6, 9).unwrap(), 8.0),
        )
        .unwrap();

        let in_week = list_entries_for_worker(
            &mut conn,
            f.worker_id,
            monday(),
            NaiveDate::from_ymd_opt(2025, 6, 9).unwrap(),
        )
        .unwrap();
        assert_eq!(in_week.len(), 1);
        assert_eq!(in_week[0].entry_date, monday());
    }
}

//! Reporting endpoints: payroll hours and GPS compliance.
//!
//! Both are pure reads over a date window (`from` inclusive, `to`
//! exclusive), defaulting to the current week, paginated with
//! `limit`/`offset`.

use chrono::{NaiveDate, Utc};
use rocket::Route;
use rocket::response::status;
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use super::{ErrorResponse, db_error_response, parse_date};
use crate::approval::{week_end_exclusive, week_start_for};
use crate::compliance::{GpsComplianceReport, SessionContext, build_report};
use crate::geo::Coord;
use crate::models::{Job, Worker};
use crate::orm::DbConn;
use crate::orm::clock_session::sessions_in_window;
use crate::orm::job::list_all_jobs;
use crate::orm::time_entry::{
    list_entries_for_workers_in_range, paged_worker_ids_in_range, sum_hours_in_range,
};
use crate::orm::worker::list_all_workers;
use crate::session_guards::ForemanWorker;

const DEFAULT_PAGE_SIZE: i64 = 500;

fn window(
    from: Option<String>,
    to: Option<String>,
) -> Result<(NaiveDate, NaiveDate), status::Custom<Json<ErrorResponse>>> {
    let today = Utc::now().date_naive();
    let from = match from {
        Some(raw) => parse_date(&raw)?,
        None => week_start_for(today),
    };
    let to = match to {
        Some(raw) => parse_date(&raw)?,
        None => week_end_exclusive(week_start_for(today)),
    };
    Ok((from, to))
}

/// Hours on one job within a payroll row.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct PayrollJobLine {
    pub job_id: i32,
    pub job_code: String,
    pub hours: f64,
}

/// One worker's totals for the window.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct PayrollRow {
    pub worker_id: i32,
    pub worker_name: String,
    pub total_hours: f64,
    pub approved_hours: f64,
    pub burden_rate: Option<f64>,
    /// `total_hours * burden_rate`; null when no rate is on file.
    pub burden_cost: Option<f64>,
    pub jobs: Vec<PayrollJobLine>,
}

#[derive(Serialize, TS)]
#[ts(export)]
pub struct PayrollReport {
    #[ts(type = "string")]
    pub from: NaiveDate,
    #[ts(type = "string")]
    pub to: NaiveDate,
    pub total_hours: f64,
    pub rows: Vec<PayrollRow>,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn build_payroll(
    entries: Vec<crate::models::TimeEntry>,
    workers: Vec<Worker>,
    jobs: Vec<Job>,
    from: NaiveDate,
    to: NaiveDate,
    window_total_hours: f64,
) -> PayrollReport {
    let mut rows: Vec<PayrollRow> = Vec::new();

    for entry in &entries {
        let idx = match rows.iter().position(|r| r.worker_id == entry.worker_id) {
            Some(i) => i,
            None => {
                let worker = workers.iter().find(|w| w.id == entry.worker_id);
                rows.push(PayrollRow {
                    worker_id: entry.worker_id,
                    worker_name: worker.map(|w| w.name.clone()).unwrap_or_default(),
                    total_hours: 0.0,
                    approved_hours: 0.0,
                    burden_rate: worker.and_then(|w| w.burden_rate),
                    burden_cost: None,
                    jobs: Vec::new(),
                });
                rows.len() - 1
            }
        };
        let row = &mut rows[idx];
        row.total_hours += entry.hours;
        if entry.approved {
            row.approved_hours += entry.hours;
        }
        match row.jobs.iter_mut().find(|l| l.job_id == entry.job_id) {
            Some(line) => line.hours += entry.hours,
            None => row.jobs.push(PayrollJobLine {
                job_id: entry.job_id,
                job_code: jobs
                    .iter()
                    .find(|j| j.id == entry.job_id)
                    .map(|j| j.code.clone())
                    .unwrap_or_default(),
                hours: entry.hours,
            }),
        }
    }

    for row in &mut rows {
        row.total_hours = round2(row.total_hours);
        row.approved_hours = round2(row.approved_hours);
        row.burden_cost = row.burden_rate.map(|rate| round2(rate * row.total_hours));
        for line in &mut row.jobs {
            line.hours = round2(line.hours);
        }
    }

    PayrollReport {
        from,
        to,
        total_hours: round2(window_total_hours),
        rows,
    }
}

/// Payroll Report endpoint.
///
/// - **URL:** `/api/1/reports/payroll?from=&to=&limit=&offset=`
/// - **Method:** `GET`
/// - **Purpose:** Per-worker hours and burden cost over the window,
///   with a per-job breakdown
/// - **Authentication:** Foreman or admin role required
#[get("/1/reports/payroll?<from>&<to>&<limit>&<offset>")]
pub async fn payroll_report(
    db: DbConn,
    from: Option<String>,
    to: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    _foreman: ForemanWorker,
) -> Result<Json<PayrollReport>, status::Custom<Json<ErrorResponse>>> {
    let (from, to) = window(from, to)?;
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).max(0);
    let offset = offset.unwrap_or(0).max(0);

    db.run(move |conn| {
        // Pagination is per worker and bounded in SQL; only the page's
        // entries are ever materialized. The header total is a SQL
        // aggregate over the whole window.
        let total_hours = sum_hours_in_range(conn, from, to).map_err(db_error_response)?;
        let page_workers =
            paged_worker_ids_in_range(conn, from, to, limit, offset).map_err(db_error_response)?;
        let entries = list_entries_for_workers_in_range(conn, page_workers, from, to)
            .map_err(db_error_response)?;
        let workers = list_all_workers(conn).map_err(db_error_response)?;
        let jobs = list_all_jobs(conn).map_err(db_error_response)?;

        Ok(Json(build_payroll(
            entries,
            workers,
            jobs,
            from,
            to,
            total_hours,
        )))
    })
    .await
}

/// GPS Compliance Report endpoint.
///
/// - **URL:** `/api/1/reports/gps-compliance?from=&to=&limit=&offset=`
/// - **Method:** `GET`
/// - **Purpose:** Classifies every clock session in the window against
///   its job site; distances are recomputed on each request
/// - **Authentication:** Foreman or admin role required
#[get("/1/reports/gps-compliance?<from>&<to>&<limit>&<offset>")]
pub async fn gps_compliance_report(
    db: DbConn,
    from: Option<String>,
    to: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    _foreman: ForemanWorker,
) -> Result<Json<GpsComplianceReport>, status::Custom<Json<ErrorResponse>>> {
    let (from, to) = window(from, to)?;
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).max(0);
    let offset = offset.unwrap_or(0).max(0);

    db.run(move |conn| {
        let sessions = sessions_in_window(
            conn,
            from.and_hms_opt(0, 0, 0).unwrap_or_default(),
            to.and_hms_opt(0, 0, 0).unwrap_or_default(),
            limit,
            offset,
        )
        .map_err(db_error_response)?;

        let contexts = sessions
            .into_iter()
            .map(|(session, worker, job)| SessionContext {
                session,
                worker_name: worker.name,
                job_code: job.code,
                job_coord: Coord::from_parts(job.latitude, job.longitude),
            })
            .collect();

        Ok(Json(build_report(contexts, Utc::now().naive_utc())))
    })
    .await
}

pub fn routes() -> Vec<Route> {
    routes![payroll_report, gps_compliance_report]
}

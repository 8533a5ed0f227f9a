//! GPS compliance classification for clock sessions.
//!
//! A pure read-side projection: nothing here writes. Distances are
//! recomputed from raw coordinates on every report request, so a job
//! geocoded after the fact immediately reclassifies its history.

use chrono::NaiveDateTime;
use serde::Serialize;
use ts_rs::TS;

use crate::geo::{Coord, distance_miles, round2};
use crate::models::ClockSession;

/// Severity thresholds in miles. Closed on the lower bound, open on the
/// upper: exactly 0.5 is Minor, exactly 2.0 is Major, exactly 5.0 is
/// Fraud Risk.
pub const MINOR_THRESHOLD_MI: f64 = 0.5;
pub const MAJOR_THRESHOLD_MI: f64 = 2.0;
pub const FRAUD_THRESHOLD_MI: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, TS)]
#[ts(export)]
pub enum Severity {
    Minor,
    Major,
    FraudRisk,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Minor => "Minor",
            Severity::Major => "Major",
            Severity::FraudRisk => "Fraud Risk",
        }
    }
}

/// Buckets a worst-observed distance. `None` means compliant (no report
/// row).
pub fn classify_miles(worst: f64) -> Option<Severity> {
    if worst >= FRAUD_THRESHOLD_MI {
        Some(Severity::FraudRisk)
    } else if worst >= MAJOR_THRESHOLD_MI {
        Some(Severity::Major)
    } else if worst >= MINOR_THRESHOLD_MI {
        Some(Severity::Minor)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[ts(export)]
pub enum ComplianceStatus {
    /// Worst observed distance under the minor threshold.
    Compliant,
    /// No usable reading on either leg (or job not geocoded). Never to
    /// be conflated with compliant.
    Unknown,
    Violation(Severity),
}

/// Everything the classifier needs about one session, detached from the
/// store.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session: ClockSession,
    pub worker_name: String,
    pub job_code: String,
    pub job_coord: Option<Coord>,
}

/// One flagged session, shaped for CSV/PDF collaborators and map
/// rendering: plain fields only, no live store objects.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct ViolationRow {
    pub session_id: i32,
    pub worker_id: i32,
    pub worker_name: String,
    pub job_id: i32,
    pub job_code: String,
    #[ts(type = "string")]
    pub clock_in: NaiveDateTime,
    #[ts(type = "string | null")]
    pub clock_out: Option<NaiveDateTime>,
    /// Rounded for display; null renders as "no GPS".
    pub clock_in_distance_mi: Option<f64>,
    /// Null with `still_active` set renders as "still active", not as a
    /// violation on that leg.
    pub clock_out_distance_mi: Option<f64>,
    pub still_active: bool,
    pub hours_so_far: f64,
    pub severity: Severity,
    pub clock_in_coord: Option<Coord>,
    pub clock_out_coord: Option<Coord>,
    pub job_coord: Option<Coord>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct WorkerViolationSummary {
    pub worker_id: i32,
    pub worker_name: String,
    pub minor: usize,
    pub major: usize,
    pub fraud_risk: usize,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct GpsComplianceReport {
    pub total_clock_ins: usize,
    pub compliant: usize,
    pub unknown: usize,
    pub minor: usize,
    pub major: usize,
    pub fraud_risk: usize,
    pub violations: Vec<ViolationRow>,
    pub worker_summary: Vec<WorkerViolationSummary>,
}

impl GpsComplianceReport {
    pub fn total_violations(&self) -> usize {
        self.minor + self.major + self.fraud_risk
    }
}

/// Classifies one session against its job's coordinates.
///
/// Worst distance is the max over the legs that have readings; a leg
/// without a reading is ignored rather than treated as zero. Both legs
/// missing means `Unknown`.
pub fn review_session(session: &ClockSession, job_coord: Option<Coord>) -> ComplianceStatus {
    let d_in = distance_miles(
        Coord::from_parts(session.clock_in_latitude, session.clock_in_longitude),
        job_coord,
    );
    let d_out = distance_miles(
        Coord::from_parts(session.clock_out_latitude, session.clock_out_longitude),
        job_coord,
    );

    let worst = match (d_in, d_out) {
        (Some(a), Some(b)) => a.max(b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return ComplianceStatus::Unknown,
    };

    match classify_miles(worst) {
        Some(sev) => ComplianceStatus::Violation(sev),
        None => ComplianceStatus::Compliant,
    }
}

/// Builds the full report over a window of sessions, already joined to
/// worker names and job coordinates by the caller.
pub fn build_report(contexts: Vec<SessionContext>, now: NaiveDateTime) -> GpsComplianceReport {
    let mut report = GpsComplianceReport {
        total_clock_ins: contexts.len(),
        compliant: 0,
        unknown: 0,
        minor: 0,
        major: 0,
        fraud_risk: 0,
        violations: Vec::new(),
        worker_summary: Vec::new(),
    };

    for ctx in contexts {
        let severity = match review_session(&ctx.session, ctx.job_coord) {
            ComplianceStatus::Compliant => {
                report.compliant += 1;
                continue;
            }
            ComplianceStatus::Unknown => {
                report.unknown += 1;
                continue;
            }
            ComplianceStatus::Violation(sev) => sev,
        };

        match severity {
            Severity::Minor => report.minor += 1,
            Severity::Major => report.major += 1,
            Severity::FraudRisk => report.fraud_risk += 1,
        }

        let s = &ctx.session;
        let in_coord = Coord::from_parts(s.clock_in_latitude, s.clock_in_longitude);
        let out_coord = Coord::from_parts(s.clock_out_latitude, s.clock_out_longitude);

        report.violations.push(ViolationRow {
            session_id: s.id,
            worker_id: s.worker_id,
            worker_name: ctx.worker_name.clone(),
            job_id: s.job_id,
            job_code: ctx.job_code.clone(),
            clock_in: s.clock_in,
            clock_out: s.clock_out,
            clock_in_distance_mi: distance_miles(in_coord, ctx.job_coord).map(round2),
            clock_out_distance_mi: distance_miles(out_coord, ctx.job_coord).map(round2),
            still_active: s.clock_out.is_none(),
            hours_so_far: s.duration_hours(now),
            severity,
            clock_in_coord: in_coord,
            clock_out_coord: out_coord,
            job_coord: ctx.job_coord,
        });

        let idx = match report
            .worker_summary
            .iter()
            .position(|w| w.worker_id == s.worker_id)
        {
            Some(i) => i,
            None => {
                report.worker_summary.push(WorkerViolationSummary {
                    worker_id: s.worker_id,
                    worker_name: ctx.worker_name.clone(),
                    minor: 0,
                    major: 0,
                    fraud_risk: 0,
                });
                report.worker_summary.len() - 1
            }
        };
        let summary = &mut report.worker_summary[idx];
        match severity {
            Severity::Minor => summary.minor += 1,
            Severity::Major => summary.major += 1,
            Severity::FraudRisk => summary.fraud_risk += 1,
        }
    }

    // Worst offenders first
    report
        .worker_summary
        .sort_by(|a, b| (b.fraud_risk, b.major, b.minor).cmp(&(a.fraud_risk, a.major, a.minor)));

    report
}

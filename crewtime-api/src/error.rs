use chrono::NaiveDate;
use thiserror::Error;

/// Domain error taxonomy. Every failure path either leaves prior state
/// untouched or completes a fully-formed transaction.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Bad input, rejected synchronously with no partial write.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Edit attempted against a week already under an approval lock.
    /// Carries the locked week so the caller can be told which one.
    #[error("week of {week_start} is approval-locked for worker {worker_id} on job {job_id}")]
    WeekLocked {
        worker_id: i32,
        job_id: i32,
        week_start: NaiveDate,
    },

    /// The storage-layer uniqueness constraint rejected a second open
    /// clock session for the same worker.
    #[error("worker {0} is already clocked in")]
    AlreadyClockedIn(i32),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database error: {0}")]
    Db(#[from] diesel::result::Error),
}

impl CoreError {
    /// True when a unique-constraint violation should be read as a
    /// concurrent-clock-in conflict.
    pub fn from_clock_in_conflict(err: diesel::result::Error, worker_id: i32) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};
        match err {
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                CoreError::AlreadyClockedIn(worker_id)
            }
            other => CoreError::Db(other),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

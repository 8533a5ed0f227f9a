pub mod clock_session;
mod db;
pub mod device_log;
pub mod job;
pub mod labor_activity;
pub mod session;
pub mod testing;
pub mod time_entry;
pub mod trade;
pub mod weekly_approval;
pub mod worker;

pub use db::*;

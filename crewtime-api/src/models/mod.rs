pub mod clock_session;
pub mod device_log;
pub mod job;
pub mod labor_activity;
pub mod session;
pub mod time_entry;
pub mod trade;
pub mod weekly_approval;
pub mod worker;

// Re-export models for easier access
pub use clock_session::*;
pub use device_log::*;
pub use job::*;
pub use labor_activity::*;
pub use session::*;
pub use time_entry::*;
pub use trade::*;
pub use weekly_approval::*;
pub use worker::*;

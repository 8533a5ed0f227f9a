pub mod activity_commands;
pub mod approval_commands;
pub mod job_commands;
pub mod session_commands;
pub mod utils;
pub mod worker_commands;

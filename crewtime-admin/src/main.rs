use clap::{Parser, Subcommand};

mod admin_cli;

use admin_cli::activity_commands::{ActivityAction, handle_activity_command_with_conn};
use admin_cli::approval_commands::{ApprovalAction, handle_approval_command_with_conn};
use admin_cli::job_commands::{JobAction, handle_job_command_with_conn};
use admin_cli::session_commands::{SessionAction, handle_session_command_with_conn};
use admin_cli::utils::establish_connection;
use admin_cli::worker_commands::{WorkerAction, handle_worker_command_with_conn};

#[derive(Parser)]
#[command(name = "crewtime-admin")]
#[command(about = "Administrative CLI for the crewtime timesheet database")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Manage the worker roster")]
    Worker {
        #[command(subcommand)]
        action: WorkerAction,
    },
    #[command(about = "Manage jobs and crew assignments")]
    Job {
        #[command(subcommand)]
        action: JobAction,
    },
    #[command(about = "Manage trades and labor activities")]
    Activity {
        #[command(subcommand)]
        action: ActivityAction,
    },
    #[command(about = "Inspect weekly approvals and apply overrides")]
    Approval {
        #[command(subcommand)]
        action: ApprovalAction,
    },
    #[command(about = "Issue and revoke session tokens")]
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

fn main() {
    let cli = Cli::parse();

    let mut conn = match establish_connection() {
        Ok(conn) => conn,
        Err(e) => {
            eprintln!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Worker { action } => handle_worker_command_with_conn(&mut conn, action),
        Command::Job { action } => handle_job_command_with_conn(&mut conn, action),
        Command::Activity { action } => handle_activity_command_with_conn(&mut conn, action),
        Command::Approval { action } => handle_approval_command_with_conn(&mut conn, action),
        Command::Session { action } => handle_session_command_with_conn(&mut conn, action),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

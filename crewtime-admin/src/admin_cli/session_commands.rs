use chrono::{Duration, Utc};
use clap::Subcommand;
use diesel::sqlite::SqliteConnection;

use crewtime_api::orm::session::{insert_session, revoke_session};
use crewtime_api::orm::worker::{get_worker, get_worker_by_email};

#[derive(Subcommand)]
pub enum SessionAction {
    #[command(about = "Issue a session token for a worker")]
    Issue {
        #[arg(short, long, help = "Worker ID (or use --email)")]
        worker: Option<i32>,
        #[arg(short, long, help = "Worker email (or use --worker)")]
        email: Option<String>,
        #[arg(long, help = "Expiry in days; omit for a non-expiring token")]
        expires_days: Option<i64>,
    },
    #[command(about = "Revoke a session token")]
    Revoke {
        #[arg(help = "The token to revoke")]
        token: String,
    },
}

pub fn handle_session_command_with_conn(
    conn: &mut SqliteConnection,
    action: SessionAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SessionAction::Issue {
            worker,
            email,
            expires_days,
        } => session_issue_impl(conn, worker, email, expires_days),
        SessionAction::Revoke { token } => {
            revoke_session(conn, &token)?;
            println!("Revoked token {}", token);
            Ok(())
        }
    }
}

fn session_issue_impl(
    conn: &mut SqliteConnection,
    worker: Option<i32>,
    email: Option<String>,
    expires_days: Option<i64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let target = match (worker, email) {
        (Some(id), _) => get_worker(conn, id)?,
        (None, Some(addr)) => get_worker_by_email(conn, &addr)?,
        (None, None) => return Err("provide --worker or --email".into()),
    };
    let target = match target {
        Some(w) => w,
        None => return Err("no such worker".into()),
    };
    if !target.is_active {
        return Err(format!("{} is deactivated; tokens would not resolve", target.name).into());
    }

    let expires = expires_days.map(|days| Utc::now().naive_utc() + Duration::days(days));
    let session = insert_session(conn, target.id, None, expires)?;
    println!("Issued token for {} ({}):", target.name, target.email);
    println!("{}", session.id);
    Ok(())
}

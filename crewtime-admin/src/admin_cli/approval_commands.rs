use clap::Subcommand;
use diesel::sqlite::SqliteConnection;

use crewtime_api::models::ApprovalInput;
use crewtime_api::orm::weekly_approval::{
    approve_week, list_all_locks, list_locks_for_job, unlock_week,
};
use crewtime_api::orm::worker::get_worker;

use super::utils::{confirm, parse_date_arg};

#[derive(Subcommand)]
pub enum ApprovalAction {
    #[command(about = "List weekly approval locks, newest week first")]
    Ls {
        #[arg(short, long, help = "Limit to one job ID")]
        job: Option<i32>,
    },
    #[command(about = "Approve a worker's week on a job")]
    Approve {
        #[arg(short, long, help = "Worker ID")]
        worker: i32,
        #[arg(short, long, help = "Job ID")]
        job: i32,
        #[arg(short = 'd', long, help = "Any date in the week, YYYY-MM-DD")]
        week: String,
        #[arg(short, long, help = "Approving foreman or admin worker ID")]
        approver: i32,
    },
    #[command(
        about = "Remove a weekly approval lock, reopening the week for edits. \
                 This override is deliberately unavailable over the API."
    )]
    Unlock {
        #[arg(short, long, help = "Worker ID")]
        worker: i32,
        #[arg(short, long, help = "Job ID")]
        job: i32,
        #[arg(short = 'd', long, help = "Any date in the week, YYYY-MM-DD")]
        week: String,
        #[arg(short = 'y', long = "yes", help = "Skip confirmation prompt")]
        yes: bool,
    },
}

pub fn handle_approval_command_with_conn(
    conn: &mut SqliteConnection,
    action: ApprovalAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ApprovalAction::Ls { job } => approval_ls_impl(conn, job),
        ApprovalAction::Approve {
            worker,
            job,
            week,
            approver,
        } => approval_approve_impl(conn, worker, job, &week, approver),
        ApprovalAction::Unlock {
            worker,
            job,
            week,
            yes,
        } => approval_unlock_impl(conn, worker, job, &week, yes),
    }
}

fn approval_ls_impl(
    conn: &mut SqliteConnection,
    job: Option<i32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let locks = match job {
        Some(job_id) => list_locks_for_job(conn, job_id)?,
        None => list_all_locks(conn)?,
    };
    for lock in locks {
        println!(
            "week {}\tworker {}\tjob {}\tapproved by {} at {}",
            lock.week_start, lock.worker_id, lock.job_id, lock.approved_by, lock.approved_at
        );
    }
    Ok(())
}

fn approval_approve_impl(
    conn: &mut SqliteConnection,
    worker: i32,
    job: i32,
    week: &str,
    approver: i32,
) -> Result<(), Box<dyn std::error::Error>> {
    let week_start = parse_date_arg(week)?;
    let approving = match get_worker(conn, approver)? {
        Some(w) => w,
        None => return Err(format!("Approver with ID {} does not exist", approver).into()),
    };
    if !approving.is_foreman() && !approving.is_admin() {
        return Err(format!("{} is not a foreman or admin", approving.name).into());
    }

    let lock = approve_week(
        conn,
        &ApprovalInput {
            worker_id: worker,
            job_id: job,
            week_start,
        },
        approver,
    )?;
    println!(
        "Approved week of {} for worker {} on job {}",
        lock.week_start, lock.worker_id, lock.job_id
    );
    Ok(())
}

fn approval_unlock_impl(
    conn: &mut SqliteConnection,
    worker: i32,
    job: i32,
    week: &str,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let date = parse_date_arg(week)?;
    if !confirm(
        &format!(
            "Unlock the week of {} for worker {} on job {}? Approval stamps will be cleared.",
            date, worker, job
        ),
        yes,
    )? {
        println!("Aborted");
        return Ok(());
    }

    if unlock_week(conn, worker, job, date)? {
        println!("Week unlocked; entries are editable again");
    } else {
        println!("No lock found for that worker, job and week");
    }
    Ok(())
}

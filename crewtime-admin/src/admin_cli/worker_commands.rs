use clap::Subcommand;
use diesel::sqlite::SqliteConnection;

use crewtime_api::models::WorkerInput;
use crewtime_api::orm::worker::{
    add_worker_trade, deactivate_worker, get_worker, get_worker_trades, insert_worker,
    list_all_workers, remove_worker_trade, update_worker,
};

use super::utils::{build_matcher, confirm};

#[derive(Subcommand)]
pub enum WorkerAction {
    #[command(about = "List workers, optionally filtered by search term")]
    Ls {
        #[arg(help = "Search term (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(
            short = 'F',
            long = "fixed-string",
            help = "Treat search term as fixed string instead of regex"
        )]
        fixed_string: bool,
    },
    #[command(about = "Add a new worker")]
    Add {
        #[arg(short, long, help = "Worker name")]
        name: String,
        #[arg(short, long, help = "Worker email (unique)")]
        email: String,
        #[arg(short, long, default_value = "worker", help = "Role: worker, foreman or admin")]
        role: String,
        #[arg(long, help = "Fully-loaded hourly burden rate")]
        burden_rate: Option<f64>,
        #[arg(long, help = "Worker records time via manual entry, not the clock")]
        no_clock: bool,
    },
    #[command(about = "Deactivate workers matching search term")]
    Rm {
        #[arg(help = "Search term to match workers for deactivation")]
        search_term: String,
        #[arg(short = 'F', long = "fixed-string")]
        fixed_string: bool,
        #[arg(short = 'y', long = "yes", help = "Skip confirmation prompt")]
        yes: bool,
    },
    #[command(about = "Edit worker fields")]
    Edit {
        #[arg(short, long, help = "Worker ID to edit")]
        id: i32,
        #[arg(long, help = "New name")]
        name: Option<String>,
        #[arg(long, help = "New email")]
        email: Option<String>,
        #[arg(long, help = "New role")]
        role: Option<String>,
        #[arg(long, help = "New burden rate")]
        burden_rate: Option<f64>,
    },
    #[command(about = "Add a trade qualification")]
    AddTrade {
        #[arg(short, long, help = "Worker ID")]
        id: i32,
        #[arg(short, long, help = "Trade ID")]
        trade: i32,
    },
    #[command(about = "Remove a trade qualification")]
    RmTrade {
        #[arg(short, long, help = "Worker ID")]
        id: i32,
        #[arg(short, long, help = "Trade ID")]
        trade: i32,
    },
}

pub fn handle_worker_command_with_conn(
    conn: &mut SqliteConnection,
    action: WorkerAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        WorkerAction::Ls {
            search_term,
            fixed_string,
        } => worker_ls_impl(conn, search_term, fixed_string),
        WorkerAction::Add {
            name,
            email,
            role,
            burden_rate,
            no_clock,
        } => worker_add_impl(conn, name, email, role, burden_rate, no_clock),
        WorkerAction::Rm {
            search_term,
            fixed_string,
            yes,
        } => worker_rm_impl(conn, search_term, fixed_string, yes),
        WorkerAction::Edit {
            id,
            name,
            email,
            role,
            burden_rate,
        } => worker_edit_impl(conn, id, name, email, role, burden_rate),
        WorkerAction::AddTrade { id, trade } => {
            add_worker_trade(conn, id, trade)?;
            println!("Added trade {} to worker {}", trade, id);
            Ok(())
        }
        WorkerAction::RmTrade { id, trade } => {
            remove_worker_trade(conn, id, trade)?;
            println!("Removed trade {} from worker {}", trade, id);
            Ok(())
        }
    }
}

fn worker_ls_impl(
    conn: &mut SqliteConnection,
    search_term: Option<String>,
    fixed_string: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let workers = list_all_workers(conn)?;
    let matcher = match &search_term {
        Some(term) => Some(build_matcher(term, fixed_string)?),
        None => None,
    };

    for worker in workers {
        if let Some(m) = &matcher {
            if !m(&worker.name) && !m(&worker.email) {
                continue;
            }
        }
        let trades = get_worker_trades(conn, worker.id)?;
        let trade_names: Vec<&str> = trades.iter().map(|t| t.name.as_str()).collect();
        println!(
            "{}\t{}\t{}\t{}\t{}\ttrades: [{}]",
            worker.id,
            worker.name,
            worker.email,
            worker.role,
            if worker.is_active { "active" } else { "inactive" },
            trade_names.join(", ")
        );
    }
    Ok(())
}

fn worker_add_impl(
    conn: &mut SqliteConnection,
    name: String,
    email: String,
    role: String,
    burden_rate: Option<f64>,
    no_clock: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let worker = insert_worker(
        conn,
        WorkerInput {
            name,
            email,
            role,
            uses_clock: Some(!no_clock),
            burden_rate,
        },
    )?;
    println!("Created worker: {} (ID: {})", worker.name, worker.id);
    Ok(())
}

fn worker_rm_impl(
    conn: &mut SqliteConnection,
    search_term: String,
    fixed_string: bool,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let matcher = build_matcher(&search_term, fixed_string)?;
    let matches: Vec<_> = list_all_workers(conn)?
        .into_iter()
        .filter(|w| w.is_active && (matcher(&w.name) || matcher(&w.email)))
        .collect();

    if matches.is_empty() {
        println!("No active workers match '{}'", search_term);
        return Ok(());
    }

    for w in &matches {
        println!("{}\t{}\t{}", w.id, w.name, w.email);
    }
    if !confirm(
        &format!("Deactivate {} worker(s)?", matches.len()),
        yes,
    )? {
        println!("Aborted");
        return Ok(());
    }

    for w in &matches {
        deactivate_worker(conn, w.id)?;
        println!("Deactivated worker: {} (ID: {})", w.name, w.id);
    }
    Ok(())
}

fn worker_edit_impl(
    conn: &mut SqliteConnection,
    id: i32,
    name: Option<String>,
    email: Option<String>,
    role: Option<String>,
    burden_rate: Option<f64>,
) -> Result<(), Box<dyn std::error::Error>> {
    if get_worker(conn, id)?.is_none() {
        return Err(format!("Worker with ID {} does not exist", id).into());
    }
    let worker = update_worker(conn, id, name, email, role, None, burden_rate.map(Some))?;
    println!("Updated worker: {} (ID: {})", worker.name, worker.id);
    Ok(())
}

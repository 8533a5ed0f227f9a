use clap::Subcommand;
use diesel::sqlite::SqliteConnection;

use crewtime_api::geo::Coord;
use crewtime_api::models::JobInput;
use crewtime_api::orm::job::{
    assign_worker, deactivate_job, get_job, get_job_workers, get_required_trades, insert_job,
    list_all_jobs, unassign_worker, update_job,
};

use super::utils::{build_matcher, confirm};

#[derive(Subcommand)]
pub enum JobAction {
    #[command(about = "List jobs, optionally filtered by search term")]
    Ls {
        #[arg(help = "Search term (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(short = 'F', long = "fixed-string")]
        fixed_string: bool,
    },
    #[command(about = "Add a new job")]
    Add {
        #[arg(short, long, help = "Unique job code, e.g. J-100")]
        code: String,
        #[arg(short, long, help = "Job description")]
        description: String,
        #[arg(short, long, help = "Site address")]
        address: Option<String>,
        #[arg(long, requires = "lng", help = "Site latitude")]
        lat: Option<f64>,
        #[arg(long, requires = "lat", help = "Site longitude")]
        lng: Option<f64>,
        #[arg(short, long, help = "Foreman worker ID")]
        foreman: Option<i32>,
    },
    #[command(about = "Edit job fields")]
    Edit {
        #[arg(short, long, help = "Job ID to edit")]
        id: i32,
        #[arg(long, help = "New description")]
        description: Option<String>,
        #[arg(long, help = "New site address")]
        address: Option<String>,
        #[arg(long, requires = "lng", help = "New site latitude")]
        lat: Option<f64>,
        #[arg(long, requires = "lat", help = "New site longitude")]
        lng: Option<f64>,
        #[arg(long, help = "New status: active or inactive")]
        status: Option<String>,
        #[arg(long, help = "New foreman worker ID")]
        foreman: Option<i32>,
    },
    #[command(about = "Deactivate a job")]
    Rm {
        #[arg(short, long, help = "Job ID to deactivate")]
        id: i32,
        #[arg(short = 'y', long = "yes", help = "Skip confirmation prompt")]
        yes: bool,
    },
    #[command(about = "Assign a worker to a job's crew")]
    Assign {
        #[arg(short, long, help = "Job ID")]
        id: i32,
        #[arg(short, long, help = "Worker ID")]
        worker: i32,
    },
    #[command(about = "Remove a worker from a job's crew")]
    Unassign {
        #[arg(short, long, help = "Job ID")]
        id: i32,
        #[arg(short, long, help = "Worker ID")]
        worker: i32,
    },
    #[command(about = "List the crew assigned to a job")]
    Crew {
        #[arg(short, long, help = "Job ID")]
        id: i32,
    },
}

pub fn handle_job_command_with_conn(
    conn: &mut SqliteConnection,
    action: JobAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        JobAction::Ls {
            search_term,
            fixed_string,
        } => job_ls_impl(conn, search_term, fixed_string),
        JobAction::Add {
            code,
            description,
            address,
            lat,
            lng,
            foreman,
        } => job_add_impl(conn, code, description, address, lat, lng, foreman),
        JobAction::Edit {
            id,
            description,
            address,
            lat,
            lng,
            status,
            foreman,
        } => job_edit_impl(conn, id, description, address, lat, lng, status, foreman),
        JobAction::Rm { id, yes } => job_rm_impl(conn, id, yes),
        JobAction::Assign { id, worker } => {
            assign_worker(conn, id, worker)?;
            println!("Assigned worker {} to job {}", worker, id);
            Ok(())
        }
        JobAction::Unassign { id, worker } => {
            unassign_worker(conn, id, worker)?;
            println!("Removed worker {} from job {}", worker, id);
            Ok(())
        }
        JobAction::Crew { id } => {
            for w in get_job_workers(conn, id)? {
                println!("{}\t{}\t{}", w.id, w.name, w.email);
            }
            Ok(())
        }
    }
}

fn job_ls_impl(
    conn: &mut SqliteConnection,
    search_term: Option<String>,
    fixed_string: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let jobs = list_all_jobs(conn)?;
    let matcher = match &search_term {
        Some(term) => Some(build_matcher(term, fixed_string)?),
        None => None,
    };

    for job in jobs {
        if let Some(m) = &matcher {
            if !m(&job.code) && !m(&job.description) {
                continue;
            }
        }
        let trades = get_required_trades(conn, job.id)?;
        let trade_names: Vec<&str> = trades.iter().map(|t| t.name.as_str()).collect();
        let site = match (job.latitude, job.longitude) {
            (Some(lat), Some(lng)) => format!("{:.5},{:.5}", lat, lng),
            _ => "no coords".to_string(),
        };
        println!(
            "{}\t{}\t{}\t{}\t{}\ttrades: [{}]",
            job.id,
            job.code,
            job.description,
            job.status,
            site,
            trade_names.join(", ")
        );
    }
    Ok(())
}

fn job_add_impl(
    conn: &mut SqliteConnection,
    code: String,
    description: String,
    address: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    foreman: Option<i32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let coord = Coord::from_parts(lat, lng);
    let job = insert_job(
        conn,
        JobInput {
            code,
            description,
            address,
            latitude: None,
            longitude: None,
            foreman_id: foreman,
            required_trades: None,
        },
        coord,
    )?;
    println!("Created job: {} (ID: {})", job.code, job.id);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn job_edit_impl(
    conn: &mut SqliteConnection,
    id: i32,
    description: Option<String>,
    address: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    status: Option<String>,
    foreman: Option<i32>,
) -> Result<(), Box<dyn std::error::Error>> {
    if get_job(conn, id)?.is_none() {
        return Err(format!("Job with ID {} does not exist", id).into());
    }
    let coord = Coord::from_parts(lat, lng).map(Some);
    let job = update_job(
        conn,
        id,
        description,
        address,
        coord,
        status,
        foreman.map(Some),
    )?;
    println!("Updated job: {} (ID: {})", job.code, job.id);
    Ok(())
}

fn job_rm_impl(
    conn: &mut SqliteConnection,
    id: i32,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let job = match get_job(conn, id)? {
        Some(job) => job,
        None => return Err(format!("Job with ID {} does not exist", id).into()),
    };
    if !confirm(&format!("Deactivate job {} ({})?", job.code, job.id), yes)? {
        println!("Aborted");
        return Ok(());
    }
    let job = deactivate_job(conn, id)?;
    println!("Deactivated job: {} (ID: {})", job.code, job.id);
    Ok(())
}

use clap::Subcommand;
use diesel::sqlite::SqliteConnection;

use crewtime_api::models::LaborActivityInput;
use crewtime_api::orm::labor_activity::{
    deactivate_labor_activity, get_labor_activity, insert_labor_activity,
    list_all_labor_activities, rename_labor_activity,
};
use crewtime_api::orm::trade::{deactivate_trade, get_trade, insert_trade, list_all_trades};

use super::utils::build_matcher;

#[derive(Subcommand)]
pub enum ActivityAction {
    #[command(about = "List labor activities, optionally filtered by search term")]
    Ls {
        #[arg(help = "Search term (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(short = 'F', long = "fixed-string")]
        fixed_string: bool,
    },
    #[command(about = "Add a labor activity under a trade")]
    Add {
        #[arg(short, long, help = "Activity name")]
        name: String,
        #[arg(short, long, help = "Trade ID the activity belongs to")]
        trade: i32,
    },
    #[command(about = "Rename a labor activity")]
    Rename {
        #[arg(short, long, help = "Activity ID")]
        id: i32,
        #[arg(short, long, help = "New name")]
        name: String,
    },
    #[command(about = "Deactivate a labor activity (hidden from pickers, history kept)")]
    Rm {
        #[arg(short, long, help = "Activity ID")]
        id: i32,
    },
    #[command(about = "List trades")]
    Trades,
    #[command(about = "Add a trade")]
    AddTrade {
        #[arg(short, long, help = "Trade name")]
        name: String,
    },
    #[command(about = "Deactivate a trade")]
    RmTrade {
        #[arg(short, long, help = "Trade ID")]
        id: i32,
    },
}

pub fn handle_activity_command_with_conn(
    conn: &mut SqliteConnection,
    action: ActivityAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ActivityAction::Ls {
            search_term,
            fixed_string,
        } => activity_ls_impl(conn, search_term, fixed_string),
        ActivityAction::Add { name, trade } => activity_add_impl(conn, name, trade),
        ActivityAction::Rename { id, name } => {
            if get_labor_activity(conn, id)?.is_none() {
                return Err(format!("Activity with ID {} does not exist", id).into());
            }
            let a = rename_labor_activity(conn, id, name)?;
            println!("Renamed activity {} to '{}'", a.id, a.name);
            Ok(())
        }
        ActivityAction::Rm { id } => {
            if get_labor_activity(conn, id)?.is_none() {
                return Err(format!("Activity with ID {} does not exist", id).into());
            }
            let a = deactivate_labor_activity(conn, id)?;
            println!("Deactivated activity: {} (ID: {})", a.name, a.id);
            Ok(())
        }
        ActivityAction::Trades => {
            for t in list_all_trades(conn)? {
                println!(
                    "{}\t{}\t{}",
                    t.id,
                    t.name,
                    if t.is_active { "active" } else { "inactive" }
                );
            }
            Ok(())
        }
        ActivityAction::AddTrade { name } => {
            let t = insert_trade(conn, name)?;
            println!("Created trade: {} (ID: {})", t.name, t.id);
            Ok(())
        }
        ActivityAction::RmTrade { id } => {
            if get_trade(conn, id)?.is_none() {
                return Err(format!("Trade with ID {} does not exist", id).into());
            }
            let t = deactivate_trade(conn, id)?;
            println!("Deactivated trade: {} (ID: {})", t.name, t.id);
            Ok(())
        }
    }
}

fn activity_ls_impl(
    conn: &mut SqliteConnection,
    search_term: Option<String>,
    fixed_string: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let trades = list_all_trades(conn)?;
    let trade_name = |trade_id: i32| {
        trades
            .iter()
            .find(|t| t.id == trade_id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| format!("trade {}", trade_id))
    };

    let matcher = match &search_term {
        Some(term) => Some(build_matcher(term, fixed_string)?),
        None => None,
    };

    for a in list_all_labor_activities(conn)? {
        if let Some(m) = &matcher {
            if !m(&a.name) {
                continue;
            }
        }
        println!(
            "{}\t{}\t{}\t{}",
            a.id,
            a.name,
            trade_name(a.trade_id),
            if a.is_active { "active" } else { "inactive" }
        );
    }
    Ok(())
}

fn activity_add_impl(
    conn: &mut SqliteConnection,
    name: String,
    trade: i32,
) -> Result<(), Box<dyn std::error::Error>> {
    if get_trade(conn, trade)?.is_none() {
        return Err(format!("Trade with ID {} does not exist", trade).into());
    }
    let a = insert_labor_activity(
        conn,
        LaborActivityInput {
            name,
            trade_id: trade,
        },
    )?;
    println!("Created activity: {} (ID: {})", a.name, a.id);
    Ok(())
}

// crewtime-api/src/main.rs

use clap::Parser;
use rocket::info;

#[derive(Parser)]
#[command(name = "crewtime-api")]
#[command(about = "Timesheet and payroll API server for field crews")]
#[command(version)]
struct Cli {}

#[rocket::main]
async fn main() {
    let _cli = Cli::parse();

    dotenvy::dotenv().ok();

    info!("crewtime-api v{} starting", env!("CARGO_PKG_VERSION"));

    crewtime_api::rocket()
        .launch()
        .await
        .expect("Rocket server failed to launch");
}

use std::io::{self, Write};

use diesel::{prelude::*, sqlite::SqliteConnection};
use dotenvy::dotenv;
use regex::Regex;

pub fn establish_connection() -> Result<SqliteConnection, Box<dyn std::error::Error>> {
    dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;
    let conn = SqliteConnection::establish(&database_url)?;
    Ok(conn)
}

/// Builds a matcher from a search term: regex by default, substring
/// match when `fixed_string` is set.
pub fn build_matcher(
    search_term: &str,
    fixed_string: bool,
) -> Result<Box<dyn Fn(&str) -> bool>, Box<dyn std::error::Error>> {
    if fixed_string {
        let needle = search_term.to_string();
        Ok(Box::new(move |haystack: &str| haystack.contains(&needle)))
    } else {
        let re = Regex::new(search_term)?;
        Ok(Box::new(move |haystack: &str| re.is_match(haystack)))
    }
}

/// Asks for y/N confirmation on stdin unless `yes` was passed.
pub fn confirm(prompt: &str, yes: bool) -> Result<bool, Box<dyn std::error::Error>> {
    if yes {
        return Ok(true);
    }
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

/// Parses a `YYYY-MM-DD` argument.
pub fn parse_date_arg(raw: &str) -> Result<chrono::NaiveDate, Box<dyn std::error::Error>> {
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", raw).into())
}

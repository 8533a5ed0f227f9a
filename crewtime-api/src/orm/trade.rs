use chrono::Utc;
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{NewTrade, Trade};

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Inserts a new trade.
pub fn insert_trade(
    conn: &mut SqliteConnection,
    trade_name: String,
) -> Result<Trade, diesel::result::Error> {
    use crate::schema::trades::dsl::*;

    let insertable = NewTrade {
        name: trade_name,
        is_active: true,
        created_at: Utc::now().naive_utc(),
    };

    diesel::insert_into(trades)
        .values(&insertable)
        .execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    trades.filter(id.eq(last_id as i32)).first::<Trade>(conn)
}

/// Gets a single trade by ID.
pub fn get_trade(
    conn: &mut SqliteConnection,
    trade_id: i32,
) -> Result<Option<Trade>, diesel::result::Error> {
    use crate::schema::trades::dsl::*;
    trades
        .filter(id.eq(trade_id))
        .first::<Trade>(conn)
        .optional()
}

/// Gets a single trade by name.
pub fn get_trade_by_name(
    conn: &mut SqliteConnection,
    trade_name: &str,
) -> Result<Option<Trade>, diesel::result::Error> {
    use crate::schema::trades::dsl::*;
    trades
        .filter(name.eq(trade_name))
        .first::<Trade>(conn)
        .optional()
}

/// Returns all trades in ascending order by id.
pub fn list_all_trades(conn: &mut SqliteConnection) -> Result<Vec<Trade>, diesel::result::Error> {
    use crate::schema::trades::dsl::*;
    trades.order(id.asc()).load::<Trade>(conn)
}

/// Deactivates a trade without deleting it; historical activities keep
/// pointing at it.
pub fn deactivate_trade(
    conn: &mut SqliteConnection,
    trade_id: i32,
) -> Result<Trade, diesel::result::Error> {
    use crate::schema::trades::dsl::*;
    diesel::update(trades.filter(id.eq(trade_id)))
        .set(is_active.eq(false))
        .execute(conn)?;
    trades.filter(id.eq(trade_id)).first::<Trade>(conn)
}

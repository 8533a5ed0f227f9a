use chrono::Utc;
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{LaborActivity, LaborActivityInput, NewLaborActivity};

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Inserts a new labor activity under its trade.
pub fn insert_labor_activity(
    conn: &mut SqliteConnection,
    input: LaborActivityInput,
) -> Result<LaborActivity, diesel::result::Error> {
    use crate::schema::labor_activities::dsl::*;

    let insertable = NewLaborActivity {
        name: input.name,
        trade_id: input.trade_id,
        is_active: true,
        created_at: Utc::now().naive_utc(),
    };

    diesel::insert_into(labor_activities)
        .values(&insertable)
        .execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    labor_activities
        .filter(id.eq(last_id as i32))
        .first::<LaborActivity>(conn)
}

/// Gets a single labor activity by ID.
pub fn get_labor_activity(
    conn: &mut SqliteConnection,
    activity_id: i32,
) -> Result<Option<LaborActivity>, diesel::result::Error> {
    use crate::schema::labor_activities::dsl::*;
    labor_activities
        .filter(id.eq(activity_id))
        .first::<LaborActivity>(conn)
        .optional()
}

/// Returns all labor activities in ascending order by id.
pub fn list_all_labor_activities(
    conn: &mut SqliteConnection,
) -> Result<Vec<LaborActivity>, diesel::result::Error> {
    use crate::schema::labor_activities::dsl::*;
    labor_activities.order(id.asc()).load::<LaborActivity>(conn)
}

/// Returns the active activities under one trade, for the entry pickers.
pub fn list_activities_by_trade(
    conn: &mut SqliteConnection,
    target_trade_id: i32,
) -> Result<Vec<LaborActivity>, diesel::result::Error> {
    use crate::schema::labor_activities::dsl::*;
    labor_activities
        .filter(trade_id.eq(target_trade_id))
        .filter(is_active.eq(true))
        .order(id.asc())
        .load::<LaborActivity>(conn)
}

/// Returns the active activities available on a job: those belonging to
/// the job's required trades, or every active activity when the job
/// declares no required trades.
pub fn list_activities_for_job(
    conn: &mut SqliteConnection,
    target_job_id: i32,
) -> Result<Vec<LaborActivity>, diesel::result::Error> {
    use crate::schema::{job_trades, labor_activities};

    let trade_ids: Vec<i32> = job_trades::table
        .filter(job_trades::job_id.eq(target_job_id))
        .select(job_trades::trade_id)
        .load::<i32>(conn)?;

    let mut query = labor_activities::table
        .filter(labor_activities::is_active.eq(true))
        .into_boxed();
    if !trade_ids.is_empty() {
        query = query.filter(labor_activities::trade_id.eq_any(trade_ids));
    }
    query
        .order(labor_activities::id.asc())
        .load::<LaborActivity>(conn)
}

/// Renames a labor activity.
pub fn rename_labor_activity(
    conn: &mut SqliteConnection,
    activity_id: i32,
    new_name: String,
) -> Result<LaborActivity, diesel::result::Error> {
    use crate::schema::labor_activities::dsl::*;
    diesel::update(labor_activities.filter(id.eq(activity_id)))
        .set(name.eq(new_name))
        .execute(conn)?;
    labor_activities
        .filter(id.eq(activity_id))
        .first::<LaborActivity>(conn)
}

/// Disables an activity. Historical entries keep referencing it; it just
/// stops appearing in pickers.
pub fn deactivate_labor_activity(
    conn: &mut SqliteConnection,
    activity_id: i32,
) -> Result<LaborActivity, diesel::result::Error> {
    use crate::schema::labor_activities::dsl::*;
    diesel::update(labor_activities.filter(id.eq(activity_id)))
        .set(is_active.eq(false))
        .execute(conn)?;
    labor_activities
        .filter(id.eq(activity_id))
        .first::<LaborActivity>(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobInput;
    use crate::orm::job::{insert_job, set_required_trades};
    use crate::orm::testing::setup_test_db;
    use crate::orm::trade::insert_trade;

    fn activity(trade_id: i32, name: &str) -> LaborActivityInput {
        LaborActivityInput {
            name: name.to_string(),
            trade_id,
        }
    }

    #[test]
    fn test_insert_and_list_by_trade() {
        let mut conn = setup_test_db();
        let drywall = insert_trade(&mut conn, "drywall".to_string()).unwrap();
        let electrical = insert_trade(&mut conn, "electrical".to_string()).unwrap();

        insert_labor_activity(&mut conn, activity(drywall.id, "hang board")).unwrap();
        insert_labor_activity(&mut conn, activity(drywall.id, "tape and finish")).unwrap();
        insert_labor_activity(&mut conn, activity(electrical.id, "rough-in")).unwrap();

        assert_eq!(
            list_activities_by_trade(&mut conn, drywall.id).unwrap().len(),
            2
        );
        assert_eq!(
            list_activities_by_trade(&mut conn, electrical.id)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_deactivated_hidden_from_pickers_but_kept() {
        let mut conn = setup_test_db();
        let drywall = insert_trade(&mut conn, "drywall".to_string()).unwrap();
        let a = insert_labor_activity(&mut conn, activity(drywall.id, "hang board")).unwrap();

        deactivate_labor_activity(&mut conn, a.id).unwrap();
        assert!(
            list_activities_by_trade(&mut conn, drywall.id)
                .unwrap()
                .is_empty()
        );
        assert!(get_labor_activity(&mut conn, a.id).unwrap().is_some());
    }

    #[test]
    fn test_activities_for_job_follow_required_trades() {
        let mut conn = setup_test_db();
        let drywall = insert_trade(&mut conn, "drywall".to_string()).unwrap();
        let electrical = insert_trade(&mut conn, "electrical".to_string()).unwrap();
        insert_labor_activity(&mut conn, activity(drywall.id, "hang board")).unwrap();
        insert_labor_activity(&mut conn, activity(electrical.id, "rough-in")).unwrap();

        let job = insert_job(
            &mut conn,
            JobInput {
                code: "J-100".to_string(),
                description: "buildout".to_string(),
                address: None,
                latitude: None,
                longitude: None,
                foreman_id: None,
                required_trades: None,
            },
            None,
        )
        .unwrap();

        // No required trades declared: every active activity offered.
        assert_eq!(list_activities_for_job(&mut conn, job.id).unwrap().len(), 2);

        set_required_trades(&mut conn, job.id, &[drywall.id]).unwrap();
        let offered = list_activities_for_job(&mut conn, job.id).unwrap();
        assert_eq!(offered.len(), 1);
        assert_eq!(offered[0].name, "hang board");
    }
}

use chrono::Utc;
use rocket::http::{Cookie, Status};
use rocket::local::asynchronous::Client;
use serde_json::json;

use crewtime_api::models::{Job, LaborActivity, TimeEntry, Worker};
use crewtime_api::orm::testing::{
    FOREMAN_SESSION, WORKER1_SESSION, WORKER2_SESSION, test_rocket,
};

fn session(token: &str) -> Cookie<'static> {
    Cookie::new("session", token.to_string())
}

async fn worker_by_email(client: &Client, email: &str) -> Worker {
    let response = client
        .get("/api/1/workers")
        .cookie(session(FOREMAN_SESSION))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let workers: Vec<Worker> = response.into_json().await.expect("valid workers JSON");
    workers
        .into_iter()
        .find(|w| w.email == email)
        .expect("seeded worker should exist")
}

async fn job_by_code(client: &Client, code: &str) -> Job {
    let response = client
        .get("/api/1/jobs")
        .cookie(session(FOREMAN_SESSION))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let jobs: Vec<Job> = response.into_json().await.expect("valid jobs JSON");
    jobs.into_iter()
        .find(|j| j.code == code)
        .expect("seeded job should exist")
}

async fn first_activity(client: &Client) -> LaborActivity {
    let response = client
        .get("/api/1/activities")
        .cookie(session(FOREMAN_SESSION))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let activities: Vec<LaborActivity> =
        response.into_json().await.expect("valid activities JSON");
    activities.into_iter().next().expect("seeded activity")
}

#[rocket::async_test]
async fn test_create_entry_requires_auth() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");

    let response = client
        .post("/api/1/timesheet")
        .json(&json!({
            "job_id": 1,
            "labor_activity_id": 1,
            "entry_date": "2025-06-02",
            "hours": 8.0
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[rocket::async_test]
async fn test_worker_creates_and_lists_own_entry() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");

    let job = job_by_code(&client, "J-100").await;
    let activity = first_activity(&client).await;
    let today = Utc::now().date_naive();

    let response = client
        .post("/api/1/timesheet")
        .cookie(session(WORKER1_SESSION))
        .json(&json!({
            "job_id": job.id,
            "labor_activity_id": activity.id,
            "entry_date": today.to_string(),
            "hours": 8.0,
            "notes": "hung board all day"
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let created: TimeEntry = response.into_json().await.expect("valid entry JSON");
    assert_eq!(created.hours, 8.0);
    assert!(!created.approved);

    // Defaults to the current week, which contains today's entry.
    let response = client
        .get("/api/1/timesheet")
        .cookie(session(WORKER1_SESSION))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let entries: Vec<TimeEntry> = response.into_json().await.expect("valid entries JSON");
    assert!(entries.iter().any(|e| e.id == created.id));
}

#[rocket::async_test]
async fn test_worker_cannot_enter_time_for_another_worker() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");

    let other = worker_by_email(&client, "worker2@example.com").await;
    let job = job_by_code(&client, "J-100").await;
    let activity = first_activity(&client).await;

    let response = client
        .post("/api/1/timesheet")
        .cookie(session(WORKER1_SESSION))
        .json(&json!({
            "worker_id": other.id,
            "job_id": job.id,
            "labor_activity_id": activity.id,
            "entry_date": Utc::now().date_naive().to_string(),
            "hours": 8.0
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    // Nor read their timesheet.
    let response = client
        .get(format!("/api/1/timesheet?worker_id={}", other.id))
        .cookie(session(WORKER1_SESSION))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);
}

#[rocket::async_test]
async fn test_foreman_enters_time_on_workers_behalf() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");

    let worker = worker_by_email(&client, "worker1@example.com").await;
    let job = job_by_code(&client, "J-100").await;
    let activity = first_activity(&client).await;

    let response = client
        .post("/api/1/timesheet")
        .cookie(session(FOREMAN_SESSION))
        .json(&json!({
            "worker_id": worker.id,
            "job_id": job.id,
            "labor_activity_id": activity.id,
            "entry_date": Utc::now().date_naive().to_string(),
            "hours": 6.5
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let created: TimeEntry = response.into_json().await.expect("valid entry JSON");
    assert_eq!(created.worker_id, worker.id);
}

#[rocket::async_test]
async fn test_hours_bounds_rejected() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");

    let job = job_by_code(&client, "J-100").await;
    let activity = first_activity(&client).await;
    let today = Utc::now().date_naive().to_string();

    for bad_hours in [-1.0, 25.0] {
        let response = client
            .post("/api/1/timesheet")
            .cookie(session(WORKER1_SESSION))
            .json(&json!({
                "job_id": job.id,
                "labor_activity_id": activity.id,
                "entry_date": today,
                "hours": bad_hours
            }))
            .dispatch()
            .await;
        assert_eq!(
            response.status(),
            Status::BadRequest,
            "hours {} should be rejected",
            bad_hours
        );
    }

    // Zero is in range: a no-show day is a recordable fact.
    let response = client
        .post("/api/1/timesheet")
        .cookie(session(WORKER1_SESSION))
        .json(&json!({
            "job_id": job.id,
            "labor_activity_id": activity.id,
            "entry_date": today,
            "hours": 0.0
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
}

#[rocket::async_test]
async fn test_duplicate_cell_rejected() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");

    let job = job_by_code(&client, "J-100").await;
    let activity = first_activity(&client).await;
    let body = json!({
        "job_id": job.id,
        "labor_activity_id": activity.id,
        "entry_date": Utc::now().date_naive().to_string(),
        "hours": 8.0
    });

    let response = client
        .post("/api/1/timesheet")
        .cookie(session(WORKER1_SESSION))
        .json(&body)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);

    let response = client
        .post("/api/1/timesheet")
        .cookie(session(WORKER1_SESSION))
        .json(&body)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[rocket::async_test]
async fn test_update_and_delete_own_entry() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");

    let job = job_by_code(&client, "J-100").await;
    let activity = first_activity(&client).await;

    let response = client
        .post("/api/1/timesheet")
        .cookie(session(WORKER1_SESSION))
        .json(&json!({
            "job_id": job.id,
            "labor_activity_id": activity.id,
            "entry_date": Utc::now().date_naive().to_string(),
            "hours": 8.0
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let created: TimeEntry = response.into_json().await.expect("valid entry JSON");

    // Another worker may not touch it.
    let response = client
        .put(format!("/api/1/timesheet/{}", created.id))
        .cookie(session(WORKER2_SESSION))
        .json(&json!({ "hours": 1.0 }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    let response = client
        .put(format!("/api/1/timesheet/{}", created.id))
        .cookie(session(WORKER1_SESSION))
        .json(&json!({ "hours": 7.5, "notes": "left early" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let updated: TimeEntry = response.into_json().await.expect("valid entry JSON");
    assert_eq!(updated.hours, 7.5);
    assert_eq!(updated.notes.as_deref(), Some("left early"));

    let response = client
        .delete(format!("/api/1/timesheet/{}", created.id))
        .cookie(session(WORKER1_SESSION))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NoContent);

    let response = client
        .delete(format!("/api/1/timesheet/{}", created.id))
        .cookie(session(WORKER1_SESSION))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);
}

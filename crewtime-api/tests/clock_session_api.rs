use rocket::http::{Cookie, Status};
use rocket::local::asynchronous::Client;
use serde_json::json;

use crewtime_api::models::{ClockSession, Job, LaborActivity};
use crewtime_api::orm::testing::{FOREMAN_SESSION, TEST_SITE, WORKER1_SESSION, test_rocket};

fn session(token: &str) -> Cookie<'static> {
    Cookie::new("session", token.to_string())
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
async fn test_clock_in_requires_auth() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");

    let response = client
        .post("/api/1/clock/in")
        .json(&json!({ "job_id": 1, "labor_activity_id": 1 }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[rocket::async_test]
async fn test_clock_in_out_with_gps_records_distances() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");

    let job = job_by_code(&client, "J-100").await;
    let activity = first_activity(&client).await;

    let response = client
        .post("/api/1/clock/in")
        .cookie(session(WORKER1_SESSION))
        .json(&json!({
            "job_id": job.id,
            "labor_activity_id": activity.id,
            "gps": {
                "latitude": TEST_SITE.latitude,
                "longitude": TEST_SITE.longitude,
                "accuracy": 10.0
            },
            "device_id": "phone-1"
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let opened: ClockSession = response.into_json().await.expect("valid session JSON");
    assert!(opened.clock_out.is_none());
    assert!(opened.clock_in_distance_mi.expect("distance recorded") < 0.01);

    // The open session is visible while clocked in.
    let response = client
        .get("/api/1/clock/active")
        .cookie(session(WORKER1_SESSION))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let active: serde_json::Value = response.into_json().await.expect("valid JSON");
    assert_eq!(active["session"]["id"], opened.id);
    assert!(active["hours_so_far"].as_f64().expect("hours") < 0.1);

    let response = client
        .post("/api/1/clock/out")
        .cookie(session(WORKER1_SESSION))
        .json(&json!({
            "gps": {
                "latitude": TEST_SITE.latitude,
                "longitude": TEST_SITE.longitude,
                "accuracy": 8.0
            }
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let out: serde_json::Value = response.into_json().await.expect("valid JSON");
    assert_eq!(out["session"]["id"], opened.id);
    assert!(out["session"]["clock_out"].is_string());
    assert!(
        out["session"]["clock_out_distance_mi"]
            .as_f64()
            .expect("out distance")
            < 0.01
    );
    // A sub-minute session rounds to zero hours; no entry materializes.
    assert!(out["time_entry"].is_null());
}

#[rocket::async_test]
async fn test_clock_in_without_gps_leaves_distance_null() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");

    let job = job_by_code(&client, "J-100").await;
    let activity = first_activity(&client).await;

    let response = client
        .post("/api/1/clock/in")
        .cookie(session(WORKER1_SESSION))
        .json(&json!({ "job_id": job.id, "labor_activity_id": activity.id }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let opened: ClockSession = response.into_json().await.expect("valid session JSON");
    assert!(opened.clock_in_latitude.is_none());
    assert!(opened.clock_in_distance_mi.is_none());
}

#[rocket::async_test]
async fn test_second_clock_in_conflicts() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");

    let job = job_by_code(&client, "J-100").await;
    let activity = first_activity(&client).await;
    let body = json!({ "job_id": job.id, "labor_activity_id": activity.id });

    let response = client
        .post("/api/1/clock/in")
        .cookie(session(WORKER1_SESSION))
        .json(&body)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);

    let response = client
        .post("/api/1/clock/in")
        .cookie(session(WORKER1_SESSION))
        .json(&body)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Conflict);
}

#[rocket::async_test]
async fn test_clock_actions_when_not_clocked_in() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");

    let response = client
        .get("/api/1/clock/active")
        .cookie(session(WORKER1_SESSION))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);

    let response = client
        .post("/api/1/clock/out")
        .cookie(session(WORKER1_SESSION))
        .json(&json!({}))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);
}

#[rocket::async_test]
async fn test_unassigned_worker_cannot_clock_in() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");

    // The foreman is not on J-100's crew.
    let job = job_by_code(&client, "J-100").await;
    let activity = first_activity(&client).await;

    let response = client
        .post("/api/1/clock/in")
        .cookie(session(FOREMAN_SESSION))
        .json(&json!({ "job_id": job.id, "labor_activity_id": activity.id }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
}

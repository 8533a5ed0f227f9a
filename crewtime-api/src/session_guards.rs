//! Session-based authentication and authorization guards for Rocket
//! routes.
//!
//! Token issuance lives outside this service; these guards only read
//! the sessions table. A guard validates the "session" cookie, resolves
//! the worker behind it, and enforces the role the route demands.
//!
//! # Basic Authentication
//!
//! ```rust
//! use rocket::get;
//! use crewtime_api::session_guards::AuthenticatedWorker;
//!
//! #[get("/me")]
//! fn me(auth: AuthenticatedWorker) -> String {
//!     format!("Hello, {} ({})", auth.worker.name, auth.worker.role)
//! }
//! ```
//!
//! # Role-Based Authorization
//!
//! ```rust
//! use rocket::get;
//! use crewtime_api::session_guards::{AdminWorker, ForemanWorker};
//!
//! #[get("/approvals")]
//! fn approvals(auth: ForemanWorker) -> String {
//!     format!("Approval access for {}", auth.worker.name)
//! }
//!
//! #[get("/admin")]
//! fn admin_only(auth: AdminWorker) -> String {
//!     format!("Admin access for {}", auth.worker.name)
//! }
//! ```

use chrono::Utc;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};

use crate::models::Worker;
use crate::orm::DbConn;
use crate::orm::session::worker_for_token;

/// A request guard for routes that require an authenticated worker.
///
/// Performs the following checks:
///
/// 1. Extracts the "session" cookie from the request
/// 2. Resolves the token through the sessions table, enforcing
///    revocation and expiry
/// 3. Rejects tokens belonging to deactivated workers
///
/// # Returns
///
/// - `Outcome::Success(AuthenticatedWorker)` if authentication succeeds
/// - `Outcome::Error(Status::Unauthorized)` if authentication fails
/// - `Outcome::Error(Status::InternalServerError)` if the database
///   connection fails
#[derive(Debug)]
pub struct AuthenticatedWorker {
    /// The authenticated worker from the database
    pub worker: Worker,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedWorker {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let cookies = request.cookies();
        let db = match request.guard::<DbConn>().await {
            Outcome::Success(db) => db,
            _ => return Outcome::Error((Status::InternalServerError, ())),
        };

        let session_cookie = match cookies.get("session") {
            Some(cookie) => cookie,
            None => return Outcome::Error((Status::Unauthorized, ())),
        };
        let token = session_cookie.value().to_string();

        let worker_result = db
            .run(move |conn| worker_for_token(conn, &token, Utc::now().naive_utc()))
            .await;

        match worker_result {
            Ok(Some(worker)) => Outcome::Success(AuthenticatedWorker { worker }),
            Ok(None) => Outcome::Error((Status::Unauthorized, ())),
            Err(e) => {
                error!("Database error resolving session: {:?}", e);
                Outcome::Error((Status::Unauthorized, ()))
            }
        }
    }
}

impl AuthenticatedWorker {
    /// True when the worker may act on behalf of `target_worker_id`:
    /// themselves always, anyone for foremen and admins.
    pub fn can_act_for(&self, target_worker_id: i32) -> bool {
        self.worker.id == target_worker_id || self.worker.is_foreman() || self.worker.is_admin()
    }
}

/// Macro to create role-specific request guards
macro_rules! create_role_guard {
    ($name:ident, $check:ident) => {
        #[derive(Debug)]
        pub struct $name {
            pub worker: Worker,
        }

        #[rocket::async_trait]
        impl<'r> FromRequest<'r> for $name {
            type Error = ();

            async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
                let auth = match AuthenticatedWorker::from_request(request).await {
                    Outcome::Success(auth) => auth,
                    Outcome::Error(e) => return Outcome::Error(e),
                    Outcome::Forward(f) => return Outcome::Forward(f),
                };

                if auth.worker.$check() {
                    Outcome::Success($name {
                        worker: auth.worker,
                    })
                } else {
                    Outcome::Error((Status::Forbidden, ()))
                }
            }
        }
    };
}

// A request guard that requires the "admin" role.
create_role_guard!(AdminWorker, is_admin);

/// A request guard for approval and crew-review routes: foremen and
/// admins both pass.
#[derive(Debug)]
pub struct ForemanWorker {
    pub worker: Worker,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ForemanWorker {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let auth = match AuthenticatedWorker::from_request(request).await {
            Outcome::Success(auth) => auth,
            Outcome::Error(e) => return Outcome::Error(e),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        if auth.worker.is_foreman() || auth.worker.is_admin() {
            Outcome::Success(ForemanWorker {
                worker: auth.worker,
            })
        } else {
            Outcome::Error((Status::Forbidden, ()))
        }
    }
}

// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use types::*;

use crate::auth::{OptionalAuth, SessionConfig, SessionUser};
use crate::config::AppConfig;
use crate::database::Database;
use crate::listing::{ListQuery, Page};
use crate::records::{Applicant, Job, JobDraft};
use crate::stats::DashboardStats;
use crate::upstream::UpstreamClient;

use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, delete, get, options, post, put, routes, Request, Response, State};
use serde_json::Value;
use tracing::{error, info};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PUT, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

// Standard API routes

#[post("/auth", data = "<request>")]
pub async fn auth(
    request: Json<StandardRequest<AuthRequest>>,
    upstream: &State<UpstreamClient>,
    session_config: &State<SessionConfig>,
) -> Result<Json<DataResponse<Value>>, Json<StandardErrorResponse>> {
    handlers::auth_handler(request, upstream, session_config).await
}

#[get("/me")]
pub async fn me(auth: SessionUser) -> Json<DataResponse<UserInfo>> {
    handlers::me_handler(auth).await
}

#[get("/me", rank = 2)]
pub async fn me_error() -> Json<StandardErrorResponse> {
    handlers::me_error_handler().await
}

#[get("/jobs?<search>&<status>&<sort>&<dir>&<page>")]
pub async fn list_jobs(
    search: Option<String>,
    status: Option<String>,
    sort: Option<String>,
    dir: Option<String>,
    page: Option<usize>,
    auth: SessionUser,
    upstream: &State<UpstreamClient>,
) -> Result<Json<DataResponse<Page<Job>>>, Json<StandardErrorResponse>> {
    let query = ListQuery::from_params(search, status, sort, dir, page);
    handlers::list_jobs_handler(query, auth, upstream).await
}

#[get("/jobs/<id>")]
pub async fn get_job(
    id: i64,
    auth: SessionUser,
    upstream: &State<UpstreamClient>,
) -> Result<Json<DataResponse<Job>>, Json<StandardErrorResponse>> {
    handlers::get_job_handler(id, auth, upstream).await
}

#[post("/jobs", data = "<request>")]
pub async fn create_job(
    request: Json<StandardRequest<JobDraft>>,
    auth: SessionUser,
    upstream: &State<UpstreamClient>,
) -> Result<Json<ActionResponse>, Json<StandardErrorResponse>> {
    handlers::create_job_handler(request, auth, upstream).await
}

#[put("/jobs/<id>", data = "<payload>")]
pub async fn update_job(
    id: i64,
    payload: Json<Value>,
    auth: SessionUser,
    upstream: &State<UpstreamClient>,
) -> Result<Json<ActionResponse>, Json<StandardErrorResponse>> {
    handlers::update_job_handler(id, payload, auth, upstream).await
}

#[get("/applicants?<search>&<status>&<sort>&<dir>&<page>")]
pub async fn list_applicants(
    search: Option<String>,
    status: Option<String>,
    sort: Option<String>,
    dir: Option<String>,
    page: Option<usize>,
    auth: SessionUser,
    upstream: &State<UpstreamClient>,
) -> Result<Json<DataResponse<Page<Applicant>>>, Json<StandardErrorResponse>> {
    let query = ListQuery::from_params(search, status, sort, dir, page);
    handlers::list_applicants_handler(query, auth, upstream).await
}

#[get("/applicants/<id>")]
pub async fn get_applicant(
    id: i64,
    auth: SessionUser,
    upstream: &State<UpstreamClient>,
) -> Result<Json<DataResponse<Applicant>>, Json<StandardErrorResponse>> {
    handlers::get_applicant_handler(id, auth, upstream).await
}

#[get("/stats")]
pub async fn stats(
    auth: SessionUser,
    upstream: &State<UpstreamClient>,
) -> Result<Json<DataResponse<DashboardStats>>, Json<StandardErrorResponse>> {
    handlers::stats_handler(auth, upstream).await
}

#[get("/users")]
pub async fn list_users(
    auth: SessionUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<Vec<crate::database::User>>>, Json<StandardErrorResponse>> {
    handlers::list_users_handler(auth, db).await
}

#[post("/users", data = "<request>")]
pub async fn create_user(
    request: Json<StandardRequest<CreateUserRequest>>,
    auth: SessionUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<crate::database::User>>, Json<StandardErrorResponse>> {
    handlers::create_user_handler(request, auth, db).await
}

#[put("/users/<id>", data = "<request>")]
pub async fn update_user(
    id: String,
    request: Json<StandardRequest<UpdateUserRequest>>,
    auth: SessionUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<crate::database::User>>, Json<StandardErrorResponse>> {
    handlers::update_user_handler(&id, request, auth, db).await
}

#[delete("/users/<id>")]
pub async fn delete_user(
    id: String,
    auth: SessionUser,
    db: &State<Database>,
) -> Result<Json<ActionResponse>, Json<StandardErrorResponse>> {
    handlers::delete_user_handler(&id, auth, db).await
}

#[get("/health")]
pub async fn health(auth: OptionalAuth, db: &State<Database>) -> Json<DataResponse<HealthData>> {
    handlers::health_handler(auth, db).await
}

#[options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(401)]
pub fn unauthorized() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Authentication required".to_string(),
        "UNAUTHENTICATED".to_string(),
        vec![
            "Login via POST /api/auth".to_string(),
            "Send the session token as an Authorization: Bearer header".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
        None,
    ))
}

// Main server start function
pub async fn start_web_server(config: AppConfig, port: u16) -> Result<()> {
    let upstream = UpstreamClient::new(&config.upstream)?;
    let session_config = SessionConfig::new(config.session.secret.clone(), config.session.ttl_hours);

    let db = match Database::new(&config.database_path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e);
        }
    };

    info!("Starting hireflow API server");
    info!("Database: {}", config.database_path.display());
    info!("Upstream: {}", config.upstream.base_url);

    let figment = rocket::Config::figment().merge(("port", port));

    let _rocket = rocket::custom(figment)
        .attach(Cors)
        .manage(upstream)
        .manage(session_config)
        .manage(db)
        .register("/api", catchers![bad_request, unauthorized, internal_error])
        .mount(
            "/api",
            routes![
                auth,
                me,
                me_error,
                list_jobs,
                get_job,
                create_job,
                update_job,
                list_applicants,
                get_applicant,
                stats,
                list_users,
                create_user,
                update_user,
                delete_user,
                health,
                all_options,
            ],
        )
        .launch()
        .await;

    Ok(())
}

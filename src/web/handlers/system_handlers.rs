// src/web/handlers/system_handlers.rs

use crate::auth::{OptionalAuth, SessionUser};
use crate::database::Database;
use crate::normalize::Normalize;
use crate::records::{Applicant, Job};
use crate::stats::{dashboard_stats, DashboardStats};
use crate::upstream::{Resource, UpstreamClient};
use crate::web::types::{DataResponse, HealthData, StandardErrorResponse};

use chrono::Utc;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

pub async fn health_handler(auth: OptionalAuth, db: &State<Database>) -> Json<DataResponse<HealthData>> {
    if let Some(user) = &auth.user {
        info!("Health check by authenticated user: {}", user.email);
    } else {
        info!("Health check by anonymous user");
    }

    let database = match db.health_check().await {
        Ok(()) => "ok".to_string(),
        Err(e) => {
            error!("Database health check failed: {}", e);
            "unavailable".to_string()
        }
    };

    Json(DataResponse::success(
        "OK".to_string(),
        HealthData {
            status: "ok".to_string(),
            database,
            authenticated: auth.user.is_some(),
        },
        None,
    ))
}

pub async fn stats_handler(
    auth: SessionUser,
    upstream: &State<UpstreamClient>,
) -> Result<Json<DataResponse<DashboardStats>>, Json<StandardErrorResponse>> {
    // Both lists are fetched concurrently; each view owns its own copy.
    let (jobs_result, applicants_result) = tokio::join!(
        upstream.fetch_list(Resource::Jobs),
        upstream.fetch_list(Resource::Applicants),
    );

    let (raw_jobs, raw_applicants) = match (jobs_result, applicants_result) {
        (Ok(jobs), Ok(applicants)) => (jobs, applicants),
        (jobs, applicants) => {
            if let Err(e) = jobs {
                error!("Stats job fetch failed for {}: {}", auth.email, e);
            }
            if let Err(e) = applicants {
                error!("Stats applicant fetch failed for {}: {}", auth.email, e);
            }
            return Err(Json(StandardErrorResponse::new(
                "Failed to fetch dashboard data".to_string(),
                "UPSTREAM_ERROR".to_string(),
                vec!["Try again in a few moments".to_string()],
                None,
            )));
        }
    };

    let jobs: Vec<Job> = raw_jobs.iter().map(Job::normalize).collect();
    let applicants: Vec<Applicant> = raw_applicants.iter().map(Applicant::normalize).collect();
    let stats = dashboard_stats(&jobs, &applicants, Utc::now().date_naive());

    Ok(Json(DataResponse::success(
        "Dashboard stats".to_string(),
        stats,
        None,
    )))
}

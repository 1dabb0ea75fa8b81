// src/web/handlers/job_handlers.rs

use crate::auth::SessionUser;
use crate::listing::{ListQuery, Page};
use crate::normalize::Normalize;
use crate::records::{Job, JobDraft};
use crate::upstream::{Resource, UpstreamClient};
use crate::web::types::{
    ActionResponse, DataResponse, StandardErrorResponse, StandardRequest, WithRequestId,
};

use chrono::Utc;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::Value;
use tracing::{error, info};

fn upstream_error(resource: &str, request_id: Option<String>) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        format!("Failed to fetch {}", resource),
        "UPSTREAM_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Check that the upstream webhook service is reachable".to_string(),
        ],
        request_id,
    ))
}

pub async fn list_jobs_handler(
    query: ListQuery,
    auth: SessionUser,
    upstream: &State<UpstreamClient>,
) -> Result<Json<DataResponse<Page<Job>>>, Json<StandardErrorResponse>> {
    let raw = match upstream.fetch_list(Resource::Jobs).await {
        Ok(raw) => raw,
        Err(e) => {
            error!("Job list fetch failed for {}: {}", auth.email, e);
            return Err(upstream_error("jobs", None));
        }
    };

    let jobs: Vec<Job> = raw.iter().map(Job::normalize).collect();
    let page = query.derive(&jobs);

    Ok(Json(DataResponse::success(
        format!("{} jobs match", page.total),
        page,
        None,
    )))
}

pub async fn get_job_handler(
    id: i64,
    auth: SessionUser,
    upstream: &State<UpstreamClient>,
) -> Result<Json<DataResponse<Job>>, Json<StandardErrorResponse>> {
    match upstream.fetch_one(Resource::Jobs, id).await {
        Ok(Some(raw)) => {
            let job = Job::normalize(&raw);
            Ok(Json(DataResponse::success(
                format!("Job {} found", id),
                job,
                None,
            )))
        }
        Ok(None) => Err(Json(StandardErrorResponse::new(
            format!("Job {} not found", id),
            "NOT_FOUND".to_string(),
            vec!["Check the job id".to_string()],
            None,
        ))),
        Err(e) => {
            error!("Job {} fetch failed for {}: {}", id, auth.email, e);
            Err(upstream_error("jobs", None))
        }
    }
}

pub async fn create_job_handler(
    request: Json<StandardRequest<JobDraft>>,
    auth: SessionUser,
    upstream: &State<UpstreamClient>,
) -> Result<Json<ActionResponse>, Json<StandardErrorResponse>> {
    let request_id = request.request_id();
    let draft = &request.data;

    if draft.title.trim().is_empty() {
        return Err(Json(StandardErrorResponse::new(
            "Job title must not be empty".to_string(),
            "VALIDATION_ERROR".to_string(),
            vec!["Provide a title for the posting".to_string()],
            request_id,
        )));
    }

    info!("User {} creating job posting: {}", auth.email, draft.title);

    let payload = draft.upstream_payload(Utc::now().date_naive());
    match upstream.mutate(Resource::Jobs, None, &payload).await {
        Ok(_) => Ok(Json(ActionResponse::success(
            format!("Job posting '{}' created", draft.title),
            "created".to_string(),
            request_id,
        ))),
        Err(e) => {
            error!("Job creation failed for {}: {}", auth.email, e);
            Err(Json(StandardErrorResponse::new(
                "Failed to save job posting".to_string(),
                "UPSTREAM_ERROR".to_string(),
                vec!["Try again in a few moments".to_string()],
                request_id,
            )))
        }
    }
}

pub async fn update_job_handler(
    id: i64,
    payload: Json<Value>,
    auth: SessionUser,
    upstream: &State<UpstreamClient>,
) -> Result<Json<ActionResponse>, Json<StandardErrorResponse>> {
    info!("User {} updating job {}", auth.email, id);

    match upstream.mutate(Resource::Jobs, Some(id), &payload).await {
        Ok(_) => Ok(Json(ActionResponse::success(
            format!("Job {} updated", id),
            "updated".to_string(),
            None,
        ))),
        Err(e) => {
            error!("Job {} update failed for {}: {}", id, auth.email, e);
            Err(Json(StandardErrorResponse::new(
                "Failed to save job posting".to_string(),
                "UPSTREAM_ERROR".to_string(),
                vec!["Try again in a few moments".to_string()],
                None,
            )))
        }
    }
}

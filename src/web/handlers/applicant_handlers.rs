// src/web/handlers/applicant_handlers.rs

use crate::auth::SessionUser;
use crate::listing::{ListQuery, Page};
use crate::normalize::Normalize;
use crate::records::Applicant;
use crate::upstream::{Resource, UpstreamClient};
use crate::web::types::{DataResponse, StandardErrorResponse};

use rocket::serde::json::Json;
use rocket::State;
use tracing::error;

fn fetch_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Failed to fetch applicants".to_string(),
        "UPSTREAM_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Check that the upstream webhook service is reachable".to_string(),
        ],
        None,
    ))
}

pub async fn list_applicants_handler(
    query: ListQuery,
    auth: SessionUser,
    upstream: &State<UpstreamClient>,
) -> Result<Json<DataResponse<Page<Applicant>>>, Json<StandardErrorResponse>> {
    let raw = match upstream.fetch_list(Resource::Applicants).await {
        Ok(raw) => raw,
        Err(e) => {
            error!("Applicant list fetch failed for {}: {}", auth.email, e);
            return Err(fetch_error());
        }
    };

    let applicants: Vec<Applicant> = raw.iter().map(Applicant::normalize).collect();
    let page = query.derive(&applicants);

    Ok(Json(DataResponse::success(
        format!("{} applicants match", page.total),
        page,
        None,
    )))
}

pub async fn get_applicant_handler(
    id: i64,
    auth: SessionUser,
    upstream: &State<UpstreamClient>,
) -> Result<Json<DataResponse<Applicant>>, Json<StandardErrorResponse>> {
    // The applications webhook has no detail route; resolve the id against
    // the full list, same as the dashboard does.
    let raw = match upstream.fetch_list(Resource::Applicants).await {
        Ok(raw) => raw,
        Err(e) => {
            error!("Applicant {} fetch failed for {}: {}", id, auth.email, e);
            return Err(fetch_error());
        }
    };

    let applicant = raw
        .iter()
        .map(Applicant::normalize)
        .find(|applicant: &Applicant| applicant.id == id);

    match applicant {
        Some(applicant) => Ok(Json(DataResponse::success(
            format!("Applicant {} found", id),
            applicant,
            None,
        ))),
        None => Err(Json(StandardErrorResponse::new(
            format!("Applicant {} not found", id),
            "NOT_FOUND".to_string(),
            vec!["Check the applicant id".to_string()],
            None,
        ))),
    }
}

// src/web/handlers/user_handlers.rs

use crate::auth::SessionUser;
use crate::database::{Database, User, UserService};
use crate::web::types::{
    ActionResponse, CreateUserRequest, DataResponse, StandardErrorResponse, StandardRequest,
    UpdateUserRequest, WithRequestId,
};

use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

fn database_error(request_id: Option<String>) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Database error occurred".to_string(),
        "DATABASE_ERROR".to_string(),
        vec!["Try again in a few moments".to_string()],
        request_id,
    ))
}

pub async fn list_users_handler(
    auth: SessionUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<Vec<User>>>, Json<StandardErrorResponse>> {
    let service = UserService::new(db.pool());
    match service.list().await {
        Ok(users) => Ok(Json(DataResponse::success(
            format!("{} users", users.len()),
            users,
            None,
        ))),
        Err(e) => {
            error!("User listing failed for {}: {}", auth.email, e);
            Err(database_error(None))
        }
    }
}

pub async fn create_user_handler(
    request: Json<StandardRequest<CreateUserRequest>>,
    auth: SessionUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<User>>, Json<StandardErrorResponse>> {
    let request_id = request.request_id();
    let data = &request.data;

    info!("User {} creating user {}", auth.email, data.email);

    let service = UserService::new(db.pool());
    match service.create(&data.name, &data.email, &data.role).await {
        Ok(user) => Ok(Json(DataResponse::success(
            format!("User {} created", user.email),
            user,
            request_id,
        ))),
        Err(e) => {
            error!("User creation failed: {}", e);
            Err(Json(StandardErrorResponse::new(
                e.to_string(),
                "VALIDATION_ERROR".to_string(),
                vec!["Check name, email and role".to_string()],
                request_id,
            )))
        }
    }
}

pub async fn update_user_handler(
    id: &str,
    request: Json<StandardRequest<UpdateUserRequest>>,
    auth: SessionUser,
    db: &State<Database>,
) -> Result<Json<DataResponse<User>>, Json<StandardErrorResponse>> {
    let request_id = request.request_id();

    info!("User {} updating user {}", auth.email, id);

    let service = UserService::new(db.pool());
    match service.update(id, &request.data.as_patch()).await {
        Ok(Some(user)) => Ok(Json(DataResponse::success(
            format!("User {} updated", user.email),
            user,
            request_id,
        ))),
        Ok(None) => Err(Json(StandardErrorResponse::new(
            format!("User {} not found", id),
            "NOT_FOUND".to_string(),
            vec!["Check the user id".to_string()],
            request_id,
        ))),
        Err(e) => {
            error!("User update failed: {}", e);
            Err(Json(StandardErrorResponse::new(
                e.to_string(),
                "VALIDATION_ERROR".to_string(),
                vec!["Check name, email and role".to_string()],
                request_id,
            )))
        }
    }
}

pub async fn delete_user_handler(
    id: &str,
    auth: SessionUser,
    db: &State<Database>,
) -> Result<Json<ActionResponse>, Json<StandardErrorResponse>> {
    info!("User {} deleting user {}", auth.email, id);

    let service = UserService::new(db.pool());
    match service.delete(id).await {
        Ok(true) => Ok(Json(ActionResponse::success(
            format!("User {} deleted", id),
            "deleted".to_string(),
            None,
        ))),
        Ok(false) => Err(Json(StandardErrorResponse::new(
            format!("User {} not found", id),
            "NOT_FOUND".to_string(),
            vec!["Check the user id".to_string()],
            None,
        ))),
        Err(e) => {
            error!("User deletion failed: {}", e);
            Err(database_error(None))
        }
    }
}

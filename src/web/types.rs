// src/web/types.rs

use rocket::serde::{Deserialize, Serialize};

use crate::database::UserPatch;

// Standard response envelope. Every endpoint answers with one of these;
// request_id round-trips from the request so clients can correlate.

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Data,
    Action,
    Error,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T, request_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
            request_id,
        }
    }
}

impl ActionResponse {
    pub fn success(message: String, action: String, request_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Action,
            success: true,
            message,
            action,
            request_id,
        }
    }
}

impl StandardErrorResponse {
    pub fn new(
        error: String,
        error_code: String,
        suggestions: Vec<String>,
        request_id: Option<String>,
    ) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
            request_id,
        }
    }
}

// Request envelope with request_id support.
#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardRequest<T> {
    #[serde(flatten)]
    pub data: T,
    pub request_id: Option<String>,
}

pub trait WithRequestId {
    fn request_id(&self) -> Option<String>;
}

impl<T> WithRequestId for StandardRequest<T> {
    fn request_id(&self) -> Option<String> {
        self.request_id.clone()
    }
}

// ===== Auth =====

/// Auth actions forwarded to the upstream auth webhook.
#[derive(Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct AuthRequest {
    pub action: String,
    pub email: Option<String>,
    pub password: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct UserInfo {
    pub email: String,
    pub name: String,
    pub role: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct LoginData {
    pub token: String,
    pub user: UserInfo,
}

// ===== Users =====

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl UpdateUserRequest {
    pub fn as_patch(&self) -> UserPatch {
        UserPatch {
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }
}

// ===== Health =====

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HealthData {
    pub status: String,
    pub database: String,
    pub authenticated: bool,
}

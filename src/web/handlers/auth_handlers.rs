// src/web/handlers/auth_handlers.rs
//! Auth actions are forwarded to the upstream auth webhook; a successful
//! login additionally mints the local session token the rest of the API
//! requires.

use crate::auth::{issue_token, SessionConfig, SessionUser};
use crate::normalize::Resolver;
use crate::records::RawRecord;
use crate::upstream::UpstreamClient;
use crate::web::types::{
    AuthRequest, DataResponse, LoginData, StandardErrorResponse, StandardRequest, UserInfo,
    WithRequestId,
};

use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};
use tracing::{error, info, warn};

pub async fn auth_handler(
    request: Json<StandardRequest<AuthRequest>>,
    upstream: &State<UpstreamClient>,
    session_config: &State<SessionConfig>,
) -> Result<Json<DataResponse<Value>>, Json<StandardErrorResponse>> {
    let request_id = request.request_id();
    let auth_request = &request.data;

    match auth_request.action.as_str() {
        "login" => login(auth_request, upstream, session_config, request_id).await,
        "register" | "forgot-password" | "change-password" => {
            forward(auth_request, upstream, request_id).await
        }
        other => Err(Json(StandardErrorResponse::new(
            format!("Unknown auth action: {}", other),
            "VALIDATION_ERROR".to_string(),
            vec![
                "Expected one of: login, register, forgot-password, change-password".to_string(),
            ],
            request_id,
        ))),
    }
}

async fn login(
    auth_request: &AuthRequest,
    upstream: &State<UpstreamClient>,
    session_config: &State<SessionConfig>,
    request_id: Option<String>,
) -> Result<Json<DataResponse<Value>>, Json<StandardErrorResponse>> {
    let (Some(email), Some(password)) = (&auth_request.email, &auth_request.password) else {
        return Err(Json(StandardErrorResponse::new(
            "Login requires email and password".to_string(),
            "VALIDATION_ERROR".to_string(),
            vec!["Provide both email and password".to_string()],
            request_id,
        )));
    };

    let payload = json!({ "action": "login", "email": email, "password": password });
    let body = match upstream.auth_action(&payload).await {
        Ok(body) => body,
        Err(e) => {
            error!("Login request failed for {}: {}", email, e);
            return Err(auth_unavailable(request_id));
        }
    };

    if rejected(&body) {
        warn!("Login rejected for {}", email);
        return Err(Json(StandardErrorResponse::new(
            rejection_message(&body),
            "INVALID_CREDENTIALS".to_string(),
            vec!["Check email and password".to_string()],
            request_id,
        )));
    }

    let user = session_user_from(email, &body);
    let token = match issue_token(&user, session_config) {
        Ok(token) => token,
        Err(e) => {
            error!("Failed to issue session token for {}: {}", email, e);
            return Err(auth_unavailable(request_id));
        }
    };

    info!("User {} logged in ({})", user.email, user.role);

    let data = LoginData {
        token,
        user: UserInfo {
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.clone(),
        },
    };

    Ok(Json(DataResponse::success(
        "Login successful".to_string(),
        serde_json::to_value(data).unwrap_or(Value::Null),
        request_id,
    )))
}

async fn forward(
    auth_request: &AuthRequest,
    upstream: &State<UpstreamClient>,
    request_id: Option<String>,
) -> Result<Json<DataResponse<Value>>, Json<StandardErrorResponse>> {
    // The upstream webhook expects camelCase password fields.
    let mut payload = json!({ "action": auth_request.action });
    if let Some(email) = &auth_request.email {
        payload["email"] = json!(email);
    }
    if let Some(password) = &auth_request.password {
        payload["password"] = json!(password);
    }
    if let Some(current) = &auth_request.current_password {
        payload["currentPassword"] = json!(current);
    }
    if let Some(new) = &auth_request.new_password {
        payload["newPassword"] = json!(new);
    }

    let body = match upstream.auth_action(&payload).await {
        Ok(body) => body,
        Err(e) => {
            error!("Auth action {} failed: {}", auth_request.action, e);
            return Err(auth_unavailable(request_id));
        }
    };

    if rejected(&body) {
        return Err(Json(StandardErrorResponse::new(
            rejection_message(&body),
            "AUTH_ACTION_FAILED".to_string(),
            vec!["Check the submitted values".to_string()],
            request_id,
        )));
    }

    Ok(Json(DataResponse::success(
        format!("Auth action '{}' accepted", auth_request.action),
        body,
        request_id,
    )))
}

pub async fn me_handler(auth: SessionUser) -> Json<DataResponse<UserInfo>> {
    let info = UserInfo {
        email: auth.email.clone(),
        name: auth.name.clone(),
        role: auth.role.clone(),
    };

    Json(DataResponse::success(
        format!("Session active for {}", auth.email),
        info,
        None,
    ))
}

pub async fn me_error_handler() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Authentication required".to_string(),
        "AUTHORIZATION_ERROR".to_string(),
        vec!["Login is required".to_string()],
        None,
    ))
}

fn auth_unavailable(request_id: Option<String>) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Authentication service unavailable".to_string(),
        "UPSTREAM_ERROR".to_string(),
        vec!["Try again in a few moments".to_string()],
        request_id,
    ))
}

/// The webhook answers 200 with `success: false` on bad credentials.
fn rejected(body: &Value) -> bool {
    body.get("success").and_then(Value::as_bool) == Some(false)
}

fn rejection_message(body: &Value) -> String {
    body.get("error")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("Invalid email or password")
        .to_string()
}

/// Builds the session identity from whatever user shape the webhook returns;
/// gaps default, the same policy the record normalizer follows.
fn session_user_from(email: &str, body: &Value) -> SessionUser {
    let fallback = RawRecord::new();
    let record = body
        .get("user")
        .and_then(Value::as_object)
        .or_else(|| body.as_object())
        .unwrap_or(&fallback);

    let fields = Resolver::new(record);
    let first = fields.optional_text(&["firstName", "First Name"]);
    let last = fields.optional_text(&["lastName", "Last Name"]);
    let name = match (first, last) {
        (Some(first), Some(last)) => format!("{} {}", first, last),
        (Some(first), None) => first,
        _ => fields.text(&["name", "fullName"], email),
    };

    SessionUser {
        email: email.to_string(),
        name,
        role: fields.text(&["role", "Role"], "user"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejection_detected_only_on_explicit_false() {
        assert!(rejected(&json!({"success": false})));
        assert!(!rejected(&json!({"success": true})));
        assert!(!rejected(&json!({"user": {}})));
    }

    #[test]
    fn session_user_prefers_split_name_fields() {
        let body = json!({"user": {"firstName": "Sarah", "lastName": "Johnson", "role": "Manager"}});
        let user = session_user_from("hr@company.com", &body);
        assert_eq!(user.name, "Sarah Johnson");
        assert_eq!(user.role, "Manager");
    }

    #[test]
    fn session_user_defaults_when_webhook_returns_nothing() {
        let user = session_user_from("hr@company.com", &json!({}));
        assert_eq!(user.email, "hr@company.com");
        assert_eq!(user.name, "hr@company.com");
        assert_eq!(user.role, "user");
    }
}

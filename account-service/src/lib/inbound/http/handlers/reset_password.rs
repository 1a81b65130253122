use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::require_field;
use super::ApiError;
use super::ApiSuccess;
use crate::account::models::User;
use crate::inbound::http::router::AppState;

pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<ApiSuccess<ResetPasswordResponseData>, ApiError> {
    let password = require_field("password", body.password)?;

    state
        .account_service
        .reset_password(&token, &password)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResetPasswordRequest {
    password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetPasswordResponseData {
    pub id: String,
    pub email: String,
    pub name: String,
    pub last_name: String,
    pub last_password_change: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for ResetPasswordResponseData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.as_str().to_string(),
            name: user.name.clone(),
            last_name: user.last_name.clone(),
            last_password_change: user.last_password_change,
            created_at: user.created_at,
        }
    }
}

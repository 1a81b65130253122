use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::account::models::User;
use crate::inbound::http::router::AppState;

pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<ApiSuccess<VerifyEmailResponseData>, ApiError> {
    state
        .account_service
        .verify_email(&token)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyEmailResponseData {
    pub id: String,
    pub email: String,
    pub name: String,
    pub last_name: String,
    pub verification_status: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for VerifyEmailResponseData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.as_str().to_string(),
            name: user.name.clone(),
            last_name: user.last_name.clone(),
            verification_status: user.verification_status,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

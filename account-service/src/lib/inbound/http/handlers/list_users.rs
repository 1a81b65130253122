use axum::extract::State;
use axum::http::StatusCode;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::account::models::User;
use crate::inbound::http::router::AppState;

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<ApiSuccess<Vec<UserSummaryData>>, ApiError> {
    state
        .account_service
        .list_users()
        .await
        .map_err(ApiError::from)
        .map(|users| {
            let data = users.iter().map(UserSummaryData::from).collect();
            ApiSuccess::new(StatusCode::OK, data)
        })
}

/// One listed account; no password hash and no token material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummaryData {
    pub id: String,
    pub email: String,
    pub name: String,
    pub last_name: String,
    pub phone_number: String,
    pub address: String,
    pub location: String,
    pub role_id: i32,
    pub verification_status: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserSummaryData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.as_str().to_string(),
            name: user.name.clone(),
            last_name: user.last_name.clone(),
            phone_number: user.phone_number.as_str().to_string(),
            address: user.address.clone(),
            location: user.location.clone(),
            role_id: user.role_id.0,
            verification_status: user.verification_status,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

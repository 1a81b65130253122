use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::AccountError;
use crate::account::models::User;
use crate::account::models::UserId;
use crate::inbound::http::router::AppState;

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiSuccess<GetUserResponseData>, ApiError> {
    let user_id = UserId::from_string(&id).map_err(AccountError::from)?;

    state
        .account_service
        .get_user(&user_id)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetUserResponseData {
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
    pub last_password_change: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for GetUserResponseData {
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
            last_password_change: user.last_password_change,
            created_at: user.created_at,
        }
    }
}

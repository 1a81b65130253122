use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::AccountError;
use crate::account::models::EmailAddress;
use crate::account::models::PhoneNumber;
use crate::account::models::RoleId;
use crate::account::models::UpdateUserCommand;
use crate::account::models::User;
use crate::account::models::UserId;
use crate::inbound::http::router::AppState;

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<ApiSuccess<UpdateUserResponseData>, ApiError> {
    let user_id = UserId::from_string(&id).map_err(AccountError::from)?;
    let command = body.try_into_command()?;

    state
        .account_service
        .update_user(&user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

/// HTTP request body for a partial account update (raw JSON).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateUserRequest {
    email: Option<String>,
    password: Option<String>,
    name: Option<String>,
    last_name: Option<String>,
    phone_number: Option<String>,
    address: Option<String>,
    location: Option<String>,
    role_id: Option<i32>,
}

impl UpdateUserRequest {
    fn try_into_command(self) -> Result<UpdateUserCommand, AccountError> {
        let email = self.email.map(EmailAddress::new).transpose()?;
        let phone_number = self.phone_number.map(PhoneNumber::new).transpose()?;

        // An empty password field means "leave the password alone"
        let password = self.password.filter(|p| !p.trim().is_empty());

        Ok(UpdateUserCommand {
            email,
            password,
            name: self.name,
            last_name: self.last_name,
            phone_number,
            address: self.address,
            location: self.location,
            role_id: self.role_id.map(RoleId),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateUserResponseData {
    pub id: String,
    pub email: String,
    pub name: String,
    pub last_name: String,
    pub phone_number: String,
    pub address: String,
    pub location: String,
    pub role_id: i32,
    pub last_password_change: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UpdateUserResponseData {
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
            last_password_change: user.last_password_change,
            created_at: user.created_at,
        }
    }
}

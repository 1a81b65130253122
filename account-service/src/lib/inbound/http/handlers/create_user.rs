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
use crate::account::errors::AccountError;
use crate::account::models::EmailAddress;
use crate::account::models::PhoneNumber;
use crate::account::models::RegisterCommand;
use crate::account::models::User;
use crate::inbound::http::router::AppState;

/// Direct account creation: same fields as registration, but the
/// account comes out verified and active with no email round trip.
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<ApiSuccess<CreateUserResponseData>, ApiError> {
    let command = body.try_into_command()?;

    state
        .account_service
        .create_user(command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateUserRequest {
    email: Option<String>,
    password: Option<String>,
    name: Option<String>,
    last_name: Option<String>,
    phone_number: Option<String>,
    address: Option<String>,
    location: Option<String>,
}

impl CreateUserRequest {
    fn try_into_command(self) -> Result<RegisterCommand, AccountError> {
        let email = EmailAddress::new(require_field("email", self.email)?)?;
        let password = require_field("password", self.password)?;
        let name = require_field("name", self.name)?;
        let last_name = require_field("last_name", self.last_name)?;
        let phone_number = PhoneNumber::new(require_field("phone_number", self.phone_number)?)?;
        let address = require_field("address", self.address)?;
        let location = require_field("location", self.location)?;

        Ok(RegisterCommand {
            email,
            password,
            name,
            last_name,
            phone_number,
            address,
            location,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateUserResponseData {
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

impl From<&User> for CreateUserResponseData {
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

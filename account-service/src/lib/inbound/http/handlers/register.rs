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

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<ApiSuccess<RegisterResponseData>, ApiError> {
    let command = body.try_into_command()?;

    state
        .account_service
        .register(command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

/// HTTP request body for registration (raw JSON).
///
/// Fields are optional at the serde level so absence surfaces as a
/// 400 missing-field error instead of a deserialization rejection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    email: Option<String>,
    password: Option<String>,
    name: Option<String>,
    last_name: Option<String>,
    phone_number: Option<String>,
    address: Option<String>,
    location: Option<String>,
}

impl RegisterRequest {
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

/// Created account as returned outward: no password hash, no tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponseData {
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

impl From<&User> for RegisterResponseData {
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

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::require_field;
use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::AccountError;
use crate::account::models::EmailAddress;
use crate::inbound::http::router::AppState;

/// Returned whether or not the email belongs to an account.
const RESET_REQUESTED_MESSAGE: &str =
    "If an account with that email exists, password reset instructions have been sent.";

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<ApiSuccess<ForgotPasswordResponseData>, ApiError> {
    let email = require_field("email", body.email)?;
    let email = EmailAddress::new(email).map_err(AccountError::from)?;

    state
        .account_service
        .forgot_password(&email)
        .await
        .map_err(ApiError::from)
        .map(|_| {
            ApiSuccess::new(
                StatusCode::OK,
                ForgotPasswordResponseData {
                    message: RESET_REQUESTED_MESSAGE.to_string(),
                },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForgotPasswordRequest {
    email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForgotPasswordResponseData {
    pub message: String,
}

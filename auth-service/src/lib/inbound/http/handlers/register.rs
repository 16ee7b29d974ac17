use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::TokenPairResponseData;
use crate::domain::account::models::RegisterInput;
use crate::domain::account::ports::CredentialServicePort;
use crate::inbound::http::router::AppState;

pub async fn register<S: CredentialServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<RegisterRequestBody>,
) -> Result<ApiSuccess<TokenPairResponseData>, ApiError> {
    state
        .credential_service
        .register(RegisterInput::new(body.email, body.password))
        .await
        .map_err(ApiError::from)
        .map(|tokens| ApiSuccess::new(StatusCode::CREATED, tokens.into()))
}

/// HTTP request body for registration (raw JSON)
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequestBody {
    email: String,
    password: String,
}

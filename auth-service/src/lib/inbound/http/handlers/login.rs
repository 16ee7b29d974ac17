use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::TokenPairResponseData;
use crate::domain::account::models::LoginInput;
use crate::domain::account::ports::CredentialServicePort;
use crate::inbound::http::router::AppState;

pub async fn login<S: CredentialServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<TokenPairResponseData>, ApiError> {
    state
        .credential_service
        .login(LoginInput::new(body.email, body.password))
        .await
        .map_err(ApiError::from)
        .map(|tokens| ApiSuccess::new(StatusCode::OK, tokens.into()))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    email: String,
    password: String,
}

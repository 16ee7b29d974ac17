use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use super::handlers::ApiError;
use crate::domain::account::ports::CredentialServicePort;
use crate::inbound::http::router::AppState;

/// Identity of a verified bearer, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    pub account_id: String,
    pub email: String,
}

/// Middleware that validates bearer tokens and adds the account to request extensions
pub async fn authenticate<S: CredentialServicePort>(
    State(state): State<AppState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    // Owned: the request body is not Sync, so no borrow of it may cross an await.
    let token = extract_token_from_header(&req)?.to_string();

    let subject = state
        .credential_service
        .authenticate(&token)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Bearer token rejected");
            ApiError::from(e).into_response()
        })?;

    req.extensions_mut().insert(AuthenticatedAccount {
        account_id: subject.account_id,
        email: subject.email,
    });

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, Response> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthorized("Invalid Authorization header"))?;

    auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        unauthorized("Invalid Authorization header format. Expected: Bearer <token>")
    })
}

fn unauthorized(message: &str) -> Response {
    ApiError::Unauthorized(message.to_string()).into_response()
}

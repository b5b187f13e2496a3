// ABOUTME: Per-request authentication glue shared by every protected endpoint
// ABOUTME: Extracts the bearer token, verifies it upstream, and provisions the principal

use axum::http::{HeaderMap, header};

use crate::{AppState, error::{AppError, Result}, types::Principal};

fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthenticated("Missing authorization".to_string()))?;

    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthenticated("Missing authorization".to_string()))
}

/// Resolve the caller for a request: verify the bearer token with the
/// identity provider, then make sure a `users` row exists for them
/// (first-call lazy provisioning with default plan and quota).
pub async fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<Principal> {
    let token = bearer_token(headers)?;
    let user = state.auth.get_user(token).await?;

    let record = state
        .store
        .ensure_user(user.id, &user.email)
        .await
        .map_err(|err| AppError::Upstream(err.to_string()))?;

    Ok(Principal {
        id: record.id,
        email: record.email,
    })
}

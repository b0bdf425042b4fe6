//! Request extractors: token headers and validated query strings.

use axum::extract::FromRequestParts;
use http::request::Parts;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Request header carrying the access token.
pub const ACCESS_TOKEN_HEADER: &str = "access_token";
/// Request header carrying the refresh token.
pub const REFRESH_TOKEN_HEADER: &str = "refresh_token";

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// Raw access token from the `access_token` header. Absence rejects with
/// the token-missing error before any validation runs.
#[derive(Debug, Clone)]
pub struct AccessToken(pub String);

impl<S> FromRequestParts<S> for AccessToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // Extract synchronously and return a 'static future to sidestep lifetime capture.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = header_value(parts, ACCESS_TOKEN_HEADER);
        async move { token.map(Self).ok_or(AppError::TokenMissing) }
    }
}

/// Raw refresh token from the `refresh_token` header.
#[derive(Debug, Clone)]
pub struct RefreshToken(pub String);

impl<S> FromRequestParts<S> for RefreshToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = header_value(parts, REFRESH_TOKEN_HEADER);
        async move { token.map(Self).ok_or(AppError::TokenMissing) }
    }
}

/// Query-string deserializer that surfaces unknown or malformed fields as
/// a validation error (422), keeping input checks at the boundary.
#[derive(Debug, Clone)]
pub struct FilterQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for FilterQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let parsed = serde_qs::from_str::<T>(parts.uri.query().unwrap_or(""))
            .map_err(|e| AppError::Validation(e.to_string()));
        async move { parsed.map(Self) }
    }
}

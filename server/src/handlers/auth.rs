use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::error::AppError;
use crate::extract::{ACCESS_TOKEN_HEADER, REFRESH_TOKEN_HEADER, RefreshToken};
use crate::state::AppState;
use crate::usecase::token::{LoginInput, LoginUseCase, RefreshTokenUseCase, TokenPair};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Echo the pair back as custom response headers, mirroring the request
/// headers clients send them in.
fn token_headers(pair: &TokenPair) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(ACCESS_TOKEN_HEADER),
        HeaderValue::from_str(&pair.access_token)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("token header value: {e}")))?,
    );
    headers.insert(
        HeaderName::from_static(REFRESH_TOKEN_HEADER),
        HeaderValue::from_str(&pair.refresh_token)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("token header value: {e}")))?,
    );
    Ok(headers)
}

fn token_cookie(name: &'static str, value: &str, max_age_secs: u64) -> Cookie<'static> {
    Cookie::build((name, value.to_owned()))
        .path("/")
        .max_age(Duration::seconds(max_age_secs as i64))
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn token_jar(jar: CookieJar, state: &AppState, pair: &TokenPair) -> CookieJar {
    jar.add(token_cookie(
        ACCESS_TOKEN_HEADER,
        &pair.access_token,
        state.tokens.access_ttl_secs,
    ))
    .add(token_cookie(
        REFRESH_TOKEN_HEADER,
        &pair.refresh_token,
        state.tokens.refresh_ttl_secs,
    ))
}

// ── POST /login ──────────────────────────────────────────────────────────────

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        tokens: state.tokens.clone(),
    };
    let pair = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;

    let headers = token_headers(&pair)?;
    let jar = token_jar(jar, &state, &pair);
    Ok((
        StatusCode::OK,
        headers,
        jar,
        Json(TokenPairResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }),
    ))
}

// ── POST /refresh ────────────────────────────────────────────────────────────

pub async fn refresh(
    token: RefreshToken,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let usecase = RefreshTokenUseCase {
        users: state.user_repo(),
        tokens: state.tokens.clone(),
    };
    let pair = usecase.execute(&token.0).await?;

    let headers = token_headers(&pair)?;
    let jar = token_jar(jar, &state, &pair);
    Ok((
        StatusCode::OK,
        headers,
        jar,
        Json(TokenPairResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }),
    ))
}

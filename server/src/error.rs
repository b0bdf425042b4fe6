use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Application error variants, mapped to HTTP statuses at the boundary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("incorrect email or password")]
    IncorrectCredentials,
    #[error("token missing")]
    TokenMissing,
    #[error("token expired")]
    TokenExpired,
    #[error("token malformed")]
    TokenMalformed,
    #[error("forbidden")]
    Forbidden,
    #[error("{0}")]
    Validation(String),
    #[error("filter matched more than one row")]
    Ambiguous,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::IncorrectCredentials => "INCORRECT_CREDENTIALS",
            Self::TokenMissing => "TOKEN_MISSING",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenMalformed => "TOKEN_MALFORMED",
            Self::Forbidden => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION",
            Self::Ambiguous => "AMBIGUOUS",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::AlreadyExists => StatusCode::CONFLICT,
            Self::IncorrectCredentials
            | Self::TokenMissing
            | Self::TokenExpired
            | Self::TokenMalformed => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Ambiguous | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. The token variants are told apart here and nowhere else: the client
        // sees one uniform 401 body no matter which check tripped.
        let (kind, message) = match &self {
            Self::TokenMissing | Self::TokenExpired | Self::TokenMalformed => {
                tracing::debug!(kind = self.kind(), "token rejected");
                ("UNAUTHORIZED", "unauthorized".to_owned())
            }
            Self::Ambiguous => {
                tracing::error!(kind = self.kind(), "filter matched more than one row");
                ("INTERNAL", "internal error".to_owned())
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, kind = "INTERNAL", "internal error");
                ("INTERNAL", self.to_string())
            }
            _ => (self.kind(), self.to_string()),
        };
        let body = serde_json::json!({
            "kind": kind,
            "message": message,
        });
        (status, axum::Json(body)).into_response()
    }
}

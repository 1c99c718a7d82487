//! Crate-wide error type for the HTTP/WebSocket surface.
//!
//! Mirrors the shape of the teacher's `middleware::auth::TokenError`: one
//! variant per failure class, each mapped to a status code, with database
//! errors wrapped transparently.

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("session not found")]
    SessionNotFound,
    #[error("wrong password")]
    WrongPassword,
    #[error("malformed multidata upload")]
    MalformedMultidata,
    #[error("multidata file too large")]
    MultidataTooLarge,
    #[error("missing credentials")]
    MissingCredentials,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("not permitted for this session")]
    Forbidden,
    #[error("player already joined")]
    AlreadyJoined,
    #[error("internal database error")]
    Database(#[from] DbErr),
}

impl From<crate::auth::TokenError> for AppError {
    fn from(err: crate::auth::TokenError) -> Self {
        match err {
            crate::auth::TokenError::MissingCredentials => AppError::MissingCredentials,
            crate::auth::TokenError::InvalidCredentials => AppError::InvalidCredentials,
            crate::auth::TokenError::Database(err) => AppError::Database(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, AppError::Database(_)) {
            error!("database error while handling request: {}", self);
        }

        let status = match &self {
            AppError::SessionNotFound => StatusCode::NOT_FOUND,
            AppError::WrongPassword | AppError::MissingCredentials => StatusCode::BAD_REQUEST,
            AppError::MalformedMultidata => StatusCode::BAD_REQUEST,
            AppError::MultidataTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::AlreadyJoined => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Body::from(self.to_string())).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

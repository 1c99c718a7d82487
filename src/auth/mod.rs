//! Auth Adapter (spec.md §4.7): resolves a bearer or cookie credential to
//! a user identity and enforces a session's allow-list. Exposed to axum as
//! `FromRequestParts` extractors grounded directly on the teacher's
//! `middleware::auth` (`Auth`, `AdminAuth`, `MaybeAuth`, `TokenError`) —
//! same extension-lookup-then-verify shape, swapped from a single player
//! token to the bearer-key / cookie-pair resolution below.

use std::future::Future;

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use log::error;
use ring::digest::{digest, SHA256};
use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::{
    config::Config,
    database::{
        entities::{mwsessions, users},
        interface::{sessions as session_store, users as user_store},
    },
    env,
    utils::signing::ServerKey,
};

/// A resolved credential, before it has been matched to a `users::Model`.
#[derive(Debug, Clone)]
pub enum Credential {
    Bearer(String),
    Pair { user_id: i32, token: String },
}

const BEARER_PREFIX: &str = "Bearer ";
const USER_ID_COOKIE: &str = "mw_user_id";
const TOKEN_COOKIE: &str = "mw_session_token";

fn extract_credential(parts: &Parts) -> Option<Credential> {
    if let Some(auth) = parts.headers.get(axum::http::header::AUTHORIZATION) {
        if let Ok(value) = auth.to_str() {
            if let Some(key) = value.strip_prefix(BEARER_PREFIX) {
                return Some(Credential::Bearer(key.to_string()));
            }
        }
    }

    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    let mut user_id = None;
    let mut token = None;
    for pair in cookie_header.split(';') {
        let pair = pair.trim();
        if let Some(value) = pair.strip_prefix(&format!("{USER_ID_COOKIE}=")) {
            user_id = value.parse::<i32>().ok();
        } else if let Some(value) = pair.strip_prefix(&format!("{TOKEN_COOKIE}=")) {
            token = Some(value.to_string());
        }
    }

    match (user_id, token) {
        (Some(user_id), Some(token)) => Some(Credential::Pair { user_id, token }),
        _ => None,
    }
}

/// `resolve(credential) -> User | nil` (spec.md §4.7).
pub async fn resolve(
    db: &DatabaseConnection,
    server_key: &ServerKey,
    credential: Credential,
) -> Result<Option<users::Model>, TokenError> {
    match credential {
        Credential::Bearer(key) => {
            let key_hash = hash_bearer_key(&key);
            let Some(api_key) = crate::database::interface::api_keys::find_by_key_hash(db, &key_hash).await? else {
                return Ok(None);
            };
            crate::database::interface::api_keys::touch_last_used(db, api_key.clone()).await?;
            Ok(user_store::find_by_id(db, api_key.user_id).await?)
        }
        Credential::Pair { user_id, token } => {
            let Some(user) = user_store::find_by_id(db, user_id).await? else {
                return Ok(None);
            };

            let expire_days = env::u64_env(env::SESSION_TOKEN_EXPIRE_DAYS);
            let mut matched = None;
            for stored in &user.session_tokens.0 {
                let Ok(ciphertext) = base64_decode(&stored.ciphertext) else {
                    continue;
                };
                if let Ok(plaintext) = server_key.decrypt(&ciphertext) {
                    if plaintext == token {
                        matched = Some(stored.clone());
                        break;
                    }
                }
            }

            let Some(stored) = matched else {
                return Ok(None);
            };

            if stored.is_expired(expire_days) {
                let new_ciphertext = base64_encode(&server_key.encrypt(&token));
                let user = user_store::replace_session_token(
                    db,
                    user,
                    &stored.ciphertext,
                    new_ciphertext,
                )
                .await?;
                return Ok(Some(user));
            }

            Ok(Some(user))
        }
    }
}

/// `allowed(session, user) -> bool` (spec.md §4.7).
pub async fn allowed(
    db: &DatabaseConnection,
    config: &Config,
    session: &mwsessions::Model,
    user: &users::Model,
) -> Result<bool, TokenError> {
    let Some(allow_list) = &session.allow_list else {
        return Ok(true);
    };

    if user.is_superuser {
        return Ok(true);
    }

    if config
        .superuser
        .external_identity_id
        .as_deref()
        .is_some_and(|id| Some(id) == user.external_identity_id.as_deref())
    {
        return Ok(true);
    }

    if session_store::is_owner(db, session.id, user.id).await? {
        return Ok(true);
    }

    if let Some(identity) = &user.external_identity_id {
        if allow_list.0.iter().any(|allowed_id| allowed_id == identity) {
            return Ok(true);
        }
    }

    Ok(false)
}

fn hash_bearer_key(key: &str) -> String {
    use base64ct::Encoding;
    let hash = digest(&SHA256, key.as_bytes());
    base64ct::Base64::encode_string(hash.as_ref())
}

fn base64_encode(bytes: &[u8]) -> String {
    use base64ct::Encoding;
    base64ct::Base64::encode_string(bytes)
}

fn base64_decode(value: &str) -> Result<Vec<u8>, base64ct::Error> {
    use base64ct::Encoding;
    base64ct::Base64::decode_vec(value)
}

pub struct Auth(pub users::Model);
pub struct MaybeAuth(pub Option<users::Model>);

impl<S> FromRequestParts<S> for MaybeAuth
where
    S: Send + Sync,
{
    type Rejection = TokenError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let auth = Auth::from_request_parts(parts, state);
        Box::pin(async move {
            match auth.await {
                Ok(Auth(user)) => Ok(MaybeAuth(Some(user))),
                Err(TokenError::MissingCredentials) => Ok(MaybeAuth(None)),
                Err(err) => Err(err),
            }
        })
    }
}

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = TokenError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let db = parts
            .extensions
            .get::<DatabaseConnection>()
            .expect("database extension missing")
            .clone();
        let server_key = parts
            .extensions
            .get::<std::sync::Arc<ServerKey>>()
            .expect("server key extension missing")
            .clone();
        let credential = extract_credential(parts);

        Box::pin(async move {
            let credential = credential.ok_or(TokenError::MissingCredentials)?;
            let user = resolve(&db, &server_key, credential)
                .await?
                .ok_or(TokenError::InvalidCredentials)?;
            Ok(Self(user))
        })
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("missing credentials")]
    MissingCredentials,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("internal database error")]
    Database(#[from] sea_orm::DbErr),
}

impl IntoResponse for TokenError {
    fn into_response(self) -> Response {
        if matches!(self, TokenError::Database(_)) {
            error!("database error during auth: {self}");
        }
        let status = match &self {
            TokenError::MissingCredentials => StatusCode::BAD_REQUEST,
            TokenError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            TokenError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Body::from(self.to_string())).into_response()
    }
}

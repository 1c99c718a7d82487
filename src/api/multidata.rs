//! `POST /multidata` (spec.md §6): multipart upload that creates a
//! session from an uploaded, zlib-compressed placement file.

use axum::extract::{Multipart, State};
use axum::Json;
use log::info;
use serde::Serialize;

use crate::{
    database::interface::{games, sessions as session_store},
    error::{AppError, AppResult},
    multidata,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub mw_session: uuid::Uuid,
    pub password: Option<String>,
}

/// Reads the `file`/`game`/`password` multipart fields, decodes the
/// placement table, and persists a new session. Fields beyond the first
/// occurrence of each name are ignored.
pub async fn upload(
    State(state): State<AppState>,
    mut form: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let mut file: Option<Vec<u8>> = None;
    let mut game: Option<String> = None;
    let mut password: Option<String> = None;

    while let Some(field) = form
        .next_field()
        .await
        .map_err(|_| AppError::MalformedMultidata)?
    {
        match field.name() {
            Some("file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::MalformedMultidata)?;
                file = Some(bytes.to_vec());
            }
            Some("game") => {
                game = Some(
                    field
                        .text()
                        .await
                        .map_err(|_| AppError::MalformedMultidata)?,
                );
            }
            Some("password") => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::MalformedMultidata)?;
                if !value.is_empty() {
                    password = Some(value);
                }
            }
            _ => {}
        }
    }

    let file = file.ok_or(AppError::MalformedMultidata)?;
    let game = game.ok_or(AppError::MalformedMultidata)?;

    let decoded = multidata::parse(&file, state.config.multidata.max_upload_bytes)?;
    let game = games::find_or_create(&state.db, &game).await?;
    let session = session_store::create(&state.db, game.id, password.clone(), decoded, false)
        .await?;

    info!(
        "multidata upload: created session {} for game {:?}",
        session.id, game.name
    );

    Ok(Json(UploadResponse {
        mw_session: session.id,
        password,
    }))
}

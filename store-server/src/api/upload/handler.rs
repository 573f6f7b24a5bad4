//! Upload API handlers

use axum::{
    Json,
    extract::{Multipart, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub url: String,
}

/// POST /api/upload - store an image, multipart field `file`
pub async fn upload(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> AppResult<Json<AppResponse<UploadResponse>>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(|f| f.to_string())
            .ok_or_else(|| AppError::Validation("file name is required".into()))?;
        let bytes = field.bytes().await?.to_vec();

        let url = state.media_service().upload(&filename, bytes).await?;
        return Ok(ok(UploadResponse { url }));
    }

    Err(AppError::Validation("multipart field 'file' is required".into()))
}

/// DELETE /api/upload?url=... - remove a stored image
pub async fn delete_media(
    State(state): State<ServerState>,
    Query(query): Query<DeleteQuery>,
) -> AppResult<Json<AppResponse<bool>>> {
    state.media_service().delete(&query.url).await?;
    Ok(ok_with_message(true, "Media deleted"))
}

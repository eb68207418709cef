//! Stored File Handler

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::core::ServerState;
use crate::uploads;
use crate::utils::{AppError, AppResult};

/// GET /api/files/{category}/{filename} - 回读上传文件
pub async fn serve(
    State(state): State<ServerState>,
    Path((category, filename)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let rel = format!("{category}/{filename}");
    let path = uploads::resolve(&state.config, &rel)?;

    let bytes = std::fs::read(&path).map_err(|_| AppError::not_found(format!("File {rel}")))?;

    let content_type = mime_guess::from_path(&path)
        .first_or_octet_stream()
        .to_string();

    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}

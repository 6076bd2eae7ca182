/*
 * Copyright (C) 2025 Jakub Žitník
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 */

use crate::{
    error::{ApiError, StatusBody},
    report,
    state::AppState,
    utils,
};
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

/// Receives the `file` part of a multipart form and forwards it to the SFTP target.
///
/// The part is spooled into a temporary file in the scratch directory first.
/// That file is removed once the transfer has finished, whatever its outcome.
pub async fn upload_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<StatusBody>, ApiError> {
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => {
            tracing::debug!("Not a multipart request: {}", rejection);
            return Err(ApiError::NoFile);
        }
    };

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        // A part without `filename=` is a form value, not a file.
        let Some(raw_name) = field.file_name() else {
            tracing::debug!("Ignoring `file` part without a filename");
            continue;
        };
        let filename = utils::sanitize_filename(Some(raw_name));
        let (tmp, mut file) = spool_file(state.scratch_dir.clone()).await?;

        let mut size: u64 = 0;
        while let Some(chunk) = field.chunk().await? {
            size += chunk.len() as u64;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);

        tracing::info!("Received file: {} ({} bytes)", filename, size);

        let transfer = state.transfer.clone();
        let name = filename.clone();
        let remote_path = tokio::task::spawn_blocking(move || {
            let result = transfer.upload(tmp.path(), &name);
            drop(tmp);
            result
        })
        .await??;

        tracing::info!("File sent to {}", remote_path);
        return Ok(Json(StatusBody::success(format!(
            "file sent to SFTP: {}",
            filename
        ))));
    }

    Err(ApiError::NoFile)
}

/// Creates an empty temporary file in `dir` together with an async handle to it.
async fn spool_file(dir: Arc<PathBuf>) -> Result<(NamedTempFile, tokio::fs::File), ApiError> {
    let (tmp, handle) = tokio::task::spawn_blocking(move || -> std::io::Result<_> {
        let tmp = NamedTempFile::new_in(dir.as_path())?;
        let handle = tmp.as_file().try_clone()?;
        Ok((tmp, handle))
    })
    .await??;
    Ok((tmp, tokio::fs::File::from_std(handle)))
}

/// Proxies the configured report and hands it back as a spreadsheet attachment.
pub async fn report_handler(State(state): State<AppState>) -> Response {
    let source = &state.config.report;

    match report::fetch(&state.client, source).await {
        Ok(bytes) => (
            [
                (
                    header::CONTENT_TYPE,
                    report::SPREADSHEET_CONTENT_TYPE.to_string(),
                ),
                (
                    header::CONTENT_DISPOSITION,
                    report::attachment_header(&source.filename),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            let message = utils::describe_error(&e);
            tracing::error!("Report download failed: {}", message);
            (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
        }
    }
}

pub async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

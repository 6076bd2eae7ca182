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

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Failures of the SFTP transfer client.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("remote directory not found: {0}")]
    RemoteDirMissing(String),
    #[error("SSH error: {0}")]
    Ssh(#[from] ssh2::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report URL is not configured")]
    NotConfigured,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors surfaced by the `/upload` handler.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no file received")]
    NoFile,
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error(transparent)]
    Multipart(#[from] axum::extract::multipart::MultipartError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("transfer worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoFile => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body shared by every `/upload` response.
#[derive(Debug, Serialize)]
pub struct StatusBody {
    pub status: &'static str,
    pub message: String,
}

impl StatusBody {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Upload failed: {}", self);
        } else {
            tracing::warn!("Upload rejected: {}", self);
        }
        (status, Json(StatusBody::error(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_message_names_the_directory() {
        let err = ApiError::from(TransferError::RemoteDirMissing("/pub/inbound".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "remote directory not found: /pub/inbound");
    }

    #[test]
    fn no_file_is_a_client_error() {
        assert_eq!(ApiError::NoFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NoFile.to_string(), "no file received");
    }

    #[test]
    fn status_body_serialises_like_the_front_end_expects() {
        let body = serde_json::to_value(StatusBody::success("ok")).unwrap();
        assert_eq!(body, serde_json::json!({"status": "success", "message": "ok"}));
    }
}

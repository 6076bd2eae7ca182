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

use axum::body::Bytes;
use reqwest::Client;

use crate::config::ReportSource;
use crate::error::ReportError;

pub const SPREADSHEET_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Downloads the configured report in full.
///
/// The whole body is buffered so that a failure halfway through never
/// reaches the caller as a truncated spreadsheet.
pub async fn fetch(client: &Client, source: &ReportSource) -> Result<Bytes, ReportError> {
    let url = source.url.as_deref().ok_or(ReportError::NotConfigured)?;
    tracing::info!("Fetching report from {}", url);

    let resp = client
        .get(url)
        .timeout(source.timeout)
        .send()
        .await?
        .error_for_status()?;

    let bytes = resp.bytes().await?;
    tracing::info!("Report fetched ({} bytes)", bytes.len());
    Ok(bytes)
}

/// `Content-Disposition` value announcing `filename` as an attachment.
pub fn attachment_header(filename: &str) -> String {
    format!("attachment; filename={}", filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_header_matches_the_download_name() {
        assert_eq!(
            attachment_header("Stock_BGB.xlsx"),
            "attachment; filename=Stock_BGB.xlsx"
        );
    }

    #[tokio::test]
    async fn unconfigured_url_is_an_error() {
        let source = ReportSource {
            url: None,
            timeout: std::time::Duration::from_secs(1),
            filename: "r.xlsx".into(),
        };
        let err = fetch(&Client::new(), &source).await.unwrap_err();
        assert!(matches!(err, ReportError::NotConfigured));
    }
}

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

use std::env;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_SFTP_PORT: u16 = 22;
const DEFAULT_REMOTE_DIR: &str = "/pub/inbound";
const DEFAULT_REPORT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REPORT_FILENAME: &str = "Stock_BGB.xlsx";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Configuration for the bridge.
#[derive(Debug, Clone)]
pub struct Config {
    /// The port to listen on.
    pub port: u16,
    /// The local address to bind. Loopback unless overridden.
    pub bind_addr: IpAddr,
    /// Where uploaded files are sent.
    pub sftp: SftpTarget,
    /// The reporting endpoint proxied by `/download-metabase`.
    pub report: ReportSource,
    /// Page opened in the browser once the server is up.
    /// If `None`, no browser is launched.
    pub landing_url: Option<String>,
    /// Whether the startup toast and popup are shown.
    pub notifications: bool,
    /// Upper bound on the `/upload` request body.
    pub max_upload_bytes: usize,
}

/// Remote file-transfer target.
#[derive(Clone)]
pub struct SftpTarget {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub remote_dir: String,
}

// Keeps the password out of logs.
impl fmt::Debug for SftpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SftpTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("remote_dir", &self.remote_dir)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ReportSource {
    pub url: Option<String>,
    pub timeout: Duration,
    /// Filename announced in `Content-Disposition`.
    pub filename: String,
}

impl Config {
    /// # Environment Variables
    /// * `PORT` - Port to listen on (default: 5000).
    /// * `BIND_ADDR` - Address to bind (default: 127.0.0.1).
    /// * `SFTP_HOST`, `SFTP_USERNAME`, `SFTP_PASSWORD` - Remote target (required).
    /// * `SFTP_PORT` - Remote SSH port (default: 22).
    /// * `SFTP_REMOTE_DIR` - Destination directory (default: /pub/inbound).
    /// * `REPORT_URL` - Reporting endpoint to proxy (optional).
    /// * `REPORT_TIMEOUT_SECS` - Timeout of the report fetch (default: 30).
    /// * `REPORT_FILENAME` - Attachment name of the report (default: Stock_BGB.xlsx).
    /// * `LANDING_URL` - Page to open in the browser at startup (optional).
    /// * `DISABLE_NOTIFICATIONS` - Set to "true" or "1" to skip the startup toast and popup.
    /// * `MAX_UPLOAD_BYTES` - Body limit for uploads (default: 100 MiB).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let port = parse_or(get("PORT"), "PORT", DEFAULT_PORT)?;
        let bind_addr = parse_or(get("BIND_ADDR"), "BIND_ADDR", IpAddr::from([127, 0, 0, 1]))?;

        let sftp = SftpTarget {
            host: require("SFTP_HOST")?,
            port: parse_or(get("SFTP_PORT"), "SFTP_PORT", DEFAULT_SFTP_PORT)?,
            username: require("SFTP_USERNAME")?,
            password: require("SFTP_PASSWORD")?,
            remote_dir: get("SFTP_REMOTE_DIR").unwrap_or_else(|| DEFAULT_REMOTE_DIR.to_string()),
        };

        let timeout_secs = parse_or(
            get("REPORT_TIMEOUT_SECS"),
            "REPORT_TIMEOUT_SECS",
            DEFAULT_REPORT_TIMEOUT_SECS,
        )?;
        let report = ReportSource {
            url: get("REPORT_URL"),
            timeout: Duration::from_secs(timeout_secs),
            filename: get("REPORT_FILENAME").unwrap_or_else(|| DEFAULT_REPORT_FILENAME.to_string()),
        };

        let notifications = !get("DISABLE_NOTIFICATIONS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Self {
            port,
            bind_addr,
            sftp,
            report,
            landing_url: get("LANDING_URL"),
            notifications,
            max_upload_bytes: parse_or(
                get("MAX_UPLOAD_BYTES"),
                "MAX_UPLOAD_BYTES",
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

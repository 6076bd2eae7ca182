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

use std::fs::File;
use std::io::{self, Write};
use std::net::TcpStream;
use std::path::Path;

use ssh2::{OpenFlags, OpenType, Session, Sftp};

use crate::config::SftpTarget;
use crate::error::TransferError;

/// Something that can place a local file in the remote directory.
///
/// Implementations are blocking; callers run them on the blocking pool.
pub trait FileTransfer: Send + Sync {
    /// Copies `local` to `<remote_dir>/<filename>` and returns the remote path.
    fn upload(&self, local: &Path, filename: &str) -> Result<String, TransferError>;
}

/// Opens one SSH session per upload, authenticating with a password.
pub struct SftpUploader {
    target: SftpTarget,
}

impl SftpUploader {
    pub fn new(target: SftpTarget) -> Self {
        Self { target }
    }

    fn connect(&self) -> Result<Session, TransferError> {
        let addr = format!("{}:{}", self.target.host, self.target.port);
        tracing::info!("Connecting to SFTP server {}", addr);

        let tcp = TcpStream::connect((self.target.host.as_str(), self.target.port))?;
        let mut session = Session::new()?;
        session.set_tcp_stream(tcp);
        session.handshake()?;
        session.userauth_password(&self.target.username, &self.target.password)?;

        if !session.authenticated() {
            // LIBSSH2_ERROR_AUTHENTICATION_FAILED
            return Err(TransferError::Ssh(ssh2::Error::new(
                ssh2::ErrorCode::Session(-18),
                "authentication failed",
            )));
        }
        Ok(session)
    }
}

/// The two remote operations an upload needs.
trait RemoteFs {
    type File: Write;

    /// Whether `path` exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;
    /// Creates or truncates the file at `path`.
    fn create(&self, path: &Path) -> Result<Self::File, TransferError>;
}

impl RemoteFs for Sftp {
    type File = ssh2::File;

    fn is_dir(&self, path: &Path) -> bool {
        self.stat(path).map(|stat| stat.is_dir()).unwrap_or(false)
    }

    fn create(&self, path: &Path) -> Result<ssh2::File, TransferError> {
        Ok(self.open_mode(path, upload_flags(), 0o644, OpenType::File)?)
    }
}

fn upload_flags() -> OpenFlags {
    OpenFlags::CREATE | OpenFlags::WRITE | OpenFlags::TRUNCATE
}

/// Checks the remote directory, then copies `local` into it.
/// Nothing is created remotely when the directory is missing.
fn put<R: RemoteFs>(
    fs: &R,
    remote_dir: &str,
    local: &Path,
    filename: &str,
) -> Result<String, TransferError> {
    if !fs.is_dir(Path::new(remote_dir)) {
        return Err(TransferError::RemoteDirMissing(remote_dir.to_string()));
    }

    let remote_path = remote_path(remote_dir, filename);
    tracing::info!("Uploading {} to {}", local.display(), remote_path);

    let mut local_file = File::open(local)?;
    let mut remote_file = fs.create(Path::new(&remote_path))?;
    let written = io::copy(&mut local_file, &mut remote_file)?;
    remote_file.flush()?;
    tracing::debug!("Wrote {} bytes to {}", written, remote_path);

    Ok(remote_path)
}

impl FileTransfer for SftpUploader {
    fn upload(&self, local: &Path, filename: &str) -> Result<String, TransferError> {
        let session = self.connect()?;
        let result = session
            .sftp()
            .map_err(TransferError::from)
            .and_then(|sftp| put(&sftp, &self.target.remote_dir, local, filename));

        if let Err(e) = session.disconnect(None, "upload finished", None) {
            tracing::debug!("SFTP disconnect failed: {}", e);
        }
        result
    }
}

/// Joins the remote directory and file name with exactly one separator.
pub fn remote_path(remote_dir: &str, filename: &str) -> String {
    format!("{}/{}", remote_dir.trim_end_matches('/'), filename)
}

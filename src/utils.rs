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

use std::error::Error;
use std::io;
use std::process::Command;

const FALLBACK_FILENAME: &str = "unknown.csv";

/// Reduces a browser-supplied filename to a bare file name.
///
/// Anything before the last `/` or `\` is dropped so the upload cannot
/// leave the remote directory. Empty names, `.` and `..` fall back to
/// `unknown.csv`.
pub fn sanitize_filename(raw: Option<&str>) -> String {
    let name = raw
        .unwrap_or("")
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim();

    match name {
        "" | "." | ".." => FALLBACK_FILENAME.to_string(),
        other => other.to_string(),
    }
}

/// Renders an error together with its source chain, e.g.
/// `error sending request: connection refused`.
pub fn describe_error(err: &(dyn Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

/// Opens `url` in the user's default browser.
pub fn open_browser(url: &str) -> io::Result<()> {
    browser_command(url).spawn().map(|_| ())
}

/// The platform opener for `url`. The URL is handed over as a single
/// argument and never goes through a shell.
fn browser_command(url: &str) -> Command {
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = Command::new("rundll32");
        c.arg("url.dll,FileProtocolHandler");
        c
    };

    #[cfg(target_os = "macos")]
    let mut command = Command::new("open");

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let mut command = Command::new("xdg-open");

    command.arg(url);
    command
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_are_kept() {
        assert_eq!(sanitize_filename(Some("stock.csv")), "stock.csv");
        assert_eq!(sanitize_filename(Some("  report 2025.xlsx ")), "report 2025.xlsx");
    }

    #[test]
    fn directories_are_stripped() {
        assert_eq!(sanitize_filename(Some("../../etc/passwd")), "passwd");
        assert_eq!(sanitize_filename(Some("C:\\Users\\me\\stock.csv")), "stock.csv");
        assert_eq!(sanitize_filename(Some("/abs/path/file.csv")), "file.csv");
    }

    #[test]
    fn unusable_names_fall_back() {
        assert_eq!(sanitize_filename(None), "unknown.csv");
        assert_eq!(sanitize_filename(Some("")), "unknown.csv");
        assert_eq!(sanitize_filename(Some("dir/")), "unknown.csv");
        assert_eq!(sanitize_filename(Some("..")), "unknown.csv");
    }

    #[test]
    fn browser_gets_the_url_as_one_argument() {
        let url = "https://example.test/page?a=1&b=2|x^y";
        let command = browser_command(url);

        assert_ne!(command.get_program(), "cmd");
        let last = command.get_args().last().expect("url argument");
        assert_eq!(last, url);
    }

    #[derive(Debug)]
    struct Outer(io::Error);

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "request failed")
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn error_chain_is_flattened() {
        let err = Outer(io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"));
        assert_eq!(describe_error(&err), "request failed: connection refused");
    }
}

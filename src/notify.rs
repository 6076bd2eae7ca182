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

//! Startup announcements shown on the local desktop.
//!
//! Every path is optional. A notifier reports whether it can run on this
//! machine before it is invoked, and whatever happens afterwards is only
//! logged.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;

const APP_NAME: &str = "sftp-bridge";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[cfg(not(feature = "desktop-notify"))]
    #[error("desktop notifications are not compiled in")]
    Unsupported,
    #[error("notification backend failed: {0}")]
    Backend(String),
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub title: String,
    pub body: String,
    /// How long the notice stays on screen.
    pub duration: Duration,
}

/// A notice currently on screen.
pub trait Shown {
    /// Takes the notice down. Backends that cannot do this ignore the call.
    fn close(self: Box<Self>);
}

pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;
    fn is_available(&self) -> bool;
    fn show(&self, notice: &Notice) -> Result<Box<dyn Shown>, NotifyError>;
}

/// Handle of a notice that disappears on its own.
#[cfg(all(feature = "desktop-notify", not(all(unix, not(target_os = "macos")))))]
struct Detached;

#[cfg(all(feature = "desktop-notify", not(all(unix, not(target_os = "macos")))))]
impl Shown for Detached {
    fn close(self: Box<Self>) {}
}

#[cfg(all(feature = "desktop-notify", unix, not(target_os = "macos")))]
struct XdgShown(notify_rust::NotificationHandle);

#[cfg(all(feature = "desktop-notify", unix, not(target_os = "macos")))]
impl Shown for XdgShown {
    fn close(self: Box<Self>) {
        self.0.close();
    }
}

/// Desktop notification through the platform's notification service.
#[derive(Debug, Clone, Copy)]
pub struct DesktopNotifier {
    /// Urgent notices are raised above other windows where the desktop allows it.
    urgent: bool,
}

impl DesktopNotifier {
    /// Transient toast.
    pub fn toast() -> Self {
        Self { urgent: false }
    }

    /// Short-lived popup that stays on top until it closes itself.
    pub fn popup() -> Self {
        Self { urgent: true }
    }
}

impl Notifier for DesktopNotifier {
    fn name(&self) -> &'static str {
        if self.urgent { "popup" } else { "toast" }
    }

    fn is_available(&self) -> bool {
        cfg!(feature = "desktop-notify") && session_bus_present()
    }

    #[cfg(feature = "desktop-notify")]
    fn show(&self, notice: &Notice) -> Result<Box<dyn Shown>, NotifyError> {
        let millis = u32::try_from(notice.duration.as_millis()).unwrap_or(u32::MAX);

        let mut notification = notify_rust::Notification::new();
        notification
            .appname(APP_NAME)
            .summary(&notice.title)
            .body(&notice.body)
            .timeout(notify_rust::Timeout::Milliseconds(millis));

        #[cfg(all(unix, not(target_os = "macos")))]
        {
            if self.urgent {
                notification.urgency(notify_rust::Urgency::Critical);
            }
        }

        let handle = notification
            .show()
            .map_err(|e| NotifyError::Backend(e.to_string()))?;

        // Servers may keep critical notices up past their timeout.
        #[cfg(all(unix, not(target_os = "macos")))]
        let shown: Box<dyn Shown> = Box::new(XdgShown(handle));
        #[cfg(not(all(unix, not(target_os = "macos"))))]
        let shown: Box<dyn Shown> = {
            let _ = handle;
            Box::new(Detached)
        };
        Ok(shown)
    }

    #[cfg(not(feature = "desktop-notify"))]
    fn show(&self, _notice: &Notice) -> Result<Box<dyn Shown>, NotifyError> {
        Err(NotifyError::Unsupported)
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
fn session_bus_present() -> bool {
    std::env::var_os("DBUS_SESSION_BUS_ADDRESS").is_some()
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn session_bus_present() -> bool {
    true
}

/// Shows each notice on its own thread and closes it once its duration
/// has passed. Unavailable notifiers are skipped.
///
/// The returned handles may be dropped; the threads are detached then.
pub fn dispatch(jobs: Vec<(Arc<dyn Notifier>, Notice)>) -> Vec<JoinHandle<()>> {
    jobs.into_iter()
        .filter_map(|(notifier, notice)| {
            if !notifier.is_available() {
                tracing::debug!("Skipping {} notification: backend unavailable", notifier.name());
                return None;
            }
            let spawned = thread::Builder::new()
                .name(format!("notify-{}", notifier.name()))
                .spawn(move || match notifier.show(&notice) {
                    Ok(shown) => {
                        thread::sleep(notice.duration);
                        shown.close();
                    }
                    Err(e) => {
                        tracing::debug!("{} notification failed: {}", notifier.name(), e);
                    }
                });
            match spawned {
                Ok(handle) => Some(handle),
                Err(e) => {
                    tracing::debug!("Could not spawn notification thread: {}", e);
                    None
                }
            }
        })
        .collect()
}

/// Tells the local user that the server is up.
pub fn announce_startup() {
    let toast = Notice {
        title: APP_NAME.to_string(),
        body: "SFTP server started. The tool is ready to use.".to_string(),
        duration: Duration::from_secs(5),
    };
    let popup = Notice {
        title: APP_NAME.to_string(),
        body: "Server started successfully.\nKeep this program running while you use the tool."
            .to_string(),
        duration: Duration::from_secs(3),
    };

    let toaster: Arc<dyn Notifier> = Arc::new(DesktopNotifier::toast());
    let popper: Arc<dyn Notifier> = Arc::new(DesktopNotifier::popup());
    dispatch(vec![(toaster, toast), (popper, popup)]);
}

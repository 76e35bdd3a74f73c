use crate::report::{Notification, Severity};
use anyhow::{Context, Result, bail};
use std::process::Command;
use tracing::{debug, warn};

/// Delivers notifications produced by a report.
pub trait Notifier {
    fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Shows notifications through the OS notifier binary
/// (`notify-send`, or `osascript` on macOS).
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    /// Builds the notifier invocation for the current platform.
    pub fn command(notification: &Notification) -> Command {
        if cfg!(target_os = "macos") {
            let script = format!(
                "display notification {} with title {}",
                applescript_string(&notification.message),
                applescript_string(&notification.title)
            );
            let mut cmd = Command::new("osascript");
            cmd.args(["-e", &script]);
            cmd
        } else {
            let urgency = match (notification.severity, notification.priority) {
                (Severity::Failed, p) if p >= 2 => "critical",
                (Severity::Failed, _) => "normal",
                (Severity::Success, _) => "low",
            };
            let icon = match notification.severity {
                Severity::Success => "dialog-information",
                Severity::Failed => "dialog-error",
            };
            let mut cmd = Command::new("notify-send");
            cmd.args(["--urgency", urgency, "--icon", icon, "--app-name", "jasmine-guard"])
                .arg(&notification.title)
                .arg(&notification.message);
            cmd
        }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        let mut cmd = Self::command(notification);
        debug!("🔔 Notifying: {:?}", cmd);

        let output = cmd
            .output()
            .with_context(|| format!("Failed to run {:?}", cmd.get_program()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "{:?} exited with code {}: {}",
                cmd.get_program(),
                output.status.code().unwrap_or(-1),
                stderr.trim()
            );
        }

        Ok(())
    }
}

/// Delivers through `notifier`, logging instead of failing.
pub fn notify_or_warn(notifier: &dyn Notifier, notification: &Notification) {
    if let Err(e) = notifier.notify(notification) {
        warn!("⚠️  Could not show notification: {:#}", e);
    }
}

fn applescript_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

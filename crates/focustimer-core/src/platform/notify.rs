//! Desktop notification delivery.
//!
//! Injected into whatever drives the engine; delivery failures are
//! logged and swallowed, never surfaced to the timer.

use std::process::Command;

use log::warn;

/// Delivers a short notification to the user.
pub trait Notifier {
    fn notify(&self, summary: &str, body: &str);
}

/// Sends through the platform's notification command
/// (`notify-send` on Linux, `osascript` on macOS).
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    #[cfg(target_os = "linux")]
    fn notify(&self, summary: &str, body: &str) {
        if let Err(e) = Command::new("notify-send")
            .args(["--app-name=focustimer", summary, body])
            .status()
        {
            warn!("notify-send failed: {e}");
        }
    }

    #[cfg(target_os = "macos")]
    fn notify(&self, summary: &str, body: &str) {
        let script = format!(
            "display notification \"{}\" with title \"{}\"",
            body.replace('"', "\\\""),
            summary.replace('"', "\\\"")
        );
        if let Err(e) = Command::new("osascript").args(["-e", &script]).status() {
            warn!("osascript failed: {e}");
        }
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    fn notify(&self, summary: &str, body: &str) {
        log::info!("{summary}: {body}");
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _summary: &str, _body: &str) {}
}

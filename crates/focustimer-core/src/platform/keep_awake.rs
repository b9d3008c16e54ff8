//! Screen-wake suppression.
//!
//! One capability interface, one implementation per platform, selected
//! at startup. Failures here never affect timer correctness: they are
//! logged and swallowed.

use std::process::{Child, Command, Stdio};

use log::warn;

/// Prevents the screen/system from sleeping while a phase is running.
pub trait KeepAwake {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_active(&self) -> bool;
}

/// macOS implementation: keeps a `caffeinate -d -i` child alive.
#[derive(Default)]
pub struct CaffeinateKeepAwake {
    child: Option<Child>,
}

impl KeepAwake for CaffeinateKeepAwake {
    fn start(&mut self) {
        if self.child.is_some() {
            return;
        }
        match Command::new("caffeinate")
            .args(["-d", "-i"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => self.child = Some(child),
            Err(e) => warn!("could not start caffeinate: {e}"),
        }
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                warn!("could not stop caffeinate: {e}");
            }
            let _ = child.wait();
        }
    }

    fn is_active(&self) -> bool {
        self.child.is_some()
    }
}

impl Drop for CaffeinateKeepAwake {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Linux implementation: holds a `systemd-inhibit` child for the idle
/// and sleep locks.
#[derive(Default)]
pub struct InhibitKeepAwake {
    child: Option<Child>,
}

impl KeepAwake for InhibitKeepAwake {
    fn start(&mut self) {
        if self.child.is_some() {
            return;
        }
        match Command::new("systemd-inhibit")
            .args([
                "--what=idle:sleep",
                "--who=focustimer",
                "--why=focus session running",
                "sleep",
                "infinity",
            ])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => self.child = Some(child),
            Err(e) => warn!("could not start systemd-inhibit: {e}"),
        }
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                warn!("could not stop systemd-inhibit: {e}");
            }
            let _ = child.wait();
        }
    }

    fn is_active(&self) -> bool {
        self.child.is_some()
    }
}

impl Drop for InhibitKeepAwake {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Fallback for platforms without a wake-lock mechanism.
#[derive(Default)]
pub struct NoopKeepAwake {
    active: bool,
}

impl KeepAwake for NoopKeepAwake {
    fn start(&mut self) {
        self.active = true;
    }

    fn stop(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Select the implementation for the current platform.
pub fn platform_keep_awake() -> Box<dyn KeepAwake> {
    #[cfg(target_os = "macos")]
    {
        Box::new(CaffeinateKeepAwake::default())
    }
    #[cfg(target_os = "linux")]
    {
        Box::new(InhibitKeepAwake::default())
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        Box::new(NoopKeepAwake::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_tracks_active_flag() {
        let mut ka = NoopKeepAwake::default();
        assert!(!ka.is_active());
        ka.start();
        assert!(ka.is_active());
        ka.stop();
        assert!(!ka.is_active());
    }
}

//! Popup delivery. Every notifier returns immediately; failures are logged
//! where they happen and never reach the caller.

use std::io::Write;
use std::process::Command;

use mood_core::Notifier;

use crate::config::PopupBackend;

/// Shows a native notification from a detached thread per popup.
///
/// The thread is never joined; a dialog left open does not hold up frames
/// or process exit.
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str) {
        let title = title.to_string();
        let message = message.to_string();
        let spawned = std::thread::Builder::new()
            .name("popup".into())
            .spawn(move || {
                if let Err(e) = show_native(&title, &message) {
                    tracing::warn!("error showing popup: {e}");
                }
            });
        if let Err(e) = spawned {
            tracing::warn!("error showing popup: {e}");
        }
    }
}

#[cfg(target_os = "macos")]
fn native_command(title: &str, message: &str) -> Command {
    let script = format!(
        "display dialog {} with title {} buttons {{\"OK\"}} default button 1",
        applescript_quote(message),
        applescript_quote(title)
    );
    let mut cmd = Command::new("osascript");
    cmd.arg("-e").arg(script);
    cmd
}

#[cfg(target_os = "macos")]
fn applescript_quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(not(target_os = "macos"))]
fn native_command(title: &str, message: &str) -> Command {
    let mut cmd = Command::new("notify-send");
    cmd.args(["--urgency=critical", "--app-name=moodwatch", title, message]);
    cmd
}

fn show_native(title: &str, message: &str) -> std::io::Result<()> {
    let status = native_command(title, message).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("notifier exited with {status}")))
    }
}

/// Writes each popup as a line on stdout.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, message: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "popup: {title} {message}") {
            tracing::warn!("error showing popup: {e}");
        }
    }
}

/// The notifier picked at startup.
pub enum AnyNotifier {
    Desktop(DesktopNotifier),
    Log(LogNotifier),
    Discard,
}

impl AnyNotifier {
    pub fn for_backend(backend: PopupBackend) -> Self {
        match backend {
            PopupBackend::Desktop => AnyNotifier::Desktop(DesktopNotifier),
            PopupBackend::Log => AnyNotifier::Log(LogNotifier),
            PopupBackend::None => AnyNotifier::Discard,
        }
    }
}

impl Notifier for AnyNotifier {
    fn notify(&self, title: &str, message: &str) {
        match self {
            AnyNotifier::Desktop(n) => n.notify(title, message),
            AnyNotifier::Log(n) => n.notify(title, message),
            AnyNotifier::Discard => tracing::debug!("popup discarded: {message}"),
        }
    }
}

//! Theme Coordinator for listing captures
//!
//! Highlighted HTML carries the colors of whatever theme the host shows, so a
//! capture may temporarily switch the host to a configured theme. The switch
//! is a request/confirm exchange: ask for the theme, block until the host
//! emits a theme-change event, then verify the host really shows the theme.
//!
//! # Usage
//!
//! ```ignore
//! use crate::theme::run_with_theme;
//!
//! let html = run_with_theme(&mut host, Some("InspiredGitHub"), |host| {
//!     capture(host, &selection, &policy)
//! })?;
//! ```

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::host::EditorHost;

// ─────────────────────────────────────────────────────────────────────────────
// Theme Switching
// ─────────────────────────────────────────────────────────────────────────────

/// Switch the host theme and wait for confirmation.
///
/// Subscribes before requesting so the confirmation cannot be missed, takes
/// the first theme-change event, then re-reads the active theme.
pub fn switch_theme<H: EditorHost + ?Sized>(host: &mut H, target: &str) -> Result<()> {
    let events = host.subscribe_theme_changes();
    host.request_color_theme(target)?;

    let change = events
        .recv()
        .map_err(|_| Error::Host("Theme change was never confirmed.".to_string()))?;
    drop(events);
    debug!("Host confirmed theme change to '{}'", change.theme);

    let actual = host.color_theme();
    if actual != target {
        return Err(Error::ThemeSwitchFailed {
            requested: target.to_string(),
            actual,
        });
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Theme Override Session
// ─────────────────────────────────────────────────────────────────────────────

/// A theme override that must be ended with [`ThemeOverrideSession::end`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeOverrideSession {
    previous_theme: String,
    target_theme: String,
}

impl ThemeOverrideSession {
    /// Switch the host to `target`, remembering the theme to restore.
    ///
    /// When the host already shows `target` nothing is switched and ending
    /// the session is a no-op. When the switch lands on an unexpected theme,
    /// the previous theme is put back before the error is returned.
    pub fn begin<H: EditorHost + ?Sized>(host: &mut H, target: &str) -> Result<Self> {
        let previous_theme = host.color_theme();
        let session = Self {
            previous_theme,
            target_theme: target.to_string(),
        };
        if session.is_noop() {
            debug!("Theme '{}' already active", target);
            return Ok(session);
        }

        info!(
            "Switching theme from '{}' to '{}'",
            session.previous_theme, target
        );
        if let Err(err) = switch_theme(host, target) {
            if host.color_theme() != session.previous_theme {
                if let Err(restore) = switch_theme(host, &session.previous_theme) {
                    warn!("Failed to restore theme after failed switch: {}", restore);
                }
            }
            return Err(err);
        }
        Ok(session)
    }

    /// Whether the override did not change anything.
    pub fn is_noop(&self) -> bool {
        self.previous_theme == self.target_theme
    }

    /// Restore the previous theme.
    pub fn end<H: EditorHost + ?Sized>(self, host: &mut H) -> Result<()> {
        if self.is_noop() {
            return Ok(());
        }
        info!("Restoring theme '{}'", self.previous_theme);
        switch_theme(host, &self.previous_theme)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scoped Override
// ─────────────────────────────────────────────────────────────────────────────

/// Run `body` with the host switched to `theme`, restoring the previous theme
/// afterwards whether `body` succeeds or fails.
///
/// With `theme = None` this is just `body(host)`: no theme is read or written.
/// A failure of `body` takes precedence over a failure to restore; the latter
/// is then only logged.
pub fn run_with_theme<H, T, F>(host: &mut H, theme: Option<&str>, body: F) -> Result<T>
where
    H: EditorHost + ?Sized,
    F: FnOnce(&mut H) -> Result<T>,
{
    let Some(target) = theme else {
        return body(host);
    };

    let session = ThemeOverrideSession::begin(host, target)?;
    let result = body(host);
    let restored = session.end(host);

    match (result, restored) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(restore)) => Err(restore),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(restore)) => {
            warn!("Failed to restore theme after failed capture: {}", restore);
            Err(err)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::FakeHost;

    #[test]
    fn test_no_theme_runs_body_without_theme_access() {
        let mut host = FakeHost::new(&["/ws"]);
        let value = run_with_theme(&mut host, None, |_| Ok(7)).unwrap();

        assert_eq!(value, 7);
        assert_eq!(host.theme_reads.get(), 0);
        assert!(host.theme_requests.is_empty());
    }

    #[test]
    fn test_no_theme_propagates_body_error() {
        let mut host = FakeHost::new(&["/ws"]);
        let result: Result<()> = run_with_theme(&mut host, None, |_| Err(Error::PasteMismatch));

        assert!(matches!(result, Err(Error::PasteMismatch)));
        assert_eq!(host.theme_reads.get(), 0);
    }

    #[test]
    fn test_theme_active_during_body_and_restored_after_success() {
        let mut host = FakeHost::new(&["/ws"]);
        let before = host.theme().to_string();

        let seen = run_with_theme(&mut host, Some("Light+"), |host| Ok(host.theme().to_string()))
            .unwrap();

        assert_eq!(seen, "Light+");
        assert_eq!(host.theme(), before);
        assert_eq!(host.theme_requests, vec!["Light+".to_string(), before]);
    }

    #[test]
    fn test_theme_restored_after_failing_body() {
        let mut host = FakeHost::new(&["/ws"]);
        let before = host.theme().to_string();

        let result: Result<()> =
            run_with_theme(&mut host, Some("Light+"), |_| Err(Error::ClipboardTimeout {
                attempts: 11,
            }));

        assert!(matches!(result, Err(Error::ClipboardTimeout { attempts: 11 })));
        assert_eq!(host.theme(), before);
    }

    #[test]
    fn test_same_theme_is_noop() {
        let mut host = FakeHost::new(&["/ws"]);
        host.set_theme_directly("Light+");

        let value = run_with_theme(&mut host, Some("Light+"), |_| Ok("ok")).unwrap();

        assert_eq!(value, "ok");
        assert!(host.theme_requests.is_empty());
        assert_eq!(host.theme(), "Light+");
    }

    #[test]
    fn test_switch_failure_reports_theme_switch_failed() {
        let mut host = FakeHost::new(&["/ws"]);
        host.theme_locked = true;
        let mut body_ran = false;

        let result = run_with_theme(&mut host, Some("Missing Theme"), |_| {
            body_ran = true;
            Ok(())
        });

        assert!(!body_ran);
        match result {
            Err(Error::ThemeSwitchFailed { requested, actual }) => {
                assert_eq!(requested, "Missing Theme");
                assert_eq!(actual, "Default Dark");
            }
            other => panic!("Expected ThemeSwitchFailed, got {:?}", other),
        }
        assert_eq!(host.theme(), "Default Dark");
    }

    #[test]
    fn test_body_error_takes_precedence_over_restore_error() {
        let mut host = FakeHost::new(&["/ws"]);

        let result: Result<()> = run_with_theme(&mut host, Some("Light+"), |host| {
            // Restoring will now fail: the host refuses further switches
            host.theme_locked = true;
            Err(Error::PasteMismatch)
        });

        assert!(matches!(result, Err(Error::PasteMismatch)));
    }

    #[test]
    fn test_restore_error_reported_after_successful_body() {
        let mut host = FakeHost::new(&["/ws"]);

        let result = run_with_theme(&mut host, Some("Light+"), |host| {
            host.theme_locked = true;
            Ok(())
        });

        assert!(matches!(result, Err(Error::ThemeSwitchFailed { .. })));
    }

    #[test]
    fn test_session_remembers_previous_theme() {
        let mut host = FakeHost::new(&["/ws"]);
        let session = ThemeOverrideSession::begin(&mut host, "Light+").unwrap();

        assert_eq!(session.previous_theme, "Default Dark");
        assert_eq!(session.target_theme, "Light+");
        assert!(!session.is_noop());

        session.end(&mut host).unwrap();
        assert_eq!(host.theme(), "Default Dark");
    }
}

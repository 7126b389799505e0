//! Highlighted HTML capture.
//!
//! Hosts offer no query that returns the highlighted HTML of a selection, so
//! the capture goes the long way round:
//!
//! 1. Ask the host to copy the selection with syntax highlighting.
//! 2. Poll the clipboard until its text equals the selection (bounded).
//! 3. Open an HTML scratch document and paste the clipboard into it as HTML.
//! 4. Take the first document-change event as the paste, read the scratch
//!    document, and close it again.
//!
//! The scratch document is closed on every exit path. Callers must not run two
//! captures against the same host at once; taking the host by `&mut` enforces
//! that within a process.

use log::{debug, warn};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::host::{DocumentChange, DocumentId, EditorHost, HostCommand};
use crate::theme::run_with_theme;

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Delay before each clipboard read.
pub const CLIPBOARD_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Clipboard reads after the first one.
pub const CLIPBOARD_POLL_RETRIES: u32 = 10;

/// Content type of the scratch document receiving the paste.
pub const SCRATCH_CONTENT_TYPE: &str = "html";

// ─────────────────────────────────────────────────────────────────────────────
// Poll Policy
// ─────────────────────────────────────────────────────────────────────────────

/// Timing of the capture handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay before each clipboard read
    pub interval: Duration,
    /// Clipboard reads after the first one
    pub retries: u32,
    /// Upper bound on waiting for the paste; `None` waits indefinitely
    pub paste_timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: CLIPBOARD_POLL_INTERVAL,
            retries: CLIPBOARD_POLL_RETRIES,
            paste_timeout: None,
        }
    }
}

impl PollPolicy {
    /// Total number of clipboard reads before giving up.
    pub fn max_attempts(&self) -> u32 {
        self.retries + 1
    }
}

/// Call `check` after each `interval` until it returns `true`, at most
/// `retries + 1` times. Returns whether `check` succeeded.
pub fn poll_until<F>(interval: Duration, retries: u32, mut check: F) -> Result<bool>
where
    F: FnMut() -> Result<bool>,
{
    for attempt in 0..=retries {
        thread::sleep(interval);
        if check()? {
            debug!("Poll succeeded after {} attempt(s)", attempt + 1);
            return Ok(true);
        }
    }
    Ok(false)
}

// ─────────────────────────────────────────────────────────────────────────────
// Capture Request
// ─────────────────────────────────────────────────────────────────────────────

/// One capture: the text expected on the clipboard and the theme to capture
/// it under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub selection_text: String,
    pub wants_theme: Option<String>,
}

impl CaptureRequest {
    pub fn new(selection_text: impl Into<String>, wants_theme: Option<String>) -> Self {
        Self {
            selection_text: selection_text.into(),
            wants_theme,
        }
    }

    /// Capture under the requested theme, restoring the user's theme after.
    pub fn run<H: EditorHost + ?Sized>(&self, host: &mut H, policy: &PollPolicy) -> Result<String> {
        run_with_theme(host, self.wants_theme.as_deref(), |host| {
            capture(host, &self.selection_text, policy)
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handshake Steps
// ─────────────────────────────────────────────────────────────────────────────

/// Block until the first document change and check it hit `scratch`.
pub fn wait_for_paste(
    changes: &Receiver<DocumentChange>,
    scratch: DocumentId,
    timeout: Option<Duration>,
) -> Result<()> {
    let change = match timeout {
        None => changes.recv().map_err(|_| {
            Error::PasteAborted("host stopped delivering document changes".to_string())
        })?,
        Some(limit) => changes.recv_timeout(limit).map_err(|e| match e {
            RecvTimeoutError::Timeout => Error::paste_timed_out(limit),
            RecvTimeoutError::Disconnected => {
                Error::PasteAborted("host stopped delivering document changes".to_string())
            }
        })?,
    };

    if change.document != scratch {
        debug!(
            "First change hit document {}, expected scratch {}",
            change.document, scratch
        );
        return Err(Error::PasteMismatch);
    }
    Ok(())
}

/// Open an HTML scratch document, run `body` on it, then revert and close it.
///
/// The scratch document is closed whether `body` succeeds or fails. A failure
/// to close is logged and never replaces the outcome of `body`.
pub fn with_scratch_document<H, T, F>(host: &mut H, body: F) -> Result<T>
where
    H: EditorHost + ?Sized,
    F: FnOnce(&mut H, DocumentId) -> Result<T>,
{
    let scratch = host.open_scratch_document(SCRATCH_CONTENT_TYPE)?;
    debug!("Opened scratch document {}", scratch);

    let result = host
        .show_document(scratch)
        .and_then(|()| body(host, scratch));

    if let Err(e) = close_scratch(host, scratch) {
        warn!("Failed to close scratch document {}: {}", scratch, e);
    }
    result
}

fn close_scratch<H: EditorHost + ?Sized>(host: &mut H, scratch: DocumentId) -> Result<()> {
    // Closing acts on the active editor, so make sure that is the scratch one
    if host.active_document() != Some(scratch) {
        host.show_document(scratch)?;
        if host.active_document() != Some(scratch) {
            return Err(Error::WrongActiveDocument);
        }
    }
    host.revert_and_close_active()
}

// ─────────────────────────────────────────────────────────────────────────────
// Capture
// ─────────────────────────────────────────────────────────────────────────────

/// Capture the highlighted HTML of the active selection.
///
/// `selection_text` is the plain text currently selected; it is how the
/// clipboard poll recognises that the highlight copy has landed.
pub fn capture<H: EditorHost + ?Sized>(
    host: &mut H,
    selection_text: &str,
    policy: &PollPolicy,
) -> Result<String> {
    if selection_text.is_empty() {
        return Err(Error::EmptySelection);
    }

    debug!("Copying {} bytes with syntax highlighting", selection_text.len());
    host.execute_command(HostCommand::CopyWithSyntaxHighlighting)?;

    let copied = poll_until(policy.interval, policy.retries, || {
        Ok(host.read_clipboard()? == selection_text)
    })?;
    if !copied {
        return Err(Error::ClipboardTimeout {
            attempts: policy.max_attempts(),
        });
    }

    with_scratch_document(host, |host, scratch| {
        let changes = host.subscribe_document_changes();
        host.execute_command(HostCommand::paste_as_html())?;
        wait_for_paste(&changes, scratch, policy.paste_timeout)?;
        drop(changes);

        let html = host.document_text(scratch)?;
        debug!("Captured {} bytes of HTML", html.len());
        Ok(html)
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::FakeHost;
    use crate::host::Selection;
    use std::sync::mpsc::channel;
    use std::time::Instant;

    const SOURCE: &str = "print('hi')\n";

    fn fast_policy() -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(1),
            ..PollPolicy::default()
        }
    }

    fn host_with_selection() -> (FakeHost, DocumentId) {
        let mut host = FakeHost::new(&["/ws"]);
        let doc = host.open("/ws/src/app.py", SOURCE);
        host.show_document(doc).unwrap();
        host.set_selection(Selection::whole_document(2)).unwrap();
        (host, doc)
    }

    #[test]
    fn test_default_policy() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_millis(100));
        assert_eq!(policy.retries, 10);
        assert_eq!(policy.max_attempts(), 11);
        assert!(policy.paste_timeout.is_none());
    }

    #[test]
    fn test_empty_selection_issues_no_command() {
        let mut host = FakeHost::new(&["/ws"]);
        let result = capture(&mut host, "", &fast_policy());

        assert!(matches!(result, Err(Error::EmptySelection)));
        assert!(host.commands.is_empty());
        assert_eq!(host.clipboard_reads, 0);
        assert!(host.scratch_opened.is_empty());
    }

    #[test]
    fn test_capture_returns_pasted_html() {
        let (mut host, doc) = host_with_selection();

        let html = capture(&mut host, SOURCE, &fast_policy()).unwrap();

        assert_eq!(html, "<pre>code</pre>");
        assert_eq!(
            host.commands,
            vec![
                HostCommand::CopyWithSyntaxHighlighting,
                HostCommand::paste_as_html()
            ]
        );
        let scratch = host.scratch_opened[0];
        assert_eq!(host.closed, vec![scratch]);
        assert!(!host.is_open(scratch));
        assert_eq!(host.active_document(), Some(doc));
    }

    #[test]
    fn test_capture_keeps_source_selection() {
        let (mut host, _) = host_with_selection();

        capture(&mut host, SOURCE, &fast_policy()).unwrap();

        assert_eq!(host.selection(), Some(Selection::whole_document(2)));
    }

    #[test]
    fn test_stuck_clipboard_times_out_after_eleven_reads() {
        let (mut host, _) = host_with_selection();
        host.clipboard_stuck = true;
        let policy = PollPolicy {
            interval: Duration::from_millis(2),
            ..PollPolicy::default()
        };

        let started = Instant::now();
        let result = capture(&mut host, SOURCE, &policy);

        assert!(matches!(result, Err(Error::ClipboardTimeout { attempts: 11 })));
        assert_eq!(host.clipboard_reads, 11);
        assert!(started.elapsed() >= Duration::from_millis(22));
        assert!(host.scratch_opened.is_empty());
    }

    #[test]
    fn test_paste_into_other_document_is_mismatch() {
        let (mut host, doc) = host_with_selection();
        host.paste_hits_other_document = true;

        let result = capture(&mut host, SOURCE, &fast_policy());

        assert!(matches!(result, Err(Error::PasteMismatch)));
        let scratch = host.scratch_opened[0];
        assert_eq!(host.closed, vec![scratch]);
        assert_eq!(host.active_document(), Some(doc));
    }

    #[test]
    fn test_paste_timeout_closes_scratch() {
        let (mut host, _) = host_with_selection();
        host.paste_ignored = true;
        let policy = PollPolicy {
            paste_timeout: Some(Duration::from_millis(5)),
            ..fast_policy()
        };

        let result = capture(&mut host, SOURCE, &policy);

        assert!(matches!(result, Err(Error::PasteAborted(_))));
        assert_eq!(host.closed, host.scratch_opened);
    }

    #[test]
    fn test_wait_for_paste_disconnected() {
        let (tx, rx) = channel::<DocumentChange>();
        drop(tx);
        let result = wait_for_paste(&rx, DocumentId(1), None);
        assert!(matches!(result, Err(Error::PasteAborted(_))));
    }

    #[test]
    fn test_wait_for_paste_takes_first_event() {
        let (tx, rx) = channel();
        tx.send(DocumentChange {
            document: DocumentId(2),
        })
        .unwrap();
        tx.send(DocumentChange {
            document: DocumentId(1),
        })
        .unwrap();
        let result = wait_for_paste(&rx, DocumentId(1), None);
        assert!(matches!(result, Err(Error::PasteMismatch)));
    }

    #[test]
    fn test_poll_until_counts_attempts() {
        let mut calls = 0;
        let found = poll_until(Duration::ZERO, 10, || {
            calls += 1;
            Ok(calls == 3)
        })
        .unwrap();
        assert!(found);
        assert_eq!(calls, 3);

        let mut calls = 0;
        let found = poll_until(Duration::ZERO, 4, || {
            calls += 1;
            Ok(false)
        })
        .unwrap();
        assert!(!found);
        assert_eq!(calls, 5);
    }

    #[test]
    fn test_poll_until_propagates_errors() {
        let result = poll_until(Duration::ZERO, 10, || Err(Error::Host("gone".to_string())));
        assert!(matches!(result, Err(Error::Host(_))));
    }

    #[test]
    fn test_capture_request_restores_theme() {
        let (mut host, _) = host_with_selection();
        let request = CaptureRequest::new(SOURCE, Some("Light+".to_string()));

        let html = request.run(&mut host, &fast_policy()).unwrap();

        assert_eq!(html, "<pre>code</pre>");
        assert_eq!(host.theme(), "Default Dark");
        assert_eq!(host.theme_requests, vec!["Light+", "Default Dark"]);
    }
}

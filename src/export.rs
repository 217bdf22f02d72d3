//! Receipt export: capture the `#receipt` region of a rendered page and
//! save it as `booking-receipt-<code>.png`.

use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};

use crate::model::receipt_file_name;
use crate::notify::{Notification, NotificationCenter};
use crate::rendering::markup::RECEIPT_SELECTOR;
use crate::rendering::{self, CaptureOptions};
use crate::{Error, ReceiptConfig, Result};

pub const SUCCESS_MESSAGE: &str = "Your receipt has been downloaded successfully.";
pub const ERROR_MESSAGE: &str = "There was a problem downloading your receipt. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    /// The image was written to this path
    Saved(PathBuf),
    /// Nothing was rendered to capture; no file written
    Skipped,
    /// Another export was still running
    Ignored,
    Failed(String),
}

pub struct ReceiptExporter {
    options: CaptureOptions,
    output_dir: PathBuf,
    in_progress: Arc<AtomicBool>,
    notifications: NotificationCenter,
}

/// Holds the in-progress flag; releasing it is unconditional on drop
struct InProgressGuard(Arc<AtomicBool>);

impl InProgressGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| InProgressGuard(flag.clone()))
    }
}

impl Drop for InProgressGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ReceiptExporter {
    pub fn new(config: &ReceiptConfig) -> Self {
        Self {
            options: config.capture_options(),
            output_dir: config.output_dir.clone(),
            in_progress: Arc::new(AtomicBool::new(false)),
            notifications: NotificationCenter::new(Duration::from_millis(config.notification_ms)),
        }
    }

    /// True while an export is running; the download control is disabled
    pub fn is_exporting(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Capture the receipt region of `page_html` and save it.
    ///
    /// Only one export runs at a time; a call made while another is in
    /// flight returns [`ExportOutcome::Ignored`]. Failures are reported
    /// through the outcome and an error notification, never as a panic.
    pub async fn export(&self, page_html: &str, confirmation_code: &str) -> ExportOutcome {
        let _guard = match InProgressGuard::acquire(&self.in_progress) {
            Some(guard) => guard,
            None => {
                debug!("export for {} ignored; another export is running", confirmation_code);
                return ExportOutcome::Ignored;
            }
        };

        let html = page_html.to_string();
        let options = self.options;
        let dir = self.output_dir.clone();
        let code = confirmation_code.to_string();

        let job = tokio::task::spawn_blocking(move || save_capture(&html, &options, &dir, &code));
        let result = match job.await {
            Ok(result) => result,
            Err(e) => Err(Error::ExportError(format!("export task failed: {}", e))),
        };

        match result {
            Ok(None) => {
                debug!("no rendered receipt to export for {}", confirmation_code);
                ExportOutcome::Skipped
            }
            Ok(Some(path)) => {
                info!("receipt saved to {}", path.display());
                self.notifications.show(Notification::success(SUCCESS_MESSAGE));
                ExportOutcome::Saved(path)
            }
            Err(e) => {
                error!("Failed to download receipt: {}", e);
                self.notifications.show(Notification::error(ERROR_MESSAGE));
                ExportOutcome::Failed(e.to_string())
            }
        }
    }
}

/// `<output_dir>/booking-receipt-<code>.png`, provided the file name is a
/// single path component
fn export_path(output_dir: &Path, confirmation_code: &str) -> Result<PathBuf> {
    let name = receipt_file_name(confirmation_code);
    let mut components = Path::new(&name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if confirmation_code.trim().is_empty()
        || confirmation_code.contains(|c: char| matches!(c, '/' | '\\' | '\0'))
        || !single
    {
        return Err(Error::ExportError(format!(
            "confirmation code {:?} cannot be used in a file name",
            confirmation_code
        )));
    }
    Ok(output_dir.join(name))
}

fn save_capture(
    html: &str,
    options: &CaptureOptions,
    output_dir: &Path,
    confirmation_code: &str,
) -> Result<Option<PathBuf>> {
    let shot = match rendering::capture_region(html, RECEIPT_SELECTOR, options)? {
        Some(shot) => shot,
        None => return Ok(None),
    };
    let path = export_path(output_dir, confirmation_code)?;
    debug!("captured {}x{} receipt, sha256 {}", shot.width, shot.height, shot.digest());
    std::fs::write(&path, &shot.png_data)
        .map_err(|e| Error::ExportError(format!("Failed to write {}: {}", path.display(), e)))?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationKind;

    const PAGE: &str = r#"<html><body><div id="receipt">
        <div class="banner"><h2>Booking Confirmation</h2></div>
        <p class="amount">$459.00</p>
        </div></body></html>"#;

    fn exporter(dir: &std::path::Path) -> ReceiptExporter {
        ReceiptExporter::new(&ReceiptConfig { output_dir: dir.to_path_buf(), ..Default::default() })
    }

    #[tokio::test]
    async fn export_writes_named_png_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let exp = exporter(dir.path());
        let outcome = exp.export(PAGE, "RB-2024-001234").await;
        let expected = dir.path().join("booking-receipt-RB-2024-001234.png");
        assert_eq!(outcome, ExportOutcome::Saved(expected.clone()));
        assert!(std::fs::read(&expected).unwrap().starts_with(b"\x89PNG"));
        assert_eq!(exp.notifications().current().map(|n| n.kind), Some(NotificationKind::Success));
        assert!(!exp.is_exporting());
    }

    #[tokio::test]
    async fn export_without_receipt_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let exp = exporter(dir.path());
        let outcome = exp.export("<html><body><p>Loading</p></body></html>", "X").await;
        assert_eq!(outcome, ExportOutcome::Skipped);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(exp.notifications().current().is_none());
    }

    #[tokio::test]
    async fn write_failure_reports_error_and_releases_guard() {
        let dir = tempfile::tempdir().unwrap();
        let exp = exporter(&dir.path().join("missing-dir"));
        let outcome = exp.export(PAGE, "X").await;
        assert!(matches!(outcome, ExportOutcome::Failed(ref m) if m.contains("Failed to write")));
        let n = exp.notifications().current().unwrap();
        assert_eq!(n.kind, NotificationKind::Error);
        assert_eq!(n.message, ERROR_MESSAGE);
        assert!(!exp.is_exporting());
    }

    #[tokio::test]
    async fn code_that_escapes_output_dir_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        let exp = exporter(&out);

        for code in ["../../etc/x", "a/b", "a\\b", "", "  "] {
            let outcome = exp.export(PAGE, code).await;
            assert!(
                matches!(outcome, ExportOutcome::Failed(ref m) if m.contains("file name")),
                "code {:?} gave {:?}",
                code,
                outcome
            );
            assert!(!exp.is_exporting());
        }
        assert_eq!(exp.notifications().current().map(|n| n.kind), Some(NotificationKind::Error));
        // Nothing written in the output dir or above it
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn unusable_code_without_receipt_is_still_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let exp = exporter(dir.path());
        let outcome = exp.export("<html><body><p>Loading</p></body></html>", "").await;
        assert_eq!(outcome, ExportOutcome::Skipped);
        assert!(exp.notifications().current().is_none());
    }

    #[test]
    fn export_path_accepts_plain_codes() {
        let dir = std::path::Path::new("/tmp/receipts");
        assert_eq!(
            export_path(dir, "RB-2024-001234").unwrap(),
            dir.join("booking-receipt-RB-2024-001234.png")
        );
        assert_eq!(
            export_path(dir, "rb 2024.x").unwrap(),
            dir.join("booking-receipt-rb 2024.x.png")
        );
    }

    #[test]
    fn guard_is_exclusive_and_released_on_drop() {
        let flag = Arc::new(AtomicBool::new(false));
        let guard = InProgressGuard::acquire(&flag).unwrap();
        assert!(InProgressGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(InProgressGuard::acquire(&flag).is_some());
    }
}

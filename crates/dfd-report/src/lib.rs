//! Report rendering for deepfake detection results.
//!
//! This crate provides:
//! - Plain text lines for on-screen display
//! - A paginated layout of fixed-size text cells
//! - PDF output of that layout

pub mod error;
pub mod layout;
pub mod pdf;
pub mod text;

use std::path::{Path, PathBuf};

use dfd_models::ResultRecord;
use tracing::info;

pub use error::{ReportError, ReportResult};
pub use layout::{Align, Cell, Page, ReportLayout};
pub use pdf::render_pdf;
pub use text::{entry_lines, render_text};

/// File name of the exported report inside the result directory.
pub const REPORT_FILE_NAME: &str = "report.pdf";

/// Render `result` as a PDF and write it to `dir/report.pdf`.
///
/// Returns the written path together with the document bytes.
pub async fn write_report(
    dir: &Path,
    model_path: &str,
    result: &ResultRecord,
) -> ReportResult<(PathBuf, Vec<u8>)> {
    let layout = ReportLayout::build(model_path, result)?;
    let bytes = render_pdf(&layout)?;

    let path = dir.join(REPORT_FILE_NAME);
    tokio::fs::write(&path, &bytes).await?;

    info!(
        path = %path.display(),
        videos = result.len(),
        pages = layout.pages.len(),
        "PDF report generated"
    );

    Ok((path, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dfd_models::VideoEntry;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_report() {
        let dir = TempDir::new().unwrap();
        let mut result = ResultRecord::new();
        result.store(VideoEntry {
            name: "a.mp4".to_string(),
            pred: 0.8,
            klass: "uncategorized".to_string(),
            pred_label: "REAL".to_string(),
            correct_label: "0".to_string(),
        });

        let (path, bytes) = write_report(dir.path(), "model.pth", &result).await.unwrap();

        assert_eq!(path, dir.path().join("report.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_write_report_rejects_malformed_result() {
        let dir = TempDir::new().unwrap();
        let mut result = ResultRecord::new();
        result.video.name.push("orphan.mp4".to_string());

        let err = write_report(dir.path(), "model.pth", &result).await.unwrap_err();
        assert!(matches!(err, ReportError::MalformedResult(_)));
        assert!(!dir.path().join("report.pdf").exists());
    }
}

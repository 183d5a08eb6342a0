//! Uploaded file persistence.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

use crate::error::{MediaError, MediaResult};

/// Reduce a client-supplied file name to its final path component.
///
/// Browsers may send a full path (`C:\fakepath\clip.mp4`); both separator
/// styles are stripped so the file always lands inside the upload directory.
pub fn safe_file_name(file_name: &str) -> MediaResult<String> {
    let name = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        return Err(MediaError::InvalidFileName(file_name.to_string()));
    }

    Ok(name.to_string())
}

/// Write uploaded bytes verbatim to `dir/<file_name>`.
///
/// An existing file with the same name is overwritten.
pub async fn save_upload(dir: &Path, file_name: &str, bytes: &[u8]) -> MediaResult<PathBuf> {
    let name = safe_file_name(file_name)?;
    let path = dir.join(name);

    fs::write(&path, bytes).await?;

    info!(
        path = %path.display(),
        size_bytes = bytes.len(),
        "Saved uploaded video"
    );

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_safe_file_name() {
        assert_eq!(safe_file_name("clip.mp4").unwrap(), "clip.mp4");
        assert_eq!(safe_file_name("../../etc/clip.mp4").unwrap(), "clip.mp4");
        assert_eq!(safe_file_name("C:\\fakepath\\clip.mov").unwrap(), "clip.mov");
        assert!(safe_file_name("").is_err());
        assert!(safe_file_name("uploads/").is_err());
        assert!(safe_file_name("..").is_err());
    }

    #[tokio::test]
    async fn test_save_upload_writes_exact_bytes() {
        let dir = TempDir::new().unwrap();
        let bytes = [0u8, 1, 2, 254, 255, b'v', b'i', b'd'];

        let path = save_upload(dir.path(), "interview.mp4", &bytes).await.unwrap();

        assert_eq!(path, dir.path().join("interview.mp4"));
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
    }

    #[tokio::test]
    async fn test_save_upload_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        save_upload(dir.path(), "clip.mp4", b"first upload").await.unwrap();
        let path = save_upload(dir.path(), "clip.mp4", b"second").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_save_upload_into_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");

        let err = save_upload(&missing, "clip.mp4", b"data").await.unwrap_err();
        assert!(matches!(err, MediaError::Io(_)));
    }
}

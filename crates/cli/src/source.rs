use std::path::{Path, PathBuf};

use async_trait::async_trait;
use kinocr_core::gateway::{ContentReadError, ContentSource};
use kinocr_core::UploadFile;

/// An upload read from the local filesystem. No media type is known, so CSV
/// detection falls back to the file extension. Bytes that are not valid UTF-8
/// decode to U+FFFD, so only the fields they sit in are lost.
#[derive(Clone, Debug)]
pub struct FsContentSource {
    path: PathBuf,
    descriptor: UploadFile,
}

impl FsContentSource {
    /// A missing or unreadable file is not an error here; it surfaces from
    /// [`ContentSource::read_text`] like any other read failure.
    pub async fn inspect(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let size_bytes = tokio::fs::metadata(&path).await.map(|meta| meta.len()).unwrap_or(0);
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self { descriptor: UploadFile::new(name, None, size_bytes), path }
    }
}

#[async_trait]
impl ContentSource for FsContentSource {
    fn descriptor(&self) -> &UploadFile {
        &self.descriptor
    }

    async fn read_text(&self) -> Result<String, ContentReadError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|error| ContentReadError::Io(error.to_string()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

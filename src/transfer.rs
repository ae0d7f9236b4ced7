//! Local transfer plumbing
//!
//! Downloads land in freshly allocated temp files that the caller owns and
//! cleans up; the adapter only removes a temp path after its own failed
//! write. `send_file` streams through a [`ResponseSink`] the host provides
//! over its response channel.

use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::RepositoryError;
use crate::reference::FileReference;

/// Result of [`get_file`](crate::repository::WorkspaceRepository::get_file):
/// where the bytes landed locally and where they came from.
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub path: PathBuf,
    /// Source URL (the referenced remote path)
    pub url: String,
}

/// Result of resolving a stored reference against live remote metadata.
#[derive(Debug, Clone)]
pub enum ReferencedFile {
    /// Picture content is materialized locally
    Local { filepath: PathBuf },
    /// Other types only report their remote size, no transfer
    Size { filesize: u64 },
}

/// Host-supplied response channel for [`send_file`]
/// (crate::repository::WorkspaceRepository::send_file).
pub trait ResponseSink {
    fn header(&mut self, name: &str, value: &str);
    fn body(&mut self, bytes: &[u8]) -> std::io::Result<()>;
    /// Terminate the response; nothing may be written afterwards.
    fn finish(&mut self);
}

/// Write downloaded bytes to a unique temp path and return it.
///
/// `filename` only influences the generated name's suffix. On a failed write
/// the partially created path is removed before the error propagates.
pub(crate) async fn write_temp(filename: &str, bytes: &[u8]) -> Result<PathBuf, RepositoryError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("nuxeo-ws-");
    let safe = filename.rsplit(['/', '\\']).next().unwrap_or("");
    let suffix = if safe.is_empty() {
        String::new()
    } else {
        format!("-{}", safe)
    };
    if !suffix.is_empty() {
        builder.suffix(&suffix);
    }

    let path = builder
        .tempfile()?
        .into_temp_path()
        .keep()
        .map_err(|e| RepositoryError::TempWrite(e.error))?;

    if let Err(e) = write_all(&path, bytes).await {
        warn!(path = %path.display(), "temp write failed, removing partial file");
        let _ = tokio::fs::remove_file(&path).await;
        return Err(RepositoryError::TempWrite(e));
    }

    debug!(path = %path.display(), size = bytes.len(), "stored download in temp file");
    Ok(path)
}

async fn write_all(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await
}

/// Emit attachment-disposition headers and the file bytes, then end the
/// response.
pub(crate) fn stream_attachment(
    sink: &mut dyn ResponseSink,
    reference: &FileReference,
    bytes: &[u8],
) -> Result<(), RepositoryError> {
    sink.header("Content-Description", "File Transfer");
    sink.header("Content-Type", "application/octet-stream");
    sink.header(
        "Content-Disposition",
        &format!("attachment; filename={}", reference.download_basename()),
    );
    sink.header("Expires", "0");
    sink.header("Cache-Control", "must-revalidate");
    sink.header("Pragma", "public");
    sink.body(bytes)?;
    sink.finish();
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) struct RecordingSink {
        pub headers: Vec<(String, String)>,
        pub body: Vec<u8>,
        pub finished: bool,
    }

    impl RecordingSink {
        pub(crate) fn new() -> Self {
            Self {
                headers: Vec::new(),
                body: Vec::new(),
                finished: false,
            }
        }
    }

    impl ResponseSink for RecordingSink {
        fn header(&mut self, name: &str, value: &str) {
            self.headers.push((name.to_string(), value.to_string()));
        }

        fn body(&mut self, bytes: &[u8]) -> std::io::Result<()> {
            self.body.extend_from_slice(bytes);
            Ok(())
        }

        fn finish(&mut self) {
            self.finished = true;
        }
    }

    #[tokio::test]
    async fn test_write_temp_round_trip() {
        let path = write_temp("report.pdf", b"hello").await.unwrap();
        let content = tokio::fs::read(&path).await.unwrap();
        assert_eq!(content, b"hello");
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with("-report.pdf"));
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_write_temp_without_filename() {
        let path = write_temp("", b"x").await.unwrap();
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("nuxeo-ws-"));
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[test]
    fn test_stream_attachment_headers_and_body() {
        let reference = FileReference {
            filepath: "/ws/a.pdf".to_string(),
            user: "jdoe".to_string(),
            secret_key: "k".to_string(),
            url_nuxeo: "https://x/nuxeo/site/automation".to_string(),
            downloadurl: "https://x/nuxeo/nxfile/default/42/blobholder:0/a.pdf".to_string(),
        };
        let mut sink = RecordingSink::new();
        stream_attachment(&mut sink, &reference, b"bytes").unwrap();

        assert_eq!(sink.headers[0].0, "Content-Description");
        assert_eq!(sink.headers[1].1, "application/octet-stream");
        assert_eq!(sink.headers[2].1, "attachment; filename=a.pdf");
        assert_eq!(sink.body, b"bytes");
        assert!(sink.finished);
    }
}

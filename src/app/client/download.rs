//! Stock archive downloads
//!
//! Archives are streamed chunk by chunk into `<destination>.part` and renamed
//! into place once complete. Any failure after the partial file was created
//! removes it again, so a destination either holds a complete archive or
//! nothing new.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::app::client::http::HttpHandler;
use crate::auth::Credentials;
use crate::constants::{files, http};
use crate::errors::{ApiError, ApiResult};

/// File download operations handler
pub struct DownloadHandler<'a> {
    http_handler: &'a HttpHandler,
}

impl<'a> DownloadHandler<'a> {
    /// Creates a new DownloadHandler with the given HTTP handler
    pub fn new(http_handler: &'a HttpHandler) -> Self {
        Self { http_handler }
    }

    /// Streams `url` into `destination`, reporting progress as it goes
    ///
    /// `progress` receives the bytes written so far and the total announced
    /// by the node, if any. Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if:
    /// - The destination exists and `overwrite` is false
    /// - The request fails or the node answers with an error status
    /// - The stream breaks or ends short of the announced length
    /// - Local file I/O fails
    pub async fn download_file(
        &self,
        url: &Url,
        credentials: Option<&Credentials>,
        destination: &Path,
        overwrite: bool,
        progress: &mut dyn FnMut(u64, Option<u64>),
    ) -> ApiResult<u64> {
        if destination.exists() && !overwrite {
            return Err(ApiError::FileExists {
                path: destination.to_path_buf(),
            });
        }

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // No file is touched until the node has accepted the request
        let response = self
            .http_handler
            .send(url, http::ACCEPT_ZIP, credentials, None)
            .await?;
        let total = response.content_length();

        let partial = partial_path(destination);
        let result = match Self::stream_to_file(response, url, &partial, total, progress).await {
            Ok(written) => match tokio::fs::rename(&partial, destination).await {
                Ok(()) => Ok(written),
                Err(e) => Err(ApiError::Io(e)),
            },
            Err(e) => Err(e),
        };

        match result {
            Ok(written) => {
                tracing::info!(
                    "Downloaded {} bytes to {}",
                    written,
                    destination.display()
                );
                Ok(written)
            }
            Err(e) => {
                remove_partial(&partial).await;
                tracing::error!("Download of {} failed: {}", url, e);
                Err(e)
            }
        }
    }

    async fn stream_to_file(
        response: reqwest::Response,
        url: &Url,
        path: &Path,
        total: Option<u64>,
        progress: &mut dyn FnMut(u64, Option<u64>),
    ) -> ApiResult<u64> {
        let mut file = File::create(path).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        progress(written, total);
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ApiError::from_transport(e, url.as_str()))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            progress(written, total);
        }
        file.flush().await?;

        if let Some(expected) = total {
            if written < expected {
                return Err(ApiError::Connection {
                    url: url.to_string(),
                    reason: format!(
                        "stream ended after {} of {} bytes",
                        written, expected
                    ),
                });
            }
        }

        Ok(written)
    }
}

/// Path used while a download is in flight
pub fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(files::PARTIAL_SUFFIX);
    destination.with_file_name(name)
}

async fn remove_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Could not remove partial file {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    use crate::app::client::config::ClientConfig;

    fn create_test_handler() -> HttpHandler {
        let config = ClientConfig::default();
        HttpHandler::new(config.build_http_client().unwrap(), Duration::from_secs(2))
    }

    #[test]
    fn test_partial_path() {
        let path = partial_path(Path::new("/tmp/stock-1.zip"));
        assert_eq!(path, PathBuf::from("/tmp/stock-1.zip.part"));
    }

    #[tokio::test]
    async fn test_download_refuses_existing_file() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("existing.zip");
        tokio::fs::write(&file_path, b"old").await.unwrap();

        let http_handler = create_test_handler();
        let handler = DownloadHandler::new(&http_handler);
        let url = Url::parse("http://127.0.0.1:9/resource/datastocks/x/export").unwrap();

        let result = handler
            .download_file(&url, None, &file_path, false, &mut |_, _| {})
            .await;

        assert!(matches!(result, Err(ApiError::FileExists { .. })));
        assert_eq!(tokio::fs::read(&file_path).await.unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_unreachable_node_creates_no_file() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("stock.zip");

        let http_handler = create_test_handler();
        let handler = DownloadHandler::new(&http_handler);
        let url = Url::parse("http://127.0.0.1:9/resource/datastocks/x/export").unwrap();

        let result = handler
            .download_file(&url, None, &file_path, true, &mut |_, _| {})
            .await;

        assert!(matches!(result, Err(ApiError::Connection { .. })));
        assert!(!file_path.exists());
        assert!(!partial_path(&file_path).exists());
    }
}

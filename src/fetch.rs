//! Raw byte sources for sprite images.
//!
//! Both the image cache and the document exporter go through an
//! [`ImageFetcher`]; the engine owns one shared instance.

use std::path::PathBuf;

use data_url::DataUrl;
use futures::future::LocalBoxFuture;
use futures::FutureExt;

use crate::error::FetchError;

/// Resolves a source identifier to its raw (still encoded) bytes.
pub trait ImageFetcher {
    fn fetch(&self, source_id: &str) -> LocalBoxFuture<'static, Result<Vec<u8>, FetchError>>;
}

/// Reads `data:` URIs, `file://` URLs and plain filesystem paths.
///
/// File reads are blocking: the returned future performs the whole
/// `std::fs::read` on its first poll, stalling the cooperative thread for
/// the duration. Inject a custom [`ImageFetcher`] for large or slow sources.
#[derive(Debug, Default, Clone)]
pub struct FsFetcher {
    /// Directory that relative paths are resolved against.
    base_dir: Option<PathBuf>,
}

impl FsFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve_path(&self, source_id: &str) -> PathBuf {
        let path = PathBuf::from(source_id.strip_prefix("file://").unwrap_or(source_id));
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }
}

fn decode_data_url(source_id: &str) -> Result<Vec<u8>, FetchError> {
    let url = DataUrl::process(source_id).map_err(|e| FetchError::DataUrl(format!("{e:?}")))?;
    let (body, _fragment) = url
        .decode_to_vec()
        .map_err(|e| FetchError::DataUrl(format!("{e:?}")))?;
    Ok(body)
}

impl ImageFetcher for FsFetcher {
    fn fetch(&self, source_id: &str) -> LocalBoxFuture<'static, Result<Vec<u8>, FetchError>> {
        if source_id.starts_with("data:") {
            return futures::future::ready(decode_data_url(source_id)).boxed_local();
        }
        if source_id.starts_with("http://") || source_id.starts_with("https://") {
            return futures::future::ready(Err(FetchError::Unsupported(source_id.to_string())))
                .boxed_local();
        }

        let path = self.resolve_path(source_id);
        async move { Ok(std::fs::read(path)?) }.boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url() {
        let fetcher = FsFetcher::new();
        let bytes = pollster::block_on(fetcher.fetch("data:text/plain;base64,aGVsbG8=")).unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let fetcher = FsFetcher::with_base_dir("/nonexistent-scenepaint-dir");
        let err = pollster::block_on(fetcher.fetch("missing.png")).unwrap_err();
        assert!(matches!(err, FetchError::Io(_)));
    }

    #[test]
    fn test_remote_sources_are_unsupported() {
        let fetcher = FsFetcher::new();
        let err = pollster::block_on(fetcher.fetch("https://example.com/a.png")).unwrap_err();
        assert!(matches!(err, FetchError::Unsupported(_)));
    }

    #[test]
    fn test_file_url_and_base_dir() {
        let fetcher = FsFetcher::with_base_dir("/assets");
        assert_eq!(fetcher.resolve_path("a.png"), PathBuf::from("/assets/a.png"));
        assert_eq!(fetcher.resolve_path("file:///tmp/b.png"), PathBuf::from("/tmp/b.png"));
    }
}

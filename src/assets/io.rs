//! Byte readers for local files and HTTP.

use std::path::{Path, PathBuf};

use crate::errors::{Result, StageError};

/// Reads files relative to a root directory.
#[derive(Debug, Clone)]
pub struct FileAssetReader {
    root_path: PathBuf,
}

impl FileAssetReader {
    #[must_use]
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let path = self.root_path.join(uri);
        log::debug!("Reading {}", path.display());
        #[cfg(not(target_arch = "wasm32"))]
        {
            tokio::fs::read(&path).await.map_err(|err| match err.kind() {
                std::io::ErrorKind::NotFound => StageError::AssetNotFound(path.display().to_string()),
                _ => StageError::IoError(err),
            })
        }
        #[cfg(target_arch = "wasm32")]
        {
            Err(StageError::AssetNotFound(format!(
                "{} (no filesystem in the browser)",
                path.display()
            )))
        }
    }
}

/// Fetches resources relative to a base URL.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpAssetReader {
    root: HttpRoot,
}

#[cfg(feature = "http")]
#[derive(Debug, Clone)]
enum HttpRoot {
    Absolute(url::Url),
    /// Page-relative prefix, only meaningful inside a browser.
    Relative(String),
}

#[cfg(feature = "http")]
impl HttpAssetReader {
    /// `url_str` may point at a file; its directory becomes the root.
    pub fn new(url_str: &str) -> Result<Self> {
        let mut url = url::Url::parse(url_str)?;
        if !url.path().ends_with('/') {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop();
                segments.push("");
            }
        }
        Ok(Self {
            root: HttpRoot::Absolute(url),
        })
    }

    /// Root for relative browser fetches, e.g. `./textures/`.
    #[must_use]
    pub fn relative(prefix: &str) -> Self {
        Self {
            root: HttpRoot::Relative(prefix.to_string()),
        }
    }

    fn resolve(&self, uri: &str) -> Result<String> {
        match &self.root {
            HttpRoot::Absolute(base) => Ok(base.join(uri)?.to_string()),
            HttpRoot::Relative(prefix) => Ok(format!("{prefix}{uri}")),
        }
    }

    pub async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let url = self.resolve(uri)?;
        log::debug!("Fetching {url}");
        let response = ehttp::fetch_async(ehttp::Request::get(&url))
            .await
            .map_err(StageError::HttpError)?;
        if !response.ok {
            return Err(StageError::HttpResponseError {
                status: response.status,
                url,
            });
        }
        Ok(response.bytes)
    }
}

/// Enum dispatch over the available readers.
#[derive(Debug, Clone)]
pub enum AssetReaderVariant {
    File(FileAssetReader),
    #[cfg(feature = "http")]
    Http(HttpAssetReader),
}

impl AssetReaderVariant {
    /// Picks a reader for `source` and returns it with the file name to read.
    ///
    /// `http(s)://` sources use HTTP. Everything else is a file path
    /// natively and a page-relative URL in the browser.
    pub fn from_source(source: &str) -> Result<(Self, String)> {
        let file_name = Self::source_filename(source).to_string();

        if is_url(source) {
            #[cfg(feature = "http")]
            {
                return Ok((Self::Http(HttpAssetReader::new(source)?), file_name));
            }
            #[cfg(not(feature = "http"))]
            {
                return Err(StageError::HttpError(format!(
                    "cannot fetch {source}: built without the `http` feature"
                )));
            }
        }

        let dir = source.strip_suffix(file_name.as_str()).unwrap_or("");

        #[cfg(all(target_arch = "wasm32", feature = "http"))]
        {
            Ok((Self::Http(HttpAssetReader::relative(dir)), file_name))
        }
        #[cfg(not(all(target_arch = "wasm32", feature = "http")))]
        {
            let root = if dir.is_empty() { Path::new(".") } else { Path::new(dir) };
            Ok((Self::File(FileAssetReader::new(root)), file_name))
        }
    }

    pub async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        match self {
            Self::File(r) => r.read_bytes(uri).await,
            #[cfg(feature = "http")]
            Self::Http(r) => r.read_bytes(uri).await,
        }
    }

    /// Last path segment of `source`.
    #[must_use]
    pub fn source_filename(source: &str) -> &str {
        let trimmed = source.split(['?', '#']).next().unwrap_or(source);
        trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed)
    }
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

//! # Static Files Module
//!
//! Fallback asset serving for requests no route accepts.
//!
//! [`StaticFiles`] maps the request pathname onto a base directory, refusing anything
//! that would escape it (`..`, absolute components), and picks `Content-Type` from the
//! file extension. A pathname ending in `/` serves `index.html` from that directory.

use crate::request::ApiRequest;
use crate::response::ApiResponse;
use futures::future::BoxFuture;
use futures::FutureExt;
use http::{Method, StatusCode};
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Why an asset could not be served.
#[derive(Debug)]
pub enum AssetError {
    /// No asset exists for the pathname, or the pathname is not allowed
    NotFound(String),
    /// The asset exists but could not be read
    Io(io::Error),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::NotFound(path) => write!(f, "asset not found: {path}"),
            AssetError::Io(e) => write!(f, "asset read failed: {e}"),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Io(e) => Some(e),
            AssetError::NotFound(_) => None,
        }
    }
}

/// Serves an asset for a request.
pub trait StaticAssets: Send + Sync {
    fn fetch<'a>(&'a self, request: &'a ApiRequest) -> BoxFuture<'a, Result<ApiResponse, AssetError>>;
}

/// Directory-backed [`StaticAssets`].
#[derive(Debug, Clone)]
pub struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            base_dir: base.into(),
        }
    }

    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let decoded = urlencoding::decode(url_path).ok()?;
        let mut pb = self.base_dir.clone();
        for comp in Path::new(decoded.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        if decoded.ends_with('/') || decoded.is_empty() {
            pb.push("index.html");
        }
        Some(pb)
    }

    fn content_type(path: &Path) -> &'static str {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase()
            .as_str()
        {
            "html" | "htm" => "text/html",
            "css" => "text/css",
            "js" | "mjs" => "application/javascript",
            "json" => "application/json",
            "txt" => "text/plain",
            "svg" => "image/svg+xml",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "ico" => "image/x-icon",
            "wasm" => "application/wasm",
            _ => "application/octet-stream",
        }
    }

    /// Read the asset for `url_path`.
    ///
    /// # Errors
    ///
    /// [`AssetError::NotFound`] for missing files and disallowed paths, [`AssetError::Io`]
    /// when an existing file cannot be read.
    pub async fn load(&self, url_path: &str) -> Result<(Vec<u8>, &'static str), AssetError> {
        let path = self
            .map_path(url_path)
            .ok_or_else(|| AssetError::NotFound(url_path.to_owned()))?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            _ => return Err(AssetError::NotFound(url_path.to_owned())),
        }
        let bytes = tokio::fs::read(&path).await.map_err(AssetError::Io)?;
        Ok((bytes, Self::content_type(&path)))
    }
}

impl StaticAssets for StaticFiles {
    fn fetch<'a>(&'a self, request: &'a ApiRequest) -> BoxFuture<'a, Result<ApiResponse, AssetError>> {
        async move {
            let method = request.method();
            if method != Method::GET && method != Method::HEAD {
                return Err(AssetError::NotFound(request.pathname().to_owned()));
            }
            let (bytes, content_type) = self.load(request.pathname()).await?;
            debug!(path = %request.pathname(), content_type, bytes = bytes.len(), "Serving static asset");
            let response = ApiResponse::new(StatusCode::OK).with_content_type(content_type);
            Ok(if method == Method::HEAD {
                response
            } else {
                response.with_body(bytes)
            })
        }
        .boxed()
    }
}

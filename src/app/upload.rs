//! Copy-from-URL video uploads.

use super::cloudflare::CloudflareClient;
use super::failure;
use crate::codec::{field, required, string, Codec, CodecExt, ObjectCodec};
use crate::context::{HasRequest, HasUpload};
use crate::pipeline::Defect;
use crate::request::discriminate;
use crate::response::ApiResponse;
use futures::future::BoxFuture;
use http::StatusCode;
use std::sync::Arc;
use tracing::{info, warn};

/// Body of `POST /v1/upload.copy`: `{"url": ..., "meta": {"name": ...}}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUrl {
    pub url: String,
    pub name: String,
}

impl FileUrl {
    pub fn codec() -> impl ObjectCodec<Value = Self> {
        required((
            field("url", string()),
            field("meta", required((field("name", string()),))),
        ))
        .map(
            |(url, (name,))| Self { url, name },
            |f| (f.url.clone(), (f.name.clone(),)),
        )
    }
}

unable_to!(UnableToUpload, "Unable to upload");

/// Uploads videos to the platform.
pub trait UploadService: Send + Sync {
    fn upload_from_url<'a>(&'a self, file: &'a FileUrl) -> BoxFuture<'a, Result<ApiResponse, UnableToUpload>>;
}

/// [`UploadService`] backed by Cloudflare Stream's copy endpoint.
#[derive(Debug, Clone)]
pub struct CloudflareUpload {
    client: CloudflareClient,
}

impl CloudflareUpload {
    pub fn new(client: CloudflareClient) -> Self {
        Self { client }
    }
}

impl UploadService for CloudflareUpload {
    fn upload_from_url<'a>(&'a self, file: &'a FileUrl) -> BoxFuture<'a, Result<ApiResponse, UnableToUpload>> {
        Box::pin(async move {
            let body = FileUrl::codec().encode(file);
            self.client.post_json("stream/copy", &body).await.map_err(|e| {
                warn!(error = %e, "Copy upload failed");
                UnableToUpload::default()
            })
        })
    }
}

/// `POST /v1/upload.copy`
pub async fn upload_from_url<C: HasRequest + HasUpload>(ctx: Arc<C>) -> Result<ApiResponse, Defect> {
    let file = match discriminate(&FileUrl::codec(), ctx.request()) {
        Ok(file) => file,
        Err(e) => return Ok(failure(StatusCode::BAD_REQUEST, e.message())),
    };
    info!(url = %file.url, name = %file.name, "Uploading from URL");
    Ok(match ctx.upload().upload_from_url(&file).await {
        Ok(response) => response,
        Err(e) => failure(StatusCode::BAD_REQUEST, e.message()),
    })
}

//! Live-input management on the streaming platform (admin only).

use super::cloudflare::CloudflareClient;
use super::failure;
use crate::codec::{field, required, string, CodecExt, ObjectCodec};
use crate::context::{HasRequest, HasStreaming};
use crate::pipeline::Defect;
use crate::request::discriminate;
use crate::response::ApiResponse;
use futures::future::BoxFuture;
use http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Body of `POST /v1/create.stream`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamingName {
    pub name: String,
}

impl StreamingName {
    pub fn codec() -> impl ObjectCodec<Value = Self> {
        required((field("name", string()),)).map(|(name,)| Self { name }, |s| (s.name.clone(),))
    }
}

/// Body of `DELETE /v1/delete.stream`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamingId {
    pub id: String,
}

impl StreamingId {
    pub fn codec() -> impl ObjectCodec<Value = Self> {
        required((field("id", string()),)).map(|(id,)| Self { id }, |s| (s.id.clone(),))
    }
}

unable_to!(UnableToCreateStream, "Unable to create stream");
unable_to!(UnableToDeleteStream, "Unable to delete stream");

/// Creates and deletes live inputs.
///
/// Successful calls resolve to the platform's own response, which handlers return to
/// the caller unchanged.
pub trait StreamingService: Send + Sync {
    fn create_stream<'a>(
        &'a self,
        name: &'a StreamingName,
    ) -> BoxFuture<'a, Result<ApiResponse, UnableToCreateStream>>;

    fn delete_stream<'a>(
        &'a self,
        id: &'a StreamingId,
    ) -> BoxFuture<'a, Result<ApiResponse, UnableToDeleteStream>>;
}

/// [`StreamingService`] backed by Cloudflare Stream live inputs.
#[derive(Debug, Clone)]
pub struct CloudflareStreaming {
    client: CloudflareClient,
}

impl CloudflareStreaming {
    pub fn new(client: CloudflareClient) -> Self {
        Self { client }
    }
}

impl StreamingService for CloudflareStreaming {
    fn create_stream<'a>(
        &'a self,
        name: &'a StreamingName,
    ) -> BoxFuture<'a, Result<ApiResponse, UnableToCreateStream>> {
        Box::pin(async move {
            let body = json!({
                "meta": { "name": name.name },
                "recording": {
                    "mode": "automatic",
                    "timeoutSeconds": 10,
                    "requireSignedURLs": false,
                },
            });
            self.client
                .post_json("stream/live_inputs", &body)
                .await
                .map_err(|e| {
                    warn!(error = %e, "Live input creation failed");
                    UnableToCreateStream::default()
                })
        })
    }

    fn delete_stream<'a>(
        &'a self,
        id: &'a StreamingId,
    ) -> BoxFuture<'a, Result<ApiResponse, UnableToDeleteStream>> {
        Box::pin(async move {
            let path = format!("stream/live_inputs/{}", urlencoding::encode(&id.id));
            self.client.delete(&path).await.map_err(|e| {
                warn!(error = %e, "Live input deletion failed");
                UnableToDeleteStream::default()
            })
        })
    }
}

/// `POST /v1/create.stream`
pub async fn create_stream<C: HasRequest + HasStreaming>(ctx: Arc<C>) -> Result<ApiResponse, Defect> {
    let name = match discriminate(&StreamingName::codec(), ctx.request()) {
        Ok(name) => name,
        Err(e) => return Ok(failure(StatusCode::BAD_REQUEST, e.message())),
    };
    info!(name = %name.name, "Creating live input");
    Ok(match ctx.streaming().create_stream(&name).await {
        Ok(response) => response,
        Err(e) => failure(StatusCode::BAD_REQUEST, e.message()),
    })
}

/// `DELETE /v1/delete.stream`
pub async fn delete_stream<C: HasRequest + HasStreaming>(ctx: Arc<C>) -> Result<ApiResponse, Defect> {
    let id = match discriminate(&StreamingId::codec(), ctx.request()) {
        Ok(id) => id,
        Err(e) => return Ok(failure(StatusCode::BAD_REQUEST, e.message())),
    };
    info!(id = %id.id, "Deleting live input");
    Ok(match ctx.streaming().delete_stream(&id).await {
        Ok(response) => response,
        Err(e) => failure(StatusCode::BAD_REQUEST, e.message()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Codec;

    #[test]
    fn test_streaming_codecs() {
        let name = StreamingName::codec().decode(&json!({"name": "launch"})).unwrap();
        assert_eq!(name.name, "launch");
        let err = StreamingId::codec().decode(&json!({})).unwrap_err();
        assert_eq!(err.message(), "Missing field(s): id");
    }

    #[test]
    fn test_domain_error_messages() {
        assert_eq!(UnableToCreateStream::default().to_string(), "Unable to create stream");
        assert_eq!(UnableToDeleteStream::new("gone").message(), "gone");
    }
}

//! Object-store forwarding.
//!
//! The remote side is deliberately opaque: one `put_object` operation
//! that may fail. The bundled [`HttpObjectStore`] targets S3-compatible
//! HTTP gateways with a `PUT {endpoint}/{bucket}/{key}` upload and an
//! optional bearer token; other backends implement [`ObjectStore`]
//! themselves.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Error type for object-store uploads.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum UploadError {
    /// The HTTP request itself failed (network, TLS, DNS).
    #[error("upload request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("object store returned {status} for key '{key}'")]
    Status {
        /// The object key that was being uploaded.
        key: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The configured endpoint is not a valid URL.
    #[error("invalid endpoint URL '{0}'")]
    InvalidEndpoint(String),
}

/// An opaque "put this object" capability.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` under `key`, replacing any previous object.
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), UploadError>;
}

/// HTTP implementation of [`ObjectStore`].
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: Client,
    endpoint: String,
    bucket: String,
    token: Option<String>,
}

impl HttpObjectStore {
    /// Create a store client for `bucket` behind `endpoint`.
    pub fn new(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Result<Self, UploadError> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        reqwest::Url::parse(&endpoint)
            .map_err(|_| UploadError::InvalidEndpoint(endpoint.clone()))?;

        Ok(Self {
            client: Client::new(),
            endpoint,
            bucket: bucket.into(),
            token: None,
        })
    }

    /// Attach a bearer token sent with every upload.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// The bucket this store uploads into.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), UploadError> {
        let url = format!("{}/{}/{}", self.endpoint, self.bucket, key);
        debug!("uploading {} bytes to {}", body.len(), url);

        let mut request = self.client.put(&url).body(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status {
                key: key.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Client for the ECS instance metadata endpoint
//!
//! The metadata endpoint is a link-local service reachable only from inside the instance. It is
//! always contacted over plain HTTP.

use std::fmt::Debug;
use std::sync::Arc;

use alibabacloud_credential_types::provider::BoxError;

use crate::transport::BoxFuture;

/// Endpoint of the ECS metadata service
pub const DEFAULT_ENDPOINT: &str = "http://100.100.100.200";

/// Path prefix under which RAM role credentials are served, followed by the role name
pub const SECURITY_CREDENTIALS_PATH: &str = "/latest/meta-data/ram/security-credentials/";

/// Retrieves documents from the instance metadata endpoint
pub trait MetadataClient: Debug + Send + Sync {
    /// `GET` the document at `path` and return its body
    fn get<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, BoxError>>;
}

/// Cheaply cloneable handle to a [`MetadataClient`]
#[derive(Clone, Debug)]
pub struct SharedMetadataClient(Arc<dyn MetadataClient>);

impl SharedMetadataClient {
    /// Wrap a metadata client
    pub fn new(client: impl MetadataClient + 'static) -> Self {
        SharedMetadataClient(Arc::new(client))
    }
}

impl MetadataClient for SharedMetadataClient {
    fn get<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, BoxError>> {
        self.0.get(path)
    }
}

impl Default for SharedMetadataClient {
    #[cfg(feature = "client-hyper")]
    fn default() -> Self {
        SharedMetadataClient::new(hyper_client::HyperMetadataClient::new())
    }

    #[cfg(not(feature = "client-hyper"))]
    fn default() -> Self {
        SharedMetadataClient::new(NoMetadataClient)
    }
}

/// Placeholder used when no HTTP client is compiled in
#[cfg(not(feature = "client-hyper"))]
#[derive(Debug)]
struct NoMetadataClient;

#[cfg(not(feature = "client-hyper"))]
impl MetadataClient for NoMetadataClient {
    fn get<'a>(&'a self, _path: &'a str) -> BoxFuture<'a, Result<String, BoxError>> {
        Box::pin(std::future::ready(Err(
            "no metadata client configured: enable the `client-hyper` feature or set one with \
             `ProviderConfig::with_metadata_client`"
                .into(),
        )))
    }
}

#[cfg(feature = "client-hyper")]
pub use hyper_client::HyperMetadataClient;

#[cfg(feature = "client-hyper")]
mod hyper_client {
    use alibabacloud_credential_types::provider::BoxError;
    use http::Uri;
    use hyper::client::HttpConnector;

    use crate::metadata_client::{MetadataClient, DEFAULT_ENDPOINT};
    use crate::transport::BoxFuture;

    /// Metadata client backed by a plain HTTP hyper client
    #[derive(Clone, Debug)]
    pub struct HyperMetadataClient {
        client: hyper::Client<HttpConnector>,
        endpoint: String,
    }

    impl Default for HyperMetadataClient {
        fn default() -> Self {
            Self::new()
        }
    }

    impl HyperMetadataClient {
        /// Client for the well-known metadata endpoint
        pub fn new() -> Self {
            Self::with_endpoint(DEFAULT_ENDPOINT)
        }

        /// Client for a custom endpoint, eg. `http://127.0.0.1:8080`
        pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
            let mut endpoint = endpoint.into();
            while endpoint.ends_with('/') {
                endpoint.pop();
            }
            HyperMetadataClient {
                client: hyper::Client::new(),
                endpoint,
            }
        }

        async fn get_document(&self, path: &str) -> Result<String, BoxError> {
            let uri: Uri = format!("{}{}", self.endpoint, path).parse()?;
            tracing::debug!(uri = %uri, "requesting instance metadata");
            let response = self.client.get(uri).await?;
            let status = response.status();
            let body = hyper::body::to_bytes(response.into_body()).await?;
            if !status.is_success() {
                return Err(format!(
                    "instance metadata endpoint returned {}: {}",
                    status,
                    String::from_utf8_lossy(&body)
                )
                .into());
            }
            Ok(String::from_utf8(body.to_vec())?)
        }
    }

    impl MetadataClient for HyperMetadataClient {
        fn get<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, BoxError>> {
            Box::pin(self.get_document(path))
        }
    }
}

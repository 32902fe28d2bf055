/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Alibaba Cloud SDK credential providers
//!
//! [`DefaultCredentialsChain`] resolves credentials from, in order: directly supplied keys,
//! environment variables, the credentials file and the ECS instance RAM role. Each source is also
//! available on its own under [`provider`].
//!
//! Credentials that come from an exchange (instance metadata, RSA key pair, RAM role ARN) are
//! produced by the stateful fetchers in [`fetcher`], which refresh once 80% of the validity window
//! has elapsed.
//!
//! Signed STS calls are made through a [`SignedTransport`](transport::SignedTransport) supplied by
//! the caller. The instance metadata endpoint is reached over plain HTTP with
//! [`HyperMetadataClient`](metadata_client::HyperMetadataClient) when the `client-hyper` feature
//! is enabled (the default).
//!
//! ```no_run
//! # async fn docs() {
//! let provider = alibabacloud_config::default_provider();
//! match provider.load_credentials().await {
//!     Ok(Some(credentials)) => println!("loaded {:?}", credentials),
//!     Ok(None) => println!("no credentials configured"),
//!     Err(err) => eprintln!("failed to load credentials: {}", err),
//! }
//! # }
//! ```

#![warn(
    missing_debug_implementations,
    missing_docs,
    rustdoc::missing_crate_level_docs,
    unreachable_pub
)]

pub mod default_provider_chain;
pub mod fetcher;
pub mod metadata_client;
pub mod os_shim_internal;
pub mod profile;
pub mod provider;
pub mod provider_config;
pub mod time_source;
pub mod transport;

#[cfg(any(test, feature = "test-util"))]
pub mod test_util;

pub use default_provider_chain::DefaultCredentialsChain;
pub use provider_config::ProviderConfig;

/// Default credentials provider chain with no overrides
pub fn default_provider() -> DefaultCredentialsChain {
    DefaultCredentialsChain::builder().build()
}

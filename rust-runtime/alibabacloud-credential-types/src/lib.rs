/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Alibaba Cloud SDK Credentials
//!
//! This crate holds the three credential shapes accepted by Alibaba Cloud APIs and the
//! [`ProvideCredentials`](provider::ProvideCredentials) trait implemented by every credential
//! source.
//!
//! ## Credential shapes
//! - [`AccessKeyCredentials`]: a long-lived (or exchanged) access key pair
//! - [`BearerTokenCredentials`]: an opaque bearer token
//! - [`SecurityCredentials`]: a short-lived access key pair plus its security token
//!
//! Credential values are immutable. Expiry is tracked by whatever fetched them, never by the
//! value itself.
//!
//! ## Implementing your own credentials provider
//! ```rust
//! use alibabacloud_credential_types::provider::{self, future, ProvideCredentials};
//! use alibabacloud_credential_types::AccessKeyCredentials;
//!
//! #[derive(Debug)]
//! struct HardcodedProvider;
//!
//! impl HardcodedProvider {
//!     async fn load_credentials(&self) -> provider::Result {
//!         Ok(Some(AccessKeyCredentials::new("akid", "secret").into()))
//!     }
//! }
//!
//! impl ProvideCredentials for HardcodedProvider {
//!     fn load<'a>(&'a self) -> future::LoadCredentials<'a>
//!     where
//!         Self: 'a,
//!     {
//!         future::LoadCredentials::new(self.load_credentials())
//!     }
//! }
//! ```

#![warn(
    missing_debug_implementations,
    missing_docs,
    rustdoc::missing_crate_level_docs,
    unreachable_pub
)]

pub mod credentials;
pub mod provider;

pub use credentials::{AccessKeyCredentials, BearerTokenCredentials, Credentials, SecurityCredentials};
pub use provider::{CredentialsError, ProvideCredentials};

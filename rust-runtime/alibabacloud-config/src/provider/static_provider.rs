/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Credentials supplied directly by the caller

use alibabacloud_credential_types::provider::{self, future, ProvideCredentials};
use alibabacloud_credential_types::{
    AccessKeyCredentials, BearerTokenCredentials, CredentialsError, SecurityCredentials,
};

/// Wraps directly supplied credential fields
///
/// The credential shape is inferred from which fields are set:
/// 1. `bearer_token` yields a bearer token
/// 2. `access_key_id` yields an access key pair, upgraded to session credentials when a
///    `secret_token` is also set; `access_key_secret` is then mandatory
/// 3. otherwise the provider yields nothing
///
/// A field that is set must not be empty.
///
/// ```rust
/// use alibabacloud_config::provider::StaticCredentialsProvider;
/// let provider = StaticCredentialsProvider::builder()
///     .access_key_id("akid")
///     .access_key_secret("secret")
///     .build();
/// assert!(!provider.is_empty());
/// ```
#[derive(Clone, Default)]
pub struct StaticCredentialsProvider {
    access_key_id: Option<String>,
    access_key_secret: Option<String>,
    secret_token: Option<String>,
    bearer_token: Option<String>,
}

impl std::fmt::Debug for StaticCredentialsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentialsProvider")
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}

impl StaticCredentialsProvider {
    /// Builder for [`StaticCredentialsProvider`]
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// True when no credential field was supplied
    pub fn is_empty(&self) -> bool {
        self.access_key_id.is_none()
            && self.access_key_secret.is_none()
            && self.secret_token.is_none()
            && self.bearer_token.is_none()
    }

    fn credentials(&self) -> provider::Result {
        if let Some(bearer_token) = &self.bearer_token {
            return Ok(Some(
                BearerTokenCredentials::new(non_empty(bearer_token, "bearer_token")?).into(),
            ));
        }
        let access_key_id = match &self.access_key_id {
            Some(access_key_id) => non_empty(access_key_id, "access_key_id")?,
            None => return Ok(None),
        };
        let access_key_secret = self
            .access_key_secret
            .as_deref()
            .ok_or_else(|| empty_field("access_key_secret"))
            .and_then(|secret| non_empty(secret, "access_key_secret"))?;
        Ok(Some(match &self.secret_token {
            Some(secret_token) => SecurityCredentials::new(
                access_key_id,
                access_key_secret,
                non_empty(secret_token, "secret_token")?,
            )
            .into(),
            None => AccessKeyCredentials::new(access_key_id, access_key_secret).into(),
        }))
    }
}

fn non_empty<'a>(value: &'a str, field: &str) -> Result<&'a str, CredentialsError> {
    if value.is_empty() {
        Err(empty_field(field))
    } else {
        Ok(value)
    }
}

fn empty_field(field: &str) -> CredentialsError {
    CredentialsError::invalid_configuration(format!("{} can not be empty", field))
}

impl ProvideCredentials for StaticCredentialsProvider {
    fn load<'a>(&'a self) -> future::LoadCredentials<'a>
    where
        Self: 'a,
    {
        future::LoadCredentials::ready(self.credentials())
    }
}

/// Builder for [`StaticCredentialsProvider`]
#[derive(Default)]
pub struct Builder {
    inner: StaticCredentialsProvider,
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder").field("inner", &self.inner).finish()
    }
}

impl Builder {
    /// Set the access key id
    pub fn access_key_id(mut self, access_key_id: impl Into<String>) -> Self {
        self.inner.access_key_id = Some(access_key_id.into());
        self
    }

    /// Set the access key secret
    pub fn access_key_secret(mut self, access_key_secret: impl Into<String>) -> Self {
        self.inner.access_key_secret = Some(access_key_secret.into());
        self
    }

    /// Set the security token, turning an access key pair into session credentials
    pub fn secret_token(mut self, secret_token: impl Into<String>) -> Self {
        self.inner.secret_token = Some(secret_token.into());
        self
    }

    /// Set a bearer token; takes precedence over every other field
    pub fn bearer_token(mut self, bearer_token: impl Into<String>) -> Self {
        self.inner.bearer_token = Some(bearer_token.into());
        self
    }

    /// Build the provider
    pub fn build(self) -> StaticCredentialsProvider {
        self.inner
    }
}

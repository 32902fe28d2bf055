/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Immutable credential values.

use std::fmt;
use std::fmt::{Debug, Formatter};

use zeroize::Zeroize;

const REDACTED: &str = "** redacted **";

/// Static access key pair
///
/// Produced directly from configuration (`access_key` profiles, environment variables) or from a
/// session access key exchange (`rsa_key_pair` profiles).
#[derive(Clone, PartialEq, Eq)]
pub struct AccessKeyCredentials {
    access_key_id: String,
    access_key_secret: String,
}

impl AccessKeyCredentials {
    /// Create a new access key pair
    pub fn new(access_key_id: impl Into<String>, access_key_secret: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
        }
    }

    /// Returns the access key ID
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Returns the access key secret
    pub fn access_key_secret(&self) -> &str {
        &self.access_key_secret
    }
}

impl Debug for AccessKeyCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessKeyCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &REDACTED)
            .finish()
    }
}

impl Drop for AccessKeyCredentials {
    fn drop(&mut self) {
        self.access_key_secret.zeroize();
    }
}

/// Opaque bearer token
#[derive(Clone, PartialEq, Eq)]
pub struct BearerTokenCredentials {
    bearer_token: String,
}

impl BearerTokenCredentials {
    /// Wrap a bearer token
    pub fn new(bearer_token: impl Into<String>) -> Self {
        Self {
            bearer_token: bearer_token.into(),
        }
    }

    /// Returns the bearer token
    pub fn bearer_token(&self) -> &str {
        &self.bearer_token
    }
}

impl Debug for BearerTokenCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerTokenCredentials")
            .field("bearer_token", &REDACTED)
            .finish()
    }
}

impl Drop for BearerTokenCredentials {
    fn drop(&mut self) {
        self.bearer_token.zeroize();
    }
}

/// Session credentials: an access key pair that is only valid together with its security token
///
/// A session credential without a security token is never constructed; sources that cannot
/// supply the token fail instead of degrading to an [`AccessKeyCredentials`].
#[derive(Clone, PartialEq, Eq)]
pub struct SecurityCredentials {
    access_key_id: String,
    access_key_secret: String,
    security_token: String,
}

impl SecurityCredentials {
    /// Create new session credentials
    pub fn new(
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
        security_token: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
            security_token: security_token.into(),
        }
    }

    /// Returns the temporary access key ID
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Returns the temporary access key secret
    pub fn access_key_secret(&self) -> &str {
        &self.access_key_secret
    }

    /// Returns the security token
    pub fn security_token(&self) -> &str {
        &self.security_token
    }
}

impl Debug for SecurityCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &REDACTED)
            .field("security_token", &REDACTED)
            .finish()
    }
}

impl Drop for SecurityCredentials {
    fn drop(&mut self) {
        self.access_key_secret.zeroize();
        self.security_token.zeroize();
    }
}

/// Credentials produced by a credentials provider
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    /// Static access key pair
    AccessKey(AccessKeyCredentials),
    /// Bearer token
    BearerToken(BearerTokenCredentials),
    /// Access key pair plus security token
    Security(SecurityCredentials),
}

impl Credentials {
    /// Returns the access key ID, if these credentials carry one
    pub fn access_key_id(&self) -> Option<&str> {
        match self {
            Credentials::AccessKey(creds) => Some(creds.access_key_id()),
            Credentials::Security(creds) => Some(creds.access_key_id()),
            Credentials::BearerToken(_) => None,
        }
    }

    /// Returns the access key secret, if these credentials carry one
    pub fn access_key_secret(&self) -> Option<&str> {
        match self {
            Credentials::AccessKey(creds) => Some(creds.access_key_secret()),
            Credentials::Security(creds) => Some(creds.access_key_secret()),
            Credentials::BearerToken(_) => None,
        }
    }

    /// Returns the security token for session credentials
    pub fn security_token(&self) -> Option<&str> {
        match self {
            Credentials::Security(creds) => Some(creds.security_token()),
            _ => None,
        }
    }

    /// Returns the bearer token for bearer token credentials
    pub fn bearer_token(&self) -> Option<&str> {
        match self {
            Credentials::BearerToken(creds) => Some(creds.bearer_token()),
            _ => None,
        }
    }

    #[cfg(feature = "test-util")]
    /// Session credentials suitable for unit tests
    pub fn for_tests() -> Self {
        Credentials::Security(SecurityCredentials::new(
            "ANOTREAL",
            "notrealrnrELgWzOk3IfjzDKtFBhDby",
            "notarealsessiontoken",
        ))
    }
}

impl From<AccessKeyCredentials> for Credentials {
    fn from(creds: AccessKeyCredentials) -> Self {
        Credentials::AccessKey(creds)
    }
}

impl From<BearerTokenCredentials> for Credentials {
    fn from(creds: BearerTokenCredentials) -> Self {
        Credentials::BearerToken(creds)
    }
}

impl From<SecurityCredentials> for Credentials {
    fn from(creds: SecurityCredentials) -> Self {
        Credentials::Security(creds)
    }
}

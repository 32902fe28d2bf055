/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Credentials provider trait and its error type

use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::Credentials;

/// Boxed error used for opaque causes
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Result of asking a provider for credentials
///
/// `Ok(None)` means the provider's source is absent ("try the next provider"). It is not an
/// error.
pub type Result = std::result::Result<Option<Credentials>, CredentialsError>;

/// Error returned when loading credentials fails
#[derive(Debug)]
#[non_exhaustive]
pub enum CredentialsError {
    /// A required setting is missing or invalid
    ///
    /// Missing fields, unreadable explicit file paths, out-of-range session durations and
    /// partially set environment variables all surface here.
    InvalidConfiguration(Cow<'static, str>),

    /// A profile declared a `type` that no resolver exists for
    UnknownProfileType(String),

    /// The upstream service rejected the credential itself (unknown key id, bad signature)
    InvalidCredential {
        /// Upstream error code that triggered the remapping
        code: String,
    },

    /// A credential exchange returned a non-success response
    ServiceError {
        /// Upstream error code
        code: String,
        /// Upstream error message
        message: String,
        /// Upstream request id, when returned
        request_id: Option<String>,
    },

    /// The credential source could not be reached or returned an unreadable response
    ProviderError(BoxError),
}

impl CredentialsError {
    /// Construct an [`InvalidConfiguration`](CredentialsError::InvalidConfiguration) error
    pub fn invalid_configuration(message: impl Into<Cow<'static, str>>) -> Self {
        CredentialsError::InvalidConfiguration(message.into())
    }

    /// Construct a [`ProviderError`](CredentialsError::ProviderError) error
    pub fn provider_error(cause: impl Into<BoxError>) -> Self {
        CredentialsError::ProviderError(cause.into())
    }

    /// True when the error was caused by local configuration rather than by the service
    ///
    /// Configuration errors are never worth retrying.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            CredentialsError::InvalidConfiguration(_)
                | CredentialsError::UnknownProfileType(_)
                | CredentialsError::InvalidCredential { .. }
        )
    }

    /// Upstream error code, if the error came from (or was remapped from) a service response
    pub fn code(&self) -> Option<&str> {
        match self {
            CredentialsError::InvalidCredential { code } => Some(code),
            CredentialsError::ServiceError { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl Display for CredentialsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CredentialsError::InvalidConfiguration(message) => {
                write!(f, "the credential provider was not properly configured: {}", message)
            }
            CredentialsError::UnknownProfileType(profile_type) => write!(
                f,
                "unknown credentials profile type `{}`; expected one of access_key, ecs_ram_role, \
                 ram_role_arn, bearer_token, rsa_key_pair, sts_token",
                profile_type
            ),
            CredentialsError::InvalidCredential { code } => write!(
                f,
                "the configured credential is invalid, please check the key id and key ({})",
                code
            ),
            CredentialsError::ServiceError {
                code,
                message,
                request_id,
            } => {
                write!(f, "credential exchange failed: {}: {}", code, message)?;
                if let Some(request_id) = request_id {
                    write!(f, " (request id: {})", request_id)?;
                }
                Ok(())
            }
            CredentialsError::ProviderError(err) => {
                write!(f, "an error occurred while loading credentials: {}", err)
            }
        }
    }
}

impl Error for CredentialsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CredentialsError::ProviderError(err) => Some(err.as_ref() as _),
            _ => None,
        }
    }
}

/// Future types returned by [`ProvideCredentials`]
pub mod future {
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

    /// Future returned by [`ProvideCredentials::load`](super::ProvideCredentials::load)
    pub struct LoadCredentials<'a>(BoxFuture<'a, super::Result>);

    impl<'a> LoadCredentials<'a> {
        /// Wrap an async credentials lookup
        pub fn new(future: impl Future<Output = super::Result> + Send + 'a) -> Self {
            LoadCredentials(Box::pin(future))
        }

        /// A future that is already resolved
        pub fn ready(result: super::Result) -> Self {
            LoadCredentials(Box::pin(std::future::ready(result)))
        }
    }

    impl std::fmt::Debug for LoadCredentials<'_> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("LoadCredentials")
        }
    }

    impl Future for LoadCredentials<'_> {
        type Output = super::Result;

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
            self.0.as_mut().poll(cx)
        }
    }
}

/// A source of credentials
///
/// Providers signal "no credentials here" with `Ok(None)` when their source is simply absent,
/// and reserve errors for sources that are present but broken.
pub trait ProvideCredentials: Send + Sync + fmt::Debug {
    /// Attempt to load credentials from this source
    fn load<'a>(&'a self) -> future::LoadCredentials<'a>
    where
        Self: 'a;
}

impl ProvideCredentials for Credentials {
    fn load<'a>(&'a self) -> future::LoadCredentials<'a>
    where
        Self: 'a,
    {
        future::LoadCredentials::ready(Ok(Some(self.clone())))
    }
}

impl<T: ProvideCredentials + ?Sized> ProvideCredentials for Arc<T> {
    fn load<'a>(&'a self) -> future::LoadCredentials<'a>
    where
        Self: 'a,
    {
        self.as_ref().load()
    }
}

impl<T: ProvideCredentials + ?Sized> ProvideCredentials for Box<T> {
    fn load<'a>(&'a self) -> future::LoadCredentials<'a>
    where
        Self: 'a,
    {
        self.as_ref().load()
    }
}

#[cfg(test)]
mod test {
    use crate::provider::{CredentialsError, ProvideCredentials};
    use crate::{AccessKeyCredentials, Credentials};
    use std::error::Error;

    #[test]
    fn configuration_errors_are_classified() {
        assert!(CredentialsError::invalid_configuration("missing").is_configuration_error());
        assert!(CredentialsError::UnknownProfileType("nope".into()).is_configuration_error());
        assert!(CredentialsError::InvalidCredential {
            code: "SignatureDoesNotMatch".into()
        }
        .is_configuration_error());
        let service = CredentialsError::ServiceError {
            code: "Throttling".into(),
            message: "slow down".into(),
            request_id: None,
        };
        assert!(!service.is_configuration_error());
        assert_eq!(service.code(), Some("Throttling"));
    }

    #[test]
    fn display_names_the_offending_input() {
        let err = CredentialsError::UnknownProfileType("chaining".into());
        assert!(format!("{}", err).contains("`chaining`"));

        let err = CredentialsError::ServiceError {
            code: "Forbidden".into(),
            message: "denied".into(),
            request_id: Some("req-1".into()),
        };
        assert_eq!(
            format!("{}", err),
            "credential exchange failed: Forbidden: denied (request id: req-1)"
        );
    }

    #[test]
    fn provider_error_exposes_source() {
        let err = CredentialsError::provider_error("connection refused");
        assert!(err.source().is_some());
        assert!(err.code().is_none());
    }

    #[tokio::test]
    async fn credentials_provide_themselves() {
        let creds: Credentials = AccessKeyCredentials::new("akid", "secret").into();
        let loaded = creds.load().await.expect("infallible");
        assert_eq!(loaded, Some(creds));
    }
}

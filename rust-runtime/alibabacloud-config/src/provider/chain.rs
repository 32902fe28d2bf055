/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Ordered chain of credential providers

use std::borrow::Cow;

use alibabacloud_credential_types::provider::{self, future, ProvideCredentials};
use tracing::Instrument;

/// Credentials provider that checks a series of inner providers
///
/// Each provider is checked in turn. The first provider that returns credentials wins and no
/// later provider is consulted. A provider that fails stops the chain and the error is returned
/// to the caller. When every provider comes back empty, the chain yields `Ok(None)`.
///
/// ## Example
/// ```rust
/// use alibabacloud_config::provider::{
///     ChainProvider, EnvironmentVariableCredentialsProvider, ProfileFileCredentialsProvider,
/// };
/// let provider =
///     ChainProvider::first_try("Environment", EnvironmentVariableCredentialsProvider::new())
///         .or_else("Profile", ProfileFileCredentialsProvider::builder().build());
/// ```
#[derive(Debug)]
pub struct ChainProvider {
    providers: Vec<(Cow<'static, str>, Box<dyn ProvideCredentials>)>,
}

impl ChainProvider {
    /// Create a chain starting with `provider`
    pub fn first_try(
        name: impl Into<Cow<'static, str>>,
        provider: impl ProvideCredentials + 'static,
    ) -> Self {
        ChainProvider {
            providers: vec![(name.into(), Box::new(provider))],
        }
    }

    /// Add a fallback provider to the end of the chain
    pub fn or_else(
        mut self,
        name: impl Into<Cow<'static, str>>,
        provider: impl ProvideCredentials + 'static,
    ) -> Self {
        self.providers.push((name.into(), Box::new(provider)));
        self
    }

    /// Names of the providers in evaluation order
    pub fn provider_names(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(|(name, _)| name.as_ref())
    }

    async fn credentials(&self) -> provider::Result {
        for (name, provider) in &self.providers {
            let span = tracing::debug_span!("load_credentials", provider = %name);
            match provider.load().instrument(span).await {
                Ok(Some(credentials)) => {
                    tracing::info!(provider = %name, "loaded credentials");
                    return Ok(Some(credentials));
                }
                Ok(None) => {
                    tracing::debug!(
                        provider = %name,
                        "provider in chain did not provide credentials"
                    );
                }
                Err(err) => {
                    tracing::warn!(provider = %name, error = %err, "provider in chain failed");
                    return Err(err);
                }
            }
        }
        Ok(None)
    }
}

impl ProvideCredentials for ChainProvider {
    fn load<'a>(&'a self) -> future::LoadCredentials<'a>
    where
        Self: 'a,
    {
        future::LoadCredentials::new(self.credentials())
    }
}

#[cfg(test)]
mod test {
    use alibabacloud_credential_types::provider::{future, ProvideCredentials};
    use alibabacloud_credential_types::{
        AccessKeyCredentials, BearerTokenCredentials, Credentials, CredentialsError,
    };
    use tracing_test::traced_test;

    use crate::provider::chain::ChainProvider;

    #[derive(Debug)]
    struct Empty;

    impl ProvideCredentials for Empty {
        fn load<'a>(&'a self) -> future::LoadCredentials<'a>
        where
            Self: 'a,
        {
            future::LoadCredentials::ready(Ok(None))
        }
    }

    #[derive(Debug)]
    struct Broken;

    impl ProvideCredentials for Broken {
        fn load<'a>(&'a self) -> future::LoadCredentials<'a>
        where
            Self: 'a,
        {
            future::LoadCredentials::ready(Err(CredentialsError::invalid_configuration("broken")))
        }
    }

    #[traced_test]
    #[tokio::test]
    async fn first_credentials_win() {
        let first = Credentials::from(AccessKeyCredentials::new("akid", "secret"));
        let chain = ChainProvider::first_try("Empty", Empty)
            .or_else("First", first.clone())
            .or_else("Second", Credentials::from(BearerTokenCredentials::new("tok")));
        assert_eq!(chain.load().await.unwrap(), Some(first));
        assert!(logs_contain("loaded credentials"));
        assert!(logs_contain("First"));
    }

    #[tokio::test]
    async fn errors_stop_the_chain() {
        let chain = ChainProvider::first_try("Broken", Broken).or_else(
            "Static",
            Credentials::from(BearerTokenCredentials::new("tok")),
        );
        let err = chain.load().await.expect_err("first provider fails");
        assert!(err.is_configuration_error());
    }

    #[tokio::test]
    async fn all_empty_yields_nothing() {
        let chain = ChainProvider::first_try("A", Empty).or_else("B", Empty);
        assert_eq!(chain.provider_names().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(chain.load().await.unwrap(), None);
    }
}

/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Default credential provider chain

use alibabacloud_credential_types::provider::{self, future, ProvideCredentials};

use crate::metadata_client::MetadataClient;
use crate::os_shim_internal::{Env, Fs};
use crate::provider::{
    ChainProvider, EcsRamRoleCredentialsProvider, EnvironmentVariableCredentialsProvider,
    ProfileFileCredentialsProvider, StaticCredentialsProvider,
};
use crate::provider_config::ProviderConfig;
use crate::time_source::TimeSource;
use crate::transport::SignedTransport;

/// Default Alibaba Cloud Credential Provider Chain
///
/// Resolution order:
/// 1. Directly supplied credentials: [`StaticCredentialsProvider`]
/// 2. Environment variables: [`EnvironmentVariableCredentialsProvider`]
/// 3. Credentials file (`ALIBABA_CLOUD_CREDENTIALS_FILE`, `/etc/.alibabacloud/credentials`,
///    `~/alibabacloud/credentials`): [`ProfileFileCredentialsProvider`]
/// 4. ECS instance RAM role (`ALIBABA_CLOUD_ECS_METADATA`): [`EcsRamRoleCredentialsProvider`]
///
/// When no provider produces credentials the chain yields `Ok(None)`; deciding whether that is
/// fatal is up to the caller.
///
/// ## Example:
/// Create a default chain with directly supplied keys:
/// ```rust
/// use alibabacloud_config::provider::StaticCredentialsProvider;
/// let credentials_provider = alibabacloud_config::DefaultCredentialsChain::builder()
///     .static_credentials(
///         StaticCredentialsProvider::builder()
///             .access_key_id("akid")
///             .access_key_secret("secret")
///             .build(),
///     )
///     .build();
/// ```
///
/// Create a default chain with no overrides:
/// ```rust
/// let credentials_provider = alibabacloud_config::default_provider();
/// ```
#[derive(Debug)]
pub struct DefaultCredentialsChain(ChainProvider);

impl DefaultCredentialsChain {
    /// Builder for [`DefaultCredentialsChain`]
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Resolve credentials from the first provider in the chain that has some
    pub async fn load_credentials(&self) -> provider::Result {
        self.0.load().await
    }
}

impl ProvideCredentials for DefaultCredentialsChain {
    fn load<'a>(&'a self) -> future::LoadCredentials<'a>
    where
        Self: 'a,
    {
        self.0.load()
    }
}

/// Builder for [`DefaultCredentialsChain`]
#[derive(Debug, Default)]
pub struct Builder {
    static_credentials: Option<StaticCredentialsProvider>,
    profile_name: Option<String>,
    config: ProviderConfig,
}

impl Builder {
    /// Credentials supplied directly; these take precedence over every other source
    pub fn static_credentials(mut self, provider: StaticCredentialsProvider) -> Self {
        self.static_credentials = Some(provider);
        self
    }

    /// Profile to load from the credentials file; defaults to `default`
    pub fn profile_name(mut self, profile_name: impl Into<String>) -> Self {
        self.profile_name = Some(profile_name.into());
        self
    }

    /// Set the signed transport used by `rsa_key_pair` and `ram_role_arn` profiles
    ///
    /// Without a transport those profiles fail with a configuration error.
    pub fn transport(mut self, transport: impl SignedTransport + 'static) -> Self {
        self.config = self.config.with_transport(transport);
        self
    }

    /// Override the instance metadata client
    pub fn metadata_client(mut self, client: impl MetadataClient + 'static) -> Self {
        self.config = self.config.with_metadata_client(client);
        self
    }

    #[doc(hidden)]
    /// Override the clock used for refresh decisions
    ///
    /// This method exists primarily for testing credential providers
    pub fn time_source(mut self, time_source: impl TimeSource + 'static) -> Self {
        self.config = self.config.with_time_source(time_source);
        self
    }

    #[doc(hidden)]
    /// Override the filesystem used for this provider
    ///
    /// This method exists primarily for testing credential providers
    pub fn fs(mut self, fs: Fs) -> Self {
        self.config = self.config.with_fs(fs);
        self
    }

    #[doc(hidden)]
    /// Override the environment used for this provider
    ///
    /// This method exists primarily for testing credential providers
    pub fn env(mut self, env: Env) -> Self {
        self.config = self.config.with_env(env);
        self
    }

    /// Build the chain
    pub fn build(self) -> DefaultCredentialsChain {
        let mut profile_builder = ProfileFileCredentialsProvider::builder().configure(&self.config);
        if let Some(profile_name) = self.profile_name {
            profile_builder = profile_builder.profile_name(profile_name);
        }
        let env_provider = EnvironmentVariableCredentialsProvider::new_with_env(self.config.env());
        let provider_chain =
            ChainProvider::first_try("Static", self.static_credentials.unwrap_or_default())
                .or_else("Environment", env_provider)
                .or_else("Profile", profile_builder.build())
                .or_else("EcsRamRole", EcsRamRoleCredentialsProvider::new(self.config));
        DefaultCredentialsChain(provider_chain)
    }
}

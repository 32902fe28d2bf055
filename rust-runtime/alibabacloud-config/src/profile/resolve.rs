/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Profile to credentials dispatch

use alibabacloud_credential_types::{
    AccessKeyCredentials, BearerTokenCredentials, Credentials, CredentialsError,
    SecurityCredentials,
};

use crate::fetcher::{
    CachedFetcher, Fetcher, InstanceMetadataFetcher, RamRoleArnFetcher, RsaKeyPairFetcher,
};
use crate::profile::{Profile, Section};
use crate::provider_config::ProviderConfig;

/// Turns validated profiles into credentials
///
/// Profiles backed by an exchange construct a fresh fetcher per resolution, so every call
/// performs the exchange.
#[derive(Clone, Debug, Default)]
pub struct ProfileResolver {
    config: ProviderConfig,
}

impl ProfileResolver {
    /// Resolver using the collaborators in `config`
    pub fn new(config: ProviderConfig) -> Self {
        ProfileResolver { config }
    }

    /// Validate `section` and resolve it
    pub async fn resolve_section(
        &self,
        section: &Section,
    ) -> Result<Credentials, CredentialsError> {
        let profile = Profile::from_section(section)?;
        self.resolve(&profile).await
    }

    /// Produce credentials for `profile`
    pub async fn resolve(&self, profile: &Profile) -> Result<Credentials, CredentialsError> {
        tracing::debug!(profile_type = profile.type_name(), "resolving credentials profile");
        let credentials: Credentials = match profile {
            Profile::AccessKey(p) => {
                AccessKeyCredentials::new(&p.access_key_id, &p.access_key_secret).into()
            }
            Profile::EcsRamRole(p) => {
                first_fetch(InstanceMetadataFetcher::new(&p.role_name, &self.config))
                    .await?
                    .into()
            }
            Profile::RamRoleArn(p) => {
                let fetcher = RamRoleArnFetcher::new(
                    &p.role_arn,
                    p.role_session_name.clone(),
                    AccessKeyCredentials::new(&p.access_key_id, &p.access_key_secret),
                    &self.config,
                )?;
                first_fetch(fetcher).await?.into()
            }
            Profile::BearerToken(p) => BearerTokenCredentials::new(&p.bearer_token).into(),
            Profile::RsaKeyPair(p) => {
                let fetcher = RsaKeyPairFetcher::new(
                    &p.public_key_id,
                    &p.private_key_file,
                    p.session_period,
                    &self.config,
                )?;
                first_fetch(fetcher).await?.into()
            }
            Profile::StsToken(p) => SecurityCredentials::new(
                &p.access_key_id,
                &p.access_key_secret,
                &p.security_token,
            )
            .into(),
        };
        Ok(credentials)
    }
}

async fn first_fetch<F: Fetcher>(fetcher: F) -> Result<F::Output, CredentialsError> {
    CachedFetcher::new(fetcher).credentials().await
}

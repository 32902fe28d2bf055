/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Session credentials for the RAM role attached to an ECS instance

use std::env::VarError;

use alibabacloud_credential_types::provider::{self, future, ProvideCredentials};
use alibabacloud_credential_types::CredentialsError;
use tokio::sync::Mutex;

use crate::fetcher::{CachedFetcher, InstanceMetadataFetcher};
use crate::provider::ENV_VAR_ECS_METADATA;
use crate::provider_config::ProviderConfig;

/// Load session credentials from the instance metadata endpoint
///
/// Only active when `ALIBABA_CLOUD_ECS_METADATA` is set; its value is the role name. The fetcher
/// is kept between loads, so loads within the refresh window are served from cache. Changing the
/// role name starts over with a fresh fetcher.
#[derive(Debug)]
pub struct EcsRamRoleCredentialsProvider {
    config: ProviderConfig,
    fetcher: Mutex<Option<CachedFetcher<InstanceMetadataFetcher>>>,
}

impl Default for EcsRamRoleCredentialsProvider {
    fn default() -> Self {
        Self::new(ProviderConfig::default())
    }
}

impl EcsRamRoleCredentialsProvider {
    /// Provider using the collaborators in `config`
    pub fn new(config: ProviderConfig) -> Self {
        EcsRamRoleCredentialsProvider {
            config,
            fetcher: Mutex::new(None),
        }
    }

    async fn credentials(&self) -> provider::Result {
        let role_name = match self.config.env().get(ENV_VAR_ECS_METADATA) {
            Err(VarError::NotPresent) => return Ok(None),
            Err(VarError::NotUnicode(_)) => {
                return Err(CredentialsError::invalid_configuration(format!(
                    "environment variable {} is not valid unicode",
                    ENV_VAR_ECS_METADATA
                )))
            }
            Ok(role) if role.is_empty() => {
                return Err(CredentialsError::invalid_configuration(format!(
                    "environment variable {} cannot be empty",
                    ENV_VAR_ECS_METADATA
                )))
            }
            Ok(role) => role,
        };

        let mut fetcher = self.fetcher.lock().await;
        let reuse =
            matches!(&*fetcher, Some(cached) if cached.fetcher().role_name() == role_name);
        if !reuse {
            tracing::debug!(role_name = %role_name, "creating instance metadata fetcher");
            *fetcher = Some(CachedFetcher::new(InstanceMetadataFetcher::new(
                role_name,
                &self.config,
            )));
        }
        match fetcher.as_mut() {
            Some(cached) => Ok(Some(cached.credentials().await?.into())),
            None => Ok(None),
        }
    }
}

impl ProvideCredentials for EcsRamRoleCredentialsProvider {
    fn load<'a>(&'a self) -> future::LoadCredentials<'a>
    where
        Self: 'a,
    {
        future::LoadCredentials::new(self.credentials())
    }
}

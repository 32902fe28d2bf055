/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Configuration shared by credential providers

use alibabacloud_credential_types::CredentialsError;

use crate::metadata_client::{MetadataClient, SharedMetadataClient};
use crate::os_shim_internal::{Env, Fs};
use crate::time_source::{SharedTimeSource, TimeSource};
use crate::transport::{SharedTransport, SignedTransport};

/// Environment, filesystem, clock and network collaborators used to load credentials
///
/// The default configuration reads the real process environment and filesystem, uses the
/// system clock and talks to the instance metadata endpoint over hyper. No signed transport is
/// configured by default: profiles that exchange credentials through STS fail with a
/// configuration error until one is set with [`ProviderConfig::with_transport`].
#[derive(Clone, Debug, Default)]
pub struct ProviderConfig {
    env: Env,
    fs: Fs,
    time_source: SharedTimeSource,
    transport: Option<SharedTransport>,
    metadata_client: SharedMetadataClient,
}

impl ProviderConfig {
    /// Override the environment
    pub fn with_env(mut self, env: Env) -> Self {
        self.env = env;
        self
    }

    /// Override the filesystem
    pub fn with_fs(mut self, fs: Fs) -> Self {
        self.fs = fs;
        self
    }

    /// Override the clock used for refresh decisions
    pub fn with_time_source(mut self, time_source: impl TimeSource + 'static) -> Self {
        self.time_source = SharedTimeSource::new(time_source);
        self
    }

    /// Set the transport used for signed STS exchanges
    pub fn with_transport(mut self, transport: impl SignedTransport + 'static) -> Self {
        self.transport = Some(SharedTransport::new(transport));
        self
    }

    /// Override the instance metadata client
    pub fn with_metadata_client(mut self, client: impl MetadataClient + 'static) -> Self {
        self.metadata_client = SharedMetadataClient::new(client);
        self
    }

    pub(crate) fn env(&self) -> Env {
        self.env.clone()
    }

    pub(crate) fn fs(&self) -> Fs {
        self.fs.clone()
    }

    pub(crate) fn time_source(&self) -> SharedTimeSource {
        self.time_source.clone()
    }

    pub(crate) fn metadata_client(&self) -> SharedMetadataClient {
        self.metadata_client.clone()
    }

    /// The signed transport, or a configuration error naming the profile type that needs it
    pub(crate) fn transport(&self, needed_by: &str) -> Result<SharedTransport, CredentialsError> {
        self.transport.clone().ok_or_else(|| {
            CredentialsError::invalid_configuration(format!(
                "`{}` credentials require a signed transport; none was configured",
                needed_by
            ))
        })
    }
}

/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Session credentials from assuming a RAM role with a source access key

use std::time::{Duration, UNIX_EPOCH};

use alibabacloud_credential_types::{AccessKeyCredentials, CredentialsError, SecurityCredentials};
use http::Method;
use serde::Deserialize;

use crate::fetcher::{Fetcher, RefreshState};
use crate::provider_config::ProviderConfig;
use crate::time_source::{SharedTimeSource, TimeSource};
use crate::transport::{BoxFuture, ExchangeRequest, SharedTransport, SigningIdentity, StsClient};

/// Duration requested for every assumed role session
pub const SESSION_PERIOD: Duration = Duration::from_secs(3600);

const REGION: &str = "cn-hangzhou";
const DEFAULT_SESSION_NAME_PREFIX: &str = "alibabacloud-rust-sdk-";

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleResponse {
    credentials: AssumedCredentials,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumedCredentials {
    access_key_id: String,
    access_key_secret: String,
    security_token: String,
}

/// Assumes `role_arn` using a source access key pair
#[derive(Debug)]
pub struct RamRoleArnFetcher {
    role_arn: String,
    role_session_name: String,
    source: AccessKeyCredentials,
    transport: SharedTransport,
    time_source: SharedTimeSource,
    state: RefreshState,
}

impl RamRoleArnFetcher {
    /// Create a fetcher for `role_arn`
    ///
    /// When `role_session_name` is absent or empty a timestamped default is generated.
    pub fn new(
        role_arn: impl Into<String>,
        role_session_name: Option<String>,
        source: AccessKeyCredentials,
        config: &ProviderConfig,
    ) -> Result<Self, CredentialsError> {
        let time_source = config.time_source();
        let role_session_name = role_session_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| default_session_name(&time_source));
        Ok(RamRoleArnFetcher {
            role_arn: role_arn.into(),
            role_session_name,
            source,
            transport: config.transport("ram_role_arn")?,
            time_source,
            state: RefreshState::new(SESSION_PERIOD),
        })
    }

    /// Session name sent with the assume role request
    pub fn role_session_name(&self) -> &str {
        &self.role_session_name
    }

    async fn fetch(&mut self) -> Result<Option<SecurityCredentials>, CredentialsError> {
        let now = self.time_source.now();
        if !self.state.is_expired(now) {
            return Ok(None);
        }
        let client = StsClient::new(
            self.transport.clone(),
            SigningIdentity::AccessKey(self.source.clone()),
            REGION,
        );
        let request = ExchangeRequest::sts("AssumeRole")
            .method(Method::POST)
            .param("RoleArn", &self.role_arn)
            .param("RoleSessionName", &self.role_session_name)
            .param("DurationSeconds", SESSION_PERIOD.as_secs().to_string());
        let body = client.call(request).await?;
        let response: AssumeRoleResponse =
            serde_json::from_slice(&body).map_err(CredentialsError::provider_error)?;
        if response.credentials.security_token.is_empty() {
            return Err(CredentialsError::provider_error(
                "AssumeRole response contained an empty `SecurityToken`",
            ));
        }
        self.state.refreshed(now, SESSION_PERIOD);
        tracing::debug!(role_arn = %self.role_arn, "assumed role");
        let assumed = response.credentials;
        Ok(Some(SecurityCredentials::new(
            assumed.access_key_id,
            assumed.access_key_secret,
            assumed.security_token,
        )))
    }
}

impl Fetcher for RamRoleArnFetcher {
    type Output = SecurityCredentials;

    fn is_expired(&self) -> bool {
        self.state.is_expired(self.time_source.now())
    }

    fn get_profile(
        &mut self,
    ) -> BoxFuture<'_, Result<Option<SecurityCredentials>, CredentialsError>> {
        Box::pin(self.fetch())
    }
}

fn default_session_name(time_source: &SharedTimeSource) -> String {
    let secs = time_source
        .now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{}{}", DEFAULT_SESSION_NAME_PREFIX, secs)
}

/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Session credentials for the RAM role attached to an ECS instance

use std::time::{Duration, SystemTime};

use alibabacloud_credential_types::{CredentialsError, SecurityCredentials};
use serde::Deserialize;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::PrimitiveDateTime;

use crate::fetcher::{Fetcher, RefreshState};
use crate::metadata_client::{MetadataClient, SharedMetadataClient, SECURITY_CREDENTIALS_PATH};
use crate::provider_config::ProviderConfig;
use crate::time_source::{SharedTimeSource, TimeSource};
use crate::transport::BoxFuture;

const SUCCESS_CODE: &str = "Success";
const EXPIRATION_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MetadataCredentials {
    code: Option<String>,
    message: Option<String>,
    access_key_id: Option<String>,
    access_key_secret: Option<String>,
    security_token: Option<String>,
    expiration: Option<String>,
}

/// Fetches role credentials from the instance metadata endpoint
///
/// The validity window is taken from the `Expiration` returned by the endpoint, so the next
/// refresh happens after 80% of the time remaining at fetch time.
#[derive(Debug)]
pub struct InstanceMetadataFetcher {
    role_name: String,
    client: SharedMetadataClient,
    time_source: SharedTimeSource,
    state: RefreshState,
}

impl InstanceMetadataFetcher {
    /// Fetcher for `role_name`, using the metadata client and clock from `config`
    pub fn new(role_name: impl Into<String>, config: &ProviderConfig) -> Self {
        InstanceMetadataFetcher {
            role_name: role_name.into(),
            client: config.metadata_client(),
            time_source: config.time_source(),
            state: RefreshState::new(Duration::ZERO),
        }
    }

    /// Name of the RAM role credentials are fetched for
    pub fn role_name(&self) -> &str {
        &self.role_name
    }

    async fn fetch(&mut self) -> Result<Option<SecurityCredentials>, CredentialsError> {
        let now = self.time_source.now();
        if !self.state.is_expired(now) {
            return Ok(None);
        }
        let path = format!("{}{}", SECURITY_CREDENTIALS_PATH, self.role_name);
        let body = self
            .client
            .get(&path)
            .await
            .map_err(CredentialsError::ProviderError)?;
        let response: MetadataCredentials =
            serde_json::from_str(&body).map_err(CredentialsError::provider_error)?;

        let code = response.code.unwrap_or_default();
        if code != SUCCESS_CODE {
            let message = response
                .message
                .unwrap_or_else(|| format!("refresh Ecs sts token err, code is {}", code));
            return Err(CredentialsError::ServiceError {
                code,
                message,
                request_id: None,
            });
        }

        let credentials = SecurityCredentials::new(
            required(response.access_key_id, "AccessKeyId")?,
            required(response.access_key_secret, "AccessKeySecret")?,
            required(response.security_token, "SecurityToken")?,
        );
        // without an expiration the next call refreshes again
        let horizon = match response.expiration {
            Some(expiration) => parse_expiration(&expiration)?
                .duration_since(now)
                .unwrap_or_default(),
            None => Duration::ZERO,
        };
        self.state.refreshed(now, horizon);
        tracing::debug!(
            role = %self.role_name,
            horizon = ?horizon,
            "refreshed instance metadata credentials"
        );
        Ok(Some(credentials))
    }
}

impl Fetcher for InstanceMetadataFetcher {
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

fn required(field: Option<String>, name: &str) -> Result<String, CredentialsError> {
    field.filter(|value| !value.is_empty()).ok_or_else(|| {
        CredentialsError::provider_error(format!(
            "instance metadata response did not contain `{}`",
            name
        ))
    })
}

/// Parse a `YYYY-MM-DDTHH:MM:SSZ` UTC timestamp
fn parse_expiration(expiration: &str) -> Result<SystemTime, CredentialsError> {
    let parsed = PrimitiveDateTime::parse(expiration, EXPIRATION_FORMAT).map_err(|err| {
        CredentialsError::provider_error(format!(
            "invalid `Expiration` in instance metadata response ({}): {}",
            expiration, err
        ))
    })?;
    Ok(parsed.assume_utc().into())
}

#[cfg(test)]
mod test {
    use std::time::{Duration, UNIX_EPOCH};

    use alibabacloud_credential_types::{CredentialsError, SecurityCredentials};

    use crate::fetcher::instance_metadata::{parse_expiration, InstanceMetadataFetcher};
    use crate::fetcher::Fetcher;
    use crate::provider_config::ProviderConfig;
    use crate::test_util::{ManualTimeSource, StaticMetadataClient};

    // 2021-08-17T00:00:00Z
    const START: u64 = 1629158400;

    const ONE_HOUR: &str = r#"{
        "Code": "Success",
        "AccessKeyId": "STS.AKID",
        "AccessKeySecret": "SECRET",
        "SecurityToken": "TOKEN",
        "Expiration": "2021-08-17T01:00:00Z",
        "LastUpdated": "2021-08-17T00:00:00Z"
    }"#;

    fn fetcher(client: &StaticMetadataClient, clock: &ManualTimeSource) -> InstanceMetadataFetcher {
        let config = ProviderConfig::default()
            .with_metadata_client(client.clone())
            .with_time_source(clock.clone());
        InstanceMetadataFetcher::new("EcsRamRoleTest", &config)
    }

    #[test]
    fn expiration_format() {
        assert_eq!(
            parse_expiration("2021-08-17T01:00:00Z").unwrap(),
            UNIX_EPOCH + Duration::from_secs(START + 3600)
        );
        parse_expiration("2021-08-17 01:00:00").expect_err("not the expected format");
    }

    #[tokio::test]
    async fn new_fetcher_is_expired_and_fetches() {
        let client = StaticMetadataClient::new(&[ONE_HOUR]);
        let clock = ManualTimeSource::new(UNIX_EPOCH + Duration::from_secs(START));
        let mut fetcher = fetcher(&client, &clock);
        assert!(fetcher.is_expired());

        let creds = fetcher.get_profile().await.unwrap();
        assert_eq!(
            creds,
            Some(SecurityCredentials::new("STS.AKID", "SECRET", "TOKEN"))
        );
        assert_eq!(
            client.requested_paths(),
            vec!["/latest/meta-data/ram/security-credentials/EcsRamRoleTest"]
        );
    }

    #[tokio::test]
    async fn refresh_only_after_eighty_percent_of_the_window() {
        let client = StaticMetadataClient::new(&[ONE_HOUR, ONE_HOUR]);
        let clock = ManualTimeSource::new(UNIX_EPOCH + Duration::from_secs(START));
        let mut fetcher = fetcher(&client, &clock);

        assert!(fetcher.get_profile().await.unwrap().is_some());
        clock.advance(Duration::from_secs(2880));
        assert_eq!(fetcher.get_profile().await.unwrap(), None);
        assert_eq!(client.requested_paths().len(), 1);

        clock.advance(Duration::from_secs(1));
        assert!(fetcher.is_expired());
        assert!(fetcher.get_profile().await.unwrap().is_some());
        assert_eq!(client.requested_paths().len(), 2);
    }

    #[tokio::test]
    async fn clock_set_back_forces_refresh() {
        let client = StaticMetadataClient::new(&[ONE_HOUR, ONE_HOUR]);
        let clock = ManualTimeSource::new(UNIX_EPOCH + Duration::from_secs(START));
        let mut fetcher = fetcher(&client, &clock);

        assert!(fetcher.get_profile().await.unwrap().is_some());
        assert!(!fetcher.is_expired());
        clock.set_time(UNIX_EPOCH + Duration::from_secs(START - 60));
        assert!(fetcher.is_expired());
        assert!(fetcher.get_profile().await.unwrap().is_some());
        assert_eq!(client.requested_paths().len(), 2);
    }

    #[tokio::test]
    async fn non_success_code_is_a_service_error() {
        let client = StaticMetadataClient::new(&[r#"{"Code": "Failed"}"#]);
        let clock = ManualTimeSource::new(UNIX_EPOCH + Duration::from_secs(START));
        let err = fetcher(&client, &clock)
            .get_profile()
            .await
            .expect_err("code is not Success");
        match err {
            CredentialsError::ServiceError { code, message, .. } => {
                assert_eq!(code, "Failed");
                assert_eq!(message, "refresh Ecs sts token err, code is Failed");
            }
            other => panic!("incorrect error variant: {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_token_is_rejected() {
        let client = StaticMetadataClient::new(&[
            r#"{"Code": "Success", "AccessKeyId": "AKID", "AccessKeySecret": "SECRET"}"#,
        ]);
        let clock = ManualTimeSource::new(UNIX_EPOCH + Duration::from_secs(START));
        let err = fetcher(&client, &clock)
            .get_profile()
            .await
            .expect_err("no security token");
        assert!(format!("{}", err).contains("SecurityToken"));
    }

    #[tokio::test]
    async fn endpoint_failures_are_provider_errors() {
        let client = StaticMetadataClient::failing("connection refused");
        let clock = ManualTimeSource::new(UNIX_EPOCH + Duration::from_secs(START));
        let mut fetcher = fetcher(&client, &clock);
        let err = fetcher.get_profile().await.expect_err("endpoint down");
        assert!(matches!(err, CredentialsError::ProviderError(_)));
        // a failed refresh leaves the fetcher expired
        assert!(fetcher.is_expired());
    }
}

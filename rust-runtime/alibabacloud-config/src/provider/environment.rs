/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Access key pair from process environment variables

use std::env::VarError;

use alibabacloud_credential_types::provider::{self, future, ProvideCredentials};
use alibabacloud_credential_types::{AccessKeyCredentials, CredentialsError};

use crate::os_shim_internal::Env;
use crate::provider::{ENV_VAR_ACCESS_KEY_ID, ENV_VAR_ACCESS_KEY_SECRET};

/// Load an access key pair from `ALIBABA_CLOUD_ACCESS_KEY_ID` and
/// `ALIBABA_CLOUD_ACCESS_KEY_SECRET`
///
/// An unset `ALIBABA_CLOUD_ACCESS_KEY_ID` means this provider has nothing to offer. Once the id is
/// set, an empty id or a missing or empty secret is a configuration error.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentVariableCredentialsProvider {
    env: Env,
}

impl EnvironmentVariableCredentialsProvider {
    /// Provider reading the real process environment
    pub fn new() -> Self {
        Self::new_with_env(Env::real())
    }

    /// Provider reading `env`
    pub fn new_with_env(env: Env) -> Self {
        EnvironmentVariableCredentialsProvider { env }
    }

    fn credentials(&self) -> provider::Result {
        let access_key_id = match self.env.get(ENV_VAR_ACCESS_KEY_ID) {
            Err(VarError::NotPresent) => return Ok(None),
            Err(VarError::NotUnicode(_)) => return Err(not_unicode(ENV_VAR_ACCESS_KEY_ID)),
            Ok(id) if id.is_empty() => return Err(empty(ENV_VAR_ACCESS_KEY_ID)),
            Ok(id) => id,
        };
        let access_key_secret = match self.env.get(ENV_VAR_ACCESS_KEY_SECRET) {
            Err(VarError::NotUnicode(_)) => return Err(not_unicode(ENV_VAR_ACCESS_KEY_SECRET)),
            Err(VarError::NotPresent) => return Err(empty(ENV_VAR_ACCESS_KEY_SECRET)),
            Ok(secret) if secret.is_empty() => return Err(empty(ENV_VAR_ACCESS_KEY_SECRET)),
            Ok(secret) => secret,
        };
        tracing::debug!("loaded access key pair from environment variables");
        Ok(Some(
            AccessKeyCredentials::new(access_key_id, access_key_secret).into(),
        ))
    }
}

fn empty(var: &str) -> CredentialsError {
    CredentialsError::invalid_configuration(format!(
        "environment variable {} cannot be empty",
        var
    ))
}

fn not_unicode(var: &str) -> CredentialsError {
    CredentialsError::invalid_configuration(format!(
        "environment variable {} is not valid unicode",
        var
    ))
}

impl ProvideCredentials for EnvironmentVariableCredentialsProvider {
    fn load<'a>(&'a self) -> future::LoadCredentials<'a>
    where
        Self: 'a,
    {
        future::LoadCredentials::ready(self.credentials())
    }
}

#[cfg(test)]
mod test {
    use alibabacloud_credential_types::{AccessKeyCredentials, Credentials, ProvideCredentials};

    use crate::os_shim_internal::Env;
    use crate::provider::environment::EnvironmentVariableCredentialsProvider;

    fn provider(vars: &[(&str, &str)]) -> EnvironmentVariableCredentialsProvider {
        EnvironmentVariableCredentialsProvider::new_with_env(Env::from_slice(vars))
    }

    #[tokio::test]
    async fn valid_pair() {
        let creds = provider(&[
            ("ALIBABA_CLOUD_ACCESS_KEY_ID", "akid"),
            ("ALIBABA_CLOUD_ACCESS_KEY_SECRET", "secret"),
        ])
        .load()
        .await
        .expect("valid credentials");
        assert_eq!(
            creds,
            Some(Credentials::from(AccessKeyCredentials::new("akid", "secret")))
        );
    }

    #[tokio::test]
    async fn unset_id_defers_to_next_provider() {
        let creds = provider(&[("ALIBABA_CLOUD_ACCESS_KEY_SECRET", "secret")])
            .load()
            .await
            .unwrap();
        assert_eq!(creds, None);
    }

    #[tokio::test]
    async fn empty_id_is_an_error() {
        let err = provider(&[
            ("ALIBABA_CLOUD_ACCESS_KEY_ID", ""),
            ("ALIBABA_CLOUD_ACCESS_KEY_SECRET", "secret"),
        ])
        .load()
        .await
        .expect_err("empty id");
        assert!(err.is_configuration_error());
        assert!(format!("{}", err).contains("ALIBABA_CLOUD_ACCESS_KEY_ID"));
    }

    #[tokio::test]
    async fn missing_or_empty_secret_is_an_error() {
        for vars in [
            &[("ALIBABA_CLOUD_ACCESS_KEY_ID", "akid")][..],
            &[
                ("ALIBABA_CLOUD_ACCESS_KEY_ID", "akid"),
                ("ALIBABA_CLOUD_ACCESS_KEY_SECRET", ""),
            ][..],
        ] {
            let err = provider(vars).load().await.expect_err("no secret");
            assert!(format!("{}", err).contains("ALIBABA_CLOUD_ACCESS_KEY_SECRET"));
        }
    }
}

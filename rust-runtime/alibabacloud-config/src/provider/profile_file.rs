/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Credentials from a profile in the credentials file
//!
//! The file is located in one of two ways:
//!
//! 1. `ALIBABA_CLOUD_CREDENTIALS_FILE` names it explicitly. The file must then exist, parse, and
//!    contain the requested profile with a `type`; any failure is returned to the caller. An
//!    empty value is a configuration error.
//! 2. Otherwise the default locations are probed in order:
//!    `/etc/.alibabacloud/credentials`, then `~/alibabacloud/credentials`. Unreadable or malformed
//!    files and files lacking the profile are skipped. The first file containing the profile
//!    wins, and is only acted on if the profile declares a `type`.
//!
//! The file is re-read on every load.

use std::env::VarError;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use alibabacloud_credential_types::provider::{self, future, ProvideCredentials};
use alibabacloud_credential_types::CredentialsError;

use crate::os_shim_internal::{Env, Fs};
use crate::profile::{load_config, ProfileFileError, ProfileResolver, Section, TYPE_KEY};
use crate::provider::ENV_VAR_CREDENTIALS_FILE;
use crate::provider_config::ProviderConfig;

/// Profile used when no name is configured
pub const DEFAULT_PROFILE_NAME: &str = "default";

const SYSTEM_CREDENTIALS_PATH: &str = "/etc/.alibabacloud/credentials";
const HOME_CREDENTIALS_PATH: &str = "~/alibabacloud/credentials";

/// Load credentials from a profile in the credentials file
///
/// ```rust
/// use alibabacloud_config::provider::ProfileFileCredentialsProvider;
/// let provider = ProfileFileCredentialsProvider::builder()
///     .profile_name("project")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ProfileFileCredentialsProvider {
    profile_name: String,
    env: Env,
    fs: Fs,
    resolver: ProfileResolver,
    last_loaded_path: Arc<Mutex<Option<PathBuf>>>,
}

impl Default for ProfileFileCredentialsProvider {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ProfileFileCredentialsProvider {
    /// Builder for [`ProfileFileCredentialsProvider`]
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Name of the profile this provider loads
    pub fn profile_name(&self) -> &str {
        &self.profile_name
    }

    /// Path of the credentials file used by the most recent successful load
    pub fn last_loaded_path(&self) -> Option<PathBuf> {
        self.last_loaded_path
            .lock()
            .ok()
            .and_then(|path| path.clone())
    }

    async fn credentials(&self) -> provider::Result {
        let (path, section) = match self.env.get(ENV_VAR_CREDENTIALS_FILE) {
            Err(VarError::NotPresent) => match self.probe_default_locations() {
                Some(found) => found,
                None => return Ok(None),
            },
            Err(VarError::NotUnicode(_)) => {
                return Err(CredentialsError::invalid_configuration(format!(
                    "environment variable {} is not valid unicode",
                    ENV_VAR_CREDENTIALS_FILE
                )))
            }
            Ok(explicit) if explicit.is_empty() => {
                return Err(CredentialsError::invalid_configuration(format!(
                    "environment variable {} cannot be empty",
                    ENV_VAR_CREDENTIALS_FILE
                )))
            }
            Ok(explicit) => {
                let path = expand_home(&explicit, &self.env);
                let section = self.explicit_section(&path)?;
                (path, section)
            }
        };
        tracing::debug!(
            path = %path.display(),
            profile = %self.profile_name,
            "loading credentials profile"
        );
        self.record_loaded_path(path);
        self.resolver.resolve_section(&section).await.map(Some)
    }

    fn record_loaded_path(&self, path: PathBuf) {
        if let Ok(mut last) = self.last_loaded_path.lock() {
            *last = Some(path);
        }
    }

    fn explicit_section(&self, path: &Path) -> Result<Section, ProfileFileError> {
        let profiles = load_config(&self.fs, path)?;
        let section = profiles
            .get_section(&self.profile_name)
            .ok_or_else(|| ProfileFileError::MissingProfile {
                profile: self.profile_name.clone(),
                path: path.to_path_buf(),
            })?;
        if section.get(TYPE_KEY).is_none() {
            return Err(ProfileFileError::MissingType {
                profile: self.profile_name.clone(),
                path: path.to_path_buf(),
            });
        }
        Ok(section.clone())
    }

    fn probe_default_locations(&self) -> Option<(PathBuf, Section)> {
        for candidate in [SYSTEM_CREDENTIALS_PATH, HOME_CREDENTIALS_PATH] {
            let path = expand_home(candidate, &self.env);
            let profiles = match load_config(&self.fs, &path) {
                Ok(profiles) => profiles,
                Err(err) => {
                    tracing::debug!(
                        path = %path.display(),
                        error = %err,
                        "skipping credentials file"
                    );
                    continue;
                }
            };
            let section = match profiles.get_section(&self.profile_name) {
                Some(section) => section,
                None => {
                    tracing::debug!(
                        path = %path.display(),
                        profile = %self.profile_name,
                        "profile not present, skipping credentials file"
                    );
                    continue;
                }
            };
            if section.get(TYPE_KEY).is_none() {
                tracing::debug!(
                    path = %path.display(),
                    profile = %self.profile_name,
                    "profile has no type, ignoring"
                );
                return None;
            }
            return Some((path, section.clone()));
        }
        None
    }
}

impl ProvideCredentials for ProfileFileCredentialsProvider {
    fn load<'a>(&'a self) -> future::LoadCredentials<'a>
    where
        Self: 'a,
    {
        future::LoadCredentials::new(self.credentials())
    }
}

/// Replace a leading `~` with the home directory from `HOME` or `USERPROFILE`
fn expand_home(path: &str, env: &Env) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) => rest,
        None => return PathBuf::from(path),
    };
    let home = env
        .get("HOME")
        .or_else(|_| env.get("USERPROFILE"))
        .ok()
        .filter(|home| !home.is_empty());
    match home {
        Some(home) => PathBuf::from(home).join(rest.trim_start_matches(['/', '\\'])),
        None => {
            tracing::debug!(path, "no home directory set, using path as-is");
            PathBuf::from(path)
        }
    }
}

/// Builder for [`ProfileFileCredentialsProvider`]
#[derive(Debug, Default)]
pub struct Builder {
    profile_name: Option<String>,
    config: ProviderConfig,
}

impl Builder {
    /// Profile to load; defaults to `default`
    pub fn profile_name(mut self, profile_name: impl Into<String>) -> Self {
        self.profile_name = Some(profile_name.into());
        self
    }

    /// Collaborators used to read the file and resolve the profile
    pub fn configure(mut self, config: &ProviderConfig) -> Self {
        self.config = config.clone();
        self
    }

    /// Build the provider
    pub fn build(self) -> ProfileFileCredentialsProvider {
        ProfileFileCredentialsProvider {
            profile_name: self
                .profile_name
                .unwrap_or_else(|| DEFAULT_PROFILE_NAME.to_string()),
            env: self.config.env(),
            fs: self.config.fs(),
            resolver: ProfileResolver::new(self.config),
            last_loaded_path: Default::default(),
        }
    }
}

#[cfg(test)]
mod test {
    use std::path::{Path, PathBuf};

    use alibabacloud_credential_types::{
        AccessKeyCredentials, BearerTokenCredentials, Credentials, CredentialsError,
        ProvideCredentials,
    };
    use tracing_test::traced_test;

    use crate::os_shim_internal::{Env, Fs};
    use crate::provider::profile_file::{expand_home, ProfileFileCredentialsProvider};
    use crate::provider_config::ProviderConfig;

    const ACCESS_KEY_FILE: &str =
        "[default]\ntype = access_key\naccess_key_id = akid\naccess_key_secret = secret\n";

    fn file_provider(
        vars: &[(&str, &str)],
        files: &[(&str, &str)],
    ) -> ProfileFileCredentialsProvider {
        ProfileFileCredentialsProvider::builder()
            .configure(
                &ProviderConfig::default()
                    .with_env(Env::from_slice(vars))
                    .with_fs(Fs::from_slice(files)),
            )
            .build()
    }

    #[test]
    fn home_expansion() {
        let env = Env::from_slice(&[("HOME", "/home/me")]);
        assert_eq!(
            expand_home("~/alibabacloud/credentials", &env),
            PathBuf::from("/home/me/alibabacloud/credentials")
        );
        assert_eq!(expand_home("/abs/path", &env), PathBuf::from("/abs/path"));

        let env = Env::from_slice(&[("USERPROFILE", "/Users/me")]);
        assert_eq!(
            expand_home("~/creds", &env),
            PathBuf::from("/Users/me/creds")
        );
    }

    #[tokio::test]
    async fn explicit_path_is_loaded() {
        let provider = file_provider(
            &[("ALIBABA_CLOUD_CREDENTIALS_FILE", "/custom/credentials")],
            &[("/custom/credentials", ACCESS_KEY_FILE)],
        );
        let creds = provider.load().await.expect("valid profile");
        assert_eq!(
            creds,
            Some(Credentials::from(AccessKeyCredentials::new("akid", "secret")))
        );
        assert_eq!(
            provider.last_loaded_path().as_deref(),
            Some(Path::new("/custom/credentials"))
        );
    }

    #[tokio::test]
    async fn explicit_path_failures_are_fatal() {
        let missing_file = file_provider(&[("ALIBABA_CLOUD_CREDENTIALS_FILE", "/nope")], &[]);
        let err = missing_file.load().await.expect_err("file does not exist");
        assert!(err.is_configuration_error());
        assert!(format!("{}", err).contains("/nope"));

        let missing_profile = file_provider(
            &[("ALIBABA_CLOUD_CREDENTIALS_FILE", "/custom/credentials")],
            &[("/custom/credentials", "[other]\ntype = access_key\n")],
        );
        let err = missing_profile.load().await.expect_err("no default profile");
        assert!(format!("{}", err).contains("default"));

        let missing_type = file_provider(
            &[("ALIBABA_CLOUD_CREDENTIALS_FILE", "/custom/credentials")],
            &[("/custom/credentials", "[default]\naccess_key_id = akid\n")],
        );
        let err = missing_type.load().await.expect_err("no type");
        assert!(matches!(err, CredentialsError::InvalidConfiguration(_)));
    }

    #[tokio::test]
    async fn empty_explicit_path_does_not_fall_back() {
        let provider = file_provider(
            &[("ALIBABA_CLOUD_CREDENTIALS_FILE", ""), ("HOME", "/home/me")],
            &[(
                "/home/me/alibabacloud/credentials",
                "[default]\ntype = bearer_token\nbearer_token = tok\n",
            )],
        );
        let err = provider.load().await.expect_err("empty variable");
        assert!(err.is_configuration_error());
        assert!(format!("{}", err).contains("ALIBABA_CLOUD_CREDENTIALS_FILE"));
        assert_eq!(provider.last_loaded_path(), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_unicode_explicit_path_is_an_error() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        // no other test reads this variable from the real environment
        std::env::set_var(
            "ALIBABA_CLOUD_CREDENTIALS_FILE",
            OsString::from_vec(vec![b'/', 0x80, b'x']),
        );
        let provider = ProfileFileCredentialsProvider::builder()
            .configure(
                &ProviderConfig::default()
                    .with_env(Env::real())
                    .with_fs(Fs::from_slice(&[])),
            )
            .build();
        let result = provider.load().await;
        std::env::remove_var("ALIBABA_CLOUD_CREDENTIALS_FILE");
        let err = result.expect_err("non unicode variable");
        assert!(err.is_configuration_error());
        assert!(format!("{}", err).contains("not valid unicode"));
    }

    #[traced_test]
    #[tokio::test]
    async fn default_locations_are_probed_in_order() {
        let provider = file_provider(
            &[("HOME", "/home/me")],
            &[
                ("/etc/.alibabacloud/credentials", "not an ini file"),
                (
                    "/home/me/alibabacloud/credentials",
                    "[default]\ntype = bearer_token\nbearer_token = tok\n",
                ),
            ],
        );
        let creds = provider.load().await.expect("valid profile");
        assert_eq!(
            creds,
            Some(Credentials::from(BearerTokenCredentials::new("tok")))
        );
        assert_eq!(
            provider.last_loaded_path().as_deref(),
            Some(Path::new("/home/me/alibabacloud/credentials"))
        );
        assert!(logs_contain("skipping credentials file"));
    }

    #[tokio::test]
    async fn system_path_wins_over_home() {
        let provider = file_provider(
            &[("HOME", "/home/me")],
            &[
                ("/etc/.alibabacloud/credentials", ACCESS_KEY_FILE),
                (
                    "/home/me/alibabacloud/credentials",
                    "[default]\ntype = bearer_token\nbearer_token = tok\n",
                ),
            ],
        );
        let creds = provider.load().await.unwrap();
        assert_eq!(
            creds,
            Some(Credentials::from(AccessKeyCredentials::new("akid", "secret")))
        );
    }

    #[tokio::test]
    async fn nothing_found_yields_nothing() {
        let provider = file_provider(&[("HOME", "/home/me")], &[]);
        assert_eq!(provider.load().await.unwrap(), None);
        assert_eq!(provider.last_loaded_path(), None);

        let untyped = file_provider(
            &[("HOME", "/home/me")],
            &[("/home/me/alibabacloud/credentials", "[default]\naccess_key_id = akid\n")],
        );
        assert_eq!(untyped.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn named_profile() {
        let provider = ProfileFileCredentialsProvider::builder()
            .profile_name("project")
            .configure(&ProviderConfig::default().with_env(Env::from_slice(&[])).with_fs(
                Fs::from_slice(&[(
                    "/etc/.alibabacloud/credentials",
                    "[default]\ntype = bearer_token\nbearer_token = wrong\n\
                     [project]\ntype = bearer_token\nbearer_token = right\n",
                )]),
            ))
            .build();
        assert_eq!(provider.profile_name(), "project");
        assert_eq!(
            provider.load().await.unwrap(),
            Some(Credentials::from(BearerTokenCredentials::new("right")))
        );
    }
}

/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Credential profiles
//!
//! A profile is a named section of the credentials file whose `type` property selects how
//! credentials are produced. Loading a profile happens in two steps:
//!
//! 1. [`Profile::from_section`] validates the section into one of six typed variants. Unknown
//!    types and missing fields are rejected here, before any fetcher exists.
//! 2. [`ProfileResolver`](resolve::ProfileResolver) turns a validated profile into credentials,
//!    running the fetcher the variant requires.

use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;

use alibabacloud_credential_types::CredentialsError;

pub mod parser;
pub mod resolve;

pub use parser::{load_config, ProfileParseError, ProfileSet, Section};
pub use resolve::ProfileResolver;

/// Property holding the profile type discriminator
pub const TYPE_KEY: &str = "type";

/// Failure loading the credentials file or locating a profile in it
#[derive(Debug)]
#[non_exhaustive]
pub enum ProfileFileError {
    /// The file could not be read
    CouldNotReadFile {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        cause: std::io::Error,
    },
    /// The file is not a valid credentials file
    CouldNotParseProfile(ProfileParseError),
    /// The file does not contain the requested profile
    MissingProfile {
        /// Requested profile
        profile: String,
        /// File that was searched
        path: PathBuf,
    },
    /// The profile does not declare a `type`
    MissingType {
        /// Requested profile
        profile: String,
        /// File that was searched
        path: PathBuf,
    },
}

impl Display for ProfileFileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ProfileFileError::CouldNotReadFile { path, cause } => write!(
                f,
                "the credentials file ({}) could not be read: {}",
                path.display(),
                cause
            ),
            ProfileFileError::CouldNotParseProfile(err) => Display::fmt(err, f),
            ProfileFileError::MissingProfile { profile, path } => write!(
                f,
                "the credentials file ({}) does not contain the profile `{}`",
                path.display(),
                profile
            ),
            ProfileFileError::MissingType { profile, path } => write!(
                f,
                "the credentials file ({}) can not find the needed param `type` in profile `{}`",
                path.display(),
                profile
            ),
        }
    }
}

impl Error for ProfileFileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ProfileFileError::CouldNotReadFile { cause, .. } => Some(cause),
            ProfileFileError::CouldNotParseProfile(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProfileFileError> for CredentialsError {
    fn from(err: ProfileFileError) -> Self {
        CredentialsError::invalid_configuration(err.to_string())
    }
}

/// `type = access_key`
#[derive(Clone, PartialEq, Eq)]
pub struct AccessKeyProfile {
    /// Access key id
    pub access_key_id: String,
    /// Access key secret
    pub access_key_secret: String,
}

/// `type = ecs_ram_role`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcsRamRoleProfile {
    /// RAM role attached to the instance
    pub role_name: String,
}

/// `type = ram_role_arn`
#[derive(Clone, PartialEq, Eq)]
pub struct RamRoleArnProfile {
    /// Role to assume
    pub role_arn: String,
    /// Session name, generated when absent
    pub role_session_name: Option<String>,
    /// Source access key id
    pub access_key_id: String,
    /// Source access key secret
    pub access_key_secret: String,
}

/// `type = bearer_token`
#[derive(Clone, PartialEq, Eq)]
pub struct BearerTokenProfile {
    /// Bearer token
    pub bearer_token: String,
}

/// `type = rsa_key_pair`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RsaKeyPairProfile {
    /// Public key id registered with the account
    pub public_key_id: String,
    /// Path of the PEM encoded private key
    pub private_key_file: PathBuf,
    /// Requested session duration, in seconds
    pub session_period: u64,
}

/// `type = sts_token`
#[derive(Clone, PartialEq, Eq)]
pub struct StsTokenProfile {
    /// Temporary access key id
    pub access_key_id: String,
    /// Temporary access key secret
    pub access_key_secret: String,
    /// Security token
    pub security_token: String,
}

macro_rules! redacted_debug {
    ($ty:ident, $($field:ident),*) => {
        impl Debug for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($ty))
                    $(.field(stringify!($field), &self.$field))*
                    .finish_non_exhaustive()
            }
        }
    };
}

redacted_debug!(AccessKeyProfile, access_key_id);
redacted_debug!(RamRoleArnProfile, role_arn, role_session_name, access_key_id);
redacted_debug!(BearerTokenProfile,);
redacted_debug!(StsTokenProfile, access_key_id);

/// A validated credentials profile
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Profile {
    /// Static access key pair
    AccessKey(AccessKeyProfile),
    /// Role credentials from the instance metadata endpoint
    EcsRamRole(EcsRamRoleProfile),
    /// Role assumed with a source access key
    RamRoleArn(RamRoleArnProfile),
    /// Bearer token
    BearerToken(BearerTokenProfile),
    /// Session access key exchanged for an RSA key pair
    RsaKeyPair(RsaKeyPairProfile),
    /// Static session credentials
    StsToken(StsTokenProfile),
}

impl Profile {
    /// The `type` value selecting this variant
    pub fn type_name(&self) -> &'static str {
        match self {
            Profile::AccessKey(_) => "access_key",
            Profile::EcsRamRole(_) => "ecs_ram_role",
            Profile::RamRoleArn(_) => "ram_role_arn",
            Profile::BearerToken(_) => "bearer_token",
            Profile::RsaKeyPair(_) => "rsa_key_pair",
            Profile::StsToken(_) => "sts_token",
        }
    }

    /// Validate a credentials file section
    ///
    /// Fails with [`CredentialsError::UnknownProfileType`] for unrecognized `type` values and
    /// with [`CredentialsError::InvalidConfiguration`] when `type` or a field the type requires
    /// is missing or empty.
    pub fn from_section(section: &Section) -> Result<Self, CredentialsError> {
        let fields = Fields { section };
        let profile_type = fields.required(TYPE_KEY)?;
        let profile = match profile_type.as_str() {
            "access_key" => Profile::AccessKey(AccessKeyProfile {
                access_key_id: fields.required("access_key_id")?,
                access_key_secret: fields.required("access_key_secret")?,
            }),
            "ecs_ram_role" => Profile::EcsRamRole(EcsRamRoleProfile {
                role_name: fields.required("role_name")?,
            }),
            "ram_role_arn" => Profile::RamRoleArn(RamRoleArnProfile {
                role_arn: fields.required("role_arn")?,
                role_session_name: fields.optional("role_session_name"),
                access_key_id: fields.required("access_key_id")?,
                access_key_secret: fields.required("access_key_secret")?,
            }),
            "bearer_token" => Profile::BearerToken(BearerTokenProfile {
                bearer_token: fields.required("bearer_token")?,
            }),
            "rsa_key_pair" => Profile::RsaKeyPair(RsaKeyPairProfile {
                public_key_id: fields.required("public_key_id")?,
                private_key_file: fields.required("private_key_file")?.into(),
                session_period: fields.session_period()?,
            }),
            "sts_token" => Profile::StsToken(StsTokenProfile {
                access_key_id: fields.required("access_key_id")?,
                access_key_secret: fields.required("access_key_secret")?,
                security_token: fields.required("security_token")?,
            }),
            _ => return Err(CredentialsError::UnknownProfileType(profile_type)),
        };
        Ok(profile)
    }
}

struct Fields<'a> {
    section: &'a Section,
}

impl Fields<'_> {
    fn optional(&self, key: &str) -> Option<String> {
        self.section
            .get(key)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string)
    }

    fn required(&self, key: &str) -> Result<String, CredentialsError> {
        self.optional(key).ok_or_else(|| {
            CredentialsError::invalid_configuration(format!(
                "profile `{}` is missing required field `{}`",
                self.section.name(),
                key
            ))
        })
    }

    fn session_period(&self) -> Result<u64, CredentialsError> {
        let raw = self.required("session_period")?;
        raw.parse().map_err(|_| {
            CredentialsError::invalid_configuration(format!(
                "profile `{}` has an invalid session_period `{}`: expected a number of seconds",
                self.section.name(),
                raw
            ))
        })
    }
}

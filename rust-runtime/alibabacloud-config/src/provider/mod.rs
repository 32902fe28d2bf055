/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Individual credential providers and the chain combining them
//!
//! Every provider answers `Ok(None)` when its source is absent and fails only when the source is
//! present but unusable.

pub mod chain;
pub mod ecs_ram_role;
pub mod environment;
pub mod profile_file;
pub mod static_provider;

pub use chain::ChainProvider;
pub use ecs_ram_role::EcsRamRoleCredentialsProvider;
pub use environment::EnvironmentVariableCredentialsProvider;
pub use profile_file::ProfileFileCredentialsProvider;
pub use static_provider::StaticCredentialsProvider;

/// Access key id read by [`EnvironmentVariableCredentialsProvider`]
pub const ENV_VAR_ACCESS_KEY_ID: &str = "ALIBABA_CLOUD_ACCESS_KEY_ID";
/// Access key secret read by [`EnvironmentVariableCredentialsProvider`]
pub const ENV_VAR_ACCESS_KEY_SECRET: &str = "ALIBABA_CLOUD_ACCESS_KEY_SECRET";
/// Explicit credentials file path read by [`ProfileFileCredentialsProvider`]
pub const ENV_VAR_CREDENTIALS_FILE: &str = "ALIBABA_CLOUD_CREDENTIALS_FILE";
/// RAM role name read by [`EcsRamRoleCredentialsProvider`]
pub const ENV_VAR_ECS_METADATA: &str = "ALIBABA_CLOUD_ECS_METADATA";

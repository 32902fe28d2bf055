/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Abstractions for testing code that interacts with the operating system
//!
//! Credential providers read environment variables and files. These shims let tests supply both
//! without touching the real process environment or filesystem.

use std::collections::HashMap;
use std::env::VarError;
use std::ffi::OsString;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File system abstraction
///
/// Simple abstraction enabling in-memory mocking of the file system
///
/// # Examples
/// Construct a file system which delegates to `std::fs`:
/// ```rust
/// let fs = alibabacloud_config::os_shim_internal::Fs::real();
/// ```
///
/// Construct an in-memory file system for testing:
/// ```rust
/// let fs = alibabacloud_config::os_shim_internal::Fs::from_slice(&[
///     ("/etc/.alibabacloud/credentials", "[default]\ntype = access_key"),
/// ]);
/// ```
#[derive(Clone, Debug)]
pub struct Fs(fs::Inner);

impl Default for Fs {
    fn default() -> Self {
        Fs::real()
    }
}

impl Fs {
    /// Delegate to `std::fs`
    pub fn real() -> Self {
        Fs(fs::Inner::Real)
    }

    /// In-memory file system keyed by path
    pub fn from_raw_map(fs: HashMap<OsString, Vec<u8>>) -> Self {
        Fs(fs::Inner::Fake(Arc::new(fs)))
    }

    /// In-memory file system built from `(path, contents)` pairs
    pub fn from_slice<'a>(files: &[(&'a str, &'a str)]) -> Self {
        let fs: HashMap<OsString, Vec<u8>> = files
            .iter()
            .map(|(k, v)| (OsString::from(k), v.as_bytes().to_vec()))
            .collect();
        Self::from_raw_map(fs)
    }

    /// Create a test filesystem rooted in real files
    ///
    /// Reads of `namespaced_to/some/path` are served from `test_directory/some/path`. Reads
    /// outside of `namespaced_to` fail with `NotFound`.
    ///
    /// # Examples
    /// ```rust
    /// use alibabacloud_config::os_shim_internal::Fs;
    /// // reading `/home/me/alibabacloud/credentials` will read `test-data/home/alibabacloud/credentials`
    /// let fs = Fs::from_test_dir("test-data/home", "/home/me");
    /// ```
    pub fn from_test_dir(
        test_directory: impl Into<PathBuf>,
        namespaced_to: impl Into<PathBuf>,
    ) -> Self {
        Self(fs::Inner::NamespacedFs {
            real_path: test_directory.into(),
            namespaced_to: namespaced_to.into(),
        })
    }

    /// Read the entire contents of a file
    pub fn read_to_end(&self, path: impl AsRef<Path>) -> std::io::Result<Vec<u8>> {
        use fs::Inner;
        let path = path.as_ref();
        match &self.0 {
            Inner::Real => std::fs::read(path),
            Inner::Fake(fs) => fs.get(path.as_os_str()).cloned().ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{} not found", path.display()),
                )
            }),
            Inner::NamespacedFs {
                real_path,
                namespaced_to,
            } => {
                let actual_path = path.strip_prefix(namespaced_to).map_err(|_| {
                    std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("{} is outside of {}", path.display(), namespaced_to.display()),
                    )
                })?;
                std::fs::read(real_path.join(actual_path))
            }
        }
    }
}

mod fs {
    use std::collections::HashMap;
    use std::ffi::OsString;
    use std::path::PathBuf;
    use std::sync::Arc;

    #[derive(Clone, Debug)]
    pub(super) enum Inner {
        Real,
        Fake(Arc<HashMap<OsString, Vec<u8>>>),
        NamespacedFs {
            real_path: PathBuf,
            namespaced_to: PathBuf,
        },
    }
}

/// Environment variable abstraction
///
/// Environment variables are global to a process, and, as such, are difficult to test with a
/// multi-threaded test runner like Rust's. This enables loading environment variables either
/// from the actual process environment ([`std::env::var`]) or from a hash map.
///
/// Process environments are cheap to clone:
/// - Faked process environments are wrapped in an internal Arc
/// - Real process environments are pointer-sized
#[derive(Clone, Debug)]
pub struct Env(env::Inner);

impl Default for Env {
    fn default() -> Self {
        Self::real()
    }
}

impl Env {
    /// Retrieve a value for the given `k` and return `VarError` if that key is not present.
    pub fn get(&self, k: &str) -> Result<String, VarError> {
        use env::Inner;
        match &self.0 {
            Inner::Real => std::env::var(k),
            Inner::Fake(map) => map.get(k).cloned().ok_or(VarError::NotPresent),
        }
    }

    /// Create a fake process environment from a slice of tuples.
    ///
    /// # Examples
    /// ```rust
    /// use alibabacloud_config::os_shim_internal::Env;
    /// let mock_env = Env::from_slice(&[
    ///     ("ALIBABA_CLOUD_ACCESS_KEY_ID", "akid"),
    ///     ("ALIBABA_CLOUD_ACCESS_KEY_SECRET", "secret"),
    /// ]);
    /// assert_eq!(mock_env.get("ALIBABA_CLOUD_ACCESS_KEY_ID").unwrap(), "akid");
    /// ```
    pub fn from_slice<'a>(vars: &[(&'a str, &'a str)]) -> Self {
        let map: HashMap<_, _> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::from(map)
    }

    /// Create a process environment that uses the real process environment
    ///
    /// Calls will be delegated to [`std::env::var`].
    pub fn real() -> Self {
        Self(env::Inner::Real)
    }
}

impl From<HashMap<String, String>> for Env {
    fn from(hash_map: HashMap<String, String>) -> Self {
        Self(env::Inner::Fake(Arc::new(hash_map)))
    }
}

mod env {
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Clone, Debug)]
    pub(super) enum Inner {
        Real,
        Fake(Arc<HashMap<String, String>>),
    }
}

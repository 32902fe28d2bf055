/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Expiring credential fetchers
//!
//! A fetcher exchanges a longer-lived secret for shorter-lived credentials and remembers when it
//! last did so. Each fetcher owns its refresh state exclusively; sharing one between concurrent
//! callers requires external locking (see [`CachedFetcher`], which providers keep behind a
//! mutex).
//!
//! The shared contract is [`Fetcher::get_profile`]:
//! - `Ok(Some(output))`: the refresh window elapsed and fresh credentials were fetched
//! - `Ok(None)`: the previously returned credentials are still valid; nothing was fetched

use std::fmt::Debug;
use std::time::{Duration, SystemTime};

use alibabacloud_credential_types::CredentialsError;

use crate::transport::BoxFuture;

pub mod instance_metadata;
pub mod ram_role_arn;
pub mod rsa_key_pair;

pub use instance_metadata::InstanceMetadataFetcher;
pub use ram_role_arn::RamRoleArnFetcher;
pub use rsa_key_pair::RsaKeyPairFetcher;

/// Fraction of the validity window after which credentials are refreshed
pub const REFRESH_SCALE: f64 = 0.8;

/// Upstream error codes that mean the signing credential itself is invalid
pub(crate) const INVALID_CREDENTIAL_CODES: &[&str] =
    &["InvalidAccessKeyId.NotFound", "SignatureDoesNotMatch"];

/// Last refresh time and validity horizon of a fetcher
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshState {
    last_update: Option<SystemTime>,
    horizon: Duration,
}

impl RefreshState {
    /// State of a fetcher that has never refreshed
    pub fn new(horizon: Duration) -> Self {
        RefreshState {
            last_update: None,
            horizon,
        }
    }

    /// True when more than [`REFRESH_SCALE`] of the horizon elapsed since the last refresh
    ///
    /// A fetcher that never refreshed is always expired, and so is one whose clock moved
    /// backwards past its last refresh.
    pub fn is_expired(&self, now: SystemTime) -> bool {
        match self.last_update {
            None => true,
            Some(last_update) => match now.duration_since(last_update) {
                Ok(elapsed) => elapsed > self.horizon.mul_f64(REFRESH_SCALE),
                Err(_) => true,
            },
        }
    }

    /// Record a successful refresh at `now`, valid for `horizon`
    pub fn refreshed(&mut self, now: SystemTime, horizon: Duration) {
        self.last_update = Some(now);
        self.horizon = horizon;
    }

    /// Time of the last successful refresh
    pub fn last_update(&self) -> Option<SystemTime> {
        self.last_update
    }

    /// Validity window of the last refresh
    pub fn horizon(&self) -> Duration {
        self.horizon
    }
}

/// A stateful credential exchange
pub trait Fetcher: Debug + Send + Sync {
    /// Credentials produced by a refresh
    type Output: Clone + Debug + Send + Sync;

    /// True when the next [`get_profile`](Fetcher::get_profile) call will perform an exchange
    fn is_expired(&self) -> bool;

    /// Refresh if due, otherwise return `Ok(None)`
    ///
    /// Exchange failures are returned as-is; fetchers never retry.
    fn get_profile(&mut self) -> BoxFuture<'_, Result<Option<Self::Output>, CredentialsError>>;
}

/// A fetcher paired with the last credentials it produced
///
/// Turns the "unchanged" answer of [`Fetcher::get_profile`] back into the cached value.
#[derive(Debug)]
pub struct CachedFetcher<F: Fetcher> {
    fetcher: F,
    last: Option<F::Output>,
}

impl<F: Fetcher> CachedFetcher<F> {
    /// Wrap a fetcher with an empty cache
    pub fn new(fetcher: F) -> Self {
        CachedFetcher {
            fetcher,
            last: None,
        }
    }

    /// The wrapped fetcher
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Return fresh credentials when a refresh is due, otherwise the cached ones
    pub async fn credentials(&mut self) -> Result<F::Output, CredentialsError> {
        if let Some(fresh) = self.fetcher.get_profile().await? {
            self.last = Some(fresh.clone());
            return Ok(fresh);
        }
        tracing::trace!("credentials still valid, reusing cached value");
        self.last.clone().ok_or_else(|| {
            CredentialsError::provider_error(
                "fetcher reported unchanged credentials before any successful refresh",
            )
        })
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, UNIX_EPOCH};

    use alibabacloud_credential_types::CredentialsError;

    use crate::fetcher::{CachedFetcher, Fetcher, RefreshState};
    use crate::transport::BoxFuture;

    #[test]
    fn never_refreshed_state_is_expired() {
        let state = RefreshState::new(Duration::from_secs(3600));
        assert!(state.is_expired(UNIX_EPOCH));
        assert!(state.is_expired(UNIX_EPOCH + Duration::from_secs(1_600_000_000)));
    }

    #[test]
    fn refresh_happens_at_eighty_percent_of_the_window() {
        let start = UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        let mut state = RefreshState::new(Duration::ZERO);
        state.refreshed(start, Duration::from_secs(1000));
        assert!(!state.is_expired(start));
        assert!(!state.is_expired(start + Duration::from_secs(800)));
        assert!(state.is_expired(start + Duration::from_secs(801)));
        assert_eq!(state.last_update(), Some(start));
        assert_eq!(state.horizon(), Duration::from_secs(1000));
    }

    #[test]
    fn clock_moving_backwards_forces_refresh() {
        let start = UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        let mut state = RefreshState::new(Duration::ZERO);
        state.refreshed(start, Duration::from_secs(1000));
        assert!(state.is_expired(start - Duration::from_secs(1)));
    }

    #[derive(Debug)]
    struct CountingFetcher {
        calls: Arc<AtomicUsize>,
        fresh: bool,
    }

    impl Fetcher for CountingFetcher {
        type Output = String;

        fn is_expired(&self) -> bool {
            self.fresh
        }

        fn get_profile(&mut self) -> BoxFuture<'_, Result<Option<String>, CredentialsError>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let output = if self.fresh {
                Some(format!("credentials-{}", call))
            } else {
                None
            };
            self.fresh = false;
            Box::pin(std::future::ready(Ok(output)))
        }
    }

    #[tokio::test]
    async fn cached_fetcher_reuses_last_output() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut cached = CachedFetcher::new(CountingFetcher {
            calls: calls.clone(),
            fresh: true,
        });
        assert_eq!(cached.credentials().await.unwrap(), "credentials-0");
        assert_eq!(cached.credentials().await.unwrap(), "credentials-0");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unchanged_without_cache_is_an_error() {
        let mut cached = CachedFetcher::new(CountingFetcher {
            calls: Arc::new(AtomicUsize::new(0)),
            fresh: false,
        });
        let err = cached.credentials().await.expect_err("nothing cached");
        assert!(matches!(err, CredentialsError::ProviderError(_)));
    }
}

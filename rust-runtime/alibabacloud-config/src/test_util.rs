/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Test doubles for the external collaborators: clock, signed transport, metadata endpoint

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use alibabacloud_credential_types::provider::BoxError;
use bytes::Bytes;

use crate::metadata_client::MetadataClient;
use crate::time_source::TimeSource;
use crate::transport::{BoxFuture, ExchangeError, ExchangeRequest, SignedTransport, SigningIdentity};

/// Clock that only moves when told to
#[derive(Clone, Debug)]
pub struct ManualTimeSource {
    now: Arc<Mutex<SystemTime>>,
}

impl ManualTimeSource {
    /// Clock frozen at `start`
    pub fn new(start: SystemTime) -> Self {
        ManualTimeSource {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }

    /// Jump to an absolute time
    pub fn set_time(&self, time: SystemTime) {
        *self.now.lock().unwrap() = time;
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> SystemTime {
        *self.now.lock().unwrap()
    }
}

/// Transport replaying canned responses in order and recording every request
///
/// Once the canned responses run out, calls fail with a transport error.
#[derive(Clone, Debug, Default)]
pub struct CapturingTransport {
    responses: Arc<Mutex<VecDeque<Result<Bytes, ExchangeError>>>>,
    requests: Arc<Mutex<Vec<(ExchangeRequest, SigningIdentity)>>>,
}

impl CapturingTransport {
    /// Transport answering with `responses`, in order
    pub fn new(responses: Vec<Result<Bytes, ExchangeError>>) -> Self {
        CapturingTransport {
            responses: Arc::new(Mutex::new(responses.into())),
            requests: Default::default(),
        }
    }

    /// Transport answering every request with the given JSON bodies, in order
    pub fn with_bodies(bodies: &[&str]) -> Self {
        Self::new(
            bodies
                .iter()
                .map(|body| Ok(Bytes::copy_from_slice(body.as_bytes())))
                .collect(),
        )
    }

    /// Drain the recorded requests
    pub fn take_requests(&self) -> Vec<(ExchangeRequest, SigningIdentity)> {
        std::mem::take(&mut *self.requests.lock().unwrap())
    }

    /// Number of requests recorded since the last [`take_requests`](Self::take_requests)
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl SignedTransport for CapturingTransport {
    fn call<'a>(
        &'a self,
        request: ExchangeRequest,
        identity: &'a SigningIdentity,
    ) -> BoxFuture<'a, Result<Bytes, ExchangeError>> {
        self.requests
            .lock()
            .unwrap()
            .push((request, identity.clone()));
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ExchangeError::transport("no canned response left")));
        Box::pin(std::future::ready(response))
    }
}

/// Metadata client serving canned documents in order and recording requested paths
#[derive(Clone, Debug, Default)]
pub struct StaticMetadataClient {
    documents: Arc<Mutex<VecDeque<Result<String, String>>>>,
    paths: Arc<Mutex<Vec<String>>>,
}

impl StaticMetadataClient {
    /// Client answering successive requests with `documents`
    pub fn new(documents: &[&str]) -> Self {
        StaticMetadataClient {
            documents: Arc::new(Mutex::new(
                documents.iter().map(|doc| Ok(doc.to_string())).collect(),
            )),
            paths: Default::default(),
        }
    }

    /// Client whose first request fails with `message`
    pub fn failing(message: &str) -> Self {
        StaticMetadataClient {
            documents: Arc::new(Mutex::new(vec![Err(message.to_string())].into())),
            paths: Default::default(),
        }
    }

    /// Paths requested so far
    pub fn requested_paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

impl MetadataClient for StaticMetadataClient {
    fn get<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, BoxError>> {
        self.paths.lock().unwrap().push(path.to_string());
        let next = self.documents.lock().unwrap().pop_front();
        let document: Result<String, BoxError> = match next {
            Some(Ok(document)) => Ok(document),
            Some(Err(message)) => Err(message.into()),
            None => Err("no canned metadata document left".into()),
        };
        Box::pin(std::future::ready(document))
    }
}

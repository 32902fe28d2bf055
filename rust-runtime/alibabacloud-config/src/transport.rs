/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Signed request transport used for credential exchanges
//!
//! Exchanging a key pair for session credentials requires a signed call to the STS control
//! plane. Request signing and the HTTP client live outside of this crate: callers plug them in
//! by implementing [`SignedTransport`]. This module only describes *what* to call.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use alibabacloud_credential_types::provider::BoxError;
use alibabacloud_credential_types::{AccessKeyCredentials, CredentialsError};
use bytes::Bytes;
use http::Method;
use zeroize::Zeroize;

/// Boxed future returned by the external collaborator traits
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

const STS_PRODUCT: &str = "Sts";
const STS_VERSION: &str = "2015-04-01";

/// Wire protocol for an exchange request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Protocol {
    /// Plain HTTP
    Http,
    /// HTTP over TLS
    Https,
}

/// Declarative description of a control plane API call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeRequest {
    product: &'static str,
    version: &'static str,
    action: &'static str,
    method: Method,
    protocol: Protocol,
    region: Cow<'static, str>,
    params: Vec<(&'static str, String)>,
}

impl ExchangeRequest {
    /// A `GET` request against the STS API over HTTPS
    pub fn sts(action: &'static str) -> Self {
        ExchangeRequest {
            product: STS_PRODUCT,
            version: STS_VERSION,
            action,
            method: Method::GET,
            protocol: Protocol::Https,
            region: Cow::Borrowed(""),
            params: Vec::new(),
        }
    }

    /// Override the HTTP method
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Override the protocol
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Set the region the request is bound to
    pub fn region(mut self, region: impl Into<Cow<'static, str>>) -> Self {
        self.region = region.into();
        self
    }

    /// Append a query parameter
    pub fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push((name, value.into()));
        self
    }

    /// API product, eg. `Sts`
    pub fn product(&self) -> &str {
        self.product
    }

    /// API version, eg. `2015-04-01`
    pub fn version(&self) -> &str {
        self.version
    }

    /// API action, eg. `AssumeRole`
    pub fn action(&self) -> &str {
        self.action
    }

    /// HTTP method
    pub fn http_method(&self) -> &Method {
        &self.method
    }

    /// Wire protocol
    pub fn wire_protocol(&self) -> Protocol {
        self.protocol
    }

    /// Region the request is bound to
    pub fn region_id(&self) -> &str {
        &self.region
    }

    /// Query parameters in insertion order
    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }

    /// Returns the value of the first parameter called `name`
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// RSA key pair registered with the account
#[derive(Clone, PartialEq, Eq)]
pub struct RsaKeyPair {
    public_key_id: String,
    private_key: String,
}

impl RsaKeyPair {
    /// Create a key pair from the public key id and the PEM encoded private key
    pub fn new(public_key_id: impl Into<String>, private_key: impl Into<String>) -> Self {
        RsaKeyPair {
            public_key_id: public_key_id.into(),
            private_key: private_key.into(),
        }
    }

    /// Public key id
    pub fn public_key_id(&self) -> &str {
        &self.public_key_id
    }

    /// PEM encoded private key
    pub fn private_key(&self) -> &str {
        &self.private_key
    }
}

impl Debug for RsaKeyPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKeyPair")
            .field("public_key_id", &self.public_key_id)
            .field("private_key", &"** redacted **")
            .finish()
    }
}

impl Drop for RsaKeyPair {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

/// Identity used to sign an exchange request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SigningIdentity {
    /// Sign with an access key pair
    AccessKey(AccessKeyCredentials),
    /// Sign with an RSA key pair
    RsaKeyPair(RsaKeyPair),
}

/// Failure returned by a [`SignedTransport`]
#[derive(Debug)]
#[non_exhaustive]
pub enum ExchangeError {
    /// The service answered with an error code
    Service {
        /// Upstream error code, eg. `SignatureDoesNotMatch`
        code: String,
        /// Upstream error message
        message: String,
        /// Upstream request id
        request_id: Option<String>,
    },
    /// The request never produced a service response
    Transport(BoxError),
}

impl ExchangeError {
    /// Construct a [`Service`](ExchangeError::Service) error
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        ExchangeError::Service {
            code: code.into(),
            message: message.into(),
            request_id: None,
        }
    }

    /// Construct a [`Transport`](ExchangeError::Transport) error
    pub fn transport(cause: impl Into<BoxError>) -> Self {
        ExchangeError::Transport(cause.into())
    }

    /// Upstream error code for service errors
    pub fn code(&self) -> Option<&str> {
        match self {
            ExchangeError::Service { code, .. } => Some(code),
            ExchangeError::Transport(_) => None,
        }
    }
}

impl Display for ExchangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeError::Service { code, message, .. } => {
                write!(f, "service error {}: {}", code, message)
            }
            ExchangeError::Transport(err) => write!(f, "transport error: {}", err),
        }
    }
}

impl Error for ExchangeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExchangeError::Transport(err) => Some(err.as_ref() as _),
            ExchangeError::Service { .. } => None,
        }
    }
}

impl From<ExchangeError> for CredentialsError {
    fn from(err: ExchangeError) -> Self {
        match err {
            ExchangeError::Service {
                code,
                message,
                request_id,
            } => CredentialsError::ServiceError {
                code,
                message,
                request_id,
            },
            ExchangeError::Transport(cause) => CredentialsError::ProviderError(cause),
        }
    }
}

/// Executes signed control plane requests
///
/// Implementations sign `request` with `identity`, send it, and return the raw response body on
/// success. Non-success responses must be reported as [`ExchangeError::Service`] carrying the
/// upstream code and message. Timeouts and retries are the implementation's concern.
pub trait SignedTransport: Debug + Send + Sync {
    /// Send a signed request
    fn call<'a>(
        &'a self,
        request: ExchangeRequest,
        identity: &'a SigningIdentity,
    ) -> BoxFuture<'a, Result<Bytes, ExchangeError>>;
}

/// Cheaply cloneable handle to a [`SignedTransport`]
#[derive(Clone, Debug)]
pub struct SharedTransport(Arc<dyn SignedTransport>);

impl SharedTransport {
    /// Wrap a transport
    pub fn new(transport: impl SignedTransport + 'static) -> Self {
        SharedTransport(Arc::new(transport))
    }
}

impl SignedTransport for SharedTransport {
    fn call<'a>(
        &'a self,
        request: ExchangeRequest,
        identity: &'a SigningIdentity,
    ) -> BoxFuture<'a, Result<Bytes, ExchangeError>> {
        self.0.call(request, identity)
    }
}

/// STS client bound to one signing identity and one region
///
/// Fetchers build a fresh client for every exchange so the identity and region never leak
/// between credential sources.
#[derive(Debug)]
pub(crate) struct StsClient {
    transport: SharedTransport,
    identity: SigningIdentity,
    region: &'static str,
}

impl StsClient {
    pub(crate) fn new(
        transport: SharedTransport,
        identity: SigningIdentity,
        region: &'static str,
    ) -> Self {
        StsClient {
            transport,
            identity,
            region,
        }
    }

    pub(crate) async fn call(&self, request: ExchangeRequest) -> Result<Bytes, ExchangeError> {
        let request = request.region(self.region);
        tracing::debug!(
            action = request.action(),
            region = self.region,
            "sending credential exchange request"
        );
        self.transport.call(request, &self.identity).await
    }
}

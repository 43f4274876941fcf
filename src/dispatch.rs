//! Transmission of signed requests as form POSTs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, info, warn};

use crate::core::{Error, Result};
use crate::request::MwsRequest;
use crate::signer::SigningContext;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A fully built POST, ready for the wire
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub url: Url,
    pub headers: HeaderMap,
    pub body: String,
}

/// Sends a POST and drains the response body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, request: OutgoingRequest) -> Result<Vec<u8>>;
}

/// `reqwest`-backed transport
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration, user_agent: Option<&str>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(timeout);
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent);
        }
        let client = builder.build().map_err(Error::Transport)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(&self, request: OutgoingRequest) -> Result<Vec<u8>> {
        let resp = self
            .client
            .post(request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            warn!("Non-success response status: {}", status);
        } else {
            debug!("Response status: {}", status);
        }

        let body = resp.bytes().await.map_err(Error::ResponseRead)?;
        Ok(body.to_vec())
    }
}

/// Serializes signed requests and hands them to a [`Transport`].
pub struct RequestDispatcher {
    context: SigningContext,
    transport: Arc<dyn Transport>,
}

impl RequestDispatcher {
    pub fn new(context: SigningContext, transport: Arc<dyn Transport>) -> Self {
        Self { context, transport }
    }

    pub fn context(&self) -> &SigningContext {
        &self.context
    }

    /// Builds the wire request. Fails with [`Error::UnsignedRequest`] unless
    /// the request is signed, and with [`Error::ContextMismatch`] when the
    /// signature covers another endpoint than this dispatcher's.
    pub fn prepare(&self, request: &MwsRequest) -> Result<OutgoingRequest> {
        let (host, path) = request.signed_for().ok_or(Error::UnsignedRequest)?;
        if host != self.context.host() || path != self.context.path() {
            return Err(Error::ContextMismatch {
                signed_for: format!("{}{}", host, path),
                dispatch_to: format!("{}{}", self.context.host(), self.context.path()),
            });
        }
        let body = request.signed_body().ok_or(Error::UnsignedRequest)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));

        Ok(OutgoingRequest {
            url: self.context.endpoint().clone(),
            headers,
            body,
        })
    }

    /// Sends a signed request and returns the raw response body.
    ///
    /// The signed check happens before the transport is touched. Transport
    /// and read failures are passed through unchanged; nothing is retried.
    pub async fn send(&self, request: &MwsRequest) -> Result<Vec<u8>> {
        let outgoing = self.prepare(request)?;
        info!(
            "POST {} ({} params, {} bytes)",
            outgoing.url,
            request.params().len(),
            outgoing.body.len()
        );
        self.transport.post(outgoing).await
    }
}

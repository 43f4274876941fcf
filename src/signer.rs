//! Signature version 2: string-to-sign construction and HMAC-SHA256 signing

use std::fmt;
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use reqwest::Url;
use sha2::Sha256;
use tracing::debug;

use crate::core::{Clock, Error, Result};
use crate::params::ParameterSet;

/// HTTP method covered by the signature. Requests are always form POSTs.
pub const SIGNED_METHOD: &str = "POST";
pub const TIMESTAMP_PARAM: &str = "Timestamp";
pub const SIGNATURE_PARAM: &str = "Signature";

pub trait Signer: Send + Sync {
    fn sign(&self, payload: &[u8]) -> Vec<u8>;
}

/// HMAC-SHA256 keyed by the UTF-8 bytes of the secret key
pub struct HmacSha256Signer {
    secret: Arc<str>,
}

impl HmacSha256Signer {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self { secret: secret.into() }
    }

    /// Base64 (standard alphabet, padded) of the raw MAC
    pub fn sign_base64(&self, message: &str) -> String {
        BASE64.encode(self.sign(message.as_bytes()))
    }
}

impl Signer for HmacSha256Signer {
    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        type HmacSha256 = Hmac<Sha256>;

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");

        mac.update(payload);

        mac.finalize().into_bytes().to_vec()
    }
}

/// Where and with which credential a request is authenticated.
///
/// Host and path are validated on construction so a malformed endpoint is
/// rejected before any URL is handed to a transport. Clones share the
/// secret; the signer never mutates a context.
#[derive(Clone)]
pub struct SigningContext {
    host: String,
    path: String,
    secret: Arc<str>,
    endpoint: Url,
}

impl SigningContext {
    /// Precondition: `secret` is non-empty.
    pub fn new(
        host: impl Into<String>,
        path: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self> {
        let host = host.into();
        let path = path.into();
        let secret: String = secret.into();
        debug_assert!(!secret.is_empty(), "signing secret must not be empty");

        validate_host(&host)?;
        validate_path(&path)?;
        let endpoint = Url::parse(&format!("https://{}{}", host, path))
            .map_err(|e| Error::Endpoint(format!("{}{}: {}", host, path, e)))?;
        ensure_unaltered(&endpoint, &host, &path)?;

        Ok(Self {
            host,
            path,
            secret: secret.into(),
            endpoint,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// `https://{host}{path}`
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn signer(&self) -> HmacSha256Signer {
        HmacSha256Signer::new(Arc::clone(&self.secret))
    }
}

impl fmt::Debug for SigningContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningContext")
            .field("host", &self.host)
            .field("path", &self.path)
            .field("secret", &"** redacted **")
            .finish()
    }
}

fn validate_host(host: &str) -> Result<()> {
    if host.is_empty() {
        return Err(Error::Endpoint("host is empty".to_string()));
    }
    if host.contains("://") {
        return Err(Error::Endpoint(format!("host must not carry a scheme: {}", host)));
    }
    if let Some(c) = host
        .chars()
        .find(|&c| matches!(c, '/' | '?' | '#' | '@') || c.is_whitespace())
    {
        return Err(Error::Endpoint(format!("host contains {:?}: {}", c, host)));
    }
    Ok(())
}

fn validate_path(path: &str) -> Result<()> {
    if !path.starts_with('/') {
        return Err(Error::Endpoint(format!("path must start with '/': {:?}", path)));
    }
    if let Some(c) = path
        .chars()
        .find(|&c| matches!(c, '?' | '#') || c.is_whitespace())
    {
        return Err(Error::Endpoint(format!("path contains {:?}: {}", c, path)));
    }
    Ok(())
}

/// The signed host and path must be exactly what the URL sends. URL parsing
/// lowercases hosts, drops default ports, resolves dot segments, turns `\`
/// into `/` and percent-encodes non-ASCII; any such rewrite is rejected.
fn ensure_unaltered(endpoint: &Url, host: &str, path: &str) -> Result<()> {
    let authority = match (endpoint.host_str(), endpoint.port()) {
        (Some(h), Some(port)) => format!("{}:{}", h, port),
        (Some(h), None) => h.to_string(),
        (None, _) => String::new(),
    };
    if authority != host {
        return Err(Error::Endpoint(format!(
            "host {:?} would be sent as {:?}",
            host, authority
        )));
    }
    if endpoint.path() != path {
        return Err(Error::Endpoint(format!(
            "path {:?} would be sent as {:?}",
            path,
            endpoint.path()
        )));
    }
    Ok(())
}

/// `POST\n{host}\n{path}\n{canonical parameters}`
pub fn string_to_sign(host: &str, path: &str, params: &ParameterSet) -> String {
    let encoded = params.encode();
    let mut out =
        String::with_capacity(SIGNED_METHOD.len() + host.len() + path.len() + encoded.len() + 3);
    out.push_str(SIGNED_METHOD);
    out.push('\n');
    out.push_str(host);
    out.push('\n');
    out.push_str(path);
    out.push('\n');
    out.push_str(&encoded);
    out
}

/// Outcome of one signing pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub timestamp: String,
    pub value: String,
}

/// Stamps and signs parameter sets using an injected clock.
#[derive(Clone)]
pub struct RequestSigner {
    clock: Arc<dyn Clock>,
}

impl RequestSigner {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Sets `Timestamp`, signs everything except a prior `Signature`, then
    /// sets `Signature`. The timestamp is read from the clock exactly once.
    pub fn sign(&self, params: &mut ParameterSet, context: &SigningContext) -> Signature {
        let timestamp = self.clock.now();
        params.set(TIMESTAMP_PARAM, timestamp.clone());
        params.remove(SIGNATURE_PARAM);

        let payload = string_to_sign(context.host(), context.path(), params);
        debug!(
            host = context.host(),
            path = context.path(),
            params = params.len(),
            bytes = payload.len(),
            "Built string to sign"
        );

        let value = context.signer().sign_base64(&payload);
        params.set(SIGNATURE_PARAM, value.clone());

        Signature { timestamp, value }
    }
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner").finish_non_exhaustive()
    }
}

//! Per-request parameters plus the unsigned/signed state machine

use tracing::debug;

use crate::params::ParameterSet;
use crate::signer::{RequestSigner, SIGNATURE_PARAM, Signature, SigningContext};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SigningState {
    /// Parameters may change freely; transmission is refused
    #[default]
    Unsigned,
    /// `Timestamp` and `Signature` in the parameters equal these fields.
    /// `host` and `path` name the endpoint the signature covers.
    Signed {
        timestamp: String,
        signature: String,
        host: String,
        path: String,
    },
}

/// One outgoing request.
///
/// The parameter set is only reachable mutably through this type, and every
/// mutation drops an existing signature: the stale `Signature` parameter is
/// removed and the state falls back to [`SigningState::Unsigned`].
#[derive(Debug, Clone, Default)]
pub struct MwsRequest {
    params: ParameterSet,
    state: SigningState,
}

impl MwsRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_params(params: ParameterSet) -> Self {
        Self {
            params,
            state: SigningState::Unsigned,
        }
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn state(&self) -> &SigningState {
        &self.state
    }

    pub fn is_signed(&self) -> bool {
        matches!(self.state, SigningState::Signed { .. })
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.invalidate();
        self.params.set(name, value);
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.invalidate();
        self.params.remove(name)
    }

    /// Adds several parameters at once; the request becomes unsigned.
    pub fn augment<I, K, V>(&mut self, params: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.invalidate();
        self.params.extend(params);
    }

    /// Stamps and signs the current parameters. Re-signing a signed request
    /// refreshes both the timestamp and the signature.
    pub fn sign(&mut self, signer: &RequestSigner, context: &SigningContext) -> Signature {
        let signature = signer.sign(&mut self.params, context);
        debug!(timestamp = %signature.timestamp, "Request signed");
        self.state = SigningState::Signed {
            timestamp: signature.timestamp.clone(),
            signature: signature.value.clone(),
            host: context.host().to_string(),
            path: context.path().to_string(),
        };
        signature
    }

    /// Host and path the current signature covers, `None` while unsigned.
    pub fn signed_for(&self) -> Option<(&str, &str)> {
        match &self.state {
            SigningState::Signed { host, path, .. } => Some((host.as_str(), path.as_str())),
            SigningState::Unsigned => None,
        }
    }

    /// Canonical body for transmission, `None` while unsigned.
    pub fn signed_body(&self) -> Option<String> {
        self.is_signed().then(|| self.params.encode())
    }

    fn invalidate(&mut self) {
        if self.is_signed() {
            debug!("Parameters changed after signing, dropping signature");
            self.params.remove(SIGNATURE_PARAM);
            self.state = SigningState::Unsigned;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FixedClock;
    use std::sync::Arc;

    fn fixtures() -> (RequestSigner, SigningContext) {
        (
            RequestSigner::new(Arc::new(FixedClock::new("2021-01-01T00:00:00Z"))),
            SigningContext::new("example.com", "/Op", "secret").unwrap(),
        )
    }

    #[test]
    fn test_new_request_is_unsigned() {
        let request = MwsRequest::new();
        assert_eq!(request.state(), &SigningState::Unsigned);
        assert!(request.signed_body().is_none());
    }

    #[test]
    fn test_sign_transitions_to_signed() {
        let (signer, context) = fixtures();
        let mut request = MwsRequest::new();
        request.set("Action", "Test");

        let signature = request.sign(&signer, &context);

        assert_eq!(
            request.state(),
            &SigningState::Signed {
                timestamp: "2021-01-01T00:00:00Z".to_string(),
                signature: "DzWPQzx88BjDD3N3I0PwhfgWq/8fmMzikDD91qAWkGI=".to_string(),
                host: "example.com".to_string(),
                path: "/Op".to_string(),
            }
        );
        assert_eq!(request.params().get("Signature"), Some(signature.value.as_str()));
        assert_eq!(request.signed_for(), Some(("example.com", "/Op")));
        assert_eq!(
            request.signed_body().unwrap(),
            "Action=Test&Signature=DzWPQzx88BjDD3N3I0PwhfgWq%2F8fmMzikDD91qAWkGI%3D&Timestamp=2021-01-01T00%3A00%3A00Z"
        );
    }

    #[test]
    fn test_set_after_signing_invalidates() {
        let (signer, context) = fixtures();
        let mut request = MwsRequest::new();
        request.set("Action", "Test");
        request.sign(&signer, &context);

        request.set("NextToken", "abc");

        assert!(!request.is_signed());
        assert!(!request.params().contains("Signature"));
        assert_eq!(request.params().get("NextToken"), Some("abc"));
        assert!(request.signed_body().is_none());
    }

    #[test]
    fn test_augment_and_remove_after_signing_invalidate() {
        let (signer, context) = fixtures();
        let mut request = MwsRequest::new();
        request.augment([("Action", "Test"), ("A", "1")]);
        request.sign(&signer, &context);
        request.augment([("B", "2")]);
        assert!(!request.is_signed());

        request.sign(&signer, &context);
        request.remove("A");
        assert!(!request.is_signed());
        assert!(!request.params().contains("Signature"));
    }

    #[test]
    fn test_resign_matches_fresh_signature() {
        let (signer, context) = fixtures();
        let mut request = MwsRequest::new();
        request.set("Action", "Test");
        request.sign(&signer, &context);
        request.set("Extra", "x");
        request.remove("Extra");

        let again = request.sign(&signer, &context);
        assert_eq!(again.value, "DzWPQzx88BjDD3N3I0PwhfgWq/8fmMzikDD91qAWkGI=");
        assert!(request.is_signed());
    }
}

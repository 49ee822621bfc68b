//! OAuth 1.0a provider abstraction
//!
//! Provides the `OAuth10aProvider` trait describing a provider's handshake
//! endpoints, and `ConsumerConfig` holding the consumer credentials used to
//! sign every request.

use core::fmt;

use crate::error::OAuthErrorKind;
use crate::request::Verb;
use crate::types::OAuthProblem;

/// Trait for OAuth 1.0a provider implementations
///
/// The trait provides everything needed to run the three-legged handshake
/// (request token, authorization redirect, access token) and to classify
/// errors returned by the token endpoints.
///
/// # Example
///
/// ```
/// use core_auth::provider::OAuth10aProvider;
///
/// struct ExampleProvider;
///
/// impl OAuth10aProvider for ExampleProvider {
///     fn id(&self) -> &str { "example" }
///     fn display_name(&self) -> &str { "Example" }
///     fn request_token_url(&self) -> &str { "https://example.com/oauth/request_token" }
///     fn authorize_url(&self) -> &str { "https://example.com/oauth/authorize" }
///     fn access_token_url(&self) -> &str { "https://example.com/oauth/access_token" }
/// }
///
/// assert_eq!(ExampleProvider.id(), "example");
/// ```
pub trait OAuth10aProvider: Send + Sync {
    /// Provider identifier
    ///
    /// This should be a lowercase, URL-safe identifier.
    fn id(&self) -> &str;

    /// Human-readable display name
    fn display_name(&self) -> &str;

    /// Temporary credential (request token) endpoint URL
    fn request_token_url(&self) -> &str;

    /// Resource owner authorization endpoint URL
    fn authorize_url(&self) -> &str;

    /// Token credential (access token) endpoint URL
    fn access_token_url(&self) -> &str;

    /// HTTP verb used against the token endpoints
    fn token_verb(&self) -> Verb {
        Verb::Post
    }

    /// Classify an error response from a token endpoint
    ///
    /// The default understands the `oauth_problem` reporting extension and
    /// falls back to the status code.
    fn classify_error(&self, status: u16, body: &str) -> OAuthErrorKind {
        classify_by_problem(status, body)
    }
}

/// Default classification shared by providers
pub fn classify_by_problem(status: u16, body: &str) -> OAuthErrorKind {
    let problem = OAuthProblem::from_form(body);
    match problem.oauth_problem.as_str() {
        "token_rejected" | "token_expired" | "token_revoked" | "consumer_key_rejected"
        | "consumer_key_unknown" | "permission_denied" => OAuthErrorKind::TokenRejected,
        "" => match status {
            401 | 403 => OAuthErrorKind::TokenRejected,
            500..=599 => OAuthErrorKind::TransientError,
            _ => OAuthErrorKind::Unknown,
        },
        _ => OAuthErrorKind::Unknown,
    }
}

/// Consumer configuration for an OAuth 1.0a client
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsumerConfig {
    /// OAuth consumer key
    pub consumer_key: String,
    /// OAuth consumer secret
    pub consumer_secret: String,
    /// Callback URL for the three-legged handshake (`oob` when absent)
    #[cfg_attr(feature = "serde", serde(default))]
    pub callback_url: Option<String>,
}

impl fmt::Debug for ConsumerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerConfig")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .field("callback_url", &self.callback_url)
            .finish()
    }
}

impl ConsumerConfig {
    /// Create a consumer configuration without a callback URL
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            callback_url: None,
        }
    }

    /// Set the callback URL
    pub fn with_callback(mut self, callback_url: impl Into<String>) -> Self {
        self.callback_url = Some(callback_url.into());
        self
    }

    /// Callback value to send with the request token call
    pub fn callback(&self) -> &str {
        self.callback_url.as_deref().unwrap_or("oob")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_token_expired() {
        assert_eq!(
            classify_by_problem(400, "oauth_problem=token_expired"),
            OAuthErrorKind::TokenRejected
        );
    }

    #[test]
    fn test_classify_by_status() {
        assert_eq!(classify_by_problem(401, ""), OAuthErrorKind::TokenRejected);
        assert_eq!(classify_by_problem(503, "busy"), OAuthErrorKind::TransientError);
        assert_eq!(classify_by_problem(400, ""), OAuthErrorKind::Unknown);
    }

    #[test]
    fn test_consumer_debug_redacts_secret() {
        let consumer = ConsumerConfig::new("key", "s3cr3t").with_callback("https://app/cb");
        let debug = format!("{:?}", consumer);
        assert!(!debug.contains("s3cr3t"));
        assert_eq!(consumer.callback(), "https://app/cb");
        assert_eq!(ConsumerConfig::new("k", "s").callback(), "oob");
    }
}

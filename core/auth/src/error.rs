//! OAuth error types

/// Classification of OAuth errors to determine appropriate action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthErrorKind {
    /// Token rejected, expired or revoked - user must re-authorize
    TokenRejected,
    /// Transient error - the provider may answer on a later call
    TransientError,
    /// Unknown error - treat as transient
    Unknown,
}

/// OAuth-specific errors
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// Provider rejected the consumer or token
    #[error("Token rejected by provider: {0}")]
    TokenRejected(String),

    /// Provider temporarily unavailable
    #[error("Provider temporarily unavailable: {0}")]
    ProviderUnavailable(String),

    /// Network error during OAuth operation
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid response from provider
    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),

    /// Request or access token exchange failed
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Three-legged signing was requested without an access token
    #[error("No access token available for three-legged request")]
    MissingAccessToken,

    /// The requested flow is not available for this OAuth version
    #[error("Unsupported OAuth flow: {0}")]
    UnsupportedFlow(String),

    /// An endpoint URL could not be parsed
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl {
        /// The offending URL
        url: String,
        /// Parser message
        reason: String,
    },

    /// Computing the request signature failed
    #[error("Signature error: {0}")]
    Signature(String),
}

impl OAuthError {
    /// Get the classification of this error
    ///
    /// This helps consumers determine the appropriate action:
    /// - `TokenRejected` - User must go through the authorization redirect again
    /// - `TransientError` - May succeed on a later call
    /// - `Unknown` - Treat as transient
    pub fn kind(&self) -> OAuthErrorKind {
        match self {
            OAuthError::TokenRejected(_) => OAuthErrorKind::TokenRejected,
            OAuthError::MissingAccessToken => OAuthErrorKind::TokenRejected,
            OAuthError::ProviderUnavailable(_) => OAuthErrorKind::TransientError,
            OAuthError::Network(_) => OAuthErrorKind::TransientError,
            OAuthError::InvalidResponse(_) => OAuthErrorKind::Unknown,
            OAuthError::TokenExchangeFailed(_) => OAuthErrorKind::Unknown,
            OAuthError::MissingField(_) => OAuthErrorKind::Unknown,
            OAuthError::UnsupportedFlow(_) => OAuthErrorKind::Unknown,
            OAuthError::InvalidUrl { .. } => OAuthErrorKind::Unknown,
            OAuthError::Signature(_) => OAuthErrorKind::Unknown,
        }
    }

    pub(crate) fn invalid_url(url: &str, err: url::ParseError) -> Self {
        OAuthError::InvalidUrl {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type for OAuth operations
pub type OAuthResult<T> = Result<T, OAuthError>;

#[cfg(feature = "http")]
impl From<reqwest::Error> for OAuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OAuthError::ProviderUnavailable("Request timed out".to_string())
        } else if err.is_connect() {
            OAuthError::Network(format!("Connection failed: {}", err))
        } else {
            OAuthError::Network(err.to_string())
        }
    }
}

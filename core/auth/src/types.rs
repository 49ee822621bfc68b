//! OAuth 1.0a token types

use core::fmt;

use crate::error::{OAuthError, OAuthResult};

/// A token/secret pair
///
/// Used both for the temporary request token and for the access token handed
/// out at the end of a three-legged handshake.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    /// Token value (`oauth_token`)
    pub token: String,
    /// Token secret (`oauth_token_secret`)
    pub secret: String,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("token", &self.token)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl Token {
    /// Create a token pair
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
        }
    }
}

/// Temporary credentials obtained from the request token endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken {
    /// The request token pair
    pub token: Token,
    /// Whether the provider acknowledged the callback (`oauth_callback_confirmed`)
    pub callback_confirmed: bool,
}

/// Form-encoded token response from a request or access token endpoint
#[derive(Debug, Default)]
pub struct TokenResponse {
    /// `oauth_token`
    pub oauth_token: Option<String>,
    /// `oauth_token_secret`
    pub oauth_token_secret: Option<String>,
    /// `oauth_callback_confirmed`
    pub oauth_callback_confirmed: Option<bool>,
}

impl TokenResponse {
    /// Parse an `application/x-www-form-urlencoded` token response body
    pub fn from_form(body: &str) -> Self {
        let mut response = TokenResponse::default();
        for (key, value) in url::form_urlencoded::parse(body.trim().as_bytes()) {
            match key.as_ref() {
                "oauth_token" => response.oauth_token = Some(value.into_owned()),
                "oauth_token_secret" => response.oauth_token_secret = Some(value.into_owned()),
                "oauth_callback_confirmed" => {
                    response.oauth_callback_confirmed = Some(value == "true")
                }
                _ => {}
            }
        }
        response
    }

    /// Extract the token pair, failing if either half is missing
    pub fn into_token(self) -> OAuthResult<Token> {
        let token = self
            .oauth_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| OAuthError::MissingField("oauth_token".to_string()))?;
        let secret = self
            .oauth_token_secret
            .ok_or_else(|| OAuthError::MissingField("oauth_token_secret".to_string()))?;
        Ok(Token { token, secret })
    }
}

/// OAuth problem report from a provider (for error classification)
///
/// See the OAuth problem reporting extension; providers send e.g.
/// `oauth_problem=token_rejected` on a 401.
#[derive(Debug, Default)]
pub struct OAuthProblem {
    /// Problem code
    pub oauth_problem: String,
    /// Human-readable advice
    pub oauth_problem_advice: Option<String>,
}

impl OAuthProblem {
    /// Parse a form-encoded problem report, returning an empty report if absent
    pub fn from_form(body: &str) -> Self {
        let mut problem = OAuthProblem::default();
        for (key, value) in url::form_urlencoded::parse(body.trim().as_bytes()) {
            match key.as_ref() {
                "oauth_problem" => problem.oauth_problem = value.into_owned(),
                "oauth_problem_advice" => problem.oauth_problem_advice = Some(value.into_owned()),
                _ => {}
            }
        }
        problem
    }
}

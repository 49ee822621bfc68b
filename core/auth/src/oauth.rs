//! OAuth 1.0a handshake operations
//!
//! Implements:
//! - Request token (temporary credentials) retrieval
//! - Authorization URL generation
//! - Access token exchange (request token + verifier -> access token)

use crate::error::{OAuthError, OAuthErrorKind, OAuthResult};
use crate::provider::{ConsumerConfig, OAuth10aProvider};
use crate::request::OAuthRequest;
use crate::types::{OAuthProblem, RequestToken, Token, TokenResponse};
use core_http::HttpClient;

/// Obtain a request token from the provider
///
/// The consumer's callback URL (or `oob`) is sent as `oauth_callback`.
///
/// # Errors
///
/// Returns an error if the provider rejects the call or the response lacks
/// the token pair.
pub async fn fetch_request_token<P: OAuth10aProvider + ?Sized>(
    http: &HttpClient,
    provider: &P,
    consumer: &ConsumerConfig,
) -> OAuthResult<RequestToken> {
    let mut request = OAuthRequest::parse(provider.token_verb(), provider.request_token_url())?;
    request.add_oauth_param("oauth_callback", consumer.callback());
    request.sign(consumer, None)?;

    let response = request.send(http).await?;
    if !response.is_successful() {
        return Err(classify_and_create_error(
            provider,
            response.status,
            &response.body,
        ));
    }

    let token_response = TokenResponse::from_form(&response.body);
    let callback_confirmed = token_response.oauth_callback_confirmed.unwrap_or(false);
    if !callback_confirmed {
        tracing::warn!(
            provider = provider.id(),
            "request token response did not confirm the callback"
        );
    }

    Ok(RequestToken {
        token: token_response.into_token()?,
        callback_confirmed,
    })
}

/// Generate the authorization URL the user is redirected to
///
/// # Example
///
/// ```
/// use core_auth::oauth::authorization_url;
/// use core_auth::provider::OAuth10aProvider;
/// use core_auth::types::{RequestToken, Token};
///
/// struct Example;
/// impl OAuth10aProvider for Example {
///     fn id(&self) -> &str { "example" }
///     fn display_name(&self) -> &str { "Example" }
///     fn request_token_url(&self) -> &str { "https://example.com/request" }
///     fn authorize_url(&self) -> &str { "https://example.com/authorize" }
///     fn access_token_url(&self) -> &str { "https://example.com/access" }
/// }
///
/// let token = RequestToken { token: Token::new("abc", "def"), callback_confirmed: true };
/// assert_eq!(authorization_url(&Example, &token), "https://example.com/authorize?oauth_token=abc");
/// ```
pub fn authorization_url<P: OAuth10aProvider + ?Sized>(
    provider: &P,
    request_token: &RequestToken,
) -> String {
    let authorize_url = provider.authorize_url();
    let separator = if authorize_url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}oauth_token={}",
        authorize_url,
        separator,
        urlencoding::encode(&request_token.token.token)
    )
}

/// Exchange an authorized request token and verifier for an access token
///
/// # Errors
///
/// Returns `TokenRejected` when the provider refuses the request token or
/// verifier, and `MissingField` when the response lacks the token pair.
pub async fn exchange_access_token<P: OAuth10aProvider + ?Sized>(
    http: &HttpClient,
    provider: &P,
    consumer: &ConsumerConfig,
    request_token: &Token,
    verifier: &str,
) -> OAuthResult<Token> {
    let mut request = OAuthRequest::parse(provider.token_verb(), provider.access_token_url())?;
    request.add_oauth_param("oauth_verifier", verifier);
    request.sign(consumer, Some(request_token))?;

    let response = request.send(http).await?;
    if !response.is_successful() {
        return Err(classify_and_create_error(
            provider,
            response.status,
            &response.body,
        ));
    }

    tracing::debug!(provider = provider.id(), "access token granted");
    TokenResponse::from_form(&response.body).into_token()
}

/// Classify a token endpoint error and create the appropriate error type
fn classify_and_create_error<P: OAuth10aProvider + ?Sized>(
    provider: &P,
    status: u16,
    body: &str,
) -> OAuthError {
    let problem = OAuthProblem::from_form(body);
    let detail = problem
        .oauth_problem_advice
        .unwrap_or_else(|| problem.oauth_problem.clone());

    match provider.classify_error(status, body) {
        OAuthErrorKind::TokenRejected => OAuthError::TokenRejected(format!(
            "Provider {} rejected the request ({}): {}",
            provider.id(),
            status,
            detail
        )),
        OAuthErrorKind::TransientError => OAuthError::ProviderUnavailable(format!(
            "Provider {} temporarily unavailable ({}): {}",
            provider.id(),
            status,
            detail
        )),
        OAuthErrorKind::Unknown => {
            OAuthError::TokenExchangeFailed(format!("OAuth error ({}): {}", status, detail))
        }
    }
}

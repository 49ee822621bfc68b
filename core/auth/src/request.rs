//! Signable OAuth 1.0a requests
//!
//! An `OAuthRequest` is built unsigned, signed once with the consumer
//! credentials (and optionally a token), then sent. Query parameters live in
//! the URL; form body parameters and protocol parameters are kept apart so
//! they can all take part in the signature base string.

use std::collections::BTreeMap;
use std::fmt;

use url::Url;

use crate::error::{OAuthError, OAuthResult};
use crate::nonce::{generate_nonce, timestamp};
use crate::provider::ConsumerConfig;
use crate::signature::{
    authorization_header, base_string_uri, normalize_parameters, sign_hmac_sha1,
    signature_base_string, OAUTH_VERSION, SIGNATURE_METHOD,
};
use crate::types::Token;

/// HTTP verb of an OAuth request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Verb {
    /// GET
    #[default]
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl Verb {
    /// Upper-case method name
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An OAuth 1.0a request
#[derive(Debug, Clone)]
pub struct OAuthRequest {
    verb: Verb,
    url: Url,
    body_params: Vec<(String, String)>,
    oauth_params: BTreeMap<String, String>,
}

impl OAuthRequest {
    /// Create an unsigned request
    pub fn new(verb: Verb, url: Url) -> Self {
        Self {
            verb,
            url,
            body_params: Vec::new(),
            oauth_params: BTreeMap::new(),
        }
    }

    /// Create an unsigned request from a URL string
    pub fn parse(verb: Verb, url: &str) -> OAuthResult<Self> {
        let parsed = Url::parse(url).map_err(|e| OAuthError::invalid_url(url, e))?;
        Ok(Self::new(verb, parsed))
    }

    /// The HTTP verb
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// The target URL, including query parameters
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Form body parameters
    pub fn body_params(&self) -> &[(String, String)] {
        &self.body_params
    }

    /// Append a query string parameter
    pub fn add_query_param(&mut self, key: &str, value: &str) -> &mut Self {
        self.url.query_pairs_mut().append_pair(key, value);
        self
    }

    /// Append a form body parameter
    pub fn add_body_param(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.body_params.push((key.into(), value.into()));
        self
    }

    /// Set an extra protocol parameter such as `oauth_callback` or `oauth_verifier`
    pub fn add_oauth_param(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.oauth_params.insert(key.into(), value.into());
        self
    }

    /// Value of a protocol parameter, if set
    pub fn oauth_param(&self, key: &str) -> Option<&str> {
        self.oauth_params.get(key).map(String::as_str)
    }

    /// Returns true once a signature has been attached
    pub fn is_signed(&self) -> bool {
        self.oauth_params.contains_key("oauth_signature")
    }

    /// Sign with a fresh nonce and the current time
    ///
    /// Pass `None` as token for two-legged requests and request token calls.
    pub fn sign(&mut self, consumer: &ConsumerConfig, token: Option<&Token>) -> OAuthResult<()> {
        self.sign_with(consumer, token, &generate_nonce(), timestamp())
    }

    /// Sign with an explicit nonce and timestamp
    pub fn sign_with(
        &mut self,
        consumer: &ConsumerConfig,
        token: Option<&Token>,
        nonce: &str,
        timestamp: i64,
    ) -> OAuthResult<()> {
        self.oauth_params.remove("oauth_signature");
        self.oauth_params
            .insert("oauth_consumer_key".into(), consumer.consumer_key.clone());
        self.oauth_params.insert("oauth_nonce".into(), nonce.to_string());
        self.oauth_params
            .insert("oauth_signature_method".into(), SIGNATURE_METHOD.into());
        self.oauth_params
            .insert("oauth_timestamp".into(), timestamp.to_string());
        self.oauth_params
            .insert("oauth_version".into(), OAUTH_VERSION.into());
        match token {
            Some(token) => {
                self.oauth_params
                    .insert("oauth_token".into(), token.token.clone());
            }
            None => {
                self.oauth_params.remove("oauth_token");
            }
        }

        let base_string = self.signature_base_string();
        let token_secret = token.map(|t| t.secret.as_str()).unwrap_or("");
        let signature = sign_hmac_sha1(&base_string, &consumer.consumer_secret, token_secret)?;
        self.oauth_params.insert("oauth_signature".into(), signature);
        Ok(())
    }

    /// Signature base string over query, body and protocol parameters
    pub fn signature_base_string(&self) -> String {
        let query: Vec<(String, String)> = self
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let params = query
            .iter()
            .chain(self.body_params.iter())
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(
                self.oauth_params
                    .iter()
                    .filter(|(k, _)| k.as_str() != "oauth_signature")
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            );
        signature_base_string(
            self.verb.as_str(),
            &base_string_uri(&self.url),
            &normalize_parameters(params),
        )
    }

    /// `Authorization` header value, available once signed
    pub fn authorization_header(&self) -> Option<String> {
        if !self.is_signed() {
            return None;
        }
        Some(authorization_header(
            self.oauth_params.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        ))
    }

    /// Send the request, returning status and body
    ///
    /// Any HTTP status is returned as a response; only transport failures
    /// become errors.
    #[cfg(feature = "http")]
    pub async fn send(&self, client: &core_http::HttpClient) -> OAuthResult<OAuthResponse> {
        let method = match self.verb {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
            Verb::Put => reqwest::Method::PUT,
            Verb::Delete => reqwest::Method::DELETE,
        };
        let mut request = client.inner().request(method, self.url.clone());
        if let Some(header) = self.authorization_header() {
            request = request.header(reqwest::header::AUTHORIZATION, header);
        }
        if !self.body_params.is_empty() {
            request = request.form(&self.body_params);
        }

        tracing::trace!(verb = %self.verb, url = %self.url, "sending OAuth request");
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(OAuthResponse { status, body })
    }
}

/// Status and body of a sent request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
}

impl OAuthResponse {
    /// Returns true for 2xx statuses
    pub fn is_successful(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

//! OpenSocial client for web-facing callers
//!
//! Covers the three-legged handshake (authorization redirect and callback)
//! and two- or three-legged reads of people and groups. Unlike the group
//! service, reads here fail loudly: a caller asking for a person wants to know
//! why it did not get one.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use core_auth::oauth::{authorization_url, exchange_access_token, fetch_request_token};
use core_auth::provider::{ConsumerConfig, OAuth10aProvider};
use core_auth::request::{OAuthRequest, Verb};
use core_auth::types::Token;
use core_auth::version::OAuthVersion;
use core_auth::OAuthError;
use core_http::HttpClient;
use core_types::{Group, Group20, Person};
use parking_lot::{Mutex, RwLock};
use url::Url;

use crate::parser::{parse_group_members, parse_groups, parse_groups20, parse_person};
use crate::request::resource_url;

/// Errors returned by the OpenSocial client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Signing, handshake or transport failure
    #[error(transparent)]
    OAuth(#[from] OAuthError),

    /// Response body could not be parsed
    #[error(transparent)]
    Parse(#[from] core_types::Error),

    /// Three-legged call for a user without an access token
    #[error("No access token granted for user {0}")]
    NoAccessToken(String),

    /// Callback for a request token this client did not hand out
    #[error("Unknown or already used request token {0}")]
    UnknownRequestToken(String),

    /// Provider answered with a non-2xx status
    #[error("Request to {url} failed with status {status}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },
}

/// Result alias for client operations
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Parameters the provider appends to the callback URL
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct CallbackParams {
    /// The authorized request token
    pub oauth_token: String,
    /// Verifier proving the user authorized the token
    pub oauth_verifier: String,
}

impl CallbackParams {
    /// Extract callback parameters from a callback URL's query string
    pub fn from_query(query: &str) -> ClientResult<Self> {
        let mut token = None;
        let mut verifier = None;
        for (key, value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                "oauth_token" => token = Some(value.into_owned()),
                "oauth_verifier" => verifier = Some(value.into_owned()),
                _ => {}
            }
        }
        Ok(Self {
            oauth_token: token.ok_or_else(|| OAuthError::MissingField("oauth_token".into()))?,
            oauth_verifier: verifier
                .ok_or_else(|| OAuthError::MissingField("oauth_verifier".into()))?,
        })
    }
}

/// HTTP redirect to the provider's authorization page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Value for the `Location` header
    pub location: String,
}

impl Redirect {
    /// Status code to answer with
    pub fn status(&self) -> u16 {
        302
    }
}

/// Storage of granted access tokens, keyed by internal user id
///
/// Persistence is up to the implementor.
pub trait AccessTokenStore: Send + Sync {
    /// Token for a user, if one was granted
    fn get(&self, user_id: &str) -> Option<Token>;

    /// Store a user's token, replacing any previous one
    fn put(&self, user_id: &str, token: Token);

    /// Forget a user's token
    fn remove(&self, user_id: &str) -> Option<Token>;
}

/// Process-local token store
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    tokens: RwLock<HashMap<String, Token>>,
}

impl InMemoryTokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccessTokenStore for InMemoryTokenStore {
    fn get(&self, user_id: &str) -> Option<Token> {
        self.tokens.read().get(user_id).cloned()
    }

    fn put(&self, user_id: &str, token: Token) {
        self.tokens.write().insert(user_id.to_string(), token);
    }

    fn remove(&self, user_id: &str) -> Option<Token> {
        self.tokens.write().remove(user_id)
    }
}

/// Capable of retrieving OpenSocial data from an OpenSocial endpoint
#[async_trait]
pub trait OpenSocialClient: Send + Sync {
    /// Whether three-legged calls can be made on behalf of `user_id`
    ///
    /// True when an access token was granted; the provider may still reject
    /// it if the user revoked access since.
    fn is_access_token_granted(&self, user_id: &str) -> bool;

    /// Start the handshake, answering with a redirect to the authorization page
    async fn redirect_to_authorization_url(&self, version: OAuthVersion) -> ClientResult<Redirect>;

    /// Start the handshake, returning the authorization URL
    async fn authorization_url(&self, version: OAuthVersion) -> ClientResult<String>;

    /// Finish the handshake; returns the user id the token was stored for
    async fn oauth_callback(
        &self,
        version: OAuthVersion,
        params: &CallbackParams,
    ) -> ClientResult<String>;

    /// A person; `on_behalf_of` is `None` for two-legged calls
    async fn get_person(&self, user_id: &str, on_behalf_of: Option<&str>) -> ClientResult<Person>;

    /// Members of a group
    async fn get_group_members(
        &self,
        group_id: &str,
        on_behalf_of: Option<&str>,
    ) -> ClientResult<Vec<Person>>;

    /// A person's groups (OpenSocial 1.0)
    async fn get_groups(&self, user_id: &str, on_behalf_of: Option<&str>) -> ClientResult<Vec<Group>>;

    /// A person's groups (OpenSocial 2.0)
    async fn get_groups20(
        &self,
        user_id: &str,
        on_behalf_of: Option<&str>,
    ) -> ClientResult<Vec<Group20>>;
}

/// Endpoint and credentials of an OpenSocial API
#[derive(Debug, Clone, serde::Deserialize)]
pub struct OpenSocialClientConfig {
    /// Root of the API; REST resources live under `social/rest`
    pub endpoint: String,
    /// Consumer credentials and callback
    #[serde(flatten)]
    pub consumer: ConsumerConfig,
    /// OAuth flavour for calls made on behalf of a user
    #[serde(default)]
    pub version: OAuthVersion,
    /// Request token endpoint
    pub request_token_url: String,
    /// Authorization endpoint
    pub authorize_url: String,
    /// Access token endpoint
    pub access_token_url: String,
}

impl OAuth10aProvider for OpenSocialClientConfig {
    fn id(&self) -> &str {
        &self.endpoint
    }

    fn display_name(&self) -> &str {
        &self.endpoint
    }

    fn request_token_url(&self) -> &str {
        &self.request_token_url
    }

    fn authorize_url(&self) -> &str {
        &self.authorize_url
    }

    fn access_token_url(&self) -> &str {
        &self.access_token_url
    }
}

/// How long a request token waits for its callback before it is forgotten
pub const REQUEST_TOKEN_TTL_MINUTES: i64 = 15;

/// A request token handed out and awaiting its callback
struct PendingToken {
    token: Token,
    issued_at: DateTime<Utc>,
}

/// `OpenSocialClient` over HTTP
pub struct OAuthClient {
    config: OpenSocialClientConfig,
    rest_base: Url,
    http: HttpClient,
    store: Arc<dyn AccessTokenStore>,
    pending: Mutex<HashMap<String, PendingToken>>,
}

impl OAuthClient {
    /// Create a client with an in-memory token store
    pub fn new(config: OpenSocialClientConfig) -> ClientResult<Self> {
        Self::with_store(config, Arc::new(InMemoryTokenStore::new()), HttpClient::new())
    }

    /// Create a client with a custom token store and HTTP client
    pub fn with_store(
        config: OpenSocialClientConfig,
        store: Arc<dyn AccessTokenStore>,
        http: HttpClient,
    ) -> ClientResult<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| OAuthError::InvalidUrl {
            url: config.endpoint.clone(),
            reason: e.to_string(),
        })?;
        let rest_base = resource_url(&endpoint, &["social", "rest"])?;
        Ok(Self {
            config,
            rest_base,
            http,
            store,
            pending: Mutex::new(HashMap::new()),
        })
    }

    /// Remember a request token, forgetting any that have expired
    fn remember_request_token(&self, token: Token, issued_at: DateTime<Utc>) {
        let cutoff = Utc::now() - Duration::minutes(REQUEST_TOKEN_TTL_MINUTES);
        let mut pending = self.pending.lock();
        pending.retain(|_, entry| entry.issued_at > cutoff);
        pending.insert(token.token.clone(), PendingToken { token, issued_at });
    }

    /// Take a request token back, unless it is unknown or expired
    fn take_request_token(&self, oauth_token: &str) -> ClientResult<Token> {
        let cutoff = Utc::now() - Duration::minutes(REQUEST_TOKEN_TTL_MINUTES);
        self.pending
            .lock()
            .remove(oauth_token)
            .filter(|entry| entry.issued_at > cutoff)
            .map(|entry| entry.token)
            .ok_or_else(|| ClientError::UnknownRequestToken(oauth_token.to_string()))
    }

    fn ensure_three_legged(version: OAuthVersion) -> ClientResult<()> {
        if version.requires_access_token() {
            Ok(())
        } else {
            Err(OAuthError::UnsupportedFlow(
                "two-legged OAuth has no authorization step".to_string(),
            )
            .into())
        }
    }

    /// How to sign a read made on behalf of `on_behalf_of`
    fn signing_for<'a>(&self, on_behalf_of: Option<&'a str>) -> ClientResult<Signing<'a>> {
        match (on_behalf_of, self.config.version) {
            (None, _) => Ok(Signing::Consumer),
            (Some(user_id), OAuthVersion::TwoLegged) => Ok(Signing::Requestor(user_id)),
            (Some(user_id), OAuthVersion::ThreeLegged10a) => self
                .store
                .get(user_id)
                .map(Signing::AccessToken)
                .ok_or_else(|| ClientError::NoAccessToken(user_id.to_string())),
        }
    }

    /// Sign and send a GET for a REST resource, returning the 2xx body
    async fn fetch(&self, segments: &[&str], signing: Signing<'_>) -> ClientResult<String> {
        let url = resource_url(&self.rest_base, segments)?;
        let mut request = OAuthRequest::new(Verb::Get, url);
        let consumer = &self.config.consumer;

        match signing {
            Signing::Consumer => OAuthVersion::TwoLegged.sign(&mut request, consumer, None)?,
            Signing::Requestor(user_id) => {
                request.add_query_param("xoauth_requestor_id", user_id);
                OAuthVersion::TwoLegged.sign(&mut request, consumer, None)?;
            }
            Signing::AccessToken(token) => {
                OAuthVersion::ThreeLegged10a.sign(&mut request, consumer, Some(&token))?
            }
        }

        let response = request.send(&self.http).await?;
        if !response.is_successful() {
            tracing::info!(
                url = %request.url(),
                status_code = response.status,
                "OpenSocial request failed"
            );
            return Err(ClientError::Status {
                url: request.url().to_string(),
                status: response.status,
                body: response.body,
            });
        }
        Ok(response.body)
    }
}

/// Signing mode of a single read
enum Signing<'a> {
    /// Consumer credentials only
    Consumer,
    /// Consumer credentials, acting for the given user
    Requestor(&'a str),
    /// A user's access token
    AccessToken(Token),
}

#[async_trait]
impl OpenSocialClient for OAuthClient {
    fn is_access_token_granted(&self, user_id: &str) -> bool {
        self.store.get(user_id).is_some()
    }

    async fn redirect_to_authorization_url(&self, version: OAuthVersion) -> ClientResult<Redirect> {
        let location = self.authorization_url(version).await?;
        Ok(Redirect { location })
    }

    async fn authorization_url(&self, version: OAuthVersion) -> ClientResult<String> {
        Self::ensure_three_legged(version)?;
        let request_token = fetch_request_token(&self.http, &self.config, &self.config.consumer).await?;
        let url = authorization_url(&self.config, &request_token);
        self.remember_request_token(request_token.token, Utc::now());
        Ok(url)
    }

    async fn oauth_callback(
        &self,
        version: OAuthVersion,
        params: &CallbackParams,
    ) -> ClientResult<String> {
        Self::ensure_three_legged(version)?;
        let request_token = self.take_request_token(&params.oauth_token)?;

        let access_token = exchange_access_token(
            &self.http,
            &self.config,
            &self.config.consumer,
            &request_token,
            &params.oauth_verifier,
        )
        .await?;

        let body = self
            .fetch(&["people", "@me"], Signing::AccessToken(access_token.clone()))
            .await?;
        let user_id = parse_person(&body)?.entry.id;
        if user_id.trim().is_empty() {
            return Err(OAuthError::MissingField("id".into()).into());
        }

        tracing::info!(user_id = %user_id, "access token granted");
        self.store.put(&user_id, access_token);
        Ok(user_id)
    }

    async fn get_person(&self, user_id: &str, on_behalf_of: Option<&str>) -> ClientResult<Person> {
        let signing = self.signing_for(on_behalf_of)?;
        let body = self.fetch(&["people", user_id], signing).await?;
        Ok(parse_person(&body)?.entry)
    }

    async fn get_group_members(
        &self,
        group_id: &str,
        on_behalf_of: Option<&str>,
    ) -> ClientResult<Vec<Person>> {
        let person = on_behalf_of.unwrap_or("@me");
        let signing = self.signing_for(on_behalf_of)?;
        let body = self.fetch(&["people", person, group_id], signing).await?;
        Ok(parse_group_members(&body)?.into_entries())
    }

    async fn get_groups(&self, user_id: &str, on_behalf_of: Option<&str>) -> ClientResult<Vec<Group>> {
        let signing = self.signing_for(on_behalf_of)?;
        let body = self.fetch(&["groups", user_id], signing).await?;
        Ok(parse_groups(&body)?.into_entries())
    }

    async fn get_groups20(
        &self,
        user_id: &str,
        on_behalf_of: Option<&str>,
    ) -> ClientResult<Vec<Group20>> {
        let signing = self.signing_for(on_behalf_of)?;
        let body = self.fetch(&["groups", user_id], signing).await?;
        Ok(parse_groups20(&body)?.into_entries())
    }
}

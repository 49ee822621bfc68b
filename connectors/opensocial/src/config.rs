//! Loading group provider configuration
//!
//! Providers are described in TOML:
//!
//! ```toml
//! [[provider]]
//! identifier = "example"
//! name = "Example University"
//! version = "three-legged"
//! base_url = "https://groups.example.com/social/rest"
//! consumer_key = "key"
//! consumer_secret = "secret"
//! request_token_url = "https://groups.example.com/oauth/request_token"
//! authorize_url = "https://groups.example.com/oauth/authorize"
//! access_token_url = "https://groups.example.com/oauth/access_token"
//! user_id_precondition = "^urn:collab:person:example\\.com:.+$"
//!
//! [[provider.person_filters]]
//! property = "id"
//! search = "^urn:collab:person:example\\.com:(.+)$"
//! replace = "$1"
//! ```
//!
//! The raw structs below mirror the file; conversion into `GroupProvider`
//! validates URLs and compiles every regex.

use std::collections::HashSet;
use std::path::Path;

use core_auth::provider::ConsumerConfig;
use core_auth::request::Verb;
use core_auth::version::OAuthVersion;
use regex::Regex;
use serde::Deserialize;
use url::Url;

use crate::provider::{ConversionRule, GroupProvider};
use crate::{Error, Result};

/// One search/replace rule as written in configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ConversionRuleConfig {
    /// Property name: `id`, `name` (alias `title`) or `description`
    pub property: String,
    /// Regular expression to search for
    pub search: String,
    /// Replacement, may reference capture groups as `$1`
    pub replace: String,
}

impl ConversionRuleConfig {
    /// Create a rule description
    pub fn new(
        property: impl Into<String>,
        search: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        Self {
            property: property.into(),
            search: search.into(),
            replace: replace.into(),
        }
    }
}

/// One provider as written in configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GroupProviderConfig {
    /// Unique identifier
    pub identifier: String,
    /// Display name, defaults to the identifier
    #[serde(default)]
    pub name: Option<String>,
    /// OAuth flavour
    #[serde(default)]
    pub version: OAuthVersion,
    /// Base URL of the OpenSocial REST endpoint
    pub base_url: String,
    /// Consumer credentials and callback
    #[serde(flatten)]
    pub consumer: ConsumerConfig,
    /// Request token endpoint (three-legged only)
    #[serde(default)]
    pub request_token_url: Option<String>,
    /// Authorization endpoint (three-legged only)
    #[serde(default)]
    pub authorize_url: Option<String>,
    /// Access token endpoint (three-legged only)
    #[serde(default)]
    pub access_token_url: Option<String>,
    /// Verb for group and member requests
    #[serde(default)]
    pub request_verb: Verb,
    /// Internal to external person id rules
    #[serde(default)]
    pub person_filters: Vec<ConversionRuleConfig>,
    /// External to internal person id rules
    #[serde(default)]
    pub person_decorators: Vec<ConversionRuleConfig>,
    /// Internal to external group id rules, plus title/description rules
    #[serde(default)]
    pub group_filters: Vec<ConversionRuleConfig>,
    /// External to internal group id rules
    #[serde(default)]
    pub group_decorators: Vec<ConversionRuleConfig>,
    /// Regex over internal user ids this provider serves
    #[serde(default)]
    pub user_id_precondition: Option<String>,
}

impl GroupProviderConfig {
    /// Minimal configuration with no conversion rules
    pub fn new(
        identifier: impl Into<String>,
        base_url: impl Into<String>,
        consumer: ConsumerConfig,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            name: None,
            version: OAuthVersion::default(),
            base_url: base_url.into(),
            consumer,
            request_token_url: None,
            authorize_url: None,
            access_token_url: None,
            request_verb: Verb::default(),
            person_filters: Vec::new(),
            person_decorators: Vec::new(),
            group_filters: Vec::new(),
            group_decorators: Vec::new(),
            user_id_precondition: None,
        }
    }
}

fn compile_rules(rules: &[ConversionRuleConfig]) -> Result<Vec<ConversionRule>> {
    rules
        .iter()
        .map(|rule| ConversionRule::new(&rule.property, &rule.search, &rule.replace))
        .collect()
}

fn parse_http_url(identifier: &str, field: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value).map_err(|e| {
        Error::Config(format!(
            "provider '{}': invalid {} '{}': {}",
            identifier, field, value, e
        ))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::Config(format!(
            "provider '{}': {} must be http(s), got '{}'",
            identifier, field, scheme
        ))),
    }
}

fn endpoint(identifier: &str, field: &str, value: Option<String>, required: bool) -> Result<String> {
    match value {
        Some(value) => {
            parse_http_url(identifier, field, &value)?;
            Ok(value)
        }
        None if required => Err(Error::Config(format!(
            "provider '{}': {} is required for three-legged OAuth",
            identifier, field
        ))),
        None => Ok(String::new()),
    }
}

impl TryFrom<GroupProviderConfig> for GroupProvider {
    type Error = Error;

    fn try_from(config: GroupProviderConfig) -> Result<Self> {
        let id = config.identifier.trim().to_string();
        if id.is_empty() {
            return Err(Error::Config("provider identifier must not be empty".into()));
        }

        let base_url = parse_http_url(&id, "base_url", &config.base_url)?;
        let three_legged = config.version.requires_access_token();
        let request_token_url =
            endpoint(&id, "request_token_url", config.request_token_url, three_legged)?;
        let authorize_url = endpoint(&id, "authorize_url", config.authorize_url, three_legged)?;
        let access_token_url =
            endpoint(&id, "access_token_url", config.access_token_url, three_legged)?;

        let user_id_precondition = config
            .user_id_precondition
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| {
                Error::Config(format!("provider '{}': invalid user_id_precondition: {}", id, e))
            })?;

        Ok(GroupProvider {
            name: config.name.unwrap_or_else(|| id.clone()),
            version: config.version,
            base_url,
            consumer: config.consumer,
            request_token_url,
            authorize_url,
            access_token_url,
            request_verb: config.request_verb,
            person_filters: compile_rules(&config.person_filters)?,
            person_decorators: compile_rules(&config.person_decorators)?,
            group_filters: compile_rules(&config.group_filters)?,
            group_decorators: compile_rules(&config.group_decorators)?,
            user_id_precondition,
            identifier: id,
        })
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    /// Configured providers
    #[serde(default, rename = "provider")]
    pub providers: Vec<GroupProviderConfig>,
}

impl ProvidersConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read and parse a TOML configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    /// Validate every provider
    pub fn into_providers(self) -> Result<GroupProviders> {
        let mut seen = HashSet::new();
        let mut providers = Vec::with_capacity(self.providers.len());
        for config in self.providers {
            let provider = GroupProvider::try_from(config)?;
            if !seen.insert(provider.identifier.clone()) {
                return Err(Error::Config(format!(
                    "duplicate provider identifier '{}'",
                    provider.identifier
                )));
            }
            tracing::debug!(
                provider = %provider.identifier,
                version = %provider.version,
                "loaded group provider"
            );
            providers.push(provider);
        }
        Ok(GroupProviders { providers })
    }
}

/// Validated, immutable set of providers
#[derive(Debug, Clone, Default)]
pub struct GroupProviders {
    providers: Vec<GroupProvider>,
}

impl GroupProviders {
    /// Look up a provider by identifier
    pub fn get(&self, identifier: &str) -> Option<&GroupProvider> {
        self.providers.iter().find(|p| p.identifier == identifier)
    }

    /// Providers whose user id precondition accepts `user_id`
    pub fn for_user<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a GroupProvider> + 'a {
        self.providers
            .iter()
            .filter(move |p| p.is_meant_for_user(user_id))
    }

    /// All providers
    pub fn iter(&self) -> impl Iterator<Item = &GroupProvider> {
        self.providers.iter()
    }

    /// Number of providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Returns true if no provider is configured
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

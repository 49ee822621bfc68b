//! OpenSocial connector: external group providers over OAuth 1.0a
//!
//! Fetches group memberships and group members from OpenSocial providers and
//! maps them into the platform's own identifier namespace.
//!
//! - [`service`] - group and member listing per provider, degrading to empty
//!   on fetch failures
//! - [`convert`] - identifier and title/description conversion rules
//! - [`parser`] - OpenSocial JSON envelopes
//! - [`request`] - unsigned request construction
//! - [`client`] - handshake and reads for web-facing callers
//! - [`config`] - provider configuration loading
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod convert;
pub mod parser;
pub mod provider;
pub mod request;
pub mod service;

pub use core_types::{Error, Result};

pub use client::{OAuthClient, OpenSocialClient};
pub use config::{GroupProviders, ProvidersConfig};
pub use provider::{ConversionRule, GroupProvider, GroupProviderUserOauth};
pub use service::{GroupService, OAuthGroupService};

#[cfg(test)]
pub(crate) mod test_support {
    use core_auth::provider::ConsumerConfig;
    use core_auth::version::OAuthVersion;

    use crate::config::{ConversionRuleConfig, GroupProviderConfig};
    use crate::provider::GroupProvider;

    /// Three-legged provider mapping `example.com` urns to bare ids
    pub fn provider(base_url: &str) -> GroupProvider {
        let mut config = GroupProviderConfig::new(
            "example",
            base_url,
            ConsumerConfig::new("consumer", "consumer-secret"),
        );
        config.version = OAuthVersion::ThreeLegged10a;
        config.request_token_url = Some(format!("{}/oauth/request_token", base_url));
        config.authorize_url = Some(format!("{}/oauth/authorize", base_url));
        config.access_token_url = Some(format!("{}/oauth/access_token", base_url));
        config.person_filters = vec![ConversionRuleConfig::new(
            "id",
            r"^urn:collab:person:example\.com:(.+)$",
            "$1",
        )];
        config.person_decorators = vec![ConversionRuleConfig::new(
            "id",
            "^([^:]+)$",
            "urn:collab:person:example.com:$1",
        )];
        config.group_filters = vec![
            ConversionRuleConfig::new("id", r"^urn:collab:group:example\.com:(.+)$", "$1"),
            ConversionRuleConfig::new("title", "^Raw Title$", "Friendly Title"),
            ConversionRuleConfig::new("description", "ext$", "example.com"),
        ];
        config.group_decorators = vec![ConversionRuleConfig::new(
            "id",
            "^([^:]+)$",
            "urn:collab:group:example.com:$1",
        )];
        GroupProvider::try_from(config).expect("valid test provider")
    }
}

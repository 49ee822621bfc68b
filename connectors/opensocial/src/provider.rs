//! External group provider configuration
//!
//! A `GroupProvider` is validated once, when configuration is loaded: base
//! URL, token endpoints and every conversion regex are checked up front, so the
//! conversion functions never have to fail later on.

use std::fmt;

use core_auth::provider::{ConsumerConfig, OAuth10aProvider};
use core_auth::request::Verb;
use core_auth::types::Token;
use core_auth::version::OAuthVersion;
use regex::Regex;
use url::Url;

use crate::convert::{PROPERTY_DESCRIPTION, PROPERTY_ID, PROPERTY_NAME};
use crate::{Error, Result};

/// A single search/replace rule on one property
///
/// `search` is a regular expression; `replace` may reference capture groups
/// as `$1`, `$2`, ...
#[derive(Debug, Clone)]
pub struct ConversionRule {
    property: String,
    search: Regex,
    replace: String,
}

impl ConversionRule {
    /// Compile a rule, rejecting invalid patterns
    pub fn new(property: &str, search: &str, replace: &str) -> Result<Self> {
        let property = canonical_property(property)?;
        let search = Regex::new(search).map_err(|e| {
            Error::Config(format!(
                "invalid search pattern '{}' for property '{}': {}",
                search, property, e
            ))
        })?;
        let replace = normalize_replacement(replace, search.captures_len() - 1)?;
        Ok(Self {
            property: property.to_string(),
            search,
            replace,
        })
    }

    /// Property this rule applies to
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Whether the rule applies to the given property
    pub fn applies_to(&self, property: &str) -> bool {
        canonical_property(property).is_ok_and(|p| p == self.property)
    }

    /// Replace every match of the pattern in `value`
    pub fn apply(&self, value: &str) -> String {
        self.search
            .replace_all(value, self.replace.as_str())
            .into_owned()
    }
}

fn canonical_property(property: &str) -> Result<&'static str> {
    match property.trim().to_ascii_lowercase().as_str() {
        "id" => Ok(PROPERTY_ID),
        "name" | "title" => Ok(PROPERTY_NAME),
        "description" => Ok(PROPERTY_DESCRIPTION),
        other => Err(Error::Config(format!("unknown conversion property '{}'", other))),
    }
}

/// Rewrite a `$1` style replacement into `regex` syntax
///
/// A reference takes as many digits as still name an existing group, so with
/// one group `$12` is group 1 followed by a literal `2`. A reference to a
/// missing group is an error. `\x` is a literal `x`, as is a `$` that does
/// not start a reference.
fn normalize_replacement(replace: &str, group_count: usize) -> Result<String> {
    let mut out = String::with_capacity(replace.len() + 4);
    let mut chars = replace.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('$') => out.push_str("$$"),
                Some(escaped) => out.push(escaped),
                None => out.push('\\'),
            },
            '$' => match chars.peek().and_then(|n| n.to_digit(10)) {
                Some(first) => {
                    chars.next();
                    let mut group = first as usize;
                    if group > group_count {
                        return Err(Error::Config(format!(
                            "replacement '{}' references missing group {}",
                            replace, group
                        )));
                    }
                    while let Some(digit) = chars.peek().and_then(|n| n.to_digit(10)) {
                        let longer = group * 10 + digit as usize;
                        if longer > group_count {
                            break;
                        }
                        group = longer;
                        chars.next();
                    }
                    out.push_str(&format!("${{{}}}", group));
                }
                None => out.push_str("$$"),
            },
            _ => out.push(c),
        }
    }
    Ok(out)
}

/// Configuration of one external OpenSocial group provider
#[derive(Debug, Clone)]
pub struct GroupProvider {
    /// Unique identifier of the provider
    pub identifier: String,
    /// Display name
    pub name: String,
    /// OAuth flavour used to sign requests
    pub version: OAuthVersion,
    /// Base URL of the OpenSocial REST endpoint
    pub base_url: Url,
    /// Consumer credentials
    pub consumer: ConsumerConfig,
    /// Request token endpoint
    pub request_token_url: String,
    /// Authorization endpoint
    pub authorize_url: String,
    /// Access token endpoint
    pub access_token_url: String,
    /// Verb used for group and member requests
    pub request_verb: Verb,
    /// Internal to external person id rules
    pub person_filters: Vec<ConversionRule>,
    /// External to internal person id rules
    pub person_decorators: Vec<ConversionRule>,
    /// Internal to external group id rules, plus title/description rules
    pub group_filters: Vec<ConversionRule>,
    /// External to internal group id rules
    pub group_decorators: Vec<ConversionRule>,
    /// Users this provider serves; `None` means every user
    pub user_id_precondition: Option<Regex>,
}

impl GroupProvider {
    /// Whether this provider may hold groups for the given internal user id
    pub fn is_meant_for_user(&self, user_id: &str) -> bool {
        self.user_id_precondition
            .as_ref()
            .is_none_or(|precondition| precondition.is_match(user_id))
    }
}

impl OAuth10aProvider for GroupProvider {
    fn id(&self) -> &str {
        &self.identifier
    }

    fn display_name(&self) -> &str {
        &self.name
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

/// A user's access token at one provider, produced by a completed handshake
#[derive(Clone, PartialEq, Eq)]
pub struct GroupProviderUserOauth {
    /// Internal person identifier
    pub person_id: String,
    /// Identifier of the provider the token belongs to
    pub provider_id: String,
    /// Access token
    pub oauth_token: String,
    /// Access token secret
    pub oauth_secret: String,
}

impl fmt::Debug for GroupProviderUserOauth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupProviderUserOauth")
            .field("person_id", &self.person_id)
            .field("provider_id", &self.provider_id)
            .field("oauth_token", &self.oauth_token)
            .field("oauth_secret", &"[REDACTED]")
            .finish()
    }
}

impl GroupProviderUserOauth {
    /// Create a user token record
    pub fn new(
        person_id: impl Into<String>,
        provider_id: impl Into<String>,
        oauth_token: impl Into<String>,
        oauth_secret: impl Into<String>,
    ) -> Self {
        Self {
            person_id: person_id.into(),
            provider_id: provider_id.into(),
            oauth_token: oauth_token.into(),
            oauth_secret: oauth_secret.into(),
        }
    }

    /// The access token pair used for signing
    pub fn access_token(&self) -> Token {
        Token::new(self.oauth_token.clone(), self.oauth_secret.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_replaces_with_group_reference() {
        let rule = ConversionRule::new("id", "^urn:collab:person:example\\.com:(.+)$", "$1").unwrap();
        assert_eq!(rule.apply("urn:collab:person:example.com:jdoe"), "jdoe");
        assert_eq!(rule.apply("someone-else"), "someone-else");
    }

    #[test]
    fn test_group_reference_followed_by_text() {
        let rule = ConversionRule::new("id", "^(.+)$", "$1suffix").unwrap();
        assert_eq!(rule.apply("abc"), "abcsuffix");
    }

    #[test]
    fn test_title_is_alias_for_name() {
        let rule = ConversionRule::new("title", "Raw", "Friendly").unwrap();
        assert_eq!(rule.property(), PROPERTY_NAME);
        assert!(rule.applies_to("name"));
        assert!(rule.applies_to("Title"));
        assert!(!rule.applies_to("description"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = ConversionRule::new("id", "(unclosed", "x").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unknown_property_rejected() {
        assert!(ConversionRule::new("email", ".*", "x").is_err());
    }

    #[test]
    fn test_normalize_replacement() {
        assert_eq!(normalize_replacement("a$1b$23", 23).unwrap(), "a${1}b${23}");
        assert_eq!(normalize_replacement("cost: $", 0).unwrap(), "cost: $$");
        assert_eq!(normalize_replacement(r"\$1", 1).unwrap(), "$$1");
    }

    #[test]
    fn test_group_reference_stops_at_last_existing_group() {
        assert_eq!(normalize_replacement("$12", 1).unwrap(), "${1}2");
        let rule = ConversionRule::new("id", "^(.+)$", "$12").unwrap();
        assert_eq!(rule.apply("abc"), "abc2");
    }

    #[test]
    fn test_reference_to_missing_group_rejected() {
        let err = ConversionRule::new("id", "^(.+)$", "$2").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_literal_dollar_is_kept() {
        let rule = ConversionRule::new("name", "^Price$", "Price in $").unwrap();
        assert_eq!(rule.apply("Price"), "Price in $");
    }

    #[test]
    fn test_precondition_limits_users() {
        let mut provider = crate::test_support::provider("https://groups.example.com");
        assert!(provider.is_meant_for_user("anyone"));
        provider.user_id_precondition = Some(Regex::new("^urn:collab:person:example\\.com:").unwrap());
        assert!(provider.is_meant_for_user("urn:collab:person:example.com:jdoe"));
        assert!(!provider.is_meant_for_user("urn:collab:person:other.org:jdoe"));
    }

    #[test]
    fn test_user_oauth_debug_redacts_secret() {
        let oauth = GroupProviderUserOauth::new("urn:p", "hz", "tok", "sup3r");
        assert!(!format!("{:?}", oauth).contains("sup3r"));
        assert_eq!(oauth.access_token(), Token::new("tok", "sup3r"));
    }
}

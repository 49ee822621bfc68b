//! Unsigned request construction for group provider resources

use core_auth::error::{OAuthError, OAuthResult};
use core_auth::request::{OAuthRequest, Verb};
use url::Url;

use crate::provider::GroupProvider;

/// Verb and base URL of a provider's group API
#[derive(Debug, Clone)]
pub struct GroupProviderApi {
    verb: Verb,
    base_url: Url,
}

impl GroupProviderApi {
    /// Describe the API of a configured provider
    pub fn for_provider(provider: &GroupProvider) -> Self {
        Self {
            verb: provider.request_verb,
            base_url: provider.base_url.clone(),
        }
    }

    /// Request for `{baseUrl}/groups/{personId}`
    ///
    /// `person_id` must already be in stripped (external) form.
    pub fn groups_request(&self, person_id: &str) -> OAuthResult<OAuthRequest> {
        self.request(&["groups", person_id])
    }

    /// Request for `{baseUrl}/people/{personId}/{groupId}`
    ///
    /// Both ids must already be in stripped (external) form.
    pub fn group_members_request(&self, person_id: &str, group_id: &str) -> OAuthResult<OAuthRequest> {
        self.request(&["people", person_id, group_id])
    }

    fn request(&self, segments: &[&str]) -> OAuthResult<OAuthRequest> {
        let url = resource_url(&self.base_url, segments)?;
        Ok(OAuthRequest::new(self.verb, url))
    }
}

/// Join percent-encoded path segments onto a base URL
///
/// `@` and `:` are legal in a path segment and stay readable (`@me`, urns).
/// Empty, `.` and `..` segments are rejected: the URL parser would resolve
/// them (`%2E` included) into a different resource.
pub(crate) fn resource_url(base_url: &Url, segments: &[&str]) -> OAuthResult<Url> {
    let mut target = base_url.as_str().trim_end_matches('/').to_string();
    for segment in segments {
        if matches!(*segment, "" | "." | "..") {
            return Err(OAuthError::InvalidUrl {
                url: format!("{}/{}", target, segment),
                reason: format!("path segment '{}' is not allowed", segment),
            });
        }
        target.push('/');
        target.push_str(
            &urlencoding::encode(segment)
                .replace("%40", "@")
                .replace("%3A", ":"),
        );
    }
    Url::parse(&target).map_err(|e| OAuthError::InvalidUrl {
        url: target.clone(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::provider;

    #[test]
    fn test_groups_request() {
        let api = GroupProviderApi::for_provider(&provider("https://groups.example.com/social/rest/"));
        let request = api.groups_request("jdoe").unwrap();

        assert_eq!(request.verb(), Verb::Get);
        assert_eq!(
            request.url().as_str(),
            "https://groups.example.com/social/rest/groups/jdoe"
        );
        assert!(!request.is_signed());
    }

    #[test]
    fn test_group_members_request() {
        let api = GroupProviderApi::for_provider(&provider("https://groups.example.com"));
        let request = api.group_members_request("jdoe", "staff").unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://groups.example.com/people/jdoe/staff"
        );
    }

    #[test]
    fn test_segments_are_encoded() {
        let api = GroupProviderApi::for_provider(&provider("https://groups.example.com"));
        let request = api.group_members_request("j doe", "a/b").unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://groups.example.com/people/j%20doe/a%2Fb"
        );
    }

    #[test]
    fn test_at_and_colon_stay_readable() {
        let base = Url::parse("https://api.example.com/social/rest").unwrap();
        let url = resource_url(&base, &["people", "@me", "urn:collab:group:x"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/social/rest/people/@me/urn:collab:group:x"
        );
    }

    #[test]
    fn test_dot_segments_rejected() {
        let api = GroupProviderApi::for_provider(&provider("https://groups.example.com/social/rest"));
        for group_id in ["..", ".", ""] {
            let err = api.group_members_request("jdoe", group_id).unwrap_err();
            assert!(matches!(err, OAuthError::InvalidUrl { .. }), "{:?}", group_id);
        }
        assert!(api.groups_request("..").is_err());
    }

    #[test]
    fn test_dots_inside_segment_are_kept() {
        let api = GroupProviderApi::for_provider(&provider("https://groups.example.com"));
        let request = api.group_members_request("j.doe", "...").unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://groups.example.com/people/j.doe/..."
        );
    }

    #[test]
    fn test_verb_follows_provider() {
        let mut provider = provider("https://groups.example.com");
        provider.request_verb = Verb::Post;
        let request = GroupProviderApi::for_provider(&provider)
            .groups_request("jdoe")
            .unwrap();
        assert_eq!(request.verb(), Verb::Post);
    }
}

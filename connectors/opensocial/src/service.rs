//! Fetching groups and group members from external providers
//!
//! A failed fetch (transport error or non-2xx status) degrades to an empty
//! list: one unreachable provider must not break the access decision that
//! aggregates groups over all of a user's providers. A 2xx with a body that
//! does not parse is surfaced as an error.

use async_trait::async_trait;
use core_auth::request::{OAuthRequest, OAuthResponse};
use core_auth::OAuthResult;
use core_http::HttpClient;
use core_types::{Group20, Person};

use crate::convert::{convert_group20, convert_persons, to_external_group_id, to_external_person_id};
use crate::parser::{parse_group_members, parse_groups20};
use crate::provider::{GroupProvider, GroupProviderUserOauth};
use crate::request::GroupProviderApi;
use crate::Result;

/// Group data from an external provider, on behalf of a user
#[async_trait]
pub trait GroupService: Send + Sync {
    /// Groups the user is a member of, with internal ids and filtered titles
    async fn get_group20s(
        &self,
        oauth: &GroupProviderUserOauth,
        provider: &GroupProvider,
    ) -> Result<Vec<Group20>>;

    /// Members of `group_id` (internal form), with internal ids
    async fn get_group_members(
        &self,
        oauth: &GroupProviderUserOauth,
        provider: &GroupProvider,
        group_id: &str,
    ) -> Result<Vec<Person>>;
}

/// `GroupService` signing with the user's access token
///
/// The signing flavour comes from the provider's configured `OAuthVersion`;
/// for three-legged providers the token in `GroupProviderUserOauth` is used.
#[derive(Debug, Clone, Default)]
pub struct OAuthGroupService {
    http: HttpClient,
}

impl OAuthGroupService {
    /// Create a service with the default HTTP client
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service on a preconfigured HTTP client
    pub fn with_client(http: HttpClient) -> Self {
        Self { http }
    }

    async fn send_signed(
        &self,
        request: OAuthResult<OAuthRequest>,
        oauth: &GroupProviderUserOauth,
        provider: &GroupProvider,
    ) -> OAuthResult<OAuthResponse> {
        let mut request = request?;
        let token = oauth.access_token();
        provider
            .version
            .sign(&mut request, &provider.consumer, Some(&token))?;
        request.send(&self.http).await
    }
}

#[async_trait]
impl GroupService for OAuthGroupService {
    async fn get_group20s(
        &self,
        oauth: &GroupProviderUserOauth,
        provider: &GroupProvider,
    ) -> Result<Vec<Group20>> {
        let stripped_person_id = to_external_person_id(&oauth.person_id, provider);
        let api = GroupProviderApi::for_provider(provider);
        let request = api.groups_request(&stripped_person_id);

        let response = match self.send_signed(request, oauth, provider).await {
            Ok(response) if response.is_successful() => response,
            Ok(response) => {
                tracing::info!(
                    provider = %provider.identifier,
                    subject_id = %oauth.person_id,
                    status_code = response.status,
                    "fetching external groups failed"
                );
                tracing::trace!(body = %response.body, "external groups response");
                return Ok(Vec::new());
            }
            Err(err) => {
                tracing::info!(
                    provider = %provider.identifier,
                    subject_id = %oauth.person_id,
                    error = %err,
                    "fetching external groups failed"
                );
                return Ok(Vec::new());
            }
        };

        let groups = parse_groups20(&response.body)?
            .into_entries()
            .into_iter()
            .map(|group| convert_group20(group, provider))
            .collect();
        Ok(groups)
    }

    async fn get_group_members(
        &self,
        oauth: &GroupProviderUserOauth,
        provider: &GroupProvider,
        group_id: &str,
    ) -> Result<Vec<Person>> {
        let stripped_person_id = to_external_person_id(&oauth.person_id, provider);
        let stripped_group_id = to_external_group_id(group_id, provider);
        let api = GroupProviderApi::for_provider(provider);
        let request = api.group_members_request(&stripped_person_id, &stripped_group_id);

        let response = match self.send_signed(request, oauth, provider).await {
            Ok(response) if response.is_successful() => response,
            Ok(response) => {
                tracing::info!(
                    provider = %provider.identifier,
                    subject_id = %oauth.person_id,
                    group_id = %group_id,
                    status_code = response.status,
                    "fetching external group members failed"
                );
                tracing::trace!(body = %response.body, "external group members response");
                return Ok(Vec::new());
            }
            Err(err) => {
                tracing::info!(
                    provider = %provider.identifier,
                    subject_id = %oauth.person_id,
                    group_id = %group_id,
                    error = %err,
                    "fetching external group members failed"
                );
                return Ok(Vec::new());
            }
        };

        tracing::debug!(
            provider = %provider.identifier,
            body = %response.body,
            "group members response"
        );
        let persons = parse_group_members(&response.body)?.into_entries();
        Ok(convert_persons(persons, provider))
    }
}

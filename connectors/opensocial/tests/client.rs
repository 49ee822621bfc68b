use connector_opensocial::client::{
    CallbackParams, ClientError, OAuthClient, OpenSocialClient, OpenSocialClientConfig,
};
use core_auth::provider::ConsumerConfig;
use core_auth::version::OAuthVersion;
use core_auth::OAuthError;
use wiremock::matchers::{header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_config(base: &str, version: OAuthVersion) -> OpenSocialClientConfig {
    OpenSocialClientConfig {
        endpoint: base.to_string(),
        consumer: ConsumerConfig::new("consumer", "consumer-secret")
            .with_callback("https://sp.example.com/callback"),
        version,
        request_token_url: format!("{}/oauth/request_token", base),
        authorize_url: format!("{}/oauth/authorize", base),
        access_token_url: format!("{}/oauth/access_token", base),
    }
}

async fn mount_handshake(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "oauth_token=req&oauth_token_secret=req-secret&oauth_callback_confirmed=true",
        ))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .and(header_regex("Authorization", "oauth_verifier=\"verifier\""))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("oauth_token=access&oauth_token_secret=access-secret"),
        )
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/social/rest/people/@me"))
        .and(header_regex("Authorization", "oauth_token=\"access\""))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"entry":{"id":"urn:collab:person:example.com:jdoe","displayName":"J. Doe"}}"#,
        ))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_three_legged_handshake_then_read() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;
    Mock::given(method("GET"))
        .and(path("/social/rest/groups/@me"))
        .and(header_regex("Authorization", "oauth_token=\"access\""))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"entry":[{"id":"g1","title":"Team"}]}"#),
        )
        .mount(&server)
        .await;

    let client = OAuthClient::new(client_config(&server.uri(), OAuthVersion::ThreeLegged10a)).unwrap();
    let user_id = "urn:collab:person:example.com:jdoe";
    assert!(!client.is_access_token_granted(user_id));

    let url = client
        .authorization_url(OAuthVersion::ThreeLegged10a)
        .await
        .unwrap();
    assert_eq!(url, format!("{}/oauth/authorize?oauth_token=req", server.uri()));

    let params = CallbackParams::from_query("oauth_token=req&oauth_verifier=verifier").unwrap();
    let granted = client
        .oauth_callback(OAuthVersion::ThreeLegged10a, &params)
        .await
        .unwrap();
    assert_eq!(granted, user_id);
    assert!(client.is_access_token_granted(user_id));

    let groups = client.get_groups20("@me", Some(user_id)).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].title.as_deref(), Some("Team"));
}

#[tokio::test]
async fn test_redirect_points_at_authorize_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "oauth_token=req&oauth_token_secret=req-secret&oauth_callback_confirmed=true",
        ))
        .mount(&server)
        .await;

    let client = OAuthClient::new(client_config(&server.uri(), OAuthVersion::ThreeLegged10a)).unwrap();
    let redirect = client
        .redirect_to_authorization_url(OAuthVersion::ThreeLegged10a)
        .await
        .unwrap();
    assert_eq!(redirect.status(), 302);
    assert!(redirect.location.ends_with("/oauth/authorize?oauth_token=req"));
}

#[tokio::test]
async fn test_callback_with_unknown_request_token() {
    let server = MockServer::start().await;
    let client = OAuthClient::new(client_config(&server.uri(), OAuthVersion::ThreeLegged10a)).unwrap();

    let params = CallbackParams::from_query("oauth_token=never-issued&oauth_verifier=v").unwrap();
    let err = client
        .oauth_callback(OAuthVersion::ThreeLegged10a, &params)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::UnknownRequestToken(token) if token == "never-issued"));
}

#[tokio::test]
async fn test_two_legged_has_no_authorization_step() {
    let server = MockServer::start().await;
    let client = OAuthClient::new(client_config(&server.uri(), OAuthVersion::TwoLegged)).unwrap();

    let err = client
        .authorization_url(OAuthVersion::TwoLegged)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::OAuth(OAuthError::UnsupportedFlow(_))));
}

#[tokio::test]
async fn test_read_without_granted_token() {
    let server = MockServer::start().await;
    let client = OAuthClient::new(client_config(&server.uri(), OAuthVersion::ThreeLegged10a)).unwrap();

    let err = client
        .get_group_members("staff", Some("urn:collab:person:example.com:jdoe"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NoAccessToken(_)));
}

#[tokio::test]
async fn test_two_legged_read_acts_for_requestor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/social/rest/people/jdoe"))
        .and(query_param("xoauth_requestor_id", "jdoe"))
        .and(header_regex("Authorization", "oauth_consumer_key=\"consumer\""))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"entry":{"id":"jdoe","displayName":"J. Doe"}}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = OAuthClient::new(client_config(&server.uri(), OAuthVersion::TwoLegged)).unwrap();
    let person = client.get_person("jdoe", Some("jdoe")).await.unwrap();
    assert_eq!(person.id, "jdoe");
    assert_eq!(person.display_name.as_deref(), Some("J. Doe"));
}

#[tokio::test]
async fn test_error_status_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/social/rest/groups/jdoe"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = OAuthClient::new(client_config(&server.uri(), OAuthVersion::TwoLegged)).unwrap();
    let err = client.get_groups("jdoe", None).await.unwrap_err();
    match err {
        ClientError::Status { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

//! OAuth 1.0a HMAC-SHA1 signatures (RFC 5849, section 3.4)
//!
//! ```
//! use core_auth::signature::percent_encode;
//!
//! assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
//! ```

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use url::Url;

use crate::error::{OAuthError, OAuthResult};

type HmacSha1 = Hmac<Sha1>;

/// Signature method advertised in `oauth_signature_method`
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";

/// Protocol version advertised in `oauth_version`
pub const OAUTH_VERSION: &str = "1.0";

/// Percent-encode a value per RFC 3986 (only unreserved characters are kept)
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Base string URI: scheme and host lowercased, default port dropped, no query
pub fn base_string_uri(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
    format!("{}://{}{}{}", url.scheme(), host, port, url.path())
}

/// Normalize request parameters: encode, sort by name then value, join
pub fn normalize_parameters<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut encoded: Vec<(String, String)> = params
        .into_iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();
    encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the signature base string from its three parts
pub fn signature_base_string(method: &str, base_uri: &str, normalized_params: &str) -> String {
    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(base_uri),
        percent_encode(normalized_params)
    )
}

/// Sign a base string with HMAC-SHA1 and base64-encode the digest
///
/// An empty token secret is used for two-legged and request token calls.
pub fn sign_hmac_sha1(
    base_string: &str,
    consumer_secret: &str,
    token_secret: &str,
) -> OAuthResult<String> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| OAuthError::Signature(e.to_string()))?;
    mac.update(base_string.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Render protocol parameters as an `Authorization: OAuth ...` header value
pub fn authorization_header<'a, I>(oauth_params: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let pairs: Vec<String> = oauth_params
        .into_iter()
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect();
    format!("OAuth {}", pairs.join(", "))
}

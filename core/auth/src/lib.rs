//! OAuth 1.0a utilities: request signing, token types and the three-legged handshake
#![warn(missing_docs)]

pub mod error;
pub mod nonce;
#[cfg(feature = "http")]
pub mod oauth;
pub mod provider;
pub mod request;
pub mod signature;
pub mod types;
pub mod version;

pub use error::{OAuthError, OAuthErrorKind, OAuthResult};
pub use provider::{ConsumerConfig, OAuth10aProvider};
pub use request::{OAuthRequest, OAuthResponse, Verb};
pub use types::{RequestToken, Token};
pub use version::OAuthVersion;

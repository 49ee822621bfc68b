//! Nonce and timestamp generation
//!
//! Every signed OAuth 1.0a request carries a timestamp (seconds since the
//! epoch) and a nonce that is unique for that timestamp.
//!
//! ```
//! use core_auth::nonce::{generate_nonce, timestamp};
//!
//! let nonce = generate_nonce();
//! assert_eq!(nonce.len(), 32);
//! assert!(timestamp() > 0);
//! ```

use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;

/// Length of generated nonces
pub const NONCE_LENGTH: usize = 32;

/// Generate a random alphanumeric nonce
pub fn generate_nonce() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect()
}

/// Current time in seconds since the Unix epoch
pub fn timestamp() -> i64 {
    Utc::now().timestamp()
}

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use connector_opensocial::{GroupProvider, GroupProviderUserOauth, ProvidersConfig};
use tracing_subscriber::fmt::MakeWriter;

/// Three-legged provider at `base_url` mapping `example.com` urns to bare ids
pub fn provider(base_url: &str) -> GroupProvider {
    let source = format!(
        r#"
[[provider]]
identifier = "example"
name = "Example University"
version = "three-legged"
base_url = "{base}"
consumer_key = "consumer"
consumer_secret = "consumer-secret"
request_token_url = "{base}/oauth/request_token"
authorize_url = "{base}/oauth/authorize"
access_token_url = "{base}/oauth/access_token"

[[provider.person_filters]]
property = "id"
search = '^urn:collab:person:example\.com:(.+)$'
replace = "$1"

[[provider.person_decorators]]
property = "id"
search = "^([^:]+)$"
replace = "urn:collab:person:example.com:$1"

[[provider.group_filters]]
property = "id"
search = '^urn:collab:group:example\.com:(.+)$'
replace = "$1"

[[provider.group_filters]]
property = "title"
search = "^Raw Title$"
replace = "Friendly Title"

[[provider.group_decorators]]
property = "id"
search = "^([^:]+)$"
replace = "urn:collab:group:example.com:$1"
"#,
        base = base_url
    );

    let providers = ProvidersConfig::from_toml_str(&source)
        .unwrap()
        .into_providers()
        .unwrap();
    providers.get("example").unwrap().clone()
}

pub fn user_oauth() -> GroupProviderUserOauth {
    GroupProviderUserOauth::new(
        "urn:collab:person:example.com:jdoe",
        "example",
        "access-token",
        "access-secret",
    )
}

/// Log output captured from a thread-local subscriber
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install an info-level subscriber for the current thread
pub fn capture_info_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    capture_logs(tracing::Level::INFO)
}

/// Install a subscriber for the current thread, capturing up to `level`
pub fn capture_logs(level: tracing::Level) -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_max_level(level)
        .with_ansi(false)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

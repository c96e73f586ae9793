//! Default User-Agent sent by [`Client::new`](crate::Client::new).

/// Project URL for User-Agent identification (RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/tamnd/httpfetch";

/// Default User-Agent for fetch requests (identifies the crate and version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("httpfetch/{version} (+{PROJECT_UA_URL})")
}

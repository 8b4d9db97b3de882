//! Best-effort public IP resolution for NDA acceptance records.
//!
//! The acceptance record wants the signer's address, but a failed lookup
//! must never block acceptance: the fallback is the literal `"unknown"`.

use std::time::Duration;

/// Public IP echo service (returns the caller's address as plain text).
const IP_ECHO_URL: &str = "https://api.ipify.org";

/// Lookup timeout; past this the result is `"unknown"`.
const IP_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Recorded when the lookup fails or times out.
pub const UNKNOWN_IP: &str = "unknown";

/// Resolve the caller's public IP address, or `"unknown"`.
pub async fn resolve_public_ip() -> String {
    resolve_from(IP_ECHO_URL).await
}

async fn resolve_from(url: &str) -> String {
    let fetch = async {
        let response = reqwest::get(url).await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let text = response.text().await.ok()?;
        let candidate = text.trim();
        candidate.parse::<std::net::IpAddr>().ok()?;
        Some(candidate.to_string())
    };

    match tokio::time::timeout(IP_LOOKUP_TIMEOUT, fetch).await {
        Ok(Some(ip)) => ip,
        Ok(None) => {
            tracing::debug!("IP lookup failed; recording unknown");
            UNKNOWN_IP.to_string()
        }
        Err(_) => {
            tracing::debug!("IP lookup timed out; recording unknown");
            UNKNOWN_IP.to_string()
        }
    }
}

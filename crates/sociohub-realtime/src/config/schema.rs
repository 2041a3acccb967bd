use std::time::Duration;

use serde::Deserialize;
use url::Url;

use sociohub_core::deeplink::DEFAULT_CANONICAL_HOST;
use sociohub_core::error::{Result, SocioHubError};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub version: u32,

    pub realtime: RealtimeSection,

    #[serde(default)]
    pub deep_link: DeepLinkSection,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(SocioHubError::UnsupportedVersion);
        }
        self.realtime.validate()?;
        self.deep_link.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RealtimeSection {
    /// `ws://` or `wss://` endpoint.
    pub url: String,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default)]
    pub transport: TransportSection,
}

impl RealtimeSection {
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.url)
            .map_err(|e| SocioHubError::BadRequest(format!("realtime.url invalid: {e}")))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(SocioHubError::BadRequest(
                "realtime.url must use ws:// or wss://".into(),
            ));
        }
        if !(100..=60_000).contains(&self.base_delay_ms) {
            return Err(SocioHubError::BadRequest(
                "realtime.base_delay_ms must be between 100 and 60000".into(),
            ));
        }
        if !(1..=10).contains(&self.max_retries) {
            return Err(SocioHubError::BadRequest(
                "realtime.max_retries must be between 1 and 10".into(),
            ));
        }
        if !(1_000..=120_000).contains(&self.connect_timeout_ms) {
            return Err(SocioHubError::BadRequest(
                "realtime.connect_timeout_ms must be between 1000 and 120000".into(),
            ));
        }
        self.transport.validate()
    }

    pub fn endpoint(&self) -> Result<Url> {
        Url::parse(&self.url)
            .map_err(|e| SocioHubError::BadRequest(format!("realtime.url invalid: {e}")))
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

fn default_base_delay_ms() -> u64 {
    1000
}
fn default_max_retries() -> u32 {
    3
}
fn default_connect_timeout_ms() -> u64 {
    10_000
}

/// Transport-native reconnection, layered under the session retry policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransportSection {
    #[serde(default = "default_reconnection_attempts")]
    pub reconnection_attempts: u32,

    #[serde(default = "default_reconnection_delay_ms")]
    pub reconnection_delay_ms: u64,
}

impl Default for TransportSection {
    fn default() -> Self {
        Self {
            reconnection_attempts: default_reconnection_attempts(),
            reconnection_delay_ms: default_reconnection_delay_ms(),
        }
    }
}

impl TransportSection {
    pub fn validate(&self) -> Result<()> {
        if self.reconnection_attempts > 10 {
            return Err(SocioHubError::BadRequest(
                "realtime.transport.reconnection_attempts must be at most 10".into(),
            ));
        }
        if !(10..=30_000).contains(&self.reconnection_delay_ms) {
            return Err(SocioHubError::BadRequest(
                "realtime.transport.reconnection_delay_ms must be between 10 and 30000".into(),
            ));
        }
        Ok(())
    }

    pub fn reconnection_delay(&self) -> Duration {
        Duration::from_millis(self.reconnection_delay_ms)
    }
}

fn default_reconnection_attempts() -> u32 {
    2
}
fn default_reconnection_delay_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeepLinkSection {
    #[serde(default = "default_canonical_host")]
    pub canonical_host: String,
}

impl Default for DeepLinkSection {
    fn default() -> Self {
        Self {
            canonical_host: default_canonical_host(),
        }
    }
}

impl DeepLinkSection {
    pub fn validate(&self) -> Result<()> {
        let ok = Url::parse(&format!("https://{}/", self.canonical_host))
            .ok()
            .and_then(|u| u.host_str().map(|h| h.eq_ignore_ascii_case(&self.canonical_host)))
            .unwrap_or(false);
        if !ok {
            return Err(SocioHubError::BadRequest(format!(
                "deep_link.canonical_host is not a bare host: {}",
                self.canonical_host
            )));
        }
        Ok(())
    }
}

fn default_canonical_host() -> String {
    DEFAULT_CANONICAL_HOST.into()
}

//! Deep-link / payment-callback interpreter.
//!
//! Accepts both custom app-scheme URLs (`sociohub://payment-success?...`) and
//! plain https URLs. Custom schemes are rewritten to
//! `https://<canonical host>/<rest>` so a single URL parser handles both.
//!
//! Interpretation never fails: anything unparsable becomes [`Route::Unknown`]
//! with no parameters.

use std::collections::BTreeMap;

use url::Url;

/// Host used when rewriting custom-scheme links.
pub const DEFAULT_CANONICAL_HOST: &str = "sociohub.app";

/// In-app destinations a link can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    PaymentSuccess,
    PaymentCancelled,
    #[default]
    Unknown,
}

impl Route {
    pub fn as_str(self) -> &'static str {
        match self {
            Route::PaymentSuccess => "payment-success",
            Route::PaymentCancelled => "payment-cancelled",
            Route::Unknown => "unknown",
        }
    }

    fn from_segment(seg: &str) -> Option<Route> {
        match seg {
            "payment-success" => Some(Route::PaymentSuccess),
            "payment-cancelled" => Some(Route::PaymentCancelled),
            _ => None,
        }
    }
}

/// Interpreted link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeepLink {
    pub route: Route,
    /// Decoded query parameters; the last value wins on duplicate keys.
    pub params: BTreeMap<String, String>,
}

impl DeepLink {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Checkout session id carried by payment callbacks.
    pub fn session_id(&self) -> Option<&str> {
        self.param("session_id")
    }

    /// Event the payment was for.
    pub fn event_id(&self) -> Option<&str> {
        self.param("eventId")
    }

    pub fn is_payment(&self) -> bool {
        matches!(self.route, Route::PaymentSuccess | Route::PaymentCancelled)
    }
}

/// Interpret `raw` using `canonical_host` for custom-scheme rewriting.
pub fn interpret(raw: &str, canonical_host: &str) -> DeepLink {
    let Some(url) = canonicalize(raw.trim(), canonical_host) else {
        tracing::debug!(link = %raw, "unparsable deep link");
        return DeepLink::unknown();
    };

    // A route matches a whole path segment, never a substring of the query.
    let route = url
        .path_segments()
        .and_then(|mut segs| segs.find_map(Route::from_segment))
        .unwrap_or(Route::Unknown);

    let params = url.query_pairs().into_owned().collect();

    DeepLink { route, params }
}

fn canonicalize(raw: &str, canonical_host: &str) -> Option<Url> {
    let (scheme, rest) = raw.split_once("://")?;
    if scheme.is_empty() {
        return None;
    }
    if scheme.eq_ignore_ascii_case("https") || scheme.eq_ignore_ascii_case("http") {
        return Url::parse(raw).ok();
    }
    Url::parse(&format!("https://{canonical_host}/{rest}")).ok()
}

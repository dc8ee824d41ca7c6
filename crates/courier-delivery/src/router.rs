//! Destination routing by declared payload type.
//!
//! Maps a message's top-level `type` field to a destination URL, falling
//! back to a default when the field is absent, not a string, or matches
//! no entry. Resolution is pure and infallible: every payload gets some
//! destination.

use std::collections::HashMap;

use serde::Deserialize;

/// Static mapping of payload type to destination URL.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: HashMap<String, String>,
    default_url: String,
}

impl RouteTable {
    /// Creates a route table with the given mapping and fallback URL.
    pub fn new(routes: HashMap<String, String>, default_url: String) -> Self {
        Self { routes, default_url }
    }

    /// Creates a table that routes everything to `default_url`.
    pub fn with_default(default_url: impl Into<String>) -> Self {
        Self { routes: HashMap::new(), default_url: default_url.into() }
    }

    /// Resolves the destination URL for a payload.
    ///
    /// An unparseable body or a missing, non-string, or unmatched `type`
    /// field is not an error: it silently selects the default route.
    pub fn resolve(&self, payload: &[u8]) -> &str {
        match declared_type(payload) {
            Some(kind) => self.routes.get(&kind).map_or(self.default_url.as_str(), String::as_str),
            None => &self.default_url,
        }
    }

    /// The fallback destination URL.
    pub fn default_url(&self) -> &str {
        &self.default_url
    }
}

/// Extracts the top-level `type` string field from a JSON payload.
fn declared_type(payload: &[u8]) -> Option<String> {
    #[derive(Deserialize)]
    struct Probe {
        #[serde(rename = "type")]
        kind: Option<String>,
    }

    serde_json::from_slice::<Probe>(payload).ok().and_then(|probe| probe.kind)
}

use std::fmt::{Display, Formatter};

use marketctx_core::{ProviderId, Symbol, UtcDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request identifier (UUID v4) for end-to-end request tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Envelope metadata. Field order is fixed to keep JSON output deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub request_id: RequestId,
    pub generated_at: UtcDateTime,
    pub latency_ms: u64,
    pub primary: Option<Symbol>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_chain: Vec<ProviderId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Metadata {
    pub fn new(latency_ms: u64, primary: Option<Symbol>) -> Self {
        Self {
            request_id: RequestId::new_v4(),
            generated_at: UtcDateTime::now(),
            latency_ms,
            primary,
            source_chain: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_source_chain(mut self, source_chain: Vec<ProviderId>) -> Self {
        self.source_chain = source_chain;
        self
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_required_fields_in_order() {
        let metadata = Metadata::new(42, Some(Symbol::parse("NVDA").expect("valid")));

        let json = serde_json::to_string(&metadata).expect("serializable");

        let request_id = json.find("\"request_id\"").expect("request_id");
        let generated_at = json.find("\"generated_at\"").expect("generated_at");
        let latency = json.find("\"latency_ms\":42").expect("latency_ms");
        let primary = json.find("\"primary\":\"NVDA\"").expect("primary");
        assert!(request_id < generated_at && generated_at < latency && latency < primary);
        assert!(!json.contains("warnings"));
    }

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(RequestId::new_v4(), RequestId::new_v4());
    }
}

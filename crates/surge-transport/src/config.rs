#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Scheme, host and optional prefix; request paths are appended verbatim.
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_ms: 30_000,
        }
    }
}

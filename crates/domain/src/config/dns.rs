use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    /// Address returned for every A query.
    #[serde(default = "default_dummy_address")]
    pub dummy_address: String,

    #[serde(default = "default_address_ttl")]
    pub address_ttl: u32,

    /// DoH-JSON endpoint used for TXT names outside the tunnel layout.
    /// When unset those names are answered NOERROR with no records.
    #[serde(default)]
    pub passthrough_upstream: Option<String>,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            dummy_address: default_dummy_address(),
            address_ttl: default_address_ttl(),
            passthrough_upstream: None,
        }
    }
}

fn default_dummy_address() -> String {
    "1.1.1.1".to_string()
}

fn default_address_ttl() -> u32 {
    300
}

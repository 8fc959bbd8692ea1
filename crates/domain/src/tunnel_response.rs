use std::collections::BTreeMap;

/// The captured result of one outbound HTTP call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl TunnelResponse {
    pub fn new(status: u16, headers: BTreeMap<String, String>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn is_valid_status(status: u16) -> bool {
        (100..=599).contains(&status)
    }
}

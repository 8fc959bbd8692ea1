use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// Longest character-string a TXT record can carry.
pub const MAX_TXT_STRING_LEN: usize = 255;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TunnelConfig {
    /// Domain the relay is served under. Targets at or below it are refused.
    #[serde(default = "default_own_domain")]
    pub own_domain: String,

    /// Second label of a tunnel query name: `<payload>.<data_label>.<suffix>`.
    #[serde(default = "default_data_label")]
    pub data_label: String,

    #[serde(default)]
    pub encoding: LabelEncoding,

    #[serde(default)]
    pub envelope: EnvelopeFormat,

    /// Upper bound for the characters in one TXT answer, quotes excluded.
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    #[serde(default = "default_min_label_length")]
    pub min_label_length: usize,

    #[serde(default = "default_answer_ttl")]
    pub answer_ttl: u32,
}

impl TunnelConfig {
    pub fn chunk_size(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.max_chunk_size).unwrap_or(NonZeroUsize::MIN)
    }
}

/// DNS-safe alphabet for query labels and answer payloads.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LabelEncoding {
    #[default]
    Hex,

    Base64url,
}

impl LabelEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hex => "hex",
            Self::Base64url => "base64url",
        }
    }
}

/// Byte layout of the envelope before alphabet encoding.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeFormat {
    #[default]
    Json,

    Binary,
}

impl EnvelopeFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Binary => "binary",
        }
    }
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            own_domain: default_own_domain(),
            data_label: default_data_label(),
            encoding: LabelEncoding::default(),
            envelope: EnvelopeFormat::default(),
            max_chunk_size: default_max_chunk_size(),
            min_label_length: default_min_label_length(),
            answer_ttl: default_answer_ttl(),
        }
    }
}

fn default_own_domain() -> String {
    "relay.test".to_string()
}

fn default_data_label() -> String {
    "data".to_string()
}

fn default_max_chunk_size() -> usize {
    200
}

fn default_min_label_length() -> usize {
    8
}

fn default_answer_ttl() -> u32 {
    60
}

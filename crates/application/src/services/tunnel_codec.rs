//! Label-safe encoding of tunnel requests and response envelopes.
//!
//! Requests travel in the first label of the query name as
//! `alphabet(json)`, where the JSON object carries `url` and optionally
//! `method`, `headers` and `body` (the body itself alphabet-encoded).
//!
//! Responses travel as `alphabet(envelope)` split over TXT answers. The
//! envelope is either JSON (`{"status", "headers", "body"}` or
//! `{"error", "status"}`) or the binary layout in [`super::envelope_layout`].

use super::envelope_layout;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use dohtunnel_domain::config::{EnvelopeFormat, LabelEncoding, TunnelConfig};
use dohtunnel_domain::envelope::ERROR_ENVELOPE_STATUS;
use dohtunnel_domain::tunnel_request::DEFAULT_METHOD;
use dohtunnel_domain::{DomainError, Envelope, TunnelRequest, TunnelResponse};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct WireRequest {
    #[serde(default)]
    method: Option<String>,
    url: String,
    #[serde(default)]
    headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WireResponse {
    status: u16,
    headers: BTreeMap<String, String>,
    body: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WireError {
    error: String,
    status: u16,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireEnvelope {
    Response(WireResponse),
    Error(WireError),
}

#[derive(Debug, Clone)]
pub struct TunnelCodec {
    encoding: LabelEncoding,
    envelope: EnvelopeFormat,
    min_label_length: usize,
}

impl TunnelCodec {
    pub fn new(encoding: LabelEncoding, envelope: EnvelopeFormat, min_label_length: usize) -> Self {
        Self {
            encoding,
            envelope,
            min_label_length,
        }
    }

    pub fn from_config(config: &TunnelConfig) -> Self {
        Self::new(config.encoding, config.envelope, config.min_label_length)
    }

    pub fn encoding(&self) -> LabelEncoding {
        self.encoding
    }

    pub fn envelope_format(&self) -> EnvelopeFormat {
        self.envelope
    }

    pub fn encode_bytes(&self, bytes: &[u8]) -> String {
        match self.encoding {
            LabelEncoding::Hex => hex::encode(bytes),
            LabelEncoding::Base64url => URL_SAFE_NO_PAD.encode(bytes),
        }
    }

    /// Decodes text in the configured alphabet. Hex is case-insensitive;
    /// base64url padding is accepted and stripped.
    pub fn decode_bytes(&self, text: &str) -> Result<Vec<u8>, DomainError> {
        match self.encoding {
            LabelEncoding::Hex => {
                if let Some(bad) = text.chars().find(|c| !c.is_ascii_hexdigit()) {
                    return Err(DomainError::MalformedLabel(format!(
                        "character {:?} is not a hex digit",
                        bad
                    )));
                }
                hex::decode(text).map_err(|e| DomainError::MalformedLabel(e.to_string()))
            }
            LabelEncoding::Base64url => {
                let trimmed = text.trim_end_matches('=');
                if let Some(bad) = trimmed
                    .chars()
                    .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
                {
                    return Err(DomainError::MalformedLabel(format!(
                        "character {:?} is not in the base64url alphabet",
                        bad
                    )));
                }
                URL_SAFE_NO_PAD
                    .decode(trimmed)
                    .map_err(|e| DomainError::MalformedLabel(e.to_string()))
            }
        }
    }

    /// Decodes the payload label of a tunnel query into the request it carries.
    /// Performs no I/O.
    pub fn decode_request(&self, label: &str) -> Result<TunnelRequest, DomainError> {
        if label.len() < self.min_label_length {
            return Err(DomainError::MalformedLabel(format!(
                "label is {} characters, at least {} required",
                label.len(),
                self.min_label_length
            )));
        }

        let bytes = self.decode_bytes(label)?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| DomainError::InvalidPayload(format!("payload is not UTF-8: {}", e)))?;
        let wire: WireRequest = serde_json::from_str(text)
            .map_err(|e| DomainError::InvalidPayload(format!("payload is not a request: {}", e)))?;

        let method = match wire.method.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_METHOD.to_string(),
            Some(m) => {
                let method = http::Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                    .map_err(|_| DomainError::InvalidPayload(format!("invalid method {:?}", m)))?;
                method.as_str().to_string()
            }
        };

        validate_url(&wire.url)?;

        let body = match wire.body.as_deref() {
            None | Some("") => None,
            Some(encoded) => Some(self.decode_bytes(encoded).map_err(|e| {
                DomainError::InvalidPayload(format!("request body is not encoded: {}", e))
            })?),
        };

        Ok(TunnelRequest {
            method,
            url: wire.url,
            headers: wire.headers.unwrap_or_default(),
            body,
        })
    }

    /// Client side of [`Self::decode_request`].
    pub fn encode_request(&self, request: &TunnelRequest) -> String {
        let mut object = Map::new();
        object.insert("method".into(), Value::from(request.method.as_str()));
        object.insert("url".into(), Value::from(request.url.as_str()));
        if !request.headers.is_empty() {
            object.insert("headers".into(), json!(request.headers));
        }
        if let Some(body) = &request.body {
            object.insert("body".into(), Value::from(self.encode_bytes(body)));
        }

        self.encode_bytes(Value::Object(object).to_string().as_bytes())
    }

    pub fn encode_response(&self, response: &TunnelResponse) -> String {
        let bytes = match self.envelope {
            EnvelopeFormat::Json => self.response_json(response).to_string().into_bytes(),
            EnvelopeFormat::Binary => envelope_layout::encode_response(response),
        };
        self.encode_bytes(&bytes)
    }

    pub fn encode_error(&self, message: &str) -> String {
        self.encode_failure(message, ERROR_ENVELOPE_STATUS)
    }

    pub fn encode_envelope(&self, envelope: &Envelope) -> String {
        match envelope {
            Envelope::Response(resp) => self.encode_response(resp),
            Envelope::Error { error, status } => self.encode_failure(error, *status),
        }
    }

    fn encode_failure(&self, message: &str, status: u16) -> String {
        let bytes = match self.envelope {
            EnvelopeFormat::Json => json!({ "error": message, "status": status })
                .to_string()
                .into_bytes(),
            EnvelopeFormat::Binary => envelope_layout::encode_error(message, status),
        };
        self.encode_bytes(&bytes)
    }

    /// Decodes a reassembled answer stream. Unknown fields and out-of-range
    /// statuses are rejected.
    pub fn decode_envelope(&self, encoded: &str) -> Result<Envelope, DomainError> {
        let bytes = self
            .decode_bytes(encoded)
            .map_err(|e| DomainError::InvalidEnvelope(e.to_string()))?;

        let envelope = match self.envelope {
            EnvelopeFormat::Json => self.envelope_from_json(&bytes)?,
            EnvelopeFormat::Binary => envelope_layout::decode(&bytes)?,
        };

        let status = envelope.status();
        if !TunnelResponse::is_valid_status(status) {
            return Err(DomainError::InvalidEnvelope(format!(
                "status {} out of range",
                status
            )));
        }

        Ok(envelope)
    }

    fn response_json(&self, response: &TunnelResponse) -> Value {
        json!({
            "status": response.status,
            "headers": response.headers,
            "body": self.encode_bytes(&response.body),
        })
    }

    fn envelope_from_json(&self, bytes: &[u8]) -> Result<Envelope, DomainError> {
        let wire: WireEnvelope = serde_json::from_slice(bytes)
            .map_err(|e| DomainError::InvalidEnvelope(e.to_string()))?;

        match wire {
            WireEnvelope::Response(resp) => {
                let body = self
                    .decode_bytes(&resp.body)
                    .map_err(|e| DomainError::InvalidEnvelope(format!("body: {}", e)))?;
                Ok(Envelope::Response(TunnelResponse::new(
                    resp.status,
                    resp.headers,
                    body,
                )))
            }
            WireEnvelope::Error(err) => Ok(Envelope::Error {
                error: err.error,
                status: err.status,
            }),
        }
    }
}

fn validate_url(url: &str) -> Result<(), DomainError> {
    let uri: http::Uri = url
        .parse()
        .map_err(|e| DomainError::InvalidPayload(format!("invalid url {:?}: {}", url, e)))?;

    match uri.scheme_str() {
        Some("http") | Some("https") => {}
        _ => {
            return Err(DomainError::InvalidPayload(format!(
                "url {:?} is not absolute http(s)",
                url
            )))
        }
    }

    if uri.host().map_or(true, str::is_empty) {
        return Err(DomainError::InvalidPayload(format!(
            "url {:?} has no host",
            url
        )));
    }

    Ok(())
}

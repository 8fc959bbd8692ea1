//! DoH-JSON client (`application/dns-json`), the format served by public
//! resolvers on `?name=&type=` and by this relay itself.

use async_trait::async_trait;
use dohtunnel_application::ports::NameResolver;
use dohtunnel_domain::{
    Answer, AnswerData, AnswerSet, Chunk, DnsStatus, DomainError, RecordType, TunnelQuery,
};
use serde::Deserialize;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const DNS_JSON_CONTENT_TYPE: &str = "application/dns-json";

#[derive(Debug, Deserialize)]
struct DohJsonMessage {
    #[serde(rename = "Status")]
    status: u8,
    #[serde(rename = "Answer", default)]
    answer: Vec<DohJsonAnswer>,
}

#[derive(Debug, Deserialize)]
struct DohJsonAnswer {
    name: String,
    #[serde(rename = "type")]
    record_type: u16,
    #[serde(rename = "TTL", default)]
    ttl: u32,
    data: String,
}

pub struct DohJsonResolver {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
    max_body_bytes: usize,
}

impl DohJsonResolver {
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
        max_body_bytes: usize,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| DomainError::InternalFault(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
            max_body_bytes,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self, query: &TunnelQuery) -> Result<Vec<u8>, DomainError> {
        let record_type = query.record_type.unwrap_or(RecordType::TXT);

        let mut response = self
            .client
            .get(&self.url)
            .query(&[("name", &*query.name), ("type", record_type.as_str())])
            .header("Accept", DNS_JSON_CONTENT_TYPE)
            .send()
            .await
            .map_err(|e| DomainError::RelayError {
                cause: format!("DoH-JSON request to {} failed: {}", self.url, e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::RelayError {
                cause: format!("DoH-JSON server {} returned HTTP {}", self.url, status.as_u16()),
            });
        }

        if let Some(len) = response.content_length() {
            if len > self.max_body_bytes as u64 {
                return Err(DomainError::BodyTooLarge {
                    limit: self.max_body_bytes,
                });
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| DomainError::RelayError {
            cause: format!("Failed to read DoH-JSON response from {}: {}", self.url, e),
        })? {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(DomainError::BodyTooLarge {
                    limit: self.max_body_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}

#[async_trait]
impl NameResolver for DohJsonResolver {
    async fn resolve(&self, query: &TunnelQuery) -> Result<AnswerSet, DomainError> {
        debug!(url = %self.url, name = %query.name, "Sending DoH-JSON query");

        let body = tokio::time::timeout(self.timeout, self.fetch(query))
            .await
            .map_err(|_| DomainError::Timeout(self.timeout))??;

        let answers = parse_message(&body)?;

        debug!(
            url = %self.url,
            status = %answers.status(),
            answers = answers.len(),
            "DoH-JSON response received"
        );

        Ok(answers)
    }
}

/// Converts a DoH-JSON body into an answer set. Unsupported record types are
/// skipped; an unknown status code is treated as SERVFAIL.
pub fn parse_message(body: &[u8]) -> Result<AnswerSet, DomainError> {
    let message: DohJsonMessage = serde_json::from_slice(body)
        .map_err(|e| DomainError::RelayError {
            cause: format!("invalid DoH-JSON body: {}", e),
        })?;

    let status = DnsStatus::from_code(message.status).unwrap_or(DnsStatus::ServFail);

    let mut answers = Vec::with_capacity(message.answer.len());
    let mut text_ordinal = 0;

    for raw in message.answer {
        let Some(record_type) = RecordType::from_u16(raw.record_type) else {
            continue;
        };

        let data = match record_type {
            RecordType::TXT => {
                let chunk = Chunk::new(text_ordinal, unquote_txt(&raw.data));
                text_ordinal += 1;
                AnswerData::Text(chunk)
            }
            RecordType::A | RecordType::AAAA => match raw.data.parse::<IpAddr>() {
                Ok(addr) => AnswerData::Address(addr),
                Err(_) => continue,
            },
            _ => continue,
        };

        answers.push(Answer {
            name: Arc::from(raw.name.as_str()),
            record_type,
            ttl: raw.ttl,
            data,
        });
    }

    Ok(AnswerSet::with_answers(status, answers))
}

/// Presentation form of TXT data to its raw text. Multi-string records
/// (`"a" "b"`) are concatenated; unquoted data is returned as is.
fn unquote_txt(data: &str) -> String {
    let trimmed = data.trim();
    if !trimmed.starts_with('"') {
        return trimmed.to_string();
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut in_string = false;
    let mut chars = trimmed.chars();

    while let Some(c) = chars.next() {
        match (c, in_string) {
            ('"', _) => in_string = !in_string,
            ('\\', true) => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            (c, true) => out.push(c),
            (_, false) => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote_txt() {
        assert_eq!(unquote_txt("\"abc\""), "abc");
        assert_eq!(unquote_txt("\"ab\" \"cd\""), "abcd");
        assert_eq!(unquote_txt("\"a\\\"b\""), "a\"b");
        assert_eq!(unquote_txt("plain"), "plain");
    }

    #[test]
    fn test_parse_message_orders_text_chunks() {
        let body = br#"{"Status":0,"Answer":[
            {"name":"x.data.relay.test","type":16,"TTL":60,"data":"\"aa\""},
            {"name":"x.data.relay.test","type":5,"TTL":60,"data":"alias.test."},
            {"name":"x.data.relay.test","type":16,"TTL":60,"data":"\"bb\""}
        ]}"#;

        let answers = parse_message(body).unwrap();

        assert_eq!(answers.status(), DnsStatus::NoError);
        let chunks: Vec<_> = answers.chunks().cloned().collect();
        assert_eq!(chunks, vec![Chunk::new(0, "aa"), Chunk::new(1, "bb")]);
    }

    #[test]
    fn test_parse_message_without_answers() {
        let answers = parse_message(br#"{"Status":3}"#).unwrap();

        assert_eq!(answers.status(), DnsStatus::NxDomain);
        assert!(answers.is_empty());
    }

    #[test]
    fn test_unknown_status_is_servfail() {
        let answers = parse_message(br#"{"Status":5,"Answer":[]}"#).unwrap();
        assert_eq!(answers.status(), DnsStatus::ServFail);
    }
}

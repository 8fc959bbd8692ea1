//! Binary envelope layout, big-endian throughout:
//!
//! ```text
//! +-----+--------+---------+---------------------------------+-----------+
//! | tag | status | headers | header block                    | trailer   |
//! | u8  | u16    | u16     | (u16 len, name, u32 len, value)*| raw bytes |
//! +-----+--------+---------+---------------------------------+-----------+
//! ```
//!
//! Tag `0x01` is a relayed response whose trailer is the body. Tag `0x02` is
//! an error whose header count is zero and whose trailer is the UTF-8 message.

use dohtunnel_domain::{DomainError, Envelope, TunnelResponse};
use std::collections::BTreeMap;

const TAG_RESPONSE: u8 = 0x01;
const TAG_ERROR: u8 = 0x02;

pub fn encode(envelope: &Envelope) -> Vec<u8> {
    match envelope {
        Envelope::Response(resp) => encode_response(resp),
        Envelope::Error { error, status } => encode_error(error, *status),
    }
}

pub fn encode_response(response: &TunnelResponse) -> Vec<u8> {
    // Headers that cannot be length-prefixed are dropped.
    let headers: Vec<(&String, &String)> = response
        .headers
        .iter()
        .filter(|(name, value)| name.len() <= u16::MAX as usize && value.len() <= u32::MAX as usize)
        .take(u16::MAX as usize)
        .collect();

    let block_len: usize = headers.iter().map(|(n, v)| 6 + n.len() + v.len()).sum();
    let mut out = Vec::with_capacity(5 + block_len + response.body.len());

    out.push(TAG_RESPONSE);
    out.extend_from_slice(&response.status.to_be_bytes());
    out.extend_from_slice(&(headers.len() as u16).to_be_bytes());
    for (name, value) in headers {
        out.extend_from_slice(&(name.len() as u16).to_be_bytes());
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(&(value.len() as u32).to_be_bytes());
        out.extend_from_slice(value.as_bytes());
    }
    out.extend_from_slice(&response.body);
    out
}

pub fn encode_error(message: &str, status: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(5 + message.len());
    out.push(TAG_ERROR);
    out.extend_from_slice(&status.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(message.as_bytes());
    out
}

pub fn decode(bytes: &[u8]) -> Result<Envelope, DomainError> {
    let mut reader = Reader::new(bytes);

    let tag = reader.u8()?;
    let status = reader.u16()?;
    let count = reader.u16()?;

    let mut headers = BTreeMap::new();
    for _ in 0..count {
        let name_len = reader.u16()? as usize;
        let name = reader.utf8(name_len)?;
        let value_len = reader.u32()? as usize;
        let value = reader.utf8(value_len)?;
        headers.insert(name, value);
    }

    let trailer = reader.rest();

    match tag {
        TAG_RESPONSE => Ok(Envelope::Response(TunnelResponse::new(
            status,
            headers,
            trailer.to_vec(),
        ))),
        TAG_ERROR => {
            if !headers.is_empty() {
                return Err(DomainError::InvalidEnvelope(
                    "error envelope carries headers".to_string(),
                ));
            }
            let error = String::from_utf8(trailer.to_vec()).map_err(|_| {
                DomainError::InvalidEnvelope("error message is not UTF-8".to_string())
            })?;
            Ok(Envelope::Error { error, status })
        }
        other => Err(DomainError::InvalidEnvelope(format!(
            "unknown envelope tag 0x{:02x}",
            other
        ))),
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DomainError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| {
                DomainError::InvalidEnvelope(format!(
                    "truncated at offset {} (need {} bytes)",
                    self.pos, len
                ))
            })?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, DomainError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, DomainError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, DomainError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn utf8(&mut self, len: usize) -> Result<String, DomainError> {
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| DomainError::InvalidEnvelope("header is not UTF-8".to_string()))
    }

    fn rest(&mut self) -> &'a [u8] {
        let rest = &self.buf[self.pos..];
        self.pos = self.buf.len();
        rest
    }
}

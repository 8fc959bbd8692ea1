use super::{Chunk, DnsStatus, RecordType};
use std::net::IpAddr;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerData {
    Text(Chunk),
    Address(IpAddr),
}

impl AnswerData {
    /// Presentation form used in the DoH-JSON `data` field.
    /// Text chunks are wrapped in a single pair of double quotes.
    pub fn render(&self) -> String {
        match self {
            AnswerData::Text(chunk) => format!("\"{}\"", chunk.payload),
            AnswerData::Address(addr) => addr.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub name: Arc<str>,
    pub record_type: RecordType,
    pub ttl: u32,
    pub data: AnswerData,
}

/// Answers for one inbound query. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSet {
    status: DnsStatus,
    answers: Vec<Answer>,
}

impl AnswerSet {
    pub fn empty(status: DnsStatus) -> Self {
        Self {
            status,
            answers: Vec::new(),
        }
    }

    pub fn from_chunks(name: Arc<str>, ttl: u32, chunks: Vec<Chunk>) -> Self {
        let answers = chunks
            .into_iter()
            .map(|chunk| Answer {
                name: name.clone(),
                record_type: RecordType::TXT,
                ttl,
                data: AnswerData::Text(chunk),
            })
            .collect();

        Self {
            status: DnsStatus::NoError,
            answers,
        }
    }

    pub fn from_addresses(name: Arc<str>, ttl: u32, addresses: &[IpAddr]) -> Self {
        let answers = addresses
            .iter()
            .map(|addr| Answer {
                name: name.clone(),
                record_type: match addr {
                    IpAddr::V4(_) => RecordType::A,
                    IpAddr::V6(_) => RecordType::AAAA,
                },
                ttl,
                data: AnswerData::Address(*addr),
            })
            .collect();

        Self {
            status: DnsStatus::NoError,
            answers,
        }
    }

    pub fn with_answers(status: DnsStatus, answers: Vec<Answer>) -> Self {
        Self { status, answers }
    }

    pub fn status(&self) -> DnsStatus {
        self.status
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    /// Text chunks in answer order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.answers.iter().filter_map(|a| match &a.data {
            AnswerData::Text(chunk) => Some(chunk),
            AnswerData::Address(_) => None,
        })
    }
}

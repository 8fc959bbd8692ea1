use dohtunnel_domain::{Answer, AnswerSet};
use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DohJsonAnswer {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: u16,
    #[serde(rename = "TTL")]
    pub ttl: u32,
    pub data: String,
}

impl From<&Answer> for DohJsonAnswer {
    fn from(answer: &Answer) -> Self {
        Self {
            name: answer.name.to_string(),
            record_type: answer.record_type.to_u16(),
            ttl: answer.ttl,
            data: answer.data.render(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DohJsonResponse {
    #[serde(rename = "Status")]
    pub status: u8,
    #[serde(rename = "Answer")]
    pub answer: Vec<DohJsonAnswer>,
}

impl From<&AnswerSet> for DohJsonResponse {
    fn from(set: &AnswerSet) -> Self {
        Self {
            status: set.status().code(),
            answer: set.answers().iter().map(DohJsonAnswer::from).collect(),
        }
    }
}

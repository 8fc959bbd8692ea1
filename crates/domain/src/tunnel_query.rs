use super::RecordType;
use std::sync::Arc;

/// An inbound synthetic DNS question: the `name`/`type` pair of a DoH-JSON request.
#[derive(Debug, Clone)]
pub struct TunnelQuery {
    pub name: Arc<str>,
    /// `None` when the requested type is not one this relay recognises.
    pub record_type: Option<RecordType>,
}

impl TunnelQuery {
    pub fn new(name: impl Into<Arc<str>>, record_type: RecordType) -> Self {
        Self {
            name: name.into(),
            record_type: Some(record_type),
        }
    }

    /// Builds a query from raw request parameters. A missing type defaults to TXT.
    pub fn from_params(name: Option<&str>, record_type: Option<&str>) -> Self {
        let record_type = match record_type.map(str::trim).filter(|t| !t.is_empty()) {
            None => Some(RecordType::TXT),
            Some(raw) => RecordType::parse_param(raw).ok(),
        };

        Self {
            name: name.unwrap_or_default().trim().into(),
            record_type,
        }
    }

    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }

    /// Non-empty labels of the name, ignoring a trailing root dot.
    pub fn labels(&self) -> Vec<&str> {
        self.name
            .trim_end_matches('.')
            .split('.')
            .filter(|l| !l.is_empty())
            .collect()
    }
}

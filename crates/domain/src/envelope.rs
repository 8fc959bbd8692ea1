use super::TunnelResponse;

/// Status carried by every error envelope.
pub const ERROR_ENVELOPE_STATUS: u16 = 500;

/// The tunneled payload: either a relayed response or a textual failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    Response(TunnelResponse),
    Error { error: String, status: u16 },
}

impl Envelope {
    pub fn error(message: impl Into<String>) -> Self {
        Envelope::Error {
            error: message.into(),
            status: ERROR_ENVELOPE_STATUS,
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            Envelope::Response(resp) => resp.status,
            Envelope::Error { status, .. } => *status,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Envelope::Error { .. })
    }
}

impl From<TunnelResponse> for Envelope {
    fn from(resp: TunnelResponse) -> Self {
        Envelope::Response(resp)
    }
}

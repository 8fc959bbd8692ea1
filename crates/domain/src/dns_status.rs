use std::fmt;

/// Response code carried in the `Status` field of a DoH-JSON answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DnsStatus {
    #[default]
    NoError,
    ServFail,
    NxDomain,
}

impl DnsStatus {
    pub fn code(&self) -> u8 {
        match self {
            DnsStatus::NoError => 0,
            DnsStatus::ServFail => 2,
            DnsStatus::NxDomain => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(DnsStatus::NoError),
            2 => Some(DnsStatus::ServFail),
            3 => Some(DnsStatus::NxDomain),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DnsStatus::NoError => "NOERROR",
            DnsStatus::ServFail => "SERVFAIL",
            DnsStatus::NxDomain => "NXDOMAIN",
        }
    }
}

impl fmt::Display for DnsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

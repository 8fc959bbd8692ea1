use std::collections::BTreeMap;

pub const DEFAULT_METHOD: &str = "GET";

/// An HTTP request carried inside a tunnel query name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelRequest {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl TunnelRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: DEFAULT_METHOD.to_string(),
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Host component of `url`, if it parses as an absolute URI.
    pub fn host(&self) -> Option<String> {
        self.url
            .parse::<http::Uri>()
            .ok()
            .and_then(|uri| uri.host().map(str::to_string))
    }
}

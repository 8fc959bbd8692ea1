use serde::Deserialize;

/// `?name=&type=` as sent by DoH-JSON clients.
#[derive(Deserialize, Debug, Default)]
pub struct DnsQueryParams {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub record_type: Option<String>,
}

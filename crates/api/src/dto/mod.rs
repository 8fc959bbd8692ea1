pub mod doh;
pub mod query;

pub use doh::{DohJsonAnswer, DohJsonResponse};
pub use query::DnsQueryParams;

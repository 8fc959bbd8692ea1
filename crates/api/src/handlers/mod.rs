pub mod dns_query;

pub use dns_query::resolve_query;

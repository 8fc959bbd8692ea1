mod fetch;
mod init_config;

pub use fetch::{fetch, FetchArgs};
pub use init_config::init_config;

pub mod relay;
pub mod resolver;

pub use relay::ReqwestRelayClient;
pub use resolver::DohJsonResolver;

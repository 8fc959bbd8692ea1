pub mod reqwest_relay;

pub use reqwest_relay::ReqwestRelayClient;

pub mod envelope_layout;
pub mod tunnel_codec;

pub use tunnel_codec::TunnelCodec;

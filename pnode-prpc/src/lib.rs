#[macro_use]
extern crate log;

pub mod client;
pub mod envelope;
pub mod error;

pub use client::PrpcClient;
pub use error::RpcError;

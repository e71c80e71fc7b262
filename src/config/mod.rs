pub mod abi;
pub mod env;
pub mod network;

pub use env::*;
pub use network::*;

pub mod farm;
pub mod swap_session;

pub use farm::*;
pub use swap_session::*;

pub mod wave;
pub mod event;
pub mod config;
pub mod error;


pub use alloy_primitives::{Address, TxHash};
pub use error::PortalError;
pub type Result<T> = std::result::Result<T, PortalError>;

//! Browser adapters for the portal ports.
//!
//! Everything talks to the wallet extension through the injected
//! EIP-1193 provider (`window.ethereum`).

pub mod abi;
pub mod contract;
pub mod eip1193;
pub mod wallet;

pub use contract::WavePortalContract;
pub use eip1193::InjectedProvider;
pub use wallet::BrowserWallet;

#[cfg(test)]
mod tests;

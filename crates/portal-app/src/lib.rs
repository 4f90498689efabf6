//! Wave Portal WASM entry point.
//!
//! This crate is the composition root. It detects the injected wallet,
//! assembles the platform adapters and hands them to a `PortalRuntime`
//! behind the exported [`WavePortalHandle`].

mod handle;
mod view;

pub use handle::WavePortalHandle;
pub use view::{PortalView, PROVIDER_MISSING_ALERT};

use wasm_bindgen::prelude::*;

/// WASM entry point, runs when the module is instantiated
#[wasm_bindgen(start)]
pub fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Wave Portal WASM starting...");
}

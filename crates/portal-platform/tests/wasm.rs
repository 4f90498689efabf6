//! WASM-target tests for portal-platform (Node.js runtime).
//!
//! Covers ABI encoding/decoding and provider detection under
//! wasm32-unknown-unknown via `wasm-pack test --node`. Requests against a
//! real `window.ethereum` need a browser with a wallet extension.

use wasm_bindgen_test::*;

use alloy_primitives::{Address, Bytes, U256, U64};
use alloy_sol_types::SolValue;
use portal_platform::abi::{self, RpcLog};
use portal_platform::InjectedProvider;

#[wasm_bindgen_test]
fn no_provider_under_node() {
    assert!(InjectedProvider::detect().is_none());
}

#[wasm_bindgen_test]
fn decode_total_waves() {
    let data = U256::from(12).abi_encode();
    assert_eq!(abi::decode_total_waves(&data).unwrap(), 12);
}

#[wasm_bindgen_test]
fn decode_wave_tuple() {
    let owner = Address::repeat_byte(0x42);
    let data = (owner, "wave".to_string(), U256::from(1_700_000_000u64)).abi_encode_params();
    let record = abi::decode_wave(4, &data).unwrap();
    assert_eq!(record.index, 4);
    assert_eq!(record.owner, owner);
    assert_eq!(record.message, "wave");
}

#[wasm_bindgen_test]
fn collect_new_waves_in_log_order() {
    let log = |ts: u64, text: &str, block: u64| RpcLog {
        address: Address::ZERO,
        topics: vec![abi::new_wave_topic(), Address::repeat_byte(1).into_word()],
        data: Bytes::from((U256::from(ts), text.to_string()).abi_encode_params()),
        block_number: Some(U64::from(block)),
        log_index: Some(U64::ZERO),
        removed: false,
    };
    let waves = abi::collect_new_waves(vec![log(2, "later", 9), log(1, "earlier", 8)]);
    let texts: Vec<&str> = waves.iter().map(|w| w.message.as_str()).collect();
    assert_eq!(texts, vec!["earlier", "later"]);
}

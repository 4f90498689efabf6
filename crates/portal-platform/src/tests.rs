#[cfg(test)]
mod tests {
    use crate::abi::*;
    use crate::contract::{BlockCursor, ListenerRegistry};
    use crate::eip1193::*;
    use alloy_primitives::{keccak256, Address, Bytes, B256, U256, U64};
    use alloy_sol_types::{SolCall, SolValue};
    use portal_core::ports::TxReceipt;
    use portal_types::wave::NewWave;
    use portal_types::PortalError;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn owner(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn new_wave_log(from: Address, ts: u64, message: &str, block: u64, index: u64) -> RpcLog {
        RpcLog {
            address: owner(0xee),
            topics: vec![new_wave_topic(), from.into_word()],
            data: Bytes::from((U256::from(ts), message.to_string()).abi_encode_params()),
            block_number: Some(U64::from(block)),
            log_index: Some(U64::from(index)),
            removed: false,
        }
    }

    // ─── Calldata Tests ──────────────────────────────────────

    #[test]
    fn test_selectors() {
        assert_eq!(encode_total_waves(), keccak256("getTotalWaves()")[..4].to_vec());
        assert_eq!(&encode_get_wave(0)[..4], &keccak256("getWave(uint256)")[..4]);
        assert_eq!(&encode_create_wave("")[..4], &keccak256("createWave(string)")[..4]);
        assert_eq!(new_wave_topic(), keccak256("NewWave(address,uint256,string)"));
    }

    #[test]
    fn test_encode_get_wave_argument() {
        let data = encode_get_wave(5);
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(U256::from_be_slice(&data[4..]), U256::from(5));
    }

    #[test]
    fn test_encode_create_wave_carries_message() {
        let data = encode_create_wave("gm");
        let call = IWavePortal::createWaveCall::abi_decode(&data).unwrap();
        assert_eq!(call.message, "gm");
    }

    // ─── Return Data Tests ───────────────────────────────────

    #[test]
    fn test_decode_total_waves() {
        let data = U256::from(3).abi_encode();
        assert_eq!(decode_total_waves(&data).unwrap(), 3);
    }

    #[test]
    fn test_decode_total_waves_overflow() {
        let data = U256::MAX.abi_encode();
        assert!(matches!(decode_total_waves(&data), Err(PortalError::Abi(_))));
    }

    #[test]
    fn test_decode_total_waves_garbage() {
        assert!(matches!(decode_total_waves(&[1, 2, 3]), Err(PortalError::Abi(_))));
    }

    #[test]
    fn test_decode_wave() {
        let data = (owner(0xaa), "hi".to_string(), U256::from(1000)).abi_encode_params();
        let record = decode_wave(0, &data).unwrap();
        assert_eq!(record.index, 0);
        assert_eq!(record.owner, owner(0xaa));
        assert_eq!(record.message, "hi");
        assert_eq!(record.timestamp_secs(), 1000);
    }

    // ─── Log Tests ───────────────────────────────────────────

    #[test]
    fn test_decode_new_wave_log() {
        let log = new_wave_log(owner(0xdd), 1500, "new idea", 10, 0);
        let wave = decode_new_wave(&log).unwrap();
        assert_eq!(wave, Some(NewWave::new(owner(0xdd), 1500, "new idea")));
    }

    #[test]
    fn test_decode_foreign_log_is_none() {
        let mut log = new_wave_log(owner(0xdd), 1500, "new idea", 10, 0);
        log.topics[0] = B256::repeat_byte(0x01);
        assert_eq!(decode_new_wave(&log).unwrap(), None);
    }

    #[test]
    fn test_collect_new_waves_orders_and_skips() {
        let mut removed = new_wave_log(owner(3), 3, "reorged", 11, 0);
        removed.removed = true;
        let mut broken = new_wave_log(owner(4), 4, "broken", 11, 2);
        broken.data = Bytes::from(vec![0u8; 7]);

        let logs = vec![
            new_wave_log(owner(2), 2, "second", 11, 1),
            removed,
            new_wave_log(owner(1), 1, "first", 10, 5),
            broken,
        ];
        let texts: Vec<String> = collect_new_waves(logs).into_iter().map(|w| w.message).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    // ─── Block Cursor Tests ──────────────────────────────────

    #[test]
    fn test_cursor_first_window_starts_at_subscription_block() {
        // Subscribed at block 100, a wave mined in 101 before the first tick
        let cursor = BlockCursor::starting_at(100);
        assert_eq!(cursor.window(101), Some((100, 101)));
    }

    #[test]
    fn test_cursor_unseeded_starts_at_head() {
        let cursor = BlockCursor::default();
        assert_eq!(cursor.next_block(), None);
        assert_eq!(cursor.window(42), Some((42, 42)));
    }

    #[test]
    fn test_cursor_no_new_blocks() {
        let mut cursor = BlockCursor::starting_at(10);
        cursor.advance((10, 12));
        assert_eq!(cursor.next_block(), Some(13));
        assert_eq!(cursor.window(12), None);
        assert_eq!(cursor.window(13), Some((13, 13)));
    }

    #[test]
    fn test_cursor_advance_covers_every_block_once() {
        let mut cursor = BlockCursor::starting_at(5);
        let mut scanned = Vec::new();
        for head in [5, 7, 7, 10] {
            if let Some(window) = cursor.window(head) {
                scanned.extend(window.0..=window.1);
                cursor.advance(window);
            }
        }
        assert_eq!(scanned, (5..=10).collect::<Vec<u64>>());
    }

    #[test]
    fn test_cursor_retry_keeps_failed_window() {
        let mut cursor = BlockCursor::starting_at(20);
        let window = cursor.window(22).unwrap();
        cursor.retry(window);
        assert_eq!(cursor.window(25), Some((20, 25)));

        let mut unseeded = BlockCursor::default();
        let window = unseeded.window(30).unwrap();
        unseeded.retry(window);
        assert_eq!(unseeded.window(31), Some((30, 31)));
    }

    // ─── Listener Registry Tests ─────────────────────────────

    #[test]
    fn test_registry_first_listener_starts_poller() {
        let registry = ListenerRegistry::default();
        let (first, start) = registry.register(Rc::new(|_: NewWave| {}));
        assert!(start);
        let (second, start) = registry.register(Rc::new(|_: NewWave| {}));
        assert!(!start);
        assert_ne!(first, second);
    }

    #[test]
    fn test_registry_idle_stops_poller() {
        let registry = ListenerRegistry::default();
        let (id, _) = registry.register(Rc::new(|_: NewWave| {}));
        assert!(!registry.finish_if_idle());

        registry.remove(id);
        assert!(registry.finish_if_idle());
        // A later subscription needs a fresh poller
        let (_, start) = registry.register(Rc::new(|_: NewWave| {}));
        assert!(start);
    }

    #[test]
    fn test_registry_resubscribe_reuses_running_poller() {
        let registry = ListenerRegistry::default();
        let (old, start) = registry.register(Rc::new(|_: NewWave| {}));
        assert!(start);

        registry.remove(old);
        let (_, start) = registry.register(Rc::new(|_: NewWave| {}));
        assert!(!start);
        assert!(!registry.finish_if_idle());
    }

    #[test]
    fn test_registry_dispatch_reaches_current_listeners() {
        let registry = ListenerRegistry::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let (id, _) = registry.register(Rc::new(move |w: NewWave| sink.borrow_mut().push(w.message)));

        registry.dispatch(&NewWave::new(owner(1), 1, "one"));
        registry.remove(id);
        registry.dispatch(&NewWave::new(owner(1), 2, "two"));
        assert_eq!(*seen.borrow(), vec!["one".to_string()]);
    }

    #[test]
    fn test_registry_listener_may_unsubscribe_itself() {
        let registry = Rc::new(ListenerRegistry::default());
        let calls = Rc::new(RefCell::new(0));
        let own_id = Rc::new(RefCell::new(None));

        let (reg, counter, slot) = (registry.clone(), calls.clone(), own_id.clone());
        let (id, _) = registry.register(Rc::new(move |_: NewWave| {
            *counter.borrow_mut() += 1;
            if let Some(id) = *slot.borrow() {
                reg.remove(id);
            }
        }));
        *own_id.borrow_mut() = Some(id);

        registry.dispatch(&NewWave::new(owner(1), 1, "a"));
        registry.dispatch(&NewWave::new(owner(1), 2, "b"));
        assert_eq!(*calls.borrow(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_rpc_log_deserialize() {
        let json = serde_json::json!({
            "address": owner(0xee),
            "topics": [new_wave_topic(), owner(0xdd).into_word()],
            "data": Bytes::from((U256::from(7), "yo".to_string()).abi_encode_params()),
            "blockNumber": "0x10",
            "logIndex": "0x1",
            "transactionHash": B256::ZERO,
        });
        let log: RpcLog = serde_json::from_value(json).unwrap();
        assert_eq!(log.position(), (16, 1));
        assert!(!log.removed);
        assert_eq!(decode_new_wave(&log).unwrap().unwrap().message, "yo");
    }

    // ─── Receipt Tests ───────────────────────────────────────

    #[test]
    fn test_receipt_status() {
        let ok: RpcReceipt = serde_json::from_value(serde_json::json!({
            "transactionHash": B256::repeat_byte(0xab),
            "blockNumber": "0x2a",
            "status": "0x1",
        }))
        .unwrap();
        let receipt: TxReceipt = ok.into();
        assert!(receipt.success);
        assert_eq!(receipt.block_number, 42);
        assert_eq!(receipt.tx_hash, B256::repeat_byte(0xab));

        let failed: RpcReceipt = serde_json::from_value(serde_json::json!({
            "transactionHash": B256::repeat_byte(0xab),
            "blockNumber": "0x2a",
            "status": "0x0",
        }))
        .unwrap();
        assert!(!TxReceipt::from(failed).success);
    }

    #[test]
    fn test_receipt_without_status_is_success() {
        let legacy: RpcReceipt = serde_json::from_value(serde_json::json!({
            "transactionHash": B256::ZERO,
            "blockNumber": null,
        }))
        .unwrap();
        let receipt = TxReceipt::from(legacy);
        assert!(receipt.success);
        assert_eq!(receipt.block_number, 0);
    }

    // ─── Provider Error Tests ────────────────────────────────

    fn rpc_error(code: Option<i64>) -> ProviderRpcError {
        ProviderRpcError { code, message: "nope".to_string() }
    }

    #[test]
    fn test_classify_user_rejected_code() {
        let err = rpc_error(Some(USER_REJECTED)).classify("eth_sendTransaction");
        assert_eq!(err, PortalError::UserRejected("nope".to_string()));
    }

    #[test]
    fn test_classify_by_method() {
        assert!(matches!(rpc_error(Some(-32000)).classify("eth_sendTransaction"), PortalError::Write(_)));
        assert!(matches!(rpc_error(None).classify("eth_requestAccounts"), PortalError::UserRejected(_)));
        assert!(matches!(rpc_error(Some(-32603)).classify("eth_call"), PortalError::Read(_)));
    }

    #[test]
    fn test_classify_keeps_method_in_detail() {
        match rpc_error(None).classify("eth_getLogs") {
            PortalError::Read(detail) => assert_eq!(detail, "eth_getLogs: nope"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

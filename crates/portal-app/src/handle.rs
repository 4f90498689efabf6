//! JS-facing handle around the portal runtime.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use gloo_utils::format::JsValueSerdeExt;
use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use portal_core::event_bus::EventBus;
use portal_core::ports::{ListenerId, NewWaveListener, TxReceipt, WalletPort, WavePortalPort};
use portal_core::runtime::PortalRuntime;
use portal_platform::{BrowserWallet, InjectedProvider, WavePortalContract};
use portal_types::config::PortalConfig;
use portal_types::wave::WaveRecord;
use portal_types::{PortalError, TxHash};

use crate::view::PortalView;

/// Handle the page script keeps for the lifetime of the portal.
///
/// Call `refresh()` once per frame (or after any awaited call) to fold
/// runtime events into the view the getters read from.
#[wasm_bindgen]
pub struct WavePortalHandle {
    runtime: Rc<PortalRuntime>,
    view: RefCell<PortalView>,
}

#[wasm_bindgen]
impl WavePortalHandle {
    /// Build the portal and start the silent connection check.
    /// `config_json` is an optional partial `PortalConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WavePortalHandle, JsValue> {
        let config = match config_json {
            Some(json) => PortalConfig::from_json(&json).map_err(to_js_error)?,
            None => PortalConfig::default(),
        };
        let runtime = Rc::new(build_runtime(config));

        let handle = Self {
            runtime,
            view: RefCell::new(PortalView::new()),
        };
        handle.start();
        Ok(handle)
    }

    /// Ask the wallet for an account. Resolves to the address.
    pub fn connect(&self) -> Promise {
        let runtime = self.runtime.clone();
        future_to_promise(async move {
            let account = runtime.connect().await.map_err(to_js_error)?;
            Ok(JsValue::from_str(&account.to_string()))
        })
    }

    /// Send a wave. Resolves to the transaction hash once mined.
    pub fn submit(&self, text: String) -> Promise {
        let runtime = self.runtime.clone();
        future_to_promise(async move {
            let tx_hash = runtime.submit(&text).await.map_err(to_js_error)?;
            Ok(JsValue::from_str(&tx_hash.to_string()))
        })
    }

    /// Stop live updates
    pub fn shutdown(&self) {
        log::info!("Shutting down portal");
        self.runtime.shutdown();
    }

    /// Drain pending events into the view and raise any alerts.
    /// Returns `true` when the view changed.
    pub fn refresh(&self) -> bool {
        if !self.runtime.event_bus.has_pending() {
            return false;
        }
        let events = self.runtime.event_bus.drain();
        let (changed, alerts) = {
            let mut view = self.view.borrow_mut();
            let changed = view.process_events(events);
            (changed, view.take_alerts())
        };
        for message in alerts {
            show_alert(&message);
        }
        changed
    }

    pub fn account(&self) -> Option<String> {
        self.view.borrow().account.map(|a| a.to_string())
    }

    pub fn is_busy(&self) -> bool {
        self.view.borrow().busy
    }

    /// Displayed waves as an array of `{ index, owner, message, timestamp }`
    pub fn waves(&self) -> Result<JsValue, JsValue> {
        let view = self.view.borrow();
        JsValue::from_serde(&view.waves).map_err(|e| to_js_error(e.into()))
    }

    pub fn status(&self) -> String {
        self.view.borrow().status_text.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.view.borrow().last_error.clone()
    }
}

impl WavePortalHandle {
    fn start(&self) {
        let runtime = self.runtime.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match runtime.start().await {
                Some(account) => log::info!("Resumed with authorized account {}", account),
                None => log::info!("No authorized account; waiting for connect"),
            }
        });
    }
}

fn build_runtime(config: PortalConfig) -> PortalRuntime {
    let event_bus = EventBus::new();
    let (wallet, contract): (Option<Rc<dyn WalletPort>>, Rc<dyn WavePortalPort>) =
        match InjectedProvider::detect() {
            Some(provider) => {
                let provider = Rc::new(provider);
                (
                    Some(Rc::new(BrowserWallet::new(provider.clone()))),
                    Rc::new(WavePortalContract::new(provider, config.contract.clone())),
                )
            }
            None => {
                log::warn!("No injected wallet provider; contract access disabled");
                (None, Rc::new(UnavailableContract))
            }
        };
    PortalRuntime::new(config, wallet, contract, event_bus)
}

fn show_alert(message: &str) {
    match web_sys::window() {
        Some(window) => {
            if let Err(e) = window.alert_with_message(message) {
                log::warn!("window.alert failed: {:?}", e);
            }
        }
        None => log::warn!("{}", message),
    }
}

fn to_js_error(e: PortalError) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}

// ─── Stand-in contract when no wallet is installed ───────────

/// Every read and write needs the injected provider, so without one the
/// contract fails each call with `ProviderMissing`.
pub(crate) struct UnavailableContract;

#[async_trait(?Send)]
impl WavePortalPort for UnavailableContract {
    async fn total_waves(&self) -> portal_types::Result<u64> {
        Err(PortalError::ProviderMissing)
    }

    async fn get_wave(&self, _index: u64) -> portal_types::Result<WaveRecord> {
        Err(PortalError::ProviderMissing)
    }

    async fn create_wave(&self, _message: &str, _gas_limit: u64) -> portal_types::Result<TxHash> {
        Err(PortalError::ProviderMissing)
    }

    async fn wait_for_receipt(&self, _tx_hash: TxHash) -> portal_types::Result<TxReceipt> {
        Err(PortalError::ProviderMissing)
    }

    fn on_new_wave(&self, _listener: NewWaveListener) -> portal_types::Result<ListenerId> {
        Err(PortalError::ProviderMissing)
    }

    fn off_new_wave(&self, _id: ListenerId) {}
}

//! Injected EIP-1193 provider (`window.ethereum`).
//!
//! Every call goes through `ethereum.request({ method, params })`, which
//! returns a Promise. Arguments and results cross the JS boundary as JSON
//! via `gloo-utils`.

use gloo_utils::format::JsValueSerdeExt;
use js_sys::{Function, Promise, Reflect};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use portal_types::{PortalError, Result};

/// EIP-1193 "User Rejected Request"
pub const USER_REJECTED: i64 = 4001;

#[derive(Serialize)]
struct RequestArguments<'a> {
    method: &'a str,
    params: Value,
}

/// Error object thrown by a provider request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRpcError {
    pub code: Option<i64>,
    pub message: String,
}

impl ProviderRpcError {
    fn from_js(err: &JsValue) -> Self {
        let code = Reflect::get(err, &JsValue::from_str("code"))
            .ok()
            .and_then(|v| v.as_f64())
            .map(|c| c as i64);
        let message = Reflect::get(err, &JsValue::from_str("message"))
            .ok()
            .and_then(|v| v.as_string())
            .or_else(|| err.as_string())
            .unwrap_or_else(|| format!("{:?}", err));
        Self { code, message }
    }

    /// Map onto the portal error taxonomy according to what was asked.
    pub fn classify(self, method: &str) -> PortalError {
        if self.code == Some(USER_REJECTED) {
            return PortalError::UserRejected(self.message);
        }
        let detail = format!("{}: {}", method, self.message);
        match method {
            "eth_sendTransaction" => PortalError::Write(detail),
            "eth_requestAccounts" => PortalError::UserRejected(detail),
            _ => PortalError::Read(detail),
        }
    }
}

pub struct InjectedProvider {
    ethereum: JsValue,
}

impl InjectedProvider {
    /// Look up `window.ethereum`. `None` when no wallet extension is installed.
    pub fn detect() -> Option<Self> {
        let window = web_sys::window()?;
        let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
        if ethereum.is_undefined() || ethereum.is_null() {
            log::info!("window.ethereum not found");
            return None;
        }
        Some(Self { ethereum })
    }

    /// Issue one JSON-RPC request through the provider.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value> {
        log::debug!("ethereum.request {}", method);

        let request_fn: Function = Reflect::get(&self.ethereum, &JsValue::from_str("request"))
            .map_err(|e| PortalError::JsInterop(format!("{:?}", e)))?
            .dyn_into()
            .map_err(|_| PortalError::JsInterop("ethereum.request is not a function".to_string()))?;

        let args = JsValue::from_serde(&RequestArguments { method, params })?;

        let promise: Promise = request_fn
            .call1(&self.ethereum, &args)
            .map_err(|e| ProviderRpcError::from_js(&e).classify(method))?
            .dyn_into()
            .map_err(|_| PortalError::JsInterop(format!("{} did not return a Promise", method)))?;

        let result = JsFuture::from(promise)
            .await
            .map_err(|e| ProviderRpcError::from_js(&e).classify(method))?;

        Ok(result.into_serde::<Value>()?)
    }

    /// Request and decode the result into `T`.
    pub async fn request_as<T: serde::de::DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let value = self.request(method, params).await?;
        serde_json::from_value(value)
            .map_err(|e| PortalError::Serialization(format!("{}: {}", method, e)))
    }
}

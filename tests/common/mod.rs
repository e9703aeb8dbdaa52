#![allow(dead_code)]

use aave_concierge::{
    blockchain::ChainError,
    config::{AddressBook, NetworkConfig, Settings},
    create_app,
    models::{AccountSnapshot, ReserveConfiguration, SubmissionReceipt, UnsignedTransaction},
    services::{ContractReader, TransactionRelay},
    AppState,
};
use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const USER: &str = "0x1111111111111111111111111111111111111111";
pub const USDC: &str = "0xba50cd2a20f6da35d788639e581bca8d0b5d4d5f";
pub const WETH: &str = "0x4200000000000000000000000000000000000006";
pub const NATIVE: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";

pub fn addr(s: &str) -> Address {
    Address::from_str(s).unwrap()
}

pub fn pool() -> Address {
    Address::repeat_byte(0xaa)
}

pub fn executor() -> Address {
    Address::repeat_byte(0xee)
}

/// In-memory chain; every trait call is counted
pub struct MockChain {
    pub calls: AtomicUsize,
    pub price_reads: AtomicUsize,
    pub account: Mutex<AccountSnapshot>,
    pub account_unavailable: AtomicBool,
    pub prices: Mutex<HashMap<Address, f64>>,
    pub balances: Mutex<HashMap<(Address, Address), U256>>,
    pub allowance: Mutex<U256>,
    pub nonce: u64,
    pub gas_price: u128,
    pub receipt_success: AtomicBool,
    pub signed: Mutex<Vec<UnsignedTransaction>>,
    pub raw: Mutex<Vec<Bytes>>,
    pub executor: Option<Address>,
}

impl Default for MockChain {
    fn default() -> Self {
        let mut prices = HashMap::new();
        prices.insert(addr(USDC), 1.0);
        prices.insert(addr(WETH), 2500.0);
        prices.insert(addr(NATIVE), 2500.0);

        Self {
            calls: AtomicUsize::new(0),
            price_reads: AtomicUsize::new(0),
            account: Mutex::new(account(0.0, 0.0, 0.0, 0.0, 0.0)),
            account_unavailable: AtomicBool::new(false),
            prices: Mutex::new(prices),
            balances: Mutex::new(HashMap::new()),
            allowance: Mutex::new(U256::ZERO),
            nonce: 7,
            gas_price: 2_000_000_000,
            receipt_success: AtomicBool::new(true),
            signed: Mutex::new(Vec::new()),
            raw: Mutex::new(Vec::new()),
            executor: None,
        }
    }
}

impl MockChain {
    pub fn with_account(snapshot: AccountSnapshot) -> Self {
        let mock = Self::default();
        *mock.account.lock().unwrap() = snapshot;
        mock
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn price_reads(&self) -> usize {
        self.price_reads.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn receipt(&self, index: usize) -> SubmissionReceipt {
        SubmissionReceipt {
            tx_hash: format!("0x{:064x}", index + 1),
            block_number: Some(1_000 + index as u64),
            gas_used: 120_000,
            effective_gas_price: self.gas_price,
            success: self.receipt_success.load(Ordering::SeqCst),
        }
    }
}

/// Account figures in whole USD; scaled to 8-decimal base units
pub fn account(collateral: f64, debt: f64, available: f64, lt: f64, hf: f64) -> AccountSnapshot {
    AccountSnapshot {
        total_collateral_base: collateral * 1e8,
        total_debt_base: debt * 1e8,
        available_borrows_base: available * 1e8,
        current_liquidation_threshold: lt,
        ltv: 0.75,
        health_factor: hf,
    }
}

#[async_trait]
impl ContractReader for MockChain {
    async fn pool_address(&self, _network: &NetworkConfig) -> Result<Address, ChainError> {
        self.hit();
        Ok(pool())
    }

    async fn account_snapshot(&self, _network: &NetworkConfig, _user: Address) -> Result<AccountSnapshot, ChainError> {
        self.hit();
        if self.account_unavailable.load(Ordering::SeqCst) {
            return Err(ChainError::Rpc("connection refused".to_string()));
        }
        Ok(*self.account.lock().unwrap())
    }

    async fn asset_price(&self, _network: &NetworkConfig, _oracle: Address, asset: Address) -> Result<f64, ChainError> {
        self.hit();
        self.price_reads.fetch_add(1, Ordering::SeqCst);
        self.prices
            .lock()
            .unwrap()
            .get(&asset)
            .copied()
            .ok_or_else(|| ChainError::Contract("execution reverted".to_string()))
    }

    async fn reserve_configuration(
        &self,
        _network: &NetworkConfig,
        _asset: Address,
    ) -> Result<ReserveConfiguration, ChainError> {
        self.hit();
        Ok(ReserveConfiguration {
            ltv: 0.75,
            liquidation_threshold: 0.80,
            borrowing_enabled: true,
            is_active: true,
        })
    }

    async fn token_balance(&self, _network: &NetworkConfig, token: Address, owner: Address) -> Result<U256, ChainError> {
        self.hit();
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&(token, owner))
            .copied()
            .unwrap_or(U256::ZERO))
    }

    async fn allowance(
        &self,
        _network: &NetworkConfig,
        _token: Address,
        _owner: Address,
        _spender: Address,
    ) -> Result<U256, ChainError> {
        self.hit();
        Ok(*self.allowance.lock().unwrap())
    }

    async fn transaction_count(&self, _network: &NetworkConfig, _account: Address) -> Result<u64, ChainError> {
        self.hit();
        Ok(self.nonce)
    }

    async fn gas_price(&self, _network: &NetworkConfig) -> Result<u128, ChainError> {
        self.hit();
        Ok(self.gas_price)
    }

    async fn estimate_gas(
        &self,
        _network: &NetworkConfig,
        _from: Address,
        _to: Address,
        _data: Bytes,
    ) -> Result<u64, ChainError> {
        self.hit();
        Err(ChainError::Rpc("estimation not supported".to_string()))
    }
}

#[async_trait]
impl TransactionRelay for MockChain {
    async fn send_raw_transaction(&self, _network: &NetworkConfig, raw: Bytes) -> Result<SubmissionReceipt, ChainError> {
        self.hit();
        let mut sent = self.raw.lock().unwrap();
        sent.push(raw);
        Ok(self.receipt(sent.len() - 1))
    }

    async fn sign_and_send(
        &self,
        _network: &NetworkConfig,
        transaction: &UnsignedTransaction,
    ) -> Result<SubmissionReceipt, ChainError> {
        self.hit();
        let mut signed = self.signed.lock().unwrap();
        signed.push(transaction.clone());
        Ok(self.receipt(signed.len() - 1))
    }

    fn executor_address(&self) -> Option<Address> {
        self.executor
    }
}

/// One network with an ERC-20, a second ERC-20 and the native asset
pub fn address_book() -> AddressBook {
    let mut entries = BTreeMap::new();
    entries.insert(
        "AaveV3BaseSepolia".to_string(),
        json!({
            "CHAIN_ID": 84532,
            "POOL_ADDRESSES_PROVIDER": "0xE4C23309117Aa30342BFaae6c95c6478e0A4Ad00",
            "AAVE_PROTOCOL_DATA_PROVIDER": "0xBc9f5b7E248451CdD7cA54e717a2BFe1F32b566b",
            "ORACLE": "0x943b0dE18d4abf4eF02A85912F8fc07684C141dF",
            "ASSETS": {
                "USDC": {
                    "UNDERLYING": USDC,
                    "A_TOKEN": "0x10F1A9D11CDf50041f3f8cB7191CBE2f31750ACC",
                    "V_TOKEN": "0xFB3e85601b7fEb3691bbb8779Ef0E1069E347204",
                    "decimals": 6
                },
                "WETH": {
                    "UNDERLYING": WETH,
                    "A_TOKEN": "0x73a5bB60b0B0fc35710DDc0ea9c407031E31Bdbb",
                    "V_TOKEN": "0x562abf6562d6A2b165aDa02b5946bc3E7b4dD653",
                    "decimals": 18
                },
                "ETH": {
                    "UNDERLYING": NATIVE,
                    "decimals": 18
                }
            }
        }),
    );
    AddressBook::from_entries(entries, "test-key").unwrap()
}

pub fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.audit.enabled = false;
    settings
}

pub fn app(mock: Arc<MockChain>) -> Router {
    app_with(mock, settings())
}

pub fn app_with(mock: Arc<MockChain>, settings: Settings) -> Router {
    let state = AppState::new(settings, address_book(), mock.clone(), mock);
    create_app(state)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

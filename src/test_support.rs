//! Test doubles shared by the unit tests

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::services::{
    CallContractRequest, CreateWalletRequest, MerchantApi, MerchantWalletUpdate, RemoteError,
    TransactionReceipt, WalletProvider,
};
use crate::types::{MerchantContext, MerchantRecord, WalletResponse};

/// Serve `app` on an ephemeral local port and return its base URL
pub async fn spawn_server(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn merchant_context() -> MerchantContext {
    MerchantContext::new(MerchantRecord {
        id: "m-1".to_string(),
        name: Some("Test Shop".to_string()),
        business_email: None,
    })
    .with_api_keys("pk_test", "merchant-jwt")
}

enum CreateBehaviour {
    Succeed(Value),
    Fail(RemoteError),
    /// Fail this many times, then succeed
    Flaky(u32, Value),
}

pub struct MockWalletProvider {
    create: CreateBehaviour,
    contract_error: Option<RemoteError>,
    calls: AtomicU32,
    wallet_lookups: AtomicU32,
    last_request: Mutex<Option<(String, String, String)>>,
    contract_requests: Mutex<Vec<CallContractRequest>>,
}

impl MockWalletProvider {
    fn with(create: CreateBehaviour) -> Self {
        Self {
            create,
            contract_error: None,
            calls: AtomicU32::new(0),
            wallet_lookups: AtomicU32::new(0),
            last_request: Mutex::new(None),
            contract_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn returning(response: Value) -> Self {
        Self::with(CreateBehaviour::Succeed(response))
    }

    pub fn failing(err: RemoteError) -> Self {
        Self::with(CreateBehaviour::Fail(err))
    }

    pub fn flaky(failures: u32, response: Value) -> Self {
        Self::with(CreateBehaviour::Flaky(failures, response))
    }

    pub fn with_contract_error(mut self, err: RemoteError) -> Self {
        self.contract_error = Some(err);
        self
    }

    /// Wallet-creation attempts
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn wallet_lookups(&self) -> u32 {
        self.wallet_lookups.load(Ordering::SeqCst)
    }

    /// (secret, external user id, bearer token) of the last creation attempt
    pub fn last_request(&self) -> Option<(String, String, String)> {
        self.last_request.lock().unwrap().clone()
    }

    pub fn contract_requests(&self) -> Vec<CallContractRequest> {
        self.contract_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletProvider for MockWalletProvider {
    async fn create_wallet(
        &self,
        request: &CreateWalletRequest,
        bearer_token: &str,
    ) -> Result<WalletResponse, RemoteError> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((
            request.encrypt_key.clone(),
            request.external_user_id.clone(),
            bearer_token.to_string(),
        ));
        match &self.create {
            CreateBehaviour::Succeed(value) => Ok(WalletResponse(value.clone())),
            CreateBehaviour::Fail(err) => Err(err.clone()),
            CreateBehaviour::Flaky(failures, value) => {
                if attempt < *failures {
                    Err(RemoteError::Network("Connection failed".to_string()))
                } else {
                    Ok(WalletResponse(value.clone()))
                }
            }
        }
    }

    async fn get_wallet(
        &self,
        external_user_id: &str,
        _bearer_token: &str,
    ) -> Result<Value, RemoteError> {
        self.wallet_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(json!({"externalUserId": external_user_id, "publicKey": "0xSENDER"}))
    }

    async fn call_any_contract(
        &self,
        request: &CallContractRequest,
        _bearer_token: &str,
    ) -> Result<TransactionReceipt, RemoteError> {
        self.contract_requests.lock().unwrap().push(request.clone());
        match &self.contract_error {
            Some(err) => Err(err.clone()),
            None => Ok(TransactionReceipt(json!({"txHash": "0xfeed"}))),
        }
    }
}

pub struct MockMerchantApi {
    result: Result<(), RemoteError>,
    calls: AtomicU32,
    updates: Mutex<Vec<MerchantWalletUpdate>>,
}

impl MockMerchantApi {
    pub fn succeeding() -> Self {
        Self::with(Ok(()))
    }

    pub fn failing(err: RemoteError) -> Self {
        Self::with(Err(err))
    }

    fn with(result: Result<(), RemoteError>) -> Self {
        Self {
            result,
            calls: AtomicU32::new(0),
            updates: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_update(&self) -> Option<MerchantWalletUpdate> {
        self.updates.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl MerchantApi for MockMerchantApi {
    async fn update_wallet(&self, update: &MerchantWalletUpdate) -> Result<(), RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.updates.lock().unwrap().push(update.clone());
        self.result.clone()
    }
}

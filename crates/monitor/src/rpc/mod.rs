use std::sync::Arc;

use async_trait::async_trait;
use mempool_relay_domain::{ChainHeight, RawTransaction, RelayConfig};
use metrics::counter;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::client::{build_http_client, decode_rpc_response, ClientError, JsonRpcRequest};

mod types;

pub use types::{NodeInfo, RelayId};

pub const METHOD_GET_INFO: &str = "getinfo";
pub const METHOD_SEND_RAW_TRANSACTION: &str = "sendrawtransaction";

/// The two node capabilities the relay loop depends on.
#[async_trait]
pub trait NodeRpc: Send + Sync {
    async fn block_height(&self) -> Result<ChainHeight, ClientError>;
    async fn send_raw_transaction(&self, raw: &RawTransaction) -> Result<RelayId, ClientError>;
}

#[async_trait]
impl<T> NodeRpc for Arc<T>
where
    T: NodeRpc + ?Sized,
{
    async fn block_height(&self) -> Result<ChainHeight, ClientError> {
        (**self).block_height().await
    }

    async fn send_raw_transaction(&self, raw: &RawTransaction) -> Result<RelayId, ClientError> {
        (**self).send_raw_transaction(raw).await
    }
}

/// JSON-RPC client for a bitcoind-style full node reached over HTTP with
/// basic credentials.
#[derive(Clone)]
pub struct HttpNodeClient {
    http: Client,
    url: String,
    user: String,
    pass: String,
}

impl HttpNodeClient {
    pub fn new(config: &RelayConfig) -> Result<Self, ClientError> {
        let http = build_http_client(config.http_timeout())?;
        Ok(Self::with_endpoint(
            http,
            config.node_url(),
            config.node_user(),
            config.node_pass(),
        ))
    }

    pub fn with_endpoint(
        http: Client,
        url: impl Into<String>,
        user: impl Into<String>,
        pass: impl Into<String>,
    ) -> Self {
        Self {
            http,
            url: url.into(),
            user: user.into(),
            pass: pass.into(),
        }
    }

    /// Issues one request and decodes its `result` into `R`.
    pub async fn call<R>(&self, method: &str, param: Option<Value>) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
    {
        let request = JsonRpcRequest::new(method, param);
        let outcome = self.send(&request).await;

        let label = if outcome.is_ok() { "ok" } else { "error" };
        counter!(
            "monitor_rpc_calls_total",
            "method" => method.to_owned(),
            "result" => label
        )
        .increment(1);

        outcome
    }

    async fn send<R>(&self, request: &JsonRpcRequest<'_>) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
    {
        debug!(method = request.method, url = %self.url, "sending rpc request");
        let response = self
            .http
            .post(&self.url)
            .basic_auth(&self.user, Some(&self.pass))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        decode_rpc_response(status, &body, request.id)
    }
}

#[async_trait]
impl NodeRpc for HttpNodeClient {
    async fn block_height(&self) -> Result<ChainHeight, ClientError> {
        let info: NodeInfo = self.call(METHOD_GET_INFO, None).await?;
        Ok(info.blocks)
    }

    async fn send_raw_transaction(&self, raw: &RawTransaction) -> Result<RelayId, ClientError> {
        self.call(
            METHOD_SEND_RAW_TRANSACTION,
            Some(Value::String(raw.as_str().to_owned())),
        )
        .await
    }
}

//! HTTP and JSON-RPC plumbing shared by the node and feed clients.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Every node call carries this id; replies echoing a different one are
/// rejected.
pub const REQUEST_ID: u64 = 1;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected http status {status}")]
    HttpStatus { status: u16 },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub method: &'a str,
    pub id: u64,
    pub params: Vec<Value>,
}

impl<'a> JsonRpcRequest<'a> {
    pub fn new(method: &'a str, param: Option<Value>) -> Self {
        Self {
            method,
            id: REQUEST_ID,
            params: param.into_iter().collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
    pub result: Option<Value>,
    pub error: Option<JsonRpcErrorObject>,
    pub id: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
}

pub fn build_http_client(timeout: Option<Duration>) -> Result<Client, ClientError> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Decodes a node reply into the typed result for one method.
///
/// Full nodes answer method-level failures with a non-2xx status and a JSON
/// error envelope, so the envelope is inspected before the status code. A
/// non-2xx reply without a decodable envelope is reported as `HttpStatus`.
pub fn decode_rpc_response<T>(
    status: StatusCode,
    body: &[u8],
    expected_id: u64,
) -> Result<T, ClientError>
where
    T: DeserializeOwned,
{
    let envelope: JsonRpcResponse = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => {
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
            })
        }
        Err(err) => return Err(err.into()),
    };

    if let Some(id) = envelope.id.as_ref().filter(|id| !id.is_null()) {
        if id.as_u64() != Some(expected_id) {
            return Err(ClientError::Decode(format!(
                "response id {id} does not match request id {expected_id}"
            )));
        }
    }

    if let Some(error) = envelope.error {
        return Err(ClientError::Rpc {
            code: error.code,
            message: error.message,
        });
    }

    if !status.is_success() {
        return Err(ClientError::HttpStatus {
            status: status.as_u16(),
        });
    }

    Ok(serde_json::from_value(
        envelope.result.unwrap_or(Value::Null),
    )?)
}

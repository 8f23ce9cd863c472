//! Wire shape of one record in the explorer's transaction listing.
//!
//! Every field is optional: the explorer emits `null` for values it does not
//! know, and one odd record must not sink the whole listing.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeedTransaction {
    pub addresses: Option<Vec<String>>,
    /// `-1` while the transaction sits in the mempool.
    pub block_height: Option<i64>,
    pub block_index: Option<i64>,
    pub confidence: Option<f64>,
    pub confirmations: Option<u64>,
    pub double_spend: Option<bool>,
    pub fees: Option<i64>,
    pub hash: Option<String>,
    /// Only present when the listing was requested with `includeHex=true`.
    pub hex: Option<String>,
    pub inputs: Option<Vec<FeedInput>>,
    pub lock_time: Option<u64>,
    pub outputs: Option<Vec<FeedOutput>>,
    pub preference: Option<String>,
    pub receive_count: Option<u64>,
    /// Kept verbatim; parsed leniently when converting.
    pub received: Option<String>,
    pub relayed_by: Option<String>,
    pub size: Option<u64>,
    pub total: Option<i64>,
    pub ver: Option<u32>,
    pub vin_sz: Option<u64>,
    pub vout_sz: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeedInput {
    pub addresses: Option<Vec<String>>,
    pub age: Option<u64>,
    pub output_index: Option<i64>,
    pub output_value: Option<i64>,
    pub prev_hash: Option<String>,
    pub script: Option<String>,
    pub script_type: Option<String>,
    pub sequence: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeedOutput {
    pub addresses: Option<Vec<String>>,
    pub script: Option<String>,
    pub script_type: Option<String>,
    pub value: Option<i64>,
}

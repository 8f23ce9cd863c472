use mempool_relay_domain::ChainHeight;
use serde::Deserialize;

/// Typed `getinfo` result. Only the block count is consumed; the node reports
/// plenty of other fields that are ignored here.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NodeInfo {
    pub blocks: ChainHeight,
}

/// `sendrawtransaction` returns the relayed transaction id as a bare string.
pub type RelayId = String;

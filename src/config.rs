//! Protocol configuration for channel transitions

use crate::types::{MAX_FUNCTION_PROOFS, SETTLEMENT_DOMAIN_TAG};

/// Configuration consumed by the channel state machine
///
/// Implementations fix the protocol parameters that both the state machine
/// and off-chain signers must agree on.
pub trait BridgeConfig {
    /// Maximum number of function proofs in a single settlement
    fn max_function_proofs(&self) -> usize;

    /// Domain tag prefixed to the canonical settlement message
    fn settlement_domain_tag(&self) -> &[u8];
}

/// zk-channel v0 configuration
#[derive(Clone, Copy, Debug, Default)]
pub struct ZkChannelV0Config;

impl BridgeConfig for ZkChannelV0Config {
    fn max_function_proofs(&self) -> usize { MAX_FUNCTION_PROOFS }

    fn settlement_domain_tag(&self) -> &[u8] { SETTLEMENT_DOMAIN_TAG }
}

/// Default config instance (zk-channel v0)
pub const DEFAULT_CONFIG: ZkChannelV0Config = ZkChannelV0Config;

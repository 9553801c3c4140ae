//! Initialize transition
//!
//! Moves a channel from `Initialized` to `Open` once a Groth16 proof binds
//! the claimed root to the recorded participant keys and deposits.
//!
//! Checks, in order:
//! - Caller is the channel leader
//! - Channel is `Initialized`
//! - participants x tokens fits the tree size
//! - Public signals build from ledger state (no zero key under a nonzero deposit)
//! - The canonical verifier for the tree size accepts the proof
//!
//! The signal vector is always rebuilt here; nothing the caller encodes is
//! passed to the verifier except the root and the proof.

use tracing::warn;

use super::ChannelCommit;
use crate::channel::record::Channel;
use crate::channel::state::ChannelState;
use crate::commitment::ensure_capacity;
use crate::errors::{ChannelError, ZkpError};
use crate::types::{Address, StateRoot};
use crate::zkp::{Groth16Proof, VerifierSet};
use crate::Result;

/// Validates an initialization request
///
/// # Arguments
/// * `channel` - Current channel record
/// * `caller` - Identity submitting the request
/// * `root` - Claimed commitment root
/// * `proof` - Groth16 proof over the expected public signals
/// * `verifiers` - Capacity-sized verifier set
///
/// # Returns
/// * `Ok(ChannelCommit)` - Initialized → Open with `root` as initial state root
/// * `Err(ChannelError::NotLeader)` - Caller is not the leader
/// * `Err(ChannelError::InvalidState)` - Channel is not `Initialized`
/// * `Err(ConfigError::CapacityExceeded)` - Too many entries for the tree size
/// * `Err(ConfigError::ZeroKeyWithBalance)` - A funded slot has no L2 key
/// * `Err(ConfigError::MissingVerifier)` - No canonical verifier for the tree size
/// * `Err(ZkpError::InvalidProof)` - The proof does not verify
pub fn validate_initialize(
    channel: &Channel,
    caller: &Address,
    root: &StateRoot,
    proof: &Groth16Proof,
    verifiers: &VerifierSet,
) -> Result<ChannelCommit> {
    if caller != channel.leader() {
        return Err(ChannelError::NotLeader.into());
    }
    if channel.state() != ChannelState::Initialized {
        return Err(ChannelError::InvalidState { operation: "initialize", actual: channel.state() }
            .into());
    }
    ensure_capacity(
        channel.tree_size(),
        channel.participants().len(),
        channel.allowed_tokens().len(),
    )?;

    let signals = channel.public_signals(root)?;
    if !verifiers.verify(channel.tree_size(), proof, &signals)? {
        warn!(channel_id = channel.id(), "initialization proof rejected");
        return Err(ZkpError::InvalidProof.into());
    }

    Ok(ChannelCommit::open(channel.id(), *root))
}

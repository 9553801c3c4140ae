//! Settlement transition
//!
//! Moves a channel from `Open` or `Active` to `Closing` and records the
//! final withdraw amounts.
//!
//! Preconditions, checked before any cryptographic work:
//! - Caller is the channel leader
//! - Channel is `Open` or `Active`
//! - 1 to `max_function_proofs` execution proofs, naming distinct functions
//! - Final balance matrix is exactly participants x tokens
//!
//! Then, in order, each failing the whole call:
//! 1. Every function signature is registered
//! 2. Every execution proof verifies against its registered key
//! 3. Final balances conserve every token's deposits
//! 4. The group signature over the settlement message recovers the signer

use tracing::debug;

use super::ChannelCommit;
use crate::channel::record::Channel;
use crate::config::BridgeConfig;
use crate::errors::ChannelError;
use crate::settlement::{ensure_matrix_shape, validate_conservation};
use crate::signature::{
    settlement_message, verify_group_signature, SignatureVerifier, ThresholdSignature,
};
use crate::types::{Address, Balance, BalanceMatrix};
use crate::zkp::{
    ensure_distinct_functions, resolve_functions, verify_function_proofs, ExecutionProofVerifier,
    FunctionProof, FunctionRegistry,
};
use crate::Result;

/// A settlement request
///
/// Transient; nothing beyond the accepted `final_balances` outlives the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementSubmission {
    /// Execution proofs, one per distinct registered function
    pub proofs: Vec<FunctionProof>,
    /// Proposed final balances indexed `[participant][token]`
    pub final_balances: BalanceMatrix,
    /// Group signature over the settlement message
    pub signature: ThresholdSignature,
}

/// Verification capabilities consulted during settlement
#[derive(Clone, Copy)]
pub struct SettlementVerifiers<'a> {
    /// Registered function keys
    pub registry: &'a FunctionRegistry,
    /// Execution proof capability
    pub execution: &'a dyn ExecutionProofVerifier,
    /// Signature recovery capability
    pub signature: &'a dyn SignatureVerifier,
}

fn validate_preconditions<C: BridgeConfig>(
    config: &C,
    channel: &Channel,
    caller: &Address,
    submission: &SettlementSubmission,
) -> Result<()> {
    if caller != channel.leader() {
        return Err(ChannelError::NotLeader.into());
    }
    if !channel.state().accepts_settlement() {
        return Err(ChannelError::InvalidState { operation: "settlement", actual: channel.state() }
            .into());
    }

    let count = submission.proofs.len();
    let max = config.max_function_proofs();
    if count == 0 || count > max {
        return Err(ChannelError::InvalidProofCount { count, max }.into());
    }

    ensure_matrix_shape(
        &submission.final_balances,
        channel.participants().len(),
        channel.allowed_tokens().len(),
    )?;
    ensure_distinct_functions(&submission.proofs)
}

/// Validates a settlement request
///
/// # Arguments
/// * `config` - Protocol configuration
/// * `channel` - Current channel record
/// * `caller` - Identity submitting the request
/// * `submission` - Proofs, final balances and group signature
/// * `verifiers` - Registry and verification capabilities
///
/// # Returns
/// * `Ok(ChannelCommit)` - Open | Active → Closing with the final balances as withdraw amounts
/// * `Err(ChannelError)` - A precondition or registration check failed
/// * `Err(ZkpError::InvalidProof)` - An execution proof does not verify
/// * `Err(ConservationError)` - Final balances do not conserve deposits
/// * `Err(ZkpError::InvalidSignature)` - The signature does not recover the channel signer
pub fn validate_settlement<C: BridgeConfig>(
    config: &C,
    channel: &Channel,
    caller: &Address,
    submission: &SettlementSubmission,
    verifiers: SettlementVerifiers<'_>,
) -> Result<ChannelCommit> {
    validate_preconditions(config, channel, caller, submission)?;

    let functions = resolve_functions(&submission.proofs, verifiers.registry)?;
    verify_function_proofs(&submission.proofs, &functions, verifiers.execution)?;

    let totals = channel
        .allowed_tokens()
        .iter()
        .map(|token| channel.total_deposits(token))
        .collect::<Result<Vec<Balance>>>()?;
    validate_conservation(&submission.final_balances, channel.allowed_tokens(), &totals)?;

    let message = settlement_message(
        config,
        channel.id(),
        &submission.final_balances,
        &submission.proofs,
    );
    verify_group_signature(
        verifiers.signature,
        &message,
        channel.group_public_key(),
        &submission.signature,
        channel.signer(),
    )?;

    debug!(channel_id = channel.id(), proofs = submission.proofs.len(), "settlement validated");
    Ok(ChannelCommit::close(channel.id(), channel.state(), submission.final_balances.clone()))
}

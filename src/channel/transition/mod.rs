//! Channel state transitions
//!
//! Each proof-gated transition is a pure validation function over a channel
//! record. It runs every precondition and cryptographic check and, only if
//! all pass, returns a [`ChannelCommit`] carrying the full change set. The
//! ledger applies a commit as one unit, so a rejected call writes nothing.
//!
//! Transitions:
//! - `initialize`: Initialized → Open, records the initial state root
//! - `settlement`: Open | Active → Closing, records withdraw amounts

pub mod initialize;
pub mod settlement;

pub use initialize::validate_initialize;
pub use settlement::{validate_settlement, SettlementSubmission, SettlementVerifiers};

use crate::channel::state::ChannelState;
use crate::types::{BalanceMatrix, ChannelId, StateRoot};

/// Change set produced by a successful transition
///
/// Only transitions in this crate construct commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelCommit {
    channel_id: ChannelId,
    from: ChannelState,
    to: ChannelState,
    initial_state_root: Option<StateRoot>,
    withdraw_amounts: Option<BalanceMatrix>,
    signature_verified: bool,
}

impl ChannelCommit {
    pub(crate) fn open(channel_id: ChannelId, root: StateRoot) -> Self {
        Self {
            channel_id,
            from: ChannelState::Initialized,
            to: ChannelState::Open,
            initial_state_root: Some(root),
            withdraw_amounts: None,
            signature_verified: false,
        }
    }

    pub(crate) fn close(channel_id: ChannelId, from: ChannelState, amounts: BalanceMatrix) -> Self {
        Self {
            channel_id,
            from,
            to: ChannelState::Closing,
            initial_state_root: None,
            withdraw_amounts: Some(amounts),
            signature_verified: true,
        }
    }

    /// Channel the commit applies to
    pub fn channel_id(&self) -> ChannelId { self.channel_id }

    /// State the channel was validated in
    ///
    /// A ledger must refuse the commit if the channel has since moved.
    pub fn from(&self) -> ChannelState { self.from }

    /// State the channel moves to
    pub fn to(&self) -> ChannelState { self.to }

    /// Initial state root to record
    pub fn initial_state_root(&self) -> Option<&StateRoot> { self.initial_state_root.as_ref() }

    /// Withdraw amounts to record
    pub fn withdraw_amounts(&self) -> Option<&BalanceMatrix> { self.withdraw_amounts.as_ref() }

    /// Whether the signature-verified flag is set
    pub fn signature_verified(&self) -> bool { self.signature_verified }
}

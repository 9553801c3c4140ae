//! Channel ledger
//!
//! The ledger stores channel records. The state machine reads records
//! through [`ChannelLedger::channel`] and writes only by committing a
//! transition's change set through [`ChannelLedger::commit`].
//!
//! [`InMemoryLedger`] also carries the collaborator operations that drive a
//! channel outside the proof-gated transitions: opening, deposits, L2 key
//! assignment and the external `Active` and `Closed` steps.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::channel::record::{Channel, ChannelParams};
use crate::channel::state::ChannelState;
use crate::channel::transition::ChannelCommit;
use crate::errors::{ChannelError, LedgerError};
use crate::types::{Address, Balance, ChannelId, FieldElement};
use crate::Result;

/// Storage of channel records
pub trait ChannelLedger {
    /// Reads a channel record
    ///
    /// # Returns
    /// * `Err(ChannelError::ChannelNotFound)` - No channel under `id`
    fn channel(&self, id: ChannelId) -> Result<&Channel>;

    /// Applies a transition's change set
    ///
    /// Implementations apply every field of `commit` or none of them, and
    /// must refuse a commit whose [`ChannelCommit::from`] no longer matches
    /// the stored state.
    fn commit(&mut self, commit: ChannelCommit) -> Result<()>;
}

/// Ledger backed by an in-memory map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryLedger {
    channels: BTreeMap<ChannelId, Channel>,
}

impl InMemoryLedger {
    /// Creates an empty ledger
    pub fn new() -> Self { Self::default() }

    /// Number of stored channels
    pub fn len(&self) -> usize { self.channels.len() }

    /// Returns true if no channel is stored
    pub fn is_empty(&self) -> bool { self.channels.is_empty() }

    /// Opens a channel in the `Initialized` state
    ///
    /// # Returns
    /// * `Err(LedgerError::ChannelExists)` - The id is taken
    /// * `Err(LedgerError::InvalidParameters)` - See [`Channel::new`]
    pub fn open_channel(&mut self, params: ChannelParams) -> Result<()> {
        let id = params.id;
        if self.channels.contains_key(&id) {
            return Err(LedgerError::ChannelExists(id).into());
        }
        let channel = Channel::new(params)?;
        info!(
            channel_id = id,
            participants = channel.participants().len(),
            tokens = channel.allowed_tokens().len(),
            "channel opened"
        );
        self.channels.insert(id, channel);
        Ok(())
    }

    fn channel_mut(&mut self, id: ChannelId) -> Result<&mut Channel> {
        self.channels.get_mut(&id).ok_or_else(|| ChannelError::ChannelNotFound(id).into())
    }

    fn initialized_slot(
        &mut self,
        id: ChannelId,
        operation: &'static str,
        participant: &Address,
        token: &Address,
    ) -> Result<&mut Channel> {
        let channel = self.channel_mut(id)?;
        if channel.state() != ChannelState::Initialized {
            return Err(LedgerError::InvalidState { operation, actual: channel.state() }.into());
        }
        if !channel.is_participant(participant) {
            return Err(LedgerError::UnknownParticipant(*participant).into());
        }
        if !channel.is_allowed_token(token) {
            return Err(LedgerError::UnknownToken(*token).into());
        }
        Ok(channel)
    }

    /// Records a deposit while the channel is `Initialized`
    ///
    /// # Returns
    /// * `Ok(balance)` - The participant's new deposit in `token`
    /// * `Err(LedgerError::DepositOverflow)` - The balance or the token total would overflow
    pub fn deposit(
        &mut self,
        id: ChannelId,
        participant: &Address,
        token: &Address,
        amount: Balance,
    ) -> Result<Balance> {
        let channel = self.initialized_slot(id, "deposit", participant, token)?;
        let balance = channel
            .deposit(participant, token)
            .checked_add(amount)
            .ok_or(LedgerError::DepositOverflow(*token))?;
        channel
            .total_deposits(token)?
            .checked_add(amount)
            .ok_or(LedgerError::DepositOverflow(*token))?;

        channel.deposits.insert((*participant, *token), balance);
        debug!(channel_id = id, amount, "deposit recorded");
        Ok(balance)
    }

    /// Assigns the L2 key of a participant for a token while `Initialized`
    pub fn set_l2_key(
        &mut self,
        id: ChannelId,
        participant: &Address,
        token: &Address,
        key: FieldElement,
    ) -> Result<()> {
        let channel = self.initialized_slot(id, "set_l2_key", participant, token)?;
        channel.l2_keys.insert((*participant, *token), key);
        Ok(())
    }

    /// Moves an `Open` channel to `Active`
    pub fn mark_active(&mut self, id: ChannelId) -> Result<()> {
        self.advance(id, "mark_active", ChannelState::Open, ChannelState::Active)
    }

    /// Moves a `Closing` channel to `Closed`
    pub fn mark_closed(&mut self, id: ChannelId) -> Result<()> {
        self.advance(id, "mark_closed", ChannelState::Closing, ChannelState::Closed)
    }

    fn advance(
        &mut self,
        id: ChannelId,
        operation: &'static str,
        from: ChannelState,
        to: ChannelState,
    ) -> Result<()> {
        let channel = self.channel_mut(id)?;
        if channel.state() != from {
            return Err(LedgerError::InvalidState { operation, actual: channel.state() }.into());
        }
        channel.state = to;
        info!(channel_id = id, state = ?to, "channel state advanced");
        Ok(())
    }
}

impl ChannelLedger for InMemoryLedger {
    fn channel(&self, id: ChannelId) -> Result<&Channel> {
        self.channels.get(&id).ok_or_else(|| ChannelError::ChannelNotFound(id).into())
    }

    fn commit(&mut self, commit: ChannelCommit) -> Result<()> {
        let id = commit.channel_id();
        let channel = self.channel_mut(id)?;

        if channel.state() != commit.from() {
            return Err(LedgerError::InvalidState { operation: "commit", actual: channel.state() }
                .into());
        }
        if commit.initial_state_root().is_some() && channel.initial_state_root().is_some() {
            return Err(LedgerError::StateRootAlreadySet(id).into());
        }
        if commit.withdraw_amounts().is_some() && channel.withdraw_amounts().is_some() {
            return Err(LedgerError::WithdrawAmountsAlreadySet(id).into());
        }

        if let Some(root) = commit.initial_state_root() {
            channel.initial_state_root = Some(*root);
        }
        if let Some(amounts) = commit.withdraw_amounts() {
            channel.withdraw_amounts = Some(amounts.clone());
        }
        channel.signature_verified |= commit.signature_verified();
        channel.state = commit.to();
        Ok(())
    }
}

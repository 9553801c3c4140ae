//! Channel record
//!
//! The ledger-held record of one channel. Identity fields are fixed at
//! creation; deposits and L2 keys are written by collaborators while the
//! channel is `Initialized`; the lifecycle state, initial state root,
//! withdraw amounts and signature flag change only through a committed
//! transition.
//!
//! # Invariants
//!
//! - Participants and allowed tokens are non-empty and duplicate-free
//! - `initial_state_root` is immutable once set
//! - `withdraw_amounts` is written exactly once, together with `Closing`

use std::collections::{BTreeMap, BTreeSet};

use crate::channel::state::ChannelState;
use crate::commitment::{
    build_public_signals, compute_merkle_root, generate_balance_proof, slot_index, verify_balance,
    BalanceLeaf,
};
use crate::errors::LedgerError;
use crate::signature::GroupPublicKey;
use crate::types::{
    Address, Balance, BalanceMatrix, Bytes32, ChannelId, FieldElement, StateRoot, ZERO_ADDRESS,
};
use crate::zkp::TreeSize;
use crate::Result;

/// Parameters for opening a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelParams {
    /// Channel id
    pub id: ChannelId,
    /// Identity authorized to submit proofs and settlement
    pub leader: Address,
    /// Ordered participants
    pub participants: Vec<Address>,
    /// Ordered allowed tokens
    pub allowed_tokens: Vec<Address>,
    /// Commitment tree capacity
    pub tree_size: TreeSize,
    /// Public key of the distributed signer group
    pub group_public_key: GroupPublicKey,
    /// Signer address bound to `group_public_key`
    pub signer: Address,
}

/// Ledger record of a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    id: ChannelId,
    leader: Address,
    participants: Vec<Address>,
    allowed_tokens: Vec<Address>,
    tree_size: TreeSize,
    group_public_key: GroupPublicKey,
    signer: Address,
    pub(crate) state: ChannelState,
    pub(crate) deposits: BTreeMap<(Address, Address), Balance>,
    pub(crate) l2_keys: BTreeMap<(Address, Address), FieldElement>,
    pub(crate) initial_state_root: Option<StateRoot>,
    pub(crate) withdraw_amounts: Option<BalanceMatrix>,
    pub(crate) signature_verified: bool,
}

fn ensure_distinct(values: &[Address], what: &str) -> Result<()> {
    if values.is_empty() {
        return Err(LedgerError::InvalidParameters(format!("no {what}")).into());
    }
    let unique: BTreeSet<&Address> = values.iter().collect();
    if unique.len() != values.len() {
        return Err(LedgerError::InvalidParameters(format!("duplicate {what}")).into());
    }
    Ok(())
}

impl Channel {
    /// Creates a channel in the `Initialized` state
    ///
    /// # Returns
    /// * `Ok(Channel)` - Empty deposits and keys, no root, no withdraw amounts
    /// * `Err(LedgerError::InvalidParameters)` - Empty or duplicated
    ///   participants or tokens, or a zero leader or signer
    pub fn new(params: ChannelParams) -> Result<Self> {
        ensure_distinct(&params.participants, "participants")?;
        ensure_distinct(&params.allowed_tokens, "allowed tokens")?;
        if params.leader == ZERO_ADDRESS {
            return Err(LedgerError::InvalidParameters("zero leader".into()).into());
        }
        if params.signer == ZERO_ADDRESS {
            return Err(LedgerError::InvalidParameters("zero signer".into()).into());
        }

        Ok(Self {
            id: params.id,
            leader: params.leader,
            participants: params.participants,
            allowed_tokens: params.allowed_tokens,
            tree_size: params.tree_size,
            group_public_key: params.group_public_key,
            signer: params.signer,
            state: ChannelState::Initialized,
            deposits: BTreeMap::new(),
            l2_keys: BTreeMap::new(),
            initial_state_root: None,
            withdraw_amounts: None,
            signature_verified: false,
        })
    }

    /// Channel id
    pub fn id(&self) -> ChannelId { self.id }

    /// Channel leader
    pub fn leader(&self) -> &Address { &self.leader }

    /// Ordered participants
    pub fn participants(&self) -> &[Address] { &self.participants }

    /// Ordered allowed tokens
    pub fn allowed_tokens(&self) -> &[Address] { &self.allowed_tokens }

    /// Commitment tree capacity
    pub fn tree_size(&self) -> TreeSize { self.tree_size }

    /// Group public key of the signer group
    pub fn group_public_key(&self) -> &GroupPublicKey { &self.group_public_key }

    /// Registered signer address
    pub fn signer(&self) -> &Address { &self.signer }

    /// Current lifecycle state
    pub fn state(&self) -> ChannelState { self.state }

    /// Verified initialization commitment, once set
    pub fn initial_state_root(&self) -> Option<&StateRoot> { self.initial_state_root.as_ref() }

    /// Settlement amounts indexed `[participant][token]`, once set
    pub fn withdraw_amounts(&self) -> Option<&BalanceMatrix> { self.withdraw_amounts.as_ref() }

    /// Returns true once a settlement signature has been verified
    pub fn signature_verified(&self) -> bool { self.signature_verified }

    /// Returns true if `address` is a participant
    pub fn is_participant(&self, address: &Address) -> bool { self.participants.contains(address) }

    /// Returns true if `token` is allowed
    pub fn is_allowed_token(&self, token: &Address) -> bool { self.allowed_tokens.contains(token) }

    /// Recorded deposit of `participant` in `token`, zero if none
    pub fn deposit(&self, participant: &Address, token: &Address) -> Balance {
        self.deposits.get(&(*participant, *token)).copied().unwrap_or(0)
    }

    /// L2 key of `participant` for `token`, zero if unset
    pub fn l2_key(&self, participant: &Address, token: &Address) -> FieldElement {
        self.l2_keys.get(&(*participant, *token)).copied().unwrap_or([0u8; 32])
    }

    /// Total deposited in `token` across all participants
    ///
    /// # Returns
    /// * `Err(LedgerError::DepositOverflow)` - The total does not fit in a `Balance`
    pub fn total_deposits(&self, token: &Address) -> Result<Balance> {
        self.participants
            .iter()
            .try_fold(0u128, |sum, participant| sum.checked_add(self.deposit(participant, token)))
            .ok_or_else(|| LedgerError::DepositOverflow(*token).into())
    }

    /// Public signals for `root` built from the recorded keys and deposits
    pub fn public_signals(&self, root: &StateRoot) -> Result<Vec<FieldElement>> {
        build_public_signals(
            self.tree_size,
            &self.participants,
            &self.allowed_tokens,
            root,
            |participant, token| self.l2_key(participant, token),
            |participant, token| self.deposit(participant, token),
        )
    }

    /// Settlement amounts as balance leaves, token-major and participant-minor
    pub fn withdrawal_leaves(&self) -> Option<Vec<BalanceLeaf>> {
        let amounts = self.withdraw_amounts.as_ref()?;
        let mut leaves = Vec::with_capacity(self.participants.len() * self.allowed_tokens.len());
        for (token_index, token) in self.allowed_tokens.iter().enumerate() {
            for (participant_index, participant) in self.participants.iter().enumerate() {
                leaves.push(BalanceLeaf {
                    participant: *participant,
                    token: *token,
                    amount: *amounts.get(participant_index)?.get(token_index)?,
                });
            }
        }
        Some(leaves)
    }

    /// Balance tree root over the settlement amounts
    pub fn settlement_root(&self) -> Option<Bytes32> {
        self.withdrawal_leaves().map(|leaves| compute_merkle_root(&leaves))
    }

    /// Withdrawal claim for one participant and token with its inclusion proof
    ///
    /// # Returns
    /// `None` before settlement or for an unknown participant or token
    pub fn withdrawal_proof(
        &self,
        participant: &Address,
        token: &Address,
    ) -> Option<(BalanceLeaf, Vec<Bytes32>)> {
        let participant_index = self.participants.iter().position(|p| p == participant)?;
        let token_index = self.allowed_tokens.iter().position(|t| t == token)?;
        let leaves = self.withdrawal_leaves()?;
        let index = slot_index(participant_index, token_index, self.participants.len());
        let proof = generate_balance_proof(&leaves, index)?;
        Some((leaves[index], proof))
    }

    /// Checks a withdrawal claim against this channel's settlement root
    pub fn verify_withdrawal_claim(&self, leaf: &BalanceLeaf, proof: &[Bytes32]) -> bool {
        self.settlement_root().is_some_and(|root| verify_balance(&root, leaf, proof))
    }
}

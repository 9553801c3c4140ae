//! Error types for the zk-channel library
//!
//! Errors are grouped by the stage at which a call is rejected:
//! preconditions, capacity and configuration, cryptographic rejection,
//! conservation, and collaborator storage. None of them is retryable with
//! the same inputs.

use thiserror::Error;

use crate::channel::ChannelState;
use crate::types::{Address, ChannelId, FunctionSignature};
use crate::zkp::{TreeSize, VerifierVariant};

/// The main error type for the zk-channel library
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Precondition violations
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// Capacity and configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Cryptographic rejections
    #[error(transparent)]
    Zkp(#[from] ZkpError),

    /// Conservation violations
    #[error(transparent)]
    Conservation(#[from] ConservationError),

    /// Ledger collaborator errors
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Precondition violations, rejected before any cryptographic work
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChannelError {
    /// No channel is recorded under the given id
    #[error("Channel not found: {0}")]
    ChannelNotFound(ChannelId),

    /// Caller is not the channel leader
    #[error("Caller is not the channel leader")]
    NotLeader,

    /// Channel is not in a state that accepts the requested transition
    #[error("Invalid channel state for {operation}: {actual:?}")]
    InvalidState {
        /// The rejected operation
        operation: &'static str,
        /// The channel's current state
        actual: ChannelState,
    },

    /// Number of function proofs is outside the accepted range
    #[error("Function proof count {count} outside 1..={max}")]
    InvalidProofCount {
        /// Number of proofs supplied
        count: usize,
        /// Maximum accepted
        max: usize,
    },

    /// Final balance matrix dimensions do not match participants x tokens
    #[error("Final balance matrix mismatch: expected {participants}x{tokens}")]
    BalanceMatrixMismatch {
        /// Number of channel participants
        participants: usize,
        /// Number of allowed tokens
        tokens: usize,
    },

    /// The same function signature appears more than once in a submission
    #[error("Duplicate function proof: {0:?}")]
    DuplicateFunctionProof(FunctionSignature),

    /// A submitted function signature has no registered verifying key
    #[error("Function not registered: {0:?}")]
    UnregisteredFunction(FunctionSignature),
}

/// Capacity and configuration errors, rejected before dispatch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// Participant x token entries exceed the commitment tree capacity
    #[error("Capacity exceeded: {entries} entries for tree size {capacity}")]
    CapacityExceeded {
        /// participants.len() * allowed_tokens.len()
        entries: usize,
        /// Leaf capacity of the tree
        capacity: usize,
    },

    /// A participant holds a nonzero balance under a zero L2 key
    #[error("Zero L2 key with nonzero balance for participant {participant:?}, token {token:?}")]
    ZeroKeyWithBalance {
        /// The participant
        participant: Address,
        /// The token
        token: Address,
    },

    /// Public signal vector length does not match the tree size
    #[error("Public signal length mismatch: expected {expected}, got {actual}")]
    SignalLengthMismatch {
        /// 2 * tree_size + 1
        expected: usize,
        /// Supplied length
        actual: usize,
    },

    /// Tree size outside the supported set
    #[error("Unsupported tree size: {0}")]
    UnsupportedTreeSize(usize),

    /// No verifier is registered for the canonical variant of a tree size
    #[error("No verifier registered for {tree_size:?} ({variant:?})")]
    MissingVerifier {
        /// The tree size being dispatched
        tree_size: TreeSize,
        /// The canonical variant for that size
        variant: VerifierVariant,
    },

    /// A verifying key with the same function signature is already registered
    #[error("Function already registered: {0:?}")]
    FunctionAlreadyRegistered(FunctionSignature),
}

/// Cryptographic rejections
///
/// Deliberately carry no diagnostic detail about which check failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ZkpError {
    /// A Groth16 or execution proof did not verify
    #[error("Invalid proof")]
    InvalidProof,

    /// The settlement signature did not recover the channel signer
    #[error("Invalid signature")]
    InvalidSignature,
}

/// Conservation violations at settlement
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConservationError {
    /// Final balances for a token do not sum to its recorded deposits
    #[error("Conservation violated for token {token:?}: deposited {deposited}, settled {settled}")]
    Violation {
        /// The token
        token: Address,
        /// Total deposited for the token
        deposited: u128,
        /// Sum of proposed final balances for the token
        settled: u128,
    },

    /// Sum of final balances for a token overflows
    #[error("Final balance sum overflows for token {0:?}")]
    SumOverflow(Address),
}

/// Errors raised by the ledger collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LedgerError {
    /// A channel with this id already exists
    #[error("Channel already exists: {0}")]
    ChannelExists(ChannelId),

    /// Invalid channel parameters
    #[error("Invalid channel parameters: {0}")]
    InvalidParameters(String),

    /// Address is not a participant of the channel
    #[error("Not a channel participant: {0:?}")]
    UnknownParticipant(Address),

    /// Token is not allowed in the channel
    #[error("Token not allowed in channel: {0:?}")]
    UnknownToken(Address),

    /// Deposit would overflow a recorded balance
    #[error("Deposit overflow for token {0:?}")]
    DepositOverflow(Address),

    /// Operation is not allowed in the channel's current state
    #[error("Operation {operation} not allowed in state {actual:?}")]
    InvalidState {
        /// The rejected operation
        operation: &'static str,
        /// The channel's current state
        actual: ChannelState,
    },

    /// The initial state root has already been recorded
    #[error("Initial state root already set for channel {0}")]
    StateRootAlreadySet(ChannelId),

    /// Withdraw amounts have already been recorded
    #[error("Withdraw amounts already set for channel {0}")]
    WithdrawAmountsAlreadySet(ChannelId),
}

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

//! Channel module for proof-gated multiparty channels
//!
//! A channel locks participant deposits on the base ledger, opens once a
//! Groth16 proof binds its initial commitment to those deposits, and closes
//! with a single settlement authorized by execution proofs and a threshold
//! signature.
//!
//! # Structure
//!
//! - `state/`: Lifecycle enum (Initialized, Open, Active, Closing, Closed)
//! - `record`: The ledger-held channel record
//! - `ledger`: Ledger trait and the in-memory collaborator
//! - `transition/`: Pure transition validators (initialize, settlement)
//! - `machine`: The state machine sequencing validation and commit

pub mod ledger;
pub mod machine;
pub mod record;
pub mod state;
pub mod transition;

pub use ledger::{ChannelLedger, InMemoryLedger};
pub use machine::ChannelStateMachine;
pub use record::{Channel, ChannelParams};
pub use state::ChannelState;
pub use transition::{
    validate_initialize, validate_settlement, ChannelCommit, SettlementSubmission,
    SettlementVerifiers,
};

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # zk-channel
//!
//! A proof-gated state machine for multiparty channels: deposits are bound
//! to a fixed-capacity commitment verified by Groth16 at initialization,
//! and a single settlement closes the channel once execution proofs,
//! balance conservation and a threshold signature all check out.

// Channel records, ledger, transitions and the state machine
pub mod channel;

// Public-signal builder and balance Merkle tree
pub mod commitment;

// Protocol configuration
pub mod config;

// Error types
pub mod errors;

// BLS12-381 scalar field reduction
pub mod field;

// Balance conservation at settlement
pub mod settlement;

// Threshold signature verification
pub mod signature;

// Shared types and constants
pub mod types;

// Groth16 and execution proof verification
pub mod zkp;

#[cfg(test)]
pub(crate) mod test_utils;

pub use channel::{
    Channel, ChannelLedger, ChannelParams, ChannelState, ChannelStateMachine, InMemoryLedger,
    SettlementSubmission,
};
pub use config::{BridgeConfig, ZkChannelV0Config, DEFAULT_CONFIG};
pub use errors::{Error, Result};
pub use signature::{GroupPublicKey, SchnorrSecp256k1Verifier, SignatureVerifier, ThresholdSignature};
pub use types::{Address, Balance, Bytes32, ChannelId, FieldElement};
pub use zkp::{
    ArkGroth16Verifier, ExecutionProofVerifier, FunctionProof, Groth16Proof, Groth16Verifier,
    RegisteredFunction, TreeSize, VerifierSet,
};

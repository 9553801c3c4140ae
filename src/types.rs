//! Core type definitions for the zk-channel library
//!
//! This module defines fundamental types used across multiple modules,
//! providing a common location for shared type definitions.

// ============================================================================
// Fundamental Types
// ============================================================================

/// Type alias for 32-byte arrays used across cryptographic operations
pub type Bytes32 = [u8; 32];

/// Type alias for 20-byte identities (leaders, participants, tokens, signers)
pub type Address = [u8; 20];

/// The all-zero address, returned by signature recovery on failure
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// Token amount in the smallest unit
pub type Balance = u128;

/// A 32-byte big-endian value interpreted as a BLS12-381 scalar
///
/// Values leaving the commitment builder are always reduced below
/// [`crate::field::R_MOD`].
pub type FieldElement = Bytes32;

// ============================================================================
// Channel Domain
// ============================================================================

/// Type alias for channel identifiers
pub type ChannelId = u64;

/// Type alias for the initialization commitment (Merkle root over L2 keys and balances)
pub type StateRoot = FieldElement;

/// Identifier of a registered execution function
pub type FunctionSignature = Bytes32;

/// Proposed final balances indexed `[participant][token]`
pub type BalanceMatrix = Vec<Vec<Balance>>;

// ============================================================================
// Settlement Domain
// ============================================================================

/// Domain separation tag for the canonical settlement message
///
/// This tag is used to prefix settlement message hashes to ensure domain separation
/// and prevent collisions with other hash contexts.
pub const SETTLEMENT_DOMAIN_TAG: &[u8] = b"ZKC_SETTLE_v0";

/// Domain separation tag for Schnorr challenge computation
pub const SCHNORR_DOMAIN_TAG: &[u8] = b"ZKC_SCHNORR_v0";

/// Maximum number of function proofs accepted in a single settlement
pub const MAX_FUNCTION_PROOFS: usize = 5;

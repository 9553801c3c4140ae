//! Commitments over channel balances
//!
//! - `public_signals`: the fixed-capacity public-signal vector consumed by
//!   the initialization circuit
//! - `balance_tree`: a keccak binary Merkle tree for balance claims

pub mod balance_tree;
pub mod public_signals;

pub use balance_tree::{
    compute_leaf_hash, compute_merkle_root, compute_merkle_root_with, compute_node_hash,
    compute_node_hash_with, generate_balance_proof, generate_balance_proof_with, verify_balance,
    verify_balance_with, BalanceHasher, BalanceLeaf, Keccak256Hasher, EMPTY_ROOT,
};
pub use public_signals::{build_public_signals, ensure_capacity, slot_index};
